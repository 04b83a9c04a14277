//! Status lines
//!
//! Address match and data ready are available both on dedicated pins and in the
//! status register; carrier detect only exists as a pin. Which source is used is
//! decided at construction through [`StatusLines`]:
//!
//! - [`Line`] reads a wired pin, fast and interrupt capable
//! - [`StatusPoll`] issues a status transaction when no pin is wired
//! - [`NotConnected`] marks a carrier detect pin that is absent
//!
//! # Example
//! ```ignore
//! let lines = StatusLines::polled()
//!     .with_data_ready(PolledEdge::new(dr_pin, delay.clone()))
//!     .with_carrier_detect(cd_pin);
//! ```

use core::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin};
use embedded_hal::spi::SpiDevice;

use crate::commands::Status;
use crate::error::{pin_error, Error};
use crate::transport::Transport;

/// Sampling interval used when waiting by polling, in microseconds
pub const POLL_INTERVAL_US: u32 = 100;

/// An input line that can block until a rising edge.
pub trait WaitForEdge: InputPin {
    /// Blocks until a rising edge or until `timeout` elapses.
    ///
    /// Returns `false` on timeout.
    fn wait_for_rising_edge(&mut self, timeout: Duration) -> Result<bool, Self::Error>;
}

/// Adds [`WaitForEdge`] to a plain input by sampling it every [`POLL_INTERVAL_US`].
///
/// The line being high counts as an edge already latched, which matches how the chip
/// holds DR high until the payload is read.
pub struct PolledEdge<P, D> {
    pin: P,
    delay: D,
}

impl<P, D> PolledEdge<P, D> {
    /// Wraps `pin`, using `delay` between samples.
    pub fn new(pin: P, delay: D) -> Self {
        Self { pin, delay }
    }

    /// Releases the pin and delay.
    pub fn release(self) -> (P, D) {
        (self.pin, self.delay)
    }
}

impl<P: ErrorType, D> ErrorType for PolledEdge<P, D> {
    type Error = P::Error;
}

impl<P: InputPin, D> InputPin for PolledEdge<P, D> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.pin.is_high()
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.pin.is_low()
    }
}

impl<P: InputPin, D: DelayNs> WaitForEdge for PolledEdge<P, D> {
    fn wait_for_rising_edge(&mut self, timeout: Duration) -> Result<bool, Self::Error> {
        let pin = &mut self.pin;
        poll_until(&mut self.delay, timeout, || pin.is_high())
    }
}

/// Samples `check` until it reports true or `timeout` elapses.
///
/// `check` runs at least once, even with a zero timeout.
fn poll_until<D, E, F>(delay: &mut D, timeout: Duration, mut check: F) -> Result<bool, E>
where
    D: DelayNs,
    F: FnMut() -> Result<bool, E>,
{
    let budget = u64::try_from(timeout.as_micros()).unwrap_or(u64::MAX);
    let mut waited = 0u64;
    loop {
        if check()? {
            return Ok(true);
        }
        if waited >= budget {
            return Ok(false);
        }
        let step = (budget - waited).min(u64::from(POLL_INTERVAL_US));
        delay.delay_us(step as u32);
        waited += step;
    }
}

/// A status signal that is either read from a pin or polled from the status register.
pub trait StatusSignal {
    /// Samples the signal, polling `flag` when no pin is wired.
    fn sample<SPI: SpiDevice>(
        &mut self,
        transport: &mut Transport<SPI>,
        flag: Status,
    ) -> Result<bool, Error>;
}

/// A status signal whose rising edge can be awaited.
pub trait DataReadySignal: StatusSignal {
    /// Blocks until the signal rises or `timeout` elapses, `false` on timeout.
    fn wait_for_rising_edge<SPI: SpiDevice, D: DelayNs>(
        &mut self,
        transport: &mut Transport<SPI>,
        delay: &mut D,
        timeout: Duration,
    ) -> Result<bool, Error>;
}

/// The carrier detect source.
pub trait CarrierSignal {
    /// Reads carrier detect.
    ///
    /// # Errors
    /// `Error::Unavailable` when no line is wired.
    fn carrier_detect(&mut self) -> Result<bool, Error>;
}

/// A wired input pin
pub struct Line<P>(pub P);

/// No pin wired, the status register is polled instead
#[derive(Debug, Default, Clone, Copy)]
pub struct StatusPoll;

/// No carrier detect pin wired
#[derive(Debug, Default, Clone, Copy)]
pub struct NotConnected;

impl<P: InputPin> StatusSignal for Line<P> {
    fn sample<SPI: SpiDevice>(
        &mut self,
        _transport: &mut Transport<SPI>,
        _flag: Status,
    ) -> Result<bool, Error> {
        self.0.is_high().map_err(pin_error)
    }
}

impl<P: WaitForEdge> DataReadySignal for Line<P> {
    fn wait_for_rising_edge<SPI: SpiDevice, D: DelayNs>(
        &mut self,
        _transport: &mut Transport<SPI>,
        _delay: &mut D,
        timeout: Duration,
    ) -> Result<bool, Error> {
        self.0.wait_for_rising_edge(timeout).map_err(pin_error)
    }
}

impl<P: InputPin> CarrierSignal for Line<P> {
    fn carrier_detect(&mut self) -> Result<bool, Error> {
        self.0.is_high().map_err(pin_error)
    }
}

impl StatusSignal for StatusPoll {
    fn sample<SPI: SpiDevice>(
        &mut self,
        transport: &mut Transport<SPI>,
        flag: Status,
    ) -> Result<bool, Error> {
        Ok(transport.read_status()?.contains(flag))
    }
}

impl DataReadySignal for StatusPoll {
    fn wait_for_rising_edge<SPI: SpiDevice, D: DelayNs>(
        &mut self,
        transport: &mut Transport<SPI>,
        delay: &mut D,
        timeout: Duration,
    ) -> Result<bool, Error> {
        poll_until(delay, timeout, || {
            Ok(transport.read_status()?.contains(Status::DATA_READY))
        })
    }
}

impl CarrierSignal for NotConnected {
    fn carrier_detect(&mut self) -> Result<bool, Error> {
        Err(Error::Unavailable)
    }
}

/// Address match, data ready and carrier detect sources
pub struct StatusLines<AM, DR, CD> {
    /// AM source
    pub address_match: AM,
    /// DR source
    pub data_ready: DR,
    /// CD source
    pub carrier_detect: CD,
}

impl StatusLines<StatusPoll, StatusPoll, NotConnected> {
    /// No status pins wired: AM and DR are polled, carrier detect is unavailable.
    pub fn polled() -> Self {
        Self {
            address_match: StatusPoll,
            data_ready: StatusPoll,
            carrier_detect: NotConnected,
        }
    }
}

impl Default for StatusLines<StatusPoll, StatusPoll, NotConnected> {
    fn default() -> Self {
        Self::polled()
    }
}

impl<AM, DR, CD> StatusLines<AM, DR, CD> {
    /// Reads address match from `pin`.
    pub fn with_address_match<P: InputPin>(self, pin: P) -> StatusLines<Line<P>, DR, CD> {
        StatusLines {
            address_match: Line(pin),
            data_ready: self.data_ready,
            carrier_detect: self.carrier_detect,
        }
    }

    /// Reads and waits for data ready on `pin`.
    pub fn with_data_ready<P: WaitForEdge>(self, pin: P) -> StatusLines<AM, Line<P>, CD> {
        StatusLines {
            address_match: self.address_match,
            data_ready: Line(pin),
            carrier_detect: self.carrier_detect,
        }
    }

    /// Reads carrier detect from `pin`.
    pub fn with_carrier_detect<P: InputPin>(self, pin: P) -> StatusLines<AM, DR, Line<P>> {
        StatusLines {
            address_match: self.address_match,
            data_ready: self.data_ready,
            carrier_detect: Line(pin),
        }
    }
}
