//! Operating modes
//!
//! The chip's mode is selected by three control lines:
//!
//! | Mode | PWR_UP | TRX_CE | TX_EN |
//! |------|--------|--------|-------|
//! | Power down | 0 | 0 | 0 |
//! | Standby | 1 | 0 | 0 |
//! | Receive | 1 | 1 | 0 |
//! | Transmit | 1 | 1 (pulsed) | 1 |
//!
//! # Transitions
//! - Any mode to power down, always allowed
//! - Power down to standby, waits for the crystal to settle
//! - Standby to receive
//! - Standby or receive to transmit, pulsing TRX_CE to send one packet
//! - Transmit back to standby once the packet has been sent
//!
//! Any other request fails with [`Error::IllegalTransition`] and leaves the lines untouched.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::error::{pin_error, Error};

/// Power down to standby settle time in microseconds
pub const POWER_UP_DELAY_US: u32 = 3_000;

/// Minimum TRX_CE high time to start a transmission in microseconds
pub const CHIP_ENABLE_PULSE_US: u32 = 10;

/// Operating mode of the transceiver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperatingMode {
    /// Everything off, configuration retained
    PowerDown,
    /// Crystal running, radio idle
    Standby,
    /// ShockBurst receive
    Receive,
    /// ShockBurst transmit
    Transmit,
}

impl OperatingMode {
    /// Whether a requested change from `self` to `to` is allowed
    pub fn can_enter(self, to: OperatingMode) -> bool {
        use OperatingMode::*;

        matches!(
            (self, to),
            (_, PowerDown)
                | (PowerDown | Standby, Standby)
                | (Standby | Receive, Receive)
                | (Standby | Receive, Transmit)
        )
    }
}

/// The three mode control lines
pub struct ControlPins<CE, PWR, TXEN> {
    /// TRX_CE, enables receive or transmit
    pub chip_enable: CE,
    /// PWR_UP, powers the chip up
    pub power_up: PWR,
    /// TX_EN, selects transmit over receive
    pub tx_enable: TXEN,
}

/// Tracks the operating mode and drives the control lines to match.
pub struct ModeControl<CE, PWR, TXEN> {
    pins: ControlPins<CE, PWR, TXEN>,
    mode: OperatingMode,
}

impl<CE, PWR, TXEN> ModeControl<CE, PWR, TXEN> {
    /// Current operating mode
    pub fn mode(&self) -> OperatingMode {
        self.mode
    }

    /// Releases the control lines.
    pub fn release(self) -> ControlPins<CE, PWR, TXEN> {
        self.pins
    }

    /// Fails unless the current mode may change to `to`.
    pub fn check(&self, to: OperatingMode) -> Result<(), Error> {
        if self.mode.can_enter(to) {
            Ok(())
        } else {
            Err(Error::IllegalTransition {
                from: self.mode,
                to,
            })
        }
    }
}

impl<CE, PWR, TXEN> ModeControl<CE, PWR, TXEN>
where
    CE: OutputPin,
    PWR: OutputPin,
    TXEN: OutputPin,
{
    /// Takes the control lines and powers the chip down.
    pub fn new(pins: ControlPins<CE, PWR, TXEN>) -> Result<Self, Error> {
        let mut control = Self {
            pins,
            mode: OperatingMode::PowerDown,
        };
        control.power_down()?;
        Ok(control)
    }

    /// Drives all three lines low. Allowed from every mode.
    ///
    /// Every line is driven even when an earlier one fails. The first failure is returned
    /// and the mode is left unchanged.
    pub fn power_down(&mut self) -> Result<(), Error> {
        let power_up = self.pins.power_up.set_low().map_err(pin_error);
        let chip_enable = self.pins.chip_enable.set_low().map_err(pin_error);
        let tx_enable = self.pins.tx_enable.set_low().map_err(pin_error);
        power_up.and(chip_enable).and(tx_enable)?;
        self.enter(OperatingMode::PowerDown);
        Ok(())
    }

    /// Powers the chip up and waits for the crystal to settle.
    ///
    /// Does nothing when already in standby.
    pub fn standby<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error> {
        self.check(OperatingMode::Standby)?;
        if self.mode == OperatingMode::Standby {
            return Ok(());
        }
        self.pins.power_up.set_high().map_err(pin_error)?;
        delay.delay_us(POWER_UP_DELAY_US);
        self.enter(OperatingMode::Standby);
        Ok(())
    }

    /// Raises TRX_CE to start listening.
    ///
    /// Does nothing when already receiving.
    pub fn enable_receive(&mut self) -> Result<(), Error> {
        self.check(OperatingMode::Receive)?;
        if self.mode == OperatingMode::Receive {
            return Ok(());
        }
        self.pins.chip_enable.set_high().map_err(pin_error)?;
        self.enter(OperatingMode::Receive);
        Ok(())
    }

    /// Selects transmit and pulses TRX_CE to send the loaded payload once.
    ///
    /// The chip finishes the packet after TRX_CE drops and returns to standby by itself.
    pub fn start_transmit<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error> {
        self.check(OperatingMode::Transmit)?;
        self.pins.tx_enable.set_high().map_err(pin_error)?;
        self.pins.chip_enable.set_high().map_err(pin_error)?;
        delay.delay_us(CHIP_ENABLE_PULSE_US);
        self.pins.chip_enable.set_low().map_err(pin_error)?;
        self.enter(OperatingMode::Transmit);
        Ok(())
    }

    /// Drops TX_EN once the packet has gone out.
    pub fn finish_transmit(&mut self) -> Result<(), Error> {
        if self.mode != OperatingMode::Transmit {
            return Err(Error::IllegalTransition {
                from: self.mode,
                to: OperatingMode::Standby,
            });
        }
        self.pins.tx_enable.set_low().map_err(pin_error)?;
        self.enter(OperatingMode::Standby);
        Ok(())
    }

    fn enter(&mut self, mode: OperatingMode) {
        #[cfg(feature = "defmt")]
        defmt::trace!("mode {} -> {}", self.mode, mode);
        self.mode = mode;
    }
}
