//! Error types for the nRF905 driver.

use core::fmt;

use embedded_hal::{digital, spi};

use crate::mode::OperatingMode;

/// A configuration or argument that the chip cannot represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValidationError {
    /// The receive address must be 1 to 4 bytes long.
    RxAddressWidth(usize),
    /// The receive payload width exceeds 32 bytes.
    RxPayloadWidth(u8),
    /// The transmit payload width exceeds 32 bytes.
    TxPayloadWidth(u8),
    /// The center frequency (Hz) lies outside both PLL bands.
    Frequency(u32),
    /// A single transaction cannot carry more than 32 payload bytes.
    PayloadLength(usize),
    /// The transmit address must be 1 to 4 bytes long.
    TxAddressLength(usize),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RxAddressWidth(len) => write!(f, "invalid RX address width {len}"),
            Self::RxPayloadWidth(width) => write!(f, "RX payload width {width} too large"),
            Self::TxPayloadWidth(width) => write!(f, "TX payload width {width} too large"),
            Self::Frequency(hz) => write!(f, "center frequency {hz} Hz not supported"),
            Self::PayloadLength(len) => write!(f, "payload of {len} bytes too large"),
            Self::TxAddressLength(len) => write!(f, "invalid TX address length {len}"),
        }
    }
}

/// A register image holding a field value the chip does not define.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecodeError {
    /// Byte offset within the register image
    pub offset: usize,
    /// The offending byte
    pub value: u8,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid value {:#04x} at register offset {}",
            self.value, self.offset
        )
    }
}

/// The main error type for the nRF905 driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Bad configuration or argument, nothing was sent to the chip.
    Validation(ValidationError),
    /// The SPI exchange failed.
    Transport(spi::ErrorKind),
    /// Driving or sampling a GPIO line failed.
    Pin(digital::ErrorKind),
    /// The requested mode change is not allowed from the current mode.
    IllegalTransition {
        /// Mode the chip was in
        from: OperatingMode,
        /// Mode that was requested
        to: OperatingMode,
    },
    /// No edge arrived before the deadline.
    Timeout,
    /// Carrier detect was requested but no line is wired.
    Unavailable,
    /// Data ready is already high from a received packet that was never read.
    DataPending,
    /// The configuration register read back holds an undefined field value.
    Decode(DecodeError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "validation: {err}"),
            Self::Transport(kind) => write!(f, "SPI transfer failed: {kind:?}"),
            Self::Pin(kind) => write!(f, "GPIO failed: {kind:?}"),
            Self::IllegalTransition { from, to } => {
                write!(f, "illegal transition from {from:?} to {to:?}")
            }
            Self::Timeout => write!(f, "timed out waiting for data ready"),
            Self::Unavailable => write!(f, "carrier detect not connected"),
            Self::DataPending => write!(f, "received packet not read yet"),
            Self::Decode(err) => write!(f, "decode: {err}"),
        }
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Error::Validation(err)
    }
}

impl From<DecodeError> for Error {
    fn from(err: DecodeError) -> Self {
        Error::Decode(err)
    }
}

pub(crate) fn bus_error<E: spi::Error>(err: E) -> Error {
    Error::Transport(err.kind())
}

pub(crate) fn pin_error<E: digital::Error>(err: E) -> Error {
    Error::Pin(err.kind())
}
