#![cfg_attr(not(test), no_std)]
//! nRF905 Radio Driver
//!
//! This crate provides a type-safe interface for the Nordic nRF905 sub-GHz transceiver.
//! The nRF905 is a single chip radio for the 433/868/915 MHz ISM bands with a ShockBurst
//! engine that handles preamble, address and CRC on its own.
//!
//! # Features
//! - Frequency range: 422.4-473.5 MHz and 844.8-947.0 MHz
//! - Output power: -10, -2, +6 and +10 dBm
//! - 1 to 4 byte addresses, payloads up to 32 bytes
//! - Optional 8 or 16 bit CRC
//! - Address match, data ready and carrier detect status lines
//!
//! # Architecture
//! The driver is organized into several modules:
//!
//! - [`device`]: [`Nrf905`], the driver itself
//!   - Owns the bus, the control lines and the operating mode
//!   - Configuration, transmit and receive
//!
//! - [`registers`]: The 10-byte RF configuration register and its fields
//! - [`commands`]: SPI instruction set and the status register
//! - [`transport`]: Instruction framing over the SPI bus
//! - [`mode`]: Operating modes and the TRX_CE / PWR_UP / TX_EN lines
//! - [`lines`]: Address match, data ready and carrier detect sources
//! - [`config`]: The [`Config`] value object
//!
//! # Usage
//! Configuration follows a specific sequence:
//!
//! 1. Build a [`Config`] and the [`ControlPins`]
//! 2. Pick the [`StatusLines`], register polling or wired pins
//! 3. Create the [`Nrf905`], which powers the chip down and writes the configuration
//! 4. Enter standby
//! 5. Receive or transmit
//!
//! # Important Notes
//! - Receive mode is only reachable from standby
//! - A transmission returns to standby once data ready rises
//! - Carrier detect has no status register bit, it needs its pin
//! - A configuration read back that differs from what was written is reported, not raised
//!
//! # Example
//! ```ignore
//! use core::time::Duration;
//! use nrf905::{Config, ControlPins, Error, Nrf905, PolledEdge, StatusLines};
//!
//! let lines = StatusLines::polled().with_data_ready(PolledEdge::new(dr, delay.clone()));
//! let pins = ControlPins { chip_enable: ce, power_up: pwr, tx_enable: txen };
//!
//! let mut radio = Nrf905::new(spi, pins, lines, delay, &Config::default())?;
//! radio.standby()?;
//! radio.transmit(Duration::from_millis(50), b"hello")?;
//! ```

pub mod commands;
pub mod config;
pub mod device;
pub mod error;
pub mod lines;
pub mod mode;
pub mod registers;
pub mod transport;

pub use commands::{ReadInstruction, Status, WriteInstruction};
pub use config::Config;
pub use device::{Nrf905, Verification};
pub use error::*;
pub use lines::*;
pub use mode::*;
pub use registers::*;
pub use transport::{Transport, MAX_PAYLOAD};
