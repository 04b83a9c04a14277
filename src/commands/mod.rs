//! SPI instruction set
//!
//! Every transaction starts with a single instruction byte. While that byte is clocked
//! in, the chip clocks out its status register, so each transaction also yields a
//! [`Status`].
//!
//! # Instruction Table
//! | Instruction | Code | Payload |
//! |-------------|------|---------|
//! | W_CONFIG | `0x00` | 10 configuration bytes |
//! | R_CONFIG | `0x10` | 10 configuration bytes |
//! | W_TX_PAYLOAD | `0x20` | up to 32 bytes |
//! | R_TX_PAYLOAD | `0x21` | up to 32 bytes |
//! | W_TX_ADDRESS | `0x22` | up to 4 bytes |
//! | R_TX_ADDRESS | `0x23` | 4 bytes |
//! | R_RX_PAYLOAD | `0x24` | up to 32 bytes |
//! | CHANNEL_CONFIG | `0b1000_pphc` | `cccc_cccc` |
//! | Status | `0xFF` | none |
//!
//! # Important Notes
//! - Reads clock out `0xFF` filler while the data comes back
//! - CHANNEL_CONFIG carries PA_PWR, HFREQ_PLL and CH_NO[8] in its instruction byte
//! - A transaction never carries more than 32 payload bytes

mod status;

pub use status::*;

use crate::registers::{Channel, OutputPower};

/// Instructions that send data to the chip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WriteInstruction {
    /// W_CONFIG starting at byte 0
    RfConfig,
    /// W_TX_PAYLOAD
    TxPayload,
    /// W_TX_ADDRESS
    TxAddress,
    /// CHANNEL_CONFIG, followed by CH_NO[7:0]
    ChannelConfig {
        /// Channel to tune to
        channel: Channel,
        /// PA output power
        power: OutputPower,
    },
}

impl WriteInstruction {
    /// Instruction byte sent on the bus
    pub fn opcode(self) -> u8 {
        match self {
            Self::RfConfig => 0x00,
            Self::TxPayload => 0x20,
            Self::TxAddress => 0x22,
            Self::ChannelConfig { channel, power } => {
                0x80 | (power as u8) << 2
                    | (channel.band().is_high() as u8) << 1
                    | (channel.number() >> 8) as u8 & 0x01
            }
        }
    }
}

/// Instructions that fetch data from the chip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ReadInstruction {
    /// R_CONFIG starting at byte 0
    RfConfig = 0x10,
    /// R_TX_PAYLOAD
    TxPayload = 0x21,
    /// R_TX_ADDRESS
    TxAddress = 0x23,
    /// R_RX_PAYLOAD
    RxPayload = 0x24,
    /// Status register only
    Status = 0xFF,
}

impl ReadInstruction {
    /// Instruction byte sent on the bus
    pub fn opcode(self) -> u8 {
        self as u8
    }
}
