//! RF configuration register
//!
//! The chip keeps its whole RF setup in a 10-byte configuration register that is
//! written with W_CONFIG and read back with R_CONFIG.
//!
//! # Register Layout
//! | Byte | Bits |
//! |------|------|
//! | 0 | CH_NO[7:0] |
//! | 1 | AUTO_RETRAN (5), RX_RED_PWR (4), PA_PWR[1:0] (3:2), HFREQ_PLL (1), CH_NO[8] (0) |
//! | 2 | TX_AFW[2:0] (6:4), RX_AFW[2:0] (2:0) |
//! | 3 | RX_PW[5:0] |
//! | 4 | TX_PW[5:0] |
//! | 5-8 | RX_ADDRESS, byte 0 first |
//! | 9 | CRC_MODE (7), CRC_EN (6), XOF[2:0] (5:3), UP_CLK_EN (2), UP_CLK_FREQ[1:0] (1:0) |
//!
//! The output clock bits of byte 9 are always written as zero.

use heapless::Vec;
use regiface::FromByteArray;

use super::{Channel, PllBand};
use crate::config::Config;
use crate::error::{DecodeError, ValidationError};
use crate::transport::MAX_PAYLOAD;

/// Size of the configuration register in bytes
pub const RF_CONFIG_LEN: usize = 10;

// Byte 1
const AUTO_RETRANSMIT_OFFSET: u8 = 5;
const REDUCED_RX_CURRENT_OFFSET: u8 = 4;
const OUTPUT_POWER_OFFSET: u8 = 2;
const PLL_BAND_OFFSET: u8 = 1;
// Byte 2
const TX_ADDRESS_WIDTH_OFFSET: u8 = 4;
const RX_ADDRESS_WIDTH_OFFSET: u8 = 0;
// Byte 9
const CRC_OFFSET: u8 = 6;
const CRYSTAL_OFFSET: u8 = 3;

const RX_ADDRESS_START: usize = 5;
const PAYLOAD_WIDTH_MASK: u8 = 0x3F;

/// Output power of the power amplifier (PA_PWR)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputPower {
    /// -10 dBm
    #[default]
    Minus10Dbm = 0,
    /// -2 dBm
    Minus2Dbm = 1,
    /// +6 dBm
    Plus6Dbm = 2,
    /// +10 dBm
    Plus10Dbm = 3,
}

impl OutputPower {
    fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Self::Minus10Dbm,
            1 => Self::Minus2Dbm,
            2 => Self::Plus6Dbm,
            _ => Self::Plus10Dbm,
        }
    }
}

/// Address width in bytes (RX_AFW / TX_AFW)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressWidth {
    /// 1 byte
    One = 1,
    /// 2 bytes
    Two = 2,
    /// 3 bytes
    Three = 3,
    /// 4 bytes
    #[default]
    Four = 4,
}

impl AddressWidth {
    /// Width matching an address of `len` bytes, `None` outside 1 to 4.
    pub fn from_len(len: usize) -> Option<Self> {
        match len {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            3 => Some(Self::Three),
            4 => Some(Self::Four),
            _ => None,
        }
    }

    /// Width in bytes
    pub fn bytes(self) -> usize {
        self as usize
    }
}

/// Crystal oscillator frequency (XOF)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CrystalFrequency {
    /// 4 MHz
    Mhz4 = 0,
    /// 8 MHz
    Mhz8 = 1,
    /// 12 MHz
    Mhz12 = 2,
    /// 16 MHz
    #[default]
    Mhz16 = 3,
    /// 20 MHz
    Mhz20 = 4,
}

impl CrystalFrequency {
    fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::Mhz4),
            1 => Some(Self::Mhz8),
            2 => Some(Self::Mhz12),
            3 => Some(Self::Mhz16),
            4 => Some(Self::Mhz20),
            _ => None,
        }
    }
}

/// CRC check mode
///
/// Packed into CRC_MODE (bit 7) and CRC_EN (bit 6). CRC_MODE has no meaning while
/// CRC_EN is clear, so only three of the four bit patterns are distinct modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CrcMode {
    /// No CRC, `0b00`
    Disabled,
    /// 8-bit CRC, `0b01`
    Crc8,
    /// 16-bit CRC, `0b11`
    #[default]
    Crc16,
}

impl CrcMode {
    /// Two-bit field value, CRC_MODE in bit 1 and CRC_EN in bit 0
    pub fn bits(self) -> u8 {
        match self {
            Self::Disabled => 0b00,
            Self::Crc8 => 0b01,
            Self::Crc16 => 0b11,
        }
    }

    fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b01 => Self::Crc8,
            0b11 => Self::Crc16,
            _ => Self::Disabled,
        }
    }
}

/// Contents of the 10-byte RF configuration register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RfConfig {
    /// Channel number and PLL band
    pub channel: Channel,
    /// PA output power
    pub output_power: OutputPower,
    /// Reduced current in receive mode, at the cost of sensitivity
    pub reduced_rx_current: bool,
    /// Keep resending the TX payload while TRX_CE is held high, which the driver never does
    pub auto_retransmit: bool,
    /// Width of the transmit address
    pub tx_address_width: AddressWidth,
    /// Width of the receive address
    pub rx_address_width: AddressWidth,
    /// Receive payload width in bytes (0-32)
    pub rx_payload_width: u8,
    /// Transmit payload width in bytes (0-32)
    pub tx_payload_width: u8,
    /// Receive address, only the first `rx_address_width` bytes are significant
    pub rx_address: [u8; 4],
    /// Crystal oscillator frequency
    pub crystal: CrystalFrequency,
    /// CRC check mode
    pub crc: CrcMode,
}

impl RfConfig {
    /// The significant bytes of the receive address
    pub fn rx_address(&self) -> &[u8] {
        &self.rx_address[..self.rx_address_width.bytes()]
    }

    /// Center frequency of the configured channel in Hz
    pub fn center_frequency(&self) -> u32 {
        self.channel.frequency()
    }

    /// Encodes the register image.
    ///
    /// Receive address bytes beyond the configured width are written as zero.
    pub fn encode(&self) -> [u8; RF_CONFIG_LEN] {
        let mut data = [0u8; RF_CONFIG_LEN];
        let channel = self.channel.number();

        data[0] = (channel & 0xFF) as u8;
        data[1] = (self.auto_retransmit as u8) << AUTO_RETRANSMIT_OFFSET
            | (self.reduced_rx_current as u8) << REDUCED_RX_CURRENT_OFFSET
            | (self.output_power as u8) << OUTPUT_POWER_OFFSET
            | (self.channel.band().is_high() as u8) << PLL_BAND_OFFSET
            | (channel >> 8) as u8 & 0x01;
        data[2] = (self.tx_address_width as u8) << TX_ADDRESS_WIDTH_OFFSET
            | (self.rx_address_width as u8) << RX_ADDRESS_WIDTH_OFFSET;
        data[3] = self.rx_payload_width & PAYLOAD_WIDTH_MASK;
        data[4] = self.tx_payload_width & PAYLOAD_WIDTH_MASK;

        let address = self.rx_address();
        data[RX_ADDRESS_START..RX_ADDRESS_START + address.len()].copy_from_slice(address);

        data[9] = self.crc.bits() << CRC_OFFSET | (self.crystal as u8) << CRYSTAL_OFFSET;
        data
    }

    /// Decodes a register image read back from the chip.
    ///
    /// # Errors
    /// `DecodeError` when an address width, a payload width or the crystal field holds a
    /// value the chip does not define.
    pub fn decode(data: [u8; RF_CONFIG_LEN]) -> Result<Self, DecodeError> {
        let number = u16::from(data[1] & 0x01) << 8 | u16::from(data[0]);
        let band = if data[1] >> PLL_BAND_OFFSET & 0x01 == 1 {
            PllBand::High
        } else {
            PllBand::Low
        };
        // 9 bits never exceed MAX_CHANNEL
        let channel = Channel::new(number, band).ok_or(DecodeError {
            offset: 1,
            value: data[1],
        })?;

        let width = |bits: u8| {
            AddressWidth::from_len(usize::from(bits & 0x07)).ok_or(DecodeError {
                offset: 2,
                value: data[2],
            })
        };
        let payload_width = |offset: usize| {
            let width = data[offset] & PAYLOAD_WIDTH_MASK;
            if usize::from(width) > MAX_PAYLOAD {
                Err(DecodeError {
                    offset,
                    value: data[offset],
                })
            } else {
                Ok(width)
            }
        };
        let crystal = CrystalFrequency::from_bits(data[9] >> CRYSTAL_OFFSET & 0x07).ok_or(
            DecodeError {
                offset: 9,
                value: data[9],
            },
        )?;

        let mut rx_address = [0u8; 4];
        rx_address.copy_from_slice(&data[RX_ADDRESS_START..RX_ADDRESS_START + 4]);

        Ok(Self {
            channel,
            output_power: OutputPower::from_bits(data[1] >> OUTPUT_POWER_OFFSET),
            reduced_rx_current: data[1] >> REDUCED_RX_CURRENT_OFFSET & 0x01 == 1,
            auto_retransmit: data[1] >> AUTO_RETRANSMIT_OFFSET & 0x01 == 1,
            tx_address_width: width(data[2] >> TX_ADDRESS_WIDTH_OFFSET)?,
            rx_address_width: width(data[2] >> RX_ADDRESS_WIDTH_OFFSET)?,
            rx_payload_width: payload_width(3)?,
            tx_payload_width: payload_width(4)?,
            rx_address,
            crystal,
            crc: CrcMode::from_bits(data[9] >> CRC_OFFSET),
        })
    }
}

impl TryFrom<&Config> for RfConfig {
    type Error = ValidationError;

    fn try_from(config: &Config) -> Result<Self, Self::Error> {
        config.validate()?;
        let channel = Channel::from_frequency(config.center_frequency)?;
        let rx_address_width = AddressWidth::from_len(config.rx_address.len())
            .ok_or(ValidationError::RxAddressWidth(config.rx_address.len()))?;

        let mut rx_address = [0u8; 4];
        rx_address[..rx_address_width.bytes()].copy_from_slice(&config.rx_address);

        Ok(Self {
            channel,
            output_power: config.output_power,
            reduced_rx_current: config.reduced_rx_current,
            auto_retransmit: config.auto_retransmit,
            tx_address_width: config.tx_address_width,
            rx_address_width,
            rx_payload_width: config.rx_payload_width,
            tx_payload_width: config.tx_payload_width,
            rx_address,
            crystal: config.crystal,
            crc: config.crc,
        })
    }
}

impl From<&RfConfig> for Config {
    fn from(rf: &RfConfig) -> Self {
        Self {
            center_frequency: rf.center_frequency(),
            output_power: rf.output_power,
            reduced_rx_current: rf.reduced_rx_current,
            auto_retransmit: rf.auto_retransmit,
            tx_address_width: rf.tx_address_width,
            rx_address: rf.rx_address().iter().copied().collect::<Vec<u8, 4>>(),
            rx_payload_width: rf.rx_payload_width,
            tx_payload_width: rf.tx_payload_width,
            crystal: rf.crystal,
            crc: rf.crc,
        }
    }
}

impl FromByteArray for RfConfig {
    type Error = DecodeError;
    type Array = [u8; RF_CONFIG_LEN];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Self::decode(bytes)
    }
}
