//! Radio configuration
//!
//! [`Config`] is the value object handed to [`Nrf905::new`](crate::Nrf905::new) and
//! [`Nrf905::configure`](crate::Nrf905::configure). It is checked with
//! [`Config::validate`] before anything is encoded or sent to the chip.

use heapless::Vec;

use crate::error::ValidationError;
use crate::registers::{AddressWidth, Channel, CrcMode, CrystalFrequency, OutputPower};
use crate::transport::MAX_PAYLOAD;

/// RF configuration of the transceiver
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Center frequency in Hz, 422.4-473.5 MHz or 844.8-947.0 MHz
    pub center_frequency: u32,
    /// PA output power
    pub output_power: OutputPower,
    /// Reduced current in receive mode
    pub reduced_rx_current: bool,
    /// Resend the payload while TRX_CE stays high
    ///
    /// Written to the chip as is, but [`Nrf905::transmit`](crate::Nrf905::transmit) only
    /// pulses TRX_CE, so each call still sends a single packet.
    pub auto_retransmit: bool,
    /// Width of the transmit address
    pub tx_address_width: AddressWidth,
    /// Receive address, its length (1-4) is the receive address width
    pub rx_address: Vec<u8, 4>,
    /// Receive payload width in bytes, at most 32
    pub rx_payload_width: u8,
    /// Transmit payload width in bytes, at most 32
    pub tx_payload_width: u8,
    /// Crystal oscillator frequency
    pub crystal: CrystalFrequency,
    /// CRC check mode
    pub crc: CrcMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            center_frequency: 433_200_000,
            output_power: OutputPower::Minus10Dbm,
            reduced_rx_current: false,
            auto_retransmit: false,
            tx_address_width: AddressWidth::Four,
            rx_address: Vec::from_iter([0xE7; 4]),
            rx_payload_width: MAX_PAYLOAD as u8,
            tx_payload_width: MAX_PAYLOAD as u8,
            crystal: CrystalFrequency::Mhz16,
            crc: CrcMode::Crc16,
        }
    }
}

impl Config {
    /// Replaces the receive address.
    ///
    /// # Errors
    /// `ValidationError::RxAddressWidth` unless `address` is 1 to 4 bytes long.
    pub fn with_rx_address(mut self, address: &[u8]) -> Result<Self, ValidationError> {
        if AddressWidth::from_len(address.len()).is_none() {
            return Err(ValidationError::RxAddressWidth(address.len()));
        }
        self.rx_address = address.iter().copied().collect();
        Ok(self)
    }

    /// Checks that the chip can represent this configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if AddressWidth::from_len(self.rx_address.len()).is_none() {
            return Err(ValidationError::RxAddressWidth(self.rx_address.len()));
        }
        if usize::from(self.rx_payload_width) > MAX_PAYLOAD {
            return Err(ValidationError::RxPayloadWidth(self.rx_payload_width));
        }
        if usize::from(self.tx_payload_width) > MAX_PAYLOAD {
            return Err(ValidationError::TxPayloadWidth(self.tx_payload_width));
        }
        Channel::from_frequency(self.center_frequency)?;
        Ok(())
    }
}
