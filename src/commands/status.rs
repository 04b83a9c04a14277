//! Status register
//!
//! The first byte clocked out of every transaction.

use bitflags::bitflags;

bitflags! {
    /// Status register flags
    ///
    /// # Status Byte Format
    /// - Bit 7: AM, address match
    /// - Bit 5: DR, data ready
    /// - Other bits: unused
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Status: u8 {
        /// A packet with a matching address is being received
        const ADDRESS_MATCH = 1 << 7;
        /// A valid packet was received, or a transmission completed
        const DATA_READY = 1 << 5;
    }
}

impl Status {
    /// AM flag
    pub fn address_match(self) -> bool {
        self.contains(Self::ADDRESS_MATCH)
    }

    /// DR flag
    pub fn data_ready(self) -> bool {
        self.contains(Self::DATA_READY)
    }
}

impl From<u8> for Status {
    fn from(value: u8) -> Self {
        Self::from_bits_truncate(value)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Status {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "Status address match: {}, data ready: {}",
            self.address_match(),
            self.data_ready()
        )
    }
}
