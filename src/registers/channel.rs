//! Frequency to channel conversion
//!
//! The synthesizer covers two bands selected by HFREQ_PLL:
//!
//! fRF = (422.4 MHz + CH_NO / 10 MHz) * (1 + HFREQ_PLL)
//!
//! | Band | Range | Step |
//! |------|-------|------|
//! | Low  | 422.4 - 473.5 MHz | 100 kHz |
//! | High | 844.8 - 947.0 MHz | 200 kHz |
//!
//! CH_NO is 9 bits wide, so each band holds 512 channels.

use crate::error::ValidationError;

/// Lowest frequency of the low band in Hz
pub const LOW_BAND_MIN_HZ: u32 = 422_400_000;
/// Highest frequency of the low band in Hz
pub const LOW_BAND_MAX_HZ: u32 = 473_500_000;
/// Channel spacing of the low band in Hz
pub const LOW_BAND_STEP_HZ: u32 = 100_000;

/// Lowest frequency of the high band in Hz
pub const HIGH_BAND_MIN_HZ: u32 = 844_800_000;
/// Highest frequency of the high band in Hz
pub const HIGH_BAND_MAX_HZ: u32 = 947_000_000;
/// Channel spacing of the high band in Hz
pub const HIGH_BAND_STEP_HZ: u32 = 200_000;

/// Largest 9-bit channel number
pub const MAX_CHANNEL: u16 = 0x1FF;

/// PLL frequency band (HFREQ_PLL)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PllBand {
    /// 433 MHz band, HFREQ_PLL = 0
    Low,
    /// 868/915 MHz band, HFREQ_PLL = 1
    High,
}

impl PllBand {
    /// Returns true for the high band
    pub fn is_high(self) -> bool {
        matches!(self, Self::High)
    }

    fn base_hz(self) -> u32 {
        match self {
            Self::Low => LOW_BAND_MIN_HZ,
            Self::High => HIGH_BAND_MIN_HZ,
        }
    }

    fn step_hz(self) -> u32 {
        match self {
            Self::Low => LOW_BAND_STEP_HZ,
            Self::High => HIGH_BAND_STEP_HZ,
        }
    }
}

/// A tuned channel: 9-bit channel number plus PLL band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Channel {
    number: u16,
    band: PllBand,
}

impl Channel {
    /// Creates a channel from its raw fields, `None` if `number` does not fit in 9 bits.
    pub fn new(number: u16, band: PllBand) -> Option<Self> {
        (number <= MAX_CHANNEL).then_some(Self { number, band })
    }

    /// Maps a center frequency in Hz to the channel containing it.
    ///
    /// Frequencies between two channels truncate toward the band base.
    ///
    /// # Errors
    /// `ValidationError::Frequency` if `hz` is below the low band, in the gap between the
    /// bands or above the high band.
    pub fn from_frequency(hz: u32) -> Result<Self, ValidationError> {
        let band = match hz {
            LOW_BAND_MIN_HZ..=LOW_BAND_MAX_HZ => PllBand::Low,
            HIGH_BAND_MIN_HZ..=HIGH_BAND_MAX_HZ => PllBand::High,
            _ => return Err(ValidationError::Frequency(hz)),
        };
        let number = ((hz - band.base_hz()) / band.step_hz()) as u16;
        Ok(Self { number, band })
    }

    /// 9-bit channel number (CH_NO)
    pub fn number(self) -> u16 {
        self.number
    }

    /// PLL band (HFREQ_PLL)
    pub fn band(self) -> PllBand {
        self.band
    }

    /// Center frequency of the channel in Hz
    pub fn frequency(self) -> u32 {
        self.band.base_hz() + u32::from(self.number) * self.band.step_hz()
    }
}
