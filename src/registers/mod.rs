//! Register definitions for the nRF905
//! Derived from the nRF905 Product Specification v1.5

mod channel;
mod rf_config;

pub use channel::*;
pub use rf_config::*;
