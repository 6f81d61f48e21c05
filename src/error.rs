//! # PHY Error Handling
//!
//! This module defines the WlanError enum, which represents the different error
//! types that can occur in the wlan-rs crate.

use thiserror::Error;

/// Represents the different error types that can occur in the PHY crate.
///
/// Configuration errors are reported synchronously from constructors and
/// encode entry points. Decode-side failures (SIGNAL parity, out-of-range
/// rate/length) cross the synchronizer boundary as an invalid frame event
/// rather than an `Err`; the variants here let the SIGNAL codec distinguish
/// the causes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WlanError {
    /// Rate code outside the eight 802.11a/g speeds.
    #[error("Invalid rate code: {0}")]
    InvalidRate(u8),

    /// Payload length outside 1..=4095 bytes.
    #[error("Invalid frame length: {length} (must be 1..=4095)")]
    InvalidLength { length: usize },

    /// Scrambler seed zero or wider than 7 bits.
    #[error("Invalid scrambler seed: 0x{seed:02X} (must be nonzero, 7 bits)")]
    InvalidSeed { seed: u8 },

    /// SIGNAL field R1..R4 bits do not name a rate.
    #[error("Unknown SIGNAL rate bits: 0b{bits:04b}")]
    InvalidSignalRate { bits: u8 },

    /// SIGNAL field failed its even-parity check.
    #[error("SIGNAL parity check failed")]
    SignalParity,

    /// Caller-supplied buffer does not match the rate-derived size.
    #[error("Buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSize { expected: usize, actual: usize },

    /// Overlap window length larger than the cyclic prefix.
    #[error("Invalid window length: {0} (must be 1..=16)")]
    InvalidWindowLen(usize),
}
