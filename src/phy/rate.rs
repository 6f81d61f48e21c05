//! # Rate-Dependent Parameters
//!
//! This module defines the eight 802.11a/g data rates and their derived
//! modulation and coding parameters (Table 78 of IEEE 802.11-2007), plus the
//! 4-bit SIGNAL-field rate encodings (Table 80).

use crate::error::WlanError;

/// Primitive data rate of a frame, in Mbit/s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateCode {
    R6,
    R9,
    R12,
    R18,
    R24,
    R36,
    R48,
    R54,
}

/// Subcarrier modulation scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modulation {
    Bpsk,
    Qpsk,
    Qam16,
    Qam64,
}

/// Convolutional code rate after puncturing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FecRate {
    Half,
    TwoThirds,
    ThreeQuarters,
}

/// Rate-dependent parameter tuple (Table 78).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateParams {
    /// Subcarrier modulation scheme
    pub modulation: Modulation,
    /// Forward error-correction code rate
    pub fec: FecRate,
    /// Coded bits per subcarrier (modulation depth)
    pub nbpsc: usize,
    /// Coded bits per OFDM symbol
    pub ncbps: usize,
    /// Data bits per OFDM symbol
    pub ndbps: usize,
}

impl RateCode {
    /// All rates, in increasing speed order.
    pub const ALL: [RateCode; 8] = [
        RateCode::R6,
        RateCode::R9,
        RateCode::R12,
        RateCode::R18,
        RateCode::R24,
        RateCode::R36,
        RateCode::R48,
        RateCode::R54,
    ];

    /// Rate in Mbit/s.
    pub fn mbps(self) -> u8 {
        match self {
            RateCode::R6 => 6,
            RateCode::R9 => 9,
            RateCode::R12 => 12,
            RateCode::R18 => 18,
            RateCode::R24 => 24,
            RateCode::R36 => 36,
            RateCode::R48 => 48,
            RateCode::R54 => 54,
        }
    }

    /// Modulation/coding parameters per Table 78.
    pub fn params(self) -> RateParams {
        match self {
            RateCode::R6 => RateParams {
                modulation: Modulation::Bpsk,
                fec: FecRate::Half,
                nbpsc: 1,
                ncbps: 48,
                ndbps: 24,
            },
            RateCode::R9 => RateParams {
                modulation: Modulation::Bpsk,
                fec: FecRate::ThreeQuarters,
                nbpsc: 1,
                ncbps: 48,
                ndbps: 36,
            },
            RateCode::R12 => RateParams {
                modulation: Modulation::Qpsk,
                fec: FecRate::Half,
                nbpsc: 2,
                ncbps: 96,
                ndbps: 48,
            },
            RateCode::R18 => RateParams {
                modulation: Modulation::Qpsk,
                fec: FecRate::ThreeQuarters,
                nbpsc: 2,
                ncbps: 96,
                ndbps: 72,
            },
            RateCode::R24 => RateParams {
                modulation: Modulation::Qam16,
                fec: FecRate::Half,
                nbpsc: 4,
                ncbps: 192,
                ndbps: 96,
            },
            RateCode::R36 => RateParams {
                modulation: Modulation::Qam16,
                fec: FecRate::ThreeQuarters,
                nbpsc: 4,
                ncbps: 192,
                ndbps: 144,
            },
            RateCode::R48 => RateParams {
                modulation: Modulation::Qam64,
                fec: FecRate::TwoThirds,
                nbpsc: 6,
                ncbps: 288,
                ndbps: 192,
            },
            RateCode::R54 => RateParams {
                modulation: Modulation::Qam64,
                fec: FecRate::ThreeQuarters,
                nbpsc: 6,
                ncbps: 288,
                ndbps: 216,
            },
        }
    }

    /// 4-bit R1..R4 SIGNAL-field encoding per Table 80, R1 in the MSB.
    pub fn signal_bits(self) -> u8 {
        match self {
            RateCode::R6 => 0b1101,
            RateCode::R9 => 0b1111,
            RateCode::R12 => 0b0101,
            RateCode::R18 => 0b0111,
            RateCode::R24 => 0b1001,
            RateCode::R36 => 0b1011,
            RateCode::R48 => 0b0001,
            RateCode::R54 => 0b0011,
        }
    }

    /// Inverse of [`signal_bits`](Self::signal_bits).
    pub fn from_signal_bits(bits: u8) -> Result<RateCode, WlanError> {
        match bits {
            0b1101 => Ok(RateCode::R6),
            0b1111 => Ok(RateCode::R9),
            0b0101 => Ok(RateCode::R12),
            0b0111 => Ok(RateCode::R18),
            0b1001 => Ok(RateCode::R24),
            0b1011 => Ok(RateCode::R36),
            0b0001 => Ok(RateCode::R48),
            0b0011 => Ok(RateCode::R54),
            _ => Err(WlanError::InvalidSignalRate { bits }),
        }
    }
}

impl TryFrom<u8> for RateCode {
    type Error = WlanError;

    /// Accepts the Mbit/s number (6, 9, 12, 18, 24, 36, 48, 54).
    fn try_from(mbps: u8) -> Result<Self, Self::Error> {
        match mbps {
            6 => Ok(RateCode::R6),
            9 => Ok(RateCode::R9),
            12 => Ok(RateCode::R12),
            18 => Ok(RateCode::R18),
            24 => Ok(RateCode::R24),
            36 => Ok(RateCode::R36),
            48 => Ok(RateCode::R48),
            54 => Ok(RateCode::R54),
            other => Err(WlanError::InvalidRate(other)),
        }
    }
}
