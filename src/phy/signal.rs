//! # SIGNAL Field Codec
//!
//! Packs and unpacks the 24-bit PLCP SIGNAL header (17.3.4): 4-bit RATE,
//! one reserved bit, 12-bit LENGTH transmitted LSB-first, one even-parity
//! bit over the preceding 17 bits, and six tail zeros for the half-rate
//! convolutional code.

use crate::constants::{MAX_FRAME_LEN, SIGNAL_DEC_BYTES};
use crate::error::WlanError;
use crate::phy::rate::RateCode;
use crate::util::bits::{get_bit, set_bit};

/// Decoded SIGNAL header contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signal {
    pub rate: RateCode,
    /// Reserved bit, zero on transmit.
    pub reserved: u8,
    /// PSDU length in bytes, 1..=4095.
    pub length: usize,
}

impl Signal {
    pub fn new(rate: RateCode, length: usize) -> Result<Self, WlanError> {
        if length == 0 || length > MAX_FRAME_LEN {
            return Err(WlanError::InvalidLength { length });
        }
        Ok(Signal {
            rate,
            reserved: 0,
            length,
        })
    }

    /// Pack into three bytes in transmission bit order (MSB-first).
    pub fn pack(&self) -> [u8; SIGNAL_DEC_BYTES] {
        let mut out = [0u8; SIGNAL_DEC_BYTES];
        let rate_bits = self.rate.signal_bits();

        // b0..b3: R1..R4, R1 first
        for i in 0..4 {
            set_bit(&mut out, i, (rate_bits >> (3 - i)) & 1);
        }
        // b4: reserved
        set_bit(&mut out, 4, self.reserved & 1);
        // b5..b16: LENGTH, LSB first
        for i in 0..12 {
            set_bit(&mut out, 5 + i, ((self.length >> i) & 1) as u8);
        }
        // b17: even parity over b0..b16
        let ones: u8 = (0..17).map(|i| get_bit(&out, i)).sum();
        set_bit(&mut out, 17, ones & 1);
        // b18..b23 stay zero (tail)
        out
    }

    /// Unpack from three bytes, distinguishing a parity failure from
    /// rate/length range errors.
    pub fn unpack(packed: &[u8; SIGNAL_DEC_BYTES]) -> Result<Self, WlanError> {
        let ones: u32 = (0..18).map(|i| get_bit(packed, i) as u32).sum();
        if ones % 2 != 0 {
            return Err(WlanError::SignalParity);
        }

        let mut rate_bits = 0u8;
        for i in 0..4 {
            rate_bits = (rate_bits << 1) | get_bit(packed, i);
        }
        let rate = RateCode::from_signal_bits(rate_bits)?;

        let mut length = 0usize;
        for i in 0..12 {
            length |= (get_bit(packed, 5 + i) as usize) << i;
        }
        if length == 0 {
            return Err(WlanError::InvalidLength { length });
        }

        Ok(Signal {
            rate,
            reserved: get_bit(packed, 4),
            length,
        })
    }
}
