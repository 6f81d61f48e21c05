//! # PLCP Reference Sequences
//!
//! Frequency-domain definitions of the short (S0) and long (S1) training
//! sequences (17.3.3) in FFT-bin order, their time-domain forms derived by
//! inverse transform, and the pilot polarity generator.

use num_complex::Complex32;
use once_cell::sync::Lazy;

use crate::constants::NUM_SUBCARRIERS;
use crate::dsp::fft::Fft64;
use crate::phy::scramble::Lfsr;

/// Occupied bins of the short sequence: subcarriers at multiples of four.
pub const S0_BINS: [usize; 12] = [4, 8, 12, 16, 20, 24, 40, 44, 48, 52, 56, 60];

/// Frequency-domain short training sequence, scaled by sqrt(13/6).
pub static S0_FREQ: Lazy<[Complex32; NUM_SUBCARRIERS]> = Lazy::new(|| {
    let mut s = [Complex32::new(0.0, 0.0); NUM_SUBCARRIERS];
    let a = (13.0f32 / 6.0).sqrt();
    let p = Complex32::new(a, a);
    // (bin, sign): subcarrier k maps to bin k mod 64
    for (bin, sign) in [
        (40, 1.0f32), // k = -24
        (44, -1.0),   // k = -20
        (48, 1.0),    // k = -16
        (52, -1.0),   // k = -12
        (56, -1.0),   // k = -8
        (60, 1.0),    // k = -4
        (4, -1.0),
        (8, -1.0),
        (12, 1.0),
        (16, 1.0),
        (20, 1.0),
        (24, 1.0),
    ] {
        s[bin] = p * sign;
    }
    s
});

/// Frequency-domain long training sequence, subcarriers -26..26.
pub static S1_FREQ: Lazy<[Complex32; NUM_SUBCARRIERS]> = Lazy::new(|| {
    #[rustfmt::skip]
    const L: [f32; 53] = [
        1.0, 1.0, -1.0, -1.0, 1.0, 1.0, -1.0, 1.0, -1.0, 1.0, 1.0, 1.0, 1.0,
        1.0, 1.0, -1.0, -1.0, 1.0, 1.0, -1.0, 1.0, -1.0, 1.0, 1.0, 1.0, 1.0,
        0.0,
        1.0, -1.0, -1.0, 1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0, -1.0, -1.0,
        -1.0, -1.0, 1.0, 1.0, -1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0, 1.0, 1.0,
        1.0,
    ];
    let mut s = [Complex32::new(0.0, 0.0); NUM_SUBCARRIERS];
    for (i, &v) in L.iter().enumerate() {
        let k = i as i32 - 26;
        let bin = k.rem_euclid(NUM_SUBCARRIERS as i32) as usize;
        s[bin] = Complex32::new(v, 0.0);
    }
    s
});

/// Time-domain short sequence, one 64-sample transform (16-sample period
/// repeated four times; Annex G Table G.3).
pub static S0_TIME: Lazy<[Complex32; NUM_SUBCARRIERS]> = Lazy::new(|| {
    let mut buf = *S0_FREQ;
    Fft64::new().inverse(&mut buf);
    buf
});

/// Time-domain long sequence, one 64-sample transform (Annex G Table G.4).
pub static S1_TIME: Lazy<[Complex32; NUM_SUBCARRIERS]> = Lazy::new(|| {
    let mut buf = *S1_FREQ;
    Fft64::new().inverse(&mut buf);
    buf
});

/// Pilot polarity sequence p_0, p_1, ... (17.3.5.9): the scrambler register
/// seeded all-ones, one output per OFDM symbol starting at SIGNAL, with
/// output 0 mapped to +1 and 1 to -1. Period 127.
#[derive(Debug, Clone)]
pub struct PilotSequence {
    lfsr: Lfsr,
}

impl PilotSequence {
    pub fn new() -> Self {
        PilotSequence {
            lfsr: Lfsr::new(0x7f).expect("all-ones seed is valid"),
        }
    }

    /// Polarity for the next OFDM symbol.
    #[inline]
    pub fn next_polarity(&mut self) -> f32 {
        if self.lfsr.step() != 0 {
            -1.0
        } else {
            1.0
        }
    }
}

impl Default for PilotSequence {
    fn default() -> Self {
        Self::new()
    }
}
