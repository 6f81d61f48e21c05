//! # Constellation Mapper / Demapper
//!
//! Gray-coded BPSK, QPSK, 16-QAM and 64-QAM per 17.3.5.7, normalized by
//! KMOD so every scheme carries unit average power. The demapper produces
//! soft-decision bytes in the 0/127/255 convention using the usual
//! piecewise-linear max-log approximations, saturating one constellation
//! step away from a decision boundary.
//!
//! A symbol value packs nbpsc bits with the first transmitted bit in the
//! most significant position; for the quadrature schemes the first half of
//! the bits selects I, the second half Q.

use num_complex::Complex32;

use crate::phy::rate::Modulation;

/// Normalization factors: 1, 1/sqrt(2), 1/sqrt(10), 1/sqrt(42).
const KMOD_QPSK: f32 = 0.70710678;
const KMOD_QAM16: f32 = 0.31622777;
const KMOD_QAM64: f32 = 0.15430335;

/// Gray map for one 16-QAM axis, indexed by the 2-bit pair.
const QAM16_LEVEL: [f32; 4] = [-3.0, -1.0, 3.0, 1.0];

/// Gray map for one 64-QAM axis, indexed by the 3-bit triple.
const QAM64_LEVEL: [f32; 8] = [-7.0, -5.0, -1.0, -3.0, 7.0, 5.0, 1.0, 3.0];

/// Bits per subcarrier for a modulation scheme.
pub fn bits_per_symbol(modulation: Modulation) -> usize {
    match modulation {
        Modulation::Bpsk => 1,
        Modulation::Qpsk => 2,
        Modulation::Qam16 => 4,
        Modulation::Qam64 => 6,
    }
}

/// Map an nbpsc-bit symbol value onto a constellation point.
pub fn modulate(modulation: Modulation, sym: u8) -> Complex32 {
    match modulation {
        Modulation::Bpsk => Complex32::new(if sym & 1 != 0 { 1.0 } else { -1.0 }, 0.0),
        Modulation::Qpsk => Complex32::new(
            if sym & 2 != 0 { KMOD_QPSK } else { -KMOD_QPSK },
            if sym & 1 != 0 { KMOD_QPSK } else { -KMOD_QPSK },
        ),
        Modulation::Qam16 => Complex32::new(
            QAM16_LEVEL[(sym >> 2 & 3) as usize] * KMOD_QAM16,
            QAM16_LEVEL[(sym & 3) as usize] * KMOD_QAM16,
        ),
        Modulation::Qam64 => Complex32::new(
            QAM64_LEVEL[(sym >> 3 & 7) as usize] * KMOD_QAM64,
            QAM64_LEVEL[(sym & 7) as usize] * KMOD_QAM64,
        ),
    }
}

#[inline]
fn soft(llr: f32) -> u8 {
    (127.5 + 127.5 * llr).clamp(0.0, 255.0) as u8
}

/// Soft bit metrics for one axis carrying `bits` Gray-coded bits at odd
/// levels up to `2^bits - 1`, written most significant first.
#[inline]
fn axis_soft(d: f32, bits: usize, out: &mut [u8]) {
    match bits {
        1 => out[0] = soft(d),
        2 => {
            out[0] = soft(d);
            out[1] = soft(2.0 - d.abs());
        }
        3 => {
            out[0] = soft(d);
            out[1] = soft(4.0 - d.abs());
            out[2] = soft(2.0 - (d.abs() - 4.0).abs());
        }
        _ => unreachable!(),
    }
}

/// Demap a received point into nbpsc soft-decision bytes.
pub fn demodulate_soft(modulation: Modulation, x: Complex32, out: &mut [u8]) {
    match modulation {
        Modulation::Bpsk => out[0] = soft(x.re),
        Modulation::Qpsk => {
            axis_soft(x.re / KMOD_QPSK, 1, &mut out[0..1]);
            axis_soft(x.im / KMOD_QPSK, 1, &mut out[1..2]);
        }
        Modulation::Qam16 => {
            axis_soft(x.re / KMOD_QAM16, 2, &mut out[0..2]);
            axis_soft(x.im / KMOD_QAM16, 2, &mut out[2..4]);
        }
        Modulation::Qam64 => {
            axis_soft(x.re / KMOD_QAM64, 3, &mut out[0..3]);
            axis_soft(x.im / KMOD_QAM64, 3, &mut out[3..6]);
        }
    }
}

/// Hard decision: the symbol value whose constellation point is implied by
/// the soft metrics' signs.
pub fn demodulate_hard(modulation: Modulation, x: Complex32) -> u8 {
    let mut softbits = [0u8; 6];
    let n = bits_per_symbol(modulation);
    demodulate_soft(modulation, x, &mut softbits[..n]);
    let mut sym = 0u8;
    for &s in &softbits[..n] {
        sym = (sym << 1) | (s >= 128) as u8;
    }
    sym
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_mods() -> [Modulation; 4] {
        [
            Modulation::Bpsk,
            Modulation::Qpsk,
            Modulation::Qam16,
            Modulation::Qam64,
        ]
    }

    #[test]
    fn test_unit_average_power() {
        for modulation in all_mods() {
            let n = 1usize << bits_per_symbol(modulation);
            let power: f32 = (0..n)
                .map(|s| modulate(modulation, s as u8).norm_sqr())
                .sum::<f32>()
                / n as f32;
            assert!((power - 1.0).abs() < 1e-3, "{modulation:?}: {power}");
        }
    }

    #[test]
    fn test_gray_neighbors_differ_by_one_bit() {
        // Walk the 64-QAM I axis in level order; adjacent levels must flip
        // exactly one bit of the 3-bit group.
        let mut by_level: Vec<(i32, u8)> = (0..8u8)
            .map(|g| (QAM64_LEVEL[g as usize] as i32, g))
            .collect();
        by_level.sort();
        for w in by_level.windows(2) {
            let diff = (w[0].1 ^ w[1].1).count_ones();
            assert_eq!(diff, 1, "levels {} and {}", w[0].0, w[1].0);
        }
    }

    #[test]
    fn test_hard_roundtrip_clean_points() {
        for modulation in all_mods() {
            let n = 1usize << bits_per_symbol(modulation);
            for s in 0..n as u8 {
                let x = modulate(modulation, s);
                assert_eq!(demodulate_hard(modulation, x), s, "{modulation:?} sym {s}");
            }
        }
    }

    #[test]
    fn test_soft_saturates_on_clean_bpsk() {
        let mut out = [0u8; 1];
        demodulate_soft(Modulation::Bpsk, Complex32::new(1.0, 0.0), &mut out);
        assert_eq!(out[0], 255);
        demodulate_soft(Modulation::Bpsk, Complex32::new(-1.0, 0.0), &mut out);
        assert_eq!(out[0], 0);
        demodulate_soft(Modulation::Bpsk, Complex32::new(0.0, 0.4), &mut out);
        assert!((126..=129).contains(&out[0]));
    }

    #[test]
    fn test_soft_hard_agree_under_noise() {
        for modulation in all_mods() {
            let n = 1usize << bits_per_symbol(modulation);
            let nbits = bits_per_symbol(modulation);
            for s in 0..n as u8 {
                let x = modulate(modulation, s) + Complex32::new(0.02, -0.015);
                let mut softbits = [0u8; 6];
                demodulate_soft(modulation, x, &mut softbits[..nbits]);
                for (i, &sb) in softbits[..nbits].iter().enumerate() {
                    let want = (s >> (nbits - 1 - i)) & 1;
                    assert_eq!((sb >= 128) as u8, want, "{modulation:?} sym {s} bit {i}");
                }
            }
        }
    }
}
