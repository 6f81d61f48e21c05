//! # Convolutional Codec
//!
//! Rate-1/2, constraint-length-7 convolutional coding over the NASA
//! generator pair (0x6D, 0x4F), with cyclic puncturing to rates 2/3 and 3/4
//! (17.3.5.6). The encoder emits the A bit then the B bit per input bit,
//! packed MSB-first; the decoder is a maximum-likelihood soft-decision
//! Viterbi over 64 states with full traceback.
//!
//! Soft-decision bytes use the boundary convention of [`crate::constants`]:
//! 0 = confident 0, 255 = confident 1, 127 = erasure. Punctured positions
//! are re-inserted as erasures before decoding.

use crate::constants::{SOFTBIT_1, SOFTBIT_ERASURE, SIGNAL_DEC_BITS, SIGNAL_DEC_BYTES, SIGNAL_ENC_BYTES};
use crate::phy::rate::FecRate;
use crate::util::bits::{get_bit, set_bit};

/// Generator polynomials, oldest register bit in the MSB.
const GENPOLY_A: u8 = 0x6d;
const GENPOLY_B: u8 = 0x4f;

/// Rate-2/3 puncturing matrix, rows (A; B), period 6.
const PMATRIX_R2_3: [u8; 12] = [
    1, 1, 1, 1, 1, 1, //
    1, 0, 1, 0, 1, 0,
];

/// Rate-3/4 puncturing matrix, rows (A; B), period 9.
const PMATRIX_R3_4: [u8; 18] = [
    1, 1, 0, 1, 1, 0, 1, 1, 0, //
    1, 0, 1, 1, 0, 1, 1, 0, 1,
];

/// Puncturing schedule for one code rate.
struct Puncture {
    /// 2 x `period` keep mask; empty means unpunctured.
    pmatrix: &'static [u8],
    period: usize,
}

impl Puncture {
    fn for_rate(fec: FecRate) -> Puncture {
        match fec {
            FecRate::Half => Puncture {
                pmatrix: &[],
                period: 0,
            },
            FecRate::TwoThirds => Puncture {
                pmatrix: &PMATRIX_R2_3,
                period: 6,
            },
            FecRate::ThreeQuarters => Puncture {
                pmatrix: &PMATRIX_R3_4,
                period: 9,
            },
        }
    }

    /// Keep flags for the (A, B) pair of input bit `i`.
    #[inline]
    fn keep(&self, i: usize) -> (bool, bool) {
        if self.pmatrix.is_empty() {
            return (true, true);
        }
        let col = i % self.period;
        (self.pmatrix[col] != 0, self.pmatrix[self.period + col] != 0)
    }
}

#[inline]
fn parity(x: u8) -> u8 {
    (x.count_ones() & 1) as u8
}

/// Number of coded bits produced for `dec_bits` input bits at `fec`.
pub fn encoded_bits(fec: FecRate, dec_bits: usize) -> usize {
    let punct = Puncture::for_rate(fec);
    let mut n = 0;
    for i in 0..dec_bits {
        let (ka, kb) = punct.keep(i);
        n += ka as usize + kb as usize;
    }
    n
}

/// Convolutionally encode `dec_bits` bits of `msg_dec` into `msg_enc`.
///
/// `msg_dec` carries the tail bits already; the shift register starts from
/// zero. `msg_enc` must hold `encoded_bits(fec, dec_bits)` bits rounded up
/// to whole bytes. The output bit count is an invariant of the rate, so a
/// mismatch is a programming error, not a runtime fault.
pub fn encode(fec: FecRate, dec_bits: usize, msg_dec: &[u8], msg_enc: &mut [u8]) {
    let punct = Puncture::for_rate(fec);
    let expected = encoded_bits(fec, dec_bits);
    debug_assert!(msg_enc.len() * 8 >= expected);

    let mut sr: u8 = 0;
    let mut out = 0usize;
    for i in 0..dec_bits {
        sr = ((sr << 1) | get_bit(msg_dec, i)) & 0x7f;
        let a = parity(sr & GENPOLY_A);
        let b = parity(sr & GENPOLY_B);
        let (ka, kb) = punct.keep(i);
        if ka {
            set_bit(msg_enc, out, a);
            out += 1;
        }
        if kb {
            set_bit(msg_enc, out, b);
            out += 1;
        }
    }
    debug_assert_eq!(out, expected);
}

/// Re-insert erasures at punctured positions, reconstructing the full-rate
/// 2:1 soft stream (two soft bytes per decoded bit).
fn depuncture(fec: FecRate, dec_bits: usize, soft: &[u8]) -> Vec<u8> {
    let punct = Puncture::for_rate(fec);
    let mut full = Vec::with_capacity(dec_bits * 2);
    let mut pos = 0usize;
    for i in 0..dec_bits {
        let (ka, kb) = punct.keep(i);
        for keep in [ka, kb] {
            if keep {
                full.push(soft[pos]);
                pos += 1;
            } else {
                full.push(SOFTBIT_ERASURE);
            }
        }
    }
    debug_assert_eq!(pos, soft.len());
    full
}

/// Maximum-likelihood Viterbi decode of `dec_bits` bits from soft-decision
/// input (one byte per surviving coded bit; see module docs for the
/// convention). The decoded bits are packed MSB-first into `msg_dec`.
pub fn decode_soft(fec: FecRate, dec_bits: usize, soft: &[u8], msg_dec: &mut [u8]) {
    debug_assert_eq!(soft.len(), encoded_bits(fec, dec_bits));
    let full = depuncture(fec, dec_bits, soft);

    const NSTATES: usize = 64;
    const UNREACHED: u32 = u32::MAX / 2;

    // Path metrics; the encoder starts from the all-zero state.
    let mut metrics = [UNREACHED; NSTATES];
    let mut next = [UNREACHED; NSTATES];
    metrics[0] = 0;

    // One u64 of predecessor decisions per trellis step.
    let mut decisions: Vec<u64> = Vec::with_capacity(dec_bits);

    for i in 0..dec_bits {
        let (sa, sb) = (full[2 * i] as u32, full[2 * i + 1] as u32);
        let cost = |soft_val: u32, expected: u8| -> u32 {
            if expected != 0 {
                SOFTBIT_1 as u32 - soft_val
            } else {
                soft_val
            }
        };

        let mut dec: u64 = 0;
        for ns in 0..NSTATES {
            let input = (ns & 1) as u8;
            let base = ns >> 1;
            let mut best = UNREACHED;
            let mut best_h = 0u64;
            for h in 0..2usize {
                let ps = base | (h << 5);
                if metrics[ps] >= UNREACHED {
                    continue;
                }
                let sr = ((ps as u8) << 1) | input;
                let bm = cost(sa, parity(sr & GENPOLY_A)) + cost(sb, parity(sr & GENPOLY_B));
                let m = metrics[ps] + bm;
                if m < best {
                    best = m;
                    best_h = h as u64;
                }
            }
            next[ns] = best;
            dec |= best_h << ns;
        }
        decisions.push(dec);
        metrics.copy_from_slice(&next);
    }

    // Chain back from the best end state. Tail bits zero-terminate the
    // register for the SIGNAL field; DATA fields end in scrambled pad bits,
    // so the minimum-metric state is used instead of assuming zero.
    let mut state = (0..NSTATES).min_by_key(|&s| metrics[s]).unwrap_or(0);
    for i in (0..dec_bits).rev() {
        set_bit(msg_dec, i, (state & 1) as u8);
        let h = (decisions[i] >> state) & 1;
        state = (state >> 1) | ((h as usize) << 5);
    }
}

/// Encode the 24-bit SIGNAL field at half rate (no puncturing).
pub fn encode_signal(msg_dec: &[u8; SIGNAL_DEC_BYTES]) -> [u8; SIGNAL_ENC_BYTES] {
    let mut enc = [0u8; SIGNAL_ENC_BYTES];
    encode(FecRate::Half, SIGNAL_DEC_BITS, msg_dec, &mut enc);
    enc
}

/// Decode the 48-bit SIGNAL field back to 24 bits (hard input).
pub fn decode_signal(msg_enc: &[u8; SIGNAL_ENC_BYTES]) -> [u8; SIGNAL_DEC_BYTES] {
    let mut soft = [0u8; 48];
    for (i, s) in soft.iter_mut().enumerate() {
        *s = if get_bit(msg_enc, i) != 0 { SOFTBIT_1 } else { 0 };
    }
    let mut dec = [0u8; SIGNAL_DEC_BYTES];
    decode_soft(FecRate::Half, SIGNAL_DEC_BITS, &soft, &mut dec);
    dec
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hard_to_soft(enc: &[u8], nbits: usize) -> Vec<u8> {
        (0..nbits)
            .map(|i| if get_bit(enc, i) != 0 { SOFTBIT_1 } else { 0 })
            .collect()
    }

    #[test]
    fn test_encoded_bits_per_rate() {
        // 72 input bits: 144 base bits, then 3/4 keeps 96, 2/3 keeps 108.
        assert_eq!(encoded_bits(FecRate::Half, 72), 144);
        assert_eq!(encoded_bits(FecRate::TwoThirds, 72), 108);
        assert_eq!(encoded_bits(FecRate::ThreeQuarters, 72), 96);
    }

    #[test]
    fn test_all_zeros_encodes_to_zeros() {
        let dec = [0u8; 9];
        let mut enc = [0xffu8; 18];
        encode(FecRate::Half, 72, &dec, &mut enc);
        assert_eq!(enc, [0u8; 18]);
    }

    #[test]
    fn test_roundtrip_half_rate() {
        // Message with zero tail so the register terminates cleanly.
        let mut dec = vec![0u8; 12];
        dec[..10].copy_from_slice(&[0xa5, 0x3c, 0x77, 0x01, 0xfe, 0x10, 0x92, 0x48, 0x5d, 0xb2]);
        let nbits = dec.len() * 8;
        let mut enc = vec![0u8; 24];
        encode(FecRate::Half, nbits, &dec, &mut enc);

        let soft = hard_to_soft(&enc, nbits * 2);
        let mut out = vec![0u8; 12];
        decode_soft(FecRate::Half, nbits, &soft, &mut out);
        assert_eq!(out, dec);
    }

    #[test]
    fn test_roundtrip_punctured_rates() {
        for fec in [FecRate::TwoThirds, FecRate::ThreeQuarters] {
            let mut dec = vec![0u8; 27];
            for (i, b) in dec.iter_mut().enumerate().take(25) {
                *b = (i as u8).wrapping_mul(37).wrapping_add(11);
            }
            let nbits = dec.len() * 8;
            let enc_bits = encoded_bits(fec, nbits);
            let mut enc = vec![0u8; enc_bits.div_ceil(8)];
            encode(fec, nbits, &dec, &mut enc);

            let soft = hard_to_soft(&enc, enc_bits);
            let mut out = vec![0u8; 27];
            decode_soft(fec, nbits, &soft, &mut out);
            assert_eq!(out, dec, "{fec:?}");
        }
    }

    #[test]
    fn test_corrects_isolated_errors() {
        let mut dec = vec![0u8; 16];
        dec[..14].copy_from_slice(b"convolutional!");
        let nbits = dec.len() * 8;
        let mut enc = vec![0u8; 32];
        encode(FecRate::Half, nbits, &dec, &mut enc);

        let mut soft = hard_to_soft(&enc, nbits * 2);
        // Flip well-separated coded bits.
        for pos in [10, 60, 130, 200] {
            soft[pos] = SOFTBIT_1 - soft[pos];
        }
        let mut out = vec![0u8; 16];
        decode_soft(FecRate::Half, nbits, &soft, &mut out);
        assert_eq!(out, dec);
    }

    #[test]
    fn test_signal_codec_roundtrip() {
        let dec = [0xb1, 0x30, 0x00];
        let enc = encode_signal(&dec);
        assert_eq!(decode_signal(&enc), dec);
    }
}
