//! # Block Interleaver
//!
//! Rate-dependent interleaver for one OFDM symbol of coded bits (17.3.5.6).
//! The first permutation spreads adjacent coded bits onto non-adjacent
//! subcarriers; the second alternates adjacent bits between more and less
//! significant constellation bits.
//!
//! The permutation depends only on (ncbps, nbpsc), so there are four
//! distinct tables covering the eight rates. Each is derived once, lazily,
//! as an index permutation: `table[k]` is the interleaved position of coded
//! bit `k`. De-interleaving walks the same table with the roles reversed,
//! in packed-bit form for the transmit path and in one-soft-byte-per-bit
//! form for the receive path.

use once_cell::sync::Lazy;

use crate::util::bits::{get_bit, set_bit};

fn build_table(ncbps: usize, nbpsc: usize) -> Vec<u16> {
    let s = (nbpsc / 2).max(1);
    let mut table = vec![0u16; ncbps];
    for (k, slot) in table.iter_mut().enumerate() {
        let i = (ncbps / 16) * (k % 16) + k / 16;
        let j = s * (i / s) + (i + ncbps - 16 * i / ncbps) % s;
        *slot = j as u16;
    }
    table
}

static TABLE_48_1: Lazy<Vec<u16>> = Lazy::new(|| build_table(48, 1));
static TABLE_96_2: Lazy<Vec<u16>> = Lazy::new(|| build_table(96, 2));
static TABLE_192_4: Lazy<Vec<u16>> = Lazy::new(|| build_table(192, 4));
static TABLE_288_6: Lazy<Vec<u16>> = Lazy::new(|| build_table(288, 6));

/// Index permutation for one OFDM symbol: entry `k` holds the interleaved
/// position of coded bit `k`.
pub fn permutation(ncbps: usize, nbpsc: usize) -> &'static [u16] {
    match (ncbps, nbpsc) {
        (48, 1) => &TABLE_48_1,
        (96, 2) => &TABLE_96_2,
        (192, 4) => &TABLE_192_4,
        (288, 6) => &TABLE_288_6,
        _ => unreachable!("no interleaver for ncbps={ncbps}, nbpsc={nbpsc}"),
    }
}

/// Interleave one `ncbps`-bit symbol block, packed MSB-first.
pub fn interleave_bits(ncbps: usize, nbpsc: usize, msg_dec: &[u8], msg_enc: &mut [u8]) {
    let table = permutation(ncbps, nbpsc);
    for k in 0..ncbps {
        set_bit(msg_enc, table[k] as usize, get_bit(msg_dec, k));
    }
}

/// Inverse of [`interleave_bits`].
pub fn deinterleave_bits(ncbps: usize, nbpsc: usize, msg_enc: &[u8], msg_dec: &mut [u8]) {
    let table = permutation(ncbps, nbpsc);
    for k in 0..ncbps {
        set_bit(msg_dec, k, get_bit(msg_enc, table[k] as usize));
    }
}

/// De-interleave one symbol of soft-decision bytes (one byte per coded bit).
pub fn deinterleave_soft(ncbps: usize, nbpsc: usize, soft_enc: &[u8], soft_dec: &mut [u8]) {
    let table = permutation(ncbps, nbpsc);
    for k in 0..ncbps {
        soft_dec[k] = soft_enc[table[k] as usize];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phy::rate::RateCode;

    #[test]
    fn test_tables_are_permutations() {
        for rate in RateCode::ALL {
            let p = rate.params();
            let table = permutation(p.ncbps, p.nbpsc);
            let mut seen = vec![false; p.ncbps];
            for &j in table {
                assert!(!seen[j as usize], "{rate:?}: duplicate target {j}");
                seen[j as usize] = true;
            }
            assert!(seen.iter().all(|&s| s), "{rate:?}: incomplete cover");
        }
    }

    /// First-permutation spot check at ncbps=48: coded bit 1 must land 3
    /// subcarrier positions away from bit 0 (48/16 = 3).
    #[test]
    fn test_bpsk_spread() {
        let table = permutation(48, 1);
        assert_eq!(table[0], 0);
        assert_eq!(table[1], 3);
        assert_eq!(table[16], 1);
        assert_eq!(table[47], 47);
    }

    #[test]
    fn test_bits_roundtrip() {
        for rate in RateCode::ALL {
            let p = rate.params();
            let nbytes = p.ncbps / 8;
            let block: Vec<u8> = (0..nbytes).map(|i| (i as u8).wrapping_mul(73) ^ 0x5a).collect();
            let mut inter = vec![0u8; nbytes];
            let mut deinter = vec![0u8; nbytes];
            interleave_bits(p.ncbps, p.nbpsc, &block, &mut inter);
            deinterleave_bits(p.ncbps, p.nbpsc, &inter, &mut deinter);
            assert_eq!(deinter, block, "{rate:?}");
        }
    }

    #[test]
    fn test_soft_matches_bits() {
        let p = RateCode::R54.params();
        let nbytes = p.ncbps / 8;
        let block: Vec<u8> = (0..nbytes).map(|i| (i as u8).wrapping_mul(29)).collect();
        let mut inter = vec![0u8; nbytes];
        interleave_bits(p.ncbps, p.nbpsc, &block, &mut inter);

        // Expand the interleaved block to saturated soft bits and
        // de-interleave in the soft domain.
        let soft_enc: Vec<u8> = (0..p.ncbps)
            .map(|i| if get_bit(&inter, i) != 0 { 255 } else { 0 })
            .collect();
        let mut soft_dec = vec![0u8; p.ncbps];
        deinterleave_soft(p.ncbps, p.nbpsc, &soft_enc, &mut soft_dec);
        for k in 0..p.ncbps {
            assert_eq!(soft_dec[k] != 0, get_bit(&block, k) != 0);
        }
    }
}
