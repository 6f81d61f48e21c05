//! # Subcarrier Grid
//!
//! Fixed 64-bin layout of one OFDM symbol (17.3.5.9): DC and the guard
//! band are null, four bins carry pilots, 48 carry data. Subcarrier
//! k in [-26, 26] maps to FFT bin k mod 64.

use crate::constants::{NUM_DATA_SUBCARRIERS, NUM_SUBCARRIERS, PILOT_BINS};

/// Role of one FFT bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubcarrierType {
    Null,
    Pilot,
    Data,
}

/// Data-bearing bins in coefficient order: subcarriers -26..26 with the
/// pilots and DC skipped. Coefficient `i` of a symbol is carried on
/// `DATA_BINS[i]`.
#[rustfmt::skip]
pub const DATA_BINS: [usize; NUM_DATA_SUBCARRIERS] = [
    38, 39, 40, 41, 42,                                     // -26..-22
    44, 45, 46, 47, 48, 49, 50, 51, 52, 53, 54, 55, 56,     // -20..-8
    58, 59, 60, 61, 62, 63,                                 // -6..-1
     1,  2,  3,  4,  5,  6,                                 //  1..6
     8,  9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20,     //  8..20
    22, 23, 24, 25, 26,                                     // 22..26
];

/// Role of FFT bin `bin`.
pub fn subcarrier_type(bin: usize) -> SubcarrierType {
    debug_assert!(bin < NUM_SUBCARRIERS);
    match bin {
        0 | 27..=37 => SubcarrierType::Null,
        _ if PILOT_BINS.contains(&bin) => SubcarrierType::Pilot,
        _ => SubcarrierType::Data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::NUM_PILOT_SUBCARRIERS;

    #[test]
    fn test_grid_partition() {
        let mut nulls = 0;
        let mut pilots = 0;
        let mut data = 0;
        for bin in 0..NUM_SUBCARRIERS {
            match subcarrier_type(bin) {
                SubcarrierType::Null => nulls += 1,
                SubcarrierType::Pilot => pilots += 1,
                SubcarrierType::Data => data += 1,
            }
        }
        assert_eq!(nulls, 12);
        assert_eq!(pilots, NUM_PILOT_SUBCARRIERS);
        assert_eq!(data, NUM_DATA_SUBCARRIERS);
    }

    #[test]
    fn test_data_bins_agree_with_grid() {
        for &bin in DATA_BINS.iter() {
            assert_eq!(subcarrier_type(bin), SubcarrierType::Data, "bin {bin}");
        }
        // Coefficient order is strictly increasing in subcarrier index k.
        let k = |bin: usize| if bin >= 38 { bin as i32 - 64 } else { bin as i32 };
        for w in DATA_BINS.windows(2) {
            assert!(k(w[0]) < k(w[1]));
        }
    }
}
