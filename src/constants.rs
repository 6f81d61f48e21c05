//! 802.11a/g PHY Constants
//!
//! This module defines constants used throughout the OFDM PHY implementation,
//! based on the IEEE 802.11-2007 standard (Clause 17).

/// FFT size / number of subcarrier bins per OFDM symbol
pub const NUM_SUBCARRIERS: usize = 64;

/// Cyclic prefix length in samples
pub const CYCLIC_PREFIX_LEN: usize = 16;

/// Total OFDM symbol length in samples (prefix + body)
pub const SYMBOL_LEN: usize = 80;

/// Number of data-bearing subcarriers per OFDM symbol
pub const NUM_DATA_SUBCARRIERS: usize = 48;

/// Number of pilot subcarriers per OFDM symbol
pub const NUM_PILOT_SUBCARRIERS: usize = 4;

/// FFT bins carrying pilot tones
pub const PILOT_BINS: [usize; NUM_PILOT_SUBCARRIERS] = [7, 21, 43, 57];

/// Base pilot values at the pilot bins, before polarity modulation
pub const PILOT_VALUES: [f32; NUM_PILOT_SUBCARRIERS] = [1.0, 1.0, 1.0, -1.0];

/// Preamble length in samples (short training + long training)
pub const PREAMBLE_LEN: usize = 320;

/// Short training sequence length in samples
pub const SHORT_TRAINING_LEN: usize = 160;

/// Period of the short training sequence in samples
pub const SHORT_PERIOD: usize = 16;

/// Guard interval preceding the long training copies, in samples
pub const LONG_GUARD_LEN: usize = 32;

/// SERVICE field width in bits (all zero on transmit)
pub const SERVICE_BITS: usize = 16;

/// Convolutional encoder tail width in bits
pub const TAIL_BITS: usize = 6;

/// SIGNAL field width: decoded bits / bytes, encoded bits / bytes
pub const SIGNAL_DEC_BITS: usize = 24;
pub const SIGNAL_DEC_BYTES: usize = 3;
pub const SIGNAL_ENC_BITS: usize = 48;
pub const SIGNAL_ENC_BYTES: usize = 6;

/// Maximum PSDU length in bytes (12-bit LENGTH field)
pub const MAX_FRAME_LEN: usize = 4095;

/// Baseband sample rate in Hz
pub const SAMPLE_RATE: f32 = 20e6;

// ----------------------------------------------------------------------------
// Soft-decision byte convention (shared with the Viterbi decoder and the
// demodulator; kept at the boundary for parity with reference vectors)
// ----------------------------------------------------------------------------

/// Confident logical 1
pub const SOFTBIT_1: u8 = 255;

/// Erasure (punctured or unknown position)
pub const SOFTBIT_ERASURE: u8 = 127;

/// Confident logical 0
pub const SOFTBIT_0: u8 = 0;
