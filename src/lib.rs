//! # wlan-rs - A Rust Crate for the 802.11a/g OFDM Physical Layer
//!
//! The wlan-rs crate implements the baseband core of an 802.11a/g (OFDM)
//! transmitter and receiver: it converts between MAC-layer packets (a rate
//! code, a scrambler seed, a length and up to 4095 payload bytes) and
//! complex baseband samples at 20 Msample/s.
//!
//! ## Features
//!
//! - Full bit-level pipeline: scrambler, convolutional encoder with
//!   puncturing, block interleaver, SIGNAL and DATA field codecs
//! - OFDM modulation with pilot insertion, cyclic prefix and raised-cosine
//!   boundary windowing
//! - Frame generation: PLCP preamble, SIGNAL symbol and DATA symbols,
//!   bit-exact against the 802.11-2007 Annex G reference vectors
//! - Blind frame synchronization: PLCP detection, carrier-frequency-offset
//!   and channel-gain estimation, pilot phase tracking, SIGNAL and DATA
//!   decoding with soft-decision Viterbi
//! - Frame-complete callbacks carrying payload, recovered seed, RSSI and CFO
//! - Support for logging and error handling
//!
//! ## Usage
//!
//! ```rust
//! use wlan_rs::{FrameGenerator, FrameSynchronizer, RateCode};
//!
//! // Transmit: synthesize one frame.
//! let payload = b"Hello, OFDM!";
//! let samples = FrameGenerator::generate(RateCode::R12, 0x5d, payload).unwrap();
//!
//! // Receive: push the samples through a synchronizer.
//! let mut sync = FrameSynchronizer::new(Box::new(|event| {
//!     if event.valid {
//!         println!("{} bytes at {} Mbit/s", event.length, event.rate.mbps());
//!     }
//! }));
//! sync.execute(&samples);
//! ```
//!
//! The synchronizer is single-threaded and push-driven: callbacks fire from
//! inside [`FrameSynchronizer::execute`], in the temporal order of frame
//! completion. In-flight state persists across calls, so a sample stream
//! may be delivered in arbitrary chunks.

pub mod constants;
pub mod dsp;
pub mod error;
pub mod frame;
pub mod logging;
pub mod phy;
pub mod util;

pub use crate::error::WlanError;
pub use crate::logging::{init_logger, log_info};

// Core PHY types
pub use dsp::fft::Fft64;
pub use frame::gen::FrameGenerator;
pub use frame::sync::{FrameCallback, FrameEvent, FrameSynchronizer, SyncConfig, SyncStats};
pub use phy::packet::{compute_enc_msg_len, DecodedPacket, FrameParams};
pub use phy::rate::{FecRate, Modulation, RateCode, RateParams};
pub use phy::signal::Signal;

/// Synthesize one complete frame as a baseband sample stream.
///
/// # Arguments
/// * `rate` - Data rate code (6..54 Mbit/s)
/// * `seed` - Scrambler seed (nonzero, 7 bits)
/// * `payload` - PSDU bytes (1..=4095)
///
/// # Returns
/// * `Ok(Vec<Complex32>)` - 320 preamble + 80 SIGNAL + 80 * nsym samples
/// * `Err(WlanError)` - Invalid configuration
pub fn generate_frame(
    rate: RateCode,
    seed: u8,
    payload: &[u8],
) -> Result<Vec<num_complex::Complex32>, WlanError> {
    FrameGenerator::generate(rate, seed, payload)
}

/// Encode one frame's DATA field to its interleaved coded bytes.
///
/// # Arguments
/// * `rate` - Data rate code
/// * `seed` - Scrambler seed (nonzero, 7 bits)
/// * `payload` - PSDU bytes (1..=4095)
///
/// # Returns
/// * `Ok(Vec<u8>)` - `compute_enc_msg_len(rate, len)` coded bytes
/// * `Err(WlanError)` - Invalid configuration
pub fn encode_packet(rate: RateCode, seed: u8, payload: &[u8]) -> Result<Vec<u8>, WlanError> {
    phy::packet::encode(rate, seed, payload)
}

/// Decode one frame's DATA field from soft-decision bytes.
///
/// # Arguments
/// * `rate` - Data rate code from the SIGNAL header
/// * `length` - PSDU length from the SIGNAL header
/// * `soft` - One soft byte per coded bit (0 = confident 0, 255 = confident
///   1, 127 = erasure)
///
/// # Returns
/// * `Ok(DecodedPacket)` - Payload plus the recovered scrambler seed
/// * `Err(WlanError)` - Buffer size mismatch or unrecoverable descramble
pub fn decode_packet(
    rate: RateCode,
    length: usize,
    soft: &[u8],
) -> Result<DecodedPacket, WlanError> {
    phy::packet::decode(rate, length, soft)
}
