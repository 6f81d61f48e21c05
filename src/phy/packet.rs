//! # DATA Field Packet Codec
//!
//! High-level encoder/decoder for the PSDU bit stream (17.3.5): SERVICE
//! prefix, payload, tail and pad assembly, scrambling, convolutional
//! encoding, and per-symbol interleaving. The decoder runs the same stages
//! in reverse from a soft-decision buffer and recovers the transmit
//! scrambler seed from the SERVICE prefix.

use crate::constants::{SERVICE_BITS, TAIL_BITS};
use crate::error::WlanError;
use crate::phy::rate::RateCode;
use crate::phy::{fec, interleave, scramble};
use crate::util::bits::{get_bit, set_bit};

/// Derived bit layout of one frame's DATA field.
///
/// All quantities are fixed by (rate, length); the generator and the
/// synchronizer both build one of these when a frame is configured or a
/// SIGNAL header is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameParams {
    pub rate: RateCode,
    /// PSDU length in bytes.
    pub length: usize,
    /// OFDM symbols in the DATA field.
    pub nsym: usize,
    /// Total DATA-field bits: nsym * ndbps.
    pub ndata: usize,
    /// Pad bits appended after the tail.
    pub npad: usize,
    /// Decoded message buffer size in bytes (ndata bits, rounded up).
    pub dec_msg_len: usize,
    /// Encoded message size in bytes: nsym * ncbps / 8.
    pub enc_msg_len: usize,
}

impl FrameParams {
    pub fn new(rate: RateCode, length: usize) -> Result<Self, WlanError> {
        if length == 0 || length > crate::constants::MAX_FRAME_LEN {
            return Err(WlanError::InvalidLength { length });
        }
        let p = rate.params();
        let payload_bits = SERVICE_BITS + 8 * length + TAIL_BITS;
        let nsym = payload_bits.div_ceil(p.ndbps);
        let ndata = nsym * p.ndbps;
        Ok(FrameParams {
            rate,
            length,
            nsym,
            ndata,
            npad: ndata - payload_bits,
            dec_msg_len: ndata.div_ceil(8),
            enc_msg_len: nsym * p.ncbps / 8,
        })
    }
}

/// Encoded message length in bytes for (rate, length); pure function.
pub fn compute_enc_msg_len(rate: RateCode, length: usize) -> Result<usize, WlanError> {
    Ok(FrameParams::new(rate, length)?.enc_msg_len)
}

/// Assemble and encode one frame's DATA field.
///
/// Returns `enc_msg_len` bytes: scrambled, convolutionally encoded and
/// per-symbol interleaved. The tail-bit positions are cleared after
/// scrambling, as the standard requires, so the decoder's register
/// terminates regardless of seed.
pub fn encode(rate: RateCode, seed: u8, payload: &[u8]) -> Result<Vec<u8>, WlanError> {
    let params = FrameParams::new(rate, payload.len())?;
    let p = rate.params();

    // SERVICE (16 zero bits) | payload | 6 tail zeros | pad zeros
    let mut msg_dec = vec![0u8; params.dec_msg_len];
    msg_dec[2..2 + payload.len()].copy_from_slice(payload);

    scramble::scramble_in_place(&mut msg_dec, seed)?;

    // Tail bits carry the encoder back to the zero state; they are
    // scrambled along with the rest and then forced back to zero.
    let tail_start = SERVICE_BITS + 8 * payload.len();
    for i in 0..TAIL_BITS {
        set_bit(&mut msg_dec, tail_start + i, 0);
    }

    let mut msg_enc = vec![0u8; params.enc_msg_len];
    fec::encode(p.fec, params.ndata, &msg_dec, &mut msg_enc);

    // Interleave symbol by symbol (ncbps bits each, byte aligned).
    let sym_bytes = p.ncbps / 8;
    let mut interleaved = vec![0u8; params.enc_msg_len];
    for sym in 0..params.nsym {
        let span = sym * sym_bytes..(sym + 1) * sym_bytes;
        interleave::interleave_bits(p.ncbps, p.nbpsc, &msg_enc[span.clone()], &mut interleaved[span]);
    }
    Ok(interleaved)
}

/// Result of decoding a DATA field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPacket {
    pub payload: Vec<u8>,
    /// Scrambler seed recovered from the SERVICE prefix.
    pub seed: u8,
    /// Descrambled SERVICE field; zero for a compliant transmitter.
    pub service: u16,
}

/// Decode one frame's DATA field from soft-decision bytes.
///
/// `soft_enc` holds one soft byte per coded bit (`nsym * ncbps` entries).
pub fn decode(rate: RateCode, length: usize, soft_enc: &[u8]) -> Result<DecodedPacket, WlanError> {
    let params = FrameParams::new(rate, length)?;
    let p = rate.params();

    let expected = params.nsym * p.ncbps;
    if soft_enc.len() != expected {
        return Err(WlanError::BufferSize {
            expected,
            actual: soft_enc.len(),
        });
    }

    let mut soft_dec = vec![0u8; expected];
    for sym in 0..params.nsym {
        let span = sym * p.ncbps..(sym + 1) * p.ncbps;
        interleave::deinterleave_soft(p.ncbps, p.nbpsc, &soft_enc[span.clone()], &mut soft_dec[span]);
    }

    let mut msg_dec = vec![0u8; params.dec_msg_len];
    fec::decode_soft(p.fec, params.ndata, &soft_dec, &mut msg_dec);

    // The all-zero SERVICE prefix exposes the keystream directly.
    let mut keystream = [0u8; 7];
    for (i, k) in keystream.iter_mut().enumerate() {
        *k = get_bit(&msg_dec, i);
    }
    let seed = scramble::recover_seed(keystream);
    scramble::scramble_in_place(&mut msg_dec, seed)?;

    let service = u16::from_be_bytes([msg_dec[0], msg_dec[1]]);
    Ok(DecodedPacket {
        payload: msg_dec[2..2 + length].to_vec(),
        seed,
        service,
    })
}
