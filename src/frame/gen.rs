//! # Frame Generator
//!
//! Synthesizes one 802.11a/g baseband frame as a deterministic sequence of
//! 80-sample buffers: the two short-training halves, the two long-training
//! halves, the SIGNAL symbol, and the DATA symbols. Symbol boundaries are
//! smoothed with a raised-cosine window of length `p` (default 1): the
//! first `p` samples of each emitted symbol are ramped up and overlapped
//! with the previous symbol's stored post-fix tail.

use num_complex::Complex32;

use crate::constants::{
    CYCLIC_PREFIX_LEN, NUM_SUBCARRIERS, PILOT_BINS, PILOT_VALUES, SYMBOL_LEN,
};
use crate::dsp::fft::Fft64;
use crate::dsp::modem;
use crate::error::WlanError;
use crate::frame::plcp::{PilotSequence, S0_TIME, S1_TIME};
use crate::frame::subcarrier::DATA_BINS;
use crate::phy::packet::{self, FrameParams};
use crate::phy::rate::RateCode;
use crate::phy::signal::Signal;
use crate::phy::{fec, interleave};
use crate::util::bits::get_bit;
use std::f32::consts::FRAC_PI_2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GenState {
    ShortA,
    ShortB,
    LongA,
    LongB,
    Signal,
    Data,
    Done,
}

/// 802.11a/g baseband frame synthesizer.
///
/// One generator serves one transmission configuration at a time: call
/// [`assemble`](Self::assemble), then [`write_symbol`](Self::write_symbol)
/// until it reports completion. FFT plans and scratch buffers are owned by
/// the generator and reused across frames.
pub struct FrameGenerator {
    fft: Fft64,
    window_len: usize,
    rampup: Vec<f32>,

    params: Option<FrameParams>,
    signal_int: [u8; 6],
    msg_enc: Vec<u8>,
    pilots: PilotSequence,

    state: GenState,
    data_sym: usize,
    postfix: Vec<Complex32>,
    x: [Complex32; NUM_SUBCARRIERS],
}

impl FrameGenerator {
    pub fn new() -> Self {
        Self::with_window_len(1).expect("default window length is valid")
    }

    /// Create with an explicit boundary window length `p` (1..=16 samples).
    pub fn with_window_len(p: usize) -> Result<Self, WlanError> {
        if p == 0 || p > CYCLIC_PREFIX_LEN {
            return Err(WlanError::InvalidWindowLen(p));
        }
        let rampup = (0..p)
            .map(|i| {
                let t = (i as f32 + 0.5) / p as f32;
                (FRAC_PI_2 * t).sin().powi(2)
            })
            .collect();
        Ok(FrameGenerator {
            fft: Fft64::new(),
            window_len: p,
            rampup,
            params: None,
            signal_int: [0u8; 6],
            msg_enc: Vec::new(),
            pilots: PilotSequence::new(),
            state: GenState::Done,
            data_sym: 0,
            postfix: vec![Complex32::new(0.0, 0.0); p],
            x: [Complex32::new(0.0, 0.0); NUM_SUBCARRIERS],
        })
    }

    /// Configure and encode one frame.
    pub fn assemble(&mut self, rate: RateCode, seed: u8, payload: &[u8]) -> Result<(), WlanError> {
        let params = FrameParams::new(rate, payload.len())?;

        // SIGNAL header: pack, half-rate encode, interleave at (48, 1).
        let signal = Signal::new(rate, payload.len())?;
        let signal_enc = fec::encode_signal(&signal.pack());
        interleave::interleave_bits(48, 1, &signal_enc, &mut self.signal_int);

        // DATA field: scramble, encode, interleave.
        self.msg_enc = packet::encode(rate, seed, payload)?;

        self.params = Some(params);
        self.pilots = PilotSequence::new();
        self.state = GenState::ShortA;
        self.data_sym = 0;
        self.postfix.fill(Complex32::new(0.0, 0.0));
        Ok(())
    }

    /// Number of DATA symbols in the assembled frame.
    pub fn nsym(&self) -> usize {
        self.params.map_or(0, |p| p.nsym)
    }

    /// Total sample count of the assembled frame: preamble + SIGNAL + DATA.
    pub fn num_output_samples(&self) -> usize {
        self.params.map_or(0, |p| SYMBOL_LEN * (5 + p.nsym))
    }

    /// Abort the current frame; the generator becomes idle.
    pub fn reset(&mut self) {
        self.state = GenState::Done;
        self.params = None;
        self.postfix.fill(Complex32::new(0.0, 0.0));
    }

    /// Write the next 80-sample symbol into `buffer`.
    ///
    /// Returns `true` once the final DATA symbol has been written; further
    /// calls leave the buffer untouched and keep returning `true`.
    pub fn write_symbol(&mut self, buffer: &mut [Complex32]) -> bool {
        assert_eq!(buffer.len(), SYMBOL_LEN);
        match self.state {
            GenState::ShortA => {
                self.gensymbol_periodic(&S0_TIME, buffer);
                self.state = GenState::ShortB;
            }
            GenState::ShortB => {
                self.gensymbol_periodic(&S0_TIME, buffer);
                self.state = GenState::LongA;
            }
            GenState::LongA => {
                self.write_long_a(buffer);
                self.state = GenState::LongB;
            }
            GenState::LongB => {
                self.gensymbol_periodic(&S1_TIME, buffer);
                self.state = GenState::Signal;
            }
            GenState::Signal => {
                self.load_signal_symbol();
                self.transform_and_emit(buffer);
                self.state = GenState::Data;
            }
            GenState::Data => {
                self.load_data_symbol(self.data_sym);
                self.transform_and_emit(buffer);
                self.data_sym += 1;
                if self.data_sym == self.nsym() {
                    self.state = GenState::Done;
                    return true;
                }
            }
            GenState::Done => return true,
        }
        false
    }

    /// Generate the complete frame in one call.
    pub fn generate(
        rate: RateCode,
        seed: u8,
        payload: &[u8],
    ) -> Result<Vec<Complex32>, WlanError> {
        let mut gen = FrameGenerator::new();
        gen.assemble(rate, seed, payload)?;
        let mut out = vec![Complex32::new(0.0, 0.0); gen.num_output_samples()];
        for chunk in out.chunks_mut(SYMBOL_LEN) {
            gen.write_symbol(chunk);
        }
        Ok(out)
    }

    // ------------------------------------------------------------------
    // symbol assembly
    // ------------------------------------------------------------------

    /// Emit prefix + body of a 64-periodic sequence with the boundary
    /// window applied (both short halves and the second long half).
    fn gensymbol_periodic(&mut self, seq: &[Complex32; NUM_SUBCARRIERS], buffer: &mut [Complex32]) {
        let p = self.window_len;
        buffer[..CYCLIC_PREFIX_LEN].copy_from_slice(&seq[NUM_SUBCARRIERS - CYCLIC_PREFIX_LEN..]);
        buffer[CYCLIC_PREFIX_LEN..].copy_from_slice(&seq[..]);
        for i in 0..p {
            buffer[i] = buffer[i] * self.rampup[i] + self.postfix[i];
            // The symbol continues periodically past sample 80 at seq[i].
            self.postfix[i] = seq[i] * self.rampup[p - 1 - i];
        }
    }

    /// First long-training half: 32-sample guard plus the first 48 samples
    /// of the long sequence. Its continuation runs into the second half,
    /// so the post-fix picks up at sample 48.
    fn write_long_a(&mut self, buffer: &mut [Complex32]) {
        let p = self.window_len;
        buffer[..32].copy_from_slice(&S1_TIME[32..]);
        buffer[32..].copy_from_slice(&S1_TIME[..48]);
        for i in 0..p {
            buffer[i] = buffer[i] * self.rampup[i] + self.postfix[i];
            self.postfix[i] = S1_TIME[48 + i] * self.rampup[p - 1 - i];
        }
    }

    /// IFFT the loaded frequency symbol and emit it with prefix + window.
    fn transform_and_emit(&mut self, buffer: &mut [Complex32]) {
        self.fft.inverse(&mut self.x);
        let p = self.window_len;
        buffer[..CYCLIC_PREFIX_LEN].copy_from_slice(&self.x[NUM_SUBCARRIERS - CYCLIC_PREFIX_LEN..]);
        buffer[CYCLIC_PREFIX_LEN..].copy_from_slice(&self.x[..]);
        for i in 0..p {
            buffer[i] = buffer[i] * self.rampup[i] + self.postfix[i];
            self.postfix[i] = self.x[i] * self.rampup[p - 1 - i];
        }
    }

    /// Load pilots (with the next polarity) and zero the rest of the grid.
    fn load_pilots(&mut self) {
        let polarity = self.pilots.next_polarity();
        self.x.fill(Complex32::new(0.0, 0.0));
        for (bin, value) in PILOT_BINS.iter().zip(PILOT_VALUES) {
            self.x[*bin] = Complex32::new(value * polarity, 0.0);
        }
    }

    /// SIGNAL symbol: interleaved header bits, BPSK on the 48 data bins.
    fn load_signal_symbol(&mut self) {
        self.load_pilots();
        for (i, &bin) in DATA_BINS.iter().enumerate() {
            let bit = get_bit(&self.signal_int, i);
            self.x[bin] = modem::modulate(crate::phy::rate::Modulation::Bpsk, bit);
        }
    }

    /// DATA symbol `sym`: ncbps interleaved bits mapped nbpsc at a time.
    fn load_data_symbol(&mut self, sym: usize) {
        let params = self.params.expect("assembled");
        let rp = params.rate.params();
        self.load_pilots();
        let base = sym * rp.ncbps;
        for (i, &bin) in DATA_BINS.iter().enumerate() {
            let mut value = 0u8;
            for b in 0..rp.nbpsc {
                value = (value << 1) | get_bit(&self.msg_enc, base + i * rp.nbpsc + b);
            }
            self.x[bin] = modem::modulate(rp.modulation, value);
        }
    }
}

impl Default for FrameGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_count_invariant() {
        let payload = [0x55u8; 100];
        let mut gen = FrameGenerator::new();
        gen.assemble(RateCode::R6, 0x5d, &payload).unwrap();
        assert_eq!(gen.nsym(), 35);
        assert_eq!(gen.num_output_samples(), 320 + 80 + 80 * 35);

        let mut buf = vec![Complex32::new(0.0, 0.0); SYMBOL_LEN];
        let mut symbols = 0;
        loop {
            let done = gen.write_symbol(&mut buf);
            symbols += 1;
            if done {
                break;
            }
        }
        assert_eq!(symbols, 5 + 35);
    }

    #[test]
    fn test_frame_starts_with_ramped_short_sequence() {
        let samples = FrameGenerator::generate(RateCode::R6, 0x5d, &[0u8; 100]).unwrap();
        // First sample is the half-amplitude window ramp of s0[0].
        let first = S0_TIME[0] * 0.5;
        assert!((samples[0] - first).norm() < 1e-5);
        // Interior of the short training is the unwindowed sequence.
        for i in 1..160 {
            assert!((samples[i] - S0_TIME[i % 64]).norm() < 1e-5, "sample {i}");
        }
    }

    #[test]
    fn test_long_training_layout() {
        let samples = FrameGenerator::generate(RateCode::R6, 0x5d, &[0u8; 100]).unwrap();
        // Guard interval: last 32 samples of the long sequence, cross-faded
        // into the short training at the boundary sample only.
        let boundary = S1_TIME[32] * 0.5 + S0_TIME[0] * 0.5;
        assert!((samples[160] - boundary).norm() < 1e-5);
        for i in 1..32 {
            assert!((samples[160 + i] - S1_TIME[32 + i]).norm() < 1e-5);
        }
        // Two unbroken copies of the long sequence follow.
        for i in 0..128 {
            assert!((samples[192 + i] - S1_TIME[i % 64]).norm() < 1e-5, "long {i}");
        }
    }

    #[test]
    fn test_rejects_bad_window_len() {
        assert!(FrameGenerator::with_window_len(0).is_err());
        assert!(FrameGenerator::with_window_len(17).is_err());
        assert!(FrameGenerator::with_window_len(16).is_ok());
    }
}
