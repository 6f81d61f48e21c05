//! # 64-Point Transform
//!
//! Thin wrapper over `rustfft` holding the forward and inverse plans and a
//! shared scratch buffer. Plans are acquired once at construction; the
//! execute path performs no allocation.
//!
//! The inverse transform is normalized by 1/64 so that a frequency-domain
//! symbol round-trips through `inverse` then `forward` at unit gain, and the
//! generated time sequences match the Annex G tables directly.

use std::sync::Arc;

use num_complex::Complex32;
use rustfft::{Fft, FftPlanner};

use crate::constants::NUM_SUBCARRIERS;

pub struct Fft64 {
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex32>,
}

impl Fft64 {
    pub fn new() -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(NUM_SUBCARRIERS);
        let inverse = planner.plan_fft_inverse(NUM_SUBCARRIERS);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());
        Fft64 {
            forward,
            inverse,
            scratch: vec![Complex32::new(0.0, 0.0); scratch_len],
        }
    }

    /// Time to frequency, in place, unnormalized.
    pub fn forward(&mut self, buf: &mut [Complex32]) {
        debug_assert_eq!(buf.len(), NUM_SUBCARRIERS);
        self.forward.process_with_scratch(buf, &mut self.scratch);
    }

    /// Frequency to time, in place, scaled by 1/64.
    pub fn inverse(&mut self, buf: &mut [Complex32]) {
        debug_assert_eq!(buf.len(), NUM_SUBCARRIERS);
        self.inverse.process_with_scratch(buf, &mut self.scratch);
        let scale = 1.0 / NUM_SUBCARRIERS as f32;
        for x in buf.iter_mut() {
            *x *= scale;
        }
    }
}

impl Default for Fft64 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_unit_gain() {
        let mut fft = Fft64::new();
        let original: Vec<Complex32> = (0..64)
            .map(|i| Complex32::new((i as f32 * 0.37).sin(), (i as f32 * 0.73).cos()))
            .collect();
        let mut buf = original.clone();
        fft.inverse(&mut buf);
        fft.forward(&mut buf);
        for (a, b) in buf.iter().zip(original.iter()) {
            assert!((a - b).norm() < 1e-4);
        }
    }

    #[test]
    fn test_impulse_spectrum_is_flat() {
        let mut fft = Fft64::new();
        let mut buf = vec![Complex32::new(0.0, 0.0); 64];
        buf[0] = Complex32::new(1.0, 0.0);
        fft.forward(&mut buf);
        for x in &buf {
            assert!((x.re - 1.0).abs() < 1e-5 && x.im.abs() < 1e-5);
        }
    }
}
