//! # Numerically-Controlled Oscillator
//!
//! Phase-accumulator oscillator used by the synchronizer to strip the
//! estimated carrier frequency offset from the incoming sample stream.

use std::f32::consts::PI;

use num_complex::Complex32;

#[derive(Debug, Clone, Copy)]
pub struct Nco {
    phase: f32,
    freq: f32,
}

impl Nco {
    pub fn new() -> Self {
        Nco {
            phase: 0.0,
            freq: 0.0,
        }
    }

    /// Set the oscillator frequency in radians per sample.
    pub fn set_frequency(&mut self, freq: f32) {
        self.freq = freq;
    }

    /// Add a correction to the oscillator frequency (radians per sample).
    pub fn adjust_frequency(&mut self, delta: f32) {
        self.freq += delta;
    }

    /// Current frequency in radians per sample.
    pub fn frequency(&self) -> f32 {
        self.freq
    }

    /// Clear phase and frequency.
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.freq = 0.0;
    }

    /// Mix the input down by the oscillator phase, then advance one sample.
    #[inline]
    pub fn mix_down(&mut self, x: Complex32) -> Complex32 {
        let (sin, cos) = self.phase.sin_cos();
        let y = x * Complex32::new(cos, -sin);
        self.step();
        y
    }

    #[inline]
    fn step(&mut self) {
        self.phase += self.freq;
        // Keep the accumulator bounded; f32 loses resolution far from zero.
        if self.phase > PI {
            self.phase -= 2.0 * PI;
        } else if self.phase < -PI {
            self.phase += 2.0 * PI;
        }
    }
}

impl Default for Nco {
    fn default() -> Self {
        Self::new()
    }
}
