//! Numerical primitives for the OFDM pipeline: the 64-point transform, the
//! carrier-recovery oscillator, and the constellation mapper/demapper.

pub mod fft;
pub mod modem;
pub mod nco;

pub use fft::Fft64;
pub use nco::Nco;
