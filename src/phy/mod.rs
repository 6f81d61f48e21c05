//! Bit-level PHY pipeline: rate parameters, scrambling, forward error
//! correction, interleaving, and the SIGNAL/DATA field codecs.

pub mod fec;
pub mod interleave;
pub mod packet;
pub mod rate;
pub mod scramble;
pub mod signal;

pub use packet::FrameParams;
pub use rate::{FecRate, Modulation, RateCode, RateParams};
