//! 802.11a/g framing: PLCP reference sequences, the subcarrier grid, the
//! frame generator, and the frame synchronizer.

pub mod gen;
pub mod plcp;
pub mod subcarrier;
pub mod sync;

pub use gen::FrameGenerator;
pub use sync::{FrameEvent, FrameSynchronizer, SyncConfig, SyncStats};
