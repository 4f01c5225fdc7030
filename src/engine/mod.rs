pub mod acquisition;
pub mod state;

pub use acquisition::{AcquisitionLoop, CancelToken, LoopConfig};
pub use state::AcquisitionState;
