pub mod replay;
pub mod synthetic;

pub use replay::{ReplaySource, ReplayStep};
pub use synthetic::SyntheticSource;
