pub mod monitor;
pub mod stats;

pub use monitor::StatsMonitor;
pub use stats::{AcquisitionStats, StatsSnapshot};
