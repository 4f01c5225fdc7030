pub mod channel;
pub mod chunked;
pub mod log_sink;
pub mod memory;

pub use channel::{ChannelSink, TimedSample};
pub use chunked::ChunkedSink;
pub use log_sink::LogSink;
pub use memory::MemorySink;
