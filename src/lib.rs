//! Turns the raw byte stream of a custom acquisition IC into scaled,
//! per-channel samples for a streaming sink.

pub mod codec;
pub mod engine;
pub mod error;
pub mod hal;
pub mod observability;
pub mod resilience;
pub mod sinks;

pub use codec::{Packet, PacketFramer, Sample, SampleDecoder};
pub use engine::{AcquisitionLoop, AcquisitionState, CancelToken, LoopConfig};
pub use hal::{ByteSource, DeviceProfile, ProfileConfig, Sink};
