pub mod checksum;
pub mod decoder;
pub mod encoder;
pub mod framer;
pub mod raw_buffer;

pub use checksum::{Checksum, ChecksumKind, Sum8Checksum, XorChecksum};
pub use decoder::{Sample, SampleDecoder};
pub use encoder::SampleEncoder;
pub use framer::{FramerStats, Packet, PacketFramer};
pub use raw_buffer::RawBuffer;
