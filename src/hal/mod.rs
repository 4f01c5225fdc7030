pub mod device_profile;
pub mod device_storage;
pub mod mock;
pub mod registry;
pub mod serial;
pub mod traits;
pub mod types;

pub use device_profile::{DeviceProfile, ProfileConfig};
pub use device_storage::ProfileStore;
pub use registry::SourceRegistry;
pub use serial::SerialSource;
pub use traits::{ByteSource, Sink};
pub use types::{OutputUnit, SampleEncoding, StreamMetadata, TransportConfig};
