use log::{debug, warn};

use super::checksum::Checksum;
use super::raw_buffer::RawBuffer;
use crate::error::FramingError;
use crate::hal::DeviceProfile;

/// One complete, integrity-checked packet of exactly `packet_length` bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    bytes: Vec<u8>,
}

impl Packet {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl From<Vec<u8>> for Packet {
    fn from(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

/// Counters kept by the framer. Never reset while the framer lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FramerStats {
    pub packets_extracted: u64,
    pub checksum_failures: u64,
    /// Garbage before a header plus bytes trimmed when no header was found
    pub bytes_discarded: u64,
    pub header_misses: u64,
}

/// Recovers fixed-size packets from an unframed byte stream.
///
/// The buffer is always rescanned from its start after an extraction, so the
/// framer resynchronises on the next header after dropped, duplicated or
/// corrupted bytes.
pub struct PacketFramer {
    buffer: RawBuffer,
    header: Vec<u8>,
    packet_length: usize,
    checksum: Option<Box<dyn Checksum>>,
    stats: FramerStats,
    last_error: Option<FramingError>,
}

impl PacketFramer {
    pub fn new(profile: &DeviceProfile) -> Self {
        let checksum = profile
            .has_checksum()
            .then(|| profile.checksum_kind().build());
        Self::with_layout(profile.header().to_vec(), profile.packet_length(), checksum)
    }

    /// Framer over an explicit layout. `header` must be non-empty and no
    /// longer than `packet_length`.
    pub fn with_layout(
        header: Vec<u8>,
        packet_length: usize,
        checksum: Option<Box<dyn Checksum>>,
    ) -> Self {
        debug_assert!(!header.is_empty());
        debug_assert!(header.len() <= packet_length);
        Self {
            buffer: RawBuffer::with_capacity(packet_length * 4),
            header,
            packet_length,
            checksum,
            stats: FramerStats::default(),
            last_error: None,
        }
    }

    /// Swap in a different checksum algorithm (or disable validation)
    pub fn set_checksum(&mut self, checksum: Option<Box<dyn Checksum>>) {
        self.checksum = checksum;
    }

    pub fn ingest(&mut self, bytes: &[u8]) {
        self.buffer.extend(bytes);
    }

    /// Extract the next valid packet, or `None` once no complete packet is
    /// buffered. Packets failing the checksum are dropped and counted; the
    /// search then continues on the remaining bytes.
    pub fn try_extract_packet(&mut self) -> Option<Packet> {
        loop {
            let header_len = self.header.len();

            let Some(offset) = self.buffer.find(&self.header) else {
                // Keep a possible header prefix split across two reads.
                let dropped = self.buffer.keep_last(header_len - 1);
                if dropped > 0 {
                    self.stats.bytes_discarded += dropped as u64;
                    self.stats.header_misses += 1;
                    self.last_error = Some(FramingError::HeaderNotFound { discarded: dropped });
                    debug!("no sync header in buffer, dropped {} bytes", dropped);
                }
                return None;
            };

            if offset > 0 {
                self.buffer.consume(offset);
                self.stats.bytes_discarded += offset as u64;
                debug!("discarded {} bytes before sync header", offset);
            }

            if self.buffer.len() < self.packet_length {
                return None;
            }

            let bytes = self.buffer.take_front(self.packet_length);

            if let Some(checksum) = &self.checksum {
                if let Err(err) = checksum.verify(&bytes) {
                    self.stats.checksum_failures += 1;
                    self.last_error = Some(err);
                    warn!("{}, dropping packet", err);
                    continue;
                }
            }

            self.stats.packets_extracted += 1;
            return Some(Packet { bytes });
        }
    }

    /// Drain every packet currently extractable
    pub fn drain_packets(&mut self) -> Vec<Packet> {
        std::iter::from_fn(|| self.try_extract_packet()).collect()
    }

    pub fn stats(&self) -> FramerStats {
        self.stats
    }

    /// Most recent framing error, kept for diagnostics only
    pub fn last_error(&self) -> Option<FramingError> {
        self.last_error
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn packet_length(&self) -> usize {
        self.packet_length
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}

impl std::fmt::Debug for PacketFramer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PacketFramer")
            .field("header", &self.header)
            .field("packet_length", &self.packet_length)
            .field("buffered", &self.buffer.len())
            .field("checksum", &self.checksum.as_ref().map(|c| c.name()))
            .field("stats", &self.stats)
            .finish()
    }
}
