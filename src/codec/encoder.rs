use super::checksum::Checksum;
use super::decoder::scale_factor;
use crate::hal::{DeviceProfile, SampleEncoding};

/// Inverse of `SampleDecoder`: physical values to on-wire packets.
///
/// Used by the synthetic source and by tests; real devices never need it.
#[derive(Debug)]
pub struct SampleEncoder {
    encoding: SampleEncoding,
    channels: usize,
    header: Vec<u8>,
    has_timestamp: bool,
    checksum: Option<Box<dyn Checksum>>,
    packet_length: usize,
    scale: f64,
}

impl SampleEncoder {
    pub fn new(profile: &DeviceProfile) -> Self {
        Self {
            encoding: profile.encoding(),
            channels: profile.channels(),
            header: profile.header().to_vec(),
            has_timestamp: profile.has_timestamp(),
            checksum: profile
                .has_checksum()
                .then(|| profile.checksum_kind().build()),
            packet_length: profile.packet_length(),
            scale: scale_factor(profile),
        }
    }

    /// Physical value to the nearest representable ADC count
    pub fn to_counts(&self, value: f64) -> i64 {
        let (min, max) = self.encoding.count_range();
        (value / self.scale).round().clamp(min as f64, max as f64) as i64
    }

    /// Build a complete packet. `values` must hold one entry per channel;
    /// `ticks` fills the timestamp field when the profile has one.
    ///
    /// # Panics
    ///
    /// Panics if `values.len()` differs from the profile's channel count.
    pub fn encode(&self, values: &[f64], ticks: u32) -> Vec<u8> {
        assert_eq!(values.len(), self.channels, "one value per channel");

        let mut packet = Vec::with_capacity(self.packet_length);
        packet.extend_from_slice(&self.header);
        if self.has_timestamp {
            packet.extend_from_slice(&ticks.to_le_bytes());
        }

        for &value in values {
            match self.encoding {
                SampleEncoding::Int16 => {
                    packet.extend_from_slice(&(self.to_counts(value) as i16).to_le_bytes())
                }
                SampleEncoding::Int24 => {
                    let counts = self.to_counts(value) as i32;
                    packet.extend_from_slice(&counts.to_le_bytes()[..3]);
                }
                SampleEncoding::Int32 => {
                    packet.extend_from_slice(&(self.to_counts(value) as i32).to_le_bytes())
                }
                SampleEncoding::Float32 => packet.extend_from_slice(&(value as f32).to_le_bytes()),
            }
        }

        if let Some(checksum) = &self.checksum {
            let sum = checksum.compute(&packet);
            packet.push(sum);
        }

        debug_assert_eq!(packet.len(), self.packet_length);
        packet
    }

    pub fn packet_length(&self) -> usize {
        self.packet_length
    }
}
