use serde::{Deserialize, Serialize};

use super::framer::Packet;
use crate::error::DecodeError;
use crate::hal::device_profile::TIMESTAMP_LEN;
use crate::hal::{DeviceProfile, SampleEncoding};

/// One decoded multi-channel sample in the profile's output unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub values: Vec<f64>,
    /// Raw device counter from the packet's timestamp field, when the
    /// profile has one. Not converted to any time base.
    pub device_ticks: Option<u32>,
}

impl Sample {
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            device_ticks: None,
        }
    }

    pub fn channels(&self) -> usize {
        self.values.len()
    }
}

/// Converts packet payloads into physical units.
///
/// `scale` is computed once: volts per ADC count, times the unit multiplier.
#[derive(Debug, Clone)]
pub struct SampleDecoder {
    encoding: SampleEncoding,
    channels: usize,
    offset: usize,
    has_timestamp: bool,
    scale: f64,
}

impl SampleDecoder {
    pub fn new(profile: &DeviceProfile) -> Self {
        Self {
            encoding: profile.encoding(),
            channels: profile.channels(),
            offset: profile.payload_offset(),
            has_timestamp: profile.has_timestamp(),
            scale: scale_factor(profile),
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn decode(&self, packet: &Packet) -> Result<Sample, DecodeError> {
        self.decode_bytes(packet.as_bytes())
    }

    pub fn decode_bytes(&self, packet: &[u8]) -> Result<Sample, DecodeError> {
        let width = self.encoding.bytes_per_sample();
        let needed = self.offset + self.channels * width;
        if packet.len() < needed {
            return Err(DecodeError::Truncated {
                needed,
                actual: packet.len(),
            });
        }

        let device_ticks = self.has_timestamp.then(|| {
            let start = self.offset - TIMESTAMP_LEN;
            u32::from_le_bytes([
                packet[start],
                packet[start + 1],
                packet[start + 2],
                packet[start + 3],
            ])
        });

        let payload = &packet[self.offset..needed];
        let values = payload
            .chunks_exact(width)
            .map(|b| match self.encoding {
                SampleEncoding::Int16 => i16::from_le_bytes([b[0], b[1]]) as f64 * self.scale,
                SampleEncoding::Int24 => read_i24_le(b) as f64 * self.scale,
                SampleEncoding::Int32 => {
                    i32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f64 * self.scale
                }
                SampleEncoding::Float32 => f32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f64,
            })
            .collect();

        Ok(Sample {
            values,
            device_ticks,
        })
    }
}

/// Physical units per ADC count for a profile
pub fn scale_factor(profile: &DeviceProfile) -> f64 {
    profile.vref() / (profile.adc_max() * profile.gain()) * profile.unit().multiplier()
}

/// Little-endian 24-bit two's complement, sign-extended from bit 23
pub fn read_i24_le(bytes: &[u8]) -> i32 {
    let raw = (bytes[0] as i32) | ((bytes[1] as i32) << 8) | ((bytes[2] as i32) << 16);
    (raw << 8) >> 8
}
