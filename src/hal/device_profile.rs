use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::types::{OutputUnit, SampleEncoding, StreamMetadata, TransportConfig};
use crate::codec::checksum::ChecksumKind;
use crate::error::ProfileError;

/// Size of the optional little-endian u32 timestamp field
pub const TIMESTAMP_LEN: usize = 4;
/// Size of the optional trailing checksum byte
pub const CHECKSUM_LEN: usize = 1;

/// Upper bound on channels per device
pub const MAX_CHANNELS: usize = 1024;
/// Accepted sample rate range in Hz
pub const MIN_SAMPLE_RATE: f64 = 0.001;
pub const MAX_SAMPLE_RATE: f64 = 1_000_000.0;

/// Device configuration as it appears on disk.
///
/// Every field has a default matching an 8-channel, 1 kHz, 16-bit device with
/// an `AA 55` sync header, so a config file only needs to name what differs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProfileConfig {
    /// Stream name advertised to sinks
    pub name: String,
    pub device_id: String,

    #[serde(flatten)]
    pub transport: TransportConfig,

    pub num_channels: usize,
    /// Hz
    pub sample_rate: f64,
    /// int16, int24, int32 or float32
    pub data_format: String,

    /// Reference voltage (V)
    pub vref: f64,
    /// Amplifier gain
    pub gain: f64,
    /// Full-scale ADC magnitude, 2^(bits-1) - 1 for a signed converter
    pub adc_max: f64,
    /// microvolts, millivolts or volts
    pub output_unit: String,

    pub channel_names: Vec<String>,
    pub channel_types: Vec<String>,

    /// Sync header as hex, e.g. "AA55" or "AA 55"
    pub header_bytes: String,
    pub has_timestamp: bool,
    pub has_checksum: bool,
    /// xor or sum8
    pub checksum: String,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            name: "CustomIC".to_string(),
            device_id: "custom_ic_001".to_string(),
            transport: TransportConfig::default(),
            num_channels: 8,
            sample_rate: 1000.0,
            data_format: "int16".to_string(),
            vref: 3.3,
            gain: 1.0,
            adc_max: 32767.0,
            output_unit: "microvolts".to_string(),
            channel_names: Vec::new(),
            channel_types: Vec::new(),
            header_bytes: "AA55".to_string(),
            has_timestamp: false,
            has_checksum: false,
            checksum: "xor".to_string(),
        }
    }
}

/// Validated, immutable description of a device's packet layout and scaling
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceProfile {
    channels: usize,
    sample_rate: f64,
    encoding: SampleEncoding,
    vref: f64,
    gain: f64,
    adc_max: f64,
    unit: OutputUnit,
    header: Vec<u8>,
    has_timestamp: bool,
    has_checksum: bool,
    checksum: ChecksumKind,
    metadata: StreamMetadata,
}

impl DeviceProfile {
    pub fn from_config(config: &ProfileConfig) -> Result<Self, ProfileError> {
        if config.num_channels == 0 {
            return Err(ProfileError::NoChannels);
        }
        if config.num_channels > MAX_CHANNELS {
            return Err(ProfileError::TooManyChannels {
                count: config.num_channels,
                max: MAX_CHANNELS,
            });
        }
        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&config.sample_rate) {
            return Err(ProfileError::InvalidSampleRate(config.sample_rate));
        }

        let header = parse_hex_bytes(&config.header_bytes)?;
        if header.is_empty() {
            return Err(ProfileError::EmptyHeader);
        }

        let encoding: SampleEncoding = config.data_format.parse()?;
        let unit: OutputUnit = config.output_unit.parse()?;
        let checksum: ChecksumKind = config.checksum.parse()?;

        for (field, value) in [
            ("vref", config.vref),
            ("gain", config.gain),
            ("adc_max", config.adc_max),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ProfileError::InvalidScaling { field, value });
            }
        }

        let channel_names = channel_list(
            "channel_names",
            &config.channel_names,
            config.num_channels,
            |i| format!("Ch{}", i + 1),
        )?;
        let channel_types = channel_list(
            "channel_types",
            &config.channel_types,
            config.num_channels,
            |_| "EEG".to_string(),
        )?;

        Ok(Self {
            channels: config.num_channels,
            sample_rate: config.sample_rate,
            encoding,
            vref: config.vref,
            gain: config.gain,
            adc_max: config.adc_max,
            unit,
            header,
            has_timestamp: config.has_timestamp,
            has_checksum: config.has_checksum,
            checksum,
            metadata: StreamMetadata {
                name: config.name.clone(),
                device_id: config.device_id.clone(),
                sample_rate: config.sample_rate,
                unit,
                channel_names,
                channel_types,
            },
        })
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Time between two consecutive packets
    pub fn sample_period(&self) -> Duration {
        // the validated rate range keeps this well inside Duration
        Duration::try_from_secs_f64(1.0 / self.sample_rate).unwrap_or(Duration::MAX)
    }

    pub fn encoding(&self) -> SampleEncoding {
        self.encoding
    }

    pub fn vref(&self) -> f64 {
        self.vref
    }

    pub fn gain(&self) -> f64 {
        self.gain
    }

    pub fn adc_max(&self) -> f64 {
        self.adc_max
    }

    pub fn unit(&self) -> OutputUnit {
        self.unit
    }

    pub fn header(&self) -> &[u8] {
        &self.header
    }

    pub fn has_timestamp(&self) -> bool {
        self.has_timestamp
    }

    pub fn has_checksum(&self) -> bool {
        self.has_checksum
    }

    pub fn checksum_kind(&self) -> ChecksumKind {
        self.checksum
    }

    pub fn metadata(&self) -> &StreamMetadata {
        &self.metadata
    }

    /// Bytes occupied by the channel values
    pub fn payload_length(&self) -> usize {
        self.channels * self.encoding.bytes_per_sample()
    }

    /// Offset of the first channel value inside a packet
    pub fn payload_offset(&self) -> usize {
        self.header.len() + if self.has_timestamp { TIMESTAMP_LEN } else { 0 }
    }

    /// Fixed on-wire size of one packet. Never zero: the header is non-empty.
    pub fn packet_length(&self) -> usize {
        self.payload_offset()
            + self.payload_length()
            + if self.has_checksum { CHECKSUM_LEN } else { 0 }
    }
}

impl TryFrom<&ProfileConfig> for DeviceProfile {
    type Error = ProfileError;

    fn try_from(config: &ProfileConfig) -> Result<Self, Self::Error> {
        DeviceProfile::from_config(config)
    }
}

/// Parse "AA55", "AA 55" or "0xAA 0x55" into bytes
pub fn parse_hex_bytes(text: &str) -> Result<Vec<u8>, ProfileError> {
    let invalid = || ProfileError::InvalidHeader(text.to_string());

    let digits: String = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.strip_prefix("0x")
                .or_else(|| part.strip_prefix("0X"))
                .unwrap_or(part)
        })
        .collect();

    if digits.len() % 2 != 0 {
        return Err(invalid());
    }

    (0..digits.len())
        .step_by(2)
        .map(|i| {
            digits
                .get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(invalid)
        })
        .collect()
}

/// Render bytes the way `parse_hex_bytes` reads them back
pub fn format_hex_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

fn channel_list(
    field: &'static str,
    given: &[String],
    expected: usize,
    default: impl Fn(usize) -> String,
) -> Result<Vec<String>, ProfileError> {
    if given.is_empty() {
        return Ok((0..expected).map(default).collect());
    }
    if given.len() != expected {
        return Err(ProfileError::ChannelListMismatch {
            field,
            expected,
            actual: given.len(),
        });
    }
    Ok(given.to_vec())
}
