use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{DecodeError, ProfileError};

/// Numeric encoding of one channel value inside a packet (always little-endian)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleEncoding {
    Int16,
    Int24, // 3 bytes, sign-extended from bit 23
    Int32,
    Float32, // pre-calibrated, never scaled
}

impl SampleEncoding {
    pub fn bytes_per_sample(self) -> usize {
        match self {
            SampleEncoding::Int16 => 2,
            SampleEncoding::Int24 => 3,
            SampleEncoding::Int32 | SampleEncoding::Float32 => 4,
        }
    }

    pub fn is_integer(self) -> bool {
        !matches!(self, SampleEncoding::Float32)
    }

    /// Inclusive range of raw counts representable by the encoding
    pub fn count_range(self) -> (i64, i64) {
        match self {
            SampleEncoding::Int16 => (i16::MIN as i64, i16::MAX as i64),
            SampleEncoding::Int24 => (-(1 << 23), (1 << 23) - 1),
            SampleEncoding::Int32 => (i32::MIN as i64, i32::MAX as i64),
            SampleEncoding::Float32 => (i64::MIN, i64::MAX),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SampleEncoding::Int16 => "int16",
            SampleEncoding::Int24 => "int24",
            SampleEncoding::Int32 => "int32",
            SampleEncoding::Float32 => "float32",
        }
    }
}

impl Default for SampleEncoding {
    fn default() -> Self {
        SampleEncoding::Int16
    }
}

impl FromStr for SampleEncoding {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "int16" | "i16" => Ok(SampleEncoding::Int16),
            "int24" | "i24" => Ok(SampleEncoding::Int24),
            "int32" | "i32" => Ok(SampleEncoding::Int32),
            "float32" | "f32" => Ok(SampleEncoding::Float32),
            _ => Err(DecodeError::UnsupportedEncoding(s.to_string())),
        }
    }
}

impl fmt::Display for SampleEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical unit the decoded samples are expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputUnit {
    Microvolts,
    Millivolts,
    Volts,
}

impl OutputUnit {
    /// Factor converting volts into this unit
    pub fn multiplier(self) -> f64 {
        match self {
            OutputUnit::Microvolts => 1e6,
            OutputUnit::Millivolts => 1e3,
            OutputUnit::Volts => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OutputUnit::Microvolts => "microvolts",
            OutputUnit::Millivolts => "millivolts",
            OutputUnit::Volts => "volts",
        }
    }
}

impl Default for OutputUnit {
    fn default() -> Self {
        OutputUnit::Microvolts
    }
}

impl FromStr for OutputUnit {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "microvolts" | "uv" => Ok(OutputUnit::Microvolts),
            "millivolts" | "mv" => Ok(OutputUnit::Millivolts),
            "volts" | "v" => Ok(OutputUnit::Volts),
            _ => Err(ProfileError::UnknownUnit(s.to_string())),
        }
    }
}

impl fmt::Display for OutputUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptive metadata handed to sinks when a stream opens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamMetadata {
    pub name: String,
    pub device_id: String,
    pub sample_rate: f64,
    pub unit: OutputUnit,
    pub channel_names: Vec<String>,
    pub channel_types: Vec<String>,
}

impl StreamMetadata {
    pub fn channel_count(&self) -> usize {
        self.channel_names.len()
    }
}

/// How to reach the device. The locator is opaque to the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Registered source kind ("serial", "simulate")
    pub interface: String,
    /// Serial port or device path
    pub port: String,
    pub baudrate: u32,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            interface: "serial".to_string(),
            port: "/dev/ttyUSB0".to_string(),
            baudrate: 2_000_000,
        }
    }
}
