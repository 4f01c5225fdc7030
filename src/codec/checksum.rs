use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{FramingError, ProfileError};

/// Integrity check over a packet whose last byte is the checksum.
pub trait Checksum: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    /// Checksum of everything that precedes the trailing checksum byte
    fn compute(&self, body: &[u8]) -> u8;

    fn verify(&self, packet: &[u8]) -> Result<(), FramingError> {
        let Some((&actual, body)) = packet.split_last() else {
            return Err(FramingError::ChecksumMismatch {
                expected: 0,
                actual: 0,
            });
        };
        let expected = self.compute(body);
        if expected == actual {
            Ok(())
        } else {
            Err(FramingError::ChecksumMismatch { expected, actual })
        }
    }
}

/// XOR of every body byte. Reference algorithm for most custom ICs.
#[derive(Debug, Clone, Copy, Default)]
pub struct XorChecksum;

impl Checksum for XorChecksum {
    fn name(&self) -> &'static str {
        "xor"
    }

    fn compute(&self, body: &[u8]) -> u8 {
        body.iter().fold(0u8, |acc, b| acc ^ b)
    }
}

/// Wrapping 8-bit sum of every body byte
#[derive(Debug, Clone, Copy, Default)]
pub struct Sum8Checksum;

impl Checksum for Sum8Checksum {
    fn name(&self) -> &'static str {
        "sum8"
    }

    fn compute(&self, body: &[u8]) -> u8 {
        body.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
    }
}

/// Checksum algorithms selectable from a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumKind {
    Xor,
    Sum8,
}

impl ChecksumKind {
    pub fn build(self) -> Box<dyn Checksum> {
        match self {
            ChecksumKind::Xor => Box::new(XorChecksum),
            ChecksumKind::Sum8 => Box::new(Sum8Checksum),
        }
    }
}

impl Default for ChecksumKind {
    fn default() -> Self {
        ChecksumKind::Xor
    }
}

impl FromStr for ChecksumKind {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xor" => Ok(ChecksumKind::Xor),
            "sum8" | "sum" => Ok(ChecksumKind::Sum8),
            _ => Err(ProfileError::UnknownChecksum(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xor_fold() {
        assert_eq!(XorChecksum.compute(&[0xAA, 0x55]), 0xFF);
        assert_eq!(XorChecksum.compute(&[]), 0);
        assert!(XorChecksum.verify(&[0xAA, 0x55, 0x01, 0xFE]).is_ok());
    }

    #[test]
    fn test_xor_mismatch_reports_both_bytes() {
        let err = XorChecksum.verify(&[0xAA, 0x55, 0x01, 0x00]).unwrap_err();
        assert_eq!(
            err,
            FramingError::ChecksumMismatch {
                expected: 0xFE,
                actual: 0x00
            }
        );
    }

    #[test]
    fn test_sum8_wraps() {
        assert_eq!(Sum8Checksum.compute(&[0xFF, 0x02]), 0x01);
        assert!(Sum8Checksum.verify(&[0xFF, 0x02, 0x01]).is_ok());
    }

    #[test]
    fn test_empty_packet_never_verifies() {
        assert!(XorChecksum.verify(&[]).is_err());
    }
}
