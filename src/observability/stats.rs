use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::codec::FramerStats;

/// Counters for one acquisition run. Owned and mutated by the loop only.
#[derive(Debug, Clone, Default)]
pub struct AcquisitionStats {
    started_at: Option<Instant>,
    samples_produced: u64,
    decode_failures: u64,
    checksum_failures: u64,
    bytes_received: u64,
    bytes_discarded: u64,
    header_misses: u64,
    read_errors: u64,
    sink_errors: u64,
}

impl AcquisitionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, now: Instant) {
        self.started_at = Some(now);
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    pub fn record_bytes(&mut self, n: usize) {
        self.bytes_received += n as u64;
    }

    pub fn record_sample(&mut self) {
        self.samples_produced += 1;
    }

    pub fn record_decode_failure(&mut self) {
        self.decode_failures += 1;
    }

    pub fn record_read_error(&mut self) {
        self.read_errors += 1;
    }

    pub fn record_sink_error(&mut self) {
        self.sink_errors += 1;
    }

    /// Fold in the framer's own counters, which only ever grow
    pub fn record_framing(&mut self, framer: FramerStats) {
        self.checksum_failures = self.checksum_failures.max(framer.checksum_failures);
        self.bytes_discarded = self.bytes_discarded.max(framer.bytes_discarded);
        self.header_misses = self.header_misses.max(framer.header_misses);
    }

    pub fn samples_produced(&self) -> u64 {
        self.samples_produced
    }

    /// Packets dropped for a bad checksum or a failed decode
    pub fn packets_rejected(&self) -> u64 {
        self.checksum_failures + self.decode_failures
    }

    pub fn checksum_failures(&self) -> u64 {
        self.checksum_failures
    }

    pub fn decode_failures(&self) -> u64 {
        self.decode_failures
    }

    pub fn read_errors(&self) -> u64 {
        self.read_errors
    }

    pub fn sink_errors(&self) -> u64 {
        self.sink_errors
    }

    pub fn bytes_received(&self) -> u64 {
        self.bytes_received
    }

    pub fn bytes_discarded(&self) -> u64 {
        self.bytes_discarded
    }

    /// Times the buffer held no sync header and was trimmed
    pub fn header_misses(&self) -> u64 {
        self.header_misses
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        self.started_at
            .map(|start| now.saturating_duration_since(start))
            .unwrap_or_default()
    }

    pub fn snapshot(&self, now: Instant) -> StatsSnapshot {
        let elapsed = self.elapsed(now).as_secs_f64();
        StatsSnapshot {
            samples_produced: self.samples_produced,
            packets_rejected: self.packets_rejected(),
            checksum_failures: self.checksum_failures,
            decode_failures: self.decode_failures,
            read_errors: self.read_errors,
            sink_errors: self.sink_errors,
            bytes_received: self.bytes_received,
            bytes_discarded: self.bytes_discarded,
            header_misses: self.header_misses,
            elapsed_secs: elapsed,
            effective_rate: if elapsed > 0.0 {
                self.samples_produced as f64 / elapsed
            } else {
                0.0
            },
        }
    }
}

/// Point-in-time copy of the counters, suitable for logging or export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub samples_produced: u64,
    pub packets_rejected: u64,
    pub checksum_failures: u64,
    pub decode_failures: u64,
    pub read_errors: u64,
    pub sink_errors: u64,
    pub bytes_received: u64,
    pub bytes_discarded: u64,
    pub header_misses: u64,
    pub elapsed_secs: f64,
    /// Samples per second since the run started
    pub effective_rate: f64,
}
