use log::{debug, info};

use crate::codec::Sample;
use crate::error::SinkError;
use crate::hal::{Sink, StreamMetadata};

/// Logs stream metadata on open and every `every`-th sample at debug level
pub struct LogSink {
    label: String,
    every: u64,
    seen: u64,
}

impl LogSink {
    pub fn new(label: impl Into<String>, every: u64) -> Self {
        Self {
            label: label.into(),
            every: every.max(1),
            seen: 0,
        }
    }

    pub fn seen(&self) -> u64 {
        self.seen
    }
}

impl Sink for LogSink {
    fn open(&mut self, metadata: &StreamMetadata) -> Result<(), SinkError> {
        info!("[{}] Stream '{}' ({})", self.label, metadata.name, metadata.device_id);
        info!("[{}]   Channels: {}", self.label, metadata.channel_count());
        info!("[{}]   Sample rate: {} Hz", self.label, metadata.sample_rate);
        info!(
            "[{}]   Channel names: {}",
            self.label,
            metadata.channel_names.join(", ")
        );
        Ok(())
    }

    fn push_sample(&mut self, sample: &Sample, _timestamp: Option<f64>) -> Result<(), SinkError> {
        if self.seen % self.every == 0 {
            let values: Vec<String> = sample.values.iter().map(|v| format!("{:.2}", v)).collect();
            debug!("[{}] #{} [{}]", self.label, self.seen, values.join(", "));
        }
        self.seen += 1;
        Ok(())
    }
}
