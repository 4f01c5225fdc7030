use crate::codec::Sample;
use crate::error::SinkError;
use crate::hal::{Sink, StreamMetadata};

/// Keeps every sample in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    metadata: Option<StreamMetadata>,
    samples: Vec<Sample>,
    timestamps: Vec<Option<f64>>,
    chunks: usize,
    closed: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metadata(&self) -> Option<&StreamMetadata> {
        self.metadata.as_ref()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn timestamps(&self) -> &[Option<f64>] {
        &self.timestamps
    }

    /// Number of `push_chunk` calls received
    pub fn chunks(&self) -> usize {
        self.chunks
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }
}

impl Sink for MemorySink {
    fn open(&mut self, metadata: &StreamMetadata) -> Result<(), SinkError> {
        self.metadata = Some(metadata.clone());
        Ok(())
    }

    fn push_sample(&mut self, sample: &Sample, timestamp: Option<f64>) -> Result<(), SinkError> {
        if let Some(meta) = &self.metadata {
            if meta.channel_count() != sample.channels() {
                return Err(SinkError::ChannelMismatch {
                    expected: meta.channel_count(),
                    actual: sample.channels(),
                });
            }
        }
        self.samples.push(sample.clone());
        self.timestamps.push(timestamp);
        Ok(())
    }

    fn push_chunk(&mut self, samples: &[Sample]) -> Result<(), SinkError> {
        self.chunks += 1;
        for sample in samples {
            self.push_sample(sample, None)?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        self.closed = true;
        Ok(())
    }
}
