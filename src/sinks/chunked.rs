use crate::codec::Sample;
use crate::error::SinkError;
use crate::hal::{Sink, StreamMetadata};

/// Groups samples and forwards them to the inner sink as one chunk.
///
/// A partial chunk is flushed when the sink closes.
pub struct ChunkedSink<S: Sink> {
    inner: S,
    chunk_size: usize,
    pending: Vec<Sample>,
}

impl<S: Sink> ChunkedSink<S> {
    pub fn new(inner: S, chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            inner,
            chunk_size,
            pending: Vec::with_capacity(chunk_size),
        }
    }

    /// Chunk of roughly 50 ms at the given rate
    pub fn for_rate(inner: S, sample_rate: f64) -> Self {
        Self::new(inner, (sample_rate / 20.0) as usize)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    pub fn flush(&mut self) -> Result<(), SinkError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let result = self.inner.push_chunk(&self.pending);
        self.pending.clear();
        result
    }
}

impl<S: Sink> Sink for ChunkedSink<S> {
    fn open(&mut self, metadata: &StreamMetadata) -> Result<(), SinkError> {
        self.inner.open(metadata)
    }

    fn push_sample(&mut self, sample: &Sample, _timestamp: Option<f64>) -> Result<(), SinkError> {
        self.pending.push(sample.clone());
        if self.pending.len() >= self.chunk_size {
            self.flush()?;
        }
        Ok(())
    }

    fn push_chunk(&mut self, samples: &[Sample]) -> Result<(), SinkError> {
        for sample in samples {
            self.push_sample(sample, None)?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        let flushed = self.flush();
        let closed = self.inner.close();
        flushed.and(closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::MemorySink;

    #[test]
    fn test_forwards_full_chunks() {
        let mut sink = ChunkedSink::new(MemorySink::new(), 3);
        for i in 0..7 {
            sink.push_sample(&Sample::new(vec![i as f64]), None).unwrap();
        }
        assert_eq!(sink.inner().chunks(), 2);
        assert_eq!(sink.inner().samples().len(), 6);
        assert_eq!(sink.pending(), 1);

        sink.close().unwrap();
        assert_eq!(sink.inner().chunks(), 3);
        assert_eq!(sink.inner().samples().len(), 7);
        assert!(sink.inner().is_closed());
    }

    #[test]
    fn test_chunk_size_from_rate() {
        assert_eq!(ChunkedSink::for_rate(MemorySink::new(), 1000.0).chunk_size(), 50);
        assert_eq!(ChunkedSink::for_rate(MemorySink::new(), 10.0).chunk_size(), 1);
    }
}
