use super::types::StreamMetadata;
use crate::codec::Sample;
use crate::error::{ConnectError, SinkError, SourceReadError};

/// Supplies raw, unframed bytes from a device transport
pub trait ByteSource: Send {
    /// Short name used in logs (e.g. "serial:/dev/ttyUSB0")
    fn describe(&self) -> String;

    /// Open the transport. Fails fast; retry policy belongs to the caller.
    fn connect(&mut self) -> Result<(), ConnectError>;

    /// Release the transport. Safe to call when already disconnected.
    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;

    /// Bytes that arrived since the last poll, possibly none.
    ///
    /// Must return within a short bound (~100 ms) so the caller stays
    /// responsive to cancellation.
    fn poll_bytes(&mut self) -> Result<Vec<u8>, SourceReadError>;
}

/// Downstream consumer of decoded samples (an LSL outlet, a channel, a file)
pub trait Sink: Send {
    /// Called once before the first sample
    fn open(&mut self, _metadata: &StreamMetadata) -> Result<(), SinkError> {
        Ok(())
    }

    fn push_sample(&mut self, sample: &Sample, timestamp: Option<f64>) -> Result<(), SinkError>;

    /// Batched form; the default pushes each sample without a timestamp
    fn push_chunk(&mut self, samples: &[Sample]) -> Result<(), SinkError> {
        for sample in samples {
            self.push_sample(sample, None)?;
        }
        Ok(())
    }

    /// Called once when streaming stops
    fn close(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn open(&mut self, metadata: &StreamMetadata) -> Result<(), SinkError> {
        (**self).open(metadata)
    }

    fn push_sample(&mut self, sample: &Sample, timestamp: Option<f64>) -> Result<(), SinkError> {
        (**self).push_sample(sample, timestamp)
    }

    fn push_chunk(&mut self, samples: &[Sample]) -> Result<(), SinkError> {
        (**self).push_chunk(samples)
    }

    fn close(&mut self) -> Result<(), SinkError> {
        (**self).close()
    }
}

impl<B: ByteSource + ?Sized> ByteSource for Box<B> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn connect(&mut self) -> Result<(), ConnectError> {
        (**self).connect()
    }

    fn disconnect(&mut self) {
        (**self).disconnect()
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn poll_bytes(&mut self) -> Result<Vec<u8>, SourceReadError> {
        (**self).poll_bytes()
    }
}
