use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use log::warn;

use crate::codec::Sample;
use crate::error::SinkError;
use crate::hal::Sink;

/// A sample paired with the optional publication timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct TimedSample {
    pub sample: Sample,
    pub timestamp: Option<f64>,
}

/// Hands samples to another thread over a bounded channel.
///
/// Never blocks the acquisition loop: when the channel is full the sample is
/// dropped and counted. A disconnected receiver closes the sink.
pub struct ChannelSink {
    tx: Sender<TimedSample>,
    dropped: u64,
}

impl ChannelSink {
    pub fn new(capacity: usize) -> (Self, Receiver<TimedSample>) {
        let (tx, rx) = bounded(capacity.max(1));
        (Self { tx, dropped: 0 }, rx)
    }

    /// Samples lost because the consumer fell behind
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl Sink for ChannelSink {
    fn push_sample(&mut self, sample: &Sample, timestamp: Option<f64>) -> Result<(), SinkError> {
        let item = TimedSample {
            sample: sample.clone(),
            timestamp,
        };
        match self.tx.try_send(item) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.dropped += 1;
                if self.dropped.is_power_of_two() {
                    warn!("channel sink full, {} samples dropped so far", self.dropped);
                }
                Ok(())
            }
            Err(TrySendError::Disconnected(_)) => Err(SinkError::Closed),
        }
    }
}
