use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use super::state::AcquisitionState;
use crate::codec::{PacketFramer, SampleDecoder};
use crate::error::{AcquisitionError, SinkError};
use crate::hal::{ByteSource, DeviceProfile, Sink};
use crate::observability::{AcquisitionStats, StatsMonitor, StatsSnapshot};
use crate::resilience::FailureBudget;

/// Shared stop flag, checked once per loop iteration
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Consecutive failed reads before the run is aborted
    pub max_consecutive_read_failures: u32,
    /// Sleep after a poll that produced no bytes
    pub idle_backoff: Duration,
    /// Zero disables periodic reports
    pub report_interval: Duration,
    pub max_duration: Option<Duration>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_consecutive_read_failures: 3,
            idle_backoff: Duration::from_micros(500),
            report_interval: Duration::from_secs(5),
            max_duration: None,
        }
    }
}

/// Drives one device: poll the source, frame, decode, publish.
///
/// Runs on the calling thread until cancelled, the duration limit passes, the
/// sink closes, or the source fails too many times in a row. Everything the
/// loop mutates is owned by it.
pub struct AcquisitionLoop<Src: ByteSource, Snk: Sink> {
    profile: DeviceProfile,
    source: Src,
    sink: Snk,
    framer: PacketFramer,
    decoder: SampleDecoder,
    stats: AcquisitionStats,
    failures: FailureBudget,
    monitor: StatsMonitor,
    state: AcquisitionState,
    config: LoopConfig,
}

impl<Src: ByteSource, Snk: Sink> AcquisitionLoop<Src, Snk> {
    pub fn new(profile: DeviceProfile, source: Src, sink: Snk) -> Self {
        Self::with_config(profile, source, sink, LoopConfig::default())
    }

    pub fn with_config(profile: DeviceProfile, source: Src, sink: Snk, config: LoopConfig) -> Self {
        Self {
            framer: PacketFramer::new(&profile),
            decoder: SampleDecoder::new(&profile),
            stats: AcquisitionStats::new(),
            failures: FailureBudget::new(config.max_consecutive_read_failures),
            monitor: StatsMonitor::new(config.report_interval),
            state: AcquisitionState::Idle,
            profile,
            source,
            sink,
            config,
        }
    }

    /// Connect, stream until told to stop, then release the source and sink.
    ///
    /// The source is disconnected and the sink closed on every exit path
    /// that got past connecting.
    pub fn run(&mut self, cancel: &CancelToken) -> Result<StatsSnapshot, AcquisitionError> {
        if self.state == AcquisitionState::Stopped {
            self.reset()?;
        }
        self.connect()?;

        let outcome = self.stream(cancel);
        let closed = self.shutdown();

        let snapshot = self.stats.snapshot(Instant::now());
        info!("{}", StatsMonitor::final_report(&snapshot));

        outcome?;
        closed?;
        Ok(snapshot)
    }

    fn connect(&mut self) -> Result<(), AcquisitionError> {
        self.transition(AcquisitionState::Connected)?;
        info!("Connecting to {}", self.source.describe());

        if let Err(err) = self.source.connect() {
            warn!("Connect to {} failed: {}", self.source.describe(), err);
            self.state = AcquisitionState::Stopped;
            return Err(err.into());
        }
        Ok(())
    }

    fn stream(&mut self, cancel: &CancelToken) -> Result<(), AcquisitionError> {
        let started = Instant::now();
        self.stats.start(started);
        self.sink.open(self.profile.metadata())?;
        self.transition(AcquisitionState::Streaming)?;

        info!(
            "Streaming '{}': {} channels at {} Hz, {} bytes per packet",
            self.profile.metadata().name,
            self.profile.channels(),
            self.profile.sample_rate(),
            self.profile.packet_length()
        );

        let deadline = self.config.max_duration.map(|limit| started + limit);

        loop {
            if cancel.is_cancelled() {
                info!("Stop requested");
                return Ok(());
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                info!("Run duration reached");
                return Ok(());
            }

            match self.source.poll_bytes() {
                Ok(bytes) if bytes.is_empty() => {
                    self.failures.record_success();
                    thread::sleep(self.config.idle_backoff);
                }
                Ok(bytes) => {
                    self.failures.record_success();
                    self.stats.record_bytes(bytes.len());
                    self.framer.ingest(&bytes);
                    if !self.forward_packets() {
                        info!("Sink closed, stopping");
                        return Ok(());
                    }
                }
                Err(err) => {
                    self.stats.record_read_error();
                    warn!(
                        "Read from {} failed ({}/{}): {}",
                        self.source.describe(),
                        self.failures.consecutive() + 1,
                        self.failures.threshold(),
                        err
                    );
                    if self.failures.record_failure() {
                        return Err(AcquisitionError::SourceFailed {
                            failures: self.failures.consecutive(),
                            last: err,
                        });
                    }
                    thread::sleep(self.config.idle_backoff);
                }
            }

            if let Some(report) = self.monitor.poll(&self.stats, Instant::now()) {
                info!("{}", report);
            }
        }
    }

    /// Decode and publish every complete packet. False once the sink is closed.
    fn forward_packets(&mut self) -> bool {
        let mut open = true;

        while let Some(packet) = self.framer.try_extract_packet() {
            let sample = match self.decoder.decode(&packet) {
                Ok(sample) => sample,
                Err(err) => {
                    self.stats.record_decode_failure();
                    warn!("Dropping undecodable packet: {}", err);
                    continue;
                }
            };
            self.stats.record_sample();

            match self.sink.push_sample(&sample, None) {
                Ok(()) => {}
                Err(SinkError::Closed) => {
                    open = false;
                    break;
                }
                Err(err) => {
                    self.stats.record_sink_error();
                    warn!("Sink rejected sample: {}", err);
                }
            }
        }

        self.stats.record_framing(self.framer.stats());
        open
    }

    fn shutdown(&mut self) -> Result<(), SinkError> {
        let was_streaming = self.state == AcquisitionState::Streaming;
        self.source.disconnect();
        self.state = AcquisitionState::Stopped;
        debug!("Disconnected from {}", self.source.describe());

        if was_streaming {
            self.sink.close()
        } else {
            Ok(())
        }
    }

    /// Back to Idle with fresh counters and a fresh framer
    fn reset(&mut self) -> Result<(), AcquisitionError> {
        self.transition(AcquisitionState::Idle)?;
        self.framer = PacketFramer::new(&self.profile);
        self.stats = AcquisitionStats::new();
        self.failures.record_success();
        self.monitor = StatsMonitor::new(self.config.report_interval);
        Ok(())
    }

    fn transition(&mut self, next: AcquisitionState) -> Result<(), AcquisitionError> {
        if !self.state.can_transition_to(next) {
            return Err(AcquisitionError::InvalidTransition {
                from: self.state.name(),
                to: next.name(),
            });
        }
        debug!("{} -> {}", self.state.name(), next.name());
        self.state = next;
        Ok(())
    }

    pub fn state(&self) -> AcquisitionState {
        self.state
    }

    pub fn stats(&self) -> &AcquisitionStats {
        &self.stats
    }

    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    pub fn source(&self) -> &Src {
        &self.source
    }

    pub fn sink(&self) -> &Snk {
        &self.sink
    }

    pub fn into_parts(self) -> (Src, Snk) {
        (self.source, self.sink)
    }
}
