use std::thread;
use std::time::Duration;

use icstream::codec::SampleEncoder;
use icstream::engine::{AcquisitionLoop, AcquisitionState, CancelToken, LoopConfig};
use icstream::error::{AcquisitionError, ConnectError, SinkError, SourceReadError};
use icstream::hal::mock::{ReplaySource, ReplayStep, SyntheticSource};
use icstream::hal::{ByteSource, DeviceProfile, ProfileConfig, Sink};
use icstream::sinks::{ChannelSink, MemorySink};
use icstream::Sample;

fn profile() -> DeviceProfile {
    DeviceProfile::from_config(&ProfileConfig {
        num_channels: 2,
        sample_rate: 500.0,
        has_checksum: true,
        ..ProfileConfig::default()
    })
    .unwrap()
}

fn fast() -> LoopConfig {
    LoopConfig {
        idle_backoff: Duration::ZERO,
        max_duration: Some(Duration::from_secs(5)),
        ..LoopConfig::default()
    }
}

fn fail(reason: &str) -> ReplayStep {
    ReplayStep::Fail(reason.to_string())
}

#[test]
fn test_three_consecutive_read_errors_are_fatal() {
    let source = ReplaySource::new(vec![fail("a"), fail("b"), fail("c"), ReplayStep::Idle]);
    let mut acq = AcquisitionLoop::with_config(profile(), source, MemorySink::new(), fast());

    let err = acq.run(&CancelToken::new()).unwrap_err();
    match err {
        AcquisitionError::SourceFailed { failures, last } => {
            assert_eq!(failures, 3);
            assert!(matches!(last, SourceReadError::Transport(ref r) if r == "c"));
        }
        other => panic!("unexpected error: {}", other),
    }

    assert_eq!(acq.state(), AcquisitionState::Stopped);
    assert_eq!(acq.stats().read_errors(), 3);
    assert!(!acq.source().is_connected());
    assert!(acq.sink().is_closed());
}

#[test]
fn test_success_resets_failure_count() {
    let profile = profile();
    let packet = SampleEncoder::new(&profile).encode(&[1.0, 2.0], 0);

    let source = ReplaySource::new(vec![
        fail("a"),
        fail("b"),
        ReplayStep::Bytes(packet),
        fail("c"),
        fail("d"),
        ReplayStep::Idle,
        fail("e"),
        fail("f"),
        fail("g"),
    ]);
    let mut acq = AcquisitionLoop::with_config(profile, source, MemorySink::new(), fast());

    let err = acq.run(&CancelToken::new()).unwrap_err();
    assert!(matches!(err, AcquisitionError::SourceFailed { failures: 3, .. }));
    assert_eq!(acq.stats().read_errors(), 7);
    assert_eq!(acq.sink().samples().len(), 1);
    assert_eq!(acq.source().remaining(), 0);
}

#[test]
fn test_connect_failure_is_returned_without_streaming() {
    let source = ReplaySource::new(vec![]).refusing_connect();
    let mut acq = AcquisitionLoop::with_config(profile(), source, MemorySink::new(), fast());

    let err = acq.run(&CancelToken::new()).unwrap_err();
    assert!(matches!(
        err,
        AcquisitionError::Connect(ConnectError::DeviceUnavailable { .. })
    ));
    assert_eq!(acq.source().polls(), 0);
    assert!(acq.sink().metadata().is_none());
    assert!(!acq.sink().is_closed());
    assert_eq!(acq.state(), AcquisitionState::Stopped);
}

#[test]
fn test_bad_checksum_and_garbage_are_counted_not_fatal() {
    let profile = profile();
    let encoder = SampleEncoder::new(&profile);
    let good = encoder.encode(&[100.0, -100.0], 0);
    let mut corrupt = good.clone();
    corrupt[3] ^= 0xFF;

    let mut stream = vec![0x00, 0x01, 0x02];
    stream.extend(&corrupt);
    stream.extend(&good);

    let source = ReplaySource::from_chunks(vec![stream]);
    let cancel = CancelToken::new();
    let config = LoopConfig {
        max_duration: Some(Duration::from_millis(100)),
        ..fast()
    };
    let mut acq = AcquisitionLoop::with_config(profile, source, MemorySink::new(), config);

    let snapshot = acq.run(&cancel).unwrap();
    assert_eq!(snapshot.samples_produced, 1);
    assert_eq!(snapshot.checksum_failures, 1);
    assert_eq!(snapshot.packets_rejected, 1);
    assert!(snapshot.bytes_discarded >= 3);
}

#[test]
fn test_cancel_from_another_thread_stops_and_disconnects() {
    let profile = profile();
    let source = SyntheticSource::new(&profile);
    let config = LoopConfig {
        max_duration: None,
        ..LoopConfig::default()
    };
    let mut acq = AcquisitionLoop::with_config(profile, source, MemorySink::new(), config);

    let cancel = CancelToken::new();
    let remote = cancel.clone();
    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        remote.cancel();
    });

    let snapshot = acq.run(&cancel).unwrap();
    stopper.join().unwrap();

    assert!(snapshot.samples_produced > 0);
    assert_eq!(acq.state(), AcquisitionState::Stopped);
    let (source, sink) = acq.into_parts();
    assert!(!source.is_connected());
    assert!(sink.is_closed());
    assert_eq!(sink.samples().len() as u64, snapshot.samples_produced);
    assert_eq!(sink.metadata().unwrap().channel_count(), 2);
}

#[test]
fn test_closed_sink_stops_the_loop() {
    let profile = profile();
    let source = SyntheticSource::new(&profile);
    let (sink, rx) = ChannelSink::new(16);
    let mut acq = AcquisitionLoop::with_config(profile, source, sink, LoopConfig::default());

    let consumer = thread::spawn(move || {
        let first: Vec<_> = rx.iter().take(5).collect();
        first.len()
    });

    let snapshot = acq.run(&CancelToken::new()).unwrap();
    assert_eq!(consumer.join().unwrap(), 5);
    assert!(snapshot.samples_produced >= 5);
}

/// Rejects every other sample with a recoverable error
struct Flaky {
    calls: u32,
    accepted: Vec<Sample>,
}

impl Sink for Flaky {
    fn push_sample(&mut self, sample: &Sample, _timestamp: Option<f64>) -> Result<(), SinkError> {
        self.calls += 1;
        if self.calls % 2 == 0 {
            return Err(SinkError::Other("busy".to_string()));
        }
        self.accepted.push(sample.clone());
        Ok(())
    }
}

#[test]
fn test_sink_errors_are_counted() {
    let profile = profile();
    let encoder = SampleEncoder::new(&profile);
    let chunks: Vec<Vec<u8>> = (0..4).map(|i| encoder.encode(&[i as f64, 0.0], 0)).collect();

    let config = LoopConfig {
        max_duration: Some(Duration::from_millis(50)),
        ..fast()
    };
    let sink = Flaky { calls: 0, accepted: Vec::new() };
    let mut acq = AcquisitionLoop::with_config(profile, ReplaySource::from_chunks(chunks), sink, config);

    let snapshot = acq.run(&CancelToken::new()).unwrap();
    assert_eq!(snapshot.samples_produced, 4);
    assert_eq!(snapshot.sink_errors, 2);
    assert_eq!(acq.sink().accepted.len(), 2);
}

#[test]
fn test_header_misses_reach_the_snapshot() {
    let profile = profile();
    let packet = SampleEncoder::new(&profile).encode(&[1.0, 2.0], 0);

    let source = ReplaySource::from_chunks(vec![vec![0x01; 32], vec![0x02; 32], packet]);
    let config = LoopConfig {
        max_duration: Some(Duration::from_millis(50)),
        ..fast()
    };
    let mut acq = AcquisitionLoop::with_config(profile, source, MemorySink::new(), config);

    let snapshot = acq.run(&CancelToken::new()).unwrap();
    assert_eq!(snapshot.samples_produced, 1);
    assert_eq!(snapshot.header_misses, 2);
    // 31 + 32 trimmed without a header, then one byte ahead of the packet
    assert_eq!(snapshot.bytes_discarded, 64);
}
