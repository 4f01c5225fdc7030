use std::time::{Duration, Instant};

use super::{AcquisitionStats, StatsSnapshot};

/// Emits a stats line at a fixed interval
pub struct StatsMonitor {
    interval: Duration,
    last_report: Option<Instant>,
}

impl StatsMonitor {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_report: None,
        }
    }

    /// Report text when at least one interval has passed since the last one
    pub fn poll(&mut self, stats: &AcquisitionStats, now: Instant) -> Option<String> {
        let last = *self.last_report.get_or_insert(now);
        if self.interval.is_zero() || now.saturating_duration_since(last) < self.interval {
            return None;
        }
        self.last_report = Some(now);
        Some(Self::generate_report(&stats.snapshot(now)))
    }

    pub fn generate_report(snapshot: &StatsSnapshot) -> String {
        format!(
            "Stats: {} samples, {:.1} Hz actual, {}",
            snapshot.samples_produced,
            snapshot.effective_rate,
            if snapshot.packets_rejected > 0 {
                format!(
                    "{} error{} ({} checksum, {} decode)",
                    snapshot.packets_rejected,
                    if snapshot.packets_rejected == 1 { "" } else { "s" },
                    snapshot.checksum_failures,
                    snapshot.decode_failures
                )
            } else {
                "0 errors".to_string()
            }
        )
    }

    /// Multi-line summary printed when a run stops
    pub fn final_report(snapshot: &StatsSnapshot) -> String {
        format!(
            "Stopped. Total: {} samples in {:.1}s ({:.2} Hz)\n  \
             Rejected packets: {}\n  \
             Bytes received: {} ({} discarded, {} header misses)\n  \
             Read errors: {}, sink errors: {}",
            snapshot.samples_produced,
            snapshot.elapsed_secs,
            snapshot.effective_rate,
            snapshot.packets_rejected,
            snapshot.bytes_received,
            snapshot.bytes_discarded,
            snapshot.header_misses,
            snapshot.read_errors,
            snapshot.sink_errors
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_once_per_interval() {
        let mut monitor = StatsMonitor::new(Duration::from_secs(5));
        let mut stats = AcquisitionStats::new();
        let start = Instant::now();
        stats.start(start);

        assert!(monitor.poll(&stats, start).is_none());
        assert!(monitor.poll(&stats, start + Duration::from_secs(4)).is_none());

        stats.record_sample();
        let report = monitor.poll(&stats, start + Duration::from_secs(5)).unwrap();
        assert!(report.contains("1 samples"));
        assert!(report.contains("0 errors"));

        assert!(monitor.poll(&stats, start + Duration::from_secs(6)).is_none());
    }

    #[test]
    fn test_error_pluralization() {
        let mut stats = AcquisitionStats::new();
        stats.record_decode_failure();
        let report = StatsMonitor::generate_report(&stats.snapshot(Instant::now()));
        assert!(report.contains("1 error ("));
    }

    #[test]
    fn test_final_report_includes_header_misses() {
        let mut stats = AcquisitionStats::new();
        stats.record_framing(crate::codec::FramerStats {
            header_misses: 3,
            bytes_discarded: 90,
            ..Default::default()
        });
        let report = StatsMonitor::final_report(&stats.snapshot(Instant::now()));
        assert!(report.contains("90 discarded, 3 header misses"));
    }
}
