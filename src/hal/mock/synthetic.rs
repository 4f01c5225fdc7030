use std::f64::consts::PI;
use std::time::{Duration, Instant};

use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::codec::decoder::scale_factor;
use crate::codec::SampleEncoder;
use crate::error::{ConnectError, SourceReadError};
use crate::hal::{ByteSource, DeviceProfile};

/// Signal amplitude (in the generator's arbitrary units) mapped to full scale
const FULL_SCALE_UNITS: f64 = 500.0;

/// Periods the schedule may lag behind the clock before it is restarted
const MAX_BACKLOG_PERIODS: u32 = 8;

/// Generates EEG-like packets for a profile with no hardware attached.
///
/// Emission follows a fixed schedule: packet `n` is due at
/// `start + n * period`. A poll returns at most one packet, so the stream can
/// fall behind a slow poller but never runs ahead of the sample rate. After a
/// long stall the backlog is dropped rather than replayed.
pub struct SyntheticSource {
    encoder: SampleEncoder,
    channels: usize,
    sample_rate: f64,
    period: Duration,
    full_scale: f64,
    rng: StdRng,
    noise: f64,
    connected: bool,
    next_due: Option<Instant>,
    sample_counter: u64,
}

impl SyntheticSource {
    pub fn new(profile: &DeviceProfile) -> Self {
        Self::with_seed(profile, 0x1C5EED)
    }

    pub fn with_seed(profile: &DeviceProfile, seed: u64) -> Self {
        let encoder = SampleEncoder::new(profile);
        let full_scale = if profile.encoding().is_integer() {
            profile.adc_max() * scale_factor(profile)
        } else {
            FULL_SCALE_UNITS
        };

        Self {
            encoder,
            channels: profile.channels(),
            sample_rate: profile.sample_rate(),
            period: profile.sample_period(),
            full_scale,
            rng: StdRng::seed_from_u64(seed),
            noise: 10.0,
            connected: false,
            next_due: None,
            sample_counter: 0,
        }
    }

    /// Noise amplitude in generator units (0 gives a deterministic signal)
    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise.max(0.0);
        self
    }

    pub fn packets_emitted(&self) -> u64 {
        self.sample_counter
    }

    /// Poll against an explicit clock reading
    pub fn poll_at(&mut self, now: Instant) -> Result<Vec<u8>, SourceReadError> {
        if !self.connected {
            return Err(SourceReadError::Disconnected);
        }

        let mut due = *self.next_due.get_or_insert(now);
        if now < due {
            return Ok(Vec::new());
        }
        if now.duration_since(due) > self.period * MAX_BACKLOG_PERIODS {
            due = now;
        }
        self.next_due = Some(due + self.period);

        let values = self.next_values();
        let packet = self.encoder.encode(&values, self.sample_counter as u32);
        self.sample_counter += 1;
        Ok(packet)
    }

    /// Per channel: a sine at 10 + 2*ch Hz, a component at half that
    /// frequency and uniform noise.
    fn next_values(&mut self) -> Vec<f64> {
        let t = self.sample_counter as f64 / self.sample_rate;
        (0..self.channels)
            .map(|ch| {
                let freq = 10.0 + ch as f64 * 2.0;
                let phase = 2.0 * PI * freq * t;
                let noise = if self.noise > 0.0 {
                    self.rng.gen_range(-self.noise..=self.noise)
                } else {
                    0.0
                };
                let units = 50.0 * phase.sin() + 20.0 * (phase * 0.5).sin() + noise;
                (units / FULL_SCALE_UNITS).clamp(-1.0, 1.0) * self.full_scale
            })
            .collect()
    }
}

impl ByteSource for SyntheticSource {
    fn describe(&self) -> String {
        format!("synthetic:{}ch@{}Hz", self.channels, self.sample_rate)
    }

    fn connect(&mut self) -> Result<(), ConnectError> {
        if self.connected {
            return Err(ConnectError::AlreadyConnected);
        }
        self.connected = true;
        self.next_due = None;
        info!("Simulated device connected");
        Ok(())
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn poll_bytes(&mut self) -> Result<Vec<u8>, SourceReadError> {
        self.poll_at(Instant::now())
    }
}
