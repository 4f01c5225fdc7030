use thiserror::Error;

/// Opening the transport failed. Fatal: the caller decides whether to retry.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("device unavailable at {locator}: {reason}")]
    DeviceUnavailable { locator: String, reason: String },

    #[error("source is already connected")]
    AlreadyConnected,

    #[error("unknown interface '{0}'")]
    UnknownInterface(String),
}

/// Non-fatal framing failures, surfaced only through the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FramingError {
    #[error("sync header not found, {discarded} bytes dropped")]
    HeaderNotFound { discarded: usize },

    #[error("checksum mismatch: expected {expected:#04x}, got {actual:#04x}")]
    ChecksumMismatch { expected: u8, actual: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("packet truncated: need {needed} bytes, got {actual}")]
    Truncated { needed: usize, actual: usize },

    /// Raised while parsing a profile, never while decoding a packet.
    #[error("unsupported sample encoding '{0}' (expected int16, int24, int32 or float32)")]
    UnsupportedEncoding(String),
}

#[derive(Debug, Error)]
pub enum SourceReadError {
    #[error("source is not connected")]
    Disconnected,

    #[error("transport read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("transport error: {0}")]
    Transport(String),
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("channel count must be greater than zero")]
    NoChannels,

    #[error("too many channels: {count} (at most {max})")]
    TooManyChannels { count: usize, max: usize },

    #[error("sample rate must be between 0.001 Hz and 1 MHz, got {0}")]
    InvalidSampleRate(f64),

    #[error("sync header must contain at least one byte")]
    EmptyHeader,

    #[error("invalid sync header '{0}': expected hex bytes such as \"AA55\"")]
    InvalidHeader(String),

    #[error("{field} must be a positive finite number, got {value}")]
    InvalidScaling { field: &'static str, value: f64 },

    #[error("unknown output unit '{0}' (expected microvolts, millivolts or volts)")]
    UnknownUnit(String),

    #[error("unknown checksum algorithm '{0}' (expected xor or sum8)")]
    UnknownChecksum(String),

    #[error("{field} lists {actual} entries but the device has {expected} channels")]
    ChannelListMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error(transparent)]
    Encoding(#[from] DecodeError),
}

#[derive(Debug, Error)]
pub enum SinkError {
    /// The consumer side went away; streaming should stop.
    #[error("sink closed")]
    Closed,

    #[error("sample has {actual} channels, sink expects {expected}")]
    ChannelMismatch { expected: usize, actual: usize },

    #[error("sink error: {0}")]
    Other(String),
}

/// Terminal result of an acquisition run.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("failed to connect: {0}")]
    Connect(#[from] ConnectError),

    #[error("source failed {failures} consecutive reads, last error: {last}")]
    SourceFailed {
        failures: u32,
        last: SourceReadError,
    },

    #[error("sink failed: {0}")]
    Sink(#[from] SinkError),

    #[error("invalid state transition from {from} to {to}")]
    InvalidTransition { from: &'static str, to: &'static str },
}
