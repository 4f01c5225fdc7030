use std::collections::VecDeque;

use crate::error::{ConnectError, SourceReadError};
use crate::hal::ByteSource;

#[derive(Debug, Clone)]
pub enum ReplayStep {
    /// Bytes returned by one poll
    Bytes(Vec<u8>),
    /// A poll that fails with a transport error
    Fail(String),
    /// A poll that returns nothing
    Idle,
}

/// Plays back a fixed script of reads. Once the script runs out every poll
/// returns no bytes.
#[derive(Debug, Default)]
pub struct ReplaySource {
    steps: VecDeque<ReplayStep>,
    refuse_connect: bool,
    connected: bool,
    polls: u64,
    connects: u64,
}

impl ReplaySource {
    pub fn new(steps: impl IntoIterator<Item = ReplayStep>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            ..Self::default()
        }
    }

    /// One poll per chunk
    pub fn from_chunks<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Vec<u8>>,
    {
        Self::new(chunks.into_iter().map(|c| ReplayStep::Bytes(c.into())))
    }

    /// Make `connect` fail as if the device were missing
    pub fn refusing_connect(mut self) -> Self {
        self.refuse_connect = true;
        self
    }

    pub fn push(&mut self, step: ReplayStep) {
        self.steps.push_back(step);
    }

    pub fn remaining(&self) -> usize {
        self.steps.len()
    }

    pub fn polls(&self) -> u64 {
        self.polls
    }

    pub fn connects(&self) -> u64 {
        self.connects
    }
}

impl ByteSource for ReplaySource {
    fn describe(&self) -> String {
        "replay".to_string()
    }

    fn connect(&mut self) -> Result<(), ConnectError> {
        if self.refuse_connect {
            return Err(ConnectError::DeviceUnavailable {
                locator: "replay".to_string(),
                reason: "connection refused by script".to_string(),
            });
        }
        if self.connected {
            return Err(ConnectError::AlreadyConnected);
        }
        self.connected = true;
        self.connects += 1;
        Ok(())
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn poll_bytes(&mut self) -> Result<Vec<u8>, SourceReadError> {
        if !self.connected {
            return Err(SourceReadError::Disconnected);
        }
        self.polls += 1;
        match self.steps.pop_front() {
            Some(ReplayStep::Bytes(bytes)) => Ok(bytes),
            Some(ReplayStep::Fail(reason)) => Err(SourceReadError::Transport(reason)),
            Some(ReplayStep::Idle) | None => Ok(Vec::new()),
        }
    }
}
