//! Serial/UART transport
//!
//! Reads whatever the driver has buffered. When nothing is pending the read
//! waits at most `READ_TIMEOUT`, which keeps the acquisition loop responsive
//! without spinning.

use std::io::{ErrorKind, Read};
use std::time::Duration;

use log::{info, warn};
use serialport::SerialPort;

use super::traits::ByteSource;
use super::types::TransportConfig;
use crate::error::{ConnectError, SourceReadError};

pub const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Scratch size for a read when the driver reports nothing pending
const IDLE_READ_SIZE: usize = 256;

pub struct SerialSource {
    port_name: String,
    baudrate: u32,
    timeout: Duration,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialSource {
    pub fn new(port_name: impl Into<String>, baudrate: u32) -> Self {
        Self {
            port_name: port_name.into(),
            baudrate,
            timeout: READ_TIMEOUT,
            port: None,
        }
    }

    pub fn from_transport(transport: &TransportConfig) -> Self {
        Self::new(transport.port.clone(), transport.baudrate)
    }

    /// Override the read timeout (clamped to `READ_TIMEOUT`)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout.min(READ_TIMEOUT);
        self
    }

    /// Names of the serial ports present on this machine
    pub fn list_ports() -> Vec<String> {
        serialport::available_ports()
            .map(|ports| ports.into_iter().map(|p| p.port_name).collect())
            .unwrap_or_default()
    }
}

impl ByteSource for SerialSource {
    fn describe(&self) -> String {
        format!("serial:{}@{}", self.port_name, self.baudrate)
    }

    fn connect(&mut self) -> Result<(), ConnectError> {
        if self.port.is_some() {
            return Err(ConnectError::AlreadyConnected);
        }

        let port = serialport::new(&self.port_name, self.baudrate)
            .timeout(self.timeout)
            .open()
            .map_err(|e| ConnectError::DeviceUnavailable {
                locator: self.port_name.clone(),
                reason: e.to_string(),
            })?;

        info!("Connected to {} at {} baud", self.port_name, self.baudrate);
        self.port = Some(port);
        Ok(())
    }

    fn disconnect(&mut self) {
        if self.port.take().is_some() {
            info!("Disconnected from {}", self.port_name);
        }
    }

    fn is_connected(&self) -> bool {
        self.port.is_some()
    }

    fn poll_bytes(&mut self) -> Result<Vec<u8>, SourceReadError> {
        let port = self.port.as_mut().ok_or(SourceReadError::Disconnected)?;

        let pending = port
            .bytes_to_read()
            .map_err(|e| SourceReadError::Transport(e.to_string()))? as usize;

        let mut buf = vec![0u8; pending.max(IDLE_READ_SIZE)];
        let want = if pending > 0 { pending } else { IDLE_READ_SIZE };

        match port.read(&mut buf[..want]) {
            Ok(0) => {
                warn!("{} returned end of stream", self.port_name);
                Err(SourceReadError::Io(ErrorKind::UnexpectedEof.into()))
            }
            Ok(n) => {
                buf.truncate(n);
                Ok(buf)
            }
            Err(e) if e.kind() == ErrorKind::TimedOut => Ok(Vec::new()),
            Err(e) if e.kind() == ErrorKind::Interrupted => Ok(Vec::new()),
            Err(e) => Err(SourceReadError::Io(e)),
        }
    }
}
