//! # jarima-modem
//!
//! Serial transport and AT-command session for the GSM modem. The session
//! talks through the [`SerialLink`] trait so tests can script a device.

pub mod session;

pub use session::ModemSession;

use jarima_core::JarimaError;
use serialport::{SerialPort, SerialPortType};
use std::io::{Read, Write};
use std::time::Duration;
use tracing::debug;

/// A line-oriented serial transport. One implementation wraps a real
/// serial port; tests substitute a scripted device.
pub trait SerialLink: Send {
    /// Write the command text followed by CR/LF.
    fn write_line(&mut self, command: &str) -> Result<(), JarimaError>;

    /// Drain whatever bytes have arrived so far, without blocking.
    fn drain(&mut self) -> Result<String, JarimaError>;
}

/// Pick the first USB serial adapter on the system.
pub fn detect_port() -> Option<String> {
    let ports = serialport::available_ports().ok()?;
    ports
        .into_iter()
        .find(|p| matches!(p.port_type, SerialPortType::UsbPort(_)))
        .map(|p| p.port_name)
}

/// [`SerialLink`] over a real serial port.
pub struct SerialPortLink {
    port: Box<dyn SerialPort>,
}

impl SerialPortLink {
    /// Open the device. The read timeout is short because reads only ever
    /// drain bytes that are already buffered.
    pub fn open(port_name: &str, baud_rate: u32) -> Result<Self, JarimaError> {
        let mut builder =
            serialport::new(port_name, baud_rate).timeout(Duration::from_millis(500));
        // Some USB serial adapters need explicit settings.
        #[cfg(unix)]
        {
            builder = builder
                .data_bits(serialport::DataBits::Eight)
                .stop_bits(serialport::StopBits::One)
                .parity(serialport::Parity::None);
        }
        let port = builder.open().map_err(|e| {
            JarimaError::Modem(format!("failed to open serial port {port_name}: {e}"))
        })?;
        Ok(Self { port })
    }
}

impl SerialLink for SerialPortLink {
    fn write_line(&mut self, command: &str) -> Result<(), JarimaError> {
        self.port.write_all(format!("{command}\r\n").as_bytes())?;
        Ok(())
    }

    fn drain(&mut self) -> Result<String, JarimaError> {
        let mut out = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let available = self
                .port
                .bytes_to_read()
                .map_err(|e| JarimaError::Modem(format!("serial read failed: {e}")))?;
            if available == 0 {
                break;
            }
            match self.port.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => out.extend_from_slice(&buf[..n]),
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => break,
                Err(e) => return Err(e.into()),
            }
        }
        let text = String::from_utf8_lossy(&out).into_owned();
        if !text.is_empty() {
            debug!("drained {} bytes from serial buffer", text.len());
        }
        Ok(text)
    }
}
