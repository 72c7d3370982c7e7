//! AT-command session state machine.
//!
//! `Closed → Opened → Initialized → Listing → Closed`. Every command is a
//! synchronous write followed by a fixed wait and a buffer drain; there is
//! no event-driven framing to resynchronize on, so the waits are explicit
//! config values rather than hidden sleeps. A device slower than the wait
//! yields a truncated response, read as "not acknowledged".

use chrono::Local;
use jarima_core::config::ModemConfig;
use jarima_core::JarimaError;
use std::time::Duration;
use tracing::{debug, info};

use crate::{detect_port, SerialLink, SerialPortLink};

/// The literal affirmative response token of the AT protocol.
const SUCCESS_TOKEN: &str = "OK";

/// An open serial session with the modem. The port is released when the
/// session is dropped, on every exit path.
pub struct ModemSession<L: SerialLink> {
    link: L,
    config: ModemConfig,
}

impl ModemSession<SerialPortLink> {
    /// Open the configured port, or auto-detect the first USB adapter when
    /// no port is configured. No usable port is fatal for the run.
    pub fn open(config: &ModemConfig) -> Result<Self, JarimaError> {
        let port_name = if config.port.is_empty() {
            detect_port().ok_or_else(|| JarimaError::Modem("port can't be found".to_string()))?
        } else {
            config.port.clone()
        };
        let link = SerialPortLink::open(&port_name, config.baud_rate)?;
        info!("Port {port_name} has successfully opened");
        Ok(Self::with_link(link, config.clone()))
    }
}

impl<L: SerialLink> ModemSession<L> {
    pub fn with_link(link: L, config: ModemConfig) -> Self {
        Self { link, config }
    }

    /// Run the initialization sequence. Only the `AT` liveness probe is
    /// gating; echo-off and the clock push/read-back are fire-and-forget.
    pub async fn init(&mut self) -> Result<(), JarimaError> {
        if !self.execute("AT", self.config.probe_wait_ms).await? {
            return Err(JarimaError::Modem(
                "device did not answer the liveness probe".to_string(),
            ));
        }

        let _ = self.execute("ATE0", self.config.setup_wait_ms).await;

        let now = Local::now();
        let zone_hours = now.offset().local_minus_utc() / 3600;
        let clock = format!("{}{:+03}", now.format("%y/%m/%d,%H:%M:%S"), zone_hours);
        let _ = self
            .execute(&format!("AT+CCLK=\"{clock}\""), self.config.setup_wait_ms)
            .await;
        let _ = self.execute("AT+CCLK?", self.config.query_wait_ms).await;

        info!("Initialization finished successfully");
        Ok(())
    }

    /// Switch to text-mode messaging and request the full stored-message
    /// listing. The long wait covers the device enumerating its storage.
    pub async fn list_messages(&mut self) -> Result<String, JarimaError> {
        let _ = self.execute("AT+CMGF=1", self.config.query_wait_ms).await;
        self.execute_with_response("AT+CMGL=\"ALL\"", self.config.listing_wait_ms)
            .await
    }

    /// Delete the message in the given device slot. Returns whether the
    /// device acknowledged the deletion.
    pub async fn delete_message(&mut self, index: i64) -> Result<bool, JarimaError> {
        self.execute(&format!("AT+CMGD={index}"), self.config.delete_wait_ms)
            .await
    }

    /// Write a command, wait the fixed bound, and check for the success
    /// token in whatever arrived.
    async fn execute(&mut self, command: &str, wait_ms: u64) -> Result<bool, JarimaError> {
        let response = self.execute_with_response(command, wait_ms).await?;
        Ok(response.contains(SUCCESS_TOKEN))
    }

    async fn execute_with_response(
        &mut self,
        command: &str,
        wait_ms: u64,
    ) -> Result<String, JarimaError> {
        debug!("Message: {command}");
        self.link.write_line(command)?;
        tokio::time::sleep(Duration::from_millis(wait_ms)).await;
        let response = self.link.drain()?;
        debug!("Response: {}", response.trim());
        Ok(response)
    }
}
