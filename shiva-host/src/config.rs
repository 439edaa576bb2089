use std::time::Duration;

use serde::{Deserialize, Serialize};
use shiva_protocol::DEFAULT_BAUD_RATE;

pub const DEFAULT_PORT: &str = "/dev/ttyACM0";

// Bounds how long a reader stop request waits
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Serial link settings.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub port: String,
    pub baud_rate: u32,
    pub read_timeout: Duration,
}

impl ConnectionConfig {
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            ..Self::default()
        }
    }

    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}
