//! Link configuration
//!
//! Connection parameters and protocol policy for a transmitter session.
//! Defaults match the factory deployment: gateway at `192.168.0.7:9001`,
//! 1 s connect timeout, 3 s response timeout, 50 ms post-send delay.

use std::time::Duration;

use crate::constants::{
    DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_RESPONSE_DELAY_MS,
    DEFAULT_RESPONSE_TIMEOUT_MS,
};
use crate::frame::ChecksumPolicy;

/// Configuration for a transmitter link.
///
/// # Example
///
/// ```rust
/// use aqt_modbus::{ChecksumPolicy, LinkConfig};
/// use std::time::Duration;
///
/// let config = LinkConfig::new()
///     .with_host("10.0.0.12")
///     .with_response_timeout(Duration::from_secs(5))
///     .with_checksum_policy(ChecksumPolicy::Strict);
///
/// assert_eq!(config.host, "10.0.0.12");
/// assert_eq!(config.port, 9001);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    /// Transmitter gateway host name or address.
    pub host: String,
    /// Transmitter gateway TCP port.
    pub port: u16,
    /// Deadline for establishing the TCP connection.
    pub connect_timeout: Duration,
    /// Deadline for each send/receive operation.
    pub response_timeout: Duration,
    /// Pause between sending a request and starting the read.
    pub response_delay: Duration,
    /// How a response CRC mismatch is treated.
    pub checksum_policy: ChecksumPolicy,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            response_timeout: Duration::from_millis(DEFAULT_RESPONSE_TIMEOUT_MS),
            response_delay: Duration::from_millis(DEFAULT_RESPONSE_DELAY_MS),
            checksum_policy: ChecksumPolicy::Lenient,
        }
    }
}

impl LinkConfig {
    /// Create a configuration with factory defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the gateway host.
    pub fn with_host<S: Into<String>>(mut self, host: S) -> Self {
        self.host = host.into();
        self
    }

    /// Set the gateway port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the per-operation response timeout.
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Set the post-send response delay.
    pub fn with_response_delay(mut self, delay: Duration) -> Self {
        self.response_delay = delay;
        self
    }

    /// Set the checksum mismatch policy.
    pub fn with_checksum_policy(mut self, policy: ChecksumPolicy) -> Self {
        self.checksum_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_deployment() {
        let config = LinkConfig::default();
        assert_eq!(config.host, "192.168.0.7");
        assert_eq!(config.port, 9001);
        assert_eq!(config.connect_timeout, Duration::from_secs(1));
        assert_eq!(config.response_timeout, Duration::from_secs(3));
        assert_eq!(config.response_delay, Duration::from_millis(50));
        assert_eq!(config.checksum_policy, ChecksumPolicy::Lenient);
    }

    #[test]
    fn test_builder() {
        let config = LinkConfig::new()
            .with_host("localhost")
            .with_port(1502)
            .with_response_delay(Duration::ZERO);
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 1502);
        assert!(config.response_delay.is_zero());
    }
}
