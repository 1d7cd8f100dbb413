//! Application configuration.

use std::time::Duration;

use lens_core::Address;
use lens_reader::ReaderConfig;
use lens_rpc::DEFAULT_CALL_TIMEOUT;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Top-level configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LensConfig {
    /// JSON-RPC endpoint (http(s), ws(s) or ipc path).
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    /// Registry contract. Discovered from the first instrument when unset.
    #[serde(default)]
    pub comptroller: Option<Address>,
    /// Instruments to read. Discovered via the registry when unset.
    #[serde(default)]
    pub instruments: Option<Vec<Address>>,
    /// Default account for `positions`.
    #[serde(default)]
    pub account: Option<Address>,
    /// Per-call timeout (ms).
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,
    #[serde(default)]
    pub reader: ReaderConfig,
}

fn default_rpc_url() -> String {
    "http://127.0.0.1:8545".to_string()
}

fn default_call_timeout_ms() -> u64 {
    DEFAULT_CALL_TIMEOUT.as_millis() as u64
}

impl Default for LensConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            comptroller: None,
            instruments: None,
            account: None,
            call_timeout_ms: default_call_timeout_ms(),
            reader: ReaderConfig::default(),
        }
    }
}

impl LensConfig {
    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> AppResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.rpc_url.trim().is_empty() {
            return Err(AppError::Config("rpc_url must not be empty".to_string()));
        }
        if self.call_timeout_ms == 0 {
            return Err(AppError::Config(
                "call_timeout_ms must be greater than zero".to_string(),
            ));
        }
        self.reader
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))
    }

    #[must_use]
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_default_config() {
        let config = LensConfig::default();
        assert_eq!(config.call_timeout(), DEFAULT_CALL_TIMEOUT);
        assert_eq!(config.call_timeout(), Duration::from_secs(10));
        assert!(config.comptroller.is_none());
        assert!(config.instruments.is_none());
        assert_eq!(config.reader, ReaderConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = assert_ok!(LensConfig::from_toml(""));
        assert_eq!(config.rpc_url, "http://127.0.0.1:8545");
        assert_eq!(config.reader.max_in_flight, 8);
    }

    #[test]
    fn test_parse_full_file() {
        let config = LensConfig::from_toml(
            r#"
            rpc_url = "https://rpc.example.org"
            comptroller = "0x1111111111111111111111111111111111111111"
            instruments = [
                "0x2222222222222222222222222222222222222222",
                "0x3333333333333333333333333333333333333333",
            ]
            account = "0x4444444444444444444444444444444444444444"
            call_timeout_ms = 2500

            [reader]
            metadata_native_marker = "fETH"
            balance_native_marker = "cETH"
            max_in_flight = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.comptroller, Some(Address::repeat_byte(0x11)));
        assert_eq!(
            config.instruments,
            Some(vec![Address::repeat_byte(0x22), Address::repeat_byte(0x33)])
        );
        assert_eq!(config.account, Some(Address::repeat_byte(0x44)));
        assert_eq!(config.call_timeout(), Duration::from_millis(2500));
        assert!(config.reader.markers_diverge());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let err = assert_err!(LensConfig::from_toml("call_timeout_ms = 0"));
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_rejects_zero_in_flight() {
        let err = assert_err!(LensConfig::from_toml("[reader]\nmax_in_flight = 0"));
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_rejects_bad_address() {
        assert_err!(LensConfig::from_toml(r#"account = "0x1234""#));
    }
}
