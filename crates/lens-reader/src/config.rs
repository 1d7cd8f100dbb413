//! Reader configuration.

use lens_core::{LensError, LensResult, NativeMarker};
use serde::{Deserialize, Serialize};

/// Configuration shared by both readers.
///
/// The two native markers are deliberately separate values: market metadata
/// and account positions each recognize the native market by their own
/// symbol literal, and deployments have been seen to spell them differently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Symbol of the native-asset market as recognized by metadata reads.
    #[serde(default = "default_native_marker")]
    pub metadata_native_marker: String,
    /// Symbol of the native-asset market as recognized by position reads.
    #[serde(default = "default_native_marker")]
    pub balance_native_marker: String,
    /// Maximum records assembled concurrently by a batch.
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

fn default_native_marker() -> String {
    "fETH".to_string()
}

fn default_max_in_flight() -> usize {
    8
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            metadata_native_marker: default_native_marker(),
            balance_native_marker: default_native_marker(),
            max_in_flight: default_max_in_flight(),
        }
    }
}

impl ReaderConfig {
    /// Reject values the readers cannot run with.
    pub fn validate(&self) -> LensResult<()> {
        if self.metadata_native_marker.is_empty() {
            return Err(LensError::InvalidConfig(
                "metadata_native_marker must not be empty".to_string(),
            ));
        }
        if self.balance_native_marker.is_empty() {
            return Err(LensError::InvalidConfig(
                "balance_native_marker must not be empty".to_string(),
            ));
        }
        if self.max_in_flight == 0 {
            return Err(LensError::InvalidConfig(
                "max_in_flight must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// True when metadata and position reads disagree on the native symbol.
    #[must_use]
    pub fn markers_diverge(&self) -> bool {
        self.metadata_native_marker != self.balance_native_marker
    }

    #[must_use]
    pub fn metadata_marker(&self) -> NativeMarker {
        NativeMarker::new(self.metadata_native_marker.clone())
    }

    #[must_use]
    pub fn balance_marker(&self) -> NativeMarker {
        NativeMarker::new(self.balance_native_marker.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ReaderConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.markers_diverge());
    }

    #[test]
    fn test_zero_in_flight_rejected() {
        let config = ReaderConfig {
            max_in_flight: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(LensError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_empty_marker_rejected() {
        let config = ReaderConfig {
            balance_native_marker: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_divergent_markers_detected() {
        let config = ReaderConfig {
            metadata_native_marker: "fETH".to_string(),
            balance_native_marker: "cETH".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert!(config.markers_diverge());
        assert!(config.metadata_marker().matches("fETH"));
        assert!(config.balance_marker().matches("cETH"));
    }
}
