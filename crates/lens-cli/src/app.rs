//! Application orchestration.
//!
//! Connects to the RPC endpoint, resolves the registry and instrument list,
//! and runs one batch per command.

use std::sync::Arc;

use lens_core::{AccountPosition, Address, MarketMetadata};
use lens_reader::{AccountPositionReader, MarketDataReader};
use lens_rpc::{RpcLens, RpcMarketRegistry};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::Command;
use crate::config::LensConfig;
use crate::error::{AppError, AppResult};

/// Pick the instruments to read: command line first, then the config file.
///
/// `None` means neither names any, and the registry should be asked.
#[must_use]
pub fn select_instruments(
    requested: &[Address],
    configured: Option<&[Address]>,
) -> Option<Vec<Address>> {
    if !requested.is_empty() {
        return Some(requested.to_vec());
    }
    match configured {
        Some(list) if !list.is_empty() => Some(list.to_vec()),
        _ => None,
    }
}

/// Instruments whose own comptroller differs from `comptroller`.
///
/// `owners` pairs each instrument with the comptroller it reports.
#[must_use]
pub fn foreign_instruments(comptroller: Address, owners: &[(Address, Address)]) -> Vec<Address> {
    owners
        .iter()
        .filter(|(_, owner)| *owner != comptroller)
        .map(|(instrument, _)| *instrument)
        .collect()
}

/// Main application.
pub struct Application {
    config: LensConfig,
    rpc: Arc<RpcLens>,
}

impl Application {
    /// Connect to the configured RPC endpoint.
    pub async fn connect(config: LensConfig) -> AppResult<Self> {
        config.validate()?;

        if config.reader.markers_diverge() {
            warn!(
                metadata = %config.reader.metadata_native_marker,
                balance = %config.reader.balance_native_marker,
                "Native markers differ between market and position reads"
            );
        }

        let rpc = RpcLens::connect(&config.rpc_url, config.call_timeout()).await?;
        info!(timeout_ms = rpc.call_timeout().as_millis() as u64, "RPC ready");
        Ok(Self {
            config,
            rpc: Arc::new(rpc),
        })
    }

    /// Run `command` and return its records as pretty JSON.
    pub async fn run(&self, command: &Command, cancel: &CancellationToken) -> AppResult<String> {
        let json = match command {
            Command::Markets { instruments } => {
                let records = self.run_markets(instruments, cancel).await?;
                serde_json::to_string_pretty(&records)?
            }
            Command::Positions {
                account,
                instruments,
            } => {
                let records = self.run_positions(*account, instruments, cancel).await?;
                serde_json::to_string_pretty(&records)?
            }
        };
        Ok(json)
    }

    pub async fn run_markets(
        &self,
        requested: &[Address],
        cancel: &CancellationToken,
    ) -> AppResult<Vec<MarketMetadata>> {
        let selected = select_instruments(requested, self.config.instruments.as_deref());
        let registry = self.registry(selected.as_deref()).await?;
        let instruments = match selected {
            Some(list) => list,
            None => registry.all_markets().await?,
        };

        let registry_address = registry.address();
        let reader = MarketDataReader::new(
            self.rpc.clone(),
            Arc::new(registry),
            self.rpc.clone(),
            &self.config.reader,
        )?;

        info!(
            count = instruments.len(),
            comptroller = %registry_address,
            marker = %reader.native_marker(),
            "Reading markets"
        );
        Ok(reader
            .fetch_market_metadata_batch(&instruments, cancel)
            .await?)
    }

    pub async fn run_positions(
        &self,
        account: Option<Address>,
        requested: &[Address],
        cancel: &CancellationToken,
    ) -> AppResult<Vec<AccountPosition>> {
        let account = account.or(self.config.account).ok_or_else(|| {
            AppError::Config("no account given on the command line or in config".to_string())
        })?;

        let instruments = match select_instruments(requested, self.config.instruments.as_deref())
        {
            Some(list) => list,
            None => self.registry(None).await?.all_markets().await?,
        };

        let reader = AccountPositionReader::new(
            self.rpc.clone(),
            self.rpc.clone(),
            self.rpc.clone(),
            &self.config.reader,
        )?;

        info!(count = instruments.len(), %account, marker = %reader.native_marker(), "Reading positions");
        Ok(reader
            .fetch_account_position_batch(&instruments, account, cancel)
            .await?)
    }

    /// Configured registry, else the one the first instrument reports.
    async fn registry(&self, instruments: Option<&[Address]>) -> AppResult<RpcMarketRegistry> {
        if let Some(comptroller) = self.config.comptroller {
            return Ok(self.rpc.registry(comptroller));
        }

        let first = instruments
            .and_then(|list| list.first().copied())
            .ok_or_else(|| {
                AppError::Config(
                    "no comptroller or instruments configured; cannot discover markets"
                        .to_string(),
                )
            })?;

        let comptroller = self.rpc.comptroller_of(first).await?;
        info!(%comptroller, instrument = %first, "Discovered comptroller");

        // Listings come from this one registry; instruments owned by another
        // would read as unlisted.
        let rest = instruments.map(|list| &list[1..]).unwrap_or_default();
        let mut owners = Vec::with_capacity(rest.len());
        for instrument in rest {
            owners.push((*instrument, self.rpc.comptroller_of(*instrument).await?));
        }
        for instrument in foreign_instruments(comptroller, &owners) {
            warn!(
                %instrument,
                %comptroller,
                "Instrument belongs to a different comptroller; its listing will read as unlisted"
            );
        }

        Ok(self.rpc.registry(comptroller))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        Address::repeat_byte(n)
    }

    #[test]
    fn test_command_line_wins() {
        let configured = vec![addr(1)];
        let selected = select_instruments(&[addr(2), addr(3)], Some(&configured));
        assert_eq!(selected, Some(vec![addr(2), addr(3)]));
    }

    #[test]
    fn test_falls_back_to_config() {
        let configured = vec![addr(1), addr(4)];
        assert_eq!(
            select_instruments(&[], Some(&configured)),
            Some(vec![addr(1), addr(4)])
        );
    }

    #[test]
    fn test_foreign_instruments_flagged() {
        let comptroller = addr(0xc0);
        let owners = [
            (addr(1), comptroller),
            (addr(2), addr(0xc1)),
            (addr(3), comptroller),
            (addr(4), addr(0xc2)),
        ];
        assert_eq!(
            foreign_instruments(comptroller, &owners),
            vec![addr(2), addr(4)]
        );
    }

    #[test]
    fn test_same_comptroller_flags_nothing() {
        let comptroller = addr(0xc0);
        assert!(foreign_instruments(comptroller, &[(addr(1), comptroller)]).is_empty());
        assert!(foreign_instruments(comptroller, &[]).is_empty());
    }

    #[test]
    fn test_empty_config_means_discover() {
        assert_eq!(select_instruments(&[], Some(&[])), None);
        assert_eq!(select_instruments(&[], None), None);
    }
}
