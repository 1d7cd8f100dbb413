//! Market metadata reader.
//!
//! Assembles one `MarketMetadata` per instrument from the instrument itself,
//! the injected market registry, and (for wrapped markets) the underlying
//! token.
//!
//! Call order per record:
//! 1. `exchangeRateCurrent` (accrues interest upstream, so it runs first)
//! 2. Concurrently: registry listing, symbol -> underlying -> decimals chain,
//!    rates, totals, instrument decimals
//!
//! Any failed call fails the whole record.

use std::sync::Arc;
use std::time::Instant;

use lens_core::{
    Address, LensError, LensResult, MarketKind, MarketMetadata, NativeMarker, ReadResult,
    NATIVE_DECIMALS,
};
use lens_telemetry::Metrics;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::batch::fetch_ordered;
use crate::config::ReaderConfig;
use crate::kind::resolve_market_kind;
use crate::source::{InstrumentSource, MarketRegistry, UnderlyingAssetSource};

const KIND: &str = "market";

/// Reads market-level state for instruments.
pub struct MarketDataReader {
    instruments: Arc<dyn InstrumentSource>,
    registry: Arc<dyn MarketRegistry>,
    assets: Arc<dyn UnderlyingAssetSource>,
    native_marker: NativeMarker,
    max_in_flight: usize,
}

impl MarketDataReader {
    /// Create a reader over the given collaborators.
    ///
    /// # Errors
    /// Returns `LensError::InvalidConfig` if `config` fails validation.
    pub fn new(
        instruments: Arc<dyn InstrumentSource>,
        registry: Arc<dyn MarketRegistry>,
        assets: Arc<dyn UnderlyingAssetSource>,
        config: &ReaderConfig,
    ) -> LensResult<Self> {
        config.validate()?;
        Ok(Self {
            instruments,
            registry,
            assets,
            native_marker: config.metadata_marker(),
            max_in_flight: config.max_in_flight,
        })
    }

    /// Symbol identifying the native market for this reader.
    #[must_use]
    pub fn native_marker(&self) -> &NativeMarker {
        &self.native_marker
    }

    /// Fetch metadata for a single instrument.
    pub async fn fetch_market_metadata(&self, instrument: Address) -> LensResult<MarketMetadata> {
        let started = Instant::now();
        let result = self.assemble(instrument).await;
        Metrics::record_latency(KIND, started.elapsed().as_secs_f64() * 1000.0);

        match result {
            Ok((meta, kind)) => {
                Metrics::record_fetched(KIND, kind.label());
                debug!(
                    %instrument,
                    %kind,
                    underlying = %meta.underlying_asset,
                    is_listed = meta.is_listed,
                    "Market metadata assembled"
                );
                Ok(meta)
            }
            Err(source) => {
                Metrics::record_failed(KIND, source.kind_label());
                warn!(%instrument, error = %source, "Market metadata read failed");
                Err(LensError::Market { instrument, source })
            }
        }
    }

    /// Fetch metadata for several instruments, in request order.
    ///
    /// Fails as a whole on the first failed instrument; no partial result is
    /// returned. Cancelling `cancel` stops the batch with
    /// `LensError::Cancelled`.
    pub async fn fetch_market_metadata_batch(
        &self,
        instruments: &[Address],
        cancel: &CancellationToken,
    ) -> LensResult<Vec<MarketMetadata>> {
        info!(count = instruments.len(), "Fetching market metadata batch");

        let records = fetch_ordered(KIND, instruments, self.max_in_flight, cancel, |instrument| {
            self.fetch_market_metadata(instrument)
        })
        .await?;

        info!(count = records.len(), "Market metadata batch complete");
        Ok(records)
    }

    async fn assemble(&self, instrument: Address) -> ReadResult<(MarketMetadata, MarketKind)> {
        let exchange_rate = self.instruments.exchange_rate_current(instrument).await?;

        let src = self.instruments.as_ref();
        let (
            listing,
            (kind, underlying_decimals),
            supply_rate_per_block,
            borrow_rate_per_block,
            reserve_factor,
            total_borrows,
            total_reserves,
            total_supply,
            total_cash,
            instrument_decimals,
        ) = tokio::try_join!(
            self.registry.market_listing(instrument),
            self.resolve_underlying(instrument),
            src.supply_rate_per_block(instrument),
            src.borrow_rate_per_block(instrument),
            src.reserve_factor(instrument),
            src.total_borrows(instrument),
            src.total_reserves(instrument),
            src.total_supply(instrument),
            src.total_cash(instrument),
            src.decimals(instrument),
        )?;

        let meta = MarketMetadata {
            instrument,
            exchange_rate,
            supply_rate_per_block,
            borrow_rate_per_block,
            reserve_factor,
            total_borrows,
            total_reserves,
            total_supply,
            total_cash,
            is_listed: listing.is_listed,
            collateral_factor: listing.collateral_factor,
            underlying_asset: kind.underlying_address(),
            instrument_decimals,
            underlying_decimals,
        };
        Ok((meta, kind))
    }

    async fn resolve_underlying(&self, instrument: Address) -> ReadResult<(MarketKind, u8)> {
        let kind =
            resolve_market_kind(self.instruments.as_ref(), instrument, &self.native_marker).await?;

        let decimals = match kind {
            MarketKind::Native => NATIVE_DECIMALS,
            MarketKind::Wrapped { underlying } => self.assets.decimals(underlying).await?,
        };

        Ok((kind, decimals))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockChain;
    use lens_core::{calls, ReadError, U256};

    fn reader(chain: &Arc<MockChain>) -> MarketDataReader {
        MarketDataReader::new(
            chain.clone(),
            chain.clone(),
            chain.clone(),
            &ReaderConfig::default(),
        )
        .unwrap()
    }

    fn native() -> Address {
        Address::repeat_byte(0x01)
    }

    fn wrapped() -> Address {
        Address::repeat_byte(0x02)
    }

    fn asset() -> Address {
        Address::repeat_byte(0xa2)
    }

    fn chain() -> Arc<MockChain> {
        let chain = Arc::new(MockChain::new());
        chain.add_native_instrument(native(), "fETH");
        chain.add_wrapped_instrument(wrapped(), "fUSDC", asset(), 6);
        chain
    }

    #[tokio::test]
    async fn test_native_market_uses_fixed_decimals() {
        let chain = chain();
        let meta = reader(&chain).fetch_market_metadata(native()).await.unwrap();

        assert_eq!(meta.instrument, native());
        assert_eq!(meta.underlying_asset, Address::ZERO);
        assert_eq!(meta.underlying_decimals, NATIVE_DECIMALS);
        assert_eq!(chain.call_count(calls::UNDERLYING), 0);
        assert_eq!(chain.call_count(calls::ASSET_DECIMALS), 0);
    }

    #[tokio::test]
    async fn test_wrapped_market_reads_asset_decimals() {
        let chain = chain();
        let meta = reader(&chain).fetch_market_metadata(wrapped()).await.unwrap();

        assert_eq!(meta.underlying_asset, asset());
        assert_eq!(meta.underlying_decimals, 6);
        assert_eq!(meta.instrument_decimals, 8);
    }

    #[tokio::test]
    async fn test_zero_underlying_still_resolves_wrapped() {
        let chain = chain();
        let odd = Address::repeat_byte(0x04);
        chain.add_wrapped_instrument(odd, "fODD", Address::ZERO, 12);

        let (meta, kind) = reader(&chain).assemble(odd).await.unwrap();

        assert_eq!(
            kind,
            MarketKind::Wrapped {
                underlying: Address::ZERO
            }
        );
        assert_eq!(kind.label(), "wrapped");
        assert_eq!(meta.underlying_asset, Address::ZERO);
        assert_eq!(meta.underlying_decimals, 12);
    }

    #[tokio::test]
    async fn test_fields_copied_from_instrument() {
        let chain = chain();
        chain.update_instrument(wrapped(), |i| {
            i.exchange_rate = U256::from(21u64);
            i.supply_rate_per_block = U256::from(22u64);
            i.borrow_rate_per_block = U256::from(23u64);
            i.reserve_factor = U256::from(24u64);
            i.total_borrows = U256::from(25u64);
            i.total_reserves = U256::from(26u64);
            i.total_supply = U256::from(27u64);
            i.total_cash = U256::from(28u64);
        });

        let meta = reader(&chain).fetch_market_metadata(wrapped()).await.unwrap();

        assert_eq!(meta.exchange_rate, U256::from(21u64));
        assert_eq!(meta.supply_rate_per_block, U256::from(22u64));
        assert_eq!(meta.borrow_rate_per_block, U256::from(23u64));
        assert_eq!(meta.reserve_factor, U256::from(24u64));
        assert_eq!(meta.total_borrows, U256::from(25u64));
        assert_eq!(meta.total_reserves, U256::from(26u64));
        assert_eq!(meta.total_supply, U256::from(27u64));
        assert_eq!(meta.total_cash, U256::from(28u64));
    }

    #[tokio::test]
    async fn test_unlisted_collateral_factor_returned_verbatim() {
        let chain = chain();
        chain.set_listing(wrapped(), false, U256::from(5u64));

        let meta = reader(&chain).fetch_market_metadata(wrapped()).await.unwrap();

        assert!(!meta.is_listed);
        assert_eq!(meta.collateral_factor, U256::from(5u64));
    }

    #[tokio::test]
    async fn test_asset_failure_fails_record() {
        let chain = chain();
        chain.fail(
            calls::ASSET_DECIMALS,
            asset(),
            ReadError::upstream(calls::ASSET_DECIMALS, "execution reverted"),
        );

        let err = reader(&chain)
            .fetch_market_metadata(wrapped())
            .await
            .unwrap_err();

        assert_eq!(err.instrument(), Some(wrapped()));
        assert!(matches!(
            err.read_error(),
            Some(ReadError::UpstreamReadFailure { call: "asset.decimals", .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_registry_response_fails_record() {
        let chain = chain();
        chain.fail(
            calls::MARKETS,
            native(),
            ReadError::malformed(calls::MARKETS, "expected (bool, uint256)"),
        );

        let err = reader(&chain)
            .fetch_market_metadata(native())
            .await
            .unwrap_err();

        assert!(matches!(
            err.read_error(),
            Some(ReadError::MalformedResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_exchange_rate_failure_stops_before_other_calls() {
        let chain = chain();
        chain.fail(
            calls::EXCHANGE_RATE_CURRENT,
            native(),
            ReadError::upstream(calls::EXCHANGE_RATE_CURRENT, "timed out"),
        );

        let err = reader(&chain)
            .fetch_market_metadata(native())
            .await
            .unwrap_err();

        assert_eq!(
            err.read_error().map(ReadError::call),
            Some(calls::EXCHANGE_RATE_CURRENT)
        );
        assert_eq!(chain.call_count(calls::SYMBOL), 0);
        assert_eq!(chain.call_count(calls::MARKETS), 0);
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let chain = chain();
        let config = ReaderConfig {
            metadata_native_marker: String::new(),
            ..Default::default()
        };
        let result = MarketDataReader::new(chain.clone(), chain.clone(), chain, &config);
        assert!(matches!(result, Err(LensError::InvalidConfig(_))));
    }
}
