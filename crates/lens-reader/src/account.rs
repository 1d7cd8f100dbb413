//! Account position reader.
//!
//! Assembles one `AccountPosition` per (instrument, account). The wallet-side
//! figures come from the underlying token for wrapped markets and from the
//! account's native balance for the native market.

use std::sync::Arc;
use std::time::Instant;

use lens_core::{
    AccountPosition, Address, LensError, LensResult, MarketKind, NativeMarker, ReadResult, U256,
};
use lens_telemetry::Metrics;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::batch::fetch_ordered;
use crate::config::ReaderConfig;
use crate::kind::resolve_market_kind;
use crate::source::{InstrumentSource, NativeBalanceSource, UnderlyingAssetSource};

const KIND: &str = "position";

/// Reads per-account positions in instruments.
pub struct AccountPositionReader {
    instruments: Arc<dyn InstrumentSource>,
    assets: Arc<dyn UnderlyingAssetSource>,
    native: Arc<dyn NativeBalanceSource>,
    native_marker: NativeMarker,
    max_in_flight: usize,
}

impl AccountPositionReader {
    /// Create a reader over the given collaborators.
    ///
    /// # Errors
    /// Returns `LensError::InvalidConfig` if `config` fails validation.
    pub fn new(
        instruments: Arc<dyn InstrumentSource>,
        assets: Arc<dyn UnderlyingAssetSource>,
        native: Arc<dyn NativeBalanceSource>,
        config: &ReaderConfig,
    ) -> LensResult<Self> {
        config.validate()?;
        Ok(Self {
            instruments,
            assets,
            native,
            native_marker: config.balance_marker(),
            max_in_flight: config.max_in_flight,
        })
    }

    #[must_use]
    pub fn native_marker(&self) -> &NativeMarker {
        &self.native_marker
    }

    /// Fetch one account's position in one instrument.
    pub async fn fetch_account_position(
        &self,
        instrument: Address,
        account: Address,
    ) -> LensResult<AccountPosition> {
        let started = Instant::now();
        let result = self.assemble(instrument, account).await;
        Metrics::record_latency(KIND, started.elapsed().as_secs_f64() * 1000.0);

        match result {
            Ok((position, kind)) => {
                Metrics::record_fetched(KIND, kind.label());
                debug!(%instrument, %account, %kind, "Account position assembled");
                Ok(position)
            }
            Err(source) => {
                Metrics::record_failed(KIND, source.kind_label());
                warn!(%instrument, %account, error = %source, "Account position read failed");
                Err(LensError::Position {
                    instrument,
                    account,
                    source,
                })
            }
        }
    }

    /// Fetch one account's positions in several instruments, in request
    /// order. Same batching contract as market metadata: fail-fast, no
    /// partial result, cancellable.
    pub async fn fetch_account_position_batch(
        &self,
        instruments: &[Address],
        account: Address,
        cancel: &CancellationToken,
    ) -> LensResult<Vec<AccountPosition>> {
        info!(count = instruments.len(), %account, "Fetching account position batch");

        let records = fetch_ordered(KIND, instruments, self.max_in_flight, cancel, |instrument| {
            self.fetch_account_position(instrument, account)
        })
        .await?;

        info!(count = records.len(), %account, "Account position batch complete");
        Ok(records)
    }

    async fn assemble(
        &self,
        instrument: Address,
        account: Address,
    ) -> ReadResult<(AccountPosition, MarketKind)> {
        let src = self.instruments.as_ref();
        let (instrument_balance, borrow_balance, underlying_balance_equivalent, kind) = tokio::try_join!(
            src.balance_of(instrument, account),
            src.borrow_balance_current(instrument, account),
            src.balance_of_underlying(instrument, account),
            resolve_market_kind(src, instrument, &self.native_marker),
        )?;

        let (underlying_token_balance, underlying_token_allowance) =
            self.wallet_side(kind, instrument, account).await?;

        let position = AccountPosition {
            instrument,
            instrument_balance,
            borrow_balance,
            underlying_balance_equivalent,
            underlying_token_balance,
            underlying_token_allowance,
        };
        Ok((position, kind))
    }

    /// Wallet balance and allowance for the branch `kind` resolved to.
    async fn wallet_side(
        &self,
        kind: MarketKind,
        instrument: Address,
        account: Address,
    ) -> ReadResult<(U256, U256)> {
        match kind {
            MarketKind::Native => {
                // No allowance applies to the native asset; the whole balance
                // is available.
                let balance = self.native.native_balance(account).await?;
                Ok((balance, balance))
            }
            MarketKind::Wrapped { underlying } => tokio::try_join!(
                self.assets.balance_of(underlying, account),
                self.assets.allowance(underlying, account, instrument),
            ),
        }
    }
}
