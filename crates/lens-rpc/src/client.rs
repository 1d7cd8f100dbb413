//! JSON-RPC implementation of the lens collaborators.
//!
//! Each trait method issues one `eth_call` (or `eth_getBalance`) through the
//! shared provider, bounded by `call_timeout`.
//!
//! Calls go out with `call_raw` and are decoded here, so empty return data
//! can be told apart from data that does not decode.
//!
//! Error mapping:
//! - non-empty return data that fails to decode -> `MalformedResponse`
//! - transport error, revert, empty return, timeout -> `UpstreamReadFailure`

use std::future::IntoFuture;
use std::time::Duration;

use alloy::primitives::Bytes;
use alloy::providers::{Provider, ProviderBuilder, RootProvider};
use alloy::sol_types::SolCall;
use alloy::transports::BoxTransport;
use lens_core::{calls, Address, Listing, ReadError, ReadResult, U256};
use lens_reader::{
    BoxFuture, InstrumentSource, MarketRegistry, NativeBalanceSource, UnderlyingAssetSource,
};
use lens_telemetry::Metrics;
use tracing::{debug, info};

use crate::contracts::{IComptroller, ICToken, IEip20};
use crate::error::{RpcError, RpcResult};

/// Default per-call timeout.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Provider type used by the adapter.
pub type RpcProvider = RootProvider<BoxTransport>;

/// Await one upstream call under `timeout` and map its failure.
pub(crate) async fn timed<T, F>(call: &'static str, timeout: Duration, fut: F) -> ReadResult<T>
where
    F: IntoFuture<Output = Result<T, alloy::contract::Error>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(classify(call, e)),
        Err(_) => Err(ReadError::upstream(
            call,
            format!("timed out after {}ms", timeout.as_millis()),
        )),
    }
}

/// Run one raw `eth_call` under `timeout` and decode its return data as `C`.
pub(crate) async fn read_call<C, F>(
    call: &'static str,
    timeout: Duration,
    fut: F,
) -> ReadResult<C::Return>
where
    C: SolCall,
    F: IntoFuture<Output = Result<Bytes, alloy::contract::Error>>,
{
    let outcome = timed(call, timeout, fut)
        .await
        .and_then(|data| decode::<C>(call, &data));
    record(call, &outcome);
    outcome
}

/// Decode return data of `C`.
///
/// Empty data means there was nothing to answer the call (no code at the
/// address, or a revert without reason), which is an upstream failure.
/// Non-empty data that does not decode is malformed.
pub(crate) fn decode<C: SolCall>(call: &'static str, data: &[u8]) -> ReadResult<C::Return> {
    if data.is_empty() {
        return Err(ReadError::upstream(call, "empty return data"));
    }
    C::abi_decode_returns(data, true).map_err(|e| ReadError::malformed(call, e.to_string()))
}

/// Map an alloy contract error to a read failure.
pub(crate) fn classify(call: &'static str, err: alloy::contract::Error) -> ReadError {
    match err {
        alloy::contract::Error::AbiError(e) => ReadError::malformed(call, e.to_string()),
        other => ReadError::upstream(call, other.to_string()),
    }
}

fn record<T>(call: &'static str, outcome: &ReadResult<T>) {
    let label = match outcome {
        Ok(_) => "ok",
        Err(e) => e.kind_label(),
    };
    Metrics::rpc_call(call, label);
}

/// Instrument, underlying-asset and native-balance reads over JSON-RPC.
#[derive(Clone)]
pub struct RpcLens {
    provider: RpcProvider,
    call_timeout: Duration,
}

impl RpcLens {
    /// Wrap an existing provider.
    pub fn new(provider: RpcProvider, call_timeout: Duration) -> Self {
        Self {
            provider,
            call_timeout,
        }
    }

    /// Build a provider for `rpc_url` (http(s), ws(s) or ipc path).
    pub async fn connect(rpc_url: &str, call_timeout: Duration) -> RpcResult<Self> {
        info!(url = %rpc_url, "Connecting to RPC");

        let provider = ProviderBuilder::new()
            .on_builtin(rpc_url)
            .await
            .map_err(|e| RpcError::Connect {
                url: rpc_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self::new(provider, call_timeout))
    }

    #[must_use]
    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    async fn read<C, F>(&self, call: &'static str, fut: F) -> ReadResult<C::Return>
    where
        C: SolCall,
        F: IntoFuture<Output = Result<Bytes, alloy::contract::Error>>,
    {
        read_call::<C, F>(call, self.call_timeout, fut).await
    }

    /// Registry (comptroller) an instrument reports as its owner.
    pub async fn comptroller_of(&self, instrument: Address) -> ReadResult<Address> {
        let token = ICToken::new(instrument, &self.provider);
        let ret = self
            .read::<ICToken::comptrollerCall, _>(calls::COMPTROLLER, token.comptroller().call_raw())
            .await?;
        debug!(%instrument, comptroller = %ret._0, "Resolved comptroller");
        Ok(ret._0)
    }

    /// Registry handle over the comptroller at `comptroller`.
    #[must_use]
    pub fn registry(&self, comptroller: Address) -> RpcMarketRegistry {
        RpcMarketRegistry {
            comptroller,
            rpc: self.clone(),
        }
    }
}

impl InstrumentSource for RpcLens {
    fn exchange_rate_current(&self, instrument: Address) -> BoxFuture<'_, ReadResult<U256>> {
        Box::pin(async move {
            let token = ICToken::new(instrument, &self.provider);
            let ret = self
                .read::<ICToken::exchangeRateCurrentCall, _>(
                    calls::EXCHANGE_RATE_CURRENT,
                    token.exchangeRateCurrent().call_raw(),
                )
                .await?;
            Ok(ret._0)
        })
    }

    fn symbol(&self, instrument: Address) -> BoxFuture<'_, ReadResult<String>> {
        Box::pin(async move {
            let token = ICToken::new(instrument, &self.provider);
            let ret = self
                .read::<ICToken::symbolCall, _>(calls::SYMBOL, token.symbol().call_raw())
                .await?;
            Ok(ret._0)
        })
    }

    fn supply_rate_per_block(&self, instrument: Address) -> BoxFuture<'_, ReadResult<U256>> {
        Box::pin(async move {
            let token = ICToken::new(instrument, &self.provider);
            let ret = self
                .read::<ICToken::supplyRatePerBlockCall, _>(
                    calls::SUPPLY_RATE_PER_BLOCK,
                    token.supplyRatePerBlock().call_raw(),
                )
                .await?;
            Ok(ret._0)
        })
    }

    fn borrow_rate_per_block(&self, instrument: Address) -> BoxFuture<'_, ReadResult<U256>> {
        Box::pin(async move {
            let token = ICToken::new(instrument, &self.provider);
            let ret = self
                .read::<ICToken::borrowRatePerBlockCall, _>(
                    calls::BORROW_RATE_PER_BLOCK,
                    token.borrowRatePerBlock().call_raw(),
                )
                .await?;
            Ok(ret._0)
        })
    }

    fn reserve_factor(&self, instrument: Address) -> BoxFuture<'_, ReadResult<U256>> {
        Box::pin(async move {
            let token = ICToken::new(instrument, &self.provider);
            let ret = self
                .read::<ICToken::reserveFactorMantissaCall, _>(
                    calls::RESERVE_FACTOR,
                    token.reserveFactorMantissa().call_raw(),
                )
                .await?;
            Ok(ret._0)
        })
    }

    fn total_borrows(&self, instrument: Address) -> BoxFuture<'_, ReadResult<U256>> {
        Box::pin(async move {
            let token = ICToken::new(instrument, &self.provider);
            let ret = self
                .read::<ICToken::totalBorrowsCall, _>(
                    calls::TOTAL_BORROWS,
                    token.totalBorrows().call_raw(),
                )
                .await?;
            Ok(ret._0)
        })
    }

    fn total_reserves(&self, instrument: Address) -> BoxFuture<'_, ReadResult<U256>> {
        Box::pin(async move {
            let token = ICToken::new(instrument, &self.provider);
            let ret = self
                .read::<ICToken::totalReservesCall, _>(
                    calls::TOTAL_RESERVES,
                    token.totalReserves().call_raw(),
                )
                .await?;
            Ok(ret._0)
        })
    }

    fn total_supply(&self, instrument: Address) -> BoxFuture<'_, ReadResult<U256>> {
        Box::pin(async move {
            let token = ICToken::new(instrument, &self.provider);
            let ret = self
                .read::<ICToken::totalSupplyCall, _>(
                    calls::TOTAL_SUPPLY,
                    token.totalSupply().call_raw(),
                )
                .await?;
            Ok(ret._0)
        })
    }

    fn total_cash(&self, instrument: Address) -> BoxFuture<'_, ReadResult<U256>> {
        Box::pin(async move {
            let token = ICToken::new(instrument, &self.provider);
            let ret = self
                .read::<ICToken::getCashCall, _>(calls::TOTAL_CASH, token.getCash().call_raw())
                .await?;
            Ok(ret._0)
        })
    }

    fn decimals(&self, instrument: Address) -> BoxFuture<'_, ReadResult<u8>> {
        Box::pin(async move {
            let token = ICToken::new(instrument, &self.provider);
            let ret = self
                .read::<ICToken::decimalsCall, _>(
                    calls::INSTRUMENT_DECIMALS,
                    token.decimals().call_raw(),
                )
                .await?;
            Ok(ret._0)
        })
    }

    fn underlying(&self, instrument: Address) -> BoxFuture<'_, ReadResult<Address>> {
        Box::pin(async move {
            let token = ICToken::new(instrument, &self.provider);
            let ret = self
                .read::<ICToken::underlyingCall, _>(
                    calls::UNDERLYING,
                    token.underlying().call_raw(),
                )
                .await?;
            Ok(ret._0)
        })
    }

    fn balance_of(&self, instrument: Address, account: Address) -> BoxFuture<'_, ReadResult<U256>> {
        Box::pin(async move {
            let token = ICToken::new(instrument, &self.provider);
            let ret = self
                .read::<ICToken::balanceOfCall, _>(
                    calls::BALANCE_OF,
                    token.balanceOf(account).call_raw(),
                )
                .await?;
            Ok(ret._0)
        })
    }

    fn borrow_balance_current(
        &self,
        instrument: Address,
        account: Address,
    ) -> BoxFuture<'_, ReadResult<U256>> {
        Box::pin(async move {
            let token = ICToken::new(instrument, &self.provider);
            let ret = self
                .read::<ICToken::borrowBalanceCurrentCall, _>(
                    calls::BORROW_BALANCE_CURRENT,
                    token.borrowBalanceCurrent(account).call_raw(),
                )
                .await?;
            Ok(ret._0)
        })
    }

    fn balance_of_underlying(
        &self,
        instrument: Address,
        account: Address,
    ) -> BoxFuture<'_, ReadResult<U256>> {
        Box::pin(async move {
            let token = ICToken::new(instrument, &self.provider);
            let ret = self
                .read::<ICToken::balanceOfUnderlyingCall, _>(
                    calls::BALANCE_OF_UNDERLYING,
                    token.balanceOfUnderlying(account).call_raw(),
                )
                .await?;
            Ok(ret._0)
        })
    }
}

impl UnderlyingAssetSource for RpcLens {
    fn decimals(&self, asset: Address) -> BoxFuture<'_, ReadResult<u8>> {
        Box::pin(async move {
            let token = IEip20::new(asset, &self.provider);
            let ret = self
                .read::<IEip20::decimalsCall, _>(calls::ASSET_DECIMALS, token.decimals().call_raw())
                .await?;
            Ok(ret._0)
        })
    }

    fn balance_of(&self, asset: Address, account: Address) -> BoxFuture<'_, ReadResult<U256>> {
        Box::pin(async move {
            let token = IEip20::new(asset, &self.provider);
            let ret = self
                .read::<IEip20::balanceOfCall, _>(
                    calls::ASSET_BALANCE_OF,
                    token.balanceOf(account).call_raw(),
                )
                .await?;
            Ok(ret._0)
        })
    }

    fn allowance(
        &self,
        asset: Address,
        owner: Address,
        spender: Address,
    ) -> BoxFuture<'_, ReadResult<U256>> {
        Box::pin(async move {
            let token = IEip20::new(asset, &self.provider);
            let ret = self
                .read::<IEip20::allowanceCall, _>(
                    calls::ASSET_ALLOWANCE,
                    token.allowance(owner, spender).call_raw(),
                )
                .await?;
            Ok(ret._0)
        })
    }
}

impl NativeBalanceSource for RpcLens {
    fn native_balance(&self, account: Address) -> BoxFuture<'_, ReadResult<U256>> {
        Box::pin(async move {
            let balance = async {
                self.provider
                    .get_balance(account)
                    .await
                    .map_err(alloy::contract::Error::TransportError)
            };
            let outcome = timed(calls::NATIVE_BALANCE, self.call_timeout, balance).await;
            record(calls::NATIVE_BALANCE, &outcome);
            outcome
        })
    }
}

/// Comptroller reads over JSON-RPC.
#[derive(Clone)]
pub struct RpcMarketRegistry {
    comptroller: Address,
    rpc: RpcLens,
}

impl RpcMarketRegistry {
    #[must_use]
    pub fn address(&self) -> Address {
        self.comptroller
    }

    /// Every instrument the comptroller lists, in registry order.
    pub async fn all_markets(&self) -> ReadResult<Vec<Address>> {
        let comptroller = IComptroller::new(self.comptroller, &self.rpc.provider);
        let ret = self
            .rpc
            .read::<IComptroller::getAllMarketsCall, _>(
                calls::GET_ALL_MARKETS,
                comptroller.getAllMarkets().call_raw(),
            )
            .await?;

        info!(comptroller = %self.comptroller, count = ret._0.len(), "Discovered markets");
        Ok(ret._0)
    }
}

impl MarketRegistry for RpcMarketRegistry {
    fn market_listing(&self, instrument: Address) -> BoxFuture<'_, ReadResult<Listing>> {
        Box::pin(async move {
            let comptroller = IComptroller::new(self.comptroller, &self.rpc.provider);
            let ret = self
                .rpc
                .read::<IComptroller::marketsCall, _>(
                    calls::MARKETS,
                    comptroller.markets(instrument).call_raw(),
                )
                .await?;
            Ok(Listing::new(ret.isListed, ret.collateralFactorMantissa))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::transports::TransportErrorKind;

    fn word(value: u64) -> [u8; 32] {
        U256::from(value).to_be_bytes::<32>()
    }

    #[tokio::test]
    async fn test_timed_passes_value_through() {
        let result = timed(calls::SYMBOL, Duration::from_secs(1), async {
            Ok::<_, alloy::contract::Error>("fETH".to_string())
        })
        .await;
        assert_eq!(result.unwrap(), "fETH");
    }

    #[tokio::test]
    async fn test_timeout_is_upstream_failure() {
        let result = read_call::<IComptroller::marketsCall, _>(
            calls::MARKETS,
            Duration::from_millis(10),
            std::future::pending::<Result<Bytes, alloy::contract::Error>>(),
        )
        .await;

        match result {
            Err(ReadError::UpstreamReadFailure { call, reason }) => {
                assert_eq!(call, calls::MARKETS);
                assert!(reason.contains("timed out"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_return_is_upstream_failure() {
        // No code at the address: eth_call succeeds with empty data.
        let result = read_call::<IComptroller::marketsCall, _>(
            calls::MARKETS,
            Duration::from_secs(1),
            async { Ok::<_, alloy::contract::Error>(Bytes::new()) },
        )
        .await;

        assert!(matches!(
            result,
            Err(ReadError::UpstreamReadFailure { call: "markets", .. })
        ));
    }

    #[tokio::test]
    async fn test_short_return_is_malformed() {
        // One word where (bool, uint256) needs two.
        let data = Bytes::copy_from_slice(&word(1));
        let result = read_call::<IComptroller::marketsCall, _>(
            calls::MARKETS,
            Duration::from_secs(1),
            async move { Ok::<_, alloy::contract::Error>(data) },
        )
        .await;

        assert!(matches!(
            result,
            Err(ReadError::MalformedResponse { call: "markets", .. })
        ));
    }

    #[tokio::test]
    async fn test_well_formed_return_decodes() {
        let mut data = word(1).to_vec();
        data.extend_from_slice(&word(750));
        let ret = read_call::<IComptroller::marketsCall, _>(
            calls::MARKETS,
            Duration::from_secs(1),
            async move { Ok::<_, alloy::contract::Error>(Bytes::from(data)) },
        )
        .await
        .unwrap();

        assert!(ret.isListed);
        assert_eq!(ret.collateralFactorMantissa, U256::from(750u64));
    }

    #[test]
    fn test_decode_separates_empty_from_garbage() {
        let empty = decode::<ICToken::decimalsCall>(calls::INSTRUMENT_DECIMALS, &[]).unwrap_err();
        assert_eq!(empty.kind_label(), "upstream");

        let garbage = decode::<ICToken::decimalsCall>(calls::INSTRUMENT_DECIMALS, &[0xff; 7])
            .unwrap_err();
        assert_eq!(garbage.kind_label(), "malformed");
    }

    #[test]
    fn test_transport_error_is_upstream_failure() {
        let err = alloy::contract::Error::TransportError(TransportErrorKind::custom_str(
            "connection refused",
        ));
        let mapped = classify(calls::BALANCE_OF, err);
        assert!(matches!(mapped, ReadError::UpstreamReadFailure { .. }));
        assert_eq!(mapped.call(), calls::BALANCE_OF);
    }
}
