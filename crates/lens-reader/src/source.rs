//! Read-only capability traits for the lens collaborators.
//!
//! The readers never talk to a transport directly. They are handed one
//! implementation per collaborator, which allows for:
//! - Dependency injection for testing (see `mock::MockChain`)
//! - An EVM JSON-RPC backend (`lens-rpc`) in production
//!
//! Every method is a pure read. Implementations own timeouts and map
//! transport failures to `ReadError::UpstreamReadFailure`.

use std::pin::Pin;

use lens_core::{Address, Listing, ReadResult, U256};

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Market registry (comptroller) queries.
pub trait MarketRegistry: Send + Sync {
    /// Listing status and collateral factor of an instrument.
    fn market_listing(&self, instrument: Address) -> BoxFuture<'_, ReadResult<Listing>>;
}

/// Instrument (cToken) queries.
pub trait InstrumentSource: Send + Sync {
    /// Exchange rate accrued to the current block.
    fn exchange_rate_current(&self, instrument: Address) -> BoxFuture<'_, ReadResult<U256>>;

    fn symbol(&self, instrument: Address) -> BoxFuture<'_, ReadResult<String>>;

    fn supply_rate_per_block(&self, instrument: Address) -> BoxFuture<'_, ReadResult<U256>>;

    fn borrow_rate_per_block(&self, instrument: Address) -> BoxFuture<'_, ReadResult<U256>>;

    fn reserve_factor(&self, instrument: Address) -> BoxFuture<'_, ReadResult<U256>>;

    fn total_borrows(&self, instrument: Address) -> BoxFuture<'_, ReadResult<U256>>;

    fn total_reserves(&self, instrument: Address) -> BoxFuture<'_, ReadResult<U256>>;

    fn total_supply(&self, instrument: Address) -> BoxFuture<'_, ReadResult<U256>>;

    fn total_cash(&self, instrument: Address) -> BoxFuture<'_, ReadResult<U256>>;

    fn decimals(&self, instrument: Address) -> BoxFuture<'_, ReadResult<u8>>;

    /// Underlying token of a wrapped market. Native markets do not implement
    /// this call upstream and will fail it.
    fn underlying(&self, instrument: Address) -> BoxFuture<'_, ReadResult<Address>>;

    fn balance_of(&self, instrument: Address, account: Address)
        -> BoxFuture<'_, ReadResult<U256>>;

    /// Borrow balance including interest accrued to the current block.
    fn borrow_balance_current(
        &self,
        instrument: Address,
        account: Address,
    ) -> BoxFuture<'_, ReadResult<U256>>;

    fn balance_of_underlying(
        &self,
        instrument: Address,
        account: Address,
    ) -> BoxFuture<'_, ReadResult<U256>>;
}

/// Underlying ERC-20 queries.
pub trait UnderlyingAssetSource: Send + Sync {
    fn decimals(&self, asset: Address) -> BoxFuture<'_, ReadResult<u8>>;

    fn balance_of(&self, asset: Address, account: Address) -> BoxFuture<'_, ReadResult<U256>>;

    fn allowance(
        &self,
        asset: Address,
        owner: Address,
        spender: Address,
    ) -> BoxFuture<'_, ReadResult<U256>>;
}

/// Native-asset balance, read from the execution environment.
pub trait NativeBalanceSource: Send + Sync {
    fn native_balance(&self, account: Address) -> BoxFuture<'_, ReadResult<U256>>;
}
