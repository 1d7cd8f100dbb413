//! In-memory chain for testing the readers.
//!
//! `MockChain` implements every capability trait over plain maps, with
//! per-call failure injection, stalls, and call counting. A call is keyed by
//! its name and subject address (the instrument for instrument and registry
//! calls, the asset for asset calls, the account for native balances).

use std::collections::{HashMap, HashSet};

use lens_core::{calls, Address, Listing, ReadError, ReadResult, U256};
use parking_lot::Mutex;

use crate::source::{
    BoxFuture, InstrumentSource, MarketRegistry, NativeBalanceSource, UnderlyingAssetSource,
};

/// Mocked instrument state.
#[derive(Debug, Clone, Default)]
pub struct MockInstrument {
    pub symbol: String,
    pub exchange_rate: U256,
    pub supply_rate_per_block: U256,
    pub borrow_rate_per_block: U256,
    pub reserve_factor: U256,
    pub total_borrows: U256,
    pub total_reserves: U256,
    pub total_supply: U256,
    pub total_cash: U256,
    pub decimals: u8,
    /// `None` for native markets; `underlying()` reverts.
    pub underlying: Option<Address>,
    pub listing: Listing,
    pub balances: HashMap<Address, U256>,
    pub borrow_balances: HashMap<Address, U256>,
    pub underlying_balances: HashMap<Address, U256>,
}

/// Mocked ERC-20 state.
#[derive(Debug, Clone, Default)]
pub struct MockAsset {
    pub decimals: u8,
    pub balances: HashMap<Address, U256>,
    /// Keyed by (owner, spender).
    pub allowances: HashMap<(Address, Address), U256>,
}

/// In-memory implementation of all lens collaborators.
#[derive(Debug, Default)]
pub struct MockChain {
    instruments: Mutex<HashMap<Address, MockInstrument>>,
    assets: Mutex<HashMap<Address, MockAsset>>,
    native_balances: Mutex<HashMap<Address, U256>>,
    failures: Mutex<HashMap<(&'static str, Address), ReadError>>,
    stalls: Mutex<HashSet<(&'static str, Address)>>,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl MockChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a native-asset market with the given symbol.
    pub fn add_native_instrument(&self, instrument: Address, symbol: &str) {
        self.instruments.lock().insert(
            instrument,
            MockInstrument {
                symbol: symbol.to_string(),
                decimals: 8,
                ..Default::default()
            },
        );
    }

    /// Add a wrapped market and its underlying asset.
    pub fn add_wrapped_instrument(
        &self,
        instrument: Address,
        symbol: &str,
        asset: Address,
        asset_decimals: u8,
    ) {
        self.instruments.lock().insert(
            instrument,
            MockInstrument {
                symbol: symbol.to_string(),
                decimals: 8,
                underlying: Some(asset),
                ..Default::default()
            },
        );
        self.assets
            .lock()
            .entry(asset)
            .or_default()
            .decimals = asset_decimals;
    }

    /// Mutate an instrument in place.
    ///
    /// # Panics
    /// Panics if the instrument was never added.
    pub fn update_instrument(&self, instrument: Address, f: impl FnOnce(&mut MockInstrument)) {
        let mut instruments = self.instruments.lock();
        let entry = instruments
            .get_mut(&instrument)
            .expect("instrument not added to mock chain");
        f(entry);
    }

    pub fn set_listing(&self, instrument: Address, is_listed: bool, collateral_factor: U256) {
        self.update_instrument(instrument, |i| {
            i.listing = Listing::new(is_listed, collateral_factor);
        });
    }

    /// Set an account's instrument-side figures.
    pub fn set_account(
        &self,
        instrument: Address,
        account: Address,
        balance: U256,
        borrow_balance: U256,
        underlying_equivalent: U256,
    ) {
        self.update_instrument(instrument, |i| {
            i.balances.insert(account, balance);
            i.borrow_balances.insert(account, borrow_balance);
            i.underlying_balances.insert(account, underlying_equivalent);
        });
    }

    pub fn set_asset_balance(&self, asset: Address, account: Address, balance: U256) {
        self.assets
            .lock()
            .entry(asset)
            .or_default()
            .balances
            .insert(account, balance);
    }

    pub fn set_allowance(&self, asset: Address, owner: Address, spender: Address, amount: U256) {
        self.assets
            .lock()
            .entry(asset)
            .or_default()
            .allowances
            .insert((owner, spender), amount);
    }

    pub fn set_native_balance(&self, account: Address, balance: U256) {
        self.native_balances.lock().insert(account, balance);
    }

    /// Make `call` on `subject` fail with `error`.
    pub fn fail(&self, call: &'static str, subject: Address, error: ReadError) {
        self.failures.lock().insert((call, subject), error);
    }

    /// Make `call` on `subject` never complete.
    pub fn stall(&self, call: &'static str, subject: Address) {
        self.stalls.lock().insert((call, subject));
    }

    /// Remove all injected failures and stalls.
    pub fn heal(&self) {
        self.failures.lock().clear();
        self.stalls.lock().clear();
    }

    /// Number of times `call` was issued, across all subjects.
    pub fn call_count(&self, call: &'static str) -> usize {
        self.calls.lock().get(call).copied().unwrap_or(0)
    }

    fn respond<T: Send + 'static>(
        &self,
        call: &'static str,
        subject: Address,
        read: impl FnOnce(&Self) -> ReadResult<T>,
    ) -> BoxFuture<'_, ReadResult<T>> {
        *self.calls.lock().entry(call).or_default() += 1;

        if self.stalls.lock().contains(&(call, subject)) {
            return Box::pin(std::future::pending());
        }

        let injected = self.failures.lock().get(&(call, subject)).cloned();
        let result = match injected {
            Some(err) => Err(err),
            None => read(self),
        };

        Box::pin(async move {
            tokio::task::yield_now().await;
            result
        })
    }

    fn with_instrument<T>(
        &self,
        call: &'static str,
        instrument: Address,
        f: impl FnOnce(&MockInstrument) -> T,
    ) -> ReadResult<T> {
        self.instruments
            .lock()
            .get(&instrument)
            .map(f)
            .ok_or_else(|| ReadError::upstream(call, format!("no contract at {instrument}")))
    }

    fn with_asset<T>(
        &self,
        call: &'static str,
        asset: Address,
        f: impl FnOnce(&MockAsset) -> T,
    ) -> ReadResult<T> {
        self.assets
            .lock()
            .get(&asset)
            .map(f)
            .ok_or_else(|| ReadError::upstream(call, format!("no contract at {asset}")))
    }
}

fn lookup(map: &HashMap<Address, U256>, account: &Address) -> U256 {
    map.get(account).copied().unwrap_or_default()
}

impl MarketRegistry for MockChain {
    fn market_listing(&self, instrument: Address) -> BoxFuture<'_, ReadResult<Listing>> {
        self.respond(calls::MARKETS, instrument, |chain| {
            // Unknown instruments read as unlisted, as a comptroller would.
            Ok(chain
                .instruments
                .lock()
                .get(&instrument)
                .map(|i| i.listing)
                .unwrap_or_default())
        })
    }
}

impl InstrumentSource for MockChain {
    fn exchange_rate_current(&self, instrument: Address) -> BoxFuture<'_, ReadResult<U256>> {
        self.respond(calls::EXCHANGE_RATE_CURRENT, instrument, |chain| {
            chain.with_instrument(calls::EXCHANGE_RATE_CURRENT, instrument, |i| i.exchange_rate)
        })
    }

    fn symbol(&self, instrument: Address) -> BoxFuture<'_, ReadResult<String>> {
        self.respond(calls::SYMBOL, instrument, |chain| {
            chain.with_instrument(calls::SYMBOL, instrument, |i| i.symbol.clone())
        })
    }

    fn supply_rate_per_block(&self, instrument: Address) -> BoxFuture<'_, ReadResult<U256>> {
        self.respond(calls::SUPPLY_RATE_PER_BLOCK, instrument, |chain| {
            chain.with_instrument(calls::SUPPLY_RATE_PER_BLOCK, instrument, |i| {
                i.supply_rate_per_block
            })
        })
    }

    fn borrow_rate_per_block(&self, instrument: Address) -> BoxFuture<'_, ReadResult<U256>> {
        self.respond(calls::BORROW_RATE_PER_BLOCK, instrument, |chain| {
            chain.with_instrument(calls::BORROW_RATE_PER_BLOCK, instrument, |i| {
                i.borrow_rate_per_block
            })
        })
    }

    fn reserve_factor(&self, instrument: Address) -> BoxFuture<'_, ReadResult<U256>> {
        self.respond(calls::RESERVE_FACTOR, instrument, |chain| {
            chain.with_instrument(calls::RESERVE_FACTOR, instrument, |i| i.reserve_factor)
        })
    }

    fn total_borrows(&self, instrument: Address) -> BoxFuture<'_, ReadResult<U256>> {
        self.respond(calls::TOTAL_BORROWS, instrument, |chain| {
            chain.with_instrument(calls::TOTAL_BORROWS, instrument, |i| i.total_borrows)
        })
    }

    fn total_reserves(&self, instrument: Address) -> BoxFuture<'_, ReadResult<U256>> {
        self.respond(calls::TOTAL_RESERVES, instrument, |chain| {
            chain.with_instrument(calls::TOTAL_RESERVES, instrument, |i| i.total_reserves)
        })
    }

    fn total_supply(&self, instrument: Address) -> BoxFuture<'_, ReadResult<U256>> {
        self.respond(calls::TOTAL_SUPPLY, instrument, |chain| {
            chain.with_instrument(calls::TOTAL_SUPPLY, instrument, |i| i.total_supply)
        })
    }

    fn total_cash(&self, instrument: Address) -> BoxFuture<'_, ReadResult<U256>> {
        self.respond(calls::TOTAL_CASH, instrument, |chain| {
            chain.with_instrument(calls::TOTAL_CASH, instrument, |i| i.total_cash)
        })
    }

    fn decimals(&self, instrument: Address) -> BoxFuture<'_, ReadResult<u8>> {
        self.respond(calls::INSTRUMENT_DECIMALS, instrument, |chain| {
            chain.with_instrument(calls::INSTRUMENT_DECIMALS, instrument, |i| i.decimals)
        })
    }

    fn underlying(&self, instrument: Address) -> BoxFuture<'_, ReadResult<Address>> {
        self.respond(calls::UNDERLYING, instrument, |chain| {
            chain
                .with_instrument(calls::UNDERLYING, instrument, |i| i.underlying)?
                .ok_or_else(|| ReadError::upstream(calls::UNDERLYING, "execution reverted"))
        })
    }

    fn balance_of(
        &self,
        instrument: Address,
        account: Address,
    ) -> BoxFuture<'_, ReadResult<U256>> {
        self.respond(calls::BALANCE_OF, instrument, |chain| {
            chain.with_instrument(calls::BALANCE_OF, instrument, |i| {
                lookup(&i.balances, &account)
            })
        })
    }

    fn borrow_balance_current(
        &self,
        instrument: Address,
        account: Address,
    ) -> BoxFuture<'_, ReadResult<U256>> {
        self.respond(calls::BORROW_BALANCE_CURRENT, instrument, |chain| {
            chain.with_instrument(calls::BORROW_BALANCE_CURRENT, instrument, |i| {
                lookup(&i.borrow_balances, &account)
            })
        })
    }

    fn balance_of_underlying(
        &self,
        instrument: Address,
        account: Address,
    ) -> BoxFuture<'_, ReadResult<U256>> {
        self.respond(calls::BALANCE_OF_UNDERLYING, instrument, |chain| {
            chain.with_instrument(calls::BALANCE_OF_UNDERLYING, instrument, |i| {
                lookup(&i.underlying_balances, &account)
            })
        })
    }
}

impl UnderlyingAssetSource for MockChain {
    fn decimals(&self, asset: Address) -> BoxFuture<'_, ReadResult<u8>> {
        self.respond(calls::ASSET_DECIMALS, asset, |chain| {
            chain.with_asset(calls::ASSET_DECIMALS, asset, |a| a.decimals)
        })
    }

    fn balance_of(&self, asset: Address, account: Address) -> BoxFuture<'_, ReadResult<U256>> {
        self.respond(calls::ASSET_BALANCE_OF, asset, |chain| {
            chain.with_asset(calls::ASSET_BALANCE_OF, asset, |a| {
                lookup(&a.balances, &account)
            })
        })
    }

    fn allowance(
        &self,
        asset: Address,
        owner: Address,
        spender: Address,
    ) -> BoxFuture<'_, ReadResult<U256>> {
        self.respond(calls::ASSET_ALLOWANCE, asset, |chain| {
            chain.with_asset(calls::ASSET_ALLOWANCE, asset, |a| {
                a.allowances
                    .get(&(owner, spender))
                    .copied()
                    .unwrap_or_default()
            })
        })
    }
}

impl NativeBalanceSource for MockChain {
    fn native_balance(&self, account: Address) -> BoxFuture<'_, ReadResult<U256>> {
        self.respond(calls::NATIVE_BALANCE, account, |chain| {
            Ok(lookup(&chain.native_balances.lock(), &account))
        })
    }
}
