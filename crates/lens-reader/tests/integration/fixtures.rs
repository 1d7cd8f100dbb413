//! Shared chain fixtures.

#![allow(dead_code)]

use std::sync::Arc;

use lens_core::{Address, U256};
use lens_reader::mock::MockChain;
use lens_reader::{AccountPositionReader, MarketDataReader, ReaderConfig};

/// 1e18 scaled value: `mantissa(75, 2)` == 0.75e18.
pub fn mantissa(value: u64, decimals: u32) -> U256 {
    U256::from(value) * U256::from(10u64).pow(U256::from(18 - decimals))
}

pub fn f_eth() -> Address {
    Address::repeat_byte(0x10)
}

pub fn f_usdc() -> Address {
    Address::repeat_byte(0x20)
}

pub fn f_dai() -> Address {
    Address::repeat_byte(0x30)
}

pub fn usdc() -> Address {
    Address::repeat_byte(0xc2)
}

pub fn dai() -> Address {
    Address::repeat_byte(0xc3)
}

pub fn alice() -> Address {
    Address::repeat_byte(0xaa)
}

pub fn bob() -> Address {
    Address::repeat_byte(0xbb)
}

/// A three-market deployment: native fETH, fUSDC over a 6-decimal token and
/// fDAI over an 18-decimal token. All markets listed.
pub fn deployment() -> Arc<MockChain> {
    let chain = Arc::new(MockChain::new());

    chain.add_native_instrument(f_eth(), "fETH");
    chain.update_instrument(f_eth(), |i| {
        i.exchange_rate = mantissa(2, 1);
        i.total_supply = U256::from(1_000_000u64);
    });
    chain.set_listing(f_eth(), true, mantissa(75, 2));

    chain.add_wrapped_instrument(f_usdc(), "fUSDC", usdc(), 6);
    chain.update_instrument(f_usdc(), |i| {
        i.exchange_rate = U256::from(200_000_000_000_000u64);
        i.total_cash = U256::from(5_000_000u64);
    });
    chain.set_listing(f_usdc(), true, mantissa(8, 1));

    chain.add_wrapped_instrument(f_dai(), "fDAI", dai(), 18);
    chain.set_listing(f_dai(), true, mantissa(6, 1));

    chain
}

pub fn market_reader(chain: &Arc<MockChain>, config: &ReaderConfig) -> MarketDataReader {
    MarketDataReader::new(chain.clone(), chain.clone(), chain.clone(), config).unwrap()
}

pub fn position_reader(chain: &Arc<MockChain>, config: &ReaderConfig) -> AccountPositionReader {
    AccountPositionReader::new(chain.clone(), chain.clone(), chain.clone(), config).unwrap()
}
