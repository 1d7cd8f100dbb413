//! Normalized per-instrument records.
//!
//! Both records are plain snapshots: built once per query, handed to the
//! caller, never mutated or retained afterwards.

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Market-level state of one instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketMetadata {
    pub instrument: Address,
    /// Exchange rate mantissa (1e18), accrued to the current block.
    #[serde(with = "crate::u256_dec")]
    pub exchange_rate: U256,
    #[serde(with = "crate::u256_dec")]
    pub supply_rate_per_block: U256,
    #[serde(with = "crate::u256_dec")]
    pub borrow_rate_per_block: U256,
    /// Reserve factor mantissa (1e18).
    #[serde(with = "crate::u256_dec")]
    pub reserve_factor: U256,
    #[serde(with = "crate::u256_dec")]
    pub total_borrows: U256,
    #[serde(with = "crate::u256_dec")]
    pub total_reserves: U256,
    #[serde(with = "crate::u256_dec")]
    pub total_supply: U256,
    #[serde(with = "crate::u256_dec")]
    pub total_cash: U256,
    pub is_listed: bool,
    /// Collateral factor mantissa (1e18). Only meaningful when `is_listed`.
    #[serde(with = "crate::u256_dec")]
    pub collateral_factor: U256,
    /// Zero address for the native-asset market.
    pub underlying_asset: Address,
    pub instrument_decimals: u8,
    pub underlying_decimals: u8,
}

/// One account's position in one instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountPosition {
    pub instrument: Address,
    /// Balance in instrument units.
    #[serde(with = "crate::u256_dec")]
    pub instrument_balance: U256,
    /// Outstanding borrow including interest accrued to the current block.
    #[serde(with = "crate::u256_dec")]
    pub borrow_balance: U256,
    /// Instrument balance converted to underlying units.
    #[serde(with = "crate::u256_dec")]
    pub underlying_balance_equivalent: U256,
    /// Wallet balance of the underlying token, or the native balance for the
    /// native-asset market.
    #[serde(with = "crate::u256_dec")]
    pub underlying_token_balance: U256,
    /// Allowance granted to the instrument, or the native balance for the
    /// native-asset market (no allowance applies there).
    #[serde(with = "crate::u256_dec")]
    pub underlying_token_allowance: U256,
}
