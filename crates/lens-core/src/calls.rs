//! Names of the upstream read calls.
//!
//! Used to tag `ReadError`s so a failure names the exact query that broke.
//! Names match the contract method each call maps to.

// Instrument
pub const EXCHANGE_RATE_CURRENT: &str = "exchangeRateCurrent";
pub const COMPTROLLER: &str = "comptroller";
pub const SYMBOL: &str = "symbol";
pub const SUPPLY_RATE_PER_BLOCK: &str = "supplyRatePerBlock";
pub const BORROW_RATE_PER_BLOCK: &str = "borrowRatePerBlock";
pub const RESERVE_FACTOR: &str = "reserveFactorMantissa";
pub const TOTAL_BORROWS: &str = "totalBorrows";
pub const TOTAL_RESERVES: &str = "totalReserves";
pub const TOTAL_SUPPLY: &str = "totalSupply";
pub const TOTAL_CASH: &str = "getCash";
pub const INSTRUMENT_DECIMALS: &str = "decimals";
pub const UNDERLYING: &str = "underlying";
pub const BALANCE_OF: &str = "balanceOf";
pub const BORROW_BALANCE_CURRENT: &str = "borrowBalanceCurrent";
pub const BALANCE_OF_UNDERLYING: &str = "balanceOfUnderlying";

// Registry
pub const MARKETS: &str = "markets";
pub const GET_ALL_MARKETS: &str = "getAllMarkets";

// Underlying asset
pub const ASSET_DECIMALS: &str = "asset.decimals";
pub const ASSET_BALANCE_OF: &str = "asset.balanceOf";
pub const ASSET_ALLOWANCE: &str = "asset.allowance";

// Execution environment
pub const NATIVE_BALANCE: &str = "eth_getBalance";
