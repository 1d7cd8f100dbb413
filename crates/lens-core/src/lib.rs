//! Core types for the lending-market lens.
//!
//! This crate provides the value types shared by the readers and adapters:
//! - `MarketMetadata`, `AccountPosition`: Normalized per-instrument records
//! - `MarketKind`: Native vs. wrapped market discriminator
//! - `NativeMarker`: Symbol marker identifying the native-asset market
//! - `ReadError`, `LensError`: Failure kinds for upstream reads

pub mod calls;
pub mod error;
pub mod market;
pub mod records;
pub mod u256_dec;

pub use error::{LensError, LensResult, ReadError, ReadResult};
pub use market::{Listing, MarketKind, NativeMarker, NATIVE_DECIMALS};
pub use records::{AccountPosition, MarketMetadata};

pub use alloy::primitives::{Address, U256};
