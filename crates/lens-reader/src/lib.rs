//! Batch readers for lending-market instruments.
//!
//! Given instrument addresses (and optionally an account), queries each
//! instrument's live state through the capability traits in `source`,
//! normalizes native and wrapped markets into one record shape, and returns
//! records in request order.
//!
//! - `MarketDataReader`: per-instrument `MarketMetadata`
//! - `AccountPositionReader`: per-instrument `AccountPosition` for one account
//! - `mock::MockChain`: in-memory collaborators for tests

mod batch;
pub mod account;
pub mod config;
pub mod kind;
pub mod market_data;
pub mod mock;
pub mod source;

pub use account::AccountPositionReader;
pub use config::ReaderConfig;
pub use kind::resolve_market_kind;
pub use market_data::MarketDataReader;
pub use source::{
    BoxFuture, InstrumentSource, MarketRegistry, NativeBalanceSource, UnderlyingAssetSource,
};
