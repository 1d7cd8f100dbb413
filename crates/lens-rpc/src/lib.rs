//! EVM JSON-RPC collaborators for the lens.
//!
//! Implements the lens-reader capability traits over an alloy provider:
//! - `RpcLens`: instrument, underlying-asset and native-balance reads
//! - `RpcMarketRegistry`: comptroller listing reads and market discovery
//!
//! Every call is an `eth_call` bounded by a per-call timeout.

pub mod client;
pub mod contracts;
pub mod error;

pub use client::{RpcLens, RpcMarketRegistry, RpcProvider, DEFAULT_CALL_TIMEOUT};
pub use error::{RpcError, RpcResult};
