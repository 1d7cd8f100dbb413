//! RPC adapter error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("Failed to connect to {url}: {reason}")]
    Connect { url: String, reason: String },
}

pub type RpcResult<T> = Result<T, RpcError>;
