//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Lens(#[from] lens_core::LensError),

    #[error("Discovery failed: {0}")]
    Discovery(#[from] lens_core::ReadError),

    #[error("RPC error: {0}")]
    Rpc(#[from] lens_rpc::RpcError),

    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

pub type AppResult<T> = Result<T, AppError>;
