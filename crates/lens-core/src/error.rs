//! Error types for lens reads.

use alloy::primitives::Address;
use thiserror::Error;

/// Failure of a single upstream query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    /// The query did not return successfully (transport error, timeout,
    /// revert).
    #[error("Upstream read failed: {call}: {reason}")]
    UpstreamReadFailure { call: &'static str, reason: String },

    /// The query returned, but with a shape the reader cannot interpret.
    #[error("Malformed response: {call}: {reason}")]
    MalformedResponse { call: &'static str, reason: String },
}

impl ReadError {
    pub fn upstream(call: &'static str, reason: impl Into<String>) -> Self {
        Self::UpstreamReadFailure {
            call,
            reason: reason.into(),
        }
    }

    pub fn malformed(call: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            call,
            reason: reason.into(),
        }
    }

    /// Name of the call that failed.
    #[must_use]
    pub fn call(&self) -> &'static str {
        match self {
            Self::UpstreamReadFailure { call, .. } | Self::MalformedResponse { call, .. } => call,
        }
    }

    /// Short label used for metrics and logs.
    #[must_use]
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::UpstreamReadFailure { .. } => "upstream",
            Self::MalformedResponse { .. } => "malformed",
        }
    }
}

pub type ReadResult<T> = Result<T, ReadError>;

/// Errors surfaced by the readers.
#[derive(Debug, Error)]
pub enum LensError {
    #[error("Market read failed for {instrument}: {source}")]
    Market {
        instrument: Address,
        #[source]
        source: ReadError,
    },

    #[error("Position read failed for {instrument} / {account}: {source}")]
    Position {
        instrument: Address,
        account: Address,
        #[source]
        source: ReadError,
    },

    #[error("Batch cancelled")]
    Cancelled,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl LensError {
    /// The underlying read failure, if this error came from a query.
    #[must_use]
    pub fn read_error(&self) -> Option<&ReadError> {
        match self {
            Self::Market { source, .. } | Self::Position { source, .. } => Some(source),
            Self::Cancelled | Self::InvalidConfig(_) => None,
        }
    }

    /// The instrument whose record failed.
    #[must_use]
    pub fn instrument(&self) -> Option<Address> {
        match self {
            Self::Market { instrument, .. } | Self::Position { instrument, .. } => {
                Some(*instrument)
            }
            Self::Cancelled | Self::InvalidConfig(_) => None,
        }
    }
}

pub type LensResult<T> = Result<T, LensError>;
