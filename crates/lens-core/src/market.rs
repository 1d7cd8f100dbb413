//! Market classification types.
//!
//! An instrument is either the chain's native-asset market or a market that
//! wraps an ERC-20 underlying. The distinction is made from the instrument's
//! symbol once per record and then threaded through as a `MarketKind`.

use alloy::primitives::{keccak256, Address, B256, U256};
use std::fmt;

/// Decimal precision of the chain's native asset.
pub const NATIVE_DECIMALS: u8 = 18;

/// Which branch an instrument resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarketKind {
    /// Instrument over the native asset; there is no underlying token.
    Native,
    /// Instrument wrapping an ERC-20 underlying.
    Wrapped { underlying: Address },
}

impl MarketKind {
    /// Underlying asset address; the zero address for native markets.
    #[must_use]
    pub fn underlying_address(&self) -> Address {
        match self {
            Self::Native => Address::ZERO,
            Self::Wrapped { underlying } => *underlying,
        }
    }

    /// Label used for metrics and logs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Wrapped { .. } => "wrapped",
        }
    }
}

impl fmt::Display for MarketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => write!(f, "native"),
            Self::Wrapped { underlying } => write!(f, "wrapped({underlying})"),
        }
    }
}

/// Symbol that identifies the native-asset market.
///
/// Matching compares the keccak-256 hash of the symbol bytes against the
/// marker's hash, so any string with identical content matches regardless of
/// where it came from. Case, whitespace and length all count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeMarker {
    text: String,
    hash: B256,
}

impl NativeMarker {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let hash = keccak256(text.as_bytes());
        Self { text, hash }
    }

    /// Check whether an instrument symbol names the native market.
    #[must_use]
    pub fn matches(&self, symbol: &str) -> bool {
        keccak256(symbol.as_bytes()) == self.hash
    }
}

impl fmt::Display for NativeMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Registry listing of an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Listing {
    pub is_listed: bool,
    /// Collateral factor mantissa (1e18). Reported verbatim even when the
    /// market is not listed.
    pub collateral_factor: U256,
}

impl Listing {
    #[must_use]
    pub fn new(is_listed: bool, collateral_factor: U256) -> Self {
        Self {
            is_listed,
            collateral_factor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_kind_has_zero_underlying() {
        assert_eq!(MarketKind::Native.underlying_address(), Address::ZERO);
        assert_eq!(MarketKind::Native.label(), "native");
    }

    #[test]
    fn test_wrapped_kind_keeps_underlying() {
        let underlying = Address::repeat_byte(0xab);
        let kind = MarketKind::Wrapped { underlying };
        assert_eq!(kind.underlying_address(), underlying);
        assert_eq!(kind.label(), "wrapped");
    }

    #[test]
    fn test_marker_matches_distinct_instances() {
        let marker = NativeMarker::new("fETH");
        let from_chain = String::from_utf8(b"fETH".to_vec()).unwrap();
        let built: String = ['f', 'E', 'T', 'H'].iter().collect();

        assert!(marker.matches(&from_chain));
        assert!(marker.matches(&built));
    }

    #[test]
    fn test_marker_is_byte_exact() {
        let marker = NativeMarker::new("fETH");
        assert!(!marker.matches("feth"));
        assert!(!marker.matches("fETH "));
        assert!(!marker.matches("fET"));
        assert!(!marker.matches("fETHx"));
        assert!(!marker.matches("cETH"));
        assert!(!marker.matches(""));
    }

    #[test]
    fn test_markers_with_different_spelling_are_independent() {
        let metadata = NativeMarker::new("fETH");
        let balance = NativeMarker::new("fEther");
        assert_ne!(metadata, balance);
        assert!(metadata.matches("fETH"));
        assert!(!balance.matches("fETH"));
    }
}
