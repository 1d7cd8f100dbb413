//! Native vs. wrapped market resolution.

use lens_core::{Address, MarketKind, NativeMarker, ReadResult};
use tracing::trace;

use crate::source::InstrumentSource;

/// Resolve the market kind of an instrument.
///
/// Reads the instrument symbol and compares it against `marker`. Only when it
/// does not match is `underlying()` queried, since native markets have no
/// underlying token to report.
pub async fn resolve_market_kind(
    instruments: &dyn InstrumentSource,
    instrument: Address,
    marker: &NativeMarker,
) -> ReadResult<MarketKind> {
    let symbol = instruments.symbol(instrument).await?;

    if marker.matches(&symbol) {
        trace!(%instrument, %symbol, "Native market");
        return Ok(MarketKind::Native);
    }

    let underlying = instruments.underlying(instrument).await?;
    trace!(%instrument, %symbol, %underlying, "Wrapped market");
    Ok(MarketKind::Wrapped { underlying })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockChain;
    use lens_core::{calls, ReadError};

    #[tokio::test]
    async fn test_native_symbol_skips_underlying() {
        let chain = MockChain::new();
        let instrument = Address::repeat_byte(0x01);
        chain.add_native_instrument(instrument, "fETH");

        let kind = resolve_market_kind(&chain, instrument, &NativeMarker::new("fETH"))
            .await
            .unwrap();

        assert_eq!(kind, MarketKind::Native);
        assert_eq!(chain.call_count(calls::UNDERLYING), 0);
    }

    #[tokio::test]
    async fn test_other_symbol_resolves_underlying() {
        let chain = MockChain::new();
        let instrument = Address::repeat_byte(0x02);
        let asset = Address::repeat_byte(0xa2);
        chain.add_wrapped_instrument(instrument, "fUSDC", asset, 6);

        let kind = resolve_market_kind(&chain, instrument, &NativeMarker::new("fETH"))
            .await
            .unwrap();

        assert_eq!(kind, MarketKind::Wrapped { underlying: asset });
    }

    #[tokio::test]
    async fn test_symbol_failure_propagates() {
        let chain = MockChain::new();
        let instrument = Address::repeat_byte(0x03);
        chain.add_native_instrument(instrument, "fETH");
        chain.fail(calls::SYMBOL, instrument, ReadError::upstream(calls::SYMBOL, "reverted"));

        let err = resolve_market_kind(&chain, instrument, &NativeMarker::new("fETH"))
            .await
            .unwrap_err();

        assert_eq!(err.call(), calls::SYMBOL);
    }
}
