//! Ordered, bounded, fail-fast batching.

use std::future::Future;

use futures_util::stream::{self, StreamExt, TryStreamExt};
use lens_core::{Address, LensError, LensResult};
use lens_telemetry::Metrics;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Run `fetch` for every instrument and collect the results in input order.
///
/// At most `max_in_flight` fetches run at once. The first error stops the
/// batch: fetches still in flight are dropped and the error is returned.
/// Cancelling `cancel` stops the batch with `LensError::Cancelled`.
pub(crate) async fn fetch_ordered<T, F, Fut>(
    kind: &'static str,
    instruments: &[Address],
    max_in_flight: usize,
    cancel: &CancellationToken,
    fetch: F,
) -> LensResult<Vec<T>>
where
    F: FnMut(Address) -> Fut,
    Fut: Future<Output = LensResult<T>>,
{
    let run = stream::iter(instruments.iter().copied())
        .map(fetch)
        .buffered(max_in_flight.max(1))
        .try_collect::<Vec<T>>();

    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            Metrics::batch_cancelled(kind);
            warn!(kind, total = instruments.len(), "Batch cancelled");
            Err(LensError::Cancelled)
        }
        result = run => result,
    }
}
