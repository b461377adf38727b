//! Per-call time budget for remote service calls

use bridge_traits::error::{BridgeError, Result as BridgeResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

/// Run `call`, turning an overrun of `budget` into [`BridgeError::Timeout`].
///
/// Callers on a soft path treat the timeout like any other failure; the
/// similarity query maps it to a hard timeout error.
pub(crate) async fn within<T, F>(budget: Duration, operation: &str, call: F) -> BridgeResult<T>
where
    F: Future<Output = BridgeResult<T>>,
{
    match timeout(budget, call).await {
        Ok(result) => result,
        Err(_) => Err(BridgeError::Timeout(format!(
            "{} exceeded {}ms",
            operation,
            budget.as_millis()
        ))),
    }
}
