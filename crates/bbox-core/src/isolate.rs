// ── Per-call fault isolation ──
//
// Wraps one domain's fetch+normalize so that an optional domain that
// fails degrades to an empty object instead of failing the cycle.

use std::future::Future;

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::CoreError;

/// Run `operation`, substituting `{}` for any fault of a non-critical
/// domain.
///
/// Faults always propagate when `critical` is set. Two kinds propagate
/// even for optional domains: merge conflicts, which signal a response
/// shape nobody should mask, and expired credentials, which belong to
/// the whole session rather than to one call.
pub async fn call_isolated<F>(
    domain: &str,
    critical: bool,
    operation: F,
) -> Result<Map<String, Value>, CoreError>
where
    F: Future<Output = Result<Map<String, Value>, CoreError>>,
{
    match operation.await {
        Ok(record) => Ok(record),
        Err(err) if critical || always_fatal(&err) => Err(err),
        Err(err) => {
            warn!(domain, error = %err, "optional domain unavailable, using empty fallback");
            Ok(Map::new())
        }
    }
}

fn always_fatal(err: &CoreError) -> bool {
    matches!(
        err,
        CoreError::MergeConflict { .. } | CoreError::AuthExpired { .. }
    )
}
