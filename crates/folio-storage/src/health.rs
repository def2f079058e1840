//! Storage health check

use folio_core::{FolioError, FolioResult};
use opendal::Operator;

/// Verify the backend is reachable by listing the root
pub async fn check_health(op: &Operator) -> FolioResult<()> {
    op.list("/")
        .await
        .map(|_| ())
        .map_err(|e| FolioError::Storage(format!("health check failed: {e}")))
}
