//! Runtime that bridges the async cloud SDKs to the blocking store API.

use crate::error::StorageResult;
use tokio::runtime::Runtime;

/// Builds the small multi-threaded runtime an SDK client blocks on.
///
/// Each client owns one, so requests from plain threads never depend on an
/// ambient runtime.
pub(crate) fn blocking_runtime(thread_name: &str) -> StorageResult<Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name(thread_name)
        .enable_all()
        .build()?)
}
