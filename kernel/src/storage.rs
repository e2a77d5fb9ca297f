//! The storage backend contract consumed by the core: fetch the entire contents of one log
//! artifact, distinguishing "does not exist" from every other I/O failure.

use bytes::Bytes;

use crate::error::DeltaResult;

/// Fetches log artifacts (commit files, checkpoint parts, the `_last_checkpoint` pointer)
/// relative to a table's `_delta_log` root.
///
/// Implementations must return [`crate::error::Error::NotFound`] — not a generic `IOError` —
/// when `relative_path` doesn't exist, since the driver (§4.6) treats that case as a normal,
/// non-fatal outcome for two of its three fetches (the pointer and "the next commit").
///
/// Resource discipline: a call to `fetch` must not leave any handle open past its return,
/// success or failure.
pub trait StorageClient: Send + Sync {
    /// Fetch the full bytes of one artifact, given its path relative to `_delta_log/`.
    fn fetch(&self, relative_path: &str) -> DeltaResult<Bytes>;
}
