//! A simple, single-threaded [`StorageClient`] that can only read from the local filesystem.
//! Always available — no async runtime, no optional cloud dependency.

use std::path::PathBuf;

use bytes::Bytes;

use crate::error::{DeltaResult, Error};
use crate::storage::StorageClient;

/// Reads log artifacts directly off disk, under `_delta_log` at `table_root`.
pub struct SyncStorageClient {
    log_dir: PathBuf,
}

impl SyncStorageClient {
    /// `table_root` is a local filesystem path to the table's root directory (not its
    /// `_delta_log` subdirectory).
    pub fn new(table_root: impl Into<PathBuf>) -> Self {
        SyncStorageClient {
            log_dir: table_root.into().join(crate::path::LOG_DIR),
        }
    }
}

impl StorageClient for SyncStorageClient {
    fn fetch(&self, relative_path: &str) -> DeltaResult<Bytes> {
        let path = self.log_dir.join(relative_path);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Bytes::from(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NotFound(path.display().to_string()))
            }
            Err(e) => Err(Error::IOError(e)),
        }
    }
}
