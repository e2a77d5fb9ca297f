//! The log-replay driver: locate the most recent checkpoint, ingest it, then apply every commit
//! strictly newer than it, in ascending order, until no next commit exists.

use bytes::Bytes;
use url::Url;

use crate::checkpoint::read_checkpoint;
use crate::commit::parse_commit;
use crate::error::{DeltaResult, Error};
use crate::path::{self, LastCheckpointPointer};
use crate::storage::StorageClient;
use crate::table_state::TableState;
use crate::Version;

/// A table root plus the storage client used to read its log. `Table::load` is the crate's one
/// public operation: `Load(uri) -> TableState | Error`.
pub struct Table {
    root: Url,
}

impl Table {
    /// Parse `uri` as the table's root location. A bare path with no `scheme://` is treated as
    /// `file`; any other scheme is validated lazily by the storage client used to load it,
    /// since the core itself only consumes a fetch interface, not a concrete backend.
    pub fn try_new(uri: &str) -> DeltaResult<Self> {
        let root = if uri.contains("://") {
            Url::parse(uri)?
        } else {
            Url::from_directory_path(uri)
                .map_err(|_| Error::generic(format!("not an absolute path: {uri}")))?
        };
        Ok(Table { root })
    }

    pub fn root(&self) -> &Url {
        &self.root
    }

    /// Build the storage client implied by this table's root URI, then replay the log and
    /// return the table's current materialized state.
    ///
    /// `Discover` fetches `_last_checkpoint`; its absence (or unreadability) means a full
    /// replay from version 0, not an error. `IngestCheckpoint` loads the checkpoint named
    /// there; any failure there is advisory — the checkpoint is discarded and replay restarts
    /// from 0. `ReplayFrom` then walks commits one at a time until the next one doesn't exist,
    /// which is the normal termination condition.
    ///
    /// A `file` root is served by the always-available [`crate::engine::sync::SyncStorageClient`]
    /// unless the `default-engine` feature is enabled, in which case every scheme (including
    /// `file`) goes through [`crate::engine::default::DefaultStorageClient`] uniformly. Callers
    /// who already have a [`StorageClient`] scoped to a table root can skip this entirely and
    /// call the free [`load`] function with it directly.
    pub fn load(&self) -> DeltaResult<TableState> {
        load_from_root(&self.root)
    }
}

/// Builds the storage client `root`'s scheme implies, then replays the log through it. Split out
/// behind feature-gated overloads rather than branching at runtime, matching how [`crate::engine`]
/// itself only compiles in the storage clients a build actually enables.
#[cfg(feature = "default-engine")]
fn load_from_root(root: &Url) -> DeltaResult<TableState> {
    let storage = crate::engine::default::DefaultStorageClient::try_from_table_root(root)?;
    load(&storage)
}

#[cfg(not(feature = "default-engine"))]
fn load_from_root(root: &Url) -> DeltaResult<TableState> {
    if root.scheme() != "file" {
        return Err(Error::UnknownBackend(root.scheme().to_string()));
    }
    let path = root
        .to_file_path()
        .map_err(|_| Error::generic(format!("not a local file path: {root}")))?;
    let storage = crate::engine::sync::SyncStorageClient::new(path);
    load(&storage)
}

/// Free-standing entry point mirroring [`Table::load`] — useful when callers already have a
/// [`StorageClient`] scoped to a table root and don't need the `Table`/`Url` bookkeeping.
pub fn load(storage: &dyn StorageClient) -> DeltaResult<TableState> {
    let mut state = TableState::new();
    let next_version = match discover_checkpoint(storage) {
        Some((checkpoint_version, checkpoint_size, part_names)) => {
            match ingest_checkpoint(storage, &part_names, checkpoint_size) {
                Ok(actions) => {
                    for action in actions {
                        state.apply(action);
                    }
                    state.version = checkpoint_version;
                    checkpoint_version + 1
                }
                Err(e) => {
                    tracing::warn!(
                        version = checkpoint_version,
                        error = %e,
                        "checkpoint ingestion failed; falling back to a full replay from version 0"
                    );
                    state = TableState::new();
                    0
                }
            }
        }
        None => 0,
    };

    replay_from(storage, &mut state, next_version)?;
    Ok(state)
}

/// `Discover`: fetch and parse `_last_checkpoint`. Returns `None` (not an error) when the
/// pointer is absent or unparseable — both cases fall back to a full replay.
fn discover_checkpoint(
    storage: &dyn StorageClient,
) -> Option<(Version, i64, Vec<String>)> {
    let bytes = storage
        .fetch(crate::path::LAST_CHECKPOINT_NAME)
        .ok()?;
    let pointer: LastCheckpointPointer = parse_last_checkpoint(&bytes).ok()?;
    let parts = path::checkpoint_part_names(pointer.version, pointer.parts);
    Some((pointer.version, pointer.size, parts))
}

fn parse_last_checkpoint(bytes: &Bytes) -> DeltaResult<LastCheckpointPointer> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| Error::generic(format!("_last_checkpoint is not UTF-8: {e}")))?;
    Ok(serde_json::from_str(text.trim())?)
}

/// `IngestCheckpoint`: fetch every part (in order) and stream its actions through the reducer.
///
/// `_last_checkpoint` having named this checkpoint makes its existence a promise: a part that
/// turns out to be missing is a corrupt checkpoint, not a normal "not found" outcome, so a
/// `NotFound` part-fetch failure is reclassified here rather than left to propagate as-is.
fn ingest_checkpoint(
    storage: &dyn StorageClient,
    part_names: &[String],
    checkpoint_size: i64,
) -> DeltaResult<Vec<crate::actions::Action>> {
    let parts: Vec<Bytes> = part_names
        .iter()
        .map(|name| {
            storage.fetch(name).map_err(|e| match e {
                Error::NotFound(path) => Error::CorruptCheckpoint(format!(
                    "checkpoint part advertised by _last_checkpoint is missing: {path}"
                )),
                other => other,
            })
        })
        .collect::<DeltaResult<_>>()?;
    read_checkpoint(&parts, checkpoint_size > 0)
}

/// `ReplayFrom(V)`: apply commit `V`, then `V+1`, ... until the next commit file doesn't exist.
fn replay_from(
    storage: &dyn StorageClient,
    state: &mut TableState,
    start_version: Version,
) -> DeltaResult<()> {
    let mut version = start_version;
    loop {
        let commit_name = path::commit_file_name(version);
        let bytes = match storage.fetch(&commit_name) {
            Ok(bytes) => bytes,
            Err(e) if e.is_not_found() => return Ok(()),
            Err(e) => return Err(e),
        };
        let actions = parse_commit(version, &bytes)?;
        tracing::debug!(version, num_actions = actions.len(), "applied commit");
        // The commit's own modification time isn't observable through the `StorageClient`
        // contract (it only exposes whole-file fetch); storage clients that can surface it do
        // so by layering a richer client over this same trait. Here it is left at 0, the
        // "unknown" sentinel.
        state.apply_commit(version, 0, actions);
        version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::sync::SyncStorageClient;

    /// A `StorageClient` that reports every named checkpoint part as missing, regardless of
    /// what `_last_checkpoint` advertised, to exercise the missing-part reclassification on
    /// its own rather than through a full `Table::load`.
    struct AlwaysNotFound;

    impl StorageClient for AlwaysNotFound {
        fn fetch(&self, relative_path: &str) -> DeltaResult<Bytes> {
            Err(Error::NotFound(relative_path.to_string()))
        }
    }

    #[test]
    fn missing_checkpoint_part_is_corrupt_checkpoint_not_not_found() {
        let err = ingest_checkpoint(
            &AlwaysNotFound,
            &[path::checkpoint_file_name(10)],
            13,
        )
        .unwrap_err();
        assert!(
            matches!(err, Error::CorruptCheckpoint(_)),
            "expected CorruptCheckpoint, got {err:?}"
        );
    }

    #[test]
    fn table_try_new_and_load_round_trip_a_file_root() {
        let dir = tempfile::tempdir().unwrap();
        test_utils::write_commit(
            dir.path(),
            0,
            &test_utils::simple_create_and_add_commit("table-7", "part-0001.parquet"),
        );

        let table = Table::try_new(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(table.root().scheme(), "file");

        let state = table.load().unwrap();
        assert_eq!(state.version, 0);
        assert!(state.files.contains_key("part-0001.parquet"));
    }

    #[test]
    fn unrecognized_scheme_fails_fast() {
        let table = Table::try_new("ftp://host/table").unwrap();
        let err = table.load().unwrap_err();
        assert!(matches!(err, Error::UnknownBackend(_)), "got {err:?}");
    }

    #[test]
    fn free_load_function_works_without_the_table_wrapper() {
        let dir = tempfile::tempdir().unwrap();
        test_utils::write_commit(
            dir.path(),
            0,
            &test_utils::simple_create_and_add_commit("table-8", "part-0001.parquet"),
        );
        let storage = SyncStorageClient::new(dir.path());
        let state = load(&storage).unwrap();
        assert_eq!(state.version, 0);
    }
}
