//! A reader for tables stored in the Delta Lake transaction-log format.
//!
//! Given a table's root location and a [`StorageClient`], this crate reconstructs the table's
//! current logical state — the set of live data files, the current schema and partitioning,
//! the protocol version floors, and recent commit provenance — by discovering the most recent
//! checkpoint and replaying the log forward from it.
//!
//! ```no_run
//! use delta_log_kernel::engine::sync::SyncStorageClient;
//! use delta_log_kernel::table::load;
//!
//! let storage = SyncStorageClient::new("/path/to/table");
//! let state = load(&storage)?;
//! println!("version {} has {} live files", state.version, state.files.len());
//! # Ok::<(), delta_log_kernel::error::Error>(())
//! ```
//!
//! This crate covers the log-replay engine only: checkpoint discovery, checkpoint ingestion,
//! commit ingestion, and the action-to-state reduction. Evaluating a table's data
//! files — applying predicates, reading Parquet data, resolving partition values against a
//! query engine's native types — is out of scope; `TableState::files` hands back the raw `Add`
//! records verbatim for a caller's own scan layer to consume.

pub mod actions;
pub mod checkpoint;
pub mod commit;
pub mod engine;
pub mod error;
pub mod path;
pub mod storage;
pub mod table;
pub mod table_state;

pub use error::{DeltaResult, Error};
pub use table::{load, Table};
pub use table_state::TableState;

/// A table version number, or a protocol-relative/txn version counter. Always non-negative once
/// a commit has actually been applied; `TableState::version` uses `-1` as its pre-load sentinel.
pub type Version = i64;
