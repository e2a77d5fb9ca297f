//! The [`Error`] type and the crate-wide [`DeltaResult`] alias.

use crate::Version;

/// A [`std::result::Result`] that defaults to [`Error`] as its error variant.
pub type DeltaResult<T, E = Error> = std::result::Result<T, E>;

/// Errors produced while discovering, reading, or reducing a table's transaction log.
///
/// This taxonomy mirrors the log-replay contract exactly: `NotFound` for the two
/// advisory-absence cases (`_last_checkpoint`, the next commit file), `CorruptCheckpoint`
/// for a checkpoint whose existence was advertised but which cannot be read, and
/// `MalformedCommit`/`UnknownActionShape` for structural violations of the commit format.
/// Everything else collapses into `IOError` or one of the generic wrapped variants.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The table root's URI scheme is not one of `file`, `s3`, `gs`, `adls2`.
    #[error("unrecognized storage backend scheme: {0}")]
    UnknownBackend(String),

    /// A requested log artifact does not exist. Absence of `_last_checkpoint` or of the next
    /// commit file is handled by the caller, not surfaced as a hard failure.
    #[error("log artifact not found: {0}")]
    NotFound(String),

    /// A checkpoint that `_last_checkpoint` claims exists is missing, truncated, or its schema
    /// lacks every recognized action group. Recovered from by falling back to a full replay.
    #[error("corrupt checkpoint: {0}")]
    CorruptCheckpoint(String),

    /// Commit file `version` violates the line/variant contract of `§4.3`: a line isn't a
    /// single-variant structured record, or it names more than one recognized action tag.
    #[error("malformed commit at version {version}: {reason}")]
    MalformedCommit { version: Version, reason: String },

    /// An action's tag was recognized but its attribute bag violates the variant's type
    /// contract (wrong JSON type, missing required field).
    #[error("action does not match its variant's shape: {0}")]
    UnknownActionShape(String),

    /// Any other I/O failure talking to the storage backend.
    #[error("I/O error: {0}")]
    IOError(#[from] std::io::Error),

    /// A generic JSON parse failure not already categorized above (e.g. while parsing
    /// `_last_checkpoint` itself).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A generic Parquet failure not already categorized as `CorruptCheckpoint`.
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// The table root could not be parsed as a URI.
    #[error("invalid table URI: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Catch-all for conditions that don't fit the taxonomy above but are still fatal.
    #[error("{0}")]
    Generic(String),
}

impl Error {
    pub fn generic(msg: impl Into<String>) -> Self {
        Self::Generic(msg.into())
    }

    pub fn malformed_commit(version: Version, reason: impl Into<String>) -> Self {
        Self::MalformedCommit {
            version,
            reason: reason.into(),
        }
    }

    /// True for the two cases where a missing artifact is a normal, non-fatal outcome:
    /// the `_last_checkpoint` pointer, and "there is no next commit".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
