//! The action model: a tagged union of log record kinds, each with its own attribute contract,
//! plus the single-variant-per-record parse rule that the commit reader and checkpoint reader
//! both implement against.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{DeltaResult, Error};
use crate::Version;

/// The six recognized top-level action tags.
pub const ADD_NAME: &str = "add";
pub const REMOVE_NAME: &str = "remove";
pub const METADATA_NAME: &str = "metaData";
pub const PROTOCOL_NAME: &str = "protocol";
pub const TXN_NAME: &str = "txn";
pub const COMMIT_INFO_NAME: &str = "commitInfo";

const RECOGNIZED_NAMES: [&str; 6] = [
    ADD_NAME,
    REMOVE_NAME,
    METADATA_NAME,
    PROTOCOL_NAME,
    TXN_NAME,
    COMMIT_INFO_NAME,
];

/// A live data file added to the table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Add {
    pub path: String,
    #[serde(default)]
    pub partition_values: HashMap<String, Option<String>>,
    pub size: i64,
    pub modification_time: i64,
    pub data_change: bool,
    #[serde(default)]
    pub stats: Option<String>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

/// A data file logically removed from the table. Retained as a tombstone.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Remove {
    pub path: String,
    #[serde(default)]
    pub deletion_timestamp: Option<i64>,
    pub data_change: bool,
    pub extended_file_metadata: bool,
    #[serde(default)]
    pub partition_values: Option<HashMap<String, Option<String>>>,
    #[serde(default)]
    pub size: Option<i64>,
    #[serde(default)]
    pub tags: Option<HashMap<String, String>>,
}

/// The `format` attribute of a [`Metadata`] action: the data-file provider plus its options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Format {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub options: HashMap<String, String>,
}

fn default_provider() -> String {
    "parquet".to_string()
}

/// The table's current schema, partitioning, and configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub format: Format,
    pub schema_string: String,
    #[serde(default)]
    pub partition_columns: Vec<String>,
    #[serde(default)]
    pub configuration: HashMap<String, String>,
    #[serde(default)]
    pub created_time: Option<i64>,
}

impl Default for Format {
    fn default() -> Self {
        Format {
            provider: default_provider(),
            options: HashMap::new(),
        }
    }
}

/// The protocol version floors a reader/writer must satisfy to safely access the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Protocol {
    pub min_reader_version: i32,
    pub min_writer_version: i32,
}

/// An application-level idempotency marker: the latest `version` a given `appId` has written.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Txn {
    pub app_id: String,
    pub version: i64,
    #[serde(default)]
    pub last_updated: Option<i64>,
}

/// A free-form commit-provenance record, preserved verbatim.
pub type CommitInfo = serde_json::Map<String, serde_json::Value>;

/// The tagged union of log actions. Unrecognized top-level tags never materialize as a
/// variant here — they're filtered out before parsing (see [`parse_action_line`]).
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Add(Add),
    Remove(Remove),
    Metadata(Metadata),
    Protocol(Protocol),
    Txn(Txn),
    CommitInfo(CommitInfo),
}

/// Parse one JSON line of a commit file into at most one [`Action`].
///
/// Implements the single-variant-per-record rule directly off a generic [`serde_json::Value`]:
/// the set of recognized top-level keys present in the object is computed first. Zero recognized
/// keys (an unrecognized tag like `futureAction`, or any other shape) means the line is
/// forward-compatible noise and is silently skipped, with no error. More than one recognized
/// key means the line no longer satisfies "exactly one action variant per record" and is
/// rejected. Exactly one
/// recognized key is deserialized into its variant; a type mismatch there is
/// `UnknownActionShape`, not `MalformedCommit` — the line *is* shaped like a single action, its
/// attributes just don't match the contract.
pub fn parse_action_line(line: &str, version: Version) -> DeltaResult<Option<Action>> {
    let value: serde_json::Value = serde_json::from_str(line)
        .map_err(|e| Error::malformed_commit(version, format!("invalid JSON: {e}")))?;
    let Some(object) = value.as_object() else {
        return Err(Error::malformed_commit(
            version,
            "line is not a JSON object",
        ));
    };

    let recognized: Vec<&str> = RECOGNIZED_NAMES
        .iter()
        .copied()
        .filter(|name| object.contains_key(*name))
        .collect();

    match recognized.as_slice() {
        [] => Ok(None),
        [single] => parse_recognized_action(single, &object[*single]).map(Some),
        multiple => Err(Error::malformed_commit(
            version,
            format!("line names more than one action variant: {multiple:?}"),
        )),
    }
}

fn parse_recognized_action(name: &str, value: &serde_json::Value) -> DeltaResult<Action> {
    let shape_err = |e: serde_json::Error| Error::UnknownActionShape(format!("{name}: {e}"));
    match name {
        ADD_NAME => Ok(Action::Add(
            serde_json::from_value(value.clone()).map_err(shape_err)?,
        )),
        REMOVE_NAME => Ok(Action::Remove(
            serde_json::from_value(value.clone()).map_err(shape_err)?,
        )),
        METADATA_NAME => Ok(Action::Metadata(
            serde_json::from_value(value.clone()).map_err(shape_err)?,
        )),
        PROTOCOL_NAME => Ok(Action::Protocol(
            serde_json::from_value(value.clone()).map_err(shape_err)?,
        )),
        TXN_NAME => Ok(Action::Txn(
            serde_json::from_value(value.clone()).map_err(shape_err)?,
        )),
        COMMIT_INFO_NAME => {
            let object = value
                .as_object()
                .cloned()
                .ok_or_else(|| Error::UnknownActionShape("commitInfo: not an object".into()))?;
            Ok(Action::CommitInfo(object))
        }
        _ => unreachable!("name was taken from RECOGNIZED_NAMES"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognized_tag_is_ignored() {
        let parsed = parse_action_line(r#"{"futureAction":{"foo":"bar"}}"#, 0).unwrap();
        assert_eq!(parsed, None);
    }

    #[test]
    fn two_recognized_tags_is_malformed() {
        let line = r#"{"protocol":{"minReaderVersion":1,"minWriterVersion":1},"txn":{"appId":"a","version":1}}"#;
        let err = parse_action_line(line, 3).unwrap_err();
        assert!(matches!(err, Error::MalformedCommit { version: 3, .. }));
    }

    #[test]
    fn malformed_add_is_unknown_action_shape() {
        let line = r#"{"add":{"path":"p1"}}"#; // missing required fields
        let err = parse_action_line(line, 0).unwrap_err();
        assert!(matches!(err, Error::UnknownActionShape(_)));
    }

    #[test]
    fn add_parses_defaults_for_absent_optionals() {
        let line = r#"{"add":{"path":"p1","size":100,"modificationTime":1,"dataChange":true}}"#;
        let Some(Action::Add(add)) = parse_action_line(line, 0).unwrap() else {
            panic!("expected Add");
        };
        assert_eq!(add.partition_values, HashMap::new());
        assert_eq!(add.stats, None);
        assert_eq!(add.tags, HashMap::new());
    }

    #[test]
    fn commit_info_preserves_arbitrary_shape() {
        let line = r#"{"commitInfo":{"timestamp":1,"operation":"WRITE","nested":{"a":1}}}"#;
        let Some(Action::CommitInfo(info)) = parse_action_line(line, 0).unwrap() else {
            panic!("expected CommitInfo");
        };
        assert_eq!(info["operation"], "WRITE");
        assert_eq!(info["nested"]["a"], 1);
    }
}
