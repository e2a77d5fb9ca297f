//! Naming conventions for the `_delta_log` directory.
//!
//! Every function here produces or parses one of the four bit-exact artifact names:
//! zero-padded commit files, the `_last_checkpoint` pointer, single-file checkpoints, and
//! multipart checkpoint parts. Name construction is case-sensitive and intentionally dumb —
//! no normalization, no path joining beyond what the storage client needs.

use serde::Deserialize;

use crate::Version;

/// The log directory name, relative to a table's root.
pub const LOG_DIR: &str = "_delta_log";

/// The fixed name of the last-checkpoint pointer file, relative to [`LOG_DIR`].
pub const LAST_CHECKPOINT_NAME: &str = "_last_checkpoint";

/// `_last_checkpoint`'s single-line JSON payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LastCheckpointPointer {
    pub version: Version,
    pub size: i64,
    pub parts: Option<u32>,
}

/// The relative path (within `_delta_log`) of the commit file for `version`.
pub fn commit_file_name(version: Version) -> String {
    format!("{version:020}.json")
}

/// The relative path (within `_delta_log`) of a single-file checkpoint for `version`.
pub fn checkpoint_file_name(version: Version) -> String {
    format!("{version:020}.checkpoint.parquet")
}

/// The relative path (within `_delta_log`) of part `part` (1-indexed) of `num_parts` for a
/// multipart checkpoint at `version`.
pub fn checkpoint_part_file_name(version: Version, part: u32, num_parts: u32) -> String {
    format!("{version:020}.checkpoint.{part:010}.{num_parts:010}.parquet")
}

/// The ordered relative paths making up the checkpoint at `version`: one path if `parts` is
/// `None` or `Some(1)`, otherwise `parts` paths ordered by part index.
pub fn checkpoint_part_names(version: Version, parts: Option<u32>) -> Vec<String> {
    match parts {
        None | Some(0) | Some(1) => vec![checkpoint_file_name(version)],
        Some(num_parts) => (1..=num_parts)
            .map(|part| checkpoint_part_file_name(version, part, num_parts))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_file_name_is_20_digit_padded() {
        assert_eq!(commit_file_name(0), "00000000000000000000.json");
        assert_eq!(commit_file_name(42), "00000000000000000042.json");
    }

    #[test]
    fn single_file_checkpoint_name() {
        assert_eq!(
            checkpoint_file_name(10),
            "00000000000000000010.checkpoint.parquet"
        );
    }

    #[test]
    fn multipart_checkpoint_names_are_ordered() {
        let names = checkpoint_part_names(10, Some(3));
        assert_eq!(
            names,
            vec![
                "00000000000000000010.checkpoint.0000000001.0000000003.parquet",
                "00000000000000000010.checkpoint.0000000002.0000000003.parquet",
                "00000000000000000010.checkpoint.0000000003.0000000003.parquet",
            ]
        );
    }

    #[test]
    fn absent_parts_count_means_single_file() {
        assert_eq!(
            checkpoint_part_names(5, None),
            vec![checkpoint_file_name(5)]
        );
    }

    #[test]
    fn last_checkpoint_pointer_parses_without_parts() {
        let parsed: LastCheckpointPointer =
            serde_json::from_str(r#"{"version":10,"size":13}"#).unwrap();
        assert_eq!(
            parsed,
            LastCheckpointPointer {
                version: 10,
                size: 13,
                parts: None
            }
        );
    }
}
