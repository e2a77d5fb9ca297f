//! The commit reader: a lazy, order-preserving sequence of actions parsed out of one version's
//! newline-delimited JSON.

use crate::actions::{parse_action_line, Action};
use crate::error::DeltaResult;
use crate::Version;

/// A borrowing iterator over the actions of one commit file's bytes.
///
/// Lines are split on `\n`; a trailing newline is optional; empty lines are skipped entirely
/// (they carry no action and are not an error). Order is preserved — callers must not reorder
/// what this yields before handing it to the reducer.
pub struct CommitActions<'a> {
    version: Version,
    lines: std::str::Lines<'a>,
}

impl<'a> CommitActions<'a> {
    pub fn new(version: Version, text: &'a str) -> Self {
        CommitActions {
            version,
            lines: text.lines(),
        }
    }
}

impl Iterator for CommitActions<'_> {
    type Item = DeltaResult<Action>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            if line.trim().is_empty() {
                continue;
            }
            match parse_action_line(line, self.version) {
                Ok(Some(action)) => return Some(Ok(action)),
                Ok(None) => continue, // unrecognized tag: forward-compatible noise, skip
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Parse the full bytes of commit `version` into an in-order vector of actions.
///
/// Most callers want the lazy [`CommitActions`] iterator directly; this eager variant exists
/// for call sites (tests, the checkpoint/commit round-trip law) that need a `Vec` to compare
/// or replay more than once.
pub fn parse_commit(version: Version, bytes: &[u8]) -> DeltaResult<Vec<Action>> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| crate::error::Error::malformed_commit(version, format!("not UTF-8: {e}")))?;
    CommitActions::new(version, text).collect()
}
