//! `TableState` and the reducer: an idempotent, in-memory fold of an ordered action stream into
//! the table's materialized view.

use std::collections::HashMap;

use crate::actions::{Action, Add, CommitInfo, Metadata, Remove};
use crate::Version;

/// The materialized view of one version of a Delta table.
///
/// Produced empty by [`TableState::new`], mutated only by [`TableState::apply`] during replay,
/// and frozen once the driver (`Table::load`) returns it — the type publishes no further
/// mutation surface once a load completes.
#[derive(Debug, Clone, Default)]
pub struct TableState {
    /// Live data-file path -> the `Add` that introduced it.
    pub files: HashMap<String, Add>,
    /// Tombstoned data-file path -> the most recent `Remove` for it.
    ///
    /// Invariant: `files` and `tombstones` are always disjoint — every mutation below
    /// maintains this by construction, never by a post-hoc check.
    pub tombstones: HashMap<String, Remove>,
    /// The last `Metadata` action seen in replay order. `None` until the log has produced one;
    /// a conformant load from a real table always populates this before returning.
    pub current_metadata: Option<Metadata>,
    /// Running max of every `Protocol.minReaderVersion` seen (monotonic, never decreases).
    pub min_reader_version: i32,
    /// Running max of every `Protocol.minWriterVersion` seen (monotonic, never decreases).
    pub min_writer_version: i32,
    /// appId -> latest `Txn.version` (last writer in log order wins, no max).
    pub app_transaction_version: HashMap<String, i64>,
    /// `CommitInfo` records in replay order.
    pub commit_infos: Vec<CommitInfo>,
    /// Highest commit version whose actions have been fully applied; -1 before any.
    pub version: Version,
    /// Modification time of that commit's log file, or 0 if unknown.
    pub version_timestamp: i64,
}

impl TableState {
    /// A fresh, empty state: both maps constructed empty up front — no lazily-initialized map
    /// that could be written to before it exists.
    pub fn new() -> Self {
        TableState {
            version: -1,
            ..Default::default()
        }
    }

    /// Fold one action into the state. Actions within a commit must be applied in file order;
    /// commits must be applied in ascending version order — the reducer trusts its caller (the
    /// driver) for both, and never fails itself: the reducer is purely in-memory.
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Add(add) => {
                self.tombstones.remove(&add.path);
                self.files.insert(add.path.clone(), add);
            }
            Action::Remove(remove) => {
                self.files.remove(&remove.path);
                self.tombstones.insert(remove.path.clone(), remove);
            }
            Action::Metadata(metadata) => {
                self.current_metadata = Some(metadata);
            }
            Action::Protocol(protocol) => {
                self.min_reader_version = self.min_reader_version.max(protocol.min_reader_version);
                self.min_writer_version = self.min_writer_version.max(protocol.min_writer_version);
            }
            Action::Txn(txn) => {
                self.app_transaction_version.insert(txn.app_id, txn.version);
            }
            Action::CommitInfo(info) => {
                self.commit_infos.push(info);
            }
        }
    }

    /// Fold every action of one commit, then advance `version`/`version_timestamp`. Call this
    /// once per commit file, in ascending version order.
    pub fn apply_commit(
        &mut self,
        version: Version,
        timestamp: i64,
        actions: impl IntoIterator<Item = Action>,
    ) {
        for action in actions {
            self.apply(action);
        }
        self.version = version;
        self.version_timestamp = timestamp;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{Protocol, Txn};

    fn add(path: &str) -> Add {
        Add {
            path: path.to_string(),
            partition_values: HashMap::new(),
            size: 1,
            modification_time: 1,
            data_change: true,
            stats: None,
            tags: HashMap::new(),
        }
    }

    fn remove(path: &str) -> Remove {
        Remove {
            path: path.to_string(),
            deletion_timestamp: Some(1),
            data_change: true,
            extended_file_metadata: false,
            partition_values: None,
            size: None,
            tags: None,
        }
    }

    #[test]
    fn new_state_has_empty_maps_and_version_negative_one() {
        let state = TableState::new();
        assert!(state.files.is_empty());
        assert!(state.tombstones.is_empty());
        assert_eq!(state.version, -1);
    }

    #[test]
    fn add_then_remove_moves_path_between_maps() {
        let mut state = TableState::new();
        state.apply(Action::Add(add("p1")));
        assert!(state.files.contains_key("p1"));
        state.apply(Action::Remove(remove("p1")));
        assert!(!state.files.contains_key("p1"));
        assert!(state.tombstones.contains_key("p1"));
    }

    #[test]
    fn re_add_clears_tombstone_files_and_tombstones_stay_disjoint() {
        let mut state = TableState::new();
        state.apply(Action::Add(add("p1")));
        state.apply(Action::Remove(remove("p1")));
        state.apply(Action::Add(add("p1")));
        assert!(state.files.contains_key("p1"));
        assert!(!state.tombstones.contains_key("p1"));
        assert!(state.files.keys().collect::<std::collections::HashSet<_>>().is_disjoint(
            &state.tombstones.keys().collect()
        ));
    }

    #[test]
    fn protocol_versions_are_monotonic_max_not_overwrite() {
        let mut state = TableState::new();
        state.apply(Action::Protocol(Protocol {
            min_reader_version: 1,
            min_writer_version: 2,
        }));
        state.apply(Action::Protocol(Protocol {
            min_reader_version: 3,
            min_writer_version: 1,
        }));
        assert_eq!(state.min_reader_version, 3);
        assert_eq!(state.min_writer_version, 2);
    }

    #[test]
    fn txn_is_last_writer_wins_not_max() {
        let mut state = TableState::new();
        state.apply(Action::Txn(Txn {
            app_id: "app".into(),
            version: 5,
            last_updated: None,
        }));
        state.apply(Action::Txn(Txn {
            app_id: "app".into(),
            version: 2,
            last_updated: None,
        }));
        assert_eq!(state.app_transaction_version["app"], 2);
    }

    #[test]
    fn swapping_add_and_remove_of_same_path_changes_result() {
        let mut add_then_remove = TableState::new();
        add_then_remove.apply(Action::Add(add("p1")));
        add_then_remove.apply(Action::Remove(remove("p1")));

        let mut remove_then_add = TableState::new();
        remove_then_add.apply(Action::Remove(remove("p1")));
        remove_then_add.apply(Action::Add(add("p1")));

        assert!(add_then_remove.tombstones.contains_key("p1"));
        assert!(remove_then_add.files.contains_key("p1"));
    }

    #[test]
    fn swapping_two_adds_of_same_path_does_not_change_result() {
        let a1 = add("p1");
        let mut a2 = add("p1");
        a2.size = 1; // identical actions: order among same-kind actions is immaterial here

        let mut first = TableState::new();
        first.apply(Action::Add(a1.clone()));
        first.apply(Action::Add(a2.clone()));

        let mut second = TableState::new();
        second.apply(Action::Add(a2));
        second.apply(Action::Add(a1));

        assert_eq!(first.files["p1"], second.files["p1"]);
    }
}
