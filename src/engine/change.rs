// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Change detection between the rendered job catalog and a new snapshot.
//!
//! Comparison is by key-set membership (symmetric difference), so reordering
//! of jobs in the feed never forces a rebuild.

use std::collections::HashSet;

use crate::feed::types::{JobCategory, MachineSnapshot};

/// Identity keys currently rendered, per category. `None` means the category
/// has never been loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogKeys {
    pub running: Option<HashSet<String>>,
    pub queued: Option<HashSet<String>>,
    pub reserved: Option<HashSet<String>>,
}

impl CatalogKeys {
    pub fn get(&self, category: JobCategory) -> Option<&HashSet<String>> {
        match category {
            JobCategory::Running => self.running.as_ref(),
            JobCategory::Queued => self.queued.as_ref(),
            JobCategory::Reserved => self.reserved.as_ref(),
        }
    }
}

/// Keys that entered and left a category, sorted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryChange {
    NeverLoaded,
    Unchanged,
    Changed(KeyDiff),
}

impl CategoryChange {
    pub fn needs_rebuild(&self) -> bool {
        !matches!(self, CategoryChange::Unchanged)
    }
}

/// Compare one category of the snapshot against the rendered keys
pub fn diff_category(keys: &CatalogKeys, snapshot: &MachineSnapshot, category: JobCategory) -> CategoryChange {
    let Some(rendered) = keys.get(category) else {
        return CategoryChange::NeverLoaded;
    };

    let current: HashSet<&str> = snapshot.job_keys(category).into_iter().collect();

    let mut added: Vec<String> = current
        .iter()
        .filter(|key| !rendered.contains(**key))
        .map(|key| key.to_string())
        .collect();
    let mut removed: Vec<String> = rendered
        .iter()
        .filter(|key| !current.contains(key.as_str()))
        .cloned()
        .collect();

    if added.is_empty() && removed.is_empty() {
        return CategoryChange::Unchanged;
    }

    added.sort();
    removed.sort();
    CategoryChange::Changed(KeyDiff { added, removed })
}

/// True if any category's key set differs from what is rendered
pub fn needs_rebuild(keys: &CatalogKeys, snapshot: &MachineSnapshot) -> bool {
    JobCategory::ALL
        .iter()
        .any(|category| diff_category(keys, snapshot, *category).needs_rebuild())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::fixtures::{feed_with_jobs, snapshot};

    fn keys(running: &[&str], queued: &[&str], reserved: &[&str]) -> CatalogKeys {
        let set = |keys: &[&str]| Some(keys.iter().map(|k| k.to_string()).collect());
        CatalogKeys {
            running: set(running),
            queued: set(queued),
            reserved: set(reserved),
        }
    }

    #[test]
    fn test_identical_keys_do_not_rebuild() {
        let rendered = keys(&["1", "2"], &["3"], &["r1"]);
        let snap = snapshot(&feed_with_jobs(&["1", "2"], &["3"], &["r1"]));
        assert!(!needs_rebuild(&rendered, &snap));
    }

    #[test]
    fn test_reordered_keys_do_not_rebuild() {
        let rendered = keys(&["1", "2", "3"], &[], &[]);
        let snap = snapshot(&feed_with_jobs(&["3", "1", "2"], &[], &[]));
        assert!(!needs_rebuild(&rendered, &snap));
    }

    #[test]
    fn test_single_add_or_remove_in_any_category_rebuilds() {
        let rendered = keys(&["1"], &["2"], &["r"]);

        let cases = [
            feed_with_jobs(&["1", "9"], &["2"], &["r"]),
            feed_with_jobs(&[], &["2"], &["r"]),
            feed_with_jobs(&["1"], &["2", "9"], &["r"]),
            feed_with_jobs(&["1"], &[], &["r"]),
            feed_with_jobs(&["1"], &["2"], &["r", "s"]),
            feed_with_jobs(&["1"], &["2"], &[]),
        ];
        for feed in cases {
            assert!(needs_rebuild(&rendered, &snapshot(&feed)), "expected rebuild for {feed}");
        }
    }

    #[test]
    fn test_replaced_key_with_same_count_rebuilds() {
        let rendered = keys(&["1", "2"], &[], &[]);
        let snap = snapshot(&feed_with_jobs(&["1", "3"], &[], &[]));

        assert_eq!(
            diff_category(&rendered, &snap, JobCategory::Running),
            CategoryChange::Changed(KeyDiff {
                added: vec!["3".to_string()],
                removed: vec!["2".to_string()],
            })
        );
        assert!(needs_rebuild(&rendered, &snap));
    }

    #[test]
    fn test_never_loaded_always_rebuilds() {
        let snap = snapshot(&feed_with_jobs(&[], &[], &[]));
        assert_eq!(
            diff_category(&CatalogKeys::default(), &snap, JobCategory::Queued),
            CategoryChange::NeverLoaded
        );
        assert!(needs_rebuild(&CatalogKeys::default(), &snap));

        // Loaded-but-empty matches an empty snapshot
        assert!(!needs_rebuild(&keys(&[], &[], &[]), &snap));
    }
}
