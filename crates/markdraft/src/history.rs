//! Version history for the active session.
//!
//! The history is an ordered list of full content snapshots with a single
//! cursor. Moving the cursor back never deletes anything; recording a new
//! snapshot while rewound discards everything after the cursor first (the
//! usual "edit after undo drops the redo branch" rule).
//!
//! The engine never touches the session itself. [`VersionHistory::undo`],
//! [`VersionHistory::redo`] and [`VersionHistory::jump_to_latest`] hand back
//! the content to show, and the caller applies it.

use crate::model::VersionEntry;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct VersionHistory {
    entries: Vec<VersionEntry>,
    current: usize,
}

impl VersionHistory {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            entries: vec![VersionEntry::new(seed.into(), None)],
            current: 0,
        }
    }

    /// Replace the whole sequence with a single entry holding `seed`.
    pub fn reset(&mut self, seed: impl Into<String>) {
        self.entries = vec![VersionEntry::new(seed.into(), None)];
        self.current = 0;
    }

    /// Record a snapshot. Returns whether an entry was appended.
    ///
    /// Content equal to the entry under the cursor is ignored outright, even
    /// when the cursor is rewound, so redundant writes never cut the redo
    /// branch.
    pub fn record(&mut self, content: impl Into<String>, annotation: Option<String>) -> bool {
        let content = content.into();
        if self.entries[self.current].content == content {
            return false;
        }

        let dropped = self.entries.len() - (self.current + 1);
        self.entries.truncate(self.current + 1);
        self.entries.push(VersionEntry::new(content, annotation));
        self.current = self.entries.len() - 1;

        debug!(
            version = self.current + 1,
            dropped, "recorded version snapshot"
        );
        true
    }

    pub fn undo(&mut self) -> Option<&str> {
        if !self.can_undo() {
            return None;
        }
        self.current -= 1;
        Some(&self.entries[self.current].content)
    }

    pub fn redo(&mut self) -> Option<&str> {
        if !self.can_redo() {
            return None;
        }
        self.current += 1;
        Some(&self.entries[self.current].content)
    }

    /// Move straight to the newest entry. `None` if already there.
    pub fn jump_to_latest(&mut self) -> Option<&str> {
        if self.is_latest() {
            return None;
        }
        self.current = self.entries.len() - 1;
        Some(&self.entries[self.current].content)
    }

    pub fn can_undo(&self) -> bool {
        self.current > 0
    }

    pub fn can_redo(&self) -> bool {
        self.current + 1 < self.entries.len()
    }

    pub fn is_latest(&self) -> bool {
        !self.can_redo()
    }

    pub fn current(&self) -> &VersionEntry {
        &self.entries[self.current]
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: the sequence holds at least one entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[VersionEntry] {
        &self.entries
    }

    /// One-based position, e.g. "Version 2/5".
    pub fn position_label(&self) -> String {
        format!("Version {}/{}", self.current + 1, self.entries.len())
    }
}

impl Default for VersionHistory {
    fn default() -> Self {
        Self::new(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(history: &VersionHistory) -> Vec<&str> {
        history
            .entries()
            .iter()
            .map(|entry| entry.content.as_str())
            .collect()
    }

    #[test]
    fn new_history_has_one_entry() {
        let history = VersionHistory::new("A");
        assert_eq!(history.len(), 1);
        assert_eq!(history.current_index(), 0);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn edit_after_undo_drops_redo_branch() {
        let mut history = VersionHistory::new("A");
        assert!(history.record("B", None));
        assert_eq!(contents(&history), ["A", "B"]);
        assert_eq!(history.current_index(), 1);

        assert_eq!(history.undo(), Some("A"));
        assert_eq!(history.current_index(), 0);

        assert!(history.record("C", None));
        assert_eq!(contents(&history), ["A", "C"]);
        assert_eq!(history.current_index(), 1);
    }

    #[test]
    fn identical_writes_do_not_grow() {
        let mut history = VersionHistory::new("A");
        history.record("B", None);
        assert!(!history.record("B", None));
        assert!(!history.record("B", Some("again".into())));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn redundant_write_while_rewound_keeps_branch() {
        let mut history = VersionHistory::new("A");
        history.record("B", None);
        history.record("C", None);
        history.undo();
        history.undo();

        assert!(!history.record("A", None));
        assert_eq!(contents(&history), ["A", "B", "C"]);
        assert_eq!(history.current_index(), 0);
    }

    #[test]
    fn undo_then_redo_restores_content() {
        let mut history = VersionHistory::new("one");
        for content in ["two", "three", "four"] {
            history.record(content, None);
        }

        for _ in 0..3 {
            let before = history.current().content.clone();
            history.undo();
            assert_eq!(history.redo(), Some(before.as_str()));
            history.undo();
        }
        assert_eq!(history.current().content, "one");
    }

    #[test]
    fn boundaries_are_noops() {
        let mut history = VersionHistory::new("A");
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), None);
        assert_eq!(history.jump_to_latest(), None);
        assert_eq!(history.current_index(), 0);

        history.record("B", None);
        assert_eq!(history.redo(), None);
        assert_eq!(history.current_index(), 1);
    }

    #[test]
    fn jump_to_latest_is_atomic() {
        let mut history = VersionHistory::new("A");
        history.record("B", None);
        history.record("C", None);
        history.record("D", None);
        history.undo();
        history.undo();
        history.undo();

        assert_eq!(history.jump_to_latest(), Some("D"));
        assert_eq!(history.current_index(), 3);
        assert!(history.is_latest());
        assert_eq!(history.len(), 4);
    }

    #[test]
    fn reset_replaces_sequence() {
        let mut history = VersionHistory::new("A");
        history.record("B", None);
        history.reset("Z");

        assert_eq!(contents(&history), ["Z"]);
        assert_eq!(history.current_index(), 0);
    }

    #[test]
    fn annotation_is_kept() {
        let mut history = VersionHistory::new("A");
        history.record("B", Some("make it formal".into()));
        assert_eq!(
            history.current().annotation.as_deref(),
            Some("make it formal")
        );
        assert_eq!(history.position_label(), "Version 2/2");
    }

    #[test]
    fn whitespace_only_change_is_a_new_version() {
        let mut history = VersionHistory::new("A");
        assert!(history.record("A ", None));
        assert_eq!(history.len(), 2);
    }
}
