// Copyright (C) 2025 Draftsync Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Field-level change tracking against the last-saved baseline.
//!
//! The tracker owns three maps: the `baseline` (last server-confirmed values),
//! the visible `form_data` (baseline overlaid with local edits), and the
//! `pending` delta. Every edit is diffed structurally against the baseline, so
//! the pending set never contains a field whose current value equals its
//! last-saved value: "has unsaved changes" is a plain non-emptiness check and
//! autosave payloads stay minimal.

use draftsync_store::FieldMap;
use serde_json::Value;

/// Tracks which fields differ from the last server-confirmed state.
#[derive(Debug, Clone)]
pub struct ChangeTracker {
    /// Last server-confirmed values.
    baseline: FieldMap,
    /// Baseline overlaid with all local edits, tracked or not.
    form_data: FieldMap,
    /// Fields whose current value structurally differs from the baseline.
    pending: FieldMap,
}

impl ChangeTracker {
    /// Create a tracker whose baseline and visible data start at `initial`.
    pub fn new(initial: FieldMap) -> Self {
        Self {
            baseline: initial.clone(),
            form_data: initial,
            pending: FieldMap::new(),
        }
    }

    /// Record one field edit.
    ///
    /// The visible form data always takes the new value. The field joins the
    /// pending set only if the value differs from the baseline; reverting a
    /// field to its last-saved value removes it again.
    pub fn record_change(&mut self, field_id: &str, value: Value) {
        if self.baseline.get(field_id) == Some(&value) {
            self.pending.remove(field_id);
        } else {
            self.pending.insert(field_id.to_string(), value.clone());
        }
        self.form_data.insert(field_id.to_string(), value);
    }

    /// Apply the per-field logic to a whole batch in one pass.
    pub fn record_batch(&mut self, changes: FieldMap) {
        for (field_id, value) in changes {
            if self.baseline.get(&field_id) == Some(&value) {
                self.pending.remove(&field_id);
            } else {
                self.pending.insert(field_id.clone(), value.clone());
            }
            self.form_data.insert(field_id, value);
        }
    }

    /// The current pending delta.
    pub fn pending(&self) -> &FieldMap {
        &self.pending
    }

    /// Owned copy of the pending delta, for sending.
    pub fn pending_snapshot(&self) -> FieldMap {
        self.pending.clone()
    }

    /// True if any field differs from the baseline.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// The visible form data (baseline plus local edits).
    pub fn form_data(&self) -> &FieldMap {
        &self.form_data
    }

    /// Fold a successfully saved delta into the baseline.
    ///
    /// The sent entries become the new baseline values, then the pending set
    /// is re-diffed against it: entries now equal to the baseline drop out,
    /// while edits that arrived during the round-trip still differ and stay
    /// for the next cycle.
    pub fn absorb_saved(&mut self, sent: &FieldMap) {
        for (field_id, value) in sent {
            self.baseline.insert(field_id.clone(), value.clone());
        }
        let baseline = &self.baseline;
        self.pending
            .retain(|field_id, value| baseline.get(field_id) != Some(value));
    }

    /// Replace everything with authoritative server state.
    ///
    /// Used after a version conflict: local pending edits are void.
    pub fn reset_to(&mut self, data: FieldMap) {
        self.baseline = data.clone();
        self.form_data = data;
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tracker_with(fields: &[(&str, Value)]) -> ChangeTracker {
        let mut initial = FieldMap::new();
        for (k, v) in fields {
            initial.insert(k.to_string(), v.clone());
        }
        ChangeTracker::new(initial)
    }

    #[test]
    fn test_edit_enters_pending_and_form_data() {
        let mut tracker = tracker_with(&[("name", json!("Al"))]);
        tracker.record_change("name", json!("Alice"));

        assert_eq!(tracker.pending().get("name"), Some(&json!("Alice")));
        assert_eq!(tracker.form_data().get("name"), Some(&json!("Alice")));
        assert!(tracker.has_pending());
    }

    #[test]
    fn test_revert_removes_from_pending() {
        let mut tracker = tracker_with(&[("name", json!("Al"))]);
        tracker.record_change("name", json!("Alice"));
        tracker.record_change("name", json!("Al"));

        assert!(!tracker.has_pending());
        assert_eq!(tracker.form_data().get("name"), Some(&json!("Al")));
    }

    #[test]
    fn test_structural_equality_for_nested_values() {
        let mut tracker = tracker_with(&[("tags", json!(["a", "b"]))]);

        // A freshly built but structurally equal array is not a change.
        tracker.record_change("tags", json!(["a", "b"]));
        assert!(!tracker.has_pending());

        tracker.record_change("tags", json!(["a", "b", "c"]));
        assert!(tracker.has_pending());
    }

    #[test]
    fn test_new_field_is_a_change() {
        let mut tracker = tracker_with(&[]);
        tracker.record_change("email", json!("a@b.c"));
        assert_eq!(tracker.pending().get("email"), Some(&json!("a@b.c")));
    }

    #[test]
    fn test_last_value_wins_within_pending() {
        let mut tracker = tracker_with(&[("age", json!(20))]);
        tracker.record_change("age", json!(30));
        tracker.record_change("age", json!(25));

        assert_eq!(tracker.pending().len(), 1);
        assert_eq!(tracker.pending().get("age"), Some(&json!(25)));
    }

    #[test]
    fn test_batch_mixes_changes_and_reverts() {
        let mut tracker = tracker_with(&[("a", json!(1)), ("b", json!(2))]);
        tracker.record_change("a", json!(10));

        let mut batch = FieldMap::new();
        batch.insert("a".to_string(), json!(1)); // revert
        batch.insert("b".to_string(), json!(20)); // change
        batch.insert("c".to_string(), json!(3)); // new field
        tracker.record_batch(batch);

        assert!(!tracker.pending().contains_key("a"));
        assert_eq!(tracker.pending().get("b"), Some(&json!(20)));
        assert_eq!(tracker.pending().get("c"), Some(&json!(3)));
    }

    #[test]
    fn test_absorb_saved_clears_sent_entries() {
        let mut tracker = tracker_with(&[("name", json!("Al"))]);
        tracker.record_change("name", json!("Alice"));

        let sent = tracker.pending_snapshot();
        tracker.absorb_saved(&sent);

        assert!(!tracker.has_pending());
        // Reverting to the absorbed value is no longer a change.
        tracker.record_change("name", json!("Alice"));
        assert!(!tracker.has_pending());
    }

    #[test]
    fn test_absorb_saved_keeps_midflight_edits() {
        let mut tracker = tracker_with(&[("name", json!("Al"))]);
        tracker.record_change("name", json!("Alice"));
        let sent = tracker.pending_snapshot();

        // Edit lands while the save is in flight.
        tracker.record_change("name", json!("Alicia"));

        tracker.absorb_saved(&sent);
        assert_eq!(tracker.pending().get("name"), Some(&json!("Alicia")));
    }

    #[test]
    fn test_reset_to_discards_pending() {
        let mut tracker = tracker_with(&[("name", json!("Al"))]);
        tracker.record_change("name", json!("Alicia"));

        let mut server = FieldMap::new();
        server.insert("name".to_string(), json!("Alice Smith"));
        tracker.reset_to(server.clone());

        assert!(!tracker.has_pending());
        assert_eq!(tracker.form_data(), &server);
    }
}
