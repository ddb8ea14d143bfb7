//! # View Reconciliation
//!
//! Incremental diffing of the canonical, filtered message sequence against
//! what the rendering target currently shows.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  PER-MESSAGE STATE MACHINE                              │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │        absent ──first render──► rendered                                │
//! │                                    │                                    │
//! │                 ┌──────────────────┼──────────────────┐                 │
//! │                 ▼                  ▼                  ▼                 │
//! │             unchanged           updated            removed              │
//! │          (same timestamp)   (newer revision,   (dropped out of the      │
//! │                              replace in place)  filtered set)           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Entries are keyed by the message's *dedup key*, so an edit (which
//! arrives as a new signature superseding the old one) replaces its
//! predecessor's element in place instead of tearing it down.
//!
//! The reconciler owns no viewport mechanics: it captures "was at end"
//! before mutating and signals "scroll to end" after, and the concrete
//! [`RenderTarget`] decides what those mean.

use std::collections::{HashMap, HashSet};

use crate::message::RawMessage;

/// Minimal rendering-target interface the reconciler drives.
///
/// Implementable by any concrete UI layer: a DOM bridge, a TUI buffer, or
/// the recording mock used in tests.
pub trait RenderTarget {
    /// Insert a new element for `key` at `position` in document order.
    fn insert(&mut self, key: &str, markup: &str, position: usize);
    /// Replace the element previously rendered for `key`.
    fn replace(&mut self, key: &str, markup: &str);
    /// Detach the element previously rendered for `key`.
    fn remove(&mut self, key: &str);
    /// Whether the viewport sat at the logical end before reconciliation.
    fn was_at_end(&self) -> bool;
    /// Scroll the viewport to the logical end.
    fn scroll_to_end(&mut self);
}

/// Operation counts for one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Fresh elements inserted
    pub inserted: usize,
    /// Elements re-rendered in place for a newer revision
    pub replaced: usize,
    /// Elements detached
    pub removed: usize,
    /// Messages left untouched
    pub unchanged: usize,
}

impl ReconcileStats {
    /// Total mutations performed against the target.
    pub fn operations(&self) -> usize {
        self.inserted + self.replaced + self.removed
    }
}

#[derive(Debug, Clone)]
struct RenderedEntry {
    last_rendered_timestamp: i64,
}

/// The reconciler's memory of what is currently shown.
///
/// Persists across refresh cycles, the only pipeline state that does.
#[derive(Debug, Default)]
pub struct Reconciler {
    state: HashMap<String, RenderedEntry>,
}

impl Reconciler {
    /// An empty reconciler with nothing rendered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live rendered entries.
    pub fn rendered_count(&self) -> usize {
        self.state.len()
    }

    /// Drops all rendered state without touching any target. Used when the
    /// view itself is torn down.
    pub fn reset(&mut self) {
        self.state.clear();
    }

    /// Brings `target` in sync with `messages` (the filtered canonical
    /// sequence, ascending by timestamp), rendering through `render` only
    /// for messages that are new or newly revised.
    pub fn reconcile<T>(
        &mut self,
        messages: &[&RawMessage],
        mut render: impl FnMut(&RawMessage) -> String,
        target: &mut T,
    ) -> ReconcileStats
    where
        T: RenderTarget + ?Sized,
    {
        let was_at_end = target.was_at_end();
        let mut stats = ReconcileStats::default();

        // 1. Remove entries that dropped out of the filtered set.
        let current: HashSet<&str> = messages.iter().map(|m| m.dedup_key()).collect();
        let stale: Vec<String> = self
            .state
            .keys()
            .filter(|key| !current.contains(key.as_str()))
            .cloned()
            .collect();
        for key in stale {
            target.remove(&key);
            self.state.remove(&key);
            stats.removed += 1;
        }

        // 2. Insert fresh messages, replace newly revised ones.
        for (position, msg) in messages.iter().enumerate() {
            let key = msg.dedup_key();
            match self.state.get_mut(key) {
                None => {
                    target.insert(key, &render(msg), position);
                    self.state.insert(
                        key.to_string(),
                        RenderedEntry { last_rendered_timestamp: msg.timestamp },
                    );
                    stats.inserted += 1;
                }
                Some(entry) if entry.last_rendered_timestamp < msg.timestamp => {
                    target.replace(key, &render(msg));
                    entry.last_rendered_timestamp = msg.timestamp;
                    stats.replaced += 1;
                }
                Some(_) => stats.unchanged += 1,
            }
        }

        // 3. Follow the end of the view only if the consumer was already
        //    there before we mutated anything.
        if was_at_end && stats.operations() > 0 {
            target.scroll_to_end();
        }

        stats
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every operation; keeps an ordered element list like a real
    /// document would.
    #[derive(Default)]
    struct MockTarget {
        elements: Vec<(String, String)>,
        ops: Vec<String>,
        at_end: bool,
        scrolled: usize,
    }

    impl RenderTarget for MockTarget {
        fn insert(&mut self, key: &str, markup: &str, position: usize) {
            let position = position.min(self.elements.len());
            self.elements.insert(position, (key.to_string(), markup.to_string()));
            self.ops.push(format!("insert:{key}@{position}"));
        }

        fn replace(&mut self, key: &str, markup: &str) {
            if let Some(slot) = self.elements.iter_mut().find(|(k, _)| k == key) {
                slot.1 = markup.to_string();
            }
            self.ops.push(format!("replace:{key}"));
        }

        fn remove(&mut self, key: &str) {
            self.elements.retain(|(k, _)| k != key);
            self.ops.push(format!("remove:{key}"));
        }

        fn was_at_end(&self) -> bool {
            self.at_end
        }

        fn scroll_to_end(&mut self) {
            self.scrolled += 1;
        }
    }

    fn msg(sig: &str, chat_ref: Option<&str>, sender: &str, ts: i64) -> RawMessage {
        RawMessage {
            signature: sig.to_string(),
            chat_reference: chat_ref.map(str::to_string),
            sender: sender.to_string(),
            recipient: None,
            timestamp: ts,
            data: String::new(),
            is_encrypted: false,
            group_id: 0,
        }
    }

    fn render(m: &RawMessage) -> String {
        format!("markup:{}@{}", m.signature, m.timestamp)
    }

    #[test]
    fn test_fresh_render_inserts_in_order() {
        let a = msg("a", None, "X", 100);
        let b = msg("b", None, "Y", 200);
        let mut reconciler = Reconciler::new();
        let mut target = MockTarget::default();

        let stats = reconciler.reconcile(&[&a, &b], render, &mut target);
        assert_eq!(stats.inserted, 2);
        assert_eq!(stats.operations(), 2);
        let keys: Vec<&str> = target.elements.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_second_identical_run_is_idempotent() {
        let a = msg("a", None, "X", 100);
        let b = msg("b", None, "Y", 200);
        let mut reconciler = Reconciler::new();
        let mut target = MockTarget::default();

        reconciler.reconcile(&[&a, &b], render, &mut target);
        let ops_before = target.ops.len();

        let stats = reconciler.reconcile(&[&a, &b], render, &mut target);
        assert_eq!(stats.operations(), 0);
        assert_eq!(stats.unchanged, 2);
        assert_eq!(target.ops.len(), ops_before);
    }

    #[test]
    fn test_removal_detaches_exactly_the_dropped_entry() {
        let a = msg("a", None, "X", 100);
        let b = msg("b", None, "Y", 200);
        let c = msg("c", None, "Z", 300);
        let mut reconciler = Reconciler::new();
        let mut target = MockTarget::default();

        reconciler.reconcile(&[&a, &b, &c], render, &mut target);
        let stats = reconciler.reconcile(&[&a, &c], render, &mut target);

        assert_eq!(stats.removed, 1);
        assert_eq!(stats.unchanged, 2);
        assert_eq!(reconciler.rendered_count(), 2);
        let keys: Vec<&str> = target.elements.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "c"]);
    }

    #[test]
    fn test_edit_replaces_in_place() {
        let original = msg("a", None, "X", 100);
        let unrelated = msg("b", None, "Y", 150);
        let mut reconciler = Reconciler::new();
        let mut target = MockTarget::default();
        reconciler.reconcile(&[&original, &unrelated], render, &mut target);

        // The edit arrives as a new signature under the same dedup key.
        let edit = msg("a2", Some("a"), "X", 200);
        let stats = reconciler.reconcile(&[&unrelated, &edit], render, &mut target);

        assert_eq!(stats.replaced, 1);
        assert_eq!(stats.inserted, 0);
        assert_eq!(stats.removed, 0);
        // Replaced in place: the element keeps its slot under key "a".
        let keys: Vec<&str> = target.elements.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(target.elements[0].1, "markup:a2@200");
    }

    #[test]
    fn test_scrolls_only_when_was_at_end_and_changed() {
        let a = msg("a", None, "X", 100);
        let mut reconciler = Reconciler::new();

        // Not at end: no scroll even though content changed.
        let mut detached = MockTarget::default();
        reconciler.reconcile(&[&a], render, &mut detached);
        assert_eq!(detached.scrolled, 0);

        // At end with a change: scroll once.
        let mut reconciler = Reconciler::new();
        let mut pinned = MockTarget { at_end: true, ..Default::default() };
        reconciler.reconcile(&[&a], render, &mut pinned);
        assert_eq!(pinned.scrolled, 1);

        // At end with nothing to do: no scroll.
        reconciler.reconcile(&[&a], render, &mut pinned);
        assert_eq!(pinned.scrolled, 1);
    }

    #[test]
    fn test_render_invoked_only_for_new_or_revised() {
        let a = msg("a", None, "X", 100);
        let b = msg("b", None, "Y", 200);
        let mut reconciler = Reconciler::new();
        let mut target = MockTarget::default();

        let mut renders = 0;
        let counting = |m: &RawMessage| {
            renders += 1;
            render(m)
        };
        reconciler.reconcile(&[&a, &b], counting, &mut target);
        assert_eq!(renders, 2);

        let mut renders_second = 0;
        let counting = |m: &RawMessage| {
            renders_second += 1;
            render(m)
        };
        reconciler.reconcile(&[&a, &b], counting, &mut target);
        assert_eq!(renders_second, 0);
    }

    #[test]
    fn test_reset_clears_state() {
        let a = msg("a", None, "X", 100);
        let mut reconciler = Reconciler::new();
        let mut target = MockTarget::default();
        reconciler.reconcile(&[&a], render, &mut target);
        assert_eq!(reconciler.rendered_count(), 1);

        reconciler.reset();
        assert_eq!(reconciler.rendered_count(), 0);
    }
}
