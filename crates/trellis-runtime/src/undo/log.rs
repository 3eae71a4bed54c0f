#![forbid(unsafe_code)]

//! The transaction log: nested sequences, previews, and undo/redo.
//!
//! # Structure
//!
//! ```text
//!            ┌──────────────┐
//! preview ─▶ │  sequence P  │   (optional, never stacked)
//!            └──────────────┘
//!            ┌──────────────┐
//!    top ─▶  │  sequence 2  │ ◀─ undo/redo operate here
//!            ├──────────────┤
//!            │  sequence 1  │
//!            ├──────────────┤
//!            │ base (bound) │   never popped
//!            └──────────────┘
//! ```
//!
//! The *active* sequence receives commits: the preview if one exists,
//! otherwise the top of the stack. Undo and redo always operate on the top of
//! the stack; a pending preview is canceled first. They are driven through
//! [`CommandStack::undo`](crate::command::CommandStack::undo) and
//! [`CommandStack::redo`](crate::command::CommandStack::redo) so the active
//! command can react before history moves.
//!
//! # Working set
//!
//! Transactions are opened with [`TransactionLog::open`] (or built from a
//! [`TransactionRegistry`]) and stay in the working set until committed or
//! discarded. More than one open transaction at a time is logged as a warning.
//!
//! # Invariants
//!
//! 1. The base sequence always exists; `commit_sequence`, `cancel_sequence`
//!    and `end_sequence` return `false` when it is the only one and no
//!    preview exists.
//! 2. `cancel_sequence` undoes every entry of the canceled sequence, so the
//!    sequence below is left exactly as it was before the sequence started.
//! 3. Every change of undo/redo availability on the top sequence is followed
//!    by an `UndoRedoStateChanged` notification.

use std::any::Any;
use std::fmt;

use tracing::{debug, warn};
use trellis_core::semantic_event::{
    EventKind, SemanticEvent, Timing, TransactionArgs, TransactionId,
};

use super::sequence::TransactionSequence;
use super::transaction::{CommitResult, GroupTransaction, Transaction, TransactionRecord};
use crate::config::HistoryConfig;
use crate::listener::ListenerSet;
use crate::registry::TransactionRegistry;

/// Nested undo/redo scopes over committed transactions.
pub struct TransactionLog {
    base: TransactionSequence,
    nested: Vec<TransactionSequence>,
    preview: Option<TransactionSequence>,
    working: Vec<TransactionRecord>,
    enabled: bool,
    next_id: u64,
    events: ListenerSet,
}

impl fmt::Debug for TransactionLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionLog")
            .field("sequences", &self.sequence_count())
            .field("preview", &self.preview.is_some())
            .field("open", &self.working.len())
            .field("undo_depth", &self.undo_depth())
            .field("redo_depth", &self.redo_depth())
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl Default for TransactionLog {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl TransactionLog {
    /// Create a log whose base sequence keeps `config.undo_limit` entries.
    #[must_use]
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            base: TransactionSequence::new(Some(config.undo_limit)),
            nested: Vec::new(),
            preview: None,
            working: Vec::new(),
            enabled: true,
            next_id: 1,
            events: ListenerSet::transaction(),
        }
    }

    /// Transaction lifecycle listeners.
    #[must_use]
    pub fn events(&self) -> &ListenerSet {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut ListenerSet {
        &mut self.events
    }

    // -----------------------------------------------------------------------
    // Working set
    // -----------------------------------------------------------------------

    /// Add `body` to the working set without committing it.
    pub fn open(&mut self, body: Box<dyn Transaction>) -> TransactionId {
        let id = TransactionId(self.next_id);
        self.next_id += 1;
        self.working.push(TransactionRecord::new(id, body));
        if self.working.len() > 1 {
            warn!(
                target: "trellis.transaction",
                open = self.working.len(),
                newest = %id,
                "more than one transaction is open; an earlier one was neither committed nor discarded"
            );
        }
        id
    }

    /// Build a transaction from `registry` and open it.
    ///
    /// Returns `None` if no factory is registered for `type_name`.
    pub fn create_transaction(
        &mut self,
        registry: &TransactionRegistry,
        type_name: &str,
        args: &dyn Any,
    ) -> Option<TransactionId> {
        let body = registry.create(type_name, args)?;
        Some(self.open(body))
    }

    /// Open transaction `id`, if it is still in the working set.
    #[must_use]
    pub fn open_transaction(&self, id: TransactionId) -> Option<&TransactionRecord> {
        self.working.iter().find(|r| r.id() == id)
    }

    #[must_use]
    pub fn open_count(&self) -> usize {
        self.working.len()
    }

    /// Drop an open transaction without committing it.
    pub fn discard(&mut self, id: TransactionId) -> bool {
        let Some(index) = self.working.iter().position(|r| r.id() == id) else {
            return false;
        };
        self.working.remove(index);
        debug!(target: "trellis.transaction", id = %id, "transaction discarded");
        true
    }

    /// Commit open transaction `id` into the active sequence.
    ///
    /// Returns `None` if `id` is not open; otherwise the commit result.
    pub fn commit(&mut self, id: TransactionId) -> Option<CommitResult> {
        let index = self.working.iter().position(|r| r.id() == id)?;
        let record = self.working.remove(index);
        Some(self.commit_record(record))
    }

    /// Open and immediately commit `body`.
    pub fn commit_new(&mut self, body: Box<dyn Transaction>) -> CommitResult {
        let id = TransactionId(self.next_id);
        self.next_id += 1;
        self.commit_record(TransactionRecord::new(id, body))
    }

    fn commit_record(&mut self, record: TransactionRecord) -> CommitResult {
        let id = record.id();
        let description = record.description().to_string();
        self.notify(
            EventKind::TransactionCommitted,
            Some((id, description.clone())),
            Timing::Before,
        );
        let result = self.active_mut().commit(record);
        debug!(
            target: "trellis.transaction",
            id = %id,
            description = %description,
            preview = self.preview.is_some(),
            "transaction committed"
        );
        self.notify(
            EventKind::TransactionCommitted,
            Some((id, description)),
            Timing::After,
        );
        if self.preview.is_none() {
            self.state_changed();
        }
        result
    }

    // -----------------------------------------------------------------------
    // Sequences
    // -----------------------------------------------------------------------

    /// Begin a nested scope.
    ///
    /// A preview scope replaces any existing preview and is not stacked; it
    /// is discarded by `cancel_sequence` or promoted onto the stack by
    /// `commit_sequence`. `bound` limits the new scope's undo depth.
    pub fn start_sequence(&mut self, preview: bool, bound: Option<usize>) {
        let sequence = TransactionSequence::new(bound);
        if preview {
            self.preview = Some(sequence);
            debug!(target: "trellis.transaction", "preview sequence started");
        } else {
            self.push_sequence(sequence);
        }
    }

    fn push_sequence(&mut self, sequence: TransactionSequence) {
        self.nested.push(sequence);
        self.preview = None;
        debug!(
            target: "trellis.transaction",
            depth = self.sequence_count(),
            "sequence started"
        );
        self.state_changed();
    }

    /// Close the active scope and commit its entries into the one below.
    ///
    /// With `merge`, the entries become a single [`GroupTransaction`] (one
    /// undo step); otherwise each entry is committed on its own. Returns
    /// `false` if only the base sequence exists.
    pub fn commit_sequence(&mut self, merge: bool) -> bool {
        if let Some(preview) = self.preview.take() {
            self.push_sequence(preview);
        }
        let Some(sequence) = self.pop_sequence() else {
            return false;
        };
        let records = sequence.into_transactions();
        debug!(
            target: "trellis.transaction",
            entries = records.len(),
            merge,
            "sequence committed"
        );
        if merge {
            match records.len() {
                0 => {}
                1 => {
                    for record in records {
                        self.commit_record(record);
                    }
                }
                _ => {
                    let id = TransactionId(self.next_id);
                    self.next_id += 1;
                    let group = GroupTransaction::new(records);
                    self.commit_record(TransactionRecord::new(id, Box::new(group)));
                }
            }
        } else {
            for record in records {
                self.commit_record(record);
            }
        }
        true
    }

    /// Undo every entry of the active scope and discard it.
    ///
    /// Returns `false` if only the base sequence exists and there is no
    /// preview.
    pub fn cancel_sequence(&mut self) -> bool {
        if self.nested.is_empty() && self.preview.is_none() {
            return false;
        }
        let active = self.active_mut();
        let mut undone = 0usize;
        while active.undo().is_some() {
            undone += 1;
        }
        debug!(target: "trellis.transaction", undone, "sequence canceled");
        self.terminate();
        true
    }

    /// Discard the active scope, keeping its effects but not its history.
    ///
    /// Returns `false` if only the base sequence exists and there is no
    /// preview.
    pub fn end_sequence(&mut self) -> bool {
        if self.nested.is_empty() && self.preview.is_none() {
            return false;
        }
        debug!(target: "trellis.transaction", "sequence ended");
        self.terminate();
        true
    }

    fn terminate(&mut self) {
        if self.preview.take().is_none() {
            self.pop_sequence();
        }
    }

    fn pop_sequence(&mut self) -> Option<TransactionSequence> {
        let sequence = self.nested.pop()?;
        self.state_changed();
        Some(sequence)
    }

    /// Number of stacked sequences, base included; the preview is not counted.
    #[must_use]
    pub fn sequence_count(&self) -> usize {
        1 + self.nested.len()
    }

    #[must_use]
    pub fn has_preview(&self) -> bool {
        self.preview.is_some()
    }

    fn top(&self) -> &TransactionSequence {
        self.nested.last().unwrap_or(&self.base)
    }

    fn top_mut(&mut self) -> &mut TransactionSequence {
        match self.nested.last_mut() {
            Some(sequence) => sequence,
            None => &mut self.base,
        }
    }

    fn active_mut(&mut self) -> &mut TransactionSequence {
        match (&mut self.preview, self.nested.last_mut()) {
            (Some(preview), _) => preview,
            (None, Some(top)) => top,
            (None, None) => &mut self.base,
        }
    }

    // -----------------------------------------------------------------------
    // Undo / redo
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn is_undo_redo_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable undo/redo. Notifies only on an actual change.
    pub fn set_undo_redo_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            self.enabled = enabled;
            self.state_changed();
        }
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.enabled && self.top().can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.enabled && self.top().can_redo()
    }

    /// Undo the newest entry of the top sequence, running `before` after the
    /// `TransactionUndoing` notification and before any state changes.
    ///
    /// Only the command stack calls this, passing the hook that cancels an
    /// undo-intolerant active command; public undo goes through
    /// [`CommandStack::undo`](crate::command::CommandStack::undo). An error
    /// from `before` aborts the undo.
    pub(crate) fn undo_with<E>(
        &mut self,
        before: impl FnOnce(&mut Self) -> Result<(), E>,
    ) -> Result<bool, E> {
        if !self.can_undo() {
            return Ok(false);
        }
        let target = self
            .top()
            .peek_undo()
            .map(|r| (r.id(), r.description().to_string()));
        self.notify(EventKind::TransactionUndoing, target, Timing::Before);
        before(self)?;
        self.prepare_undo_redo();

        let Some(undone) = self
            .top_mut()
            .undo()
            .map(|r| (r.id(), r.description().to_string()))
        else {
            return Ok(false);
        };
        debug!(target: "trellis.transaction", id = %undone.0, "transaction undone");
        self.notify(EventKind::TransactionUndone, Some(undone), Timing::After);
        self.state_changed();
        Ok(true)
    }

    /// Redo the newest undone entry of the top sequence, with a hook as in
    /// [`undo_with`](Self::undo_with).
    pub(crate) fn redo_with<E>(
        &mut self,
        before: impl FnOnce(&mut Self) -> Result<(), E>,
    ) -> Result<bool, E> {
        if !self.can_redo() {
            return Ok(false);
        }
        let target = self
            .top()
            .peek_redo()
            .map(|r| (r.id(), r.description().to_string()));
        self.notify(EventKind::TransactionRedoing, target, Timing::Before);
        before(self)?;
        self.prepare_undo_redo();

        let Some(redone) = self
            .top_mut()
            .redo()
            .map(|r| (r.id(), r.description().to_string()))
        else {
            return Ok(false);
        };
        debug!(target: "trellis.transaction", id = %redone.0, "transaction redone");
        self.notify(EventKind::TransactionRedone, Some(redone), Timing::After);
        self.state_changed();
        Ok(true)
    }

    /// Cancel a pending preview so undo/redo see the user-visible sequence.
    fn prepare_undo_redo(&mut self) {
        while self.preview.is_some() {
            self.cancel_sequence();
        }
    }

    /// Clear the top sequence's history.
    pub fn reset(&mut self) {
        self.top_mut().reset();
        debug!(target: "trellis.transaction", "history reset");
        self.state_changed();
    }

    /// Newest entry committed to the base sequence.
    #[must_use]
    pub fn latest_committed(&self) -> Option<&TransactionRecord> {
        self.base.peek_undo()
    }

    /// Undo depth of the top sequence.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.top().undo_depth()
    }

    /// Redo depth of the top sequence.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.top().redo_depth()
    }

    // -----------------------------------------------------------------------
    // Notifications
    // -----------------------------------------------------------------------

    fn state_changed(&mut self) {
        self.notify(EventKind::UndoRedoStateChanged, None, Timing::None);
    }

    fn notify(
        &mut self,
        kind: EventKind,
        target: Option<(TransactionId, String)>,
        timing: Timing,
    ) {
        let (id, description) = match target {
            Some((id, description)) => (Some(id), Some(description)),
            None => (None, None),
        };
        let args = TransactionArgs {
            id,
            description,
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
        };
        let mut event = SemanticEvent::transaction(kind, args, timing);
        self.events.broadcast(&mut event);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::convert::Infallible;
    use std::rc::Rc;

    use super::*;
    use crate::undo::transaction::tests::Journaled;

    type Journal = Rc<RefCell<Vec<String>>>;

    fn journal() -> Journal {
        Rc::new(RefCell::new(Vec::new()))
    }

    /// Undo and redo without a command stack in front of the log.
    trait Unhooked {
        fn undo(&mut self) -> bool;
        fn redo(&mut self) -> bool;
    }

    impl Unhooked for TransactionLog {
        fn undo(&mut self) -> bool {
            match self.undo_with(|_| Ok::<(), Infallible>(())) {
                Ok(done) => done,
                Err(never) => match never {},
            }
        }

        fn redo(&mut self) -> bool {
            match self.redo_with(|_| Ok::<(), Infallible>(())) {
                Ok(done) => done,
                Err(never) => match never {},
            }
        }
    }

    fn recorder(log: &mut TransactionLog) -> Rc<RefCell<Vec<(EventKind, Timing)>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let kinds = [
            EventKind::TransactionCommitted,
            EventKind::TransactionUndoing,
            EventKind::TransactionRedoing,
            EventKind::TransactionUndone,
            EventKind::TransactionRedone,
            EventKind::UndoRedoStateChanged,
        ];
        for kind in kinds {
            let seen = Rc::clone(&seen);
            log.events_mut()
                .listen(kind, move |e| seen.borrow_mut().push((e.kind, e.timing)))
                .unwrap();
        }
        seen
    }

    #[test]
    fn commit_undo_redo_cycle() {
        let j = journal();
        let mut log = TransactionLog::default();
        assert!(!log.undo());
        log.commit_new(Journaled::boxed("a", &j));
        log.commit_new(Journaled::boxed("b", &j));
        assert!(log.can_undo());
        assert!(log.undo());
        assert!(log.can_redo());
        assert!(log.redo());
        assert!(!log.redo());
        assert_eq!(
            *j.borrow(),
            vec!["commit a", "commit b", "undo b", "redo b"]
        );
    }

    #[test]
    fn base_bound_comes_from_config() {
        let j = journal();
        let mut log = TransactionLog::new(HistoryConfig { undo_limit: 3 });
        for label in ["a", "b", "c", "d", "e"] {
            log.commit_new(Journaled::boxed(label, &j));
        }
        assert_eq!(log.undo_depth(), 3);
        assert_eq!(log.latest_committed().map(TransactionRecord::description), Some("e"));
    }

    #[test]
    fn working_set_commit_and_discard() {
        let j = journal();
        let mut log = TransactionLog::default();
        let a = log.open(Journaled::boxed("a", &j));
        let b = log.open(Journaled::boxed("b", &j));
        assert_eq!(log.open_count(), 2);
        assert!(log.discard(b));
        assert!(!log.discard(b));
        assert!(log.commit(b).is_none());
        let result = log.commit(a).flatten();
        assert!(result.is_some());
        assert_eq!(log.open_count(), 0);
        assert_eq!(*j.borrow(), vec!["commit a"]);
    }

    #[test]
    fn create_transaction_uses_registry() {
        let j = journal();
        let mut registry = TransactionRegistry::new();
        let jj = Rc::clone(&j);
        registry
            .register("journaled", move |_| Journaled::boxed("made", &jj))
            .unwrap();
        let mut log = TransactionLog::default();
        assert!(log.create_transaction(&registry, "missing", &()).is_none());
        let id = log.create_transaction(&registry, "journaled", &()).unwrap();
        assert_eq!(log.open_transaction(id).map(TransactionRecord::description), Some("made"));
        log.commit(id);
        assert_eq!(*j.borrow(), vec!["commit made"]);
    }

    #[test]
    fn base_only_sequence_ops_return_false() {
        let mut log = TransactionLog::default();
        assert!(!log.commit_sequence(true));
        assert!(!log.cancel_sequence());
        assert!(!log.end_sequence());
        assert_eq!(log.sequence_count(), 1);
    }

    #[test]
    fn merged_sequence_is_one_undo_step() {
        let j = journal();
        let mut log = TransactionLog::default();
        log.commit_new(Journaled::boxed("before", &j));
        log.start_sequence(false, None);
        log.commit_new(Journaled::boxed("a", &j));
        log.commit_new(Journaled::boxed("b", &j));
        assert!(log.commit_sequence(true));
        assert_eq!(log.sequence_count(), 1);
        assert_eq!(log.undo_depth(), 2);

        let latest = log.latest_committed().unwrap();
        assert_eq!(latest.transaction_type(), "group");
        assert_eq!(latest.result_as::<&str>(), Some(&"b"));

        j.borrow_mut().clear();
        assert!(log.undo());
        assert_eq!(*j.borrow(), vec!["undo b", "undo a"]);
    }

    #[test]
    fn unmerged_sequence_replays_each_entry() {
        let j = journal();
        let mut log = TransactionLog::default();
        log.start_sequence(false, None);
        log.commit_new(Journaled::boxed("a", &j));
        log.commit_new(Journaled::boxed("b", &j));
        assert!(log.commit_sequence(false));
        assert_eq!(log.undo_depth(), 2);
        // Entries were committed once inside the sequence and not re-run.
        assert_eq!(*j.borrow(), vec!["commit a", "commit b"]);
    }

    #[test]
    fn single_entry_merge_keeps_the_entry() {
        let j = journal();
        let mut log = TransactionLog::default();
        log.start_sequence(false, None);
        log.commit_new(Journaled::boxed("only", &j));
        assert!(log.commit_sequence(true));
        let latest = log.latest_committed().unwrap();
        assert_eq!(latest.transaction_type(), "transaction");
        assert_eq!(latest.description(), "only");
    }

    #[test]
    fn cancel_sequence_restores_previous_state() {
        let j = journal();
        let mut log = TransactionLog::default();
        log.commit_new(Journaled::boxed("keep", &j));
        log.start_sequence(false, None);
        for label in ["a", "b", "c"] {
            log.commit_new(Journaled::boxed(label, &j));
        }
        assert!(log.cancel_sequence());
        assert_eq!(log.sequence_count(), 1);
        assert_eq!(log.undo_depth(), 1);
        assert_eq!(log.redo_depth(), 0);
        assert_eq!(
            j.borrow()[4..].to_vec(),
            vec!["undo c", "undo b", "undo a"]
        );
    }

    #[test]
    fn end_sequence_keeps_effects_drops_history() {
        let j = journal();
        let mut log = TransactionLog::default();
        log.start_sequence(false, None);
        log.commit_new(Journaled::boxed("a", &j));
        assert!(log.end_sequence());
        assert_eq!(log.undo_depth(), 0);
        assert_eq!(*j.borrow(), vec!["commit a"]);
    }

    #[test]
    fn preview_commits_are_promoted_on_commit_sequence() {
        let j = journal();
        let mut log = TransactionLog::default();
        log.start_sequence(true, None);
        assert!(log.has_preview());
        assert_eq!(log.sequence_count(), 1);
        log.commit_new(Journaled::boxed("p", &j));
        // Preview entries are invisible to undo until promoted.
        assert!(!log.can_undo());
        assert!(log.commit_sequence(true));
        assert!(!log.has_preview());
        assert_eq!(log.undo_depth(), 1);
    }

    #[test]
    fn undo_cancels_pending_preview_first() {
        let j = journal();
        let mut log = TransactionLog::default();
        log.commit_new(Journaled::boxed("real", &j));
        log.start_sequence(true, None);
        log.commit_new(Journaled::boxed("preview", &j));
        assert!(log.undo());
        assert!(!log.has_preview());
        assert_eq!(
            j.borrow()[2..].to_vec(),
            vec!["undo preview", "undo real"]
        );
    }

    #[test]
    fn disabled_log_refuses_undo_and_notifies_on_change_only() {
        let j = journal();
        let mut log = TransactionLog::default();
        log.commit_new(Journaled::boxed("a", &j));
        let seen = recorder(&mut log);
        log.set_undo_redo_enabled(false);
        log.set_undo_redo_enabled(false);
        assert!(!log.can_undo());
        assert!(!log.undo());
        log.set_undo_redo_enabled(true);
        assert_eq!(
            *seen.borrow(),
            vec![
                (EventKind::UndoRedoStateChanged, Timing::None),
                (EventKind::UndoRedoStateChanged, Timing::None),
            ]
        );
    }

    #[test]
    fn notification_order_for_commit_and_undo() {
        let j = journal();
        let mut log = TransactionLog::default();
        let seen = recorder(&mut log);
        log.commit_new(Journaled::boxed("a", &j));
        log.undo();
        assert_eq!(
            *seen.borrow(),
            vec![
                (EventKind::TransactionCommitted, Timing::Before),
                (EventKind::TransactionCommitted, Timing::After),
                (EventKind::UndoRedoStateChanged, Timing::None),
                (EventKind::TransactionUndoing, Timing::Before),
                (EventKind::TransactionUndone, Timing::After),
                (EventKind::UndoRedoStateChanged, Timing::None),
            ]
        );
    }

    #[test]
    fn state_change_reports_availability() {
        let j = journal();
        let mut log = TransactionLog::default();
        let last = Rc::new(RefCell::new(None));
        let l = Rc::clone(&last);
        log.events_mut()
            .listen(EventKind::UndoRedoStateChanged, move |e| {
                let args = e.transaction_args().unwrap();
                *l.borrow_mut() = Some((args.can_undo, args.can_redo));
            })
            .unwrap();
        log.commit_new(Journaled::boxed("a", &j));
        assert_eq!(*last.borrow(), Some((true, false)));
        log.undo();
        assert_eq!(*last.borrow(), Some((false, true)));
        log.reset();
        assert_eq!(*last.borrow(), Some((false, false)));
    }

    #[test]
    fn undo_hook_error_aborts() {
        let j = journal();
        let mut log = TransactionLog::default();
        log.commit_new(Journaled::boxed("a", &j));
        let result = log.undo_with(|_| Err("refused"));
        assert_eq!(result, Err("refused"));
        assert_eq!(log.undo_depth(), 1);
    }
}
