#![forbid(unsafe_code)]

//! Transactions: committed, undoable units of state change.
//!
//! Application code implements [`Transaction`] for each kind of edit. The log
//! wraps every body in a [`TransactionRecord`], which assigns the id, guards
//! against double commits, and caches the commit result.
//!
//! # Invariants
//!
//! 1. `on_commit` runs at most once per record; later `commit` calls return
//!    the cached result.
//! 2. A [`GroupTransaction`] undoes its children last-to-first and redoes
//!    them first-to-last.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use trellis_core::semantic_event::TransactionId;

/// Value produced by committing a transaction.
pub type CommitResult = Option<Rc<dyn Any>>;

/// One undoable change.
pub trait Transaction {
    /// Type string used for factory lookup and diagnostics.
    fn transaction_type(&self) -> &str {
        "transaction"
    }

    /// Human-readable description for UI display.
    fn description(&self) -> &str;

    /// Apply the change.
    fn on_commit(&mut self) -> CommitResult;

    /// Revert the change.
    fn on_undo(&mut self);

    /// Re-apply the change after an undo.
    fn on_redo(&mut self);
}

// ---------------------------------------------------------------------------
// TransactionRecord
// ---------------------------------------------------------------------------

/// A transaction body plus the bookkeeping the log needs.
pub struct TransactionRecord {
    id: TransactionId,
    committed: bool,
    result: CommitResult,
    body: Box<dyn Transaction>,
}

impl fmt::Debug for TransactionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionRecord")
            .field("id", &self.id)
            .field("type", &self.body.transaction_type())
            .field("description", &self.body.description())
            .field("committed", &self.committed)
            .field("has_result", &self.result.is_some())
            .finish()
    }
}

impl TransactionRecord {
    #[must_use]
    pub fn new(id: TransactionId, body: Box<dyn Transaction>) -> Self {
        Self {
            id,
            committed: false,
            result: None,
            body,
        }
    }

    #[must_use]
    pub const fn id(&self) -> TransactionId {
        self.id
    }

    #[must_use]
    pub const fn is_committed(&self) -> bool {
        self.committed
    }

    #[must_use]
    pub fn description(&self) -> &str {
        self.body.description()
    }

    #[must_use]
    pub fn transaction_type(&self) -> &str {
        self.body.transaction_type()
    }

    /// Commit the body once. Repeated calls return the first result.
    pub fn commit(&mut self) -> CommitResult {
        if !self.committed {
            self.committed = true;
            self.result = self.body.on_commit();
        }
        self.result.clone()
    }

    pub fn undo(&mut self) {
        self.body.on_undo();
    }

    pub fn redo(&mut self) {
        self.body.on_redo();
    }

    /// Result cached by the first commit.
    #[must_use]
    pub fn result(&self) -> CommitResult {
        self.result.clone()
    }

    /// The cached result, if it is a `T`.
    #[must_use]
    pub fn result_as<T: 'static>(&self) -> Option<&T> {
        self.result.as_deref()?.downcast_ref::<T>()
    }

    #[must_use]
    pub fn body(&self) -> &dyn Transaction {
        self.body.as_ref()
    }
}

// ---------------------------------------------------------------------------
// GroupTransaction
// ---------------------------------------------------------------------------

/// Several records undone and redone as one step.
pub struct GroupTransaction {
    description: String,
    children: Vec<TransactionRecord>,
}

impl fmt::Debug for GroupTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupTransaction")
            .field("description", &self.description)
            .field("children", &self.children.len())
            .finish()
    }
}

impl GroupTransaction {
    /// Group `children`, kept in commit order.
    #[must_use]
    pub fn new(children: Vec<TransactionRecord>) -> Self {
        let description = match children.as_slice() {
            [] => "empty group".to_string(),
            [only] => only.description().to_string(),
            [.., last] => format!("{} (+{} more)", last.description(), children.len() - 1),
        };
        Self {
            description,
            children,
        }
    }

    #[must_use]
    pub fn children(&self) -> &[TransactionRecord] {
        &self.children
    }
}

impl Transaction for GroupTransaction {
    fn transaction_type(&self) -> &str {
        "group"
    }

    fn description(&self) -> &str {
        &self.description
    }

    /// Commits every child; the group's result is the last child's.
    fn on_commit(&mut self) -> CommitResult {
        let mut result = None;
        for child in &mut self.children {
            result = child.commit();
        }
        result
    }

    fn on_undo(&mut self) {
        for child in self.children.iter_mut().rev() {
            child.undo();
        }
    }

    fn on_redo(&mut self) {
        for child in &mut self.children {
            child.redo();
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::RefCell;

    use super::*;

    /// Appends `label` to a shared journal on every callback.
    pub(crate) struct Journaled {
        pub label: &'static str,
        pub journal: Rc<RefCell<Vec<String>>>,
    }

    impl Journaled {
        pub(crate) fn boxed(
            label: &'static str,
            journal: &Rc<RefCell<Vec<String>>>,
        ) -> Box<dyn Transaction> {
            Box::new(Self {
                label,
                journal: Rc::clone(journal),
            })
        }
    }

    impl Transaction for Journaled {
        fn description(&self) -> &str {
            self.label
        }

        fn on_commit(&mut self) -> CommitResult {
            self.journal.borrow_mut().push(format!("commit {}", self.label));
            Some(Rc::new(self.label))
        }

        fn on_undo(&mut self) {
            self.journal.borrow_mut().push(format!("undo {}", self.label));
        }

        fn on_redo(&mut self) {
            self.journal.borrow_mut().push(format!("redo {}", self.label));
        }
    }

    #[test]
    fn commit_is_idempotent() {
        let journal = Rc::new(RefCell::new(Vec::new()));
        let mut record = TransactionRecord::new(TransactionId(1), Journaled::boxed("a", &journal));
        assert!(!record.is_committed());
        record.commit();
        record.commit();
        assert!(record.is_committed());
        assert_eq!(*journal.borrow(), vec!["commit a"]);
        assert_eq!(record.result_as::<&str>(), Some(&"a"));
        assert!(record.result_as::<u32>().is_none());
    }

    #[test]
    fn group_orders_children() {
        let journal = Rc::new(RefCell::new(Vec::new()));
        let children = vec![
            TransactionRecord::new(TransactionId(1), Journaled::boxed("a", &journal)),
            TransactionRecord::new(TransactionId(2), Journaled::boxed("b", &journal)),
            TransactionRecord::new(TransactionId(3), Journaled::boxed("c", &journal)),
        ];
        let mut group = TransactionRecord::new(
            TransactionId(4),
            Box::new(GroupTransaction::new(children)),
        );
        assert_eq!(group.transaction_type(), "group");
        assert_eq!(group.description(), "c (+2 more)");

        group.commit();
        assert_eq!(group.result_as::<&str>(), Some(&"c"));
        group.undo();
        group.redo();
        assert_eq!(
            *journal.borrow(),
            vec![
                "commit a", "commit b", "commit c", "undo c", "undo b", "undo a", "redo a",
                "redo b", "redo c",
            ]
        );
    }

    #[test]
    fn group_does_not_recommit_children() {
        let journal = Rc::new(RefCell::new(Vec::new()));
        let mut child = TransactionRecord::new(TransactionId(1), Journaled::boxed("a", &journal));
        child.commit();
        let mut group = TransactionRecord::new(
            TransactionId(2),
            Box::new(GroupTransaction::new(vec![child])),
        );
        group.commit();
        assert_eq!(*journal.borrow(), vec!["commit a"]);
        assert_eq!(group.description(), "a");
    }
}
