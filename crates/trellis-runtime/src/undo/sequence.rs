#![forbid(unsafe_code)]

//! Transaction sequences: one undo/redo scope.
//!
//! # Invariants
//!
//! 1. `undo_depth() <= bound` after every operation when a bound is set
//! 2. Committing clears the redo stack
//! 3. Eviction is FIFO: the oldest committed record goes first
//!
//! ```text
//! commit(t4), bound 3
//!   undo: [t1, t2, t3] -> [t2, t3, t4]   redo: []
//! undo()
//!   undo: [t2, t3]                       redo: [t4]
//! commit(t5)
//!   undo: [t2, t3, t5]                   redo: []
//! ```

use std::collections::VecDeque;
use std::fmt;

use super::transaction::{CommitResult, TransactionRecord};

/// Bounded undo deque plus redo stack.
#[derive(Default)]
pub struct TransactionSequence {
    undo: VecDeque<TransactionRecord>,
    redo: Vec<TransactionRecord>,
    bound: Option<usize>,
}

impl fmt::Debug for TransactionSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionSequence")
            .field("undo_depth", &self.undo.len())
            .field("redo_depth", &self.redo.len())
            .field("bound", &self.bound)
            .finish()
    }
}

impl TransactionSequence {
    /// Create a sequence keeping at most `bound` undo entries; `None` keeps
    /// everything.
    #[must_use]
    pub fn new(bound: Option<usize>) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            bound,
        }
    }

    #[must_use]
    pub const fn bound(&self) -> Option<usize> {
        self.bound
    }

    /// Commit `record` and push it as the newest undo entry.
    pub fn commit(&mut self, mut record: TransactionRecord) -> CommitResult {
        let result = record.commit();
        self.undo.push_back(record);
        self.trim();
        self.redo.clear();
        result
    }

    /// Undo the newest entry and move it to the redo stack.
    pub fn undo(&mut self) -> Option<&TransactionRecord> {
        let mut record = self.undo.pop_back()?;
        record.undo();
        self.redo.push(record);
        self.redo.last()
    }

    /// Redo the newest undone entry and move it back to the undo deque.
    pub fn redo(&mut self) -> Option<&TransactionRecord> {
        let mut record = self.redo.pop()?;
        record.redo();
        self.undo.push_back(record);
        self.trim();
        self.undo.back()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    /// Newest undo entry.
    #[must_use]
    pub fn peek_undo(&self) -> Option<&TransactionRecord> {
        self.undo.back()
    }

    /// Newest redo entry.
    #[must_use]
    pub fn peek_redo(&self) -> Option<&TransactionRecord> {
        self.redo.last()
    }

    /// Undo entries oldest first, consuming the sequence.
    #[must_use]
    pub fn into_transactions(self) -> Vec<TransactionRecord> {
        self.undo.into()
    }

    pub fn reset(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    fn trim(&mut self) {
        if let Some(bound) = self.bound {
            while self.undo.len() > bound {
                self.undo.pop_front();
            }
        }
    }
}
