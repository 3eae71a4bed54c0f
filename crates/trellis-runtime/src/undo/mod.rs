#![forbid(unsafe_code)]

//! Undo/redo history.
//!
//! - [`transaction`]: the [`Transaction`] trait, committed records, groups
//! - [`sequence`]: one bounded undo/redo scope
//! - [`log`]: the [`TransactionLog`], a stack of scopes plus an optional
//!   preview

pub mod log;
pub mod sequence;
pub mod transaction;

pub use log::TransactionLog;
pub use sequence::TransactionSequence;
pub use transaction::{CommitResult, GroupTransaction, Transaction, TransactionRecord};
