#![forbid(unsafe_code)]

//! Interactive commands.
//!
//! A [`Command`] is a unit of user-initiated, possibly long-lived work: a
//! drag-to-move, a rubber-band selection, a modal tool. The
//! [`CommandStack`] keeps exactly one command active and parks the others on
//! a LIFO suspend stack.
//!
//! # State Machine
//!
//! ```text
//!            execute                  end / cancel
//!   Idle ────────────▶ Active ───────────────────────▶ Terminated
//!                      │    ▲
//!      another command │    │ the command above it
//!      is executed     ▼    │ ends or is canceled
//!                    Suspended
//! ```
//!
//! Commands never hold a reference to the stack. Callbacks receive a
//! [`CommandCx`] through which they reach the transaction log and *request*
//! stack changes; the stack applies requests once the callback returns.

mod stack;

use std::fmt;

use trellis_core::semantic_event::{CommandId, EventKind, SemanticEvent};

use crate::undo::TransactionLog;

pub use stack::CommandStack;

/// Lifecycle state of a command instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandState {
    /// Not known to the stack.
    Idle,
    Active,
    Suspended,
    Terminated,
}

/// Why a command left the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Termination {
    /// Finished normally, or replaced by a command it could not yield to.
    Ended,
    /// Abandoned; the command should roll back its work.
    Canceled,
}

/// A unit of interactive work.
///
/// Only [`command_type`](Self::command_type) and
/// [`on_execute`](Self::on_execute) are required. The defaults describe a
/// one-shot command: it can be suspended, it ends as soon as `on_execute`
/// returns, and it tolerates undo while active.
pub trait Command {
    /// Type string used for scoped hotkeys and factory lookup.
    fn command_type(&self) -> &str;

    /// Called once when the command becomes active.
    fn on_execute(&mut self, cx: &mut CommandCx<'_>);

    fn on_suspend(&mut self, _cx: &mut CommandCx<'_>) {}

    fn on_resume(&mut self, _cx: &mut CommandCx<'_>) {}

    /// Called once when the command leaves the stack.
    fn on_terminate(&mut self, _reason: Termination, _cx: &mut CommandCx<'_>) {}

    /// Whether executing another command may park this one.
    fn can_suspend(&self) -> bool {
        true
    }

    /// Whether the stack ends the command right after `on_execute`.
    fn ends_immediately_on_execute(&self) -> bool {
        true
    }

    /// Whether the command survives an undo/redo while active. If not, the
    /// stack cancels it first.
    fn can_undo_on_execute(&self) -> bool {
        true
    }

    /// Event kinds delivered to [`handle_event`](Self::handle_event) while
    /// the command is active.
    fn supports(&self, _kind: EventKind) -> bool {
        false
    }

    /// Handle a routed event. Mark it handled to stop further routing.
    fn handle_event(&mut self, _event: &mut SemanticEvent, _cx: &mut CommandCx<'_>) {}
}

/// Stack change requested from inside a command callback.
pub(crate) enum StackRequest {
    End(CommandId),
    Cancel(CommandId),
    Execute(Box<dyn Command>),
    Undo,
    Redo,
}

impl fmt::Debug for StackRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::End(id) => f.debug_tuple("End").field(id).finish(),
            Self::Cancel(id) => f.debug_tuple("Cancel").field(id).finish(),
            Self::Execute(cmd) => f.debug_tuple("Execute").field(&cmd.command_type()).finish(),
            Self::Undo => f.write_str("Undo"),
            Self::Redo => f.write_str("Redo"),
        }
    }
}

/// Context handed to every [`Command`] callback.
pub struct CommandCx<'a> {
    id: CommandId,
    transactions: &'a mut TransactionLog,
    requests: &'a mut Vec<StackRequest>,
}

impl fmt::Debug for CommandCx<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandCx")
            .field("id", &self.id)
            .field("pending_requests", &self.requests.len())
            .finish()
    }
}

impl<'a> CommandCx<'a> {
    pub(crate) fn new(
        id: CommandId,
        transactions: &'a mut TransactionLog,
        requests: &'a mut Vec<StackRequest>,
    ) -> Self {
        Self {
            id,
            transactions,
            requests,
        }
    }

    /// Id of the command receiving the callback.
    #[must_use]
    pub const fn id(&self) -> CommandId {
        self.id
    }

    pub fn transactions(&mut self) -> &mut TransactionLog {
        self.transactions
    }

    /// Ask the stack to end this command.
    pub fn end(&mut self) {
        self.requests.push(StackRequest::End(self.id));
    }

    /// Ask the stack to cancel this command.
    pub fn cancel(&mut self) {
        self.requests.push(StackRequest::Cancel(self.id));
    }

    /// Ask the stack to execute `command`, suspending or ending the active
    /// one first.
    pub fn execute(&mut self, command: Box<dyn Command>) {
        self.requests.push(StackRequest::Execute(command));
    }

    /// Ask the stack to undo one step. Goes through
    /// [`CommandStack::undo`], so an undo-intolerant active command is
    /// canceled first.
    pub fn undo(&mut self) {
        self.requests.push(StackRequest::Undo);
    }

    /// Ask the stack to redo one step, like [`undo`](Self::undo).
    pub fn redo(&mut self) {
        self.requests.push(StackRequest::Redo);
    }

    /// Disable undo/redo while the command shows speculative results.
    pub fn start_preview(&mut self) {
        self.transactions.set_undo_redo_enabled(false);
    }

    /// Re-enable undo/redo after [`start_preview`](Self::start_preview).
    pub fn end_preview(&mut self) {
        self.transactions.set_undo_redo_enabled(true);
    }
}
