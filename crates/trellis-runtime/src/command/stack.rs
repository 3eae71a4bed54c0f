#![forbid(unsafe_code)]

//! The command stack.
//!
//! # Invariants
//!
//! 1. At most one command is active; every other live command is on the
//!    suspend stack, most recently suspended on top.
//! 2. `end`/`cancel` only ever target the active command.
//! 3. Ending or canceling the active command resumes the top of the suspend
//!    stack, if any.
//! 4. Each transition emits a `Before` and an `After` notification around
//!    the command callback.
//!
//! Requests a command makes through its [`CommandCx`] are queued and applied
//! in order once the transition that ran the callback is complete.

use std::fmt;

use tracing::debug;
use trellis_core::semantic_event::{CommandArgs, CommandId, EventKind, SemanticEvent, Timing};

use super::{Command, CommandCx, CommandState, StackRequest, Termination};
use crate::error::{Error, Result};
use crate::listener::ListenerSet;
use crate::undo::TransactionLog;

struct Entry {
    id: CommandId,
    command: Box<dyn Command>,
}

/// Single active command plus a LIFO stack of suspended ones.
pub struct CommandStack {
    active: Option<Entry>,
    suspended: Vec<Entry>,
    pending: Vec<StackRequest>,
    next_id: u64,
    events: ListenerSet,
}

impl fmt::Debug for CommandStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandStack")
            .field("active", &self.active.as_ref().map(|e| (e.id, e.command.command_type())))
            .field("suspended", &self.suspended.len())
            .field("pending", &self.pending)
            .finish()
    }
}

impl Default for CommandStack {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandStack {
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: None,
            suspended: Vec::new(),
            pending: Vec::new(),
            next_id: 1,
            events: ListenerSet::command(),
        }
    }

    /// Command lifecycle listeners.
    #[must_use]
    pub fn events(&self) -> &ListenerSet {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut ListenerSet {
        &mut self.events
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Make `command` the active command and run it.
    ///
    /// The previously active command is suspended if it allows it and ended
    /// otherwise. A command that ends immediately on execute is ended right
    /// after `on_execute` (and any requests it made) complete.
    ///
    /// # Errors
    ///
    /// Propagates [`Error::NotActive`] from requests queued by callbacks.
    pub fn execute(
        &mut self,
        command: Box<dyn Command>,
        transactions: &mut TransactionLog,
    ) -> Result<CommandId> {
        let id = CommandId(self.next_id);
        self.next_id += 1;

        // The outgoing command's requests settle before the new one runs, and
        // may themselves install a command that has to make way too.
        while let Some(current) = self.active.take() {
            if current.command.can_suspend() {
                self.suspend(current, transactions);
            } else {
                self.terminate(current, Termination::Ended, transactions);
            }
            self.drain(transactions)?;
        }

        let command_type = command.command_type().to_string();
        self.active = Some(Entry { id, command });
        self.notify(EventKind::CommandStarted, id, &command_type, Timing::Before);
        if let Some(entry) = self.active.as_mut() {
            let mut cx = CommandCx::new(id, transactions, &mut self.pending);
            entry.command.on_execute(&mut cx);
        }
        self.notify(EventKind::CommandStarted, id, &command_type, Timing::After);
        debug!(
            target: "trellis.command",
            id = %id,
            command_type = %command_type,
            suspended = self.suspended.len(),
            "command started"
        );

        self.drain(transactions)?;

        if let Some(entry) = &self.active
            && entry.id == id
            && entry.command.ends_immediately_on_execute()
        {
            self.end(Some(id), transactions)?;
        }
        Ok(id)
    }

    /// End the active command and resume the one below it.
    ///
    /// `None` targets whatever is active and is a no-op on an empty stack.
    ///
    /// # Errors
    ///
    /// [`Error::NotActive`] if `id` names a command that is not active.
    pub fn end(&mut self, id: Option<CommandId>, transactions: &mut TransactionLog) -> Result<()> {
        self.finish(id, Termination::Ended, transactions)
    }

    /// Cancel the active command and resume the one below it.
    ///
    /// # Errors
    ///
    /// [`Error::NotActive`] if `id` names a command that is not active.
    pub fn cancel(
        &mut self,
        id: Option<CommandId>,
        transactions: &mut TransactionLog,
    ) -> Result<()> {
        self.finish(id, Termination::Canceled, transactions)
    }

    fn finish(
        &mut self,
        id: Option<CommandId>,
        reason: Termination,
        transactions: &mut TransactionLog,
    ) -> Result<()> {
        let active = self.active_id();
        if let Some(requested) = id
            && Some(requested) != active
        {
            return Err(Error::NotActive { requested, active });
        }
        let Some(entry) = self.active.take() else {
            return Ok(());
        };
        self.terminate(entry, reason, transactions);
        if let Some(next) = self.suspended.pop() {
            self.resume(next, transactions);
        }
        self.drain(transactions)
    }

    // -----------------------------------------------------------------------
    // History
    // -----------------------------------------------------------------------

    /// Undo one step of `transactions`.
    ///
    /// This is the only public way to undo: after the `TransactionUndoing`
    /// notification an active command that cannot tolerate undo is
    /// canceled, then the step is undone. Returns whether anything was
    /// undone.
    ///
    /// # Errors
    ///
    /// Propagates [`Error::NotActive`] from requests queued by the canceled
    /// command's callbacks.
    pub fn undo(&mut self, transactions: &mut TransactionLog) -> Result<bool> {
        transactions.undo_with(|log| self.cancel_if_undo_intolerant(log))
    }

    /// Redo one step of `transactions`, with the same command interplay as
    /// [`undo`](Self::undo).
    ///
    /// # Errors
    ///
    /// Same as [`undo`](Self::undo).
    pub fn redo(&mut self, transactions: &mut TransactionLog) -> Result<bool> {
        transactions.redo_with(|log| self.cancel_if_undo_intolerant(log))
    }

    fn cancel_if_undo_intolerant(&mut self, transactions: &mut TransactionLog) -> Result<()> {
        if let Some(entry) = &self.active
            && !entry.command.can_undo_on_execute()
        {
            let id = entry.id;
            debug!(target: "trellis.command", id = %id, "canceling command for undo/redo");
            self.cancel(Some(id), transactions)?;
        }
        Ok(())
    }

    /// Offer `event` to the active command. Returns the handled flag.
    pub fn dispatch(
        &mut self,
        event: &mut SemanticEvent,
        transactions: &mut TransactionLog,
    ) -> Result<bool> {
        let Some(entry) = self.active.as_mut() else {
            return Ok(false);
        };
        if !entry.command.supports(event.kind) {
            return Ok(false);
        }
        let mut cx = CommandCx::new(entry.id, transactions, &mut self.pending);
        entry.command.handle_event(event, &mut cx);
        self.drain(transactions)?;
        Ok(event.is_handled())
    }

    fn suspend(&mut self, mut entry: Entry, transactions: &mut TransactionLog) {
        let command_type = entry.command.command_type().to_string();
        self.notify(EventKind::CommandSuspended, entry.id, &command_type, Timing::Before);
        entry
            .command
            .on_suspend(&mut CommandCx::new(entry.id, transactions, &mut self.pending));
        self.notify(EventKind::CommandSuspended, entry.id, &command_type, Timing::After);
        debug!(target: "trellis.command", id = %entry.id, command_type = %command_type, "command suspended");
        self.suspended.push(entry);
    }

    fn resume(&mut self, entry: Entry, transactions: &mut TransactionLog) {
        let id = entry.id;
        let command_type = entry.command.command_type().to_string();
        self.active = Some(entry);
        self.notify(EventKind::CommandResumed, id, &command_type, Timing::Before);
        if let Some(entry) = self.active.as_mut() {
            let mut cx = CommandCx::new(id, transactions, &mut self.pending);
            entry.command.on_resume(&mut cx);
        }
        self.notify(EventKind::CommandResumed, id, &command_type, Timing::After);
        debug!(target: "trellis.command", id = %id, command_type = %command_type, "command resumed");
    }

    fn terminate(&mut self, mut entry: Entry, reason: Termination, transactions: &mut TransactionLog) {
        let kind = match reason {
            Termination::Ended => EventKind::CommandTerminated,
            Termination::Canceled => EventKind::CommandCanceled,
        };
        let command_type = entry.command.command_type().to_string();
        self.notify(kind, entry.id, &command_type, Timing::Before);
        entry.command.on_terminate(
            reason,
            &mut CommandCx::new(entry.id, transactions, &mut self.pending),
        );
        self.notify(kind, entry.id, &command_type, Timing::After);
        debug!(
            target: "trellis.command",
            id = %entry.id,
            command_type = %command_type,
            ?reason,
            "command terminated"
        );
    }

    fn drain(&mut self, transactions: &mut TransactionLog) -> Result<()> {
        let requests = std::mem::take(&mut self.pending);
        for request in requests {
            match request {
                StackRequest::End(id) | StackRequest::Cancel(id)
                    if self.state_of(id) == CommandState::Terminated =>
                {
                    debug!(target: "trellis.command", id = %id, "request for finished command dropped");
                }
                StackRequest::End(id) => self.end(Some(id), transactions)?,
                StackRequest::Cancel(id) => self.cancel(Some(id), transactions)?,
                StackRequest::Execute(command) => {
                    self.execute(command, transactions)?;
                }
                StackRequest::Undo => {
                    self.undo(transactions)?;
                }
                StackRequest::Redo => {
                    self.redo(transactions)?;
                }
            }
        }
        Ok(())
    }

    fn notify(&mut self, kind: EventKind, id: CommandId, command_type: &str, timing: Timing) {
        let args = CommandArgs {
            id,
            command_type: command_type.to_string(),
        };
        let mut event = SemanticEvent::command(kind, args, timing);
        self.events.broadcast(&mut event);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn active_id(&self) -> Option<CommandId> {
        self.active.as_ref().map(|e| e.id)
    }

    /// Type string of the active command; scopes hotkey lookup.
    #[must_use]
    pub fn active_type(&self) -> Option<&str> {
        self.active.as_ref().map(|e| e.command.command_type())
    }

    /// Active command first, then suspended commands from most to least
    /// recently suspended.
    #[must_use]
    pub fn running_commands(&self) -> Vec<CommandId> {
        self.active
            .iter()
            .chain(self.suspended.iter().rev())
            .map(|e| e.id)
            .collect()
    }

    #[must_use]
    pub fn suspended_depth(&self) -> usize {
        self.suspended.len()
    }

    #[must_use]
    pub fn state_of(&self, id: CommandId) -> CommandState {
        if self.active_id() == Some(id) {
            CommandState::Active
        } else if self.suspended.iter().any(|e| e.id == id) {
            CommandState::Suspended
        } else if id.0 >= 1 && id.0 < self.next_id {
            CommandState::Terminated
        } else {
            CommandState::Idle
        }
    }
}
