#![forbid(unsafe_code)]

//! The event router: single dispatch point for semantic events.
//!
//! # Priority chain
//!
//! ```text
//! dispatch(event)
//!   │
//!   ├─ 1. GestureStateMachine   pointer kinds, latch free   → stop
//!   ├─ 2. KeyStateTracker       key kinds, latch free       → stop
//!   ├─ 3. active Command        kinds it supports           → stop if handled
//!   └─ 4. listener sets         every set carrying the kind (all run)
//! ```
//!
//! Tiers 1 and 2 consume the event and dispatch what they produce (the
//! classified gesture stream, the forwarded key event, synthetic key-ups)
//! back through [`EventRouter::dispatch`]. Their latches are held while they
//! do, so the follow-ups skip the tier that produced them and reach commands
//! and listeners. Follow-ups are fully dispatched, in order, before the
//! originating call returns.
//!
//! Every event carrying modifier flags first reconciles the held-key set; a
//! key-up is dispatched for each key the flags contradict.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, warn};
use trellis_core::dispatch_guard::DispatchLatch;
use trellis_core::event::{KeyCode, ModifierFlags, RawKeyEvent, RawPointerEvent};
use trellis_core::gesture::GestureStateMachine;
use trellis_core::keybinding::{KeyDownOutcome, KeyStateTracker};
use trellis_core::normalizer::InputNormalizer;
use trellis_core::semantic_event::{
    CommandId, EventCategory, EventKind, KeyArgs, SemanticEvent, TransactionId,
};
use web_time::Instant;

use crate::command::{Command, CommandStack};
use crate::config::RouterConfig;
use crate::error::Result;
use crate::listener::{ListenerId, ListenerSet};
use crate::registry::{CommandRegistry, TransactionRegistry};
use crate::undo::TransactionLog;

/// Hotkey binding. Receives the router so it can run commands or undo.
pub type HotkeyHandler = Rc<dyn Fn(&mut EventRouter) -> Result<()>>;

/// Owns the classifiers, the command stack and the transaction log, and
/// routes events between them.
pub struct EventRouter {
    config: RouterConfig,
    normalizer: InputNormalizer,
    gestures: GestureStateMachine,
    gesture_latch: DispatchLatch,
    keys: KeyStateTracker<HotkeyHandler>,
    key_latch: DispatchLatch,
    commands: CommandStack,
    transactions: TransactionLog,
    command_factories: CommandRegistry,
    transaction_factories: TransactionRegistry,
    mouse_events: ListenerSet,
    keyboard_events: ListenerSet,
}

impl fmt::Debug for EventRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRouter")
            .field("platform", &self.normalizer.platform())
            .field("gestures", &self.gestures)
            .field("pressed", &self.keys.pressed_hotkey())
            .field("hotkeys", &self.keys.registry().len())
            .field("commands", &self.commands)
            .field("transactions", &self.transactions)
            .finish()
    }
}

impl Default for EventRouter {
    fn default() -> Self {
        Self::new(RouterConfig::default())
    }
}

impl EventRouter {
    #[must_use]
    pub fn new(config: RouterConfig) -> Self {
        Self {
            normalizer: InputNormalizer::new(config.platform),
            gestures: GestureStateMachine::new(config.to_gesture_config()),
            gesture_latch: DispatchLatch::new(),
            keys: KeyStateTracker::new(config.to_key_config()),
            key_latch: DispatchLatch::new(),
            commands: CommandStack::new(),
            transactions: TransactionLog::new(config.history),
            command_factories: CommandRegistry::new(),
            transaction_factories: TransactionRegistry::new(),
            mouse_events: ListenerSet::mouse(),
            keyboard_events: ListenerSet::keyboard(),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Raw input
    // -----------------------------------------------------------------------

    /// Normalize, classify and dispatch a native pointer notification.
    ///
    /// A notification whose button chord cannot be classified is dropped with
    /// a warning. Returns whether any resulting event was handled.
    pub fn handle_pointer(&mut self, raw: &RawPointerEvent, now: Instant) -> Result<bool> {
        let pointer = self.normalizer.pointer(raw);
        let events = self.gestures.classify(&pointer);
        if events.is_empty() {
            warn!(
                target: "trellis.router",
                kind = ?raw.kind,
                button = ?raw.button,
                buttons = ?raw.buttons,
                "unclassifiable pointer chord dropped"
            );
            return Ok(false);
        }
        let mut handled = false;
        for mut event in events {
            handled |= self.dispatch(&mut event, now)?;
        }
        Ok(handled)
    }

    /// Normalize and dispatch a native keyboard notification.
    pub fn handle_key(&mut self, raw: &RawKeyEvent, now: Instant) -> Result<bool> {
        let mut event = self.normalizer.key(raw);
        self.dispatch(&mut event, now)
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Route `event` through the priority chain. Returns whether it ended up
    /// handled.
    ///
    /// # Errors
    ///
    /// Command-stack misuse raised by command callbacks or hotkey handlers.
    pub fn dispatch(&mut self, event: &mut SemanticEvent, now: Instant) -> Result<bool> {
        if GestureStateMachine::supports(event.kind)
            && let Some(_token) = self.gesture_latch.try_enter()
        {
            return self.route_gesture(event, now);
        }

        if KeyStateTracker::<HotkeyHandler>::supports(event.kind)
            && let Some(_token) = self.key_latch.try_enter()
        {
            return self.route_key(event, now);
        }

        if self.commands.dispatch(event, &mut self.transactions)? {
            return Ok(true);
        }

        Ok(self.broadcast(event))
    }

    fn route_gesture(&mut self, event: &mut SemanticEvent, now: Instant) -> Result<bool> {
        if let Some(flags) = event.mouse_args().map(|a| a.modifiers) {
            self.release_stale_keys(flags, None, now)?;
        }
        for mut follow_up in self.gestures.process(event, now) {
            self.dispatch(&mut follow_up, now)?;
        }
        event.mark_handled();
        Ok(true)
    }

    fn route_key(&mut self, event: &mut SemanticEvent, now: Instant) -> Result<bool> {
        let Some(args) = event.key_args().cloned() else {
            return Ok(event.is_handled());
        };

        match event.kind {
            EventKind::KeyDown => {
                if !self.keys.accepts(&args) {
                    return Ok(event.is_handled());
                }
                let Some(code) = args.code.as_ref() else {
                    return Ok(event.is_handled());
                };
                self.release_stale_keys(args.modifiers, Some(code), now)?;
                let active = self.commands.active_type().map(str::to_owned);
                match self.keys.key_down(&args, active.as_deref()) {
                    KeyDownOutcome::Ignored => {}
                    KeyDownOutcome::Binding(handler) => {
                        debug!(
                            target: "trellis.router",
                            code = %code,
                            command_type = ?active,
                            "hotkey binding invoked"
                        );
                        (*handler)(self)?;
                        event.mark_handled();
                    }
                    KeyDownOutcome::Special => event.mark_handled(),
                    KeyDownOutcome::Forward => {
                        self.dispatch(event, now)?;
                    }
                }
            }
            EventKind::KeyPressed => {
                if self.keys.accepts(&args) {
                    self.dispatch(event, now)?;
                }
            }
            _ => {
                if let Some(code) = args.code.as_ref() {
                    self.keys.key_up(code);
                }
                self.dispatch(event, now)?;
            }
        }
        Ok(event.is_handled())
    }

    /// Reconcile held keys against fresh modifier flags and dispatch a
    /// key-up for every key released.
    fn release_stale_keys(
        &mut self,
        flags: ModifierFlags,
        current: Option<&KeyCode>,
        now: Instant,
    ) -> Result<()> {
        for code in self.keys.reconcile(flags, current) {
            let mut key_up = SemanticEvent::key(
                EventKind::KeyUp,
                KeyArgs {
                    code: Some(code),
                    modifiers: flags,
                    ..KeyArgs::default()
                },
            );
            self.dispatch(&mut key_up, now)?;
        }
        Ok(())
    }

    fn broadcast(&mut self, event: &mut SemanticEvent) -> bool {
        let sets = [
            &mut self.mouse_events,
            &mut self.keyboard_events,
            self.commands.events_mut(),
            self.transactions.events_mut(),
        ];
        for set in sets {
            if set.supports(event.kind) {
                set.broadcast(event);
            }
        }
        event.is_handled()
    }

    // -----------------------------------------------------------------------
    // Listeners
    // -----------------------------------------------------------------------

    /// The listener set carrying `category`.
    pub fn listeners_mut(&mut self, category: EventCategory) -> &mut ListenerSet {
        match category {
            EventCategory::Mouse => &mut self.mouse_events,
            EventCategory::Keyboard => &mut self.keyboard_events,
            EventCategory::Command => self.commands.events_mut(),
            EventCategory::Transaction => self.transactions.events_mut(),
        }
    }

    /// Subscribe to `kind` on the set that carries it.
    pub fn listen(
        &mut self,
        kind: EventKind,
        listener: impl FnMut(&mut SemanticEvent) + 'static,
    ) -> Result<ListenerId> {
        self.listeners_mut(kind.category()).listen(kind, listener)
    }

    pub fn unlisten(&mut self, kind: EventKind, id: ListenerId) -> Result<bool> {
        self.listeners_mut(kind.category()).unlisten(kind, id)
    }

    // -----------------------------------------------------------------------
    // Hotkeys
    // -----------------------------------------------------------------------

    /// Bind `hotkey` in the active environment, optionally scoped to a
    /// command type. Returns the binding it replaced.
    pub fn register_hotkey(
        &mut self,
        hotkey: &str,
        handler: impl Fn(&mut EventRouter) -> Result<()> + 'static,
        command_type: Option<&str>,
    ) -> Option<HotkeyHandler> {
        let handler: HotkeyHandler = Rc::new(handler);
        self.keys
            .registry_mut()
            .register(hotkey, handler, command_type)
    }

    /// Remove a binding from the active environment. Returns whether one
    /// existed.
    pub fn unregister_hotkey(&mut self, hotkey: &str, command_type: Option<&str>) -> bool {
        self.keys
            .registry_mut()
            .unregister(hotkey, command_type)
            .is_some()
    }

    /// Switch the hotkey environment.
    pub fn set_hotkey_environment(&mut self, environment: &str) {
        self.keys.registry_mut().set_environment(environment);
    }

    #[must_use]
    pub fn hotkey_environment(&self) -> &str {
        self.keys.registry().environment()
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    pub fn execute(&mut self, command: Box<dyn Command>) -> Result<CommandId> {
        self.commands.execute(command, &mut self.transactions)
    }

    /// Build a command from the factory registry and execute it. `Ok(None)`
    /// if no factory is registered for `command_type`.
    pub fn execute_type(
        &mut self,
        command_type: &str,
        args: &dyn Any,
    ) -> Result<Option<CommandId>> {
        match self.command_factories.create(command_type, args) {
            Some(command) => self.execute(command).map(Some),
            None => Ok(None),
        }
    }

    pub fn end_command(&mut self, id: Option<CommandId>) -> Result<()> {
        self.commands.end(id, &mut self.transactions)
    }

    pub fn cancel_command(&mut self, id: Option<CommandId>) -> Result<()> {
        self.commands.cancel(id, &mut self.transactions)
    }

    // -----------------------------------------------------------------------
    // History
    // -----------------------------------------------------------------------

    /// Undo one step. The active command is canceled first if it cannot
    /// tolerate undo.
    pub fn undo(&mut self) -> Result<bool> {
        self.commands.undo(&mut self.transactions)
    }

    /// Redo one step, with the same command interplay as [`undo`](Self::undo).
    pub fn redo(&mut self) -> Result<bool> {
        self.commands.redo(&mut self.transactions)
    }

    /// Build a transaction from the factory registry and open it.
    pub fn create_transaction(
        &mut self,
        transaction_type: &str,
        args: &dyn Any,
    ) -> Option<TransactionId> {
        self.transactions
            .create_transaction(&self.transaction_factories, transaction_type, args)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn normalizer(&self) -> &InputNormalizer {
        &self.normalizer
    }

    #[must_use]
    pub fn gestures(&self) -> &GestureStateMachine {
        &self.gestures
    }

    #[must_use]
    pub fn keys(&self) -> &KeyStateTracker<HotkeyHandler> {
        &self.keys
    }

    #[must_use]
    pub fn commands(&self) -> &CommandStack {
        &self.commands
    }

    #[must_use]
    pub fn transactions(&self) -> &TransactionLog {
        &self.transactions
    }

    pub fn transactions_mut(&mut self) -> &mut TransactionLog {
        &mut self.transactions
    }

    pub fn command_factories_mut(&mut self) -> &mut CommandRegistry {
        &mut self.command_factories
    }

    pub fn transaction_factories_mut(&mut self) -> &mut TransactionRegistry {
        &mut self.transaction_factories
    }
}
