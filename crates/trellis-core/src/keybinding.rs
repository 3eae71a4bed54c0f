#![forbid(unsafe_code)]

//! Held-key tracking, canonical hotkey strings, and scoped hotkey lookup.
//!
//! # Key Concepts
//!
//! - **KeyStateTracker**: owns the set of currently pressed key codes and
//!   resolves the held combination against a [`HotkeyRegistry`].
//!
//! - **Hotkey string**: modifiers in the fixed order `Ctrl`, `Alt`, `Shift`,
//!   `Meta`, then the remaining keys in press order, joined by `+`
//!   (`"Ctrl+Shift+Z"`). The order of modifier presses never matters.
//!
//! - **HotkeyRegistry**: per-environment tables mapping a hotkey string plus
//!   an optional command type to a handler. A command-scoped binding shadows
//!   the global binding for the same string while that command is active.
//!
//! - **Reconciliation**: every input event carries fresh modifier flags.
//!   [`KeyStateTracker::reconcile`] force-releases held keys that those flags
//!   contradict, so a lost key-up (focus change, OS shortcut) never leaves a
//!   key stuck.
//!
//! # Resolution order on key-down
//!
//! ```text
//!   command-scoped binding ──▶ global binding ──▶ special hotkey ──▶ forward
//!        (Binding)               (Binding)          (Special)        (Forward)
//! ```
//!
//! The first three consume the base key: it is removed from the pressed set
//! so tapping it again while the modifiers stay held fires again.

use ahash::AHashMap;

use crate::event::{FocusTarget, KeyCode, ModifierFlags, Modifiers, modifier_name};
use crate::semantic_event::{EventKind, KeyArgs};

#[cfg(feature = "tracing")]
use crate::logging::trace;
#[cfg(not(feature = "tracing"))]
use crate::trace;

/// Environment that always exists in a [`HotkeyRegistry`].
pub const DEFAULT_ENVIRONMENT: &str = "default";

/// Modifier order inside hotkey strings.
const MODIFIER_ORDER: [Modifiers; 4] = [
    Modifiers::CTRL,
    Modifiers::ALT,
    Modifiers::SHIFT,
    Modifiers::SUPER,
];

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Keyboard filtering and special-hotkey tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyConfig {
    /// Keys delivered even while a text input has focus.
    pub text_input_passthrough: Vec<KeyCode>,
    /// Keys delivered from a text input when Ctrl or Meta is held.
    pub text_input_primary_combos: Vec<KeyCode>,
    /// Hotkey strings that are marked handled without invoking a binding.
    pub special_hotkeys: Vec<String>,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            text_input_passthrough: vec![
                KeyCode::TAB,
                KeyCode::SPACE,
                KeyCode::ESCAPE,
                KeyCode::ALT_LEFT,
                KeyCode::ALT_RIGHT,
                KeyCode::META_LEFT,
                KeyCode::META_RIGHT,
                KeyCode::SHIFT_LEFT,
                KeyCode::SHIFT_RIGHT,
                KeyCode::CONTROL_LEFT,
                KeyCode::CONTROL_RIGHT,
            ],
            text_input_primary_combos: vec![KeyCode::from("KeyZ"), KeyCode::from("KeyR")],
            special_hotkeys: vec!["Ctrl+S".into(), "Ctrl+O".into(), "Ctrl+P".into()],
        }
    }
}

// ---------------------------------------------------------------------------
// Hotkey strings
// ---------------------------------------------------------------------------

/// Rewrite a user-supplied hotkey string into canonical form.
///
/// Modifier names are matched case-insensitively (`control`, `cmd`, ...) and
/// moved to the front in canonical order; single letters are upper-cased;
/// physical key codes (`KeyZ`, `ShiftLeft`, `ArrowUp`) are mapped to their
/// hotkey names; other key names keep their relative order.
///
/// ```
/// use trellis_core::keybinding::canonical_hotkey;
/// assert_eq!(canonical_hotkey("shift+ctrl+z"), "Ctrl+Shift+Z");
/// assert_eq!(canonical_hotkey("Cmd + Delete"), "Meta+Delete");
/// assert_eq!(canonical_hotkey("KeyZ+ControlLeft"), "Ctrl+Z");
/// ```
#[must_use]
pub fn canonical_hotkey(hotkey: &str) -> String {
    let mut modifiers = Modifiers::NONE;
    let mut keys: Vec<String> = Vec::new();
    for part in hotkey.split('+').map(str::trim).filter(|p| !p.is_empty()) {
        match part.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => modifiers |= Modifiers::CTRL,
            "alt" | "option" => modifiers |= Modifiers::ALT,
            "shift" => modifiers |= Modifiers::SHIFT,
            "meta" | "cmd" | "command" | "win" | "super" => modifiers |= Modifiers::SUPER,
            _ if part.chars().count() == 1 => keys.push(part.to_uppercase()),
            _ => {
                let code = KeyCode::from(part.to_string());
                match (code.modifier(), code.hotkey_name()) {
                    (Some(modifier), _) => modifiers |= modifier,
                    (None, Some(name)) => keys.push(name.to_string()),
                    (None, None) => keys.push(part.to_string()),
                }
            }
        }
    }
    join_hotkey(modifiers, keys.iter().map(String::as_str))
}

fn join_hotkey<'a>(modifiers: Modifiers, keys: impl Iterator<Item = &'a str>) -> String {
    MODIFIER_ORDER
        .iter()
        .filter(|m| modifiers.contains(**m))
        .map(|m| modifier_name(*m))
        .chain(keys)
        .collect::<Vec<_>>()
        .join("+")
}

// ---------------------------------------------------------------------------
// HotkeyRegistry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct HotkeyId {
    hotkey: String,
    command_type: Option<String>,
}

impl HotkeyId {
    fn new(hotkey: &str, command_type: Option<&str>) -> Self {
        Self {
            hotkey: canonical_hotkey(hotkey),
            command_type: command_type.map(str::to_owned),
        }
    }
}

/// Hotkey handlers keyed by environment, hotkey string and command type.
#[derive(Debug, Clone)]
pub struct HotkeyRegistry<H> {
    active: String,
    environments: AHashMap<String, AHashMap<HotkeyId, H>>,
}

impl<H> Default for HotkeyRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> HotkeyRegistry<H> {
    /// Create a registry with only the default environment.
    #[must_use]
    pub fn new() -> Self {
        let mut environments = AHashMap::new();
        environments.insert(DEFAULT_ENVIRONMENT.to_owned(), AHashMap::new());
        Self {
            active: DEFAULT_ENVIRONMENT.to_owned(),
            environments,
        }
    }

    /// Name of the active environment.
    #[must_use]
    pub fn environment(&self) -> &str {
        &self.active
    }

    /// Switch the active environment, creating it if needed.
    pub fn set_environment(&mut self, environment: &str) {
        self.environments.entry(environment.to_owned()).or_default();
        self.active = environment.to_owned();
    }

    /// Bind `handler` in the active environment. Returns the replaced handler.
    pub fn register(&mut self, hotkey: &str, handler: H, command_type: Option<&str>) -> Option<H> {
        self.table_mut().insert(HotkeyId::new(hotkey, command_type), handler)
    }

    /// Remove a binding from the active environment.
    pub fn unregister(&mut self, hotkey: &str, command_type: Option<&str>) -> Option<H> {
        self.table_mut().remove(&HotkeyId::new(hotkey, command_type))
    }

    /// Look up a binding in the active environment.
    #[must_use]
    pub fn lookup(&self, hotkey: &str, command_type: Option<&str>) -> Option<&H> {
        self.environments
            .get(&self.active)?
            .get(&HotkeyId::new(hotkey, command_type))
    }

    /// Whether a binding exists in the active environment.
    #[must_use]
    pub fn contains(&self, hotkey: &str, command_type: Option<&str>) -> bool {
        self.lookup(hotkey, command_type).is_some()
    }

    /// Number of bindings in the active environment.
    #[must_use]
    pub fn len(&self) -> usize {
        self.environments.get(&self.active).map_or(0, |table| table.len())
    }

    /// Whether the active environment has no bindings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn table_mut(&mut self) -> &mut AHashMap<HotkeyId, H> {
        self.environments.entry(self.active.clone()).or_default()
    }
}

// ---------------------------------------------------------------------------
// KeyStateTracker
// ---------------------------------------------------------------------------

/// What the tracker decided about a key-down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyDownOutcome<H> {
    /// No usable key code; nothing happened.
    Ignored,
    /// A binding matched; the caller invokes it and marks the event handled.
    Binding(H),
    /// A special hotkey matched; the event is handled, nothing is invoked.
    Special,
    /// No match; the event continues downstream.
    Forward,
}

/// Tracks held keys and resolves hotkeys.
#[derive(Debug, Clone)]
pub struct KeyStateTracker<H> {
    config: KeyConfig,
    pressed: Vec<KeyCode>,
    registry: HotkeyRegistry<H>,
}

impl<H> Default for KeyStateTracker<H> {
    fn default() -> Self {
        Self::new(KeyConfig::default())
    }
}

impl<H> KeyStateTracker<H> {
    /// Create a tracker with nothing held and an empty registry.
    #[must_use]
    pub fn new(config: KeyConfig) -> Self {
        Self {
            config,
            pressed: Vec::new(),
            registry: HotkeyRegistry::new(),
        }
    }

    /// Whether this tracker handles events of `kind`.
    #[must_use]
    pub const fn supports(kind: EventKind) -> bool {
        matches!(
            kind,
            EventKind::KeyDown | EventKind::KeyUp | EventKind::KeyPressed
        )
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &KeyConfig {
        &self.config
    }

    /// The hotkey registry.
    #[must_use]
    pub fn registry(&self) -> &HotkeyRegistry<H> {
        &self.registry
    }

    /// Mutable access to the hotkey registry.
    pub fn registry_mut(&mut self) -> &mut HotkeyRegistry<H> {
        &mut self.registry
    }

    /// Whether a key event from its focus target should be processed.
    ///
    /// Events from text inputs are dropped unless the key is pass-through or
    /// is a primary-modifier combo key with Ctrl or Meta held.
    #[must_use]
    pub fn accepts(&self, args: &KeyArgs) -> bool {
        if args.target != FocusTarget::TextInput {
            return true;
        }
        let Some(code) = &args.code else {
            return false;
        };
        if self.config.text_input_passthrough.contains(code) {
            return true;
        }
        let primary_held = args.modifiers.ctrl == Some(true) || args.modifiers.meta == Some(true);
        primary_held && self.config.text_input_primary_combos.contains(code)
    }

    /// Force-release keys contradicted by fresh modifier flags.
    ///
    /// `current` is the key of the keyboard event carrying the flags, or
    /// `None` for pointer events. Returns the released codes in press order;
    /// the caller dispatches a synthetic key-up for each.
    pub fn reconcile(&mut self, modifiers: ModifierFlags, current: Option<&KeyCode>) -> Vec<KeyCode> {
        let mut release = Vec::new();
        let mut held_group = Modifiers::NONE;
        let mut others = Vec::new();

        for code in &self.pressed {
            match tracked_modifier(code) {
                Some(class) if modifier_flag(modifiers, class) == Some(false) => {
                    release.push(code.clone());
                }
                Some(class) => held_group |= class,
                None => others.push(code.clone()),
            }
        }

        if let Some(current) = current
            && !others.is_empty()
        {
            let current_is_modifier = tracked_modifier(current).is_some();
            let shadowed = !held_group.is_empty()
                && current.hotkey_name().is_some_and(|name| {
                    let combo = join_hotkey(held_group, std::iter::once(name));
                    self.registry.contains(&combo, None)
                });
            for other in others {
                if current_is_modifier || (other != *current && shadowed) {
                    release.push(other);
                }
            }
        }

        if !release.is_empty() {
            self.pressed.retain(|code| !release.contains(code));
            trace!(target: "trellis.keys", released = release.len(), "reconciled held keys");
        }
        release
    }

    /// Record a key release. Returns whether the key was held.
    pub fn key_up(&mut self, code: &KeyCode) -> bool {
        let before = self.pressed.len();
        self.pressed.retain(|held| held != code);
        self.pressed.len() != before
    }

    /// Canonical hotkey string for the held keys.
    #[must_use]
    pub fn pressed_hotkey(&self) -> String {
        let modifiers = self
            .pressed
            .iter()
            .filter_map(KeyCode::modifier)
            .fold(Modifiers::NONE, |acc, m| acc | m);
        let keys = self
            .pressed
            .iter()
            .filter(|code| code.modifier().is_none())
            .filter_map(KeyCode::hotkey_name);
        join_hotkey(modifiers, keys)
    }

    /// Held key codes in press order.
    #[must_use]
    pub fn pressed_keys(&self) -> &[KeyCode] {
        &self.pressed
    }

    /// Whether `code` is held.
    #[must_use]
    pub fn is_pressed(&self, code: &KeyCode) -> bool {
        self.pressed.contains(code)
    }

    /// Whether either Control key is held.
    #[must_use]
    pub fn is_ctrl_pressed(&self) -> bool {
        self.is_pressed(&KeyCode::CONTROL_LEFT) || self.is_pressed(&KeyCode::CONTROL_RIGHT)
    }

    /// Whether either Alt key is held.
    #[must_use]
    pub fn is_alt_pressed(&self) -> bool {
        self.is_pressed(&KeyCode::ALT_LEFT) || self.is_pressed(&KeyCode::ALT_RIGHT)
    }

    /// Whether either Shift key is held.
    #[must_use]
    pub fn is_shift_pressed(&self) -> bool {
        self.is_pressed(&KeyCode::SHIFT_LEFT) || self.is_pressed(&KeyCode::SHIFT_RIGHT)
    }

    /// Release everything without notifications.
    pub fn clear(&mut self) {
        self.pressed.clear();
    }
}

impl<H: Clone> KeyStateTracker<H> {
    /// Record a key press and resolve the held combination.
    ///
    /// `active_command_type` selects command-scoped bindings. Run
    /// [`reconcile`](Self::reconcile) first with the event's flags.
    pub fn key_down(&mut self, args: &KeyArgs, active_command_type: Option<&str>) -> KeyDownOutcome<H> {
        let Some(code) = args.code.as_ref().filter(|c| !c.is_empty()) else {
            return KeyDownOutcome::Ignored;
        };
        if !self.pressed.contains(code) {
            self.pressed.push(code.clone());
        }

        let hotkey = self.pressed_hotkey();
        let binding = active_command_type
            .and_then(|ty| self.registry.lookup(&hotkey, Some(ty)))
            .or_else(|| self.registry.lookup(&hotkey, None))
            .cloned();

        let outcome = match binding {
            Some(handler) => KeyDownOutcome::Binding(handler),
            None if self.config.special_hotkeys.iter().any(|s| *s == hotkey) => {
                KeyDownOutcome::Special
            }
            None => return KeyDownOutcome::Forward,
        };
        trace!(target: "trellis.keys", %hotkey, "hotkey consumed");
        self.key_up(code);
        outcome
    }
}

/// Modifier class for reconciliation. Meta keys count as ordinary keys.
fn tracked_modifier(code: &KeyCode) -> Option<Modifiers> {
    code.modifier()
        .filter(|m| m.intersects(Modifiers::CTRL | Modifiers::ALT | Modifiers::SHIFT))
}

fn modifier_flag(flags: ModifierFlags, class: Modifiers) -> Option<bool> {
    if class.contains(Modifiers::CTRL) {
        flags.ctrl
    } else if class.contains(Modifiers::ALT) {
        flags.alt
    } else {
        flags.shift
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    type Tracker = KeyStateTracker<&'static str>;

    fn key(code: &'static str) -> KeyArgs {
        KeyArgs::new(code)
    }

    fn key_with(code: &'static str, ctrl: bool, shift: bool) -> KeyArgs {
        KeyArgs {
            code: Some(KeyCode::from(code)),
            modifiers: ModifierFlags {
                alt: Some(false),
                ctrl: Some(ctrl),
                shift: Some(shift),
                meta: Some(false),
            },
            target: FocusTarget::Surface,
        }
    }

    fn text_input(code: &'static str, ctrl: bool) -> KeyArgs {
        KeyArgs {
            target: FocusTarget::TextInput,
            ..key_with(code, ctrl, false)
        }
    }

    // --- Hotkey strings ---

    #[test]
    fn canonical_order_is_independent_of_press_order() {
        let mut a = Tracker::default();
        a.key_down(&key("ShiftLeft"), None);
        a.key_down(&key("ControlLeft"), None);
        a.key_down(&key("KeyZ"), None);

        let mut b = Tracker::default();
        b.key_down(&key("ControlRight"), None);
        b.key_down(&key("ShiftRight"), None);
        b.key_down(&key("KeyZ"), None);

        assert_eq!(a.pressed_hotkey(), "Ctrl+Shift+Z");
        assert_eq!(a.pressed_hotkey(), b.pressed_hotkey());
    }

    #[test]
    fn non_modifiers_keep_press_order() {
        let mut t = Tracker::default();
        t.key_down(&key("KeyB"), None);
        t.key_down(&key("AltLeft"), None);
        t.key_down(&key("KeyA"), None);
        assert_eq!(t.pressed_hotkey(), "Alt+B+A");
    }

    #[test]
    fn unnamed_keys_are_skipped_in_hotkey() {
        let mut t = Tracker::default();
        t.key_down(&key("IntlRo"), None);
        t.key_down(&key("KeyQ"), None);
        assert_eq!(t.pressed_hotkey(), "Q");
        assert!(t.is_pressed(&KeyCode::from("IntlRo")));
    }

    #[test]
    fn canonicalize_user_strings() {
        assert_eq!(canonical_hotkey("Shift+Ctrl+Z"), "Ctrl+Shift+Z");
        assert_eq!(canonical_hotkey("control + alt + delete"), "Ctrl+Alt+delete");
        assert_eq!(canonical_hotkey("Meta+Shift+s"), "Shift+Meta+S");
        assert_eq!(canonical_hotkey("Esc"), "Esc");
        assert_eq!(canonical_hotkey("ShiftLeft+ArrowUp"), "Shift+Up");
        assert_eq!(canonical_hotkey("Escape"), "Esc");
    }

    // --- Resolution ---

    #[test]
    fn global_binding_fires_and_consumes_base_key() {
        let mut t = Tracker::default();
        t.registry_mut().register("Ctrl+Z", "undo", None);
        assert_eq!(t.key_down(&key("ControlLeft"), None), KeyDownOutcome::Forward);
        assert_eq!(t.key_down(&key("KeyZ"), None), KeyDownOutcome::Binding("undo"));
        assert!(!t.is_pressed(&KeyCode::from("KeyZ")));
        assert!(t.is_ctrl_pressed());
        assert_eq!(t.key_down(&key("KeyZ"), None), KeyDownOutcome::Binding("undo"));
    }

    #[test]
    fn command_scoped_binding_shadows_global() {
        let mut t = Tracker::default();
        t.registry_mut().register("Ctrl+Z", "global-undo", None);
        t.registry_mut().register("Ctrl+Z", "sketch-undo", Some("sketch"));
        t.key_down(&key("ControlLeft"), Some("sketch"));
        assert_eq!(
            t.key_down(&key("KeyZ"), Some("sketch")),
            KeyDownOutcome::Binding("sketch-undo")
        );
        assert_eq!(
            t.key_down(&key("KeyZ"), Some("extrude")),
            KeyDownOutcome::Binding("global-undo")
        );
        assert_eq!(
            t.key_down(&key("KeyZ"), None),
            KeyDownOutcome::Binding("global-undo")
        );
    }

    #[test]
    fn special_hotkey_is_handled_without_binding() {
        let mut t = Tracker::default();
        t.key_down(&key("ControlLeft"), None);
        assert_eq!(t.key_down(&key("KeyS"), None), KeyDownOutcome::Special);
        assert!(!t.is_pressed(&KeyCode::from("KeyS")));
    }

    #[test]
    fn unbound_key_is_forwarded() {
        let mut t = Tracker::default();
        assert_eq!(t.key_down(&key("KeyX"), None), KeyDownOutcome::Forward);
        assert!(t.is_pressed(&KeyCode::from("KeyX")));
    }

    #[test]
    fn empty_code_is_ignored() {
        let mut t = Tracker::default();
        assert_eq!(t.key_down(&KeyArgs::default(), None), KeyDownOutcome::Ignored);
        assert_eq!(t.key_down(&key(""), None), KeyDownOutcome::Ignored);
        assert!(t.pressed_keys().is_empty());
    }

    #[test]
    fn key_up_releases() {
        let mut t = Tracker::default();
        t.key_down(&key("ShiftLeft"), None);
        assert!(t.is_shift_pressed());
        assert!(t.key_up(&KeyCode::SHIFT_LEFT));
        assert!(!t.is_shift_pressed());
        assert!(!t.key_up(&KeyCode::SHIFT_LEFT));
    }

    #[test]
    fn registration_is_canonicalized() {
        let mut t = Tracker::default();
        t.registry_mut().register("shift+ctrl+z", "redo", None);
        t.key_down(&key("ShiftLeft"), None);
        t.key_down(&key("ControlLeft"), None);
        assert_eq!(t.key_down(&key("KeyZ"), None), KeyDownOutcome::Binding("redo"));
        assert_eq!(t.registry_mut().unregister("Ctrl+Shift+Z", None), Some("redo"));
        assert!(t.registry().is_empty());
    }

    // --- Environments ---

    #[test]
    fn environments_are_isolated() {
        let mut r: HotkeyRegistry<u8> = HotkeyRegistry::new();
        assert_eq!(r.environment(), DEFAULT_ENVIRONMENT);
        r.register("Ctrl+C", 1, None);
        r.set_environment("viewer");
        assert!(!r.contains("Ctrl+C", None));
        r.register("Ctrl+C", 2, None);
        assert_eq!(r.lookup("Ctrl+C", None), Some(&2));
        r.set_environment(DEFAULT_ENVIRONMENT);
        assert_eq!(r.lookup("Ctrl+C", None), Some(&1));
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn len_counts_active_environment_only() {
        let mut r: HotkeyRegistry<u8> = HotkeyRegistry::new();
        assert_eq!(r.len(), 0);
        r.register("Ctrl+C", 1, None);
        r.register("Ctrl+C", 2, Some("pan"));
        assert_eq!(r.len(), 2);
        r.set_environment("viewer");
        assert_eq!(r.len(), 0);
        assert!(r.is_empty());
        r.set_environment(DEFAULT_ENVIRONMENT);
        assert_eq!(r.len(), 2);
    }

    // --- Text input filter ---

    #[test]
    fn text_input_filter() {
        let t = Tracker::default();
        assert!(t.accepts(&key("KeyA")));
        assert!(!t.accepts(&text_input("KeyA", false)));
        assert!(t.accepts(&text_input("Escape", false)));
        assert!(t.accepts(&text_input("ShiftLeft", false)));
        assert!(!t.accepts(&text_input("KeyZ", false)));
        assert!(t.accepts(&text_input("KeyZ", true)));
        assert!(!t.accepts(&text_input("KeyS", true)));
    }

    // --- Reconciliation ---

    #[test]
    fn released_modifier_flag_forces_key_up() {
        let mut t = Tracker::default();
        t.key_down(&key("ControlLeft"), None);
        t.key_down(&key("ShiftLeft"), None);
        let released = t.reconcile(
            ModifierFlags {
                ctrl: Some(false),
                shift: Some(true),
                ..ModifierFlags::default()
            },
            None,
        );
        assert_eq!(released, vec![KeyCode::CONTROL_LEFT]);
        assert!(!t.is_ctrl_pressed());
        assert!(t.is_shift_pressed());
    }

    #[test]
    fn unreported_flag_keeps_modifier() {
        let mut t = Tracker::default();
        t.key_down(&key("AltLeft"), None);
        assert!(t.reconcile(ModifierFlags::default(), None).is_empty());
        assert!(t.is_alt_pressed());
    }

    #[test]
    fn pressing_modifier_releases_stale_keys() {
        let mut t = Tracker::default();
        t.key_down(&key("ControlLeft"), None);
        t.key_down(&key("KeyA"), None);
        let released = t.reconcile(
            key_with("ControlLeft", true, false).modifiers,
            Some(&KeyCode::CONTROL_LEFT),
        );
        assert_eq!(released, vec![KeyCode::from("KeyA")]);
        assert_eq!(t.pressed_hotkey(), "Ctrl");
    }

    #[test]
    fn more_specific_binding_releases_other_keys() {
        let mut t = Tracker::default();
        t.registry_mut().register("Ctrl+B", "bold", None);
        t.key_down(&key("ControlLeft"), None);
        t.key_down(&key("KeyA"), None);
        let current = KeyCode::from("KeyB");
        let released = t.reconcile(key_with("KeyB", true, false).modifiers, Some(&current));
        assert_eq!(released, vec![KeyCode::from("KeyA")]);
        assert_eq!(t.key_down(&key("KeyB"), None), KeyDownOutcome::Binding("bold"));
    }

    #[test]
    fn other_keys_kept_without_shadowing_binding() {
        let mut t = Tracker::default();
        t.key_down(&key("ControlLeft"), None);
        t.key_down(&key("KeyA"), None);
        let current = KeyCode::from("KeyB");
        assert!(
            t.reconcile(key_with("KeyB", true, false).modifiers, Some(&current))
                .is_empty()
        );
    }

    #[test]
    fn pointer_reconcile_ignores_other_keys() {
        let mut t = Tracker::default();
        t.key_down(&key("KeyA"), None);
        assert!(t.reconcile(ModifierFlags::RELEASED, None).is_empty());
        assert!(t.is_pressed(&KeyCode::from("KeyA")));
    }

    #[test]
    fn meta_is_not_a_reconciled_modifier() {
        let mut t = Tracker::default();
        t.key_down(&key("MetaLeft"), None);
        assert!(t.reconcile(ModifierFlags::RELEASED, None).is_empty());
        assert_eq!(t.pressed_hotkey(), "Meta");
    }

    #[test]
    fn supports_keyboard_kinds_only() {
        assert!(Tracker::supports(EventKind::KeyPressed));
        assert!(!Tracker::supports(EventKind::MouseDown));
    }
}
