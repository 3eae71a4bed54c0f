#![forbid(unsafe_code)]

//! Raw device payloads handed to the input layer.
//!
//! These types describe what a platform adapter hands to Trellis for each
//! native pointer or keyboard notification. Every field that a platform may
//! fail to report is optional; the [`normalizer`](crate::normalizer) leaves
//! the corresponding semantic field unset instead of failing.
//!
//! # Design Notes
//!
//! - Pointer button codes follow the DOM convention: `0` primary, `1`
//!   auxiliary (middle), `2` secondary (right).
//! - [`ButtonMask`] mirrors the DOM `buttons` bitmask (primary = 1,
//!   secondary = 2, auxiliary = 4).
//! - Key codes are physical-key identifiers (`"KeyZ"`, `"ControlLeft"`),
//!   independent of keyboard layout.

use std::borrow::Cow;
use std::fmt;

use bitflags::bitflags;

// ---------------------------------------------------------------------------
// Platform
// ---------------------------------------------------------------------------

/// Host platform family, supplied by the embedding application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Platform {
    #[default]
    Windows,
    Mac,
    Linux,
    Unix,
    Ios,
    Android,
    Other,
}

impl Platform {
    /// Whether the Meta/Command key acts as the primary shortcut modifier.
    ///
    /// On these platforms Meta is reported as Ctrl and the physical Control
    /// key is ignored for hotkey purposes.
    #[must_use]
    pub const fn meta_is_primary(self) -> bool {
        matches!(self, Self::Mac | Self::Ios)
    }

    /// Lower-case name accepted by [`parse`](Self::parse).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Mac => "mac",
            Self::Linux => "linux",
            Self::Unix => "unix",
            Self::Ios => "ios",
            Self::Android => "android",
            Self::Other => "other",
        }
    }

    /// Parse a platform name (case-insensitive).
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let platform = match name.trim().to_ascii_lowercase().as_str() {
            "windows" | "win32" => Self::Windows,
            "mac" | "macos" | "macintosh" => Self::Mac,
            "linux" => Self::Linux,
            "unix" | "x11" => Self::Unix,
            "ios" => Self::Ios,
            "android" => Self::Android,
            "other" => Self::Other,
            _ => return None,
        };
        Some(platform)
    }
}

// ---------------------------------------------------------------------------
// Modifiers
// ---------------------------------------------------------------------------

bitflags! {
    /// Modifier classes a key code can belong to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// Modifier flags as reported by a native notification.
///
/// `None` means the platform did not report the flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ModifierFlags {
    pub alt: Option<bool>,
    pub ctrl: Option<bool>,
    pub shift: Option<bool>,
    pub meta: Option<bool>,
}

impl ModifierFlags {
    /// All flags reported as released.
    pub const RELEASED: Self = Self {
        alt: Some(false),
        ctrl: Some(false),
        shift: Some(false),
        meta: Some(false),
    };

    /// Build fully-reported flags from a [`Modifiers`] set.
    #[must_use]
    pub const fn from_held(held: Modifiers) -> Self {
        Self {
            alt: Some(held.contains(Modifiers::ALT)),
            ctrl: Some(held.contains(Modifiers::CTRL)),
            shift: Some(held.contains(Modifiers::SHIFT)),
            meta: Some(held.contains(Modifiers::SUPER)),
        }
    }
}

// ---------------------------------------------------------------------------
// Pointer
// ---------------------------------------------------------------------------

bitflags! {
    /// Bitmask of pointer buttons currently held.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ButtonMask: u8 {
        const NONE      = 0;
        /// Primary (usually left) button.
        const PRIMARY   = 1;
        /// Secondary (usually right) button.
        const SECONDARY = 2;
        /// Auxiliary (usually middle) button.
        const AUXILIARY = 4;
        /// Browser "back" button.
        const BACK      = 8;
        /// Browser "forward" button.
        const FORWARD   = 16;
    }
}

/// Pointer button identities tracked by the gesture state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left (primary) mouse button.
    Left,
    /// Middle (auxiliary) mouse button.
    Middle,
    /// Right (secondary) mouse button.
    Right,
}

impl MouseButton {
    /// All tracked buttons, in table order.
    pub const ALL: [Self; 3] = [Self::Left, Self::Middle, Self::Right];

    /// Map a DOM-style button code to an identity.
    #[must_use]
    pub const fn from_code(code: i16) -> Option<Self> {
        match code {
            0 => Some(Self::Left),
            1 => Some(Self::Middle),
            2 => Some(Self::Right),
            _ => None,
        }
    }

    /// Index into per-button tables.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Middle => 1,
            Self::Right => 2,
        }
    }
}

/// The kind of native pointer notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    Down,
    Up,
    Move,
    Wheel,
    Over,
    Out,
}

/// A native pointer notification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPointerEvent {
    /// What happened.
    pub kind: PointerEventKind,
    /// Button code that changed state (DOM `button`).
    pub button: Option<i16>,
    /// Buttons held after the change (DOM `buttons`).
    pub buttons: Option<ButtonMask>,
    /// Location relative to the interaction surface.
    pub location: Option<(f64, f64)>,
    /// Location relative to the document.
    pub page: Option<(f64, f64)>,
    /// Location relative to the viewport.
    pub client: Option<(f64, f64)>,
    /// Location relative to the screen.
    pub screen: Option<(f64, f64)>,
    /// Wheel delta, for wheel notifications.
    pub wheel_delta: Option<f64>,
    /// Modifier flags held during the notification.
    pub modifiers: ModifierFlags,
}

impl RawPointerEvent {
    /// Create a notification with every optional field absent.
    #[must_use]
    pub const fn new(kind: PointerEventKind) -> Self {
        Self {
            kind,
            button: None,
            buttons: None,
            location: None,
            page: None,
            client: None,
            screen: None,
            wheel_delta: None,
            modifiers: ModifierFlags {
                alt: None,
                ctrl: None,
                shift: None,
                meta: None,
            },
        }
    }

    /// Set the surface-relative location.
    #[must_use]
    pub const fn at(mut self, x: f64, y: f64) -> Self {
        self.location = Some((x, y));
        self
    }

    /// Set the changed button code.
    #[must_use]
    pub const fn with_button(mut self, code: i16) -> Self {
        self.button = Some(code);
        self
    }

    /// Set the held-buttons bitmask.
    #[must_use]
    pub const fn with_buttons(mut self, mask: ButtonMask) -> Self {
        self.buttons = Some(mask);
        self
    }

    /// Set the modifier flags.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: ModifierFlags) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Set the wheel delta.
    #[must_use]
    pub const fn with_wheel_delta(mut self, delta: f64) -> Self {
        self.wheel_delta = Some(delta);
        self
    }
}

// ---------------------------------------------------------------------------
// Keyboard
// ---------------------------------------------------------------------------

/// A physical key identifier such as `"KeyZ"` or `"ControlLeft"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyCode(Cow<'static, str>);

impl KeyCode {
    pub const CONTROL_LEFT: Self = Self::from_static("ControlLeft");
    pub const CONTROL_RIGHT: Self = Self::from_static("ControlRight");
    pub const ALT_LEFT: Self = Self::from_static("AltLeft");
    pub const ALT_RIGHT: Self = Self::from_static("AltRight");
    pub const SHIFT_LEFT: Self = Self::from_static("ShiftLeft");
    pub const SHIFT_RIGHT: Self = Self::from_static("ShiftRight");
    pub const META_LEFT: Self = Self::from_static("MetaLeft");
    pub const META_RIGHT: Self = Self::from_static("MetaRight");
    pub const ESCAPE: Self = Self::from_static("Escape");
    pub const TAB: Self = Self::from_static("Tab");
    pub const SPACE: Self = Self::from_static("Space");
    pub const ENTER: Self = Self::from_static("Enter");

    /// A key code from a static string.
    #[must_use]
    pub const fn from_static(code: &'static str) -> Self {
        Self(Cow::Borrowed(code))
    }

    /// A key code from any string.
    #[must_use]
    pub fn new(code: impl Into<Cow<'static, str>>) -> Self {
        Self(code.into())
    }

    /// The raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is empty (an ignored key).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The modifier class of this key, if it is a modifier key.
    #[must_use]
    pub fn modifier(&self) -> Option<Modifiers> {
        match self.as_str() {
            "ControlLeft" | "ControlRight" => Some(Modifiers::CTRL),
            "AltLeft" | "AltRight" => Some(Modifiers::ALT),
            "ShiftLeft" | "ShiftRight" => Some(Modifiers::SHIFT),
            "MetaLeft" | "MetaRight" => Some(Modifiers::SUPER),
            _ => None,
        }
    }

    /// Name of this key inside a hotkey string (`"KeyZ"` → `"Z"`).
    ///
    /// Returns `None` for keys that never take part in hotkeys.
    #[must_use]
    pub fn hotkey_name(&self) -> Option<&str> {
        let code = self.as_str();
        if let Some(modifier) = self.modifier() {
            return Some(modifier_name(modifier));
        }
        if let Some(letter) = code.strip_prefix("Key")
            && letter.len() == 1
        {
            return Some(letter);
        }
        if let Some(digit) = code.strip_prefix("Digit")
            && digit.len() == 1
        {
            return Some(digit);
        }
        if let Some(arrow) = code.strip_prefix("Arrow") {
            return Some(arrow);
        }
        if code.len() >= 2
            && code.starts_with('F')
            && code[1..].chars().all(|c| c.is_ascii_digit())
        {
            return Some(code);
        }
        if code.starts_with("Numpad") {
            return Some(code);
        }
        let name = match code {
            "Escape" => "Esc",
            "Enter" | "Tab" | "Space" | "Backspace" | "Delete" | "Insert" | "Home" | "End"
            | "PageUp" | "PageDown" => code,
            "Minus" => "-",
            "Equal" => "=",
            "BracketLeft" => "[",
            "BracketRight" => "]",
            "Semicolon" => ";",
            "Quote" => "'",
            "Comma" => ",",
            "Period" => ".",
            "Slash" => "/",
            "Backslash" => "\\",
            "Backquote" => "`",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for KeyCode {
    fn from(code: &'static str) -> Self {
        Self::from_static(code)
    }
}

impl From<String> for KeyCode {
    fn from(code: String) -> Self {
        Self(Cow::Owned(code))
    }
}

/// Hotkey-string name of a single modifier class.
#[must_use]
pub const fn modifier_name(modifier: Modifiers) -> &'static str {
    if modifier.contains(Modifiers::CTRL) {
        "Ctrl"
    } else if modifier.contains(Modifiers::ALT) {
        "Alt"
    } else if modifier.contains(Modifiers::SHIFT) {
        "Shift"
    } else {
        "Meta"
    }
}

/// The kind of native keyboard notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEventKind {
    Down,
    Up,
    /// Character-producing press (fires after `Down`).
    Pressed,
}

/// Where keyboard focus was when the notification fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FocusTarget {
    /// The interaction surface itself.
    #[default]
    Surface,
    /// A text-input-like element (text field, text area).
    TextInput,
}

/// A native keyboard notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawKeyEvent {
    pub kind: KeyEventKind,
    /// Physical key identifier, if reported.
    pub code: Option<KeyCode>,
    pub modifiers: ModifierFlags,
    pub target: FocusTarget,
}

impl RawKeyEvent {
    /// Create a notification for `code` with no modifier information.
    #[must_use]
    pub fn new(kind: KeyEventKind, code: impl Into<KeyCode>) -> Self {
        Self {
            kind,
            code: Some(code.into()),
            modifiers: ModifierFlags::default(),
            target: FocusTarget::Surface,
        }
    }

    /// Set the modifier flags.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: ModifierFlags) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Set the focus target.
    #[must_use]
    pub fn with_target(mut self, target: FocusTarget) -> Self {
        self.target = target;
        self
    }
}
