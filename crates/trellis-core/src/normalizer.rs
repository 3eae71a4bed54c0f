#![forbid(unsafe_code)]

//! Raw notification → semantic argument conversion.
//!
//! [`InputNormalizer`] is tolerant of any absent field: a missing coordinate
//! stays `None`, a missing modifier flag stays unreported, a missing button
//! code reads as the primary button.
//!
//! On platforms where Meta is the primary shortcut modifier
//! ([`Platform::meta_is_primary`]) the normalizer:
//! - reports a held Meta as Ctrl,
//! - maps `MetaLeft`/`MetaRight` key codes to `ControlLeft`/`ControlRight`,
//! - drops the physical `ControlLeft`/`ControlRight` codes (empty code).

use crate::event::{
    ButtonMask, FocusTarget, KeyCode, KeyEventKind, ModifierFlags, MouseButton, Platform,
    PointerEventKind, RawKeyEvent, RawPointerEvent,
};
use crate::semantic_event::{EventKind, KeyArgs, MouseArgs, Position, SemanticEvent};

/// A pointer notification after normalization, before button classification.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPointer {
    pub kind: PointerEventKind,
    /// Button code as reported (DOM `button`).
    pub code: Option<i16>,
    /// Held-buttons mask as reported (DOM `buttons`).
    pub mask: Option<ButtonMask>,
    /// Semantic arguments; `args.button` reflects the code alone.
    pub args: MouseArgs,
}

impl NormalizedPointer {
    /// Semantic kind this notification maps to.
    #[must_use]
    pub const fn event_kind(&self) -> EventKind {
        pointer_event_kind(self.kind)
    }
}

/// Semantic kind for a native pointer kind.
#[must_use]
pub const fn pointer_event_kind(kind: PointerEventKind) -> EventKind {
    match kind {
        PointerEventKind::Down => EventKind::MouseDown,
        PointerEventKind::Up => EventKind::MouseUp,
        PointerEventKind::Move => EventKind::MouseMove,
        PointerEventKind::Wheel => EventKind::Wheel,
        PointerEventKind::Over => EventKind::MouseOver,
        PointerEventKind::Out => EventKind::MouseOut,
    }
}

/// Semantic kind for a native keyboard kind.
#[must_use]
pub const fn key_event_kind(kind: KeyEventKind) -> EventKind {
    match kind {
        KeyEventKind::Down => EventKind::KeyDown,
        KeyEventKind::Up => EventKind::KeyUp,
        KeyEventKind::Pressed => EventKind::KeyPressed,
    }
}

/// Converts raw notifications into semantic arguments for one platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputNormalizer {
    platform: Platform,
}

impl InputNormalizer {
    /// Create a normalizer for `platform`.
    #[must_use]
    pub const fn new(platform: Platform) -> Self {
        Self { platform }
    }

    /// The platform this normalizer remaps for.
    #[must_use]
    pub const fn platform(&self) -> Platform {
        self.platform
    }

    /// Normalize a pointer notification.
    #[must_use]
    pub fn pointer(&self, raw: &RawPointerEvent) -> NormalizedPointer {
        let button = MouseButton::from_code(raw.button.unwrap_or(0));
        let args = MouseArgs {
            button,
            location: raw.location.map(Position::from),
            page: raw.page.map(Position::from),
            client: raw.client.map(Position::from),
            screen: raw.screen.map(Position::from),
            wheel_delta: raw.wheel_delta,
            modifiers: self.pointer_modifiers(raw.modifiers),
        };
        NormalizedPointer {
            kind: raw.kind,
            code: raw.button,
            mask: raw.buttons,
            args,
        }
    }

    /// Normalize a keyboard notification into a semantic event.
    #[must_use]
    pub fn key(&self, raw: &RawKeyEvent) -> SemanticEvent {
        let args = KeyArgs {
            code: self.key_code(raw.code.as_ref()),
            modifiers: self.key_modifiers(raw.modifiers),
            target: raw.target,
        };
        SemanticEvent::key(key_event_kind(raw.kind), args)
    }

    /// Pointer modifier flags. A held Meta sets Ctrl; a released Meta leaves
    /// Ctrl as reported.
    #[must_use]
    pub fn pointer_modifiers(&self, mut flags: ModifierFlags) -> ModifierFlags {
        if self.platform.meta_is_primary() && flags.meta == Some(true) {
            flags.ctrl = Some(true);
        }
        flags
    }

    /// Keyboard modifier flags. A reported Meta state replaces Ctrl.
    #[must_use]
    pub fn key_modifiers(&self, mut flags: ModifierFlags) -> ModifierFlags {
        if self.platform.meta_is_primary() && flags.meta.is_some() {
            flags.ctrl = flags.meta;
        }
        flags
    }

    /// Platform key-code remap. `None` means the key is ignored.
    #[must_use]
    pub fn key_code(&self, code: Option<&KeyCode>) -> Option<KeyCode> {
        let code = code.filter(|code| !code.is_empty())?;
        if !self.platform.meta_is_primary() {
            return Some(code.clone());
        }
        if *code == KeyCode::META_LEFT {
            Some(KeyCode::CONTROL_LEFT)
        } else if *code == KeyCode::META_RIGHT {
            Some(KeyCode::CONTROL_RIGHT)
        } else if *code == KeyCode::CONTROL_LEFT || *code == KeyCode::CONTROL_RIGHT {
            None
        } else {
            Some(code.clone())
        }
    }

    /// Whether a key notification targets a text-input-like element.
    #[must_use]
    pub fn is_text_input(raw: &RawKeyEvent) -> bool {
        raw.target == FocusTarget::TextInput
    }
}
