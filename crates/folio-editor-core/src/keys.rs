//! Key presses as the editor sees them.
//!
//! Hosts translate their native keyboard events into [`KeyInput`] before
//! calling [`Editor::on_key_down`](crate::Editor::on_key_down).

use smol_str::SmolStr;

/// The keys the editor distinguishes. Anything else arrives as
/// `Character` or `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Character(SmolStr),
    Enter,
    Tab,
    Backspace,
    Delete,
    Escape,
    Arrow(Direction),
    Home,
    End,
    PageUp,
    PageDown,
    /// A bare modifier press (Shift, Control, Alt, Meta, CapsLock...).
    Modifier,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Key {
    pub fn character(s: impl Into<SmolStr>) -> Self {
        Self::Character(s.into())
    }

    /// Keys that move the caret without editing.
    pub fn moves_caret(&self) -> bool {
        matches!(
            self,
            Self::Arrow(_) | Self::Home | Self::End | Self::PageUp | Self::PageDown
        )
    }

    pub fn is_modifier(&self) -> bool {
        matches!(self, Self::Modifier)
    }
}

/// Held modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    /// Command on macOS, Control elsewhere. Either counts.
    pub fn cmd_or_ctrl(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyInput {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyInput {
    pub fn new(key: Key) -> Self {
        Self::with_modifiers(key, Modifiers::NONE)
    }

    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn shift(key: Key) -> Self {
        Self::with_modifiers(key, Modifiers::NONE.with_shift())
    }

    pub fn ctrl(key: Key) -> Self {
        Self::with_modifiers(key, Modifiers::NONE.with_ctrl())
    }

    pub fn character(s: impl Into<SmolStr>) -> Self {
        Self::new(Key::character(s))
    }
}

/// What the host should do with the native event after `on_key_down`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeydownResult {
    /// The editor applied an action; suppress the default.
    Handled,
    /// Let the surface perform its default edit.
    NotHandled,
    /// Bare modifier; nothing was recorded.
    PassThrough,
}
