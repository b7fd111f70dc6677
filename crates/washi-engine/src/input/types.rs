use std::fmt;

/// Keyboard key identifier.
///
/// Only keys the viewer reacts to are named. Everything else maps to
/// `Key::Unknown` carrying the platform key code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Space,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    /// Letter key `'a'..='z'`, stored lowercase.
    Letter(char),
    /// Digit key `0..=9`.
    Digit(u8),

    Unknown(u32),
}

impl Key {
    /// The character a scene trigger is registered under, if this key has one.
    pub fn trigger_symbol(self) -> Option<char> {
        match self {
            Key::Letter(c) if c.is_ascii_lowercase() => Some(c),
            Key::Digit(d) if d <= 9 => char::from_digit(u32::from(d), 10),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.trigger_symbol() {
            Some(c) => write!(f, "{c}"),
            None => write!(f, "{self:?}"),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MouseButtonState {
    Pressed,
    Released,
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// `Line` is notched wheel input; `Pixel` is touchpad-precision.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MouseWheelDelta {
    Line { x: f32, y: f32 },
    Pixel { x: f32, y: f32 },
}

impl MouseWheelDelta {
    /// Vertical scroll in lines, treating 40 logical pixels as one line.
    pub fn lines_y(self) -> f32 {
        match self {
            MouseWheelDelta::Line { y, .. } => y,
            MouseWheelDelta::Pixel { y, .. } => y / 40.0,
        }
    }
}

/// Platform-agnostic input events. Positions are logical pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    ModifiersChanged(Modifiers),

    Key {
        key: Key,
        state: KeyState,
        modifiers: Modifiers,
        repeat: bool,
    },

    PointerMoved {
        x: f32,
        y: f32,
    },

    PointerButton {
        button: MouseButton,
        state: MouseButtonState,
        x: f32,
        y: f32,
    },

    MouseWheel {
        delta: MouseWheelDelta,
        modifiers: Modifiers,
    },

    PointerLeft,

    Focused(bool),
}
