//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types. The
//! runtime translates window events through `platform`.

pub(crate) mod platform;
mod state;
mod types;

pub use state::{Drag, InputState};
pub use types::{
    InputEvent, Key, KeyState, Modifiers, MouseButton, MouseButtonState, MouseWheelDelta,
};
