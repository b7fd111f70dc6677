use std::collections::HashSet;

use super::types::{InputEvent, Key, KeyState, Modifiers, MouseButton, MouseButtonState};

/// Pointer motion while the primary button is held, in logical pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Drag {
    pub dx: f32,
    pub dy: f32,
}

/// Held keys and buttons plus the last pointer position.
///
/// The runtime keeps one to fill in modifiers and positions during
/// translation; scenes keep their own to turn pointer motion into drags.
#[derive(Debug, Default)]
pub struct InputState {
    pub modifiers: Modifiers,
    pub focused: bool,
    pub pointer_pos: Option<(f32, f32)>,
    pub keys_down: HashSet<Key>,
    pub buttons_down: HashSet<MouseButton>,
}

impl InputState {
    /// Folds `ev` into the state. Returns the drag step when `ev` moved the
    /// pointer with the left button held.
    pub fn apply_event(&mut self, ev: &InputEvent) -> Option<Drag> {
        match ev {
            InputEvent::ModifiersChanged(m) => self.modifiers = *m,

            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // Releases are not delivered to unfocused windows.
                    self.keys_down.clear();
                    self.buttons_down.clear();
                }
            }

            InputEvent::PointerMoved { x, y } => {
                let prev = self.pointer_pos.replace((*x, *y));
                if self.button_down(MouseButton::Left) {
                    if let Some((px, py)) = prev {
                        return Some(Drag { dx: x - px, dy: y - py });
                    }
                }
            }

            InputEvent::PointerLeft => self.pointer_pos = None,

            InputEvent::Key { key, state, modifiers, .. } => {
                self.modifiers = *modifiers;
                match state {
                    KeyState::Pressed => self.keys_down.insert(*key),
                    KeyState::Released => self.keys_down.remove(key),
                };
            }

            InputEvent::PointerButton { button, state, x, y } => {
                self.pointer_pos = Some((*x, *y));
                match state {
                    MouseButtonState::Pressed => self.buttons_down.insert(*button),
                    MouseButtonState::Released => self.buttons_down.remove(button),
                };
            }

            InputEvent::MouseWheel { modifiers, .. } => self.modifiers = *modifiers,
        }
        None
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn button_down(&self, btn: MouseButton) -> bool {
        self.buttons_down.contains(&btn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(button: MouseButton, x: f32, y: f32) -> InputEvent {
        InputEvent::PointerButton { button, state: MouseButtonState::Pressed, x, y }
    }

    #[test]
    fn drag_reports_motion_only_while_left_is_held() {
        let mut s = InputState::default();
        assert_eq!(s.apply_event(&InputEvent::PointerMoved { x: 5.0, y: 5.0 }), None);

        s.apply_event(&press(MouseButton::Left, 10.0, 10.0));
        let drag = s.apply_event(&InputEvent::PointerMoved { x: 14.0, y: 7.0 });
        assert_eq!(drag, Some(Drag { dx: 4.0, dy: -3.0 }));

        s.apply_event(&InputEvent::PointerButton {
            button: MouseButton::Left,
            state: MouseButtonState::Released,
            x: 14.0,
            y: 7.0,
        });
        assert_eq!(s.apply_event(&InputEvent::PointerMoved { x: 20.0, y: 7.0 }), None);
    }

    #[test]
    fn focus_loss_clears_held_input() {
        let mut s = InputState::default();
        s.apply_event(&press(MouseButton::Right, 0.0, 0.0));
        s.apply_event(&InputEvent::Key {
            key: Key::Space,
            state: KeyState::Pressed,
            modifiers: Modifiers::default(),
            repeat: false,
        });
        assert!(s.key_down(Key::Space));

        s.apply_event(&InputEvent::Focused(false));
        assert!(!s.key_down(Key::Space));
        assert!(!s.button_down(MouseButton::Right));
    }
}
