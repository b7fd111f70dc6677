use crate::coords::Viewport;
use crate::input::InputEvent;

/// A drawable surface the lifecycle manager can size.
pub trait RenderSurface {
    fn viewport(&self) -> Viewport;

    /// Resizes to `width × height` logical pixels.
    fn set_size(&mut self, width: f32, height: f32);

    fn set_pixel_ratio(&mut self, ratio: f32);
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ListenerKind {
    Resize,
    Input,
    Trigger,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ListenerId(u64);

/// Listener bookkeeping for [`Display`] implementations.
#[derive(Debug, Default)]
pub struct Listeners {
    next: u64,
    active: Vec<(ListenerId, ListenerKind)>,
}

impl Listeners {
    pub fn add(&mut self, kind: ListenerKind) -> ListenerId {
        self.next += 1;
        let id = ListenerId(self.next);
        self.active.push((id, kind));
        id
    }

    /// Returns `false` if `id` was not registered.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.active.len();
        self.active.retain(|(i, _)| *i != id);
        self.active.len() != before
    }

    pub fn count(&self, kind: ListenerKind) -> usize {
        self.active.iter().filter(|(_, k)| *k == kind).count()
    }

    pub fn is_listening(&self, kind: ListenerKind) -> bool {
        self.count(kind) > 0
    }
}

/// Events a display delivers to the lifecycle manager.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayEvent {
    /// The visible area changed; carries the new logical size and density.
    Resized(Viewport),
    /// A scene-selection symbol was typed.
    Trigger(char),
    /// Any other input, forwarded to the active scene.
    Input(InputEvent),
}

impl DisplayEvent {
    pub fn kind(&self) -> ListenerKind {
        match self {
            DisplayEvent::Resized(_) => ListenerKind::Resize,
            DisplayEvent::Trigger(_) => ListenerKind::Trigger,
            DisplayEvent::Input(_) => ListenerKind::Input,
        }
    }
}

/// Where render surfaces come from and where events are listened for.
///
/// The native implementation wraps a `winit` window; tests use a headless one.
pub trait Display {
    type Surface: RenderSurface;

    /// Current visible area.
    fn viewport(&self) -> Viewport;

    fn create_surface(&mut self, viewport: Viewport) -> anyhow::Result<Self::Surface>;

    /// Makes `surface` the one presented to the screen.
    fn attach(&mut self, surface: &mut Self::Surface);

    fn detach(&mut self, surface: &mut Self::Surface);

    fn add_listener(&mut self, kind: ListenerKind) -> ListenerId;

    fn remove_listener(&mut self, id: ListenerId);

    fn listener_count(&self, kind: ListenerKind) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listeners_count_by_kind() {
        let mut l = Listeners::default();
        let a = l.add(ListenerKind::Resize);
        let b = l.add(ListenerKind::Resize);
        l.add(ListenerKind::Trigger);
        assert_eq!(l.count(ListenerKind::Resize), 2);
        assert!(l.remove(a));
        assert!(!l.remove(a));
        assert_eq!(l.count(ListenerKind::Resize), 1);
        assert!(l.remove(b));
        assert!(!l.is_listening(ListenerKind::Resize));
        assert!(l.is_listening(ListenerKind::Trigger));
    }
}
