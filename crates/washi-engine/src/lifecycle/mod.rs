//! Scene lifecycle.
//!
//! [`LifecycleManager`] owns exactly one active scene and the render surface
//! it draws on. It creates and attaches a fresh surface for each scene,
//! forwards resize and input events, swaps scenes on keyboard triggers looked
//! up in a [`SceneRegistry`], and tears everything down in a fixed order:
//! detach, unlisten, release.

mod display;
mod manager;
mod registry;

pub use display::{Display, DisplayEvent, ListenerId, ListenerKind, Listeners, RenderSurface};
pub use manager::{LifecycleManager, SceneHandle, SceneState};
pub use registry::{SceneFactory, SceneRegistry};
