//! Engine-wide control types shared by the runtime, lifecycle and scenes.

mod app;

pub use app::AppControl;
