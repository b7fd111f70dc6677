//! Display-space geometry.
//!
//! Scene geometry uses `glam` types; this module only carries the window
//! viewport the lifecycle manager sizes surfaces and cameras from.

mod viewport;

pub use viewport::Viewport;
