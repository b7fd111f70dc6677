//! Washi engine crate.
//!
//! Scene lifecycle on top of a winit + wgpu runtime, and the procedural
//! materials (pattern and distance-field) the viewer's scenes are built from.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod asset;
pub mod coords;
pub mod lifecycle;
pub mod logging;
pub mod material;
pub mod paint;
pub mod render;
pub mod scene;
