//! Paint model shared between materials and renderers.
//!
//! Colors are linear and premultiplied everywhere.

pub mod color;

pub use color::Color;
