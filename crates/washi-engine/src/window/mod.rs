//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and window, and adapts them to the lifecycle
//! [`Display`](crate::lifecycle::Display) contract.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig, WindowDisplay};
