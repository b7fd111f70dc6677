//! Asset loading.
//!
//! Only images are loaded: distance-field layers are PNGs decoded with the
//! `image` crate off the render thread.

mod image;

pub use self::image::{ImageData, ImageError, ImageHandle, ImageId, ImageLoader, ImageState};
