//! GPU device + surface management.
//!
//! [`Gpu`] is the native render surface the lifecycle manager hands to
//! scenes: a wgpu device, a window swapchain and a depth buffer. A new one is
//! created for every scene start and dropped when the scene is released.

mod gpu;
mod init;
mod surface;

pub use gpu::Gpu;
pub use init::GpuInit;
pub use surface::SurfaceErrorAction;
