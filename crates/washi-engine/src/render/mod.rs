//! GPU rendering subsystem.
//!
//! [`MeshRenderer`] turns a scene [`Stage`](crate::scene::Stage) into draw
//! calls. GPU objects (pipelines, uniform buffers, textures) are created lazily
//! on first use and owned by the renderer; dropping or releasing it frees them.
//!
//! Convention:
//! - right-handed world space, +Y up, camera looks down -Z
//! - colors are linear premultiplied, blended with `One, OneMinusSrcAlpha`

mod common;
mod ctx;
mod mesh_renderer;
mod program;

pub use ctx::{RenderCtx, RenderTarget};
pub use mesh_renderer::MeshRenderer;
pub use program::{pass_through, ProgramKind, VertexOutput};

pub(crate) use common::{to_wgpu_color, DEPTH_FORMAT};
