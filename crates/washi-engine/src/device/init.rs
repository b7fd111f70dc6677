/// Device and swapchain settings applied to every [`Gpu`](super::Gpu).
///
/// Unsupported preferences (alpha mode, sRGB) fall back to what the surface
/// offers instead of failing.
#[derive(Debug, Clone)]
pub struct GpuInit {
    pub backends: wgpu::Backends,
    pub power_preference: wgpu::PowerPreference,

    /// Use a software adapter. For machines without a usable GPU.
    pub force_fallback_adapter: bool,

    /// Material colors are computed in linear space; an sRGB target encodes
    /// them on write.
    pub prefer_srgb: bool,

    /// FIFO paces the frame loop to the display refresh.
    pub present_mode: wgpu::PresentMode,

    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    pub required_features: wgpu::Features,
    pub required_limits: wgpu::Limits,

    /// Swapchain depth hint.
    pub desired_maximum_frame_latency: u32,
}

impl GpuInit {
    /// Defaults on a software adapter with downlevel limits.
    pub fn software() -> Self {
        Self {
            force_fallback_adapter: true,
            power_preference: wgpu::PowerPreference::LowPower,
            required_limits: wgpu::Limits::downlevel_defaults(),
            ..Self::default()
        }
    }
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}
