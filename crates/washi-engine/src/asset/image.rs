use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use glam::Vec2;

/// Error produced while turning bytes into an [`ImageData`].
#[derive(Debug, Clone, PartialEq)]
pub enum ImageError {
    /// The file could not be read or decoded.
    Decode { path: PathBuf, message: String },
    /// Raw pixel buffer length does not match `width * height * 4`.
    InvalidDimensions { width: u32, height: u32, len: usize },
    /// The decode worker could not be started.
    Spawn { message: String },
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode { path, message } => {
                write!(f, "failed to load image {}: {message}", path.display())
            }
            Self::InvalidDimensions { width, height, len } => write!(
                f,
                "rgba8 buffer of {len} bytes does not match {width}x{height}"
            ),
            Self::Spawn { message } => write!(f, "failed to start image loader: {message}"),
        }
    }
}

impl std::error::Error for ImageError {}

/// Decoded RGBA8 pixels, row 0 at the top.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl ImageData {
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, ImageError> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(ImageError::InvalidDimensions { width, height, len: pixels.len() });
        }
        Ok(Self { width, height, pixels })
    }

    /// Builds an image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [u8; 4]) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&f(x, y));
            }
        }
        Self { width, height, pixels }
    }

    fn decode(path: &Path) -> Result<Self, ImageError> {
        let img = image::open(path).map_err(|e| ImageError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba8(width, height, rgba.into_raw())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Texel at integer coordinates, normalized to `[0, 1]`, clamped to the edge.
    pub fn texel(&self, x: i64, y: i64) -> [f32; 4] {
        let x = x.clamp(0, self.width as i64 - 1) as usize;
        let y = y.clamp(0, self.height as i64 - 1) as usize;
        let i = (y * self.width as usize + x) * 4;
        let p = &self.pixels[i..i + 4];
        [
            p[0] as f32 / 255.0,
            p[1] as f32 / 255.0,
            p[2] as f32 / 255.0,
            p[3] as f32 / 255.0,
        ]
    }

    /// Bilinear, clamp-to-edge sample.
    ///
    /// `uv` has its origin at the bottom-left like surface texture coordinates;
    /// the GPU path flips `v` the same way before sampling.
    pub fn sample(&self, uv: Vec2) -> [f32; 4] {
        let x = uv.x * self.width as f32 - 0.5;
        let y = (1.0 - uv.y) * self.height as f32 - 0.5;

        let x0 = x.floor();
        let y0 = y.floor();
        let tx = x - x0;
        let ty = y - y0;
        let (x0, y0) = (x0 as i64, y0 as i64);

        let a = self.texel(x0, y0);
        let b = self.texel(x0 + 1, y0);
        let c = self.texel(x0, y0 + 1);
        let d = self.texel(x0 + 1, y0 + 1);

        let mut out = [0.0; 4];
        for i in 0..4 {
            let top = a[i] + (b[i] - a[i]) * tx;
            let bottom = c[i] + (d[i] - c[i]) * tx;
            out[i] = top + (bottom - top) * ty;
        }
        out
    }
}

/// Stable identity of an image slot, used as a GPU texture cache key.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ImageId(u64);

static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

/// Observable load state of an [`ImageHandle`].
#[derive(Debug, Clone)]
pub enum ImageState {
    Pending,
    Ready(Arc<ImageData>),
    Failed(ImageError),
}

#[derive(Debug)]
struct ImageSlot {
    id: ImageId,
    label: String,
    result: OnceLock<Result<Arc<ImageData>, ImageError>>,
}

/// Shared handle to an image that may still be loading.
///
/// Cloning is cheap; all clones observe the same slot. A handle whose load has
/// not resolved samples as fully transparent, which makes distance-field
/// materials invisible rather than wrong.
#[derive(Debug, Clone)]
pub struct ImageHandle {
    slot: Arc<ImageSlot>,
}

impl ImageHandle {
    fn pending(label: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(ImageSlot {
                id: ImageId(NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed)),
                label: label.into(),
                result: OnceLock::new(),
            }),
        }
    }

    /// A handle that is ready immediately.
    pub fn ready(label: impl Into<String>, data: ImageData) -> Self {
        let handle = Self::pending(label);
        handle.resolve(Ok(data));
        handle
    }

    /// A ready handle over an in-memory RGBA8 buffer.
    pub fn from_rgba8(
        label: impl Into<String>,
        width: u32,
        height: u32,
        pixels: Vec<u8>,
    ) -> Result<Self, ImageError> {
        Ok(Self::ready(label, ImageData::from_rgba8(width, height, pixels)?))
    }

    fn resolve(&self, result: Result<ImageData, ImageError>) {
        if self.slot.result.set(result.map(Arc::new)).is_err() {
            log::warn!("image '{}' resolved twice; keeping the first result", self.slot.label);
        }
    }

    pub fn id(&self) -> ImageId {
        self.slot.id
    }

    pub fn label(&self) -> &str {
        &self.slot.label
    }

    pub fn state(&self) -> ImageState {
        match self.slot.result.get() {
            None => ImageState::Pending,
            Some(Ok(data)) => ImageState::Ready(data.clone()),
            Some(Err(e)) => ImageState::Failed(e.clone()),
        }
    }

    /// Decoded pixels, if the load finished successfully.
    pub fn data(&self) -> Option<&ImageData> {
        match self.slot.result.get() {
            Some(Ok(data)) => Some(data),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.data().is_some()
    }

    pub fn width(&self) -> Option<u32> {
        self.data().map(ImageData::width)
    }

    pub fn height(&self) -> Option<u32> {
        self.data().map(ImageData::height)
    }

    /// Samples the image, or returns transparent black while it is unavailable.
    pub fn sample(&self, uv: Vec2) -> [f32; 4] {
        self.data().map_or([0.0; 4], |d| d.sample(uv))
    }
}

impl PartialEq for ImageHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }
}

/// Resolves asset paths into [`ImageHandle`]s without blocking the caller.
///
/// Each load decodes on its own short-lived worker thread. There is no
/// cancellation: a load outliving the scene that requested it still finishes,
/// and its result lands in a slot nobody samples any more.
#[derive(Debug, Clone)]
pub struct ImageLoader {
    root: PathBuf,
}

impl ImageLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Starts loading `path` (relative to the loader root) and returns at once.
    pub fn load(&self, path: impl AsRef<Path>) -> ImageHandle {
        let full = self.root.join(path.as_ref());
        let handle = ImageHandle::pending(full.display().to_string());
        let worker = handle.clone();

        let spawned = std::thread::Builder::new()
            .name("washi-image-loader".to_string())
            .spawn(move || {
                let result = ImageData::decode(&full);
                match &result {
                    Ok(data) => log::debug!(
                        "loaded image {} ({}x{})",
                        full.display(),
                        data.width(),
                        data.height()
                    ),
                    Err(e) => log::warn!("{e}; material will render transparent"),
                }
                worker.resolve(result);
            });

        if let Err(e) = spawned {
            let err = ImageError::Spawn { message: e.to_string() };
            log::warn!("{err}");
            handle.resolve(Err(err));
        }

        handle
    }

    /// Blocks until `handle` leaves the pending state or `timeout` elapses.
    ///
    /// Intended for tools and tests; the render loop never waits on loads.
    pub fn wait(handle: &ImageHandle, timeout: std::time::Duration) -> ImageState {
        let deadline = std::time::Instant::now() + timeout;
        loop {
            let state = handle.state();
            if !matches!(state, ImageState::Pending) || std::time::Instant::now() >= deadline {
                return state;
            }
            std::thread::sleep(std::time::Duration::from_millis(2));
        }
    }
}
