//! Texture loading and caching for materials.
//!
//! Textures are decoded once into linear float RGB and shared between
//! materials through `Arc`. The ray tracer samples them on the CPU; the
//! raster contract only records that a texture is bound.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lumen_math::{Vec2, Vec3};
use thiserror::Error;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to open texture {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Texture {0} has no pixels")]
    Empty(String),
}

pub type TextureResult<T> = Result<T, TextureError>;

/// Magnification filter used by [`Texture::lookup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureFilter {
    Nearest,
    #[default]
    Linear,
}

/// How coordinates outside [0, 1] are brought back into the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    #[default]
    Repeat,
    Clamp,
}

/// A decoded RGB texture.
///
/// Pixels are stored row-major with row 0 at the top of the image, so the
/// sampling functions flip `v` to put (0, 0) at the bottom-left.
#[derive(Clone, Debug)]
pub struct Texture {
    width: u32,
    height: u32,
    pixels: Vec<Vec3>,
    name: String,
    filter: TextureFilter,
    wrap: WrapMode,
}

impl Texture {
    /// Create a texture from linear RGB pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<Vec3>, name: impl Into<String>) -> TextureResult<Self> {
        let name = name.into();
        if width == 0 || height == 0 || pixels.len() != width as usize * height as usize {
            return Err(TextureError::Empty(name));
        }
        Ok(Self {
            width,
            height,
            pixels,
            name,
            filter: TextureFilter::default(),
            wrap: WrapMode::default(),
        })
    }

    /// Create a solid color texture (1x1).
    pub fn solid_color(color: Vec3) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![color],
            name: "<solid>".to_string(),
            filter: TextureFilter::default(),
            wrap: WrapMode::default(),
        }
    }

    /// Procedural checkerboard with `cells` squares along each side.
    pub fn checker(size: u32, cells: u32, a: Vec3, b: Vec3) -> Self {
        let size = size.max(1);
        let cell = (size / cells.max(1)).max(1);
        let pixels = (0..size * size)
            .map(|i| {
                let (x, y) = (i % size, i / size);
                if ((x / cell) + (y / cell)) % 2 == 0 {
                    a
                } else {
                    b
                }
            })
            .collect();
        Self {
            width: size,
            height: size,
            pixels,
            name: format!("<checker {}>", cells),
            filter: TextureFilter::default(),
            wrap: WrapMode::default(),
        }
    }

    /// Load and decode an image file.
    pub fn load(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| TextureError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let rgb = img.to_rgb32f();
        let (width, height) = rgb.dimensions();
        let pixels = rgb.pixels().map(|p| Vec3::new(p[0], p[1], p[2])).collect();

        Self::new(width, height, pixels, path.to_string_lossy())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn filter(&self) -> TextureFilter {
        self.filter
    }

    pub fn wrap(&self) -> WrapMode {
        self.wrap
    }

    pub fn set_filter(&mut self, filter: TextureFilter) {
        self.filter = filter;
    }

    pub fn set_wrap(&mut self, wrap: WrapMode) {
        self.wrap = wrap;
    }

    /// Set the magnification filter (builder pattern)
    pub fn with_filter(mut self, filter: TextureFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Set the wrap mode (builder pattern)
    pub fn with_wrap(mut self, wrap: WrapMode) -> Self {
        self.wrap = wrap;
        self
    }

    /// Look up `uv` with this texture's filter and wrap mode.
    ///
    /// (0, 0) is the bottom-left corner of the image.
    pub fn lookup(&self, uv: Vec2) -> Vec3 {
        match self.filter {
            TextureFilter::Nearest => self.sample_nearest(uv.x, uv.y),
            TextureFilter::Linear => self.sample(uv.x, uv.y),
        }
    }

    /// Bilinear sample, wrapped by this texture's wrap mode.
    pub fn sample(&self, u: f32, v: f32) -> Vec3 {
        let (u, v) = self.wrap_coords(u, v);

        let x = u * (self.width - 1) as f32;
        let y = (1.0 - v) * (self.height - 1) as f32;

        let x0 = x.floor() as u32;
        let y0 = y.floor() as u32;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);

        let fx = x.fract();
        let fy = y.fract();

        let top = self.texel(x0, y0).lerp(self.texel(x1, y0), fx);
        let bottom = self.texel(x0, y1).lerp(self.texel(x1, y1), fx);
        top.lerp(bottom, fy)
    }

    /// Nearest texel, wrapped by this texture's wrap mode.
    pub fn sample_nearest(&self, u: f32, v: f32) -> Vec3 {
        let (u, v) = self.wrap_coords(u, v);

        let x = (u * (self.width - 1) as f32 + 0.5) as u32;
        let y = ((1.0 - v) * (self.height - 1) as f32 + 0.5) as u32;

        self.texel(x.min(self.width - 1), y.min(self.height - 1))
    }

    fn wrap_coords(&self, u: f32, v: f32) -> (f32, f32) {
        match self.wrap {
            WrapMode::Repeat => (u.rem_euclid(1.0), v.rem_euclid(1.0)),
            WrapMode::Clamp => (u.clamp(0.0, 1.0), v.clamp(0.0, 1.0)),
        }
    }

    fn texel(&self, x: u32, y: u32) -> Vec3 {
        let idx = y as usize * self.width as usize + x as usize;
        self.pixels.get(idx).copied().unwrap_or(Vec3::ZERO)
    }

    /// Get total size in bytes (approximate).
    pub fn size_bytes(&self) -> usize {
        self.pixels.len() * std::mem::size_of::<Vec3>()
    }
}

/// Cache for loaded textures.
///
/// Materials hold `Arc<Texture>` handles; the cache keeps one decoded copy
/// per path.
#[derive(Default)]
pub struct TextureCache {
    textures: HashMap<String, Arc<Texture>>,
    base_dir: Option<PathBuf>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a texture cache with a base directory for relative paths.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            textures: HashMap::new(),
            base_dir: Some(base_dir.into()),
        }
    }

    /// Load a texture from file, using cache if available.
    pub fn load(&mut self, path: &str) -> TextureResult<Arc<Texture>> {
        if let Some(texture) = self.textures.get(path) {
            return Ok(texture.clone());
        }

        let texture = Arc::new(Texture::load(self.resolve_path(path))?);
        self.textures.insert(path.to_string(), texture.clone());

        log::debug!(
            "Loaded texture: {} ({}x{}, {:.1} KB)",
            path,
            texture.width(),
            texture.height(),
            texture.size_bytes() as f32 / 1024.0
        );

        Ok(texture)
    }

    /// Register an already built texture under `name`.
    pub fn insert(&mut self, name: &str, texture: Texture) -> Arc<Texture> {
        let texture = Arc::new(texture);
        self.textures.insert(name.to_string(), texture.clone());
        texture
    }

    pub fn get(&self, name: &str) -> Option<Arc<Texture>> {
        self.textures.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);

        match &self.base_dir {
            Some(base) if !path.is_absolute() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}
