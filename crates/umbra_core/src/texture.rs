//! Surface textures.
//!
//! A texture maps a surface coordinate `(u, v)` and the hit point `p` to a
//! linear RGB color. Materials hold textures by value; image and noise data
//! sit behind an `Arc` so cloning a texture stays cheap.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use umbra_math::{Color, Interval, Point3};

use crate::Perlin;

/// Octaves of turbulence used by the marble texture.
const TURBULENCE_DEPTH: usize = 7;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to load texture {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

pub type TextureResult<T> = Result<T, TextureError>;

/// Color lookup over a surface.
#[derive(Debug, Clone)]
pub enum Texture {
    /// Constant color.
    Solid(Color),

    /// 3D checker pattern alternating between two textures.
    Checker {
        inv_scale: f64,
        even: Box<Texture>,
        odd: Box<Texture>,
    },

    /// Marble pattern driven by Perlin turbulence.
    Noise { perlin: Arc<Perlin>, scale: f64 },

    /// Nearest-texel lookup into a loaded image.
    Image(Arc<ImageTexture>),
}

impl Texture {
    pub fn solid(r: f64, g: f64, b: f64) -> Self {
        Texture::Solid(Color::new(r, g, b))
    }

    /// Checker pattern with cells of size `scale` along each axis.
    pub fn checker(scale: f64, even: Texture, odd: Texture) -> Self {
        Texture::Checker {
            inv_scale: 1.0 / scale,
            even: Box::new(even),
            odd: Box::new(odd),
        }
    }

    pub fn noise(perlin: Perlin, scale: f64) -> Self {
        Texture::Noise {
            perlin: Arc::new(perlin),
            scale,
        }
    }

    pub fn image(image: ImageTexture) -> Self {
        Texture::Image(Arc::new(image))
    }

    /// Color at surface coordinate `(u, v)` and point `p`.
    pub fn value(&self, u: f64, v: f64, p: Point3) -> Color {
        match self {
            Texture::Solid(color) => *color,
            Texture::Checker {
                inv_scale,
                even,
                odd,
            } => {
                let cell = (*inv_scale * p).floor();
                let sum = cell.x as i64 + cell.y as i64 + cell.z as i64;
                if sum.rem_euclid(2) == 0 {
                    even.value(u, v, p)
                } else {
                    odd.value(u, v, p)
                }
            }
            Texture::Noise { perlin, scale } => {
                let turb = perlin.turbulence(*scale * p, TURBULENCE_DEPTH);
                Color::ONE * 0.5 * (1.0 + (scale * p.z + 10.0 * turb).sin())
            }
            Texture::Image(image) => image.sample(u, v),
        }
    }
}

impl From<Color> for Texture {
    fn from(color: Color) -> Self {
        Texture::Solid(color)
    }
}

/// A loaded image with pixels stored as RGB floats in `[0, 1]`.
#[derive(Clone, Debug)]
pub struct ImageTexture {
    /// Texture width in pixels
    pub width: u32,

    /// Texture height in pixels
    pub height: u32,

    /// Row-major pixels, top row first
    pub pixels: Vec<[f32; 3]>,
}

impl ImageTexture {
    pub fn new(width: u32, height: u32, pixels: Vec<[f32; 3]>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Load an image from disk. Bytes are scaled to `[0, 1]` without a
    /// transfer curve, so texels keep their stored values.
    pub fn open(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| TextureError::Load {
            path: path.display().to_string(),
            source,
        })?;

        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();
        let pixels = rgb
            .pixels()
            .map(|p| {
                [
                    byte_to_unit(p[0]),
                    byte_to_unit(p[1]),
                    byte_to_unit(p[2]),
                ]
            })
            .collect();

        log::debug!("Loaded texture: {} ({}x{})", path.display(), width, height);

        Ok(Self::new(width, height, pixels))
    }

    /// Nearest texel at `(u, v)`, with `v = 0` at the bottom of the image.
    ///
    /// Coordinates are clamped to `[0, 1]`. An empty image samples as solid
    /// cyan so missing data stands out in renders.
    pub fn sample(&self, u: f64, v: f64) -> Color {
        if self.width == 0 || self.height == 0 {
            return Color::new(0.0, 1.0, 1.0);
        }

        let unit = Interval::new(0.0, 1.0);
        let u = unit.clamp(u);
        let v = 1.0 - unit.clamp(v);

        let i = ((u * self.width as f64) as u32).min(self.width - 1);
        let j = ((v * self.height as f64) as u32).min(self.height - 1);

        let idx = (j * self.width + i) as usize;
        self.pixels
            .get(idx)
            .map(|p| Color::new(p[0] as f64, p[1] as f64, p[2] as f64))
            .unwrap_or(Color::ZERO)
    }
}

fn byte_to_unit(value: u8) -> f32 {
    value as f32 / 255.0
}
