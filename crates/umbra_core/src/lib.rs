//! Umbra Core - surface textures for the path tracer.
//!
//! This crate provides:
//!
//! - **Textures**: the [`Texture`] lookup (`value(u, v, p)`) with solid,
//!   checker, Perlin marble and image variants
//! - **Noise**: [`Perlin`] gradient noise and turbulence
//!
//! # Example
//!
//! ```ignore
//! use umbra_core::{ImageTexture, Texture};
//!
//! let earth = Texture::image(ImageTexture::open("earthmap.jpg")?);
//! let color = earth.value(0.25, 0.5, Point3::ZERO);
//! ```

pub mod perlin;
pub mod texture;

pub use perlin::Perlin;
pub use texture::{ImageTexture, Texture, TextureError, TextureResult};
