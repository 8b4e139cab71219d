//! Converting rendered radiance to 8-bit images on disk.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use umbra_math::{Color, Interval};

use crate::ImageBuffer;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to encode {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Pixel buffer does not match a {width}x{height} image")]
    BufferSize { width: u32, height: u32 },
}

pub type OutputResult<T> = Result<T, OutputError>;

const INTENSITY: Interval = Interval::new(0.0, 0.999);

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f64) -> f64 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert linear radiance to display bytes.
///
/// NaN components become 0 before gamma and clamping.
pub fn color_to_rgb8(color: Color) -> [u8; 3] {
    let encode = |c: f64| {
        let c = if c.is_nan() { 0.0 } else { c };
        (255.999 * INTENSITY.clamp(linear_to_gamma(c))) as u8
    };
    [encode(color.x), encode(color.y), encode(color.z)]
}

impl ImageBuffer {
    /// Convert to packed RGB bytes, row-major.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|&c| color_to_rgb8(c)).collect()
    }
}

/// Write a plain (`P3`) PPM: header, then one `r g b` line per pixel.
pub fn write_ppm<W: Write>(image: &ImageBuffer, out: &mut W) -> io::Result<()> {
    writeln!(out, "P3")?;
    writeln!(out, "{} {}", image.width, image.height)?;
    writeln!(out, "255")?;
    for &color in &image.pixels {
        let [r, g, b] = color_to_rgb8(color);
        writeln!(out, "{r} {g} {b}")?;
    }
    Ok(())
}

pub fn save_ppm(image: &ImageBuffer, path: impl AsRef<Path>) -> OutputResult<()> {
    let path = path.as_ref();
    let io_err = |source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    write_ppm(image, &mut writer).map_err(io_err)?;
    writer.flush().map_err(io_err)?;

    log::info!("Saved {}", path.display());
    Ok(())
}

/// Save through the `image` crate; the extension picks the format.
pub fn save_image(buffer: &ImageBuffer, path: impl AsRef<Path>) -> OutputResult<()> {
    let path = path.as_ref();
    let rgb = image::RgbImage::from_raw(buffer.width, buffer.height, buffer.to_rgb8()).ok_or(
        OutputError::BufferSize {
            width: buffer.width,
            height: buffer.height,
        },
    )?;

    rgb.save(path).map_err(|source| OutputError::Image {
        path: path.to_path_buf(),
        source,
    })?;

    log::info!("Saved {}", path.display());
    Ok(())
}
