//! Converting the accumulation buffer to 8-bit images.

use std::path::{Path, PathBuf};

use lumen_math::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::progressive::AccumulationBuffer;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("image buffer does not match {width}x{height}")]
    Size { width: u32, height: u32 },
}

/// Transfer function applied before quantizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// Write radiance as is
    Linear,
    /// Square-root gamma
    #[default]
    Gamma,
}

#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

pub fn color_to_rgba(color: Vec3, encoding: Encoding) -> [u8; 4] {
    let encode = |c: f32| match encoding {
        Encoding::Linear => c,
        Encoding::Gamma => linear_to_gamma(c),
    };
    let quantize = |c: f32| (255.0 * encode(c).clamp(0.0, 1.0)) as u8;
    [quantize(color.x), quantize(color.y), quantize(color.z), 255]
}

/// RGBA bytes with the top row first.
pub fn to_rgba(buffer: &AccumulationBuffer, encoding: Encoding) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(buffer.pixels().len() * 4);
    for y in (0..buffer.height()).rev() {
        for color in buffer.row(y) {
            bytes.extend_from_slice(&color_to_rgba(*color, encoding));
        }
    }
    bytes
}

pub fn save_png(
    buffer: &AccumulationBuffer,
    path: impl AsRef<Path>,
    encoding: Encoding,
) -> Result<(), OutputError> {
    let path = path.as_ref();
    let (width, height) = (buffer.width(), buffer.height());
    let image = image::RgbaImage::from_raw(width, height, to_rgba(buffer, encoding))
        .ok_or(OutputError::Size { width, height })?;

    image
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|source| OutputError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    log::info!("Wrote {}x{} image to {}", width, height, path.display());
    Ok(())
}
