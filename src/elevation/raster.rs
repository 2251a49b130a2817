use bevy::{
    prelude::*,
    render::{
        render_resource::TextureFormat,
        texture::{CompressedImageFormats, ImageType},
    },
};
use ndarray::Array2;

use super::Rgba;
use crate::error::{Result, TerrainError};

/// Decoded elevation image. Indexed `[[x, y]]` with `y = 0` at the bottom row,
/// so that `v = 0` texture coordinates land on the first row.
#[derive(Clone, Debug, PartialEq)]
pub struct ElevationRaster(pub Array2<Rgba>);

impl ElevationRaster {
    pub fn uniform(width: usize, height: usize, color: Rgba) -> Self {
        Self(Array2::from_elem((width, height), color))
    }

    /// Raster from tightly packed RGBA8 rows, bottom row first.
    pub fn from_bytes(width: usize, height: usize, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != width * height * 4 {
            return Err(TerrainError::InvalidConfiguration(format!(
                "expected {} bytes for a {width}x{height} raster, got {}",
                width * height * 4,
                bytes.len()
            )));
        }
        Ok(Self(Array2::from_shape_fn((width, height), |(x, y)| {
            let i = (x + y * width) * 4;
            Rgba::from_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]])
        })))
    }

    /// Decode an encoded image (PNG by default features) into a raster. The
    /// image is read as linear data since the channels encode numbers, not
    /// colors.
    pub fn decode(bytes: &[u8], extension: &str) -> Result<Self> {
        let image = Image::from_buffer(
            bytes,
            ImageType::Extension(extension),
            CompressedImageFormats::NONE,
            false,
        )?;
        Self::from_image(&image)
    }

    pub fn from_image(image: &Image) -> Result<Self> {
        let size = image.texture_descriptor.size;
        let (width, height) = (size.width as usize, size.height as usize);
        let format = image.texture_descriptor.format;

        let pixel = |x: usize, y: usize| -> usize {
            // Image rows are stored top first
            x + (height - 1 - y) * width
        };

        let data = &image.data;
        let texel_size = match format {
            TextureFormat::Rgba8Unorm | TextureFormat::Rgba8UnormSrgb => 4,
            TextureFormat::Rgba16Unorm => 8,
            TextureFormat::Rgba32Float => 16,
            other => return Err(TerrainError::UnsupportedRasterFormat(other)),
        };
        if data.len() < width * height * texel_size {
            return Err(TerrainError::InvalidConfiguration(format!(
                "image data holds {} bytes, {width}x{height} {format:?} needs {}",
                data.len(),
                width * height * texel_size
            )));
        }

        let raster = match format {
            TextureFormat::Rgba8Unorm | TextureFormat::Rgba8UnormSrgb => {
                Array2::from_shape_fn((width, height), |(x, y)| {
                    let i = pixel(x, y) * 4;
                    Rgba::from_bytes([data[i], data[i + 1], data[i + 2], data[i + 3]])
                })
            }
            TextureFormat::Rgba16Unorm => Array2::from_shape_fn((width, height), |(x, y)| {
                let i = pixel(x, y) * 8;
                let channel = |c: usize| {
                    u16::from_le_bytes([data[i + c * 2], data[i + c * 2 + 1]]) as f32
                        / u16::MAX as f32
                };
                Rgba {
                    r: channel(0),
                    g: channel(1),
                    b: channel(2),
                    a: channel(3),
                }
            }),
            TextureFormat::Rgba32Float => Array2::from_shape_fn((width, height), |(x, y)| {
                let i = pixel(x, y) * 16;
                let channel = |c: usize| {
                    let at = i + c * 4;
                    f32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
                };
                Rgba {
                    r: channel(0),
                    g: channel(1),
                    b: channel(2),
                    a: channel(3),
                }
            }),
            other => return Err(TerrainError::UnsupportedRasterFormat(other)),
        };

        Ok(Self(raster))
    }

    pub fn dim(&self) -> (usize, usize) {
        self.0.dim()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sample at integer coordinates, clamped to the raster edges. `None` only
    /// for an empty raster.
    pub fn sample(&self, x: i64, y: i64) -> Option<Rgba> {
        if self.is_empty() {
            return None;
        }
        let (width, height) = self.dim();
        let x = x.clamp(0, width as i64 - 1) as usize;
        let y = y.clamp(0, height as i64 - 1) as usize;
        self.0.get([x, y]).copied()
    }
}
