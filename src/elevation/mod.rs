pub mod mapper;
mod raster;
pub mod terrarium;

pub use mapper::apply_elevation;
pub use raster::ElevationRaster;
pub use terrarium::{decode_elevation, encode_elevation};

use bevy::prelude::Color;

/// One raster sample with channels normalized to 0..1.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    pub fn from_bytes([r, g, b, a]: [u8; 4]) -> Self {
        Self::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }
}

impl From<Color> for Rgba {
    fn from(color: Color) -> Self {
        let [r, g, b, a] = color.as_rgba_f32();
        Self::new(r, g, b, a)
    }
}
