//! Terrarium elevation encoding: signed meters packed into the RGB channels
//! as `r * 65536 + g * 256 + b - 32768`, with channels normalized to 0..1.
//! <https://github.com/tilezen/joerd/blob/master/docs/formats.md#terrarium>

use super::Rgba;

pub const ELEVATION_OFFSET_METERS: f32 = 32768.0;

pub fn decode_elevation(color: Rgba) -> f32 {
    (color.r * 256.0 * 256.0 + color.g * 256.0 + color.b) - ELEVATION_OFFSET_METERS
}

/// Inverse of [`decode_elevation`] for float rasters, exact for meters in
/// `-32768..32768` that are representable at 1/256 m steps.
pub fn encode_elevation(meters: f32) -> Rgba {
    let value = meters + ELEVATION_OFFSET_METERS;
    let high = (value / 256.0).floor();
    let rest = value - high * 256.0;
    let mid = rest.floor();

    Rgba {
        r: high / 256.0,
        g: mid / 256.0,
        b: rest - mid,
        a: 1.0,
    }
}
