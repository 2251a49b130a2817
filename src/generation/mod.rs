use ndarray::prelude::*;
use noise::{NoiseFn, Perlin};

use crate::elevation::{encode_elevation, ElevationRaster};

pub struct NoiseSettings {
    scale: f32,
    min_meters: f32,
    max_meters: f32,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            scale: 5e-3,
            min_meters: 0.,
            max_meters: 2500.,
        }
    }
}

impl NoiseSettings {
    pub fn new(scale: f32, min_meters: f32, max_meters: f32) -> Self {
        Self {
            scale,
            min_meters,
            max_meters,
        }
    }
}

/// Terrarium-encoded raster of layered Perlin noise spanning
/// `min_meters..max_meters`.
pub fn perlin_elevation(
    (width, height): (usize, usize),
    seed: u32,
    noise_settings: &NoiseSettings,
) -> ElevationRaster {
    let octaves = 8;
    let scale_start = noise_settings.scale;

    let perlin = Perlin::new(seed);

    let mut data: Array2<f32> = Array::zeros((width, height));

    for y in 0..height {
        for x in 0..width {
            let mut scale = 1.;

            for i in 0..octaves {
                data[[x, y]] += scale
                    * perlin.get([
                        (i as f32 * 1000. + scale_start / scale * x as f32) as f64,
                        (scale_start / scale * y as f32) as f64,
                    ]) as f32;
                scale /= 2.;
            }
        }
    }

    // Calculate the maximum magnitude of the terrain
    let (max_magnitude, _): (f32, f32) =
        (0..octaves).fold((0.0, 1.0), |(max_magnitude, scale), _| {
            (max_magnitude + scale, scale / 2.0)
        });

    let span = noise_settings.max_meters - noise_settings.min_meters;

    ElevationRaster(data.map(|v| {
        // Convert the values from -max_magnitude..max_magnitude to 0..1
        let unit = ((*v / max_magnitude + 1.) / 2.).clamp(0., 1.);
        // Quantize to the 1/256 m steps the encoding represents exactly
        let meters = ((noise_settings.min_meters + unit * span) * 256.).round() / 256.;
        encode_elevation(meters)
    }))
}
