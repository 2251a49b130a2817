use bevy::log::debug;

use super::{decode_elevation, ElevationRaster};
use crate::config::{ElevationSettings, ScalingMode};
use crate::error::{Result, TerrainError};
use crate::meshing::TerrainMeshData;

/// Set the height of every vertex from the elevation raster sampled at the
/// vertex UV. Only `position.y` is written, so re-running with different
/// settings on the same topology is fine.
pub fn apply_elevation(
    mesh: &mut TerrainMeshData,
    raster: Option<&ElevationRaster>,
    settings: &ElevationSettings,
) -> Result<()> {
    settings.validate()?;

    let raster = match raster {
        Some(raster) if !raster.is_empty() => raster,
        _ => return Err(TerrainError::MissingElevationData),
    };

    let (width, height) = raster.dim();
    let tile_size = settings.tile_size_meters();
    let height_scale = settings.height_scale as f64;

    // Bounds are taken from X and Z only, which elevation never changes
    let bounds = mesh.bounds_size();
    if settings.scaling_mode == ScalingMode::BoundsRelative && (bounds.x <= 0.0 || bounds.z <= 0.0)
    {
        return Err(TerrainError::InvalidConfiguration(format!(
            "bounds-relative scaling needs a mesh with planar extent, got {bounds:?}"
        )));
    }
    let extent = bounds.x.max(bounds.z) as f64;

    for (vertex, uv) in mesh.vertices.iter_mut().zip(&mesh.uvs) {
        let (x, y, scale) = match settings.scaling_mode {
            ScalingMode::UvDirect => (
                (uv.x * width as f32).round_ties_even() as i64,
                (uv.y * height as f32).round_ties_even() as i64,
                1.0,
            ),
            ScalingMode::BoundsRelative => (
                (uv.x / bounds.x * width as f32) as i64,
                (uv.y / bounds.z * height as f32) as i64,
                extent,
            ),
        };

        let color = raster
            .sample(x, y)
            .ok_or(TerrainError::MissingElevationData)?;
        let meters = decode_elevation(color) as f64;
        vertex.y = (meters / tile_size * scale * height_scale) as f32;
    }

    debug!(
        "applied {width}x{height} elevation at zoom {} to {} vertices",
        settings.zoom_level,
        mesh.vertices.len()
    );

    Ok(())
}
