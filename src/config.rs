use bevy::prelude::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TerrainError};

/// Equatorial circumference of the WGS84 ellipsoid.
pub const EARTH_CIRCUMFERENCE_METERS: f64 = 6378137.0 * std::f64::consts::PI * 2.0;

pub const MAX_ZOOM_LEVEL: u32 = 30;

/// Edge length in meters of a web-mercator tile at `zoom_level`.
pub fn tile_size_meters(zoom_level: u32) -> f64 {
    EARTH_CIRCUMFERENCE_METERS / 2f64.powi(zoom_level as i32)
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    /// Quads per side.
    pub resolution: u32,
    pub offset: [f32; 3],
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            resolution: 32,
            offset: [-0.5, 0.0, -0.5],
        }
    }
}

impl GridSettings {
    pub fn new(resolution: u32, offset: Vec3) -> Self {
        Self {
            resolution,
            offset: offset.to_array(),
        }
    }

    pub fn offset(&self) -> Vec3 {
        Vec3::from_array(self.offset)
    }

    pub fn validate(&self) -> Result<()> {
        if self.resolution < 1 {
            return Err(TerrainError::InvalidConfiguration(format!(
                "resolution must be at least 1, got {}",
                self.resolution
            )));
        }
        Ok(())
    }
}

/// How raster sample positions and heights relate to the mesh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalingMode {
    /// Sample at `uv * raster_size`, rounding halves to even.
    #[default]
    UvDirect,
    /// Sample at `uv / mesh_extent * raster_size` and scale heights by the
    /// largest planar extent of the mesh.
    BoundsRelative,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElevationSettings {
    pub zoom_level: u32,
    pub height_scale: f32,
    pub scaling_mode: ScalingMode,
}

impl Default for ElevationSettings {
    fn default() -> Self {
        Self {
            zoom_level: 11,
            height_scale: 1.0,
            scaling_mode: ScalingMode::UvDirect,
        }
    }
}

impl ElevationSettings {
    pub fn new(zoom_level: u32) -> Self {
        Self {
            zoom_level,
            ..Default::default()
        }
    }

    pub fn with_height_scale(mut self, height_scale: f32) -> Self {
        self.height_scale = height_scale;
        self
    }

    pub fn with_scaling_mode(mut self, scaling_mode: ScalingMode) -> Self {
        self.scaling_mode = scaling_mode;
        self
    }

    pub fn tile_size_meters(&self) -> f64 {
        tile_size_meters(self.zoom_level)
    }

    pub fn validate(&self) -> Result<()> {
        if self.zoom_level > MAX_ZOOM_LEVEL {
            return Err(TerrainError::InvalidConfiguration(format!(
                "zoom level must be at most {MAX_ZOOM_LEVEL}, got {}",
                self.zoom_level
            )));
        }
        if !self.height_scale.is_finite() {
            return Err(TerrainError::InvalidConfiguration(format!(
                "height scale must be finite, got {}",
                self.height_scale
            )));
        }
        Ok(())
    }
}

/// Which shading convention the per-vertex normals and tangents follow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalMode {
    /// Constant up normal and right tangent on every vertex, so a bound
    /// normal map is effectively read in object space.
    #[default]
    ObjectSpace,
    /// Smooth normals recomputed from the elevated surface, no normal map.
    Recomputed,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileConfig {
    pub grid: GridSettings,
    pub elevation: ElevationSettings,
    pub normals: NormalMode,
}

impl TileConfig {
    pub fn from_ron_str(text: &str) -> Result<Self> {
        let config: TileConfig = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        self.elevation.validate()
    }

    pub fn use_normal_map(&self) -> bool {
        self.normals == NormalMode::ObjectSpace
    }
}
