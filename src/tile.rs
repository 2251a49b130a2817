use bevy::{
    log::{debug, warn},
    prelude::Image,
    render::texture::{CompressedImageFormats, ImageType},
};

use crate::config::{NormalMode, TileConfig};
use crate::elevation::{apply_elevation, ElevationRaster};
use crate::error::Result;
use crate::meshing::{build_grid, TerrainMeshData};

/// Build the flat grid for `config`, elevate it, and finish the normals
/// according to the configured normal mode.
pub fn build_tile(
    config: &TileConfig,
    raster: Option<&ElevationRaster>,
) -> Result<TerrainMeshData> {
    config.validate()?;
    let mut mesh = build_grid(&config.grid)?;
    apply_elevation(&mut mesh, raster, &config.elevation)?;
    if config.normals == NormalMode::Recomputed {
        mesh.recompute_normals();
    }
    Ok(mesh)
}

/// Work needed to bring a tile from one config to another.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RebuildKind {
    /// Only heights (and recomputed normals) change, topology is kept.
    Elevation,
    /// Topology or the normal convention changed; start over from the grid.
    Full,
}

impl RebuildKind {
    pub fn between(previous: &TileConfig, current: &TileConfig) -> Option<Self> {
        if previous == current {
            None
        } else if previous.grid == current.grid && previous.normals == current.normals {
            Some(RebuildKind::Elevation)
        } else {
            Some(RebuildKind::Full)
        }
    }
}

/// Fresh mesh for `current` when it differs from `previous`, `None` when the
/// existing mesh is still valid.
pub fn rebuild_if_changed(
    current: &TileConfig,
    previous: Option<&TileConfig>,
    raster: Option<&ElevationRaster>,
) -> Result<Option<TerrainMeshData>> {
    match previous {
        Some(previous) if previous == current => Ok(None),
        _ => build_tile(current, raster).map(Some),
    }
}

/// A terrain tile with its data sources and current mesh.
///
/// Without elevation data the tile stays a flat grid, which is still valid to
/// render.
pub struct TerrainTile {
    config: TileConfig,
    elevation: Option<ElevationRaster>,
    normal_map: Option<Image>,
    mesh: TerrainMeshData,
}

impl TerrainTile {
    pub fn new(config: TileConfig) -> Result<Self> {
        config.validate()?;
        let mesh = Self::synthesize(&config, None)?;
        Ok(Self {
            config,
            elevation: None,
            normal_map: None,
            mesh,
        })
    }

    pub fn with_elevation(config: TileConfig, elevation: ElevationRaster) -> Result<Self> {
        config.validate()?;
        let mesh = Self::synthesize(&config, Some(&elevation))?;
        Ok(Self {
            config,
            elevation: Some(elevation),
            normal_map: None,
            mesh,
        })
    }

    pub fn config(&self) -> &TileConfig {
        &self.config
    }

    pub fn mesh(&self) -> &TerrainMeshData {
        &self.mesh
    }

    pub fn elevation(&self) -> Option<&ElevationRaster> {
        self.elevation.as_ref()
    }

    pub fn normal_map(&self) -> Option<&Image> {
        self.normal_map.as_ref()
    }

    pub fn use_normal_map(&self) -> bool {
        self.config.use_normal_map()
    }

    /// Switch to `config`, doing only the work the difference requires.
    /// On error the tile keeps its previous config and mesh.
    pub fn reconfigure(&mut self, config: TileConfig) -> Result<Option<RebuildKind>> {
        config.validate()?;
        let Some(kind) = RebuildKind::between(&self.config, &config) else {
            return Ok(None);
        };

        match kind {
            RebuildKind::Full => {
                self.mesh = Self::synthesize(&config, self.elevation.as_ref())?;
            }
            RebuildKind::Elevation => {
                Self::elevate(&mut self.mesh, &config, self.elevation.as_ref())?;
            }
        }

        debug!("reconfigured terrain tile ({kind:?})");
        self.config = config;
        Ok(Some(kind))
    }

    /// Decode an encoded elevation image and re-elevate the current mesh.
    pub fn set_elevation_data(&mut self, bytes: &[u8], extension: &str) -> Result<()> {
        let raster = ElevationRaster::decode(bytes, extension)?;
        self.set_elevation(raster)
    }

    pub fn set_elevation(&mut self, raster: ElevationRaster) -> Result<()> {
        Self::elevate(&mut self.mesh, &self.config, Some(&raster))?;
        self.elevation = Some(raster);
        Ok(())
    }

    /// Decode a normal map. The image is kept linear so the encoded vectors
    /// are not gamma corrected.
    pub fn set_normal_data(&mut self, bytes: &[u8], extension: &str) -> Result<()> {
        let image = Image::from_buffer(
            bytes,
            ImageType::Extension(extension),
            CompressedImageFormats::NONE,
            false,
        )?;
        self.normal_map = Some(image);
        Ok(())
    }

    fn synthesize(
        config: &TileConfig,
        elevation: Option<&ElevationRaster>,
    ) -> Result<TerrainMeshData> {
        let mut mesh = build_grid(&config.grid)?;
        Self::elevate(&mut mesh, config, elevation)?;
        Ok(mesh)
    }

    fn elevate(
        mesh: &mut TerrainMeshData,
        config: &TileConfig,
        elevation: Option<&ElevationRaster>,
    ) -> Result<()> {
        match elevation {
            Some(raster) => apply_elevation(mesh, Some(raster), &config.elevation)?,
            None => warn!("no elevation data for terrain tile, keeping it flat"),
        }
        if config.normals == NormalMode::Recomputed {
            mesh.recompute_normals();
        }
        Ok(())
    }
}
