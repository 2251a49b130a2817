//! Terrain tile meshes from Terrarium-encoded elevation rasters.
//!
//! A tile is a flat unit grid ([`meshing::build_grid`]) whose vertex heights
//! are then set from an elevation image ([`elevation::apply_elevation`]),
//! scaled so that one mesh unit spans the real-world width of a web-mercator
//! tile at the configured zoom level.

pub mod config;
pub mod elevation;
pub mod error;
pub mod generation;
pub mod meshing;
pub mod tile;

pub use config::{ElevationSettings, GridSettings, NormalMode, ScalingMode, TileConfig};
pub use elevation::{ElevationRaster, Rgba};
pub use error::{Result, TerrainError};
pub use meshing::TerrainMeshData;
pub use tile::{build_tile, rebuild_if_changed, RebuildKind, TerrainTile};
