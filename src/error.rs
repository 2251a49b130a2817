use bevy::render::{render_resource::TextureFormat, texture::TextureError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TerrainError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("No elevation data available for mapping")]
    MissingElevationData,

    #[error("Failed to decode image: {0}")]
    Decode(#[from] TextureError),

    #[error("Unsupported elevation raster format: {0:?}")]
    UnsupportedRasterFormat(TextureFormat),

    #[error("Failed to parse tile config: {0}")]
    Config(#[from] ron::error::SpannedError),
}

pub type Result<T> = std::result::Result<T, TerrainError>;
