use std::{error::Error, fs, path::Path, path::PathBuf};

use terrain_tile::{
    generation::{perlin_elevation, NoiseSettings},
    ElevationRaster, TerrainTile, TileConfig,
};

use bevy::{
    pbr::wireframe::{Wireframe, WireframePlugin},
    prelude::*,
    render::{
        settings::{WgpuFeatures, WgpuSettings},
        RenderPlugin,
    },
};
use bevy_atmosphere::prelude::*;
use bevy_fly_camera::{FlyCamera, FlyCameraPlugin};
use clap::Parser;

/// View a terrain tile built from a Terrarium elevation image.
#[derive(Parser, Debug)]
struct Args {
    /// Tile config in RON; defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Terrarium-encoded elevation image; Perlin terrain when omitted
    #[arg(long)]
    elevation: Option<PathBuf>,

    /// Normal map bound when the config uses object-space normals
    #[arg(long)]
    normals: Option<PathBuf>,

    /// Seed for generated terrain
    #[arg(long, default_value_t = 2)]
    seed: u32,

    #[arg(long)]
    wireframe: bool,
}

#[derive(Resource)]
struct ViewerTile {
    tile: TerrainTile,
    wireframe: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let tile = load_tile(&args)?;

    App::new()
        .add_plugins(DefaultPlugins.set(RenderPlugin {
            wgpu_settings: WgpuSettings {
                features: WgpuFeatures::POLYGON_MODE_LINE,
                ..default()
            },
        }))
        .add_plugin(WireframePlugin)
        .add_plugin(FlyCameraPlugin)
        .add_plugin(AtmospherePlugin)
        .insert_resource(ViewerTile {
            tile,
            wireframe: args.wireframe,
        })
        .add_startup_system(setup_tile)
        .add_startup_system(add_camera)
        .add_startup_system(add_lights)
        .run();

    Ok(())
}

fn extension(path: &Path) -> &str {
    path.extension().and_then(|ext| ext.to_str()).unwrap_or("png")
}

fn load_tile(args: &Args) -> Result<TerrainTile, Box<dyn Error>> {
    let config = match &args.config {
        Some(path) => TileConfig::from_ron_str(&fs::read_to_string(path)?)?,
        None => TileConfig::default(),
    };

    let raster = match &args.elevation {
        Some(path) => ElevationRaster::decode(&fs::read(path)?, extension(path))?,
        None => perlin_elevation((257, 257), args.seed, &NoiseSettings::default()),
    };

    let mut tile = TerrainTile::with_elevation(config, raster)?;

    if let Some(path) = &args.normals {
        tile.set_normal_data(&fs::read(path)?, extension(path))?;
    }

    Ok(tile)
}

fn setup_tile(
    mut commands: Commands,
    viewer: Res<ViewerTile>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut images: ResMut<Assets<Image>>,
) {
    let tile = &viewer.tile;

    let normal_map_texture = match (tile.use_normal_map(), tile.normal_map()) {
        (true, Some(image)) => Some(images.add(image.clone())),
        (true, None) => {
            warn!("object-space normals selected but no normal map given");
            None
        }
        (false, _) => None,
    };

    info!(
        "spawning terrain tile: {} vertices, {} triangles, zoom {}",
        tile.mesh().vertex_count(),
        tile.mesh().triangle_count(),
        tile.config().elevation.zoom_level
    );

    let mesh = tile.mesh().clone().into_render_mesh(false);

    let mut entity = commands.spawn(PbrBundle {
        mesh: meshes.add(mesh),
        material: materials.add(StandardMaterial {
            base_color: Color::rgb(1.0, 0.85, 0.57),
            perceptual_roughness: 0.8,
            normal_map_texture,
            ..default()
        }),
        ..default()
    });

    if viewer.wireframe {
        entity.insert(Wireframe);
    }
}

fn add_camera(mut commands: Commands) {
    commands
        .spawn(Camera3dBundle {
            transform: Transform::from_translation(Vec3 {
                x: 0.0,
                y: 0.6,
                z: 1.5,
            }),
            ..default()
        })
        .insert(FlyCamera::default())
        .insert(AtmosphereCamera::default());
}

fn add_lights(mut commands: Commands) {
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 0.1,
    });

    commands.spawn(DirectionalLightBundle {
        directional_light: DirectionalLight {
            illuminance: 20000.,
            shadows_enabled: true,
            ..default()
        },
        transform: Transform::from_rotation(Quat::from_rotation_x(-0.25 * std::f32::consts::PI)),
        ..default()
    });
}
