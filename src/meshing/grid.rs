use bevy::{log::debug, prelude::*};

use super::TerrainMeshData;
use crate::config::GridSettings;
use crate::error::Result;

/// Build a flat `resolution` x `resolution` quad lattice over the unit square
/// in X and Z, translated by the settings' offset.
///
/// Every vertex gets the up vector as normal and `(1, 0, 0, -1)` as tangent so
/// that a bound normal map is effectively read in object space. Triangles wind
/// counter-clockwise seen from +Y.
pub fn build_grid(settings: &GridSettings) -> Result<TerrainMeshData> {
    settings.validate()?;

    let resolution = settings.resolution;
    let offset = settings.offset();
    let side = (resolution + 1) as usize;

    let mut vertices = Vec::with_capacity(side * side);
    let mut uvs = Vec::with_capacity(side * side);

    for col in 0..=resolution {
        let z = col as f32 / resolution as f32;
        for row in 0..=resolution {
            let x = row as f32 / resolution as f32;
            vertices.push(Vec3::new(x, 0., z) + offset);
            uvs.push(Vec2::new(x, z));
        }
    }

    let mut triangles = Vec::with_capacity(resolution as usize * resolution as usize * 6);
    let idx = |row: u32, col: u32| -> u32 { row + col * (resolution + 1) };

    for col in 0..resolution {
        for row in 0..resolution {
            // Add quad to indices
            triangles.extend([idx(row, col), idx(row, col + 1), idx(row + 1, col)]);
            triangles.extend([idx(row + 1, col), idx(row, col + 1), idx(row + 1, col + 1)]);
        }
    }

    debug!(
        "built {resolution}x{resolution} terrain grid ({} vertices)",
        vertices.len()
    );

    Ok(TerrainMeshData {
        normals: vec![Vec3::Y; vertices.len()],
        tangents: vec![Vec4::new(1., 0., 0., -1.); vertices.len()],
        colors: vec![Vec4::ONE; vertices.len()],
        vertices,
        uvs,
        triangles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TerrainError;
    use std::collections::HashSet;

    fn grid(resolution: u32) -> TerrainMeshData {
        build_grid(&GridSettings::new(resolution, Vec3::ZERO)).unwrap()
    }

    fn face_normal(mesh: &TerrainMeshData, i: usize) -> Vec3 {
        let [a, b, c] = mesh.triangle(i).map(|i| mesh.vertices[i as usize]);
        (b - a).cross(c - a)
    }

    #[test]
    fn zero_resolution_fails() {
        assert!(matches!(
            build_grid(&GridSettings::new(0, Vec3::ZERO)),
            Err(TerrainError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn vertex_and_triangle_counts() {
        for resolution in 1..=16 {
            let mesh = grid(resolution);
            let r = resolution as usize;
            assert_eq!(mesh.vertex_count(), (r + 1) * (r + 1));
            assert_eq!(mesh.triangle_count(), 2 * r * r);
            assert_eq!(mesh.uvs.len(), mesh.vertex_count());
            assert_eq!(mesh.normals.len(), mesh.vertex_count());
            assert_eq!(mesh.tangents.len(), mesh.vertex_count());
            assert_eq!(mesh.colors.len(), mesh.vertex_count());
        }
    }

    #[test]
    fn indices_in_bounds_and_triangles_unique() {
        for resolution in [1, 2, 5, 13] {
            let mesh = grid(resolution);
            assert!(mesh
                .triangles
                .iter()
                .all(|&i| (i as usize) < mesh.vertex_count()));

            let mut seen = HashSet::new();
            for t in 0..mesh.triangle_count() {
                let mut key = mesh.triangle(t);
                key.sort_unstable();
                assert!(seen.insert(key), "duplicate triangle {key:?}");
            }
        }
    }

    #[test]
    fn single_quad_faces_up() {
        let mesh = grid(1);
        assert_eq!(mesh.triangles, vec![0, 2, 1, 1, 2, 3]);
        for t in 0..2 {
            let n = face_normal(&mesh, t);
            assert!(n.y > 0.0 && n.x == 0.0 && n.z == 0.0, "normal {n:?}");
        }
    }

    #[test]
    fn every_triangle_faces_up() {
        let mesh = grid(7);
        for t in 0..mesh.triangle_count() {
            let n = face_normal(&mesh, t).normalize();
            assert!((n - Vec3::Y).length() < 1e-5, "triangle {t} normal {n:?}");
        }
    }

    #[test]
    fn quads_cover_unit_square_without_gaps() {
        let mesh = grid(6);
        // Flat triangles project onto XZ; their areas must sum to the square
        let area: f32 = (0..mesh.triangle_count())
            .map(|t| face_normal(&mesh, t).length() / 2.0)
            .sum();
        assert!((area - 1.0).abs() < 1e-5);
    }

    #[test]
    fn uv_coverage_spans_unit_square_at_corners() {
        let resolution = 4;
        let mesh = grid(resolution);
        let side = (resolution + 1) as usize;

        let min = mesh.uvs.iter().fold(Vec2::splat(f32::MAX), |a, b| a.min(*b));
        let max = mesh.uvs.iter().fold(Vec2::splat(f32::MIN), |a, b| a.max(*b));
        assert_eq!(min, Vec2::ZERO);
        assert_eq!(max, Vec2::ONE);

        assert_eq!(mesh.uvs[0], Vec2::ZERO);
        assert_eq!(mesh.uvs[side - 1], Vec2::new(1.0, 0.0));
        assert_eq!(mesh.uvs[side * (side - 1)], Vec2::new(0.0, 1.0));
        assert_eq!(mesh.uvs[side * side - 1], Vec2::ONE);
    }

    #[test]
    fn offset_translates_positions_but_not_uvs() {
        let offset = Vec3::new(-0.5, 2.0, -0.5);
        let mesh = build_grid(&GridSettings::new(2, offset)).unwrap();
        let plain = grid(2);

        for i in 0..mesh.vertex_count() {
            assert_eq!(mesh.vertices[i], plain.vertices[i] + offset);
            assert_eq!(mesh.uvs[i], plain.uvs[i]);
        }
        assert_eq!(mesh.vertices[0], Vec3::new(-0.5, 2.0, -0.5));
        assert_eq!(mesh.vertices[8], Vec3::new(0.5, 2.0, 0.5));
    }

    #[test]
    fn object_space_attributes_are_constant() {
        let mesh = grid(3);
        assert!(mesh.normals.iter().all(|n| *n == Vec3::Y));
        assert!(mesh
            .tangents
            .iter()
            .all(|t| *t == Vec4::new(1.0, 0.0, 0.0, -1.0)));
        assert!(mesh.colors.iter().all(|c| *c == Vec4::ONE));
    }
}
