mod grid;

pub use grid::build_grid;

use bevy::{
    prelude::*,
    render::{mesh::Indices, render_resource::PrimitiveTopology},
};

#[derive(Clone, Debug, PartialEq)]
pub struct TerrainMeshData {
    pub vertices: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub normals: Vec<Vec3>,
    pub tangents: Vec<Vec4>,
    pub colors: Vec<Vec4>,
    pub triangles: Vec<u32>,
}

impl TerrainMeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    pub fn triangle(&self, i: usize) -> [u32; 3] {
        [
            self.triangles[i * 3],
            self.triangles[i * 3 + 1],
            self.triangles[i * 3 + 2],
        ]
    }

    /// Size of the axis-aligned box around all vertex positions.
    pub fn bounds_size(&self) -> Vec3 {
        let Some(first) = self.vertices.first() else {
            return Vec3::ZERO;
        };
        let (min, max) = self
            .vertices
            .iter()
            .fold((*first, *first), |(min, max), v| (min.min(*v), max.max(*v)));
        max - min
    }

    /// Replace the per-vertex normals with area-weighted smooth normals of the
    /// current surface.
    pub fn recompute_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.vertices.len()];

        for tri in self.triangles.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            // Unnormalized cross product weights each face by its area
            let face = (self.vertices[b] - self.vertices[a])
                .cross(self.vertices[c] - self.vertices[a]);
            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }

        self.normals = normals
            .into_iter()
            .map(|n| n.try_normalize().unwrap_or(Vec3::Y))
            .collect();
    }

    pub fn into_render_mesh(self, color_by_normals: bool) -> Mesh {
        let mut mesh = Mesh::new(PrimitiveTopology::TriangleList);

        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, self.vertices);
        mesh.insert_attribute(
            Mesh::ATTRIBUTE_UV_0,
            self.uvs.iter().map(|uv| uv.to_array()).collect::<Vec<_>>(),
        );
        mesh.insert_attribute(
            Mesh::ATTRIBUTE_TANGENT,
            self.tangents.iter().map(|t| t.to_array()).collect::<Vec<_>>(),
        );

        let colors = if color_by_normals {
            self.normals
                .iter()
                .map(|v| [v.x, v.y, v.z, 1.])
                .collect::<Vec<_>>()
        } else {
            self.colors.iter().map(|c| c.to_array()).collect::<Vec<_>>()
        };
        mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, colors);
        mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, self.normals);

        mesh.set_indices(Some(Indices::U32(self.triangles)));

        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridSettings;
    use bevy::render::mesh::VertexAttributeValues;

    fn flat_grid(resolution: u32) -> TerrainMeshData {
        build_grid(&GridSettings::new(resolution, Vec3::new(-0.5, 0.0, -0.5))).unwrap()
    }

    #[test]
    fn bounds_of_unit_grid() {
        let mesh = flat_grid(4);
        let size = mesh.bounds_size();
        assert!((size - Vec3::new(1.0, 0.0, 1.0)).abs().max_element() < 1e-6);
    }

    #[test]
    fn recomputed_normals_on_flat_grid_point_up() {
        let mut mesh = flat_grid(3);
        mesh.recompute_normals();
        for n in &mesh.normals {
            assert!((*n - Vec3::Y).length() < 1e-6, "normal {n:?}");
        }
    }

    #[test]
    fn recomputed_normals_tilt_away_from_slope() {
        let mut mesh = flat_grid(4);
        // Surface rises along +X
        for v in mesh.vertices.iter_mut() {
            v.y = v.x;
        }
        mesh.recompute_normals();

        let expected = Vec3::new(-1.0, 1.0, 0.0).normalize();
        for n in &mesh.normals {
            assert!((*n - expected).length() < 1e-5, "normal {n:?}");
        }
    }

    #[test]
    fn render_mesh_carries_all_attributes() {
        let mesh = flat_grid(2).into_render_mesh(false);

        assert_eq!(mesh.count_vertices(), 9);
        for attribute in [
            Mesh::ATTRIBUTE_POSITION,
            Mesh::ATTRIBUTE_UV_0,
            Mesh::ATTRIBUTE_NORMAL,
            Mesh::ATTRIBUTE_TANGENT,
            Mesh::ATTRIBUTE_COLOR,
        ] {
            assert!(mesh.attribute(attribute).is_some());
        }
        match mesh.attribute(Mesh::ATTRIBUTE_TANGENT) {
            Some(VertexAttributeValues::Float32x4(tangents)) => {
                assert!(tangents.iter().all(|t| *t == [1.0, 0.0, 0.0, -1.0]));
            }
            other => panic!("unexpected tangent attribute {other:?}"),
        }
        match mesh.indices() {
            Some(Indices::U32(indices)) => assert_eq!(indices.len(), 8 * 3),
            other => panic!("unexpected indices {other:?}"),
        }
    }
}
