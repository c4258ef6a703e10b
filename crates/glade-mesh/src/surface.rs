//! Indexed triangle mesh holding the flat buffers handed to a renderer.

use glam::Vec3;

/// An indexed triangle mesh with per-vertex normals and texture coordinates.
///
/// Buffers are stored as fixed-size arrays so they can be viewed as flat
/// `f32` slices without copying (see [`SurfaceMesh::position_buffer`]).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SurfaceMesh {
    /// Vertex positions in world space.
    pub positions: Vec<[f32; 3]>,
    /// Unit vertex normals, one per position.
    pub normals: Vec<[f32; 3]>,
    /// Texture coordinates, one per position.
    pub uvs: Vec<[f32; 2]>,
    /// Triangle list, 3 indices per triangle.
    pub indices: Vec<u32>,
}

impl SurfaceMesh {
    /// Assemble a mesh and derive its normals from the index buffer.
    pub fn from_buffers(positions: Vec<[f32; 3]>, uvs: Vec<[f32; 2]>, indices: Vec<u32>) -> Self {
        let normals = compute_normals(&positions, &indices);
        Self {
            positions,
            normals,
            uvs,
            indices,
        }
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Flat `x, y, z` position buffer.
    pub fn position_buffer(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Flat `nx, ny, nz` normal buffer.
    pub fn normal_buffer(&self) -> &[f32] {
        bytemuck::cast_slice(&self.normals)
    }

    /// Flat `u, v` texture coordinate buffer.
    pub fn uv_buffer(&self) -> &[f32] {
        bytemuck::cast_slice(&self.uvs)
    }

    /// Returns `true` if every index refers to an existing vertex.
    pub fn indices_in_range(&self) -> bool {
        let count = self.positions.len();
        self.indices.iter().all(|&i| (i as usize) < count)
    }

    /// Iterate triangles as vertex position triples.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| {
            [
                Vec3::from_array(self.positions[tri[0] as usize]),
                Vec3::from_array(self.positions[tri[1] as usize]),
                Vec3::from_array(self.positions[tri[2] as usize]),
            ]
        })
    }

    /// Lowest vertex `y`, or `None` for an empty mesh.
    pub fn min_y(&self) -> Option<f32> {
        self.positions.iter().map(|p| p[1]).reduce(f32::min)
    }
}

/// Area-weighted vertex normals.
///
/// Each triangle adds its unnormalised face normal (twice its area) to its
/// three vertices; the sums are normalised at the end. Faces are visited in
/// index-buffer order so the result is reproducible.
pub fn compute_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut accum = vec![Vec3::ZERO; positions.len()];

    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let pa = Vec3::from_array(positions[a]);
        let pb = Vec3::from_array(positions[b]);
        let pc = Vec3::from_array(positions[c]);
        let face = (pb - pa).cross(pc - pa);
        accum[a] += face;
        accum[b] += face;
        accum[c] += face;
    }

    accum
        .into_iter()
        .map(|n| n.normalize_or_zero().to_array())
        .collect()
}
