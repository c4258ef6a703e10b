//! Perimeter skirt and flat cap geometry.
//!
//! The skirt is a vertical ribbon that drops every perimeter vertex of the
//! surface down to a common depth, hiding the gap between neighbouring
//! sections of different heights. A downward-facing cap at the same depth
//! closes the box, and an optional water quad covers the footprint at the
//! water level.

use glam::DVec2;

use crate::grid::GridParams;
use crate::surface::SurfaceMesh;

/// Which way a flat quad faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuadFacing {
    /// Normal along +Y.
    Up,
    /// Normal along -Y.
    Down,
}

/// Surface vertex indices around the section perimeter.
///
/// Walks the four edges in order, `-Z` edge along +X, `+X` edge along +Z,
/// `+Z` edge along -X, `-X` edge along -Z, each corner listed once. The
/// result has exactly `4 * size` entries and describes a closed loop.
pub fn perimeter_order(params: &GridParams) -> Vec<u32> {
    let n = params.size() as usize;
    let mut order = Vec::with_capacity(4 * n);

    for col in 0..n {
        order.push(params.vertex_index(col, 0) as u32);
    }
    for row in 0..n {
        order.push(params.vertex_index(n, row) as u32);
    }
    for col in (1..=n).rev() {
        order.push(params.vertex_index(col, n) as u32);
    }
    for row in (1..=n).rev() {
        order.push(params.vertex_index(0, row) as u32);
    }

    order
}

/// Build the skirt ribbon below `surface` along `perimeter`.
///
/// Emits a `(top, bottom)` vertex pair per perimeter entry: the top copies the
/// surface vertex and the bottom sits at `deepest_depth`. Vertex `2k` is the
/// top and `2k + 1` the bottom of perimeter entry `k`. The pairs are
/// triangulated as a closed strip, alternating winding with the strip index so
/// every face points away from the section.
pub fn build_skirt(
    surface: &SurfaceMesh,
    perimeter: &[u32],
    deepest_depth: f32,
    uv_scale: f32,
) -> SurfaceMesh {
    let mut positions = Vec::with_capacity(perimeter.len() * 2);
    let mut uvs = Vec::with_capacity(perimeter.len() * 2);
    let mut travelled = 0.0_f32;
    let mut previous: Option<[f32; 3]> = None;

    for &index in perimeter {
        let top = surface.positions[index as usize];
        if let Some(prev) = previous {
            travelled += ((top[0] - prev[0]).powi(2) + (top[2] - prev[2]).powi(2)).sqrt();
        }
        previous = Some(top);

        positions.push(top);
        positions.push([top[0], deepest_depth, top[2]]);
        uvs.push([travelled * uv_scale, 0.0]);
        uvs.push([travelled * uv_scale, (top[1] - deepest_depth) * uv_scale]);
    }

    let strip_len = positions.len() as u32;
    let mut indices = Vec::with_capacity(positions.len() * 3);
    for i in 0..strip_len {
        let i1 = (i + 1) % strip_len;
        let i2 = (i + 2) % strip_len;
        if i % 2 == 0 {
            indices.extend_from_slice(&[i, i2, i1]);
        } else {
            indices.extend_from_slice(&[i, i1, i2]);
        }
    }

    SurfaceMesh::from_buffers(positions, uvs, indices)
}

/// A single axis-aligned quad at height `y` spanning `min..max` in XZ.
pub fn build_flat_quad(min: DVec2, max: DVec2, y: f32, facing: QuadFacing, uv_scale: f32) -> SurfaceMesh {
    let (x0, z0, x1, z1) = (min.x as f32, min.y as f32, max.x as f32, max.y as f32);
    let positions = vec![[x0, y, z0], [x1, y, z0], [x1, y, z1], [x0, y, z1]];
    let uvs = positions
        .iter()
        .map(|p| [p[0] * uv_scale, p[2] * uv_scale])
        .collect();
    let indices = match facing {
        QuadFacing::Up => vec![0, 3, 1, 1, 3, 2],
        QuadFacing::Down => vec![0, 1, 3, 1, 2, 3],
    };
    SurfaceMesh::from_buffers(positions, uvs, indices)
}

/// The cap closing the bottom of the skirt box.
pub fn build_bottom_cap(params: &GridParams, deepest_depth: f32, uv_scale: f32) -> SurfaceMesh {
    let (min, max) = params.bounds();
    build_flat_quad(min, max, deepest_depth, QuadFacing::Down, uv_scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::fill_grid;
    use crate::winding::triangle_winds_outward;
    use glam::{IVec2, Vec2};

    fn surface_for(params: &GridParams) -> SurfaceMesh {
        let grid = fill_grid(|x, z| (x * 0.7).sin() + z * 0.1, params);
        let side = params.side();
        let mut positions = Vec::new();
        for row in 0..side {
            for col in 0..side {
                let p = params.world_xz(col, row);
                positions.push([p.x as f32, grid.get(col, row), p.y as f32]);
            }
        }
        SurfaceMesh {
            uvs: vec![[0.0; 2]; positions.len()],
            normals: vec![[0.0, 1.0, 0.0]; positions.len()],
            positions,
            indices: Vec::new(),
        }
    }

    #[test]
    fn test_perimeter_has_each_edge_vertex_once() {
        for size in [1, 2, 4, 9] {
            let params = GridParams::new(size, 1.0, IVec2::ZERO).unwrap();
            let order = perimeter_order(&params);
            assert_eq!(order.len(), 4 * size as usize);

            let mut sorted = order.clone();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(sorted.len(), order.len(), "no duplicate corners for size {size}");
        }
    }

    #[test]
    fn test_perimeter_steps_are_adjacent() {
        let params = GridParams::new(5, 1.0, IVec2::ZERO).unwrap();
        let order = perimeter_order(&params);
        let side = params.side() as i64;
        for k in 0..order.len() {
            let a = order[k] as i64;
            let b = order[(k + 1) % order.len()] as i64;
            let (ac, ar) = (a % side, a / side);
            let (bc, br) = (b % side, b / side);
            assert_eq!(
                (ac - bc).abs() + (ar - br).abs(),
                1,
                "perimeter step {k} must move one cell"
            );
        }
    }

    #[test]
    fn test_skirt_bottom_vertices_sit_at_depth() {
        let params = GridParams::new(6, 2.0, IVec2::new(1, 1)).unwrap();
        let surface = surface_for(&params);
        let perimeter = perimeter_order(&params);
        let skirt = build_skirt(&surface, &perimeter, -42.0, 0.1);

        assert_eq!(skirt.vertex_count(), 2 * perimeter.len());
        assert_eq!(skirt.triangle_count(), 2 * perimeter.len());
        assert!(skirt.indices_in_range());
        for (k, &index) in perimeter.iter().enumerate() {
            assert_eq!(skirt.positions[2 * k], surface.positions[index as usize]);
            assert_eq!(skirt.positions[2 * k + 1][1], -42.0);
        }
    }

    #[test]
    fn test_skirt_faces_point_outward() {
        let params = GridParams::new(4, 1.0, IVec2::ZERO).unwrap();
        let surface = surface_for(&params);
        let skirt = build_skirt(&surface, &perimeter_order(&params), -20.0, 1.0);
        let c = params.center();
        let center = Vec2::new(c.x as f32, c.y as f32);

        for (t, [a, b, v]) in skirt.triangles().enumerate() {
            assert!(
                triangle_winds_outward(a, b, v, center),
                "skirt triangle {t} faces inward"
            );
        }
    }

    #[test]
    fn test_flat_quad_facing() {
        let up = build_flat_quad(DVec2::ZERO, DVec2::splat(4.0), 1.0, QuadFacing::Up, 1.0);
        let down = build_flat_quad(DVec2::ZERO, DVec2::splat(4.0), 1.0, QuadFacing::Down, 1.0);
        assert!(up.normals.iter().all(|n| n[1] > 0.99));
        assert!(down.normals.iter().all(|n| n[1] < -0.99));
    }

    #[test]
    fn test_bottom_cap_covers_footprint() {
        let params = GridParams::new(8, 0.5, IVec2::new(-8, 0)).unwrap();
        let cap = build_bottom_cap(&params, -12.0, 1.0);
        assert_eq!(cap.vertex_count(), 4);
        assert_eq!(cap.positions[0], [-4.0, -12.0, 0.0]);
        assert_eq!(cap.positions[2], [0.0, -12.0, 4.0]);
    }
}
