//! Terrain section meshing: surface grid, skirt, bottom cap and water quad.

use crate::error::MeshError;
use crate::grid::{CancelToken, ElevationGrid, GridParams, fill_grid, fill_grid_parallel};
use crate::skirt::{QuadFacing, build_bottom_cap, build_flat_quad, build_skirt, perimeter_order};
use crate::surface::SurfaceMesh;

/// Tunables for section meshing beyond the grid itself.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshOptions {
    /// Distance below the lowest sampled elevation to drop the skirt.
    pub skirt_margin: f32,
    /// Upper bound for the skirt depth. The skirt never ends above this.
    pub skirt_floor: Option<f32>,
    /// World-space texture tiling factor.
    pub uv_scale: f32,
    /// Emit an upward-facing water quad at this height.
    pub water_level: Option<f32>,
}

impl Default for MeshOptions {
    fn default() -> Self {
        Self {
            skirt_margin: 10.0,
            skirt_floor: None,
            uv_scale: 0.1,
            water_level: None,
        }
    }
}

/// A fully meshed terrain section.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainSection {
    /// Grid placement and resolution.
    pub params: GridParams,
    /// Sampled elevations, `(size + 1)²` values.
    pub grid: ElevationGrid,
    /// The walkable surface.
    pub surface: SurfaceMesh,
    /// Perimeter wall down to [`deepest_depth`](Self::deepest_depth).
    pub skirt: SurfaceMesh,
    /// Downward-facing cap closing the skirt box.
    pub bottom: SurfaceMesh,
    /// Water quad at the configured water level, if any.
    pub water: Option<SurfaceMesh>,
    /// Depth of the skirt bottom; always at or below the lowest elevation.
    pub deepest_depth: f32,
}

impl TerrainSection {
    /// Number of perimeter entries in the skirt (`4 * size`).
    pub fn perimeter_len(&self) -> usize {
        self.skirt.vertex_count() / 2
    }
}

/// Turns a height function into a [`TerrainSection`].
///
/// Rebuilding always starts from scratch; sections are never patched.
#[derive(Clone, Debug)]
pub struct TerrainMeshBuilder {
    params: GridParams,
    options: MeshOptions,
}

impl TerrainMeshBuilder {
    /// Create a builder for the given grid.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::InvalidSkirtMargin`] if the margin is negative or
    /// not finite.
    pub fn new(params: GridParams, options: MeshOptions) -> Result<Self, MeshError> {
        if !options.skirt_margin.is_finite() || options.skirt_margin < 0.0 {
            return Err(MeshError::InvalidSkirtMargin(options.skirt_margin));
        }
        Ok(Self { params, options })
    }

    /// The grid this builder meshes.
    pub fn params(&self) -> &GridParams {
        &self.params
    }

    /// Sample and mesh the section on the calling thread.
    pub fn build(&self, height_fn: impl Fn(f64, f64) -> f64) -> TerrainSection {
        let grid = fill_grid(height_fn, &self.params);
        self.build_from_grid(grid)
    }

    /// Sample the grid across `threads` workers, then mesh it.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Cancelled`] if `cancel` fires during sampling.
    pub fn build_parallel<F>(
        &self,
        height_fn: &F,
        threads: usize,
        cancel: &CancelToken,
    ) -> Result<TerrainSection, MeshError>
    where
        F: Fn(f64, f64) -> f64 + Sync,
    {
        let grid = fill_grid_parallel(height_fn, &self.params, threads, cancel)?;
        Ok(self.build_from_grid(grid))
    }

    /// Mesh an already sampled grid.
    pub fn build_from_grid(&self, grid: ElevationGrid) -> TerrainSection {
        let deepest_depth = self.deepest_depth(&grid);
        let surface = self.build_surface(&grid);
        let perimeter = perimeter_order(&self.params);
        let skirt = build_skirt(&surface, &perimeter, deepest_depth, self.options.uv_scale);
        let bottom = build_bottom_cap(&self.params, deepest_depth, self.options.uv_scale);
        let water = self.options.water_level.map(|level| {
            let (min, max) = self.params.bounds();
            build_flat_quad(min, max, level, QuadFacing::Up, self.options.uv_scale)
        });

        tracing::debug!(
            size = self.params.size(),
            vertices = surface.vertex_count(),
            triangles = surface.triangle_count(),
            min = grid.min(),
            max = grid.max(),
            deepest_depth,
            "meshed terrain section"
        );

        TerrainSection {
            params: self.params,
            grid,
            surface,
            skirt,
            bottom,
            water,
            deepest_depth,
        }
    }

    fn deepest_depth(&self, grid: &ElevationGrid) -> f32 {
        let below_lowest = grid.min() - self.options.skirt_margin;
        match self.options.skirt_floor {
            Some(floor) => below_lowest.min(floor),
            None => below_lowest,
        }
    }

    /// Shared-edge surface: one vertex per grid point, two triangles per cell
    /// split along the `(col + 1, row)`–`(col, row + 1)` diagonal, wound
    /// counter-clockwise from above.
    fn build_surface(&self, grid: &ElevationGrid) -> SurfaceMesh {
        let params = &self.params;
        let side = params.side();
        let uv_scale = self.options.uv_scale;

        let mut positions = Vec::with_capacity(params.vertex_count());
        let mut uvs = Vec::with_capacity(params.vertex_count());
        for row in 0..side {
            for col in 0..side {
                let p = params.world_xz(col, row);
                positions.push([p.x as f32, grid.get(col, row), p.y as f32]);
                uvs.push([p.x as f32 * uv_scale, p.y as f32 * uv_scale]);
            }
        }

        let n = params.size() as usize;
        let mut indices = Vec::with_capacity(params.triangle_count() * 3);
        for row in 0..n {
            for col in 0..n {
                let i = params.vertex_index(col, row) as u32;
                let right = i + 1;
                let up = i + side as u32;
                let diagonal = up + 1;
                indices.extend_from_slice(&[i, up, right]);
                indices.extend_from_slice(&[right, up, diagonal]);
            }
        }

        SurfaceMesh::from_buffers(positions, uvs, indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::winding::triangle_faces_up;
    use glam::IVec2;

    fn bumpy(x: f64, z: f64) -> f64 {
        (x * 0.9).sin() * 3.0 + (z * 0.4).cos() * 2.0 - 1.0
    }

    fn builder(size: u32, options: MeshOptions) -> TerrainMeshBuilder {
        let params = GridParams::new(size, 1.0, IVec2::ZERO).unwrap();
        TerrainMeshBuilder::new(params, options).unwrap()
    }

    #[test]
    fn test_size_four_section_counts() {
        let section = builder(4, MeshOptions::default()).build(bumpy);

        assert_eq!(section.surface.vertex_count(), 25);
        assert_eq!(section.surface.triangle_count(), 32);
        assert_eq!(section.surface.normals.len(), 25);
        assert!(
            section.surface.indices.iter().all(|&i| i < 25),
            "every index must reference one of the 25 vertices"
        );
    }

    #[test]
    fn test_min_vertex_y_matches_grid_min() {
        let section = builder(4, MeshOptions::default()).build(bumpy);
        let min_y = section.surface.min_y().unwrap();
        let grid_min = section
            .grid
            .values()
            .iter()
            .copied()
            .fold(f32::INFINITY, f32::min);
        assert_eq!(min_y, grid_min);
        assert_eq!(min_y, section.grid.min());
    }

    #[test]
    fn test_surface_winds_ccw_from_above() {
        let section = builder(6, MeshOptions::default()).build(|_, _| 0.0);
        for (t, [a, b, c]) in section.surface.triangles().enumerate() {
            assert!(triangle_faces_up(a, b, c), "triangle {t} faces down");
        }
        for n in &section.surface.normals {
            assert!(
                (n[1] - 1.0).abs() < 1e-6,
                "flat terrain normals point straight up, got {n:?}"
            );
        }
    }

    #[test]
    fn test_skirt_closure() {
        let section = builder(4, MeshOptions::default()).build(bumpy);

        assert_eq!(section.perimeter_len(), 16);
        for pair in section.skirt.positions.chunks_exact(2) {
            assert_eq!(pair[1][1], section.deepest_depth);
        }
        assert!(section.deepest_depth <= section.grid.min());
    }

    #[test]
    fn test_deepest_depth_uses_margin() {
        let options = MeshOptions {
            skirt_margin: 2.5,
            ..Default::default()
        };
        let section = builder(3, options).build(|_, _| 4.0);
        assert_eq!(section.deepest_depth, 1.5);
    }

    #[test]
    fn test_skirt_floor_caps_depth() {
        let options = MeshOptions {
            skirt_margin: 1.0,
            skirt_floor: Some(-8.0),
            ..Default::default()
        };
        let section = builder(3, options).build(|_, _| 4.0);
        assert_eq!(section.deepest_depth, -8.0);
        assert_eq!(section.bottom.positions[0][1], -8.0);
    }

    #[test]
    fn test_water_quad_only_when_configured() {
        let dry = builder(2, MeshOptions::default()).build(bumpy);
        assert!(dry.water.is_none());

        let wet = builder(
            2,
            MeshOptions {
                water_level: Some(0.0),
                ..Default::default()
            },
        )
        .build(bumpy);
        let water = wet.water.expect("water quad requested");
        assert!(water.positions.iter().all(|p| p[1] == 0.0));
    }

    #[test]
    fn test_single_cell_section() {
        let section = builder(1, MeshOptions::default()).build(bumpy);
        assert_eq!(section.surface.vertex_count(), 4);
        assert_eq!(section.surface.triangle_count(), 2);
        assert_eq!(section.perimeter_len(), 4);
    }

    #[test]
    fn test_negative_margin_is_rejected() {
        let params = GridParams::new(2, 1.0, IVec2::ZERO).unwrap();
        let result = TerrainMeshBuilder::new(
            params,
            MeshOptions {
                skirt_margin: -1.0,
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(MeshError::InvalidSkirtMargin(_))));
    }

    #[test]
    fn test_parallel_build_matches_sequential() {
        let b = builder(20, MeshOptions::default());
        let sequential = b.build(bumpy);
        let parallel = b
            .build_parallel(&bumpy, 4, &CancelToken::new())
            .expect("not cancelled");
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let b = builder(8, MeshOptions::default());
        assert_eq!(b.build(bumpy).surface, b.build(bumpy).surface);
    }
}
