//! Terrain meshing: shared-edge height grids, area-weighted normals, perimeter
//! skirts and flat caps, exported as flat renderer-ready buffers.

mod error;
mod grid;
mod skirt;
mod surface;
mod terrain_mesh;
mod winding;

pub use error::MeshError;
pub use grid::{CancelToken, ElevationGrid, GridParams, fill_grid, fill_grid_parallel};
pub use skirt::{QuadFacing, build_bottom_cap, build_flat_quad, build_skirt, perimeter_order};
pub use surface::{SurfaceMesh, compute_normals};
pub use terrain_mesh::{MeshOptions, TerrainMeshBuilder, TerrainSection};
pub use winding::{triangle_faces_up, triangle_normal, triangle_winds_outward};
