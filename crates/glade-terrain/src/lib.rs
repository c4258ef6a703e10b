//! Deterministic procedural terrain sections.
//!
//! This crate turns a seed into a meshed terrain section with scattered
//! objects. Its modules are:
//!
//! - **Noise** ([`entropy`]) is seeded 2D lattice noise in value and gradient
//!   flavours, with outputs in `[0, 1]`.
//! - **Height fields** ([`heightfield`]) fold layers of noise into an
//!   elevation. The five-layer stack is rolled from the seed.
//! - **Scattering** ([`scatter`]) places objects by rejection sampling
//!   against a height threshold.
//! - **Sections** ([`section`]) run the full pipeline: height field, mesh,
//!   spawn point and scatter layers.
//! - **Seeding** ([`seed`]) derives the sub-seeds and provides deterministic
//!   math and digests.
//! - **Debug images** ([`debug_viz`]) render top-down heightmaps and
//!   placement overlays.
//!
//! Meshing itself lives in `glade-mesh`. Its main types are re-exported here.

pub mod debug_viz;
pub mod entropy;
pub mod error;
pub mod heightfield;
pub mod scatter;
pub mod section;
pub mod seed;

pub use debug_viz::{DebugImage, render_heightmap_debug, render_placements};
pub use entropy::{LATTICE_SIZE, NoiseField, NoiseKind};
pub use error::TerrainError;
pub use glade_mesh::{
    CancelToken, GridParams, MeshError, MeshOptions, SurfaceMesh, TerrainMeshBuilder,
    TerrainSection,
};
pub use heightfield::{HeightField, HeightLayer, LayerTransform, TerrainCharacter, mix, smootherstep};
pub use scatter::{
    PrototypeGroup, PrototypeId, ScatterParams, ScatterPlacement, scatter, scatter_with_rng,
};
pub use section::{
    Attempts, GeneratedSection, HeightThreshold, LayerPlacements, ScatterLayer, SectionGenerator,
    SectionSpec,
};
pub use seed::{derive_seed, section_digest, stage_rng};
