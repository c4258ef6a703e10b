//! End-to-end section generation.
//!
//! [`SectionGenerator`] owns a validated grid and mesh configuration plus a
//! list of scatter layers. Each call to [`SectionGenerator::generate`]:
//!
//! 1. Rolls the terrain character and height field from the section seed.
//! 2. Samples and meshes the section (optionally across worker threads).
//! 3. Places the spawn point at the section centre.
//! 4. Runs every scatter layer on its own seed-derived RNG stream.
//!
//! Generation is a pure function of `(seed, spec)`.

use glade_mesh::{CancelToken, GridParams, MeshOptions, TerrainMeshBuilder, TerrainSection};
use glam::{DVec3, IVec2};
use rand::Rng;

use crate::entropy::NoiseKind;
use crate::error::TerrainError;
use crate::heightfield::HeightField;
use crate::scatter::{PrototypeGroup, ScatterParams, ScatterPlacement, scatter_with_rng};
use crate::seed::{SCATTER_SALT, stage_rng};

/// How many candidate points a scatter layer draws.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Attempts {
    /// Exactly this many.
    Fixed(u32),
    /// `floor(section_extent * rate)`.
    PerWorldUnit(f64),
    /// A count drawn uniformly from `0..n` on the layer's stream.
    UpTo(u32),
}

/// Elevation a scatter candidate must exceed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HeightThreshold {
    /// An absolute world elevation.
    Above(f64),
    /// A fraction of the height field's maximum elevation.
    FractionOfMaxHeight(f64),
}

/// One named family of scattered objects (trees, houses, ...).
#[derive(Clone, Debug, PartialEq)]
pub struct ScatterLayer {
    /// Label used in logs and reports.
    pub name: String,
    /// How many candidates to draw.
    pub attempts: Attempts,
    /// Elevation candidates must exceed.
    pub threshold: HeightThreshold,
    /// Divides the sampling half-extent; `1.0` uses the whole section.
    pub center_shrink: f64,
    /// Inclusive `(min, max)` uniform scale jitter.
    pub scale_range: (f64, f64),
    /// Weighted prototypes to choose from; never empty.
    pub groups: Vec<PrototypeGroup>,
}

/// Everything needed to generate a section apart from the seed.
#[derive(Clone, Debug, PartialEq)]
pub struct SectionSpec {
    /// Cells per side.
    pub size: u32,
    /// World units per cell.
    pub tile_scale: f32,
    /// Section offset in cells.
    pub origin: IVec2,
    /// Noise variant for every height layer.
    pub noise: NoiseKind,
    /// Skirt, UV and water settings.
    pub mesh: MeshOptions,
    /// Skirt never ends above `-size * skirt_floor_per_cell` when set.
    pub skirt_floor_per_cell: Option<f32>,
    /// Scatter passes, each on its own random stream.
    pub scatter_layers: Vec<ScatterLayer>,
    /// Worker threads for grid sampling: 1 samples inline, 0 uses one per CPU.
    pub fill_threads: usize,
}

impl Default for SectionSpec {
    fn default() -> Self {
        Self {
            size: 100,
            tile_scale: 1.0,
            origin: IVec2::ZERO,
            noise: NoiseKind::Gradient,
            mesh: MeshOptions::default(),
            skirt_floor_per_cell: Some(1.0),
            scatter_layers: Vec::new(),
            fill_threads: 1,
        }
    }
}

/// Placements produced by one scatter layer.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerPlacements {
    /// Name of the originating [`ScatterLayer`].
    pub name: String,
    /// Attempts actually drawn after resolving [`Attempts`].
    pub attempts: u32,
    /// Elevation candidates had to exceed.
    pub threshold: f64,
    /// Accepted placements in draw order.
    pub placements: Vec<ScatterPlacement>,
}

/// A fully generated section.
#[derive(Clone, Debug)]
pub struct GeneratedSection {
    /// Seed the section was generated from.
    pub seed: u64,
    /// The rolled height field, reusable for further sampling.
    pub height_field: HeightField,
    /// Grid, surface, skirt and cap meshes.
    pub section: TerrainSection,
    /// Surface point at the section centre.
    pub spawn_point: DVec3,
    /// One entry per configured scatter layer, in order.
    pub layers: Vec<LayerPlacements>,
}

impl GeneratedSection {
    /// Total placements across all layers.
    pub fn placement_count(&self) -> usize {
        self.layers.iter().map(|l| l.placements.len()).sum()
    }
}

/// Validated generator for sections sharing one [`SectionSpec`].
#[derive(Clone, Debug)]
pub struct SectionGenerator {
    spec: SectionSpec,
    builder: TerrainMeshBuilder,
}

impl SectionGenerator {
    /// Validate `spec` and prepare the mesh builder.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::Mesh`] for an invalid size, tile scale or
    /// skirt margin, and [`TerrainError::EmptyPrototypeGroups`] for a scatter
    /// layer with no groups.
    pub fn new(spec: SectionSpec) -> Result<Self, TerrainError> {
        let params = GridParams::new(spec.size, spec.tile_scale, spec.origin)?;
        let mut options = spec.mesh;
        if let Some(per_cell) = spec.skirt_floor_per_cell {
            let floor = -(spec.size as f32) * per_cell;
            options.skirt_floor = Some(options.skirt_floor.map_or(floor, |f| f.min(floor)));
        }
        let builder = TerrainMeshBuilder::new(params, options)?;

        if spec.scatter_layers.iter().any(|layer| layer.groups.is_empty()) {
            return Err(TerrainError::EmptyPrototypeGroups);
        }

        Ok(Self { spec, builder })
    }

    /// The validated section parameters.
    pub fn spec(&self) -> &SectionSpec {
        &self.spec
    }

    /// Grid geometry shared by every generated section.
    pub fn params(&self) -> &GridParams {
        self.builder.params()
    }

    /// Generate the section for `seed` with the seed-derived height field.
    pub fn generate(&self, seed: u64) -> Result<GeneratedSection, TerrainError> {
        self.generate_cancellable(seed, &CancelToken::new())
    }

    /// As [`generate`](Self::generate), stopping early if `cancel` fires
    /// during a parallel fill.
    pub fn generate_cancellable(&self, seed: u64, cancel: &CancelToken) -> Result<GeneratedSection, TerrainError> {
        let height_field = HeightField::configure(seed, self.spec.noise)?;
        self.generate_with(seed, height_field, cancel)
    }

    /// Generate using a caller-supplied height field.
    ///
    /// The seed still drives the scatter streams.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::Mesh`] wrapping
    /// [`MeshError::Cancelled`](glade_mesh::MeshError::Cancelled) if the fill
    /// was cancelled, or any scatter validation error.
    pub fn generate_with(
        &self,
        seed: u64,
        height_field: HeightField,
        cancel: &CancelToken,
    ) -> Result<GeneratedSection, TerrainError> {
        let height_fn = |x: f64, z: f64| height_field.sample(x, z);
        let section = match self.fill_threads() {
            1 => self.builder.build(&height_fn),
            threads => self.builder.build_parallel(&height_fn, threads, cancel)?,
        };

        let params = self.builder.params();
        let center = params.center();
        let spawn_point = DVec3::new(center.x, height_field.sample(center.x, center.y), center.y);

        let mut layers = Vec::with_capacity(self.spec.scatter_layers.len());
        for (index, layer) in self.spec.scatter_layers.iter().enumerate() {
            let mut rng = stage_rng(seed, SCATTER_SALT + index as u64);
            let attempts = resolve_attempts(layer.attempts, params.extent(), &mut rng);
            let threshold = match layer.threshold {
                HeightThreshold::Above(y) => y,
                HeightThreshold::FractionOfMaxHeight(f) => height_field.max_height() * f,
            };
            let scatter_params = ScatterParams {
                attempts,
                height_threshold: threshold,
                center_shrink: layer.center_shrink,
                scale_range: layer.scale_range,
            };
            let placements = scatter_with_rng(
                &height_fn,
                params.bounds(),
                &scatter_params,
                &layer.groups,
                &mut rng,
            )?;

            if attempts > 0 && placements.is_empty() {
                tracing::warn!(
                    layer = %layer.name,
                    attempts,
                    threshold,
                    "scatter layer placed nothing"
                );
            }
            tracing::debug!(
                layer = %layer.name,
                attempts,
                threshold,
                accepted = placements.len(),
                "scattered layer"
            );

            layers.push(LayerPlacements {
                name: layer.name.clone(),
                attempts,
                threshold,
                placements,
            });
        }

        tracing::info!(
            seed,
            size = params.size(),
            vertices = section.surface.vertex_count(),
            triangles = section.surface.triangle_count(),
            min = section.grid.min(),
            max = section.grid.max(),
            placements = layers.iter().map(|l| l.placements.len()).sum::<usize>(),
            "generated terrain section"
        );

        Ok(GeneratedSection {
            seed,
            height_field,
            section,
            spawn_point,
            layers,
        })
    }

    fn fill_threads(&self) -> usize {
        match self.spec.fill_threads {
            0 => num_cpus::get().max(1),
            n => n,
        }
    }
}

fn resolve_attempts(attempts: Attempts, extent: f64, rng: &mut impl Rng) -> u32 {
    match attempts {
        Attempts::Fixed(n) => n,
        Attempts::PerWorldUnit(rate) => (extent * rate).floor().clamp(0.0, u32::MAX as f64) as u32,
        Attempts::UpTo(0) => 0,
        Attempts::UpTo(n) => rng.random_range(0..n),
    }
}
