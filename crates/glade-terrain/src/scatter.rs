//! Rejection-sampled object scattering.
//!
//! Each attempt draws an `(x, z)` inside the (optionally shrunk) section
//! bounds, samples the terrain there and keeps the point only if it lies
//! strictly above the height threshold. Accepted points get a weighted
//! prototype group, a uniform scale in `scale_range` and a yaw in `[0, 2π)`.
//!
//! The number of placements is therefore a random variable bounded by the
//! attempt count, never a target.

use std::f64::consts::TAU;

use glam::{DVec2, DVec3};
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::TerrainError;

/// Opaque handle naming a renderable prototype (a tree model, a house...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrototypeId(pub u32);

/// A weighted choice among placement prototypes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PrototypeGroup {
    /// Relative selection weight; must be finite and non-negative.
    pub weight: f64,
    /// Prototype instanced when this group is drawn.
    pub prototype: PrototypeId,
}

impl PrototypeGroup {
    /// A group drawing `prototype` with relative `weight`.
    pub fn new(weight: f64, prototype: PrototypeId) -> Self {
        Self { weight, prototype }
    }
}

/// Inputs to one scatter pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScatterParams {
    /// Number of candidate points to draw.
    pub attempts: u32,
    /// Candidates must sit strictly above this elevation.
    pub height_threshold: f64,
    /// Divides the sampling half-extent; `1.0` uses the full bounds.
    pub center_shrink: f64,
    /// Inclusive `(min, max)` uniform scale jitter.
    pub scale_range: (f64, f64),
}

impl Default for ScatterParams {
    fn default() -> Self {
        Self {
            attempts: 0,
            height_threshold: 0.0,
            center_shrink: 1.0,
            scale_range: (1.0, 1.0),
        }
    }
}

/// One accepted placement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScatterPlacement {
    /// World position; `y` is the terrain elevation at `(x, z)`.
    pub position: DVec3,
    /// Uniform scale drawn from the scale range.
    pub scale: f64,
    /// Yaw in radians, `[0, 2π)`.
    pub rotation_y: f64,
    /// Index into the group slice passed to [`scatter`].
    pub prototype_group_index: usize,
}

/// Scatter objects over `bounds` using a fresh ChaCha8 stream from `rng_seed`.
///
/// # Errors
///
/// See [`scatter_with_rng`].
pub fn scatter(
    height_fn: impl Fn(f64, f64) -> f64,
    bounds: (DVec2, DVec2),
    params: &ScatterParams,
    groups: &[PrototypeGroup],
    rng_seed: u64,
) -> Result<Vec<ScatterPlacement>, TerrainError> {
    let mut rng = ChaCha8Rng::seed_from_u64(rng_seed);
    scatter_with_rng(height_fn, bounds, params, groups, &mut rng)
}

/// Scatter objects drawing from a caller-owned RNG.
///
/// Draw order per attempt is `x`, `z`, then for accepted points the group,
/// scale and yaw. Rejected attempts consume exactly two draws.
///
/// # Errors
///
/// Returns [`TerrainError::EmptyPrototypeGroups`] when `groups` is empty,
/// [`TerrainError::InvalidWeights`] when the weights cannot form a
/// distribution, [`TerrainError::InvalidCenterShrink`] for a shrink below 1
/// and [`TerrainError::InvalidScaleRange`] unless `0 < min <= max`.
pub fn scatter_with_rng<R: Rng>(
    height_fn: impl Fn(f64, f64) -> f64,
    bounds: (DVec2, DVec2),
    params: &ScatterParams,
    groups: &[PrototypeGroup],
    rng: &mut R,
) -> Result<Vec<ScatterPlacement>, TerrainError> {
    if groups.is_empty() {
        return Err(TerrainError::EmptyPrototypeGroups);
    }
    let chooser = WeightedIndex::new(groups.iter().map(|g| g.weight))
        .map_err(|e| TerrainError::InvalidWeights(e.to_string()))?;
    if !params.center_shrink.is_finite() || params.center_shrink < 1.0 {
        return Err(TerrainError::InvalidCenterShrink(params.center_shrink));
    }
    let (min_scale, max_scale) = params.scale_range;
    if !(min_scale.is_finite() && max_scale.is_finite() && min_scale > 0.0 && min_scale <= max_scale) {
        return Err(TerrainError::InvalidScaleRange(min_scale, max_scale));
    }

    let (lo, hi) = bounds;
    let center = (lo + hi) * 0.5;
    let half = (hi - lo).abs() * 0.5 / params.center_shrink;
    let (min, max) = (center - half, center + half);

    let mut placements = Vec::new();
    for _ in 0..params.attempts {
        let x = draw_in(rng, min.x, max.x);
        let z = draw_in(rng, min.y, max.y);
        let y = height_fn(x, z);
        if y.is_nan() || y <= params.height_threshold {
            continue;
        }

        let prototype_group_index = chooser.sample(rng);
        let scale = rng.random_range(min_scale..=max_scale);
        let rotation_y = rng.random_range(0.0..TAU);
        placements.push(ScatterPlacement {
            position: DVec3::new(x, y, z),
            scale,
            rotation_y,
            prototype_group_index,
        });
    }

    tracing::trace!(
        attempts = params.attempts,
        accepted = placements.len(),
        threshold = params.height_threshold,
        "scatter pass"
    );

    Ok(placements)
}

/// Uniform draw in `[lo, hi)`, or `lo` for a degenerate span.
fn draw_in<R: Rng>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    let t: f64 = rng.random();
    lo + (hi - lo) * t
}
