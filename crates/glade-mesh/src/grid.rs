//! Regular elevation grid over a terrain section.
//!
//! A section of `size` cells per side is sampled at `(size + 1)²` shared
//! vertices. Sampling runs either sequentially or across scoped worker
//! threads in contiguous row batches, with a [`CancelToken`] checked between
//! batches. Both paths produce bit-identical grids because every vertex is
//! an independent call into a pure height function.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use glam::{DVec2, IVec2};

use crate::error::MeshError;

/// Validated placement and resolution of a terrain section.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridParams {
    size: u32,
    tile_scale: f32,
    origin: IVec2,
}

impl GridParams {
    /// Largest size whose vertex count still fits a `u32` index buffer.
    pub const MAX_SIZE: u32 = 65_534;

    /// Create grid parameters.
    ///
    /// `origin` is the section offset in cells; the first vertex sits at
    /// `origin * tile_scale` in world space.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::EmptySection`] for `size == 0`,
    /// [`MeshError::SectionTooLarge`] above [`Self::MAX_SIZE`] and
    /// [`MeshError::InvalidTileScale`] for a non-finite or non-positive scale.
    pub fn new(size: u32, tile_scale: f32, origin: IVec2) -> Result<Self, MeshError> {
        if size == 0 {
            return Err(MeshError::EmptySection(size));
        }
        if size > Self::MAX_SIZE {
            return Err(MeshError::SectionTooLarge(size));
        }
        if !tile_scale.is_finite() || tile_scale <= 0.0 {
            return Err(MeshError::InvalidTileScale(tile_scale));
        }
        Ok(Self {
            size,
            tile_scale,
            origin,
        })
    }

    /// Cells per side.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// World units per cell.
    pub fn tile_scale(&self) -> f32 {
        self.tile_scale
    }

    /// Section offset in cells.
    pub fn origin(&self) -> IVec2 {
        self.origin
    }

    /// Vertices per side (`size + 1`).
    pub fn side(&self) -> usize {
        self.size as usize + 1
    }

    /// Total vertex count of the shared-edge grid.
    pub fn vertex_count(&self) -> usize {
        self.side() * self.side()
    }

    /// Triangle count of the surface (two per cell).
    pub fn triangle_count(&self) -> usize {
        self.size as usize * self.size as usize * 2
    }

    /// Flat index of the vertex at `(col, row)`.
    #[inline]
    pub fn vertex_index(&self, col: usize, row: usize) -> usize {
        row * self.side() + col
    }

    /// World-space `(x, z)` of the vertex at `(col, row)`.
    #[inline]
    pub fn world_xz(&self, col: usize, row: usize) -> DVec2 {
        let scale = self.tile_scale as f64;
        DVec2::new(
            (self.origin.x as f64 + col as f64) * scale,
            (self.origin.y as f64 + row as f64) * scale,
        )
    }

    /// Section edge length in world units.
    pub fn extent(&self) -> f64 {
        self.size as f64 * self.tile_scale as f64
    }

    /// World-space `(min, max)` corners of the section footprint.
    pub fn bounds(&self) -> (DVec2, DVec2) {
        let min = self.world_xz(0, 0);
        let max = self.world_xz(self.size as usize, self.size as usize);
        (min, max)
    }

    /// World-space centre of the section footprint.
    pub fn center(&self) -> DVec2 {
        let (min, max) = self.bounds();
        (min + max) * 0.5
    }
}

/// Sampled elevations of a section, row-major with rows along +Z.
#[derive(Clone, Debug, PartialEq)]
pub struct ElevationGrid {
    side: usize,
    values: Vec<f32>,
    min: f32,
    max: f32,
}

impl ElevationGrid {
    /// Wrap row-major values. `values.len()` must equal `side * side`.
    pub fn from_values(side: usize, values: Vec<f32>) -> Self {
        debug_assert_eq!(values.len(), side * side);
        let (min, max) = values
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        Self {
            side,
            values,
            min,
            max,
        }
    }

    /// Vertices per side.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Elevation at `(col, row)`.
    #[inline]
    pub fn get(&self, col: usize, row: usize) -> f32 {
        self.values[row * self.side + col]
    }

    /// Row-major elevations.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Lowest sampled elevation.
    pub fn min(&self) -> f32 {
        self.min
    }

    /// Highest sampled elevation.
    pub fn max(&self) -> f32 {
        self.max
    }
}

/// Shared cancellation flag for a parallel grid fill.
///
/// Cloning shares the flag, so a handle kept by the caller can stop a fill
/// running on other threads.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Workers stop at their next batch boundary.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Sample `height_fn` at every grid vertex on the calling thread.
pub fn fill_grid(height_fn: impl Fn(f64, f64) -> f64, params: &GridParams) -> ElevationGrid {
    let side = params.side();
    let mut values = Vec::with_capacity(params.vertex_count());
    for row in 0..side {
        for col in 0..side {
            let p = params.world_xz(col, row);
            values.push(height_fn(p.x, p.y) as f32);
        }
    }
    ElevationGrid::from_values(side, values)
}

/// Sample `height_fn` across `threads` scoped workers.
///
/// Rows are grouped into contiguous batches handed out round-robin; each
/// worker checks `cancel` before starting a batch, never mid-sample.
///
/// # Errors
///
/// Returns [`MeshError::Cancelled`] if the token was cancelled before every
/// batch completed.
pub fn fill_grid_parallel<F>(
    height_fn: &F,
    params: &GridParams,
    threads: usize,
    cancel: &CancelToken,
) -> Result<ElevationGrid, MeshError>
where
    F: Fn(f64, f64) -> f64 + Sync,
{
    let side = params.side();
    let threads = threads.clamp(1, side);
    // Several batches per worker so a cancel lands quickly.
    let rows_per_batch = side.div_ceil(threads * 4).max(1);
    let mut values = vec![0.0_f32; params.vertex_count()];

    std::thread::scope(|scope| {
        let mut per_worker: Vec<Vec<(usize, &mut [f32])>> =
            (0..threads).map(|_| Vec::new()).collect();
        for (batch, chunk) in values.chunks_mut(rows_per_batch * side).enumerate() {
            per_worker[batch % threads].push((batch, chunk));
        }

        for batches in per_worker {
            scope.spawn(move || {
                for (batch, chunk) in batches {
                    if cancel.is_cancelled() {
                        return;
                    }
                    let first_row = batch * rows_per_batch;
                    for (offset, value) in chunk.iter_mut().enumerate() {
                        let p = params.world_xz(offset % side, first_row + offset / side);
                        *value = height_fn(p.x, p.y) as f32;
                    }
                }
            });
        }
    });

    if cancel.is_cancelled() {
        tracing::debug!(side, threads, "parallel grid fill cancelled");
        return Err(MeshError::Cancelled);
    }

    Ok(ElevationGrid::from_values(side, values))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slope(x: f64, z: f64) -> f64 {
        x * 0.5 - z * 0.25
    }

    #[test]
    fn test_zero_size_is_rejected() {
        assert_eq!(
            GridParams::new(0, 1.0, IVec2::ZERO),
            Err(MeshError::EmptySection(0))
        );
    }

    #[test]
    fn test_invalid_tile_scale_is_rejected() {
        for scale in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            assert!(
                matches!(
                    GridParams::new(4, scale, IVec2::ZERO),
                    Err(MeshError::InvalidTileScale(_))
                ),
                "tile scale {scale} should be rejected"
            );
        }
    }

    #[test]
    fn test_oversized_section_is_rejected() {
        assert_eq!(
            GridParams::new(GridParams::MAX_SIZE + 1, 1.0, IVec2::ZERO),
            Err(MeshError::SectionTooLarge(GridParams::MAX_SIZE + 1))
        );
    }

    #[test]
    fn test_world_xz_applies_origin_and_scale() {
        let params = GridParams::new(4, 2.0, IVec2::new(4, -4)).unwrap();
        assert_eq!(params.world_xz(0, 0), DVec2::new(8.0, -8.0));
        assert_eq!(params.world_xz(4, 4), DVec2::new(16.0, 0.0));
        assert_eq!(params.extent(), 8.0);
        assert_eq!(params.center(), DVec2::new(12.0, -4.0));
    }

    #[test]
    fn test_fill_grid_tracks_min_and_max() {
        let params = GridParams::new(4, 1.0, IVec2::ZERO).unwrap();
        let grid = fill_grid(slope, &params);

        assert_eq!(grid.side(), 5);
        assert_eq!(grid.values().len(), 25);
        assert_eq!(grid.get(4, 0), 2.0);
        assert_eq!(grid.min(), -1.0, "lowest vertex is (0, 4)");
        assert_eq!(grid.max(), 2.0, "highest vertex is (4, 0)");
    }

    #[test]
    fn test_parallel_fill_matches_sequential() {
        let params = GridParams::new(37, 0.5, IVec2::new(-3, 7)).unwrap();
        let height = |x: f64, z: f64| (x * 0.3).sin() * (z * 0.2).cos() * 10.0;

        let sequential = fill_grid(height, &params);
        for threads in [1, 2, 3, 8, 64] {
            let parallel = fill_grid_parallel(&height, &params, threads, &CancelToken::new())
                .expect("uncancelled fill succeeds");
            assert_eq!(
                sequential, parallel,
                "parallel fill with {threads} threads must be bit-identical"
            );
        }
    }

    #[test]
    fn test_cancelled_fill_returns_error() {
        let params = GridParams::new(16, 1.0, IVec2::ZERO).unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();

        let result = fill_grid_parallel(&slope, &params, 4, &cancel);
        assert_eq!(result, Err(MeshError::Cancelled));
    }

    #[test]
    fn test_cancel_token_clones_share_state() {
        let token = CancelToken::new();
        let handle = token.clone();
        assert!(!token.is_cancelled());
        handle.cancel();
        assert!(token.is_cancelled());
    }
}
