//! Terrain generation error types.

use glade_mesh::MeshError;

/// Configuration errors raised at the terrain generation boundary.
///
/// Scatter draws rejected by the height threshold are not errors; they are
/// silently dropped.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TerrainError {
    /// A noise layer's spatial period must be finite and strictly positive.
    #[error("noise scale must be finite and > 0, got {0}")]
    InvalidNoiseScale(f64),

    /// A height field needs at least one layer to fold.
    #[error("height field has no layers")]
    NoLayers,

    /// The elevation remap range must be finite and non-empty.
    #[error("invalid height range {min}..{max}")]
    InvalidHeightRange {
        /// Elevation for a folded value of 0.
        min: f64,
        /// Elevation for a folded value of 1.
        max: f64,
    },

    /// Scattering needs at least one prototype group to choose from.
    #[error("scatter requested with no prototype groups")]
    EmptyPrototypeGroups,

    /// Prototype weights must be finite, non-negative and not all zero.
    #[error("invalid prototype weights: {0}")]
    InvalidWeights(String),

    /// The centre shrink divides the sampling half-extent and must be >= 1.
    #[error("center shrink must be finite and >= 1, got {0}")]
    InvalidCenterShrink(f64),

    /// Scale jitter bounds must satisfy `0 < min <= max`.
    #[error("invalid scale range {0}..{1}")]
    InvalidScaleRange(f64, f64),

    /// Grid or mesh configuration was rejected.
    #[error(transparent)]
    Mesh(#[from] MeshError),
}
