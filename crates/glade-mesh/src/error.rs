//! Mesh construction error types.

/// Errors raised while validating grid parameters or building terrain meshes.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MeshError {
    /// A section needs at least one cell per side.
    #[error("section size must be at least 1, got {0}")]
    EmptySection(u32),

    /// The vertex count would not fit a `u32` index buffer.
    #[error("section size {0} overflows the u32 index range")]
    SectionTooLarge(u32),

    /// World units per cell must be finite and strictly positive.
    #[error("tile scale must be finite and > 0, got {0}")]
    InvalidTileScale(f32),

    /// The skirt margin must be finite and non-negative.
    #[error("skirt margin must be finite and >= 0, got {0}")]
    InvalidSkirtMargin(f32),

    /// A parallel grid fill was cancelled between row batches.
    #[error("grid fill cancelled")]
    Cancelled,
}
