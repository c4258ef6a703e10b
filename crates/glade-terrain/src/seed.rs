//! Deterministic seeded generation utilities.
//!
//! Every random decision in a section flows from one section seed. Sub-seeds
//! for noise layers, the terrain character and each scatter layer are
//! derived by hashing that seed with a fixed salt, and each sub-seed drives
//! its own ChaCha8 stream so adding a draw in one stage never shifts another.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use glade_mesh::{SurfaceMesh, TerrainSection};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Salt for the stream that rolls the terrain character.
pub const CHARACTER_SALT: u64 = 0x00C4_A2AC_7E25;

/// Base salt for scatter layer streams; layer `i` uses `SCATTER_SALT + i`.
pub const SCATTER_SALT: u64 = 0x5CA7_7E20_0000;

// ---------------------------------------------------------------------------
// Seed derivation
// ---------------------------------------------------------------------------

/// Combine a section seed with a salt into a well-distributed sub-seed.
///
/// Uses SipHash (via std's `DefaultHasher`) so neighbouring salts produce
/// unrelated seeds.
pub fn derive_seed(section_seed: u64, salt: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    section_seed.hash(&mut hasher);
    salt.hash(&mut hasher);
    hasher.finish()
}

/// Deterministic RNG for one generation stage.
pub fn stage_rng(section_seed: u64, salt: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_seed(section_seed, salt))
}

// ---------------------------------------------------------------------------
// Deterministic math (libm)
// ---------------------------------------------------------------------------

/// Deterministic sine using libm (not platform libc).
#[inline]
pub fn det_sin(x: f64) -> f64 {
    libm::sin(x)
}

/// Deterministic cosine using libm.
#[inline]
pub fn det_cos(x: f64) -> f64 {
    libm::cos(x)
}

/// Deterministic power using libm.
#[inline]
pub fn det_pow(x: f64, y: f64) -> f64 {
    libm::pow(x, y)
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Hash every buffer of a section for determinism comparison.
///
/// Floats are hashed by bit pattern, so two sections share a digest only if
/// their buffers are bit-identical.
pub fn section_digest(section: &TerrainSection) -> u64 {
    let mut hasher = DefaultHasher::new();
    hash_mesh(&section.surface, &mut hasher);
    hash_mesh(&section.skirt, &mut hasher);
    hash_mesh(&section.bottom, &mut hasher);
    section.deepest_depth.to_bits().hash(&mut hasher);
    hasher.finish()
}

fn hash_mesh(mesh: &SurfaceMesh, hasher: &mut DefaultHasher) {
    for v in mesh.position_buffer() {
        v.to_bits().hash(hasher);
    }
    for n in mesh.normal_buffer() {
        n.to_bits().hash(hasher);
    }
    mesh.indices.hash(hasher);
}
