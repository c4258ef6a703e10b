//! Seeded 2D lattice noise.
//!
//! A [`NoiseField`] owns a table of 256 pseudo-random values drawn once from
//! its seed. Sampling hashes integer lattice coordinates into that table and
//! interpolates, so the field is a pure function of `(x, z)` and can be
//! shared freely across threads.
//!
//! Two interpolation schemes are offered:
//!
//! - [`NoiseKind::Gradient`]: each lattice corner carries a unit gradient
//!   derived from its table value, blended with a quintic fade. `C²`
//!   continuous and the default for terrain.
//! - [`NoiseKind::Value`]: corner values blended barycentrically over the
//!   two triangles of each cell. Only `C⁰` continuous, cheaper, and visibly
//!   faceted at large scales.

use std::f64::consts::{FRAC_1_SQRT_2, SQRT_2, TAU};

use glam::DVec2;
use noise::NoiseFn;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::TerrainError;
use crate::heightfield::smootherstep;
use crate::seed::{det_cos, det_sin};

/// Number of entries in a field's value table.
pub const LATTICE_SIZE: usize = 256;

/// Interpolation scheme used by a [`NoiseField`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NoiseKind {
    /// Barycentric interpolation of corner values.
    Value,
    /// Quintic blend of corner gradient dot products.
    #[default]
    Gradient,
}

/// Deterministic 2D noise with outputs in `[0, 1]`.
#[derive(Clone, Debug)]
pub struct NoiseField {
    scale: f64,
    seed: u64,
    kind: NoiseKind,
    lattice: Box<[f64; LATTICE_SIZE]>,
    gradients: Box<[DVec2; LATTICE_SIZE]>,
}

impl NoiseField {
    /// Build a field with spatial period `scale` world units.
    ///
    /// The value table is filled from a ChaCha8 stream seeded with `seed`;
    /// construction is the only place randomness is drawn.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::InvalidNoiseScale`] unless `scale` is finite
    /// and strictly positive.
    pub fn new(scale: f64, seed: u64, kind: NoiseKind) -> Result<Self, TerrainError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(TerrainError::InvalidNoiseScale(scale));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut lattice = Box::new([0.0_f64; LATTICE_SIZE]);
        for value in lattice.iter_mut() {
            *value = rng.random::<f64>();
        }

        let mut gradients = Box::new([DVec2::ZERO; LATTICE_SIZE]);
        for (gradient, &value) in gradients.iter_mut().zip(lattice.iter()) {
            let angle = value * TAU;
            *gradient = DVec2::new(det_cos(angle), det_sin(angle));
        }

        Ok(Self {
            scale,
            seed,
            kind,
            lattice,
            gradients,
        })
    }

    /// Spatial period in world units.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Seed the value table was drawn from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Interpolation scheme.
    pub fn kind(&self) -> NoiseKind {
        self.kind
    }

    /// The value table, each entry in `[0, 1)`.
    pub fn lattice(&self) -> &[f64] {
        &self.lattice[..]
    }

    /// Sample the field at world `(x, z)`. Always in `[0, 1]`, including for
    /// non-finite input.
    pub fn sample(&self, x: f64, z: f64) -> f64 {
        let gx = x / self.scale;
        let gz = z / self.scale;
        match self.kind {
            NoiseKind::Value => self.sample_value(gx, gz),
            NoiseKind::Gradient => self.sample_gradient(gx, gz),
        }
    }

    fn sample_value(&self, gx: f64, gz: f64) -> f64 {
        let (ix, mut fx) = split_cell(gx);
        let (iz, mut fz) = split_cell(gz);

        let v1 = self.lattice[value_index(ix.wrapping_add(1), iz)];
        let v2 = self.lattice[value_index(ix, iz.wrapping_add(1))];

        // The cell is split along its anti-diagonal. In the far triangle,
        // measure from the opposite corner with the axes swapped.
        let root = if fx + fz > 1.0 {
            (fx, fz) = (1.0 - fz, 1.0 - fx);
            self.lattice[value_index(ix.wrapping_add(1), iz.wrapping_add(1))]
        } else {
            self.lattice[value_index(ix, iz)]
        };

        let value = root + (v1 - root) * fx + (v2 - root) * fz;
        value.clamp(0.0, 1.0)
    }

    fn sample_gradient(&self, gx: f64, gz: f64) -> f64 {
        let (ix, fx) = split_cell(gx);
        let (iz, fz) = split_cell(gz);

        let corner = |cx: i64, cz: i64| {
            let g = self.gradients[gradient_index(ix.wrapping_add(cx), iz.wrapping_add(cz))];
            g.dot(DVec2::new(fx - cx as f64, fz - cz as f64))
        };

        let u = smootherstep(fx);
        let v = smootherstep(fz);
        let near = lerp(corner(0, 0), corner(1, 0), u);
        let far = lerp(corner(0, 1), corner(1, 1), u);
        let value = lerp(near, far, v);

        ((value + FRAC_1_SQRT_2) / SQRT_2).clamp(0.0, 1.0)
    }
}

impl NoiseFn<f64, 2> for NoiseField {
    fn get(&self, point: [f64; 2]) -> f64 {
        self.sample(point[0], point[1])
    }
}

/// Integer cell and in-cell fraction of a lattice coordinate.
///
/// Coordinates beyond `i64` saturate. Non-finite input lands on a lattice
/// point of the saturated (or, for NaN, zero) cell.
#[inline]
fn split_cell(g: f64) -> (i64, f64) {
    if !g.is_finite() {
        return (g as i64, 0.0);
    }
    let floor = g.floor();
    (floor as i64, g - floor)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Table index for value noise: a fixed polynomial in the lattice
/// coordinates, reduced to `0..256`.
#[inline]
fn value_index(x: i64, z: i64) -> usize {
    let h = x
        .wrapping_add(207_460)
        .wrapping_mul(z.wrapping_add(163_676))
        .wrapping_mul(435);
    h.rem_euclid(LATTICE_SIZE as i64) as usize
}

/// Table index for gradient noise: an avalanche mix of both coordinates so
/// neighbouring corners land on unrelated entries.
#[inline]
fn gradient_index(x: i64, z: i64) -> usize {
    let mut h = (x as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (z as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    h ^= h >> 29;
    h = h.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h ^= h >> 32;
    (h & (LATTICE_SIZE as u64 - 1)) as usize
}
