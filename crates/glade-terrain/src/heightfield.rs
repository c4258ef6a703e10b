//! Layered height field composition.
//!
//! A [`HeightField`] folds an ordered list of [`HeightLayer`]s into a single
//! value, then remaps it into the world elevation range:
//!
//! ```text
//! acc = 0
//! for layer in layers:
//!     acc = layer.transform.apply(acc, layer.field.sample(x, z))
//! elevation = mix(min_height, max_height, acc)
//! ```
//!
//! [`HeightField::configure`] rolls a [`TerrainCharacter`] from the section
//! seed and builds the standard five-layer stack from it.

use noise::NoiseFn;
use rand::Rng;

use crate::entropy::{NoiseField, NoiseKind};
use crate::error::TerrainError;
use crate::seed::{CHARACTER_SALT, derive_seed, det_pow, stage_rng};

/// Quintic fade `6t⁵ - 15t⁴ + 10t³`, with input clamped to `[0, 1]`.
#[inline]
pub fn smootherstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Linear blend from `a` (at `t = 0`) to `b` (at `t = 1`).
#[inline]
pub fn mix(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// How a layer's sample updates the running accumulator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LayerTransform {
    /// Replace the accumulator with the sample.
    Base,
    /// Add `sample^exponent * weight`.
    Power {
        /// Shaping exponent; values above 1 sharpen peaks.
        exponent: f64,
        /// Contribution of this octave.
        weight: f64,
    },
    /// Pull the accumulator toward zero where the sample lies within
    /// `width` of `height`, cutting channels through the terrain.
    ///
    /// Accumulator values already below `-height / 8` are left alone.
    RidgeFlatten {
        /// Sample value at the channel centre.
        height: f64,
        /// Half-width of the channel in sample units.
        width: f64,
    },
}

impl LayerTransform {
    /// Fold one sample into the accumulator.
    pub fn apply(&self, acc: f64, sample: f64) -> f64 {
        match *self {
            Self::Base => sample,
            Self::Power { exponent, weight } => acc + det_pow(sample, exponent) * weight,
            Self::RidgeFlatten { height, width } => {
                if acc < -height / 8.0 {
                    acc
                } else {
                    acc * smootherstep(width.min((sample - height).abs()) / width)
                }
            }
        }
    }
}

/// One noise field and the transform applied to its samples.
#[derive(Clone, Debug)]
pub struct HeightLayer {
    /// Noise sampled at each point.
    pub field: NoiseField,
    /// How the sample folds into the running elevation.
    pub transform: LayerTransform,
}

impl HeightLayer {
    /// Pair a field with its transform.
    pub fn new(field: NoiseField, transform: LayerTransform) -> Self {
        Self { field, transform }
    }
}

/// Seed-derived shape parameters for a section's terrain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainCharacter {
    /// Channel centre for the ridge layer, in `[0.25, 0.5)`.
    pub ridge_height: f64,
    /// Channel half-width for the ridge layer, in `(1/32, 1/8]`.
    pub ridge_width: f64,
    /// Spatial period of each of the five layers.
    pub layer_scales: [f64; 5],
    /// Shaping exponents for the three detail octaves, in `[1/8, 8)`.
    pub exponents: [f64; 3],
    /// Elevation of a fully folded value of 1, in `[1, 20)`.
    pub max_hill_height: f64,
    /// Elevation of a folded value of 0, in `[-10, -1)`.
    pub max_depth: f64,
}

impl TerrainCharacter {
    /// Seed salts for the five layer fields, in layer order.
    pub const LAYER_SALTS: [u64; 5] = [512, 8, 4, 84, 64];

    /// Weights of the three detail octaves.
    pub const OCTAVE_WEIGHTS: [f64; 3] = [0.5, 0.25, 0.125];

    /// Roll a character from a section seed.
    pub fn roll(section_seed: u64) -> Self {
        let mut rng = stage_rng(section_seed, CHARACTER_SALT);

        let ridge_height = rng.random_range(0.25..0.5);
        let ridge_width = 1.0 / rng.random_range(8.0..32.0);
        let layer_scales = [
            rng.random_range(64.0..128.0),
            rng.random_range(32.0..64.0),
            rng.random_range(16.0..32.0),
            rng.random_range(8.0..16.0),
            rng.random_range(64.0..256.0),
        ];
        let exponents = [
            rng.random_range(0.125..8.0),
            rng.random_range(0.125..8.0),
            rng.random_range(0.125..8.0),
        ];
        let max_hill_height = rng.random_range(1.0..20.0);
        let max_depth = rng.random_range(-10.0..-1.0);

        Self {
            ridge_height,
            ridge_width,
            layer_scales,
            exponents,
            max_hill_height,
            max_depth,
        }
    }

    /// Build the five-layer stack this character describes.
    ///
    /// Layer 0 is the base, layers 1..=3 are power-shaped detail octaves and
    /// layer 4 carves ridge channels.
    pub fn height_field(&self, section_seed: u64, kind: NoiseKind) -> Result<HeightField, TerrainError> {
        let field = |i: usize| {
            NoiseField::new(
                self.layer_scales[i],
                derive_seed(section_seed, Self::LAYER_SALTS[i]),
                kind,
            )
        };

        let mut layers = Vec::with_capacity(5);
        layers.push(HeightLayer::new(field(0)?, LayerTransform::Base));
        for octave in 0..3 {
            layers.push(HeightLayer::new(
                field(octave + 1)?,
                LayerTransform::Power {
                    exponent: self.exponents[octave],
                    weight: Self::OCTAVE_WEIGHTS[octave],
                },
            ));
        }
        layers.push(HeightLayer::new(
            field(4)?,
            LayerTransform::RidgeFlatten {
                height: self.ridge_height,
                width: self.ridge_width,
            },
        ));

        HeightField::new(layers, self.max_depth, self.max_hill_height)
    }
}

/// Ordered layer stack mapped onto an elevation range.
#[derive(Clone, Debug)]
pub struct HeightField {
    layers: Vec<HeightLayer>,
    min_height: f64,
    max_height: f64,
}

impl HeightField {
    /// Compose `layers` and map a folded value `v` to `mix(min_height, max_height, v)`.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::NoLayers`] for an empty stack and
    /// [`TerrainError::InvalidHeightRange`] unless both bounds are finite and
    /// `min_height < max_height`.
    pub fn new(layers: Vec<HeightLayer>, min_height: f64, max_height: f64) -> Result<Self, TerrainError> {
        if layers.is_empty() {
            return Err(TerrainError::NoLayers);
        }
        if !min_height.is_finite() || !max_height.is_finite() || min_height >= max_height {
            return Err(TerrainError::InvalidHeightRange {
                min: min_height,
                max: max_height,
            });
        }
        Ok(Self {
            layers,
            min_height,
            max_height,
        })
    }

    /// Roll a [`TerrainCharacter`] from `section_seed` and build its stack.
    pub fn configure(section_seed: u64, kind: NoiseKind) -> Result<Self, TerrainError> {
        let character = TerrainCharacter::roll(section_seed);
        tracing::debug!(
            section_seed,
            ?kind,
            max_hill_height = character.max_hill_height,
            max_depth = character.max_depth,
            "rolled terrain character"
        );
        character.height_field(section_seed, kind)
    }

    /// Layers in application order.
    pub fn layers(&self) -> &[HeightLayer] {
        &self.layers
    }

    /// Elevation of a folded value of 0.
    pub fn min_height(&self) -> f64 {
        self.min_height
    }

    /// Elevation of a folded value of 1.
    pub fn max_height(&self) -> f64 {
        self.max_height
    }

    /// The folded accumulator before remapping.
    pub fn fold(&self, x: f64, z: f64) -> f64 {
        self.layers.iter().fold(0.0, |acc, layer| {
            layer.transform.apply(acc, layer.field.sample(x, z))
        })
    }

    /// World elevation at `(x, z)`.
    pub fn sample(&self, x: f64, z: f64) -> f64 {
        mix(self.min_height, self.max_height, self.fold(x, z))
    }
}

impl NoiseFn<f64, 2> for HeightField {
    fn get(&self, point: [f64; 2]) -> f64 {
        self.sample(point[0], point[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_layer(scale: f64, seed: u64) -> HeightLayer {
        HeightLayer::new(
            NoiseField::new(scale, seed, NoiseKind::Gradient).unwrap(),
            LayerTransform::Base,
        )
    }

    #[test]
    fn test_smootherstep_endpoints() {
        assert_eq!(smootherstep(0.0), 0.0);
        assert_eq!(smootherstep(1.0), 1.0);
        assert_eq!(smootherstep(0.5), 0.5);
        assert_eq!(smootherstep(-3.0), 0.0, "input is clamped");
        assert_eq!(smootherstep(7.0), 1.0, "input is clamped");
    }

    #[test]
    fn test_base_replaces_accumulator() {
        assert_eq!(LayerTransform::Base.apply(123.0, 0.25), 0.25);
    }

    #[test]
    fn test_power_adds_weighted_octave() {
        let t = LayerTransform::Power {
            exponent: 2.0,
            weight: 0.5,
        };
        assert!((t.apply(1.0, 0.5) - 1.125).abs() < 1e-12);
    }

    #[test]
    fn test_ridge_flatten_zeroes_channel_centre() {
        let t = LayerTransform::RidgeFlatten {
            height: 0.3,
            width: 0.1,
        };
        assert_eq!(t.apply(0.8, 0.3), 0.0, "sample on the channel centre flattens");
        assert_eq!(t.apply(0.8, 0.9), 0.8, "sample outside the channel keeps the value");
        assert_eq!(
            t.apply(-0.5, 0.3),
            -0.5,
            "values below -height/8 are never flattened"
        );
    }

    #[test]
    fn test_single_base_layer_remaps_to_range() {
        let field = HeightField::new(vec![base_layer(8.0, 5)], -2.0, 6.0).unwrap();
        let raw = field.layers()[0].field.sample(3.3, 1.7);
        assert!((field.sample(3.3, 1.7) - (-2.0 + 8.0 * raw)).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_empty_and_inverted_ranges() {
        assert_eq!(
            HeightField::new(Vec::new(), 0.0, 1.0).unwrap_err(),
            TerrainError::NoLayers
        );
        assert!(matches!(
            HeightField::new(vec![base_layer(1.0, 1)], 3.0, 3.0),
            Err(TerrainError::InvalidHeightRange { .. })
        ));
        assert!(matches!(
            HeightField::new(vec![base_layer(1.0, 1)], f64::NAN, 3.0),
            Err(TerrainError::InvalidHeightRange { .. })
        ));
    }

    #[test]
    fn test_character_ranges() {
        for seed in 0..200 {
            let c = TerrainCharacter::roll(seed);
            assert!((0.25..0.5).contains(&c.ridge_height));
            assert!(c.ridge_width > 1.0 / 32.0 && c.ridge_width <= 1.0 / 8.0);
            assert!((64.0..128.0).contains(&c.layer_scales[0]));
            assert!((8.0..16.0).contains(&c.layer_scales[3]));
            assert!((64.0..256.0).contains(&c.layer_scales[4]));
            assert!(c.exponents.iter().all(|e| (0.125..8.0).contains(e)));
            assert!((1.0..20.0).contains(&c.max_hill_height));
            assert!((-10.0..-1.0).contains(&c.max_depth));
        }
    }

    #[test]
    fn test_configure_is_deterministic() {
        let a = HeightField::configure(1, NoiseKind::Gradient).unwrap();
        let b = HeightField::configure(1, NoiseKind::Gradient).unwrap();
        assert_eq!(a.layers().len(), 5);
        for i in 0..100 {
            let (x, z) = (i as f64 * 3.1, i as f64 * -1.7);
            assert_eq!(a.sample(x, z).to_bits(), b.sample(x, z).to_bits());
        }
    }

    #[test]
    fn test_different_seeds_change_terrain() {
        let a = HeightField::configure(1, NoiseKind::Gradient).unwrap();
        let b = HeightField::configure(2, NoiseKind::Gradient).unwrap();
        let differs = (0..50).any(|i| a.sample(i as f64 * 7.0, 3.0) != b.sample(i as f64 * 7.0, 3.0));
        assert!(differs, "seeds 1 and 2 should not produce identical terrain");
    }

    #[test]
    fn test_noise_fn_matches_sample() {
        let field = HeightField::configure(9, NoiseKind::Value).unwrap();
        assert_eq!(field.get([10.0, -4.0]), field.sample(10.0, -4.0));
    }
}
