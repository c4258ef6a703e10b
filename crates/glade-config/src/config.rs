//! Configuration structs with sensible defaults and RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level generator configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Section shape and meshing settings.
    pub terrain: TerrainConfig,
    /// Object scatter layers.
    pub scatter: ScatterConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Interpolation scheme for terrain noise.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
pub enum NoiseChoice {
    /// Barycentric value noise; faceted.
    Value,
    /// Quintic gradient noise; smooth.
    #[default]
    Gradient,
}

/// Terrain section configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// Section seed used when no other seed is supplied.
    pub seed: u64,
    /// Cells per side.
    pub section_size: u32,
    /// World units per cell.
    pub tile_scale: f32,
    /// Section offset in cells, `[x, z]`.
    pub origin: [i32; 2],
    /// Distance the skirt drops below the lowest vertex.
    pub skirt_margin: f32,
    /// Skirt never ends above `-section_size * skirt_floor_per_cell`.
    pub skirt_floor_per_cell: Option<f32>,
    /// World-space texture tiling factor.
    pub uv_scale: f32,
    /// Noise interpolation scheme.
    pub noise: NoiseChoice,
    /// Height of the water quad and the heightmap shoreline.
    pub water_level: f32,
    /// Sample the grid across one worker per CPU.
    pub parallel_fill: bool,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            section_size: 100,
            tile_scale: 1.0,
            origin: [0, 0],
            skirt_margin: 10.0,
            skirt_floor_per_cell: Some(1.0),
            uv_scale: 0.1,
            noise: NoiseChoice::Gradient,
            water_level: 0.0,
            parallel_fill: false,
        }
    }
}

/// How many candidates a scatter layer draws.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum AttemptsConfig {
    /// Exactly `n`.
    Fixed(u32),
    /// `floor(section extent * rate)`.
    PerWorldUnit(f64),
    /// A random count in `0..n`.
    UpTo(u32),
}

/// Elevation a scatter candidate must exceed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum ThresholdConfig {
    /// Absolute world elevation.
    Above(f64),
    /// Fraction of the terrain's maximum hill height.
    FractionOfMaxHeight(f64),
}

/// A named prototype and its relative selection weight.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrototypeWeight {
    /// Relative selection weight.
    pub weight: f64,
    /// Prototype name, mapped to an id at startup.
    pub name: String,
}

impl PrototypeWeight {
    fn new(weight: f64, name: &str) -> Self {
        Self {
            weight,
            name: name.to_string(),
        }
    }
}

/// One scatter layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScatterLayerConfig {
    /// Label used in logs.
    pub name: String,
    /// How many candidates to draw.
    pub attempts: AttemptsConfig,
    /// Elevation candidates must exceed.
    pub threshold: ThresholdConfig,
    /// Divides the sampling half-extent; must be >= 1.
    pub center_shrink: f64,
    /// Inclusive uniform scale jitter.
    pub scale_range: (f64, f64),
    /// Weighted prototypes for this layer.
    pub groups: Vec<PrototypeWeight>,
}

impl Default for ScatterLayerConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            attempts: AttemptsConfig::Fixed(0),
            threshold: ThresholdConfig::Above(0.0),
            center_shrink: 1.0,
            scale_range: (1.0, 1.0),
            groups: Vec::new(),
        }
    }
}

/// Object scatter configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScatterConfig {
    /// Layers run in order, each on its own RNG stream.
    pub layers: Vec<ScatterLayerConfig>,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            layers: vec![
                ScatterLayerConfig {
                    name: "trees".to_string(),
                    attempts: AttemptsConfig::PerWorldUnit(0.25),
                    threshold: ThresholdConfig::FractionOfMaxHeight(0.125),
                    center_shrink: 1.0,
                    scale_range: (0.8, 1.2),
                    groups: vec![
                        PrototypeWeight::new(1.0, "pine"),
                        PrototypeWeight::new(2.0, "small_tree"),
                        PrototypeWeight::new(8.0, "fern"),
                    ],
                },
                ScatterLayerConfig {
                    name: "houses".to_string(),
                    attempts: AttemptsConfig::UpTo(20),
                    threshold: ThresholdConfig::Above(0.0),
                    center_shrink: 1.0,
                    scale_range: (1.0, 1.0),
                    groups: vec![PrototypeWeight::new(1.0, "small_house")],
                },
            ],
        }
    }
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Write a colour-coded heightmap PNG after generation.
    pub export_heightmap: bool,
    /// Edge length of the exported heightmap in pixels.
    pub heightmap_resolution: u32,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            export_heightmap: false,
            heightmap_resolution: 512,
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }
}
