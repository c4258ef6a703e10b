//! Command-line argument parsing for the glade generator.

use std::path::PathBuf;

use clap::Parser;

use crate::{Config, NoiseChoice};

/// glade command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "glade", about = "Deterministic procedural terrain generator")]
pub struct CliArgs {
    /// Section seed. Takes precedence over the remembered seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Cells per section side.
    #[arg(long)]
    pub section_size: Option<u32>,

    /// World units per cell.
    #[arg(long)]
    pub tile_scale: Option<f32>,

    /// Noise interpolation scheme.
    #[arg(long, value_enum)]
    pub noise: Option<NoiseChoice>,

    /// Ignore remembered and configured seeds and roll a fresh one.
    #[arg(long)]
    pub regenerate: bool,

    /// Write a heightmap PNG after generation.
    #[arg(long)]
    pub export_heightmap: bool,

    /// Sample the grid across one worker per CPU.
    #[arg(long)]
    pub parallel: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    ///
    /// `--seed` and `--regenerate` are resolved by the application shell,
    /// which also consults remembered settings.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(size) = args.section_size {
            self.terrain.section_size = size;
        }
        if let Some(scale) = args.tile_scale {
            self.terrain.tile_scale = scale;
        }
        if let Some(noise) = args.noise {
            self.terrain.noise = noise;
        }
        if args.export_heightmap {
            self.debug.export_heightmap = true;
        }
        if args.parallel {
            self.terrain.parallel_fill = true;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
