//! Configuration for the glade terrain generator.
//!
//! Settings persist to disk as RON files, can be overridden from the command
//! line via clap, and are forward/backward compatible through
//! `#[serde(default)]`. A small key-value [`SettingsStore`] holds state the
//! application shell remembers between runs.

mod cli;
mod config;
mod error;
mod settings;

pub use cli::CliArgs;
pub use config::{
    AttemptsConfig, Config, DebugConfig, NoiseChoice, PrototypeWeight, ScatterConfig,
    ScatterLayerConfig, TerrainConfig, ThresholdConfig,
};
pub use error::ConfigError;
pub use settings::{MemorySettings, RonSettings, SettingsStore};
