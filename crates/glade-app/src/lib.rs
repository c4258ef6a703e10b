//! Application shell for the glade terrain generator.
//!
//! Owns everything the terrain core must not: platform directories, the
//! persisted config, remembered settings, seed selection and file export.

pub mod export;
pub mod pipeline;
pub mod platform;

use std::path::{Path, PathBuf};

use glade_config::{CliArgs, Config, ConfigError, SettingsStore};
use glade_terrain::{GeneratedSection, PrototypeId, SectionGenerator, TerrainError, section_digest};
use tracing::info;

use crate::export::{ExportError, write_heightmap};
use crate::pipeline::{LAST_SEED_KEY, PrototypeCatalog, section_spec, select_seed};
use crate::platform::PlatformError;

/// Anything that can stop a run.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Platform directories could not be resolved or created.
    #[error(transparent)]
    Platform(#[from] PlatformError),
    /// Config or settings could not be read or written.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Generation parameters were rejected.
    #[error(transparent)]
    Terrain(#[from] TerrainError),
    /// The heightmap could not be encoded or written.
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Result of one generation run.
#[derive(Debug)]
pub struct RunOutput {
    /// The generated section.
    pub generated: GeneratedSection,
    /// Prototype names behind the placement ids.
    pub catalog: PrototypeCatalog,
    /// Determinism digest of the section mesh.
    pub digest: u64,
    /// Path of the exported heightmap, when export was requested.
    pub heightmap: Option<PathBuf>,
}

/// Generate one section from an already loaded config.
///
/// Remembers the chosen seed in `settings`; persisting the store is left to
/// the caller.
pub fn run(
    args: &CliArgs,
    config: &Config,
    settings: &mut dyn SettingsStore,
    export_dir: &Path,
) -> Result<RunOutput, AppError> {
    let seed = select_seed(args, settings, config, rand::random::<u64>);
    settings.set(LAST_SEED_KEY, seed.to_string());

    let mut catalog = PrototypeCatalog::new();
    let generator = SectionGenerator::new(section_spec(config, &mut catalog))?;
    let generated = generator.generate(seed)?;
    let digest = section_digest(&generated.section);

    info!(
        seed,
        digest = %format!("{digest:016x}"),
        spawn = ?generated.spawn_point,
        deepest_depth = generated.section.deepest_depth,
        "section ready"
    );
    for (layer, layer_spec) in generated.layers.iter().zip(&generator.spec().scatter_layers) {
        let mut counts = vec![0usize; catalog.len()];
        for placement in &layer.placements {
            let prototype = layer_spec.groups[placement.prototype_group_index].prototype;
            counts[prototype.0 as usize] += 1;
        }
        let breakdown = counts
            .iter()
            .enumerate()
            .filter(|(_, n)| **n > 0)
            .map(|(id, n)| {
                let name = catalog.name(PrototypeId(id as u32)).unwrap_or("?");
                format!("{name}={n}")
            })
            .collect::<Vec<_>>()
            .join(",");
        info!(
            layer = %layer.name,
            attempts = layer.attempts,
            placed = layer.placements.len(),
            prototypes = %breakdown,
            "scatter layer"
        );
    }

    let heightmap = if config.debug.export_heightmap {
        Some(write_heightmap(
            &generated,
            config.terrain.water_level as f64,
            config.debug.heightmap_resolution,
            export_dir,
        )?)
    } else {
        None
    };

    Ok(RunOutput {
        generated,
        catalog,
        digest,
        heightmap,
    })
}
