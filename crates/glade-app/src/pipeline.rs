//! Bridges user configuration to the terrain pipeline.

use glade_config::{
    AttemptsConfig, CliArgs, Config, NoiseChoice, ScatterLayerConfig, SettingsStore, ThresholdConfig,
};
use glade_terrain::{
    Attempts, HeightThreshold, MeshOptions, NoiseKind, PrototypeGroup, PrototypeId, ScatterLayer,
    SectionSpec,
};
use glam::IVec2;

/// Settings key remembering the seed of the previous run.
pub const LAST_SEED_KEY: &str = "terrain.last_seed";

/// Pick the section seed.
///
/// Precedence: `--regenerate` rolls a fresh seed, then `--seed`, then the
/// remembered seed, then the configured seed. An unparsable remembered seed
/// is ignored.
pub fn select_seed(
    args: &CliArgs,
    settings: &dyn SettingsStore,
    config: &Config,
    roll: impl FnOnce() -> u64,
) -> u64 {
    if args.regenerate {
        return roll();
    }
    if let Some(seed) = args.seed {
        return seed;
    }
    if let Some(stored) = settings.get(LAST_SEED_KEY) {
        match stored.parse() {
            Ok(seed) => return seed,
            Err(_) => tracing::warn!(value = %stored, "ignoring unparsable remembered seed"),
        }
    }
    config.terrain.seed
}

/// Assigns stable ids to prototype names in order of first appearance.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PrototypeCatalog {
    names: Vec<String>,
}

impl PrototypeCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Id for `name`, registering it if unseen.
    pub fn id_for(&mut self, name: &str) -> PrototypeId {
        let index = match self.names.iter().position(|n| n == name) {
            Some(index) => index,
            None => {
                self.names.push(name.to_string());
                self.names.len() - 1
            }
        };
        PrototypeId(index as u32)
    }

    /// Name registered under `id`, if any.
    pub fn name(&self, id: PrototypeId) -> Option<&str> {
        self.names.get(id.0 as usize).map(String::as_str)
    }

    /// Number of registered names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no name has been registered.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Build a [`SectionSpec`] from the loaded configuration.
pub fn section_spec(config: &Config, catalog: &mut PrototypeCatalog) -> SectionSpec {
    let terrain = &config.terrain;
    SectionSpec {
        size: terrain.section_size,
        tile_scale: terrain.tile_scale,
        origin: IVec2::from_array(terrain.origin),
        noise: match terrain.noise {
            NoiseChoice::Value => NoiseKind::Value,
            NoiseChoice::Gradient => NoiseKind::Gradient,
        },
        mesh: MeshOptions {
            skirt_margin: terrain.skirt_margin,
            skirt_floor: None,
            uv_scale: terrain.uv_scale,
            water_level: Some(terrain.water_level),
        },
        skirt_floor_per_cell: terrain.skirt_floor_per_cell,
        scatter_layers: config
            .scatter
            .layers
            .iter()
            .map(|layer| scatter_layer(layer, catalog))
            .collect(),
        fill_threads: if terrain.parallel_fill { 0 } else { 1 },
    }
}

fn scatter_layer(layer: &ScatterLayerConfig, catalog: &mut PrototypeCatalog) -> ScatterLayer {
    ScatterLayer {
        name: layer.name.clone(),
        attempts: match layer.attempts {
            AttemptsConfig::Fixed(n) => Attempts::Fixed(n),
            AttemptsConfig::PerWorldUnit(rate) => Attempts::PerWorldUnit(rate),
            AttemptsConfig::UpTo(n) => Attempts::UpTo(n),
        },
        threshold: match layer.threshold {
            ThresholdConfig::Above(y) => HeightThreshold::Above(y),
            ThresholdConfig::FractionOfMaxHeight(f) => HeightThreshold::FractionOfMaxHeight(f),
        },
        center_shrink: layer.center_shrink,
        scale_range: layer.scale_range,
        groups: layer
            .groups
            .iter()
            .map(|g| PrototypeGroup::new(g.weight, catalog.id_for(&g.name)))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glade_config::MemorySettings;

    fn no_roll() -> u64 {
        panic!("seed should not be rolled")
    }

    #[test]
    fn test_regenerate_wins() {
        let args = CliArgs {
            regenerate: true,
            seed: Some(5),
            ..Default::default()
        };
        let seed = select_seed(&args, &MemorySettings::new(), &Config::default(), || 777);
        assert_eq!(seed, 777);
    }

    #[test]
    fn test_cli_seed_beats_remembered() {
        let mut settings = MemorySettings::new();
        settings.set(LAST_SEED_KEY, "12".to_string());
        let args = CliArgs {
            seed: Some(5),
            ..Default::default()
        };
        assert_eq!(select_seed(&args, &settings, &Config::default(), no_roll), 5);
    }

    #[test]
    fn test_remembered_seed_beats_config() {
        let mut settings = MemorySettings::new();
        settings.set(LAST_SEED_KEY, "12".to_string());
        assert_eq!(
            select_seed(&CliArgs::default(), &settings, &Config::default(), no_roll),
            12
        );
    }

    #[test]
    fn test_falls_back_to_config_seed() {
        let mut settings = MemorySettings::new();
        settings.set(LAST_SEED_KEY, "not a number".to_string());
        let mut config = Config::default();
        config.terrain.seed = 31;
        assert_eq!(select_seed(&CliArgs::default(), &settings, &config, no_roll), 31);
    }

    #[test]
    fn test_catalog_ids_are_stable() {
        let mut catalog = PrototypeCatalog::new();
        let pine = catalog.id_for("pine");
        let fern = catalog.id_for("fern");
        assert_eq!(catalog.id_for("pine"), pine);
        assert_ne!(pine, fern);
        assert_eq!(catalog.name(fern), Some("fern"));
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_default_config_maps_to_spec() {
        let mut catalog = PrototypeCatalog::new();
        let spec = section_spec(&Config::default(), &mut catalog);

        assert_eq!(spec.size, 100);
        assert_eq!(spec.noise, NoiseKind::Gradient);
        assert_eq!(spec.mesh.water_level, Some(0.0));
        assert_eq!(spec.fill_threads, 1);
        assert_eq!(spec.scatter_layers.len(), 2);
        assert_eq!(spec.scatter_layers[0].attempts, Attempts::PerWorldUnit(0.25));
        assert_eq!(
            spec.scatter_layers[0].threshold,
            HeightThreshold::FractionOfMaxHeight(0.125)
        );
        assert_eq!(catalog.len(), 4, "pine, small_tree, fern and small_house");
    }

    #[test]
    fn test_parallel_fill_uses_all_cpus() {
        let mut config = Config::default();
        config.terrain.parallel_fill = true;
        let spec = section_spec(&config, &mut PrototypeCatalog::new());
        assert_eq!(spec.fill_threads, 0);
    }
}
