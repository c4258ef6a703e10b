//! The `glade` binary: generate one terrain section and report on it.
//!
//! Run with: `cargo run -p glade-app -- --seed 42 --export-heightmap`

use clap::Parser;
use glade_app::platform::PlatformDirs;
use glade_app::{AppError, run};
use glade_config::{CliArgs, Config, RonSettings};
use tracing::{error, info};

fn main() {
    let args = CliArgs::parse();

    let mut dirs = match PlatformDirs::resolve() {
        Ok(dirs) => dirs,
        Err(e) => {
            eprintln!("Failed to resolve platform directories: {e}");
            std::process::exit(1);
        }
    };
    if let Some(ref config_dir) = args.config {
        dirs.config_dir = config_dir.clone();
    }

    let mut config = match Config::load_or_create(&dirs.config_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config from {}: {e}", dirs.config_dir.display());
            std::process::exit(1);
        }
    };
    config.apply_cli_overrides(&args);

    glade_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));

    info!("glade terrain generator");
    info!(
        "Section: {} cells x {} units | noise {:?} | parallel fill {}",
        config.terrain.section_size,
        config.terrain.tile_scale,
        config.terrain.noise,
        config.terrain.parallel_fill,
    );

    if let Err(e) = generate(&args, &config, &dirs) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn generate(args: &CliArgs, config: &Config, dirs: &PlatformDirs) -> Result<(), AppError> {
    dirs.create_dirs()?;
    let mut settings = RonSettings::load(&dirs.settings_path())?;

    let output = run(args, config, &mut settings, &dirs.data_dir)?;
    settings.save()?;

    let section = &output.generated.section;
    info!(
        "Seed {} | {} vertices, {} triangles | elevation {:.2}..{:.2} | {} placements",
        output.generated.seed,
        section.surface.vertex_count(),
        section.surface.triangle_count(),
        section.grid.min(),
        section.grid.max(),
        output.generated.placement_count(),
    );
    if let Some(path) = output.heightmap {
        info!("Heightmap written to {}", path.display());
    }
    Ok(())
}
