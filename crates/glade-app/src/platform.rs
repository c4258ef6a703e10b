//! Platform directory resolution.
//!
//! Config, data and log directories follow OS conventions (XDG on Linux,
//! Known Folders on Windows, Library on macOS), or sit under a custom root
//! when one is given.

use std::path::{Path, PathBuf};

/// Errors that can occur during platform operations.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// The OS did not provide a configuration directory.
    #[error("could not determine OS configuration directory")]
    NoConfigDir,
    /// Directory creation failed.
    #[error("platform I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// OS-specific directory paths for the glade application.
#[derive(Clone, Debug, PartialEq)]
pub struct PlatformDirs {
    /// User configuration: `config.ron`.
    pub config_dir: PathBuf,
    /// Persistent data: remembered settings, exported heightmaps.
    pub data_dir: PathBuf,
    /// Log files.
    pub log_dir: PathBuf,
}

/// Directory name used under each platform root.
pub const APP_NAME: &str = "glade";

impl PlatformDirs {
    /// Resolve platform-specific directories without creating them on disk.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::NoConfigDir`] if the OS does not expose a
    /// configuration directory.
    pub fn resolve() -> Result<Self, PlatformError> {
        let config_base = dirs::config_dir().ok_or(PlatformError::NoConfigDir)?;
        let app_config = config_base.join(APP_NAME);

        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| app_config.clone())
            .join(APP_NAME);

        Ok(Self {
            config_dir: app_config.join("config"),
            data_dir,
            log_dir: app_config.join("logs"),
        })
    }

    /// Resolve directories rooted under a custom base path.
    pub fn resolve_with_root(root: &Path) -> Self {
        let app_dir = root.join(APP_NAME);
        Self {
            config_dir: app_dir.join("config"),
            data_dir: app_dir.join("data"),
            log_dir: app_dir.join("logs"),
        }
    }

    /// Create all directories on disk.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Io`] if any directory cannot be created.
    pub fn create_dirs(&self) -> Result<(), PlatformError> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }

    /// File backing the remembered settings.
    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join("settings.ron")
    }
}
