use anyhow::Result;
use std::path::{Path, PathBuf};

/// Get the config directory override from the environment, if set
fn config_dir_override() -> Option<PathBuf> {
    std::env::var("MUBI_EXPORT_CONFIG_DIR").ok().map(PathBuf::from)
}

pub struct PathManager {
    config_dir: PathBuf,
}

impl PathManager {
    pub fn new() -> Result<Self> {
        if let Some(dir) = config_dir_override() {
            return Ok(Self { config_dir: dir });
        }

        let base_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("mubi-export");

        Ok(Self { config_dir: base_dir })
    }

    pub fn with_config_dir(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }
}
