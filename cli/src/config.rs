use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

pub struct Config {
    pub store_path: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Explicit override for tests and containers.
        if let Ok(path) = std::env::var("KCAL_DATA_PATH") {
            return Ok(Config {
                store_path: PathBuf::from(path),
            });
        }

        let proj_dirs =
            ProjectDirs::from("", "", "kcal").context("Could not determine home directory")?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        Ok(Config {
            store_path: data_dir.join("tracker.json"),
        })
    }
}
