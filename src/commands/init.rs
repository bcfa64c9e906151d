//! Init command implementation

use crate::config::{Config, PathsConfig};
use crate::error::{Error, Result};
use std::path::PathBuf;
use tracing::info;

/// Write a default config under `base_dir`
pub fn cmd_init(base_dir: PathBuf, force: bool) -> Result<Config> {
    let mut config = Config::default();
    config.paths = PathsConfig {
        config_file: base_dir.join("config.toml"),
        index_file: base_dir.join("index.json"),
        base_dir,
    };

    if config.is_initialized() && !force {
        return Err(Error::Config(format!(
            "Config already exists at {}. Use --force to overwrite.",
            config.paths.config_file.display()
        )));
    }

    std::fs::create_dir_all(&config.paths.base_dir)?;
    config.save()?;
    info!("Initialized scout in {:?}", config.paths.base_dir);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_loadable_config() {
        let tmp = TempDir::new().unwrap();
        let config = cmd_init(tmp.path().join("scout"), false).unwrap();

        assert!(config.is_initialized());
        let loaded = Config::load(&config.paths.config_file).unwrap();
        assert_eq!(loaded.batch.batch_size, config.batch.batch_size);
        assert_eq!(loaded.paths.index_file, tmp.path().join("scout/index.json"));
    }

    #[test]
    fn test_init_refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        let base = tmp.path().to_path_buf();
        cmd_init(base.clone(), false).unwrap();

        assert!(matches!(cmd_init(base.clone(), false), Err(Error::Config(_))));
        assert!(cmd_init(base, true).is_ok());
    }
}
