use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use gitcloak_core::crypto::{DEFAULT_MAX_WORK_FACTOR, DEFAULT_WORK_FACTOR};
use gitcloak_core::Codec;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CloakConfig {
    pub store: StoreSection,
    pub crypto: CryptoSection,
    pub log: LogSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    pub root: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoSection {
    /// scrypt log2(N) used when encrypting
    pub work_factor: u8,
    /// Largest log2(N) accepted when decrypting
    pub max_work_factor: u8,
}

impl Default for CryptoSection {
    fn default() -> Self {
        Self {
            work_factor: DEFAULT_WORK_FACTOR,
            max_work_factor: DEFAULT_MAX_WORK_FACTOR,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl CloakConfig {
    /// A default config pointing at `root`.
    pub fn with_root(root: &Path) -> Self {
        Self {
            store: StoreSection {
                root: Some(root.to_string_lossy().to_string()),
            },
            ..Self::default()
        }
    }

    pub fn codec(&self) -> anyhow::Result<Codec> {
        Ok(Codec::new(
            self.crypto.work_factor,
            self.crypto.max_work_factor,
        )?)
    }

    /// Configured store root, else the XDG data default.
    pub fn store_root(&self) -> anyhow::Result<PathBuf> {
        match self.store.root.as_deref() {
            Some(root) if !root.trim().is_empty() => Ok(PathBuf::from(root)),
            _ => default_store_root(),
        }
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_store_root() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("repos"))
}

/// Read the config at `path`; a missing file yields the defaults.
pub fn read_config(path: &Path) -> anyhow::Result<CloakConfig> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(CloakConfig::default());
        }
        Err(err) => {
            return Err(anyhow::anyhow!(
                "Failed to read config {}: {}",
                path.display(),
                err
            ))
        }
    };
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn write_config(path: &Path, config: &CloakConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    std::fs::write(path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("gitcloak"));
        }
    }
    Ok(home_dir()?.join(".config").join("gitcloak"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("gitcloak"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("gitcloak"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempdir().unwrap();
        let config = read_config(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.crypto.work_factor, DEFAULT_WORK_FACTOR);
        assert_eq!(config.crypto.max_work_factor, DEFAULT_MAX_WORK_FACTOR);
        assert!(config.store.root.is_none());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[crypto]\nwork_factor = 12\n").unwrap();

        let config = read_config(&path).unwrap();
        assert_eq!(config.crypto.work_factor, 12);
        assert_eq!(config.crypto.max_work_factor, DEFAULT_MAX_WORK_FACTOR);
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let root = dir.path().join("repos");

        write_config(&path, &CloakConfig::with_root(&root)).unwrap();
        let config = read_config(&path).unwrap();

        assert_eq!(config.store_root().unwrap(), root);
    }

    #[test]
    fn test_invalid_work_factor_rejected() {
        let mut config = CloakConfig::default();
        config.crypto.work_factor = 25;
        config.crypto.max_work_factor = 20;
        assert!(config.codec().is_err());
    }
}
