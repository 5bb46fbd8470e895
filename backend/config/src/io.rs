//! Config file loading (YAML or TOML, chosen by extension).

use crate::schema::ChatmarkConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Config file names probed in the config directory, in order.
const CONFIG_FILE_NAMES: &[&str] = &["config.yaml", "config.yml", "config.toml"];

/// Resolve the chatmark config directory.
/// Priority: `CHATMARK_CONFIG_DIR` env > `~/.chatmark/`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CHATMARK_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .map(|home| home.join(".chatmark"))
        .unwrap_or_else(|| PathBuf::from(".chatmark"))
}

/// First existing config file in `config_dir`, else the default `config.yaml`.
pub fn config_file_path(config_dir: &Path) -> PathBuf {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| config_dir.join(name))
        .find(|path| path.exists())
        .unwrap_or_else(|| config_dir.join(CONFIG_FILE_NAMES[0]))
}

/// Load and parse the config from disk.
///
/// Returns `Ok(Default::default())` if the file doesn't exist (first run).
pub async fn load_config(path: &Path) -> Result<ChatmarkConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(ChatmarkConfig::default());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: ChatmarkConfig = match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config TOML at: {}", path.display()))?,
        _ => serde_yaml::from_str::<Option<ChatmarkConfig>>(&raw)
            .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?
            .unwrap_or_default(),
    };

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(&dir.path().join("config.yaml")).await.unwrap();
        assert_eq!(cfg, ChatmarkConfig::default());
    }

    #[tokio::test]
    async fn loads_toml_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[clipboard]\ncopiedDurationMs = 1200\n").unwrap();
        let cfg = load_config(&path).await.unwrap();
        assert_eq!(cfg.clipboard.unwrap().copied_duration_ms, Some(1200));
    }

    #[tokio::test]
    async fn empty_yaml_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "").unwrap();
        assert_eq!(load_config(&path).await.unwrap(), ChatmarkConfig::default());
    }

    #[tokio::test]
    async fn malformed_yaml_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "render: [unclosed").unwrap();
        let err = load_config(&path).await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config YAML"));
    }

    #[test]
    fn config_file_path_prefers_existing_toml() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(config_file_path(dir.path()), dir.path().join("config.yaml"));
        std::fs::write(dir.path().join("config.toml"), "").unwrap();
        assert_eq!(config_file_path(dir.path()), dir.path().join("config.toml"));
    }
}
