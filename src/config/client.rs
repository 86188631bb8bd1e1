use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const SERVER_URL_ENV: &str = "TEAMFORGE_URL";
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

/// Where the record store service lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub server_url: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    default: Option<ClientConfig>,
}

pub fn config_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "teamforge").ok_or_else(|| {
        Error::Config("Could not determine config directory. Is $HOME set?".into())
    })?;
    Ok(dirs.config_dir().join("config.toml"))
}

impl ClientConfig {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
        }
    }

    /// Resolution order: explicit flag, `TEAMFORGE_URL`, config file, default.
    /// The file is only read when neither override is set.
    pub fn resolve(explicit: Option<&str>) -> Result<Self> {
        let from_env = std::env::var(SERVER_URL_ENV).ok();
        let overridden = [explicit, from_env.as_deref()]
            .into_iter()
            .flatten()
            .any(|v| !v.trim().is_empty());
        let from_file = if overridden {
            None
        } else {
            match config_path() {
                Ok(path) => Self::load(&path)?,
                Err(e) => {
                    tracing::debug!("Skipping config file: {e}");
                    None
                }
            }
        };
        Ok(Self::resolve_from(explicit, from_env.as_deref(), from_file))
    }

    #[must_use]
    pub fn resolve_from(
        explicit: Option<&str>,
        from_env: Option<&str>,
        from_file: Option<Self>,
    ) -> Self {
        let pick = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(Self::new)
        };
        pick(explicit)
            .or_else(|| pick(from_env))
            .or(from_file)
            .unwrap_or_else(|| Self::new(DEFAULT_SERVER_URL))
    }

    /// Reads the config file, if there is one.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        let file: ConfigFile = toml::from_str(&content).map_err(|e| {
            Error::Config(format!("{} is corrupted: {e}", path.display()))
        })?;
        Ok(file.default)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = ConfigFile {
            default: Some(self.clone()),
        };
        let content =
            toml::to_string_pretty(&file).map_err(|e| Error::Config(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }
}
