use anyhow::{Context, Result};
use rezoning_protocol::ApiConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Looked up in the working directory when `--config` is not given.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "rezoning.toml";

/// Contents of `rezoning.toml`.
///
/// ```toml
/// [api]
/// api_endpoint = "https://api.rezoning.example"
/// request_timeout_ms = 60000
///
/// [data]
/// areas = "public/areas.json"
/// eez = "public/zones/eez_v11.topojson"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct CliConfig {
    pub(crate) api: ApiConfig,
    pub(crate) data: DataPaths,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct DataPaths {
    pub(crate) areas: Option<PathBuf>,
    pub(crate) eez: Option<PathBuf>,
}

impl CliConfig {
    /// File (explicit path, else `rezoning.toml` if present), then environment.
    pub(crate) fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::from_file(default)?
                } else {
                    Self::default()
                }
            }
        };
        config.api.apply_env();
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}
