//! Stack configuration loader.
//!
//! Reads `cachefront.toml` and deserializes it into [`ConfigFile`]. Unlike
//! optional tuning knobs, the config file itself is required: a provisioning
//! run with no project name has nothing to reconcile against, so a missing
//! file or missing `project` key is a fatal [`ConfigError`] before any
//! mutation.

use std::path::Path;

use cachefront_types::config::{EDGE_REGION, StackSettings};
use cachefront_types::error::ConfigError;
use serde::Deserialize;

/// Default config file name, resolved relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "cachefront.toml";

/// The optional `[credentials]` table.
///
/// Either field may be absent; the secret chain treats a lone username or
/// password as "authentication disabled". Environment variables override
/// these values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialsSection {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// The parsed config file: stack settings plus the optional secrets table.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub settings: StackSettings,
    pub credentials: CredentialsSection,
}

#[derive(Deserialize)]
struct RawConfig {
    project: Option<String>,
    region: Option<String>,
    #[serde(default)]
    credentials: CredentialsSection,
}

/// Load stack configuration from `path`.
pub async fn load_config(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        Err(err) => {
            return Err(ConfigError::ParseError(format!(
                "{}: {err}",
                path.display()
            )));
        }
    };

    let raw: RawConfig = toml::from_str(&content)
        .map_err(|err| ConfigError::ParseError(format!("{}: {err}", path.display())))?;

    let project = raw
        .project
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ConfigError::MissingSetting("project".to_string()))?;
    let region = raw.region.unwrap_or_else(|| EDGE_REGION.to_string());

    tracing::debug!(project = %project, region = %region, "loaded stack configuration");

    Ok(ConfigFile {
        settings: StackSettings { project, region },
        credentials: raw.credentials,
    })
}
