use serde_json::Value;
use std::path::{Path, PathBuf};

use testrc_utils::error::ConfigError;

use crate::store::OptionBag;

/// Conventional configuration filenames, in preference order.
pub const FILENAMES: [&str; 4] = [".testrc.json", ".testrc.toml", ".testrc.yaml", ".testrc.yml"];

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
    Yaml,
}

impl FileFormat {
    /// Detect the format from the file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// First conventional configuration file present in `dir`.
#[must_use]
pub fn discover_config_file(dir: &Path) -> Option<PathBuf> {
    FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// Read and parse a configuration file into an option bag.
///
/// # Errors
///
/// Returns `ConfigError::UnsupportedFormat` for unknown extensions and
/// `ConfigError::InvalidFile` for unreadable or malformed content.
pub async fn load_config_file(path: &Path) -> Result<OptionBag, ConfigError> {
    let display = path.display().to_string();
    let format = FileFormat::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat {
        path: display.clone(),
    })?;

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|err| ConfigError::InvalidFile {
            path: display.clone(),
            reason: err.to_string(),
        })?;

    let document = parse_config_content(format, &content).map_err(|reason| {
        ConfigError::InvalidFile {
            path: display.clone(),
            reason,
        }
    })?;

    OptionBag::from_json(&display, document)
}

/// Parse file content into a JSON document. Blank content is an empty object.
fn parse_config_content(format: FileFormat, content: &str) -> Result<Value, String> {
    if content.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }

    match format {
        FileFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        FileFormat::Toml => toml::from_str::<Value>(content).map_err(|e| e.to_string()),
        FileFormat::Yaml => serde_yaml::from_str::<Value>(content).map_err(|e| e.to_string()),
    }
}
