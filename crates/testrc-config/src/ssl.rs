//! SSL option resolution.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use testrc_utils::error::SslError;

/// SSL option keys whose values may name a file to read.
pub const FILE_OPTIONS: &[&str] = &["cert", "key", "pfx", "ca"];

/// Canonical SSL options object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SslOptions(Map<String, Value>);

impl SslOptions {
    #[must_use]
    pub fn new(options: Map<String, Value>) -> Self {
        Self(options)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

/// Turns a raw `ssl` option value into canonical options.
#[async_trait]
pub trait SslOptionResolver: Send + Sync {
    /// Resolve `raw`. `Ok(None)` means the option stays absent.
    ///
    /// # Errors
    ///
    /// Returns an `SslError` when the value cannot be parsed or a referenced
    /// file cannot be read.
    async fn resolve(&self, raw: &Value) -> Result<Option<SslOptions>, SslError>;
}

/// Parses `key=value;key=value` strings or objects, reading certificate
/// material from disk for [`FILE_OPTIONS`] keys that name existing files.
#[derive(Debug, Clone, Default)]
pub struct DefaultSslResolver {
    base_dir: Option<PathBuf>,
}

impl DefaultSslResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative file paths against `base_dir` instead of the process
    /// working directory.
    #[must_use]
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn candidate_path(&self, value: &str) -> Option<PathBuf> {
        if value.is_empty() || value.contains('\n') {
            return None;
        }
        let path = Path::new(value);
        Some(match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        })
    }

    async fn read_file_option(&self, option: &str, value: &Value) -> Result<Option<Value>, SslError> {
        let Some(path) = value.as_str().and_then(|s| self.candidate_path(s)) else {
            return Ok(None);
        };
        let is_file = tokio::fs::metadata(&path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if !is_file {
            return Ok(None);
        }

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| SslError::ReadFailed {
                option: option.to_string(),
                path: path.clone(),
                source,
            })?;
        tracing::debug!(option, path = %path.display(), bytes = bytes.len(), "Read SSL file");

        Ok(Some(match String::from_utf8(bytes) {
            Ok(text) => Value::String(text),
            Err(err) => Value::Array(err.into_bytes().into_iter().map(Value::from).collect()),
        }))
    }
}

#[async_trait]
impl SslOptionResolver for DefaultSslResolver {
    async fn resolve(&self, raw: &Value) -> Result<Option<SslOptions>, SslError> {
        let mut options = match raw {
            Value::Null => return Ok(None),
            Value::String(text) => parse_ssl_string(text)?,
            Value::Object(map) => map.clone(),
            other => {
                return Err(SslError::Invalid {
                    reason: format!("expected a string or an object, found {other}"),
                });
            }
        };

        for option in FILE_OPTIONS {
            let Some(value) = options.get(*option) else {
                continue;
            };
            if let Some(contents) = self.read_file_option(option, value).await? {
                options.insert((*option).to_string(), contents);
            }
        }

        Ok(Some(SslOptions::new(options)))
    }
}

/// Parse `key=value;key=value`. `true`/`false` become booleans and numeric
/// values become numbers; empty segments are ignored.
///
/// # Errors
///
/// Returns `SslError::Invalid` for a segment without `=` or with an empty key.
pub fn parse_ssl_string(text: &str) -> Result<Map<String, Value>, SslError> {
    let mut options = Map::new();

    for segment in text.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        let Some((key, value)) = segment.split_once('=') else {
            return Err(SslError::Invalid {
                reason: format!("'{segment}' is not a key=value pair"),
            });
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(SslError::Invalid {
                reason: format!("'{segment}' has an empty key"),
            });
        }
        options.insert(key.to_string(), parse_scalar(value.trim()));
    }

    Ok(options)
}

fn parse_scalar(value: &str) -> Value {
    match value {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => {
            if let Ok(int) = value.parse::<i64>() {
                Value::from(int)
            } else if let Ok(float) = value.parse::<f64>()
                && float.is_finite()
            {
                Value::from(float)
            } else {
                Value::String(value.to_string())
            }
        }
    }
}
