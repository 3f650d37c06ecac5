use serde::{Deserialize, Serialize};
use std::fmt;

/// Source of a configuration value.
///
/// Variants are declared in precedence order, so the derived `Ord` ranks them
/// `Default < Config < Input`. The value recorded by the highest source that
/// has touched an option is its effective value.
///
/// # Serialization
///
/// Serializes to lowercase strings: `"default"`, `"config"`, `"input"`.
///
/// # Example
///
/// ```rust
/// use testrc_utils::types::ConfigSource;
///
/// assert!(ConfigSource::Input > ConfigSource::Config);
/// assert!(ConfigSource::Config > ConfigSource::Default);
///
/// let json = serde_json::to_string(&ConfigSource::Config).unwrap();
/// assert_eq!(json, r#""config""#);
/// ```
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    /// Built-in default value (lowest precedence).
    Default,
    /// Value loaded from a configuration file.
    Config,
    /// Value supplied directly by the caller (CLI flags or the embedding API).
    Input,
}

impl ConfigSource {
    /// Stable label used in status output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Config => "config",
            Self::Input => "input",
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
