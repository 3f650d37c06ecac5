use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Library-level error type with rich context and user-friendly reporting.
///
/// `TestrcError` is the error returned by every fallible resolver operation.
/// Errors raised by collaborators (browser providers, SSL option parsing,
/// filter compilation) are wrapped without alteration so callers can match
/// on the original variant.
///
/// # Error Categories
///
/// | Category | Description |
/// |----------|-------------|
/// | `Config` | Missing or malformed configuration files, invalid values |
/// | `Browser` | A browser specifier could not be resolved |
/// | `Ssl` | SSL options could not be parsed or their files read |
/// | `Filter` | The test filter could not be compiled |
///
/// # Exit Code Mapping
///
/// Use [`to_exit_code()`](Self::to_exit_code) to map errors to CLI exit codes:
///
/// | Exit Code | Error Type |
/// |-----------|------------|
/// | 2 | Configuration and filter errors |
/// | 3 | Browser resolution errors |
/// | 4 | SSL option errors |
/// | 1 | Other errors |
///
/// # Example
///
/// ```rust
/// use testrc_utils::error::{ConfigError, TestrcError};
/// use testrc_utils::exit_codes::ExitCode;
///
/// let err = TestrcError::Config(ConfigError::NotFound {
///     path: "./nope.json".to_string(),
/// });
/// assert_eq!(err.to_exit_code(), ExitCode::CONFIG);
/// assert!(err.to_string().contains("./nope.json"));
/// ```
#[derive(Error, Debug)]
pub enum TestrcError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser resolution error: {0}")]
    Browser(#[from] BrowserError),

    #[error("SSL option error: {0}")]
    Ssl(#[from] SslError),

    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {reason}")]
    Task { reason: String },
}

/// Trait for providing user-friendly error reporting with context and suggestions
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;

    /// Get the error category for grouping similar errors
    fn category(&self) -> ErrorCategory;
}

/// Categories of errors for better organization and handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    BrowserResolution,
    Security,
    Filtering,
    FileSystem,
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::BrowserResolution => write!(f, "Browser Resolution"),
            Self::Security => write!(f, "Security"),
            Self::Filtering => write!(f, "Filtering"),
            Self::FileSystem => write!(f, "File System"),
            Self::Internal => write!(f, "Internal"),
        }
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested configuration file does not exist.
    #[error("Configuration file not found at {path}")]
    NotFound { path: String },

    #[error("Invalid configuration file {path}: {reason}")]
    InvalidFile { path: String, reason: String },

    #[error("Unsupported configuration file format: {path}")]
    UnsupportedFormat { path: String },

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::NotFound { path } => format!("Configuration file not found: {path}"),
            Self::InvalidFile { path, reason } => {
                format!("Configuration file {path} has invalid content: {reason}")
            }
            Self::UnsupportedFormat { path } => {
                format!("Configuration file {path} has an unsupported extension")
            }
            Self::InvalidValue { key, value } => {
                format!("Option '{key}' has invalid value: {value}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::NotFound { .. } => Some(
                "The file was requested explicitly, so testrc does not fall back to discovery."
                    .to_string(),
            ),
            Self::InvalidFile { .. } => Some(
                "Configuration files must contain a single top-level object of options."
                    .to_string(),
            ),
            Self::UnsupportedFormat { .. } => Some(
                "Supported extensions are .json, .toml, .yaml and .yml.".to_string(),
            ),
            Self::InvalidValue { key, .. } => Some(format!(
                "The '{key}' option has specific type and range requirements."
            )),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::NotFound { path } => vec![
                format!("Check that {path} exists relative to the working directory"),
                "Omit --config to use the conventional .testrc file instead".to_string(),
            ],
            Self::InvalidFile { .. } => vec![
                "Validate the file syntax with a JSON, TOML or YAML linter".to_string(),
                "Make sure the top level is an object, not a list or scalar".to_string(),
            ],
            Self::UnsupportedFormat { .. } => {
                vec!["Rename the file to use a supported extension".to_string()]
            }
            Self::InvalidValue { key, .. } => match key.as_str() {
                "speed" => vec!["Use a number between 0.01 and 1".to_string()],
                "concurrency" => vec!["Use a positive integer".to_string()],
                "reporter" => vec![
                    "Use a reporter name or an object with 'name' and optional 'output'"
                        .to_string(),
                ],
                _ => vec!["Check the documentation for the expected value".to_string()],
            },
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

/// Browser resolution errors raised by a browser info resolver
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BrowserError {
    #[error("Cannot find the browser \"{alias}\"")]
    UnknownBrowser { alias: String },

    #[error("Cannot find the browser provider \"{provider}\" required by \"{alias}\"")]
    UnknownProvider { provider: String, alias: String },

    #[error("Invalid browser specifier: {reason}")]
    InvalidSpecifier { reason: String },
}

impl UserFriendlyError for BrowserError {
    fn user_message(&self) -> String {
        self.to_string()
    }

    fn context(&self) -> Option<String> {
        Some(
            "Browsers are given as '<name>', '<provider>:<name>', 'all', or {path, cmd} objects."
                .to_string(),
        )
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::UnknownBrowser { .. } => vec![
                "Check the spelling of the browser alias".to_string(),
                "Use 'all' to run in every locally installed browser".to_string(),
            ],
            Self::UnknownProvider { provider, .. } => {
                vec![format!("Register the '{provider}' provider before resolving")]
            }
            Self::InvalidSpecifier { .. } => {
                vec!["Use a string alias or an object with a 'path' field".to_string()]
            }
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::BrowserResolution
    }
}

/// SSL option errors raised by an SSL option resolver
#[derive(Error, Debug)]
pub enum SslError {
    #[error("Failed to read SSL '{option}' file at {}: {source}", .path.display())]
    ReadFailed {
        option: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid SSL options: {reason}")]
    Invalid { reason: String },
}

impl UserFriendlyError for SslError {
    fn user_message(&self) -> String {
        self.to_string()
    }

    fn context(&self) -> Option<String> {
        Some(
            "SSL options are a 'key=value;key=value' string or an object; cert, key, pfx and ca may name files."
                .to_string(),
        )
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::ReadFailed { .. } => {
                vec!["Check the file permissions of the certificate material".to_string()]
            }
            Self::Invalid { .. } => {
                vec!["Separate options with ';' and write each as key=value".to_string()]
            }
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Security
    }
}

/// Test filter compilation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid {field} pattern '{pattern}': {reason}")]
    InvalidPattern {
        field: String,
        pattern: String,
        reason: String,
    },

    #[error("Invalid filter option: {reason}")]
    InvalidShape { reason: String },
}

impl UserFriendlyError for FilterError {
    fn user_message(&self) -> String {
        self.to_string()
    }

    fn context(&self) -> Option<String> {
        Some(
            "The filter option accepts test, fixture, testGrep, fixtureGrep, testMeta and fixtureMeta."
                .to_string(),
        )
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidPattern { .. } => {
                vec!["Escape regex metacharacters such as '(' and '['".to_string()]
            }
            Self::InvalidShape { .. } => vec!["Write the filter as an object".to_string()],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Filtering
    }
}

impl UserFriendlyError for TestrcError {
    fn user_message(&self) -> String {
        match self {
            Self::Config(err) => err.user_message(),
            Self::Browser(err) => err.user_message(),
            Self::Ssl(err) => err.user_message(),
            Self::Filter(err) => err.user_message(),
            Self::Io(err) => format!("File system operation failed: {err}"),
            Self::Task { reason } => format!("Internal task failed: {reason}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Config(err) => err.context(),
            Self::Browser(err) => err.context(),
            Self::Ssl(err) => err.context(),
            Self::Filter(err) => err.context(),
            Self::Io(_) | Self::Task { .. } => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(err) => err.suggestions(),
            Self::Browser(err) => err.suggestions(),
            Self::Ssl(err) => err.suggestions(),
            Self::Filter(err) => err.suggestions(),
            Self::Io(_) => vec!["Check file permissions and available disk space".to_string()],
            Self::Task { .. } => Vec::new(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(err) => err.category(),
            Self::Browser(err) => err.category(),
            Self::Ssl(err) => err.category(),
            Self::Filter(err) => err.category(),
            Self::Io(_) => ErrorCategory::FileSystem,
            Self::Task { .. } => ErrorCategory::Internal,
        }
    }
}

impl TestrcError {
    /// Get a user-friendly error message with context and actionable suggestions.
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Error: {}\n", self.user_message()));

        if let Some(ctx) = self.context() {
            output.push_str(&format!("\nContext: {ctx}\n"));
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        output
    }

    /// Map this error to the appropriate CLI exit code.
    #[must_use]
    pub fn to_exit_code(&self) -> crate::exit_codes::ExitCode {
        use crate::exit_codes::ExitCode;

        match self {
            TestrcError::Config(_) | TestrcError::Filter(_) => ExitCode::CONFIG,
            TestrcError::Browser(_) => ExitCode::BROWSER,
            TestrcError::Ssl(_) => ExitCode::SSL,
            TestrcError::Io(_) | TestrcError::Task { .. } => ExitCode::INTERNAL,
        }
    }
}
