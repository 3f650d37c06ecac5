//! Foundation utilities for testrc: provenance types, the error taxonomy,
//! exit codes, and tracing setup shared by every crate in the workspace.

pub mod error;
pub mod exit_codes;
pub mod logging;
pub mod types;

pub use error::{
    BrowserError, ConfigError, ErrorCategory, FilterError, SslError, TestrcError,
    UserFriendlyError,
};
pub use exit_codes::ExitCode;
pub use types::ConfigSource;
