//! Exit code constants for the testrc CLI.
//!
//! # Exit Code Table
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Configuration resolved successfully |
//! | 1 | `INTERNAL` | General/internal failure |
//! | 2 | `CONFIG` | Invalid CLI arguments, configuration file, or option value |
//! | 3 | `BROWSER` | A browser specifier could not be resolved |
//! | 4 | `SSL` | SSL options could not be resolved |

/// Exit codes matching the documented exit code table.
///
/// The numeric values are part of the public API and will not change in 1.x
/// releases.
///
/// # Example
///
/// ```rust
/// use testrc_utils::exit_codes::ExitCode;
///
/// assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
/// assert_eq!(ExitCode::from_i32(3), ExitCode::BROWSER);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - configuration resolved
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Internal error - general failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// Configuration error - bad arguments, file, or option value
    pub const CONFIG: ExitCode = ExitCode(2);

    /// Browser resolution failed
    pub const BROWSER: ExitCode = ExitCode(3);

    /// SSL option resolution failed
    pub const SSL: ExitCode = ExitCode(4);

    /// Get the numeric exit code value.
    ///
    /// Use this with `std::process::exit()`.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Create an ExitCode from a raw i32 value.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<i32> for ExitCode {
    fn from(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}
