//! Default catalog.

use serde_json::{Value, json};
use std::path::{Path, PathBuf};

use crate::names::OptionName;

pub const DEFAULT_SELECTOR_TIMEOUT: u64 = 10_000;
pub const DEFAULT_ASSERTION_TIMEOUT: u64 = 3_000;
pub const DEFAULT_PAGE_LOAD_TIMEOUT: u64 = 3_000;
pub const DEFAULT_SPEED: u64 = 1;
pub const DEFAULT_APP_INIT_DELAY: u64 = 1_000;
pub const DEFAULT_CONCURRENCY: u64 = 1;
pub const DEFAULT_SOURCE_DIRECTORIES: &[&str] = &["tests", "test"];
pub const DEFAULT_DEVELOPMENT_MODE: bool = false;
pub const DEFAULT_RETRY_TEST_PAGES: bool = false;
pub const DEFAULT_DISABLE_HTTP2: bool = false;
pub const DEFAULT_PROXYLESS: bool = false;

pub const DEFAULT_SCREENSHOTS_DIRECTORY: &str = "screenshots";
pub const DEFAULT_SCREENSHOT_THUMBNAILS: bool = true;

pub const DEFAULT_HOSTNAME: &str = "localhost";

/// Compiler entry that receives the `tsConfigPath` option.
pub const TYPESCRIPT_COMPILER: &str = "typescript";

/// Options filled with a catalog value by the preparation pass when unset.
pub const DEFAULTED_OPTIONS: &[OptionName] = &[
    OptionName::SelectorTimeout,
    OptionName::AssertionTimeout,
    OptionName::PageLoadTimeout,
    OptionName::Speed,
    OptionName::AppInitDelay,
    OptionName::Concurrency,
    OptionName::Src,
    OptionName::DevelopmentMode,
    OptionName::RetryTestPages,
    OptionName::DisableHttp2,
    OptionName::Proxyless,
];

/// Catalog value for a plain option, or `None` for options without a static
/// default (screenshots and compiler options are derived separately).
#[must_use]
pub fn default_value(name: OptionName) -> Option<Value> {
    let value = match name {
        OptionName::SelectorTimeout => json!(DEFAULT_SELECTOR_TIMEOUT),
        OptionName::AssertionTimeout => json!(DEFAULT_ASSERTION_TIMEOUT),
        OptionName::PageLoadTimeout => json!(DEFAULT_PAGE_LOAD_TIMEOUT),
        OptionName::Speed => json!(DEFAULT_SPEED),
        OptionName::AppInitDelay => json!(DEFAULT_APP_INIT_DELAY),
        OptionName::Concurrency => json!(DEFAULT_CONCURRENCY),
        OptionName::Src => json!(DEFAULT_SOURCE_DIRECTORIES),
        OptionName::DevelopmentMode => json!(DEFAULT_DEVELOPMENT_MODE),
        OptionName::RetryTestPages => json!(DEFAULT_RETRY_TEST_PAGES),
        OptionName::DisableHttp2 => json!(DEFAULT_DISABLE_HTTP2),
        OptionName::Proxyless => json!(DEFAULT_PROXYLESS),
        OptionName::CompilerOptions => default_compiler_options(),
        _ => return None,
    };
    Some(value)
}

#[must_use]
pub fn default_compiler_options() -> Value {
    json!({ TYPESCRIPT_COMPILER: {} })
}

/// Default screenshots directory, resolved against the working directory.
#[must_use]
pub fn default_screenshots_path(working_dir: &Path) -> PathBuf {
    working_dir.join(DEFAULT_SCREENSHOTS_DIRECTORY)
}
