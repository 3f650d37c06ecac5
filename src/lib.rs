//! testrc: effective configuration for browser test sessions.
//!
//! The resolver merges a `.testrc` configuration file with runtime options,
//! normalizes option shapes, fills defaults and reports overridden and
//! deprecated options. This crate re-exports the stable API of the workspace
//! crates and hosts the `testrc` command-line interface.
//!
//! ```rust,no_run
//! use testrc::{OptionBag, TestConfiguration};
//!
//! # async fn run() -> Result<(), testrc::TestrcError> {
//! let mut config = TestConfiguration::new(Some(".testrc.json".into()))?;
//! config.init(Some(OptionBag::new().with("concurrency", 2u64))).await?;
//! config.prepare();
//! config.validate()?;
//!
//! let start = config.start_options();
//! println!("proxy on {}", start.hostname);
//! # Ok(())
//! # }
//! ```

pub mod cli;

pub use testrc_config::{
    BrowserInfo, BrowserInfoResolver, BrowserSpec, ConfigValue, DefaultFilterCompiler,
    DefaultReporterPreparer, DefaultSslResolver, FilterCompiler, FilterSpec, OptionBag,
    OptionName, OptionSet, OptionValue, OverrideRecord, ProviderBrowserResolver, ProxyOptions,
    ReporterPreparer, ReporterSpec, SslOptionResolver, SslOptions, StartOptions,
    TestConfiguration, TestConfigurationBuilder, TestFilter, TestMetadata, WarningLog,
};
pub use testrc_utils::{
    BrowserError, ConfigError, ConfigSource, ErrorCategory, ExitCode, FilterError, SslError,
    TestrcError, UserFriendlyError,
};
