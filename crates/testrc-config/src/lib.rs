//! Option resolution for testrc.
//!
//! This crate holds the option store with provenance tracking, the default
//! catalog, the value normalizers, the collaborator traits (browser, SSL,
//! filter and reporter resolution) with their default implementations, and
//! [`TestConfiguration`], which drives them.
//!
//! ```rust,no_run
//! use testrc_config::{OptionBag, TestConfiguration, WarningLog};
//!
//! # async fn run() -> Result<(), testrc_utils::TestrcError> {
//! let mut config = TestConfiguration::new(None)?;
//! config
//!     .init(Some(OptionBag::new().with("browsers", "chrome")))
//!     .await?;
//! config.prepare();
//!
//! let mut warnings = WarningLog::new();
//! config.notify_about_overridden_options(Some(&mut warnings));
//! config.notify_about_deprecated_options(&mut warnings);
//! # Ok(())
//! # }
//! ```

pub mod browsers;
pub mod config;
pub mod defaults;
pub mod filter;
pub mod names;
pub mod normalize;
pub mod reporters;
pub mod ssl;
pub mod store;
pub mod value;
pub mod warnings;

pub use browsers::{
    BrowserConnection, BrowserInfo, BrowserInfoResolver, BrowserSpec, ProviderBrowserResolver,
};
pub use config::{ProxyOptions, StartOptions, TestConfiguration, TestConfigurationBuilder};
pub use filter::{DefaultFilterCompiler, FilterCompiler, FilterSpec, TestFilter, TestMetadata};
pub use names::OptionName;
pub use reporters::{DefaultReporterPreparer, ReporterPreparer, ReporterSpec};
pub use ssl::{DefaultSslResolver, SslOptionResolver, SslOptions};
pub use store::{ConfigValue, OptionBag, OptionSet, OverrideRecord};
pub use testrc_utils::types::ConfigSource;
pub use value::OptionValue;
pub use warnings::WarningLog;
