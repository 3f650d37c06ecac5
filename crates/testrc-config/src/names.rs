//! Option name catalog.
//!
//! Option sets are keyed by plain strings so unknown names from a
//! configuration file survive untouched; [`OptionName`] covers every name the
//! resolver itself reads or writes.

use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// Names of the options the resolver understands.
///
/// The string form is the camelCase key used in configuration files and
/// runtime option bags.
///
/// ```rust
/// use std::str::FromStr;
/// use testrc_config::OptionName;
///
/// assert_eq!(OptionName::DisableHttp2.as_ref(), "disableHttp2");
/// assert_eq!(OptionName::from_str("tsConfigPath").unwrap(), OptionName::TsConfigPath);
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    AsRefStr,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[strum(serialize_all = "camelCase")]
pub enum OptionName {
    Src,
    Browsers,
    Filter,
    Reporter,
    Ssl,
    Hostname,
    #[strum(serialize = "port1")]
    Port1,
    #[strum(serialize = "port2")]
    Port2,
    DevelopmentMode,
    RetryTestPages,
    Cache,
    #[strum(serialize = "disableHttp2")]
    DisableHttp2,
    Proxyless,
    SkipJsErrors,
    DebugMode,
    DebugOnFail,
    SkipUncaughtErrors,
    StopOnFirstFail,
    TakeScreenshotsOnFails,
    DisablePageCaching,
    DisablePageReloads,
    DisableScreenshots,
    DisableMultipleWindows,
    SelectorTimeout,
    AssertionTimeout,
    PageLoadTimeout,
    Speed,
    AppInitDelay,
    Concurrency,
    Screenshots,
    CompilerOptions,
    TsConfigPath,
    ClientScripts,
    QuarantineMode,
}

/// Flags coerced to booleans right after a configuration file is loaded.
///
/// These feed the proxy start options, so they must be booleans before any
/// runtime merge happens.
pub const INIT_FLAGS: &[OptionName] = &[
    OptionName::DevelopmentMode,
    OptionName::RetryTestPages,
    OptionName::Cache,
    OptionName::DisableHttp2,
    OptionName::Proxyless,
];

/// Flags re-coerced to booleans by the preparation pass.
pub const RUN_FLAGS: &[OptionName] = &[
    OptionName::SkipJsErrors,
    OptionName::DebugMode,
    OptionName::DebugOnFail,
    OptionName::SkipUncaughtErrors,
    OptionName::StopOnFirstFail,
    OptionName::TakeScreenshotsOnFails,
    OptionName::DisablePageCaching,
    OptionName::DisablePageReloads,
    OptionName::DisableScreenshots,
    OptionName::DisableMultipleWindows,
];

/// Options that are always normalized to arrays after a file load.
pub const ARRAY_OPTIONS: &[OptionName] = &[
    OptionName::Src,
    OptionName::Browsers,
    OptionName::ClientScripts,
];

/// Deprecated option names paired with the option that replaces them.
pub const DEPRECATED_OPTIONS: &[(OptionName, &str)] = &[(
    OptionName::TsConfigPath,
    "compilerOptions.typescript.configPath",
)];
