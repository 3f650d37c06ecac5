//! Configuration resolver for testrc.
//!
//! [`TestConfiguration`] owns an [`OptionSet`] and drives it through the
//! resolution pipeline:
//!
//! 1. [`init`](TestConfiguration::init) loads the configuration file (an
//!    explicit path or the first of [`FILENAMES`] found in the working
//!    directory) and normalizes what it read.
//! 2. The runtime option bag is merged with [`ConfigSource::Input`]
//!    precedence, recording which file options it overrode.
//! 3. The `browsers` option is resolved into descriptors.
//! 4. [`prepare`](TestConfiguration::prepare) coerces flags and fills
//!    defaults.
//!
//! Collaborators (SSL, filter, reporter and browser resolution) are trait
//! objects supplied through [`TestConfigurationBuilder`].

mod builder;
pub mod discovery;
mod prepare;
mod reporting;
mod sources;
mod validation;

pub use builder::TestConfigurationBuilder;
pub use discovery::{FILENAMES, FileFormat, discover_config_file, load_config_file};
pub use reporting::{ProxyOptions, StartOptions};
pub use testrc_utils::types::ConfigSource;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use testrc_utils::error::{ConfigError, TestrcError};

use crate::browsers::{BrowserInfo, BrowserInfoResolver, BrowserSpec, browser_specs, resolve_browsers};
use crate::filter::{FilterCompiler, FilterSpec, TestFilter};
use crate::names::{ARRAY_OPTIONS, INIT_FLAGS, OptionName};
use crate::normalize::{cast_array, coerce_flag, ensure_array};
use crate::reporters::{ReporterPreparer, ReporterSpec};
use crate::ssl::SslOptionResolver;
use crate::store::{OptionBag, OptionSet, OverrideRecord};
use crate::value::OptionValue;

/// External services the resolver delegates to.
struct Collaborators {
    browsers: Arc<dyn BrowserInfoResolver>,
    ssl: Arc<dyn SslOptionResolver>,
    filter: Arc<dyn FilterCompiler>,
    reporters: Arc<dyn ReporterPreparer>,
}

/// Resolved configuration for one test session.
///
/// Not meant to be shared between sessions: `init`, `async_merge_options`
/// and `prepare` must be sequenced by the owner.
pub struct TestConfiguration {
    options: OptionSet,
    overridden: OverrideRecord,
    /// Path requested by the caller, as given.
    config_path: Option<PathBuf>,
    /// File actually loaded, if any.
    file_path: Option<PathBuf>,
    working_dir: PathBuf,
    collaborators: Collaborators,
}

impl fmt::Debug for TestConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestConfiguration")
            .field("options", &self.options)
            .field("overridden", &self.overridden)
            .field("config_path", &self.config_path)
            .field("file_path", &self.file_path)
            .field("working_dir", &self.working_dir)
            .finish_non_exhaustive()
    }
}

impl TestConfiguration {
    /// Conventional configuration filenames, in search order.
    pub const FILENAMES: [&'static str; 4] = FILENAMES;

    /// Resolver for the current directory with the default collaborators.
    ///
    /// # Errors
    ///
    /// Returns `TestrcError::Io` if the current directory cannot be read.
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, TestrcError> {
        let mut builder = Self::builder();
        if let Some(path) = config_path {
            builder = builder.config_path(path);
        }
        builder.build()
    }

    #[must_use]
    pub fn builder() -> TestConfigurationBuilder {
        TestConfigurationBuilder::new()
    }

    /// Load the configuration file, merge `runtime_options` over it and
    /// resolve browsers.
    ///
    /// A missing conventional file is not an error; the set then holds only
    /// the runtime options.
    ///
    /// # Errors
    ///
    /// - `ConfigError::NotFound` if an explicit path names no file
    /// - `ConfigError::InvalidFile` / `UnsupportedFormat` for unreadable files
    /// - errors from the SSL, filter, reporter and browser collaborators,
    ///   unchanged
    pub async fn init(&mut self, runtime_options: Option<OptionBag>) -> Result<(), TestrcError> {
        if let Some(path) = self.locate_config_file()? {
            let bag = load_config_file(&path).await?;
            tracing::info!(path = %path.display(), options = bag.len(), "Loaded configuration file");

            self.options = OptionSet::from_bag(bag, ConfigSource::Config);
            self.file_path = Some(path);
            self.normalize_after_load().await?;
        } else {
            tracing::debug!(dir = %self.working_dir.display(), "No configuration file found");
        }

        self.async_merge_options(runtime_options).await
    }

    /// Merge runtime options with `Input` precedence, then re-resolve the
    /// `browsers` option if present.
    ///
    /// An absent or empty bag records no overrides. Pending override names
    /// accumulate until
    /// [`notify_about_overridden_options`](Self::notify_about_overridden_options)
    /// drains them.
    ///
    /// # Errors
    ///
    /// Returns the browser resolver's error unchanged. A failed merge leaves
    /// the options and the pending overrides as they were before the call.
    pub async fn async_merge_options(
        &mut self,
        runtime_options: Option<OptionBag>,
    ) -> Result<(), TestrcError> {
        let snapshot = (self.options.clone(), self.overridden.clone());

        if let Some(bag) = runtime_options.filter(|bag| !bag.is_empty()) {
            let overridden = self.options.merge_from(bag, ConfigSource::Input);
            if !overridden.is_empty() {
                tracing::debug!(options = ?overridden, "Runtime options override configuration file");
            }
            self.overridden.extend(overridden);
        }

        if self.options.contains(OptionName::Browsers)
            && let Err(err) = self.resolve_browser_option().await
        {
            (self.options, self.overridden) = snapshot;
            return Err(err);
        }

        Ok(())
    }

    fn locate_config_file(&self) -> Result<Option<PathBuf>, ConfigError> {
        let Some(requested) = &self.config_path else {
            return Ok(discover_config_file(&self.working_dir));
        };

        let path = if requested.is_relative() {
            self.working_dir.join(requested)
        } else {
            requested.clone()
        };
        if path.is_file() {
            Ok(Some(path))
        } else {
            Err(ConfigError::NotFound {
                path: requested.display().to_string(),
            })
        }
    }

    async fn normalize_after_load(&mut self) -> Result<(), TestrcError> {
        self.normalize_ssl().await?;
        self.coerce_init_flags();
        self.normalize_filter()?;
        self.normalize_array_options();
        self.normalize_reporters()?;
        Ok(())
    }

    async fn normalize_ssl(&mut self) -> Result<(), TestrcError> {
        let Some(raw) = self.options.json(OptionName::Ssl).cloned() else {
            return Ok(());
        };

        match self.collaborators.ssl.resolve(&raw).await? {
            Some(ssl) => {
                tracing::debug!(keys = ssl.as_map().len(), "Resolved SSL options");
                self.options.replace_value(OptionName::Ssl, ssl);
            }
            None => {
                self.options.remove(OptionName::Ssl);
            }
        }
        Ok(())
    }

    /// Absent init flags are created at `Default` so a later runtime value
    /// does not count as an override.
    fn coerce_init_flags(&mut self) {
        for name in INIT_FLAGS {
            let flag = coerce_flag(self.options.value(name));
            if !self.options.replace_value(name, flag) {
                self.options.fill(name, flag, ConfigSource::Default);
            }
        }
    }

    /// Compile the structured filter. A value that is already a predicate is
    /// left alone.
    fn normalize_filter(&mut self) -> Result<(), TestrcError> {
        let Some(raw) = self.options.json(OptionName::Filter).cloned() else {
            return Ok(());
        };

        let spec = FilterSpec::from_json(raw)?;
        let filter = self.collaborators.filter.compile(&spec)?;
        tracing::debug!("Compiled test filter");
        self.options.replace_value(OptionName::Filter, filter);
        Ok(())
    }

    fn normalize_array_options(&mut self) {
        for name in ARRAY_OPTIONS {
            if let Some(mut option) = self.options.remove(name) {
                option.value = ensure_array(option.value);
                self.options.insert(name, option);
            }
        }
    }

    fn normalize_reporters(&mut self) -> Result<(), TestrcError> {
        let Some(raw) = self.options.json(OptionName::Reporter).cloned() else {
            return Ok(());
        };

        let reporters = self.collaborators.reporters.prepare(cast_array(raw))?;
        tracing::debug!(count = reporters.len(), "Prepared reporters");
        self.options.replace_value(OptionName::Reporter, reporters);
        Ok(())
    }

    async fn resolve_browser_option(&mut self) -> Result<(), TestrcError> {
        let specs = browser_specs(self.options.value(OptionName::Browsers))?;
        let resolved = resolve_browsers(Arc::clone(&self.collaborators.browsers), specs).await?;
        tracing::debug!(count = resolved.len(), "Resolved browsers");

        let resolved: Vec<BrowserSpec> = resolved.into_iter().map(BrowserSpec::Resolved).collect();
        self.options.replace_value(OptionName::Browsers, resolved);
        Ok(())
    }

    /// Write `value` over a configured option, keeping its source. An
    /// undefined option is filled at its own source, a missing one at
    /// `Config`.
    fn write_back(&mut self, name: OptionName, value: impl Into<OptionValue>) {
        match self.options.get(name) {
            Some(option) if option.value.is_defined() => {
                self.options.replace_value(name, value);
            }
            Some(option) => {
                let source = option.source;
                self.options.fill(name, value, source);
            }
            None => self.options.fill(name, value, ConfigSource::Config),
        }
    }

    #[must_use]
    pub fn options(&self) -> &OptionSet {
        &self.options
    }

    /// Defined value of an option.
    #[must_use]
    pub fn get_option(&self, name: impl AsRef<str>) -> Option<&OptionValue> {
        self.options.value(name)
    }

    #[must_use]
    pub fn option_source(&self, name: impl AsRef<str>) -> Option<ConfigSource> {
        self.options.source(name)
    }

    /// The compiled filter, once a file filter has been normalized or a
    /// caller supplied one.
    #[must_use]
    pub fn filter(&self) -> Option<&TestFilter> {
        match self.options.value(OptionName::Filter) {
            Some(OptionValue::Filter(filter)) => Some(filter),
            _ => None,
        }
    }

    /// Resolved browser descriptors, in resolution order.
    #[must_use]
    pub fn browsers(&self) -> Vec<&BrowserInfo> {
        match self.options.value(OptionName::Browsers) {
            Some(OptionValue::Browsers(specs)) => {
                specs.iter().filter_map(BrowserSpec::as_resolved).collect()
            }
            _ => Vec::new(),
        }
    }

    #[must_use]
    pub fn reporters(&self) -> &[ReporterSpec] {
        match self.options.value(OptionName::Reporter) {
            Some(OptionValue::Reporters(reporters)) => reporters,
            _ => &[],
        }
    }

    /// Override names waiting to be reported.
    #[must_use]
    pub fn pending_overrides(&self) -> &[String] {
        self.overridden.names()
    }

    /// The configuration file that was loaded, if any.
    #[must_use]
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    #[must_use]
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browsers::ProviderBrowserResolver;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn resolver_in(dir: &TempDir) -> TestConfiguration {
        TestConfiguration::builder()
            .working_dir(dir.path())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_init_without_file_uses_runtime_options_only() {
        let dir = TempDir::new().unwrap();
        let mut config = resolver_in(&dir);

        config
            .init(Some(OptionBag::new().with("speed", 0.5)))
            .await
            .unwrap();

        assert!(config.file_path().is_none());
        assert_eq!(config.option_source("speed"), Some(ConfigSource::Input));
        assert!(config.pending_overrides().is_empty());
        assert!(!config.options().contains(OptionName::DevelopmentMode));
    }

    #[tokio::test]
    async fn test_init_flags_coerced_after_load() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".testrc.json"),
            r#"{"developmentMode": "yes", "cache": 0}"#,
        )
        .unwrap();
        let mut config = resolver_in(&dir);
        config.init(None).await.unwrap();

        assert_eq!(config.get_option("developmentMode").and_then(OptionValue::as_bool), Some(true));
        assert_eq!(config.get_option("cache").and_then(OptionValue::as_bool), Some(false));
        assert_eq!(config.option_source("cache"), Some(ConfigSource::Config));
        assert_eq!(config.option_source("proxyless"), Some(ConfigSource::Default));
    }

    #[tokio::test]
    async fn test_array_options_wrapped_after_load() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".testrc.json"),
            r#"{"src": "e2e", "clientScripts": ["a.js", "b.js"]}"#,
        )
        .unwrap();
        let mut config = resolver_in(&dir);
        config.init(None).await.unwrap();

        assert_eq!(config.get_option("src").and_then(OptionValue::as_json), Some(&json!(["e2e"])));
        assert_eq!(
            config.get_option("clientScripts").and_then(OptionValue::as_json),
            Some(&json!(["a.js", "b.js"]))
        );
        assert!(!config.options().contains(OptionName::Browsers));
    }

    #[tokio::test]
    async fn test_unknown_names_are_kept() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".testrc.json"), r#"{"customThing": [1, 2]}"#).unwrap();
        let mut config = resolver_in(&dir);
        config.init(None).await.unwrap();

        assert_eq!(
            config.get_option("customThing").and_then(OptionValue::as_json),
            Some(&json!([1, 2]))
        );
    }

    #[tokio::test]
    async fn test_runtime_browsers_are_resolved() {
        let dir = TempDir::new().unwrap();
        let mut config = TestConfiguration::builder()
            .working_dir(dir.path())
            .browser_resolver(Arc::new(ProviderBrowserResolver::new()))
            .build()
            .unwrap();

        config
            .init(Some(OptionBag::new().with("browsers", "firefox")))
            .await
            .unwrap();

        let browsers = config.browsers();
        assert_eq!(browsers.len(), 1);
        assert_eq!(browsers[0].browser_name, "firefox");
    }

    #[tokio::test]
    async fn test_unknown_browser_fails_merge() {
        let dir = TempDir::new().unwrap();
        let mut config = resolver_in(&dir);

        let err = config
            .init(Some(OptionBag::new().with("browsers", json!(["chrome", "netscape"]))))
            .await
            .unwrap_err();

        assert!(matches!(err, TestrcError::Browser(_)));
    }

    #[tokio::test]
    async fn test_filter_compile_error_propagates() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".testrc.json"),
            r#"{"filter": {"testGrep": "(broken"}}"#,
        )
        .unwrap();
        let mut config = resolver_in(&dir);

        let err = config.init(None).await.unwrap_err();
        assert!(matches!(err, TestrcError::Filter(_)));
    }
}
