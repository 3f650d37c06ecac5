use std::path::PathBuf;
use std::sync::Arc;

use testrc_utils::error::TestrcError;

use crate::browsers::{BrowserInfoResolver, ProviderBrowserResolver};
use crate::filter::{DefaultFilterCompiler, FilterCompiler};
use crate::reporters::{DefaultReporterPreparer, ReporterPreparer};
use crate::ssl::{DefaultSslResolver, SslOptionResolver};
use crate::store::{OptionSet, OverrideRecord};

use super::{Collaborators, TestConfiguration};

/// Builder for [`TestConfiguration`].
///
/// Unset collaborators fall back to the default implementations; an unset
/// working directory falls back to the process's current directory.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use testrc_config::{ProviderBrowserResolver, TestConfiguration};
///
/// let config = TestConfiguration::builder()
///     .config_path(".testrc.ci.json")
///     .working_dir("/srv/app")
///     .browser_resolver(Arc::new(
///         ProviderBrowserResolver::new().with_provider("remote", Vec::<String>::new()),
///     ))
///     .build()?;
/// # Ok::<(), testrc_utils::TestrcError>(())
/// ```
#[derive(Default)]
pub struct TestConfigurationBuilder {
    config_path: Option<PathBuf>,
    working_dir: Option<PathBuf>,
    browsers: Option<Arc<dyn BrowserInfoResolver>>,
    ssl: Option<Arc<dyn SslOptionResolver>>,
    filter: Option<Arc<dyn FilterCompiler>>,
    reporters: Option<Arc<dyn ReporterPreparer>>,
}

impl TestConfigurationBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load this file instead of searching for a conventional one.
    /// Relative paths are taken from the working directory.
    #[must_use]
    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn browser_resolver(mut self, resolver: Arc<dyn BrowserInfoResolver>) -> Self {
        self.browsers = Some(resolver);
        self
    }

    #[must_use]
    pub fn ssl_resolver(mut self, resolver: Arc<dyn SslOptionResolver>) -> Self {
        self.ssl = Some(resolver);
        self
    }

    #[must_use]
    pub fn filter_compiler(mut self, compiler: Arc<dyn FilterCompiler>) -> Self {
        self.filter = Some(compiler);
        self
    }

    #[must_use]
    pub fn reporter_preparer(mut self, preparer: Arc<dyn ReporterPreparer>) -> Self {
        self.reporters = Some(preparer);
        self
    }

    /// # Errors
    ///
    /// Returns `TestrcError::Io` if no working directory was given and the
    /// current directory cannot be read.
    pub fn build(self) -> Result<TestConfiguration, TestrcError> {
        let working_dir = match self.working_dir {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };

        let ssl = self
            .ssl
            .unwrap_or_else(|| Arc::new(DefaultSslResolver::with_base_dir(&working_dir)));
        let collaborators = Collaborators {
            browsers: self
                .browsers
                .unwrap_or_else(|| Arc::new(ProviderBrowserResolver::new())),
            ssl,
            filter: self.filter.unwrap_or_else(|| Arc::new(DefaultFilterCompiler)),
            reporters: self
                .reporters
                .unwrap_or_else(|| Arc::new(DefaultReporterPreparer)),
        };

        tracing::debug!(
            working_dir = %working_dir.display(),
            config_path = ?self.config_path,
            "Built test configuration"
        );

        Ok(TestConfiguration {
            options: OptionSet::new(),
            overridden: OverrideRecord::default(),
            config_path: self.config_path,
            file_path: None,
            working_dir,
            collaborators,
        })
    }
}
