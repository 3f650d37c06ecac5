//! CLI argument definitions
//!
//! Flags map onto the runtime option bag merged over the configuration file.

use clap::Parser;
use serde_json::{Value, json};
use std::path::PathBuf;

use testrc_config::{
    DefaultFilterCompiler, DefaultReporterPreparer, FilterCompiler, FilterSpec, OptionBag,
    OptionName, ReporterPreparer,
};
use testrc_utils::TestrcError;

/// testrc - resolve the effective configuration of a browser test session
#[derive(Parser, Debug)]
#[command(name = "testrc")]
#[command(about = "Resolve and print the effective configuration of a test session")]
#[command(long_about = r#"
testrc loads a .testrc configuration file, merges command-line options over it,
resolves browsers and fills defaults, then prints every effective option with
the source it came from.

EXAMPLES:
  # Show the effective configuration for the current directory
  testrc

  # Override browsers and sources from the command line
  testrc -b chrome -b firefox --src e2e/

  # Use an explicit configuration file and print JSON
  testrc --config ci.testrc.json --json

CONFIGURATION:
  Precedence: command-line options > configuration file > defaults
  Discovery looks for .testrc.json, .testrc.toml, .testrc.yaml and .testrc.yml
  in the working directory. Use --config to load a specific file.
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Working directory used for discovery and relative paths
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Browser alias to run in (repeatable)
    #[arg(short = 'b', long = "browsers", value_name = "BROWSER")]
    pub browsers: Vec<String>,

    /// Test source file or directory (repeatable)
    #[arg(long, value_name = "PATH")]
    pub src: Vec<String>,

    /// Reporter as NAME or NAME=OUTPUT (repeatable)
    #[arg(long, value_name = "REPORTER")]
    pub reporter: Vec<String>,

    /// Number of browser instances per browser
    #[arg(long)]
    pub concurrency: Option<u64>,

    /// Test execution speed between 0.01 and 1
    #[arg(long)]
    pub speed: Option<f64>,

    /// Hostname the proxy listens on
    #[arg(long)]
    pub hostname: Option<String>,

    /// TypeScript configuration file (deprecated: use compilerOptions)
    #[arg(long)]
    pub ts_config_path: Option<String>,

    /// Run only the test with this name
    #[arg(long)]
    pub test: Option<String>,

    /// Run only tests whose name matches this pattern
    #[arg(long, value_name = "PATTERN")]
    pub test_grep: Option<String>,

    /// Run only the fixture with this name
    #[arg(long)]
    pub fixture: Option<String>,

    /// Run only fixtures whose name matches this pattern
    #[arg(long, value_name = "PATTERN")]
    pub fixture_grep: Option<String>,

    /// Enable development mode
    #[arg(long)]
    pub dev: bool,

    /// Print the effective configuration as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Runtime option bag for the flags that were given.
    ///
    /// Reporters and filters are prepared here, since runtime values are
    /// not normalized by the resolver.
    ///
    /// # Errors
    ///
    /// Returns the reporter or filter error for malformed flag values.
    pub fn runtime_options(&self) -> Result<OptionBag, TestrcError> {
        let mut bag = OptionBag::new();

        if !self.browsers.is_empty() {
            bag.insert(OptionName::Browsers, json!(self.browsers));
        }
        if !self.src.is_empty() {
            bag.insert(OptionName::Src, json!(self.src));
        }
        if !self.reporter.is_empty() {
            let specs = self.reporter.iter().map(String::as_str).map(reporter_value).collect();
            bag.insert(OptionName::Reporter, DefaultReporterPreparer.prepare(specs)?);
        }
        if let Some(concurrency) = self.concurrency {
            bag.insert(OptionName::Concurrency, concurrency);
        }
        if let Some(speed) = self.speed {
            bag.insert(OptionName::Speed, speed);
        }
        if let Some(hostname) = &self.hostname {
            bag.insert(OptionName::Hostname, hostname.as_str());
        }
        if let Some(path) = &self.ts_config_path {
            bag.insert(OptionName::TsConfigPath, path.as_str());
        }
        if let Some(spec) = self.filter_spec() {
            bag.insert(OptionName::Filter, DefaultFilterCompiler.compile(&spec)?);
        }
        if self.dev {
            bag.insert(OptionName::DevelopmentMode, true);
        }

        Ok(bag)
    }

    fn filter_spec(&self) -> Option<FilterSpec> {
        let spec = FilterSpec {
            test: self.test.clone(),
            fixture: self.fixture.clone(),
            test_grep: self.test_grep.clone(),
            fixture_grep: self.fixture_grep.clone(),
            ..FilterSpec::default()
        };
        (spec != FilterSpec::default()).then_some(spec)
    }
}

/// `NAME=OUTPUT` becomes `{name, output}`; anything else is a bare name.
fn reporter_value(flag: &str) -> Value {
    match flag.split_once('=') {
        Some((name, output)) => json!({ "name": name, "output": output }),
        None => Value::String(flag.to_string()),
    }
}
