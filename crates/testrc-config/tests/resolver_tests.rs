//! Resolver pipeline tests: load, normalize, merge, prepare, report.
//!
//! Tests:
//! - Explicit missing file vs. no conventional file
//! - Override tracking and drain semantics
//! - Filter compiled at most once per load
//! - Array shape, screenshots and compiler options after preparation
//! - Browser resolution order and failure propagation

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;

use testrc_config::{
    BrowserInfo, BrowserInfoResolver, BrowserSpec, ConfigSource, DefaultFilterCompiler,
    FilterCompiler, FilterSpec, OptionBag, OptionValue, TestConfiguration, TestFilter,
    TestMetadata, WarningLog,
};
use testrc_utils::error::{BrowserError, ConfigError, FilterError, TestrcError};

fn write_config(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

fn resolver(dir: &Path) -> Result<TestConfiguration> {
    Ok(TestConfiguration::builder().working_dir(dir).build()?)
}

fn json_option<'a>(config: &'a TestConfiguration, name: &str) -> Option<&'a Value> {
    config.get_option(name).and_then(OptionValue::as_json)
}

#[tokio::test]
async fn test_explicit_missing_file_names_the_path() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut config = TestConfiguration::builder()
        .working_dir(temp_dir.path())
        .config_path("./nope.json")
        .build()?;

    let err = config.init(None).await.unwrap_err();
    match &err {
        TestrcError::Config(ConfigError::NotFound { path }) => assert_eq!(path, "./nope.json"),
        other => panic!("expected NotFound, got {other:?}"),
    }
    assert!(err.to_string().contains("./nope.json"));
    Ok(())
}

#[tokio::test]
async fn test_explicit_file_bypasses_discovery() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_config(temp_dir.path(), ".testrc.json", r#"{"speed": 0.1}"#);
    write_config(temp_dir.path(), "ci.yaml", "speed: 0.7\n");

    let mut config = TestConfiguration::builder()
        .working_dir(temp_dir.path())
        .config_path("ci.yaml")
        .build()?;
    config.init(None).await?;

    assert_eq!(json_option(&config, "speed"), Some(&json!(0.7)));
    assert_eq!(config.file_path(), Some(temp_dir.path().join("ci.yaml").as_path()));
    Ok(())
}

#[tokio::test]
async fn test_no_conventional_file_yields_defaults_only() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut config = resolver(temp_dir.path())?;

    config.init(None).await?;
    assert!(config.file_path().is_none());
    assert!(config.options().is_empty());

    config.prepare();
    assert_eq!(json_option(&config, "pageLoadTimeout"), Some(&json!(3000)));
    assert_eq!(config.option_source("pageLoadTimeout"), Some(ConfigSource::Config));
    Ok(())
}

#[tokio::test]
async fn test_malformed_file_is_fatal() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_config(temp_dir.path(), ".testrc.toml", "speed = = 1");

    let mut config = resolver(temp_dir.path())?;
    let err = config.init(None).await.unwrap_err();
    assert!(matches!(err, TestrcError::Config(ConfigError::InvalidFile { .. })));
    Ok(())
}

#[tokio::test]
async fn test_override_reported_once_then_drained() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_config(
        temp_dir.path(),
        ".testrc.json",
        r#"{"src": ["a"], "concurrency": 2, "hostname": "file-host"}"#,
    );
    let mut config = resolver(temp_dir.path())?;

    let runtime = OptionBag::new()
        .with("src", json!(["b"]))
        .with("concurrency", 4u64)
        .with("speed", 0.5);
    config.init(Some(runtime)).await?;

    let mut log = WarningLog::new();
    let message = config
        .notify_about_overridden_options(Some(&mut log))
        .expect("overrides recorded");
    assert_eq!(
        message,
        "The \"src\", \"concurrency\" options from the configuration file will be ignored."
    );
    assert_eq!(log.messages(), [message.clone()]);

    assert!(config.notify_about_overridden_options(Some(&mut log)).is_none());
    assert_eq!(log.len(), 1);

    // A second merge touching the same option reports it again.
    config
        .async_merge_options(Some(OptionBag::new().with("hostname", "cli-host")))
        .await?;
    assert_eq!(
        config.notify_about_overridden_options(None).as_deref(),
        Some("The \"hostname\" option from the configuration file will be ignored.")
    );
    Ok(())
}

#[tokio::test]
async fn test_merge_of_new_or_default_options_records_nothing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_config(temp_dir.path(), ".testrc.json", r#"{"speed": 0.5}"#);
    let mut config = resolver(temp_dir.path())?;

    // proxyless exists only as a coerced Default after the load.
    let runtime = OptionBag::new()
        .with("proxyless", true)
        .with("quarantineMode", true);
    config.init(Some(runtime)).await?;

    assert!(config.pending_overrides().is_empty());
    assert_eq!(config.option_source("proxyless"), Some(ConfigSource::Input));
    Ok(())
}

#[tokio::test]
async fn test_merge_after_prepare_does_not_report_filled_values() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut config = resolver(temp_dir.path())?;
    config.init(None).await?;
    config.prepare();

    let runtime = OptionBag::new()
        .with("speed", 0.5)
        .with("skipJsErrors", true)
        .with("screenshots", json!({"path": "shots"}))
        .with("compilerOptions", json!({"typescript": {}}));
    config.async_merge_options(Some(runtime)).await?;

    assert!(config.pending_overrides().is_empty());
    assert!(config.notify_about_overridden_options(None).is_none());
    assert_eq!(config.option_source("speed"), Some(ConfigSource::Input));
    assert_eq!(config.option_source("selectorTimeout"), Some(ConfigSource::Config));
    Ok(())
}

#[tokio::test]
async fn test_merge_after_prepare_still_reports_file_values() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_config(temp_dir.path(), ".testrc.json", r#"{"speed": 0.5}"#);
    let mut config = resolver(temp_dir.path())?;
    config.init(None).await?;
    config.prepare();

    let runtime = OptionBag::new()
        .with("speed", 0.25)
        .with("pageLoadTimeout", 100u64);
    config.async_merge_options(Some(runtime)).await?;

    assert_eq!(config.pending_overrides(), ["speed"]);
    Ok(())
}

#[tokio::test]
async fn test_empty_runtime_bag_is_noop() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_config(temp_dir.path(), ".testrc.json", r#"{"speed": 0.5}"#);
    let mut config = resolver(temp_dir.path())?;

    config.init(Some(OptionBag::new())).await?;
    assert!(config.pending_overrides().is_empty());
    assert!(!config.options().contains("selectorTimeout"));
    assert_eq!(config.option_source("speed"), Some(ConfigSource::Config));
    Ok(())
}

struct CountingCompiler {
    calls: AtomicUsize,
}

impl FilterCompiler for CountingCompiler {
    fn compile(&self, spec: &FilterSpec) -> Result<TestFilter, FilterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        DefaultFilterCompiler.compile(spec)
    }
}

#[tokio::test]
async fn test_filter_compiled_once_per_load() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_config(
        temp_dir.path(),
        ".testrc.json",
        r#"{"filter": {"testGrep": "^smoke", "fixture": "checkout"}}"#,
    );
    let compiler = Arc::new(CountingCompiler {
        calls: AtomicUsize::new(0),
    });
    let mut config = TestConfiguration::builder()
        .working_dir(temp_dir.path())
        .filter_compiler(compiler.clone())
        .build()?;

    config.init(None).await?;
    config.async_merge_options(Some(OptionBag::new().with("speed", 1u64))).await?;
    config.prepare();

    assert_eq!(compiler.calls.load(Ordering::SeqCst), 1);
    let filter = config.filter().expect("filter compiled");
    let matching = TestMetadata {
        test_name: "smoke: pays".to_string(),
        fixture_name: "checkout".to_string(),
        ..TestMetadata::default()
    };
    let other = TestMetadata {
        test_name: "full: pays".to_string(),
        ..matching.clone()
    };
    assert!(filter.matches(&matching));
    assert!(!filter.matches(&other));
    Ok(())
}

#[tokio::test]
async fn test_runtime_filter_passes_through() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut config = resolver(temp_dir.path())?;

    let filter = TestFilter::new(|test| test.fixture_name == "only");
    config
        .init(Some(OptionBag::new().with("filter", filter)))
        .await?;

    let stored = config.filter().expect("filter kept");
    assert!(stored.matches(&TestMetadata {
        fixture_name: "only".to_string(),
        ..TestMetadata::default()
    }));
    Ok(())
}

#[tokio::test]
async fn test_array_shape_after_load() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_config(
        temp_dir.path(),
        ".testrc.yaml",
        "src: a\nclientScripts:\n  - a.js\n  - b.js\n",
    );
    let mut config = resolver(temp_dir.path())?;
    config.init(None).await?;

    assert_eq!(json_option(&config, "src"), Some(&json!(["a"])));
    assert_eq!(json_option(&config, "clientScripts"), Some(&json!(["a.js", "b.js"])));
    assert!(!config.options().contains("browsers"));
    Ok(())
}

#[tokio::test]
async fn test_reporters_prepared_after_load() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_config(
        temp_dir.path(),
        ".testrc.json",
        r#"{"reporter": [{"name": "json", "output": "report.json"}, "spec"]}"#,
    );
    let mut config = resolver(temp_dir.path())?;
    config.init(None).await?;

    let names: Vec<_> = config.reporters().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["json", "spec"]);
    assert_eq!(config.reporters()[0].output.as_deref(), Some("report.json"));
    Ok(())
}

#[tokio::test]
async fn test_ssl_file_material_is_read() -> Result<()> {
    let temp_dir = TempDir::new()?;
    fs::write(temp_dir.path().join("server.key"), "KEY MATERIAL")?;
    write_config(
        temp_dir.path(),
        ".testrc.json",
        r#"{"ssl": "key=server.key;rejectUnauthorized=true"}"#,
    );
    let mut config = resolver(temp_dir.path())?;
    config.init(None).await?;

    let ssl = config.start_options().options.ssl.expect("ssl resolved");
    assert_eq!(ssl.get("key"), Some(&json!("KEY MATERIAL")));
    assert_eq!(ssl.get("rejectUnauthorized"), Some(&json!(true)));
    Ok(())
}

#[tokio::test]
async fn test_screenshots_partial_fill_keeps_thumbnails() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_config(
        temp_dir.path(),
        ".testrc.json",
        r#"{"screenshots": {"thumbnails": false}}"#,
    );
    let mut config = resolver(temp_dir.path())?;
    config.init(None).await?;
    config.prepare();

    let expected_path = temp_dir.path().join("screenshots");
    assert_eq!(
        json_option(&config, "screenshots"),
        Some(&json!({"thumbnails": false, "path": expected_path.to_string_lossy()}))
    );
    assert_eq!(config.option_source("screenshots"), Some(ConfigSource::Config));
    Ok(())
}

#[tokio::test]
async fn test_compiler_options_merge_with_ts_config_path() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_config(
        temp_dir.path(),
        ".testrc.json",
        r#"{"compilerOptions": {"typescript": {"strict": true}}}"#,
    );
    let mut config = resolver(temp_dir.path())?;
    config
        .init(Some(OptionBag::new().with("tsConfigPath", "tsconfig.json")))
        .await?;
    config.prepare();

    assert_eq!(
        json_option(&config, "compilerOptions"),
        Some(&json!({"typescript": {"strict": true, "configPath": "tsconfig.json"}}))
    );

    let mut log = WarningLog::new();
    assert_eq!(config.notify_about_deprecated_options(&mut log).len(), 1);
    Ok(())
}

/// Resolves "chrome" to two descriptors after a delay and anything else to
/// one descriptor immediately.
struct ExpandingResolver;

#[async_trait]
impl BrowserInfoResolver for ExpandingResolver {
    async fn resolve(&self, spec: BrowserSpec) -> Result<Vec<BrowserInfo>, BrowserError> {
        let BrowserSpec::Raw(Value::String(alias)) = spec else {
            return Err(BrowserError::InvalidSpecifier {
                reason: "expected an alias".to_string(),
            });
        };
        let info = |name: &str| BrowserInfo {
            alias: alias.clone(),
            provider_name: "test".to_string(),
            browser_name: name.to_string(),
            connection: None,
        };
        match alias.as_str() {
            "chrome" => {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok(vec![info("chrome:headless"), info("chrome:mobile")])
            }
            "broken" => Err(BrowserError::UnknownBrowser {
                alias: alias.clone(),
            }),
            other => Ok(vec![info(other)]),
        }
    }
}

#[tokio::test]
async fn test_browser_expansion_keeps_input_order() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_config(temp_dir.path(), ".testrc.json", r#"{"browsers": ["chrome", "firefox"]}"#);
    let mut config = TestConfiguration::builder()
        .working_dir(temp_dir.path())
        .browser_resolver(Arc::new(ExpandingResolver))
        .build()?;
    config.init(None).await?;

    let names: Vec<_> = config
        .browsers()
        .iter()
        .map(|b| b.browser_name.as_str())
        .collect();
    assert_eq!(names, ["chrome:headless", "chrome:mobile", "firefox"]);
    Ok(())
}

#[tokio::test]
async fn test_browser_failure_leaves_no_partial_list() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_config(
        temp_dir.path(),
        ".testrc.json",
        r#"{"browsers": "firefox", "concurrency": 2}"#,
    );
    let mut config = TestConfiguration::builder()
        .working_dir(temp_dir.path())
        .browser_resolver(Arc::new(ExpandingResolver))
        .build()?;
    config.init(None).await?;

    let runtime = OptionBag::new()
        .with("browsers", json!(["chrome", "broken"]))
        .with("concurrency", 4u64);
    let err = config.async_merge_options(Some(runtime)).await.unwrap_err();

    assert!(matches!(
        err,
        TestrcError::Browser(BrowserError::UnknownBrowser { ref alias }) if alias == "broken"
    ));
    let names: Vec<_> = config
        .browsers()
        .iter()
        .map(|b| b.browser_name.as_str())
        .collect();
    assert_eq!(names, ["firefox"]);
    assert_eq!(config.option_source("browsers"), Some(ConfigSource::Config));
    assert_eq!(json_option(&config, "concurrency"), Some(&json!(2)));
    assert!(config.pending_overrides().is_empty());
    Ok(())
}
