//! Browser specifiers and their resolution into descriptors.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;

use testrc_utils::error::{BrowserError, TestrcError};

use crate::normalize::cast_array;
use crate::value::OptionValue;

/// Provider used for bare browser names.
pub const LOCAL_PROVIDER: &str = "locally-installed";

/// Provider for browsers given by executable path.
pub const PATH_PROVIDER: &str = "path";

/// Alias expanding to every locally installed browser.
pub const ALL_BROWSERS_ALIAS: &str = "all";

/// An already-established connection to a running browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserConnection {
    pub id: String,
    pub user_agent: String,
}

/// Resolved browser descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserInfo {
    /// Specifier the descriptor was resolved from.
    pub alias: String,
    pub provider_name: String,
    pub browser_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<BrowserConnection>,
}

/// One entry of the `browsers` option.
#[derive(Debug, Clone, PartialEq)]
pub enum BrowserSpec {
    /// Raw value from a file or the command line: an alias string or a
    /// `{path, cmd}` object.
    Raw(Value),
    Connection(BrowserConnection),
    Resolved(BrowserInfo),
}

impl BrowserSpec {
    #[must_use]
    pub fn as_resolved(&self) -> Option<&BrowserInfo> {
        match self {
            Self::Resolved(info) => Some(info),
            _ => None,
        }
    }

    /// Short label for status output.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Raw(Value::String(alias)) => alias.clone(),
            Self::Raw(other) => other.to_string(),
            Self::Connection(connection) => format!("connection:{}", connection.id),
            Self::Resolved(info) => info.alias.clone(),
        }
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Raw(value) => value.clone(),
            Self::Connection(connection) => json!({ "connection": connection }),
            Self::Resolved(info) => json!(info),
        }
    }
}

impl From<&str> for BrowserSpec {
    fn from(alias: &str) -> Self {
        Self::Raw(Value::String(alias.to_string()))
    }
}

/// Resolves one browser specifier into one or more descriptors.
#[async_trait]
pub trait BrowserInfoResolver: Send + Sync {
    /// # Errors
    ///
    /// Returns a `BrowserError` for unknown or malformed specifiers.
    async fn resolve(&self, spec: BrowserSpec) -> Result<Vec<BrowserInfo>, BrowserError>;
}

/// Resolves aliases against a registry of providers and the browsers they
/// offer.
///
/// - `<name>` and `<name>:<flags>` go to the local provider, whose list must
///   contain `<name>`.
/// - `<provider>:<name>` goes to a registered provider; a provider registered
///   with an empty list accepts any name.
/// - `all` expands to every local browser, in registry order.
/// - `{path, cmd}` objects and `path:<exe>` strings resolve to the path
///   provider.
/// - Connections and resolved descriptors pass through.
#[derive(Debug, Clone)]
pub struct ProviderBrowserResolver {
    providers: BTreeMap<String, Vec<String>>,
}

impl Default for ProviderBrowserResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderBrowserResolver {
    /// Registry with the common desktop browsers under the local provider.
    #[must_use]
    pub fn new() -> Self {
        Self::empty().with_provider(
            LOCAL_PROVIDER,
            ["chrome", "chromium", "chrome-canary", "firefox", "edge", "safari"],
        )
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            providers: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_provider<I, S>(mut self, provider: impl Into<String>, browsers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.providers.insert(
            provider.into(),
            browsers.into_iter().map(Into::into).collect(),
        );
        self
    }

    fn local_browsers(&self) -> &[String] {
        self.providers
            .get(LOCAL_PROVIDER)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn resolve_alias(&self, alias: &str) -> Result<Vec<BrowserInfo>, BrowserError> {
        let alias = alias.trim();
        if alias.is_empty() {
            return Err(BrowserError::InvalidSpecifier {
                reason: "empty browser alias".to_string(),
            });
        }

        if alias == ALL_BROWSERS_ALIAS {
            return Ok(self
                .local_browsers()
                .iter()
                .map(|name| descriptor(alias, LOCAL_PROVIDER, name))
                .collect());
        }

        if let Some((prefix, rest)) = alias.split_once(':') {
            if prefix == PATH_PROVIDER {
                return Ok(vec![descriptor(alias, PATH_PROVIDER, rest)]);
            }
            if prefix != LOCAL_PROVIDER
                && let Some(browsers) = self.providers.get(prefix)
            {
                let name = rest.trim();
                let base = base_name(name);
                if !browsers.is_empty() && !browsers.iter().any(|b| b == base) {
                    return Err(BrowserError::UnknownBrowser {
                        alias: alias.to_string(),
                    });
                }
                return Ok(vec![descriptor(alias, prefix, name)]);
            }
        }

        let name = alias
            .strip_prefix(LOCAL_PROVIDER)
            .and_then(|rest| rest.strip_prefix(':'))
            .unwrap_or(alias);
        let base = base_name(name);
        if self.local_browsers().iter().any(|b| b == base) {
            return Ok(vec![descriptor(alias, LOCAL_PROVIDER, name)]);
        }

        match alias.split_once(':') {
            Some((prefix, _)) if !self.is_known_prefix(prefix) => {
                Err(BrowserError::UnknownProvider {
                    provider: prefix.to_string(),
                    alias: alias.to_string(),
                })
            }
            _ => Err(BrowserError::UnknownBrowser {
                alias: alias.to_string(),
            }),
        }
    }

    fn is_known_prefix(&self, prefix: &str) -> bool {
        self.providers.contains_key(prefix) || self.local_browsers().iter().any(|b| b == prefix)
    }

    fn resolve_path_object(&self, spec: &Value) -> Result<Vec<BrowserInfo>, BrowserError> {
        let path = spec
            .get("path")
            .and_then(Value::as_str)
            .filter(|path| !path.is_empty())
            .ok_or_else(|| BrowserError::InvalidSpecifier {
                reason: format!("{spec} has no 'path'"),
            })?;
        let browser_name = match spec.get("cmd").and_then(Value::as_str) {
            Some(cmd) if !cmd.is_empty() => format!("{path} {cmd}"),
            _ => path.to_string(),
        };
        Ok(vec![descriptor(
            &format!("{PATH_PROVIDER}:{browser_name}"),
            PATH_PROVIDER,
            &browser_name,
        )])
    }
}

#[async_trait]
impl BrowserInfoResolver for ProviderBrowserResolver {
    async fn resolve(&self, spec: BrowserSpec) -> Result<Vec<BrowserInfo>, BrowserError> {
        match spec {
            BrowserSpec::Resolved(info) => Ok(vec![info]),
            BrowserSpec::Connection(connection) => Ok(vec![BrowserInfo {
                alias: format!("connection:{}", connection.id),
                provider_name: "connection".to_string(),
                browser_name: connection.user_agent.clone(),
                connection: Some(connection),
            }]),
            BrowserSpec::Raw(Value::String(alias)) => self.resolve_alias(&alias),
            BrowserSpec::Raw(value @ Value::Object(_)) => self.resolve_path_object(&value),
            BrowserSpec::Raw(other) => Err(BrowserError::InvalidSpecifier {
                reason: format!("expected a string or an object, found {other}"),
            }),
        }
    }
}

fn descriptor(alias: &str, provider: &str, browser_name: &str) -> BrowserInfo {
    BrowserInfo {
        alias: alias.to_string(),
        provider_name: provider.to_string(),
        browser_name: browser_name.to_string(),
        connection: None,
    }
}

/// Browser name without provider flags (`chrome:headless --no-sandbox` ->
/// `chrome`).
fn base_name(name: &str) -> &str {
    let name = name.split_whitespace().next().unwrap_or(name);
    name.split(':').next().unwrap_or(name)
}

/// Specifiers held by a `browsers` option value. Unset yields nothing.
///
/// # Errors
///
/// Returns `BrowserError::InvalidSpecifier` for values that cannot hold
/// browsers (filters, SSL options).
pub fn browser_specs(value: Option<&OptionValue>) -> Result<Vec<BrowserSpec>, BrowserError> {
    match value {
        None => Ok(Vec::new()),
        Some(OptionValue::Json(raw)) => Ok(cast_array(raw.clone())
            .into_iter()
            .map(BrowserSpec::Raw)
            .collect()),
        Some(OptionValue::Browsers(specs)) => Ok(specs.clone()),
        Some(other) => Err(BrowserError::InvalidSpecifier {
            reason: format!("cannot read browsers from {}", other.display()),
        }),
    }
}

/// Resolve every specifier concurrently and flatten the results.
///
/// All requests are issued before any is awaited. The output keeps input
/// order, each specifier's expansion at its position. The first failure (in
/// input order) aborts the outstanding requests and is returned unchanged.
///
/// # Errors
///
/// Returns the resolver's `BrowserError`, or `TestrcError::Task` if a
/// resolution task panicked.
pub async fn resolve_browsers(
    resolver: Arc<dyn BrowserInfoResolver>,
    specs: Vec<BrowserSpec>,
) -> Result<Vec<BrowserInfo>, TestrcError> {
    let handles: Vec<_> = specs
        .into_iter()
        .map(|spec| {
            let resolver = Arc::clone(&resolver);
            tokio::spawn(async move { resolver.resolve(spec).await })
        })
        .collect();

    let mut resolved = Vec::with_capacity(handles.len());
    let mut pending = handles.into_iter();
    while let Some(handle) = pending.next() {
        let outcome = match handle.await {
            Ok(result) => result.map_err(TestrcError::from),
            Err(err) => Err(TestrcError::Task {
                reason: format!("browser resolution task failed: {err}"),
            }),
        };
        match outcome {
            Ok(infos) => resolved.extend(infos),
            Err(err) => {
                for handle in pending {
                    handle.abort();
                }
                return Err(err);
            }
        }
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn resolve(alias: &str) -> Result<Vec<BrowserInfo>, BrowserError> {
        ProviderBrowserResolver::new().resolve(BrowserSpec::from(alias)).await
    }

    #[tokio::test]
    async fn test_local_browser() {
        let infos = resolve("chrome").await.unwrap();
        assert_eq!(infos, vec![descriptor("chrome", LOCAL_PROVIDER, "chrome")]);
    }

    #[tokio::test]
    async fn test_local_browser_with_flags() {
        let infos = resolve("chrome:headless --no-sandbox").await.unwrap();
        assert_eq!(infos[0].provider_name, LOCAL_PROVIDER);
        assert_eq!(infos[0].browser_name, "chrome:headless --no-sandbox");
    }

    #[tokio::test]
    async fn test_all_expands_in_registry_order() {
        let resolver = ProviderBrowserResolver::empty()
            .with_provider(LOCAL_PROVIDER, ["firefox", "chrome"]);
        let infos = resolver.resolve(BrowserSpec::from("all")).await.unwrap();
        let names: Vec<&str> = infos.iter().map(|i| i.browser_name.as_str()).collect();
        assert_eq!(names, vec!["firefox", "chrome"]);
        assert!(infos.iter().all(|i| i.alias == "all"));
    }

    #[tokio::test]
    async fn test_registered_provider() {
        let resolver = ProviderBrowserResolver::new()
            .with_provider("saucelabs", Vec::<String>::new())
            .with_provider("browserstack", ["chrome"]);

        let infos = resolver
            .resolve(BrowserSpec::from("saucelabs:Chrome@52.0:Windows 8.1"))
            .await
            .unwrap();
        assert_eq!(infos[0].provider_name, "saucelabs");
        assert_eq!(infos[0].browser_name, "Chrome@52.0:Windows 8.1");

        let err = resolver
            .resolve(BrowserSpec::from("browserstack:opera"))
            .await
            .unwrap_err();
        assert!(matches!(err, BrowserError::UnknownBrowser { .. }));
    }

    #[tokio::test]
    async fn test_unknown_browser_and_provider() {
        assert_eq!(
            resolve("netscape").await.unwrap_err(),
            BrowserError::UnknownBrowser {
                alias: "netscape".to_string()
            }
        );
        assert!(matches!(
            resolve("cloudy:chrome").await.unwrap_err(),
            BrowserError::UnknownProvider { .. }
        ));
    }

    #[tokio::test]
    async fn test_path_specifiers() {
        let infos = resolve("path:/usr/bin/firefox").await.unwrap();
        assert_eq!(infos[0].provider_name, PATH_PROVIDER);
        assert_eq!(infos[0].browser_name, "/usr/bin/firefox");

        let infos = ProviderBrowserResolver::new()
            .resolve(BrowserSpec::Raw(json!({"path": "/opt/chrome", "cmd": "--headless"})))
            .await
            .unwrap();
        assert_eq!(infos[0].browser_name, "/opt/chrome --headless");

        let err = ProviderBrowserResolver::new()
            .resolve(BrowserSpec::Raw(json!({"cmd": "--headless"})))
            .await
            .unwrap_err();
        assert!(matches!(err, BrowserError::InvalidSpecifier { .. }));
    }

    #[tokio::test]
    async fn test_passthrough() {
        let info = descriptor("firefox", LOCAL_PROVIDER, "firefox");
        let infos = resolve_browsers(
            Arc::new(ProviderBrowserResolver::empty()),
            vec![
                BrowserSpec::Resolved(info.clone()),
                BrowserSpec::Connection(BrowserConnection {
                    id: "abc".to_string(),
                    user_agent: "Chrome 120".to_string(),
                }),
            ],
        )
        .await
        .unwrap();
        assert_eq!(infos[0], info);
        assert_eq!(infos[1].provider_name, "connection");
        assert!(infos[1].connection.is_some());
    }

    #[test]
    fn test_browser_specs_from_option_values() {
        assert!(browser_specs(None).unwrap().is_empty());
        assert_eq!(
            browser_specs(Some(&OptionValue::from("chrome"))).unwrap(),
            vec![BrowserSpec::from("chrome")]
        );
        assert_eq!(
            browser_specs(Some(&OptionValue::from(json!(["chrome", "firefox"]))))
                .unwrap()
                .len(),
            2
        );
    }

    /// Resolver whose answers arrive in reverse order of the requests.
    struct SlowFirst;

    #[async_trait]
    impl BrowserInfoResolver for SlowFirst {
        async fn resolve(&self, spec: BrowserSpec) -> Result<Vec<BrowserInfo>, BrowserError> {
            let alias = spec.label();
            match alias.as_str() {
                "chrome" => {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok(vec![
                        descriptor("chrome", LOCAL_PROVIDER, "chrome"),
                        descriptor("chrome", LOCAL_PROVIDER, "chrome:headless"),
                    ])
                }
                "firefox" => Ok(vec![descriptor("firefox", LOCAL_PROVIDER, "firefox")]),
                _ => Err(BrowserError::UnknownBrowser {
                    alias: alias.clone(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn test_order_follows_input_not_completion() {
        let infos = resolve_browsers(
            Arc::new(SlowFirst),
            vec![BrowserSpec::from("chrome"), BrowserSpec::from("firefox")],
        )
        .await
        .unwrap();

        let names: Vec<&str> = infos.iter().map(|i| i.browser_name.as_str()).collect();
        assert_eq!(names, vec!["chrome", "chrome:headless", "firefox"]);
    }

    #[tokio::test]
    async fn test_single_failure_aborts_everything() {
        let result = resolve_browsers(
            Arc::new(SlowFirst),
            vec![BrowserSpec::from("firefox"), BrowserSpec::from("lynx")],
        )
        .await;

        match result {
            Err(TestrcError::Browser(BrowserError::UnknownBrowser { alias })) => {
                assert_eq!(alias, "lynx");
            }
            other => panic!("expected UnknownBrowser, got {other:?}"),
        }
    }
}
