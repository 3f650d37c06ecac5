//! Override and deprecation reporting, plus the start options projection.

use serde::Serialize;
use serde_json::Value;

use crate::defaults::DEFAULT_HOSTNAME;
use crate::names::{DEPRECATED_OPTIONS, OptionName};
use crate::normalize::coerce_flag;
use crate::ssl::SslOptions;
use crate::value::OptionValue;
use crate::warnings::WarningLog;

use super::TestConfiguration;

/// Options handed to the proxy when a session starts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartOptions {
    pub hostname: String,
    pub port1: Option<u16>,
    pub port2: Option<u16>,
    pub options: ProxyOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyOptions {
    pub ssl: Option<SslOptions>,
    pub development_mode: bool,
    pub retry_test_pages: bool,
    pub cache: bool,
    pub disable_http2: bool,
}

impl TestConfiguration {
    /// Report the options a runtime merge overrode, then clear the record.
    ///
    /// The record is drained whether or not a log is supplied. Returns the
    /// message, or `None` when nothing was overridden.
    pub fn notify_about_overridden_options(&mut self, log: Option<&mut WarningLog>) -> Option<String> {
        let names = self.overridden.drain();
        if names.is_empty() {
            return None;
        }

        let message = overridden_options_message(&names);
        tracing::debug!(options = ?names, "Reporting overridden options");
        if let Some(log) = log {
            log.add(message.clone());
        }
        Some(message)
    }

    /// Add a warning for every deprecated option that holds a value.
    ///
    /// Does not change the configuration; repeated calls produce the same
    /// messages. Returns the messages for the matched options.
    pub fn notify_about_deprecated_options(&self, log: &mut WarningLog) -> Vec<String> {
        DEPRECATED_OPTIONS
            .iter()
            .filter(|(name, _)| self.options.value(name).is_some())
            .map(|(name, replacement)| {
                let message = deprecated_option_message(name.as_ref(), replacement);
                tracing::debug!(option = %name, "Reporting deprecated option");
                log.add(message.clone());
                message
            })
            .collect()
    }

    /// Projection of the resolved options the proxy needs to start.
    #[must_use]
    pub fn start_options(&self) -> StartOptions {
        let flag = |name: OptionName| coerce_flag(self.options.value(name));

        StartOptions {
            hostname: self
                .options
                .value(OptionName::Hostname)
                .and_then(OptionValue::as_str)
                .filter(|hostname| !hostname.is_empty())
                .unwrap_or(DEFAULT_HOSTNAME)
                .to_string(),
            port1: self.port(OptionName::Port1),
            port2: self.port(OptionName::Port2),
            options: ProxyOptions {
                ssl: self.ssl_options(),
                development_mode: flag(OptionName::DevelopmentMode),
                retry_test_pages: flag(OptionName::RetryTestPages),
                cache: flag(OptionName::Cache),
                disable_http2: flag(OptionName::DisableHttp2),
            },
        }
    }

    fn port(&self, name: OptionName) -> Option<u16> {
        self.options
            .json(name)
            .and_then(Value::as_u64)
            .and_then(|port| u16::try_from(port).ok())
    }

    /// Resolved SSL options, or a runtime-supplied object taken as-is.
    fn ssl_options(&self) -> Option<SslOptions> {
        match self.options.value(OptionName::Ssl)? {
            OptionValue::Ssl(ssl) => Some(ssl.clone()),
            OptionValue::Json(Value::Object(map)) => Some(SslOptions::new(map.clone())),
            _ => None,
        }
    }
}

fn overridden_options_message(names: &[String]) -> String {
    let quoted: Vec<String> = names.iter().map(|name| format!("\"{name}\"")).collect();
    let noun = if names.len() == 1 { "option" } else { "options" };
    format!(
        "The {} {noun} from the configuration file will be ignored.",
        quoted.join(", ")
    )
}

fn deprecated_option_message(name: &str, replacement: &str) -> String {
    format!(
        "The \"{name}\" option is deprecated and will be removed in the next major release. \
         Use the \"{replacement}\" option instead."
    )
}
