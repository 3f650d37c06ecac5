//! Reporter option preparation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use testrc_utils::error::ConfigError;

use crate::names::OptionName;

/// A reporter to attach to the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReporterSpec {
    pub name: String,
    /// File the reporter writes to; stdout when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl ReporterSpec {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            output: None,
        }
    }

    #[must_use]
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }
}

impl fmt::Display for ReporterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.output {
            Some(output) => write!(f, "{}={}", self.name, output),
            None => f.write_str(&self.name),
        }
    }
}

/// Turns raw reporter specs into prepared reporters.
pub trait ReporterPreparer: Send + Sync {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for a spec that names no reporter.
    fn prepare(&self, specs: Vec<Value>) -> Result<Vec<ReporterSpec>, ConfigError>;
}

/// Accepts reporter names and `{name, output}` objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultReporterPreparer;

impl ReporterPreparer for DefaultReporterPreparer {
    fn prepare(&self, specs: Vec<Value>) -> Result<Vec<ReporterSpec>, ConfigError> {
        specs.into_iter().map(prepare_one).collect()
    }
}

fn prepare_one(spec: Value) -> Result<ReporterSpec, ConfigError> {
    let invalid = |value: &Value| ConfigError::InvalidValue {
        key: OptionName::Reporter.to_string(),
        value: value.to_string(),
    };

    match spec {
        Value::String(name) if !name.is_empty() => Ok(ReporterSpec::new(name)),
        Value::Object(_) => {
            let reporter: ReporterSpec =
                serde_json::from_value(spec.clone()).map_err(|_| invalid(&spec))?;
            if reporter.name.is_empty() {
                return Err(invalid(&spec));
            }
            Ok(reporter)
        }
        other => Err(invalid(&other)),
    }
}
