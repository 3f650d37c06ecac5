//! Test filter compilation.
//!
//! A configuration file describes a filter as a structured object; the
//! resolver compiles it once into a [`TestFilter`] predicate and discards the
//! structured form.

use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use testrc_utils::error::FilterError;

/// What a filter predicate gets to see about a test.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestMetadata {
    pub test_name: String,
    pub fixture_name: String,
    pub fixture_path: PathBuf,
    pub test_meta: Map<String, Value>,
    pub fixture_meta: Map<String, Value>,
}

type Predicate = dyn Fn(&TestMetadata) -> bool + Send + Sync;

/// Compiled filter predicate.
#[derive(Clone)]
pub struct TestFilter {
    predicate: Arc<Predicate>,
}

impl TestFilter {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&TestMetadata) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
        }
    }

    #[must_use]
    pub fn matches(&self, test: &TestMetadata) -> bool {
        (self.predicate)(test)
    }
}

impl fmt::Debug for TestFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestFilter").finish_non_exhaustive()
    }
}

/// Structured filter as written in a configuration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    pub test: Option<String>,
    pub fixture: Option<String>,
    pub test_grep: Option<String>,
    pub fixture_grep: Option<String>,
    pub test_meta: Option<Map<String, Value>>,
    pub fixture_meta: Option<Map<String, Value>>,
}

impl FilterSpec {
    /// Parse the structured form of the filter option.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::InvalidShape` if `value` is not an object with
    /// the expected field types.
    pub fn from_json(value: Value) -> Result<Self, FilterError> {
        if !value.is_object() {
            return Err(FilterError::InvalidShape {
                reason: format!("expected an object, found {value}"),
            });
        }
        serde_json::from_value(value).map_err(|err| FilterError::InvalidShape {
            reason: err.to_string(),
        })
    }
}

/// Turns a structured filter into a predicate.
pub trait FilterCompiler: Send + Sync {
    /// # Errors
    ///
    /// Returns a `FilterError` when the structured filter cannot be compiled.
    fn compile(&self, spec: &FilterSpec) -> Result<TestFilter, FilterError>;
}

/// Exact-name, regex and metadata matching.
///
/// Every populated field must match for a test to pass the filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFilterCompiler;

impl FilterCompiler for DefaultFilterCompiler {
    fn compile(&self, spec: &FilterSpec) -> Result<TestFilter, FilterError> {
        let test_grep = compile_grep("testGrep", spec.test_grep.as_deref())?;
        let fixture_grep = compile_grep("fixtureGrep", spec.fixture_grep.as_deref())?;
        let test = spec.test.clone();
        let fixture = spec.fixture.clone();
        let test_meta = spec.test_meta.clone();
        let fixture_meta = spec.fixture_meta.clone();

        Ok(TestFilter::new(move |candidate| {
            if test.as_ref().is_some_and(|name| *name != candidate.test_name) {
                return false;
            }
            if test_grep
                .as_ref()
                .is_some_and(|grep| !grep.is_match(&candidate.test_name))
            {
                return false;
            }
            if fixture
                .as_ref()
                .is_some_and(|name| *name != candidate.fixture_name)
            {
                return false;
            }
            if fixture_grep
                .as_ref()
                .is_some_and(|grep| !grep.is_match(&candidate.fixture_name))
            {
                return false;
            }
            if test_meta
                .as_ref()
                .is_some_and(|meta| !meta_matches(meta, &candidate.test_meta))
            {
                return false;
            }
            if fixture_meta
                .as_ref()
                .is_some_and(|meta| !meta_matches(meta, &candidate.fixture_meta))
            {
                return false;
            }
            true
        }))
    }
}

fn compile_grep(field: &str, pattern: Option<&str>) -> Result<Option<Regex>, FilterError> {
    pattern
        .map(|pattern| {
            Regex::new(pattern).map_err(|err| FilterError::InvalidPattern {
                field: field.to_string(),
                pattern: pattern.to_string(),
                reason: err.to_string(),
            })
        })
        .transpose()
}

/// Every expected key must be present with an equal value. Scalars compare by
/// their string form, so `{"priority": 1}` matches `{"priority": "1"}`.
fn meta_matches(expected: &Map<String, Value>, actual: &Map<String, Value>) -> bool {
    expected.iter().all(|(key, want)| {
        actual
            .get(key)
            .is_some_and(|have| have == want || same_scalar_text(have, want))
    })
}

fn same_scalar_text(left: &Value, right: &Value) -> bool {
    matches!((scalar_text(left), scalar_text(right)), (Some(a), Some(b)) if a == b)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
