use serde_json::{Value, json};

use crate::browsers::BrowserSpec;
use crate::filter::TestFilter;
use crate::reporters::ReporterSpec;
use crate::ssl::SslOptions;

/// Value held by an option.
///
/// Values arrive as dynamic JSON (from a configuration file or a runtime
/// option bag) and are replaced by typed shapes as they are normalized.
/// A JSON `null` is treated as "undefined": present in the set but carrying
/// no value.
#[derive(Debug, Clone)]
pub enum OptionValue {
    /// Raw or scalar value.
    Json(Value),
    /// Compiled test filter predicate.
    Filter(TestFilter),
    /// Prepared reporter list.
    Reporters(Vec<ReporterSpec>),
    /// Browser specifiers, all `BrowserSpec::Resolved` once resolution ran.
    Browsers(Vec<BrowserSpec>),
    /// Canonical SSL options.
    Ssl(SslOptions),
}

impl OptionValue {
    /// Whether the option carries a value at all.
    #[must_use]
    pub fn is_defined(&self) -> bool {
        !matches!(self, Self::Json(Value::Null))
    }

    /// Truthiness used by flag coercion.
    ///
    /// `null`, `false`, `0`, `NaN` and `""` are falsy; every other value,
    /// including the string `"false"`, is truthy. Typed values are truthy.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Json(value) => is_truthy(value),
            _ => true,
        }
    }

    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.as_json().and_then(Value::as_str)
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        self.as_json().and_then(Value::as_bool)
    }

    /// JSON rendering for status output. Filters have no data form and render
    /// as a marker string.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Json(value) => value.clone(),
            Self::Filter(_) => Value::String("[filter]".to_string()),
            Self::Reporters(reporters) => json!(reporters),
            Self::Browsers(browsers) => {
                Value::Array(browsers.iter().map(BrowserSpec::to_json).collect())
            }
            Self::Ssl(options) => Value::Object(options.as_map().clone()),
        }
    }

    /// Short human-readable rendering for status tables.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Json(Value::String(s)) => s.clone(),
            Self::Json(value) => value.to_string(),
            Self::Filter(_) => "[filter]".to_string(),
            Self::Reporters(reporters) => reporters
                .iter()
                .map(ReporterSpec::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            Self::Browsers(browsers) => browsers
                .iter()
                .map(BrowserSpec::label)
                .collect::<Vec<_>>()
                .join(", "),
            Self::Ssl(options) => {
                let keys: Vec<&str> = options.as_map().keys().map(String::as_str).collect();
                format!("ssl({})", keys.join(","))
            }
        }
    }
}

/// Truthiness of a raw JSON value.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

impl From<Value> for OptionValue {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Json(Value::Bool(value))
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Json(Value::String(value.to_string()))
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Json(Value::String(value))
    }
}

impl From<u64> for OptionValue {
    fn from(value: u64) -> Self {
        Self::Json(Value::from(value))
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::Json(Value::from(value))
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        Self::Json(Value::from(value))
    }
}

impl From<TestFilter> for OptionValue {
    fn from(value: TestFilter) -> Self {
        Self::Filter(value)
    }
}

impl From<SslOptions> for OptionValue {
    fn from(value: SslOptions) -> Self {
        Self::Ssl(value)
    }
}

impl From<Vec<ReporterSpec>> for OptionValue {
    fn from(value: Vec<ReporterSpec>) -> Self {
        Self::Reporters(value)
    }
}

impl From<Vec<BrowserSpec>> for OptionValue {
    fn from(value: Vec<BrowserSpec>) -> Self {
        Self::Browsers(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_falsy_values() {
        for value in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            assert!(!is_truthy(&value), "{value} should be falsy");
        }
    }

    #[test]
    fn test_truthy_values() {
        for value in [
            json!(true),
            json!(1),
            json!(-0.5),
            json!("false"),
            json!("0"),
            json!([]),
            json!({}),
        ] {
            assert!(is_truthy(&value), "{value} should be truthy");
        }
    }

    #[test]
    fn test_null_is_undefined() {
        assert!(!OptionValue::Json(Value::Null).is_defined());
        assert!(OptionValue::from(false).is_defined());
        assert!(OptionValue::from("").is_defined());
    }

    #[test]
    fn test_display_unquotes_strings() {
        assert_eq!(OptionValue::from("localhost").display(), "localhost");
        assert_eq!(OptionValue::from(json!(["a", "b"])).display(), r#"["a","b"]"#);
    }

    proptest! {
        #[test]
        fn prop_nonempty_strings_are_truthy(s in ".+") {
            prop_assert!(is_truthy(&Value::String(s)));
        }

        #[test]
        fn prop_integers_truthy_iff_nonzero(n in any::<i64>()) {
            prop_assert_eq!(is_truthy(&json!(n)), n != 0);
        }
    }
}
