use serde_json::Value;

use testrc_utils::error::ConfigError;

use crate::names::OptionName;
use crate::value::OptionValue;

use super::TestConfiguration;

const MIN_SPEED: f64 = 0.01;
const MAX_SPEED: f64 = 1.0;

const NON_NEGATIVE_INTEGER_OPTIONS: &[OptionName] = &[
    OptionName::SelectorTimeout,
    OptionName::AssertionTimeout,
    OptionName::PageLoadTimeout,
    OptionName::AppInitDelay,
];

impl TestConfiguration {
    /// Check value ranges of the numeric options that are set.
    ///
    /// Never called by the pipeline itself; callers run it after
    /// [`prepare`](Self::prepare).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for the first option out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for name in NON_NEGATIVE_INTEGER_OPTIONS {
            if let Some(value) = self.options.value(name)
                && value.as_json().and_then(Value::as_u64).is_none()
            {
                return Err(invalid(*name, value, "must be a non-negative integer"));
            }
        }

        if let Some(value) = self.options.value(OptionName::Concurrency)
            && !value
                .as_json()
                .and_then(Value::as_u64)
                .is_some_and(|concurrency| concurrency > 0)
        {
            return Err(invalid(OptionName::Concurrency, value, "must be a positive integer"));
        }

        if let Some(value) = self.options.value(OptionName::Speed)
            && !value
                .as_json()
                .and_then(Value::as_f64)
                .is_some_and(|speed| (MIN_SPEED..=MAX_SPEED).contains(&speed))
        {
            return Err(invalid(
                OptionName::Speed,
                value,
                "must be a number between 0.01 and 1",
            ));
        }

        Ok(())
    }
}

fn invalid(name: OptionName, value: &OptionValue, requirement: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: name.to_string(),
        value: format!("{} ({requirement})", value.display()),
    }
}
