use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

use super::TestConfiguration;

impl TestConfiguration {
    /// Get the defined options as key-value pairs with source attribution,
    /// ordered by name.
    #[must_use]
    pub fn effective_options(&self) -> BTreeMap<String, (String, String)> {
        self.options
            .enumerate(|_, option| option.value.is_defined())
            .into_iter()
            .map(|(name, option)| {
                (
                    name.to_string(),
                    (option.value.display(), option.source.as_str().to_string()),
                )
            })
            .collect()
    }

    /// Defined options as a JSON object of `{value, source}` entries.
    #[must_use]
    pub fn effective_options_json(&self) -> Value {
        let entries: Map<String, Value> = self
            .options
            .enumerate(|_, option| option.value.is_defined())
            .into_iter()
            .map(|(name, option)| {
                (
                    name.to_string(),
                    json!({ "value": option.value.to_json(), "source": option.source }),
                )
            })
            .collect();
        Value::Object(entries)
    }
}
