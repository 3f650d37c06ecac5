//! Option store with provenance tracking.
//!
//! [`OptionSet`] maps option names to a value plus the [`ConfigSource`] that
//! set it. Merging a bag of values at a higher source reports which
//! explicitly configured options were overridden; [`OverrideRecord`]
//! accumulates those names until they are drained.

use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

use testrc_utils::error::ConfigError;
use testrc_utils::types::ConfigSource;

use crate::value::OptionValue;

/// A single option: its value and where the value came from.
#[derive(Debug, Clone)]
pub struct ConfigValue {
    pub value: OptionValue,
    pub source: ConfigSource,
    /// Set when the value was filled in rather than configured. A filled
    /// value is never reported as overridden.
    pub filled: bool,
}

impl ConfigValue {
    #[must_use]
    pub fn new(value: impl Into<OptionValue>, source: ConfigSource) -> Self {
        Self {
            value: value.into(),
            source,
            filled: false,
        }
    }
}

/// Ordered bag of raw option values, as loaded from a file or supplied by a
/// caller. Inserting an existing name replaces its value in place.
#[derive(Debug, Clone, Default)]
pub struct OptionBag {
    entries: Vec<(String, OptionValue)>,
}

impl OptionBag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl AsRef<str>, value: impl Into<OptionValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<OptionValue>) {
        let name = name.as_ref();
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    #[must_use]
    pub fn get(&self, name: impl AsRef<str>) -> Option<&OptionValue> {
        let name = name.as_ref();
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Build a bag from a JSON document whose top level must be an object.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidFile` when `value` is not an object.
    pub fn from_json(origin: &str, value: Value) -> Result<Self, ConfigError> {
        match value {
            Value::Object(map) => Ok(Self::from(map)),
            Value::Null => Ok(Self::new()),
            other => Err(ConfigError::InvalidFile {
                path: origin.to_string(),
                reason: format!("expected an object of options, found {}", json_kind(&other)),
            }),
        }
    }
}

impl From<Map<String, Value>> for OptionBag {
    fn from(map: Map<String, Value>) -> Self {
        map.into_iter()
            .map(|(name, value)| (name, OptionValue::Json(value)))
            .collect()
    }
}

impl FromIterator<(String, OptionValue)> for OptionBag {
    fn from_iter<I: IntoIterator<Item = (String, OptionValue)>>(iter: I) -> Self {
        let mut bag = Self::new();
        for (name, value) in iter {
            bag.insert(name, value);
        }
        bag
    }
}

impl IntoIterator for OptionBag {
    type Item = (String, OptionValue);
    type IntoIter = std::vec::IntoIter<(String, OptionValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Mapping from option name to value and provenance.
///
/// Absence of a key means the option was never set. Keys need not come from
/// [`crate::OptionName`]; unknown names are stored as-is.
#[derive(Debug, Clone, Default)]
pub struct OptionSet {
    options: HashMap<String, ConfigValue>,
}

impl OptionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate a fresh set from a bag, attributing every value to `source`.
    #[must_use]
    pub fn from_bag(bag: OptionBag, source: ConfigSource) -> Self {
        let options = bag
            .into_iter()
            .map(|(name, value)| (name, ConfigValue::new(value, source)))
            .collect();
        Self { options }
    }

    #[must_use]
    pub fn get(&self, name: impl AsRef<str>) -> Option<&ConfigValue> {
        self.options.get(name.as_ref())
    }

    /// The option's value, if it is present and defined.
    #[must_use]
    pub fn value(&self, name: impl AsRef<str>) -> Option<&OptionValue> {
        self.get(name)
            .map(|option| &option.value)
            .filter(|value| value.is_defined())
    }

    /// The option's value as raw JSON, if it is present, defined, and not yet
    /// normalized into a typed shape.
    #[must_use]
    pub fn json(&self, name: impl AsRef<str>) -> Option<&Value> {
        self.value(name).and_then(OptionValue::as_json)
    }

    #[must_use]
    pub fn source(&self, name: impl AsRef<str>) -> Option<ConfigSource> {
        self.get(name).map(|option| option.source)
    }

    #[must_use]
    pub fn contains(&self, name: impl AsRef<str>) -> bool {
        self.options.contains_key(name.as_ref())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.options.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Set a value with the given source, replacing any previous entry.
    pub fn set(
        &mut self,
        name: impl AsRef<str>,
        value: impl Into<OptionValue>,
        source: ConfigSource,
    ) {
        self.insert(name, ConfigValue::new(value, source));
    }

    /// Set a filled-in value with the given source, replacing any previous
    /// entry. A later merge does not count it as an override.
    pub fn fill(
        &mut self,
        name: impl AsRef<str>,
        value: impl Into<OptionValue>,
        source: ConfigSource,
    ) {
        let mut option = ConfigValue::new(value, source);
        option.filled = true;
        self.insert(name, option);
    }

    /// Store a complete entry, replacing any previous one.
    pub fn insert(&mut self, name: impl AsRef<str>, option: ConfigValue) {
        self.options.insert(name.as_ref().to_string(), option);
    }

    /// Replace the value of an existing option, keeping its source and
    /// whether it was filled.
    ///
    /// Returns `false` (and does nothing) if the option is absent.
    pub fn replace_value(&mut self, name: impl AsRef<str>, value: impl Into<OptionValue>) -> bool {
        match self.options.get_mut(name.as_ref()) {
            Some(option) => {
                option.value = value.into();
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, name: impl AsRef<str>) -> Option<ConfigValue> {
        self.options.remove(name.as_ref())
    }

    /// Guarantee that `name` holds a defined value.
    ///
    /// If the option is absent or undefined it is filled with `default()` at
    /// the given source; otherwise the set is returned untouched. Returns the
    /// resulting set together with a copy of the option.
    #[must_use]
    pub fn ensure(
        mut self,
        name: impl AsRef<str>,
        default: impl FnOnce() -> OptionValue,
        source: ConfigSource,
    ) -> (Self, ConfigValue) {
        let name = name.as_ref();
        if self.value(name).is_none() {
            self.fill(name, default(), source);
        }
        let option = self.options[name].clone();
        (self, option)
    }

    /// Merge a bag of values at `source`.
    ///
    /// Undefined (`null`) values in the bag are skipped. Returns, in bag
    /// order and without duplicates, the names of options whose previous
    /// value was defined, configured rather than filled, and came from a
    /// lower, non-default source.
    pub fn merge_from(&mut self, bag: OptionBag, source: ConfigSource) -> Vec<String> {
        let mut overridden = Vec::new();

        for (name, value) in bag {
            if !value.is_defined() {
                continue;
            }

            let overrides_explicit_value = self.options.get(&name).is_some_and(|previous| {
                previous.source < source
                    && previous.source != ConfigSource::Default
                    && !previous.filled
                    && previous.value.is_defined()
            });
            if overrides_explicit_value && !overridden.contains(&name) {
                overridden.push(name.clone());
            }

            self.insert(name, ConfigValue::new(value, source));
        }

        overridden
    }

    /// All options matching `predicate`, ordered by name.
    pub fn enumerate<F>(&self, predicate: F) -> BTreeMap<&str, &ConfigValue>
    where
        F: Fn(&str, &ConfigValue) -> bool,
    {
        self.options
            .iter()
            .filter(|(name, option)| predicate(name, option))
            .map(|(name, option)| (name.as_str(), option))
            .collect()
    }
}

/// Names of options overridden by a runtime merge, pending a report.
///
/// Each name is held once; [`drain`](Self::drain) hands the names over and
/// empties the record in one step.
#[derive(Debug, Clone, Default)]
pub struct OverrideRecord {
    names: Vec<String>,
}

impl OverrideRecord {
    /// Record a name. Returns `false` if it was already pending.
    pub fn record(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.names.contains(&name) {
            return false;
        }
        self.names.push(name);
        true
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Take every pending name, leaving the record empty.
    #[must_use]
    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.names)
    }
}

impl Extend<String> for OverrideRecord {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        for name in iter {
            self.record(name);
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
