//! Pure value normalizers.
//!
//! Each function takes the current value of one option family and returns
//! its canonical shape. None of them touch an [`crate::OptionSet`]; the
//! resolver reads the current value, calls a normalizer, and writes the
//! result back.

use serde_json::{Map, Value};
use std::path::Path;

use crate::defaults::{
    DEFAULT_SCREENSHOT_THUMBNAILS, TYPESCRIPT_COMPILER, default_compiler_options,
    default_screenshots_path,
};
use crate::value::OptionValue;

const SCREENSHOTS_PATH: &str = "path";
const SCREENSHOTS_THUMBNAILS: &str = "thumbnails";
const CONFIG_PATH: &str = "configPath";

/// Double-negation flag coercion: truthy values become `true`, falsy and
/// missing values become `false`.
#[must_use]
pub fn coerce_flag(value: Option<&OptionValue>) -> bool {
    value.is_some_and(OptionValue::is_truthy)
}

/// Wrap a scalar in a one-element array.
///
/// Arrays, typed lists and undefined values are returned unchanged.
#[must_use]
pub fn ensure_array(value: OptionValue) -> OptionValue {
    match value {
        OptionValue::Json(Value::Array(_)) | OptionValue::Json(Value::Null) => value,
        OptionValue::Json(scalar) => OptionValue::Json(Value::Array(vec![scalar])),
        other => other,
    }
}

/// Elements of a raw JSON value treated as a list: `null` is empty, an array
/// yields its items, and anything else is a single element.
#[must_use]
pub fn cast_array(value: Value) -> Vec<Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        scalar => vec![scalar],
    }
}

/// Fill the screenshots object field by field.
///
/// A missing `path` gets the default directory under `working_dir`, a missing
/// `thumbnails` gets the default flag; fields that are already set are kept.
/// A bare string is taken as the path. Any other shape is replaced by a
/// fully defaulted object.
#[must_use]
pub fn fill_screenshots(existing: Option<&Value>, working_dir: &Path) -> Value {
    let mut screenshots = match existing {
        Some(Value::Object(map)) => map.clone(),
        Some(Value::String(path)) if !path.is_empty() => {
            let mut map = Map::new();
            map.insert(SCREENSHOTS_PATH.to_string(), Value::String(path.clone()));
            map
        }
        _ => Map::new(),
    };

    let has_path = screenshots
        .get(SCREENSHOTS_PATH)
        .is_some_and(crate::value::is_truthy);
    if !has_path {
        let path = default_screenshots_path(working_dir);
        screenshots.insert(
            SCREENSHOTS_PATH.to_string(),
            Value::String(path.to_string_lossy().into_owned()),
        );
    }

    let has_thumbnails = screenshots
        .get(SCREENSHOTS_THUMBNAILS)
        .is_some_and(|value| !value.is_null());
    if !has_thumbnails {
        screenshots.insert(
            SCREENSHOTS_THUMBNAILS.to_string(),
            Value::Bool(DEFAULT_SCREENSHOT_THUMBNAILS),
        );
    }

    Value::Object(screenshots)
}

/// Resolve compiler options and inject the TypeScript config path.
///
/// A non-object (or missing) value is replaced by the catalog default. When
/// `ts_config_path` is given, the `typescript` entry becomes the existing
/// TypeScript options shallow-merged over `{configPath}`, with `configPath`
/// always taken from `ts_config_path`.
#[must_use]
pub fn merge_compiler_options(existing: Option<&Value>, ts_config_path: Option<&str>) -> Value {
    let mut compiler_options = match existing {
        Some(Value::Object(map)) => map.clone(),
        _ => match default_compiler_options() {
            Value::Object(map) => map,
            _ => Map::new(),
        },
    };

    if let Some(config_path) = ts_config_path.filter(|path| !path.is_empty()) {
        let mut typescript = Map::new();
        typescript.insert(
            CONFIG_PATH.to_string(),
            Value::String(config_path.to_string()),
        );
        if let Some(Value::Object(current)) = compiler_options.get(TYPESCRIPT_COMPILER) {
            for (key, value) in current {
                if key != CONFIG_PATH {
                    typescript.insert(key.clone(), value.clone());
                }
            }
        }
        compiler_options.insert(TYPESCRIPT_COMPILER.to_string(), Value::Object(typescript));
    }

    Value::Object(compiler_options)
}
