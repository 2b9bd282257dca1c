//! Successor declaration parsing.
//!
//! The `next` value is fetched verbatim out of config (never interpolated)
//! and parsed here into typed descriptors.

use crate::{ConfigError, ConfigResult};
use chainbuild_core::{ConfigMap, CopyInstruction, NextStepSpec};
use serde_json::Value;

/// Parse a declared successor list.
pub fn parse_next(value: &Value) -> ConfigResult<Vec<NextStepSpec>> {
    let Value::Array(entries) = value else {
        return Err(ConfigError::InvalidValue {
            field: "next".to_string(),
            message: "expected a list of successor entries".to_string(),
        });
    };

    entries.iter().map(parse_spec).collect()
}

fn parse_spec(value: &Value) -> ConfigResult<NextStepSpec> {
    let Value::Object(map) = value else {
        return Err(ConfigError::InvalidValue {
            field: "next".to_string(),
            message: "each successor entry must be a mapping".to_string(),
        });
    };

    let build = get_string(map, "build")?
        .ok_or_else(|| ConfigError::MissingField("next entry build".to_string()))?;

    Ok(NextStepSpec {
        build,
        path: get_string(map, "path")?,
        build_in: get_string(map, "build_in")?,
        run_when_any: get_string_list(map, "run_when_any")?,
        run_when_all: get_string_list(map, "run_when_all")?,
        run_when_none: get_string_list(map, "run_when_none")?,
        copy: get_copies(map)?,
        config: get_config(map)?,
        tolerate_failure: get_bool(map, "tolerate_failure")?.unwrap_or(false),
    })
}

// Helper functions for extracting values from successor entries

fn get_string(map: &ConfigMap, key: &str) -> ConfigResult<Option<String>> {
    match map.get(key) {
        None => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(_) => Err(ConfigError::InvalidValue {
            field: key.to_string(),
            message: "expected a string".to_string(),
        }),
    }
}

fn get_bool(map: &ConfigMap, key: &str) -> ConfigResult<Option<bool>> {
    match map.get(key) {
        None => Ok(None),
        Some(Value::Bool(flag)) => Ok(Some(*flag)),
        Some(_) => Err(ConfigError::InvalidValue {
            field: key.to_string(),
            message: "expected a boolean".to_string(),
        }),
    }
}

fn get_string_list(map: &ConfigMap, key: &str) -> ConfigResult<Option<Vec<String>>> {
    let Some(value) = map.get(key) else {
        return Ok(None);
    };
    let Value::Array(items) = value else {
        return Err(ConfigError::InvalidValue {
            field: key.to_string(),
            message: "expected a list of strings".to_string(),
        });
    };
    items
        .iter()
        .map(|item| match item {
            Value::String(text) => Ok(text.clone()),
            _ => Err(ConfigError::InvalidValue {
                field: key.to_string(),
                message: "expected a list of strings".to_string(),
            }),
        })
        .collect::<ConfigResult<Vec<String>>>()
        .map(Some)
}

/// Copy entries are an ordered list of `{source: destination}` mappings;
/// a single entry may carry several pairs.
fn get_copies(map: &ConfigMap) -> ConfigResult<Vec<CopyInstruction>> {
    let Some(value) = map.get("copy") else {
        return Ok(Vec::new());
    };
    let Value::Array(entries) = value else {
        return Err(ConfigError::InvalidValue {
            field: "copy".to_string(),
            message: "expected a list of source-to-destination mappings".to_string(),
        });
    };

    let mut copies = Vec::new();
    for entry in entries {
        let Value::Object(pairs) = entry else {
            return Err(ConfigError::InvalidValue {
                field: "copy".to_string(),
                message: "each copy entry must be a mapping".to_string(),
            });
        };
        for (source, destination) in pairs {
            let Value::String(destination) = destination else {
                return Err(ConfigError::InvalidValue {
                    field: "copy".to_string(),
                    message: format!("destination for {source:?} must be a string"),
                });
            };
            copies.push(CopyInstruction {
                source: source.clone(),
                destination: destination.clone(),
            });
        }
    }
    Ok(copies)
}

fn get_config(map: &ConfigMap) -> ConfigResult<Option<ConfigMap>> {
    match map.get("config") {
        None => Ok(None),
        Some(Value::Object(overrides)) => Ok(Some(overrides.clone())),
        Some(_) => Err(ConfigError::InvalidValue {
            field: "config".to_string(),
            message: "expected a mapping".to_string(),
        }),
    }
}
