//! `${...}` interpolation for fetched configuration values.
//!
//! Supports variables like:
//! - `${env.VAR_NAME}` - value from the injected environment snapshot
//! - `${name}` / `${type}` - resolved project identifiers
//! - any other single name - a custom variable set by the caller
//!
//! Unknown variables are preserved verbatim. Structured values fetched for
//! verbatim use (the successor list) bypass interpolation entirely.

use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::LazyLock;

// Regex for matching ${...} variables
static VAR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_]*)?)\}").unwrap()
});

/// Interpolation context for fetched string values.
#[derive(Debug, Clone, Default)]
pub struct Interpolator {
    env: HashMap<String, String>,
    custom: HashMap<String, String>,
}

impl Interpolator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an environment value.
    pub fn set_env(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.env.insert(name.into(), value.into());
    }

    /// Add a custom variable.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.custom.insert(name.into(), value.into());
    }

    /// Resolve a variable name to its value.
    pub fn resolve(&self, var_name: &str) -> Option<String> {
        let parts: Vec<&str> = var_name.split('.').collect();

        match parts.as_slice() {
            ["env", name] => self.env.get(*name).cloned(),
            [name] => self.custom.get(*name).cloned(),
            _ => None,
        }
    }

    /// Interpolate all variables in a string.
    /// Variables are specified as `${var_name}` or `${env.VAR_NAME}`.
    pub fn interpolate(&self, input: &str) -> String {
        VAR_REGEX
            .replace_all(input, |caps: &regex::Captures| {
                let var_name = &caps[1];
                self.resolve(var_name)
                    .unwrap_or_else(|| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    /// Interpolate a fetched value: strings are rewritten, everything else
    /// passes through untouched.
    pub fn interpolate_value(&self, value: &Value) -> Value {
        match value {
            Value::String(text) => Value::String(self.interpolate(text)),
            other => other.clone(),
        }
    }
}
