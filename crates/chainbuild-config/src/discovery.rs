//! Config file discovery and loading.

use crate::{ConfigError, ConfigResult};
use chainbuild_core::ConfigMap;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extensions tried during discovery, in order.
pub const CONFIG_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// Conventional config file stem.
pub const CONFIG_STEM: &str = "build";

/// Locate a step's config file under `root`.
///
/// Step-scoped names (`build.<step>.<ext>`) are tried before the generic
/// fallback (`build.<ext>`). Absence is legal and yields `None`.
pub fn discover(root: &Path, step_name: &str) -> Option<PathBuf> {
    let scoped = CONFIG_EXTENSIONS
        .iter()
        .map(|ext| root.join(format!("{CONFIG_STEM}.{step_name}.{ext}")));
    let generic = CONFIG_EXTENSIONS
        .iter()
        .map(|ext| root.join(format!("{CONFIG_STEM}.{ext}")));

    scoped.chain(generic).find(|candidate| candidate.is_file())
}

/// Load a config file into a flat mapping.
///
/// Tab characters are normalized to spaces before YAML parsing, which
/// forbids literal tabs in indentation. An empty file is an empty mapping.
pub fn load(path: &Path) -> ConfigResult<ConfigMap> {
    let text = fs::read_to_string(path)?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();

    let value: Value = match extension {
        "json" => serde_json::from_str(&text).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?,
        "yaml" | "yml" => {
            serde_yaml::from_str(&text.replace('\t', "  ")).map_err(|err| ConfigError::Parse {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?
        }
        other => return Err(ConfigError::UnsupportedExtension(other.to_string())),
    };

    match value {
        Value::Object(map) => {
            debug!(path = %path.display(), keys = map.len(), "loaded config");
            Ok(map)
        }
        Value::Null => Ok(ConfigMap::new()),
        _ => Err(ConfigError::NotAMapping(path.to_path_buf())),
    }
}

/// Discover and load in one call; `None` when no file exists.
pub fn discover_and_load(root: &Path, step_name: &str) -> ConfigResult<Option<(PathBuf, ConfigMap)>> {
    match discover(root, step_name) {
        Some(path) => {
            let config = load(&path)?;
            Ok(Some((path, config)))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_prefers_step_scoped_name() {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("build.json"), "{}").unwrap();
        fs::write(root.path().join("build.pkg.json"), "{}").unwrap();

        let found = discover(root.path(), "pkg").unwrap();
        assert_eq!(found, root.path().join("build.pkg.json"));

        let found = discover(root.path(), "other").unwrap();
        assert_eq!(found, root.path().join("build.json"));
    }

    #[test]
    fn test_discover_absence_is_none() {
        let root = tempfile::tempdir().unwrap();
        assert!(discover(root.path(), "pkg").is_none());
    }

    #[test]
    fn test_load_json() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("build.json");
        fs::write(&path, r#"{"name": "demo", "type": "lib"}"#).unwrap();

        let config = load(&path).unwrap();
        assert_eq!(config.get("name").unwrap(), "demo");
        assert_eq!(config.get("type").unwrap(), "lib");
    }

    #[test]
    fn test_load_yaml_normalizes_tabs() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("build.yaml");
        fs::write(&path, "name: demo\nnested:\n\tkey: value\n").unwrap();

        let config = load(&path).unwrap();
        assert_eq!(config.get("name").unwrap(), "demo");
        assert!(config.get("nested").unwrap().is_object());
    }

    #[test]
    fn test_load_rejects_non_mapping() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("build.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        assert!(matches!(load(&path), Err(ConfigError::NotAMapping(_))));
    }

    #[test]
    fn test_load_empty_yaml_is_empty_mapping() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("build.yaml");
        fs::write(&path, "").unwrap();

        let config = load(&path).unwrap();
        assert!(config.is_empty());
    }
}
