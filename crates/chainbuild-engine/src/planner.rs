//! Event-gated successor planning and dispatch.

use std::fs;
use std::path::{Path, PathBuf};

use chainbuild_core::{
    ConfigMap, DispatchRequest, Dispatcher, EventSet, NextStepSpec, Result, Scope, StepState,
};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::fsutil;

/// Marker prefix resolving a path against the top-level root instead of
/// the current build path.
pub const ROOT_MARKER: &str = "//";

/// Whether `spec` should run given the events of the current chain.
///
/// Absence of all three gating sets always accepts.
pub fn validate_next(spec: &NextStepSpec, events: &EventSet) -> bool {
    if let Some(prohibited) = &spec.run_when_none {
        if events.intersects(prohibited) {
            info!(next = %spec.build, prohibited = ?prohibited, "skipping next step: prohibitive event present");
            return false;
        }
    }

    if let Some(required_any) = &spec.run_when_any {
        if !events.intersects(required_any) {
            info!(next = %spec.build, required = ?required_any, "skipping next step: no required event present");
            return false;
        }
    }

    if let Some(required_all) = &spec.run_when_all {
        if !events.contains_all(required_all) {
            info!(next = %spec.build, required = ?required_all, "skipping next step: required events missing");
            return false;
        }
    }

    true
}

/// Create the successor's directory tree, run its copy instructions, and
/// write its generated config.
///
/// Returns the successor's root path, or `None` when the current step is
/// headless and no preparation happens.
pub fn prepare_next(
    spec: &NextStepSpec,
    state: &StepState,
    top_root: Option<&Path>,
) -> Result<Option<PathBuf>> {
    let Some(build_path) = &state.paths.build else {
        debug!(next = %spec.build, "headless step, skipping preparation");
        return Ok(None);
    };

    debug!(next = %spec.build, "preparing next step");

    let next_root = resolve_next_root(spec.path.as_deref(), build_path, top_root);
    fs::create_dir_all(next_root.join(spec.build_folder()))?;

    // Copy entries are independent and best-effort: one failure is logged
    // and skipped without aborting the rest.
    let copy_root = top_root.unwrap_or(build_path);
    for instruction in &spec.copy {
        if let Err(err) = fsutil::copy_entry(instruction, copy_root, &next_root) {
            warn!(
                source = %instruction.source,
                destination = %instruction.destination,
                error = %err,
                "copy failed, skipping entry"
            );
        }
    }

    if let Some(overrides) = &spec.config {
        let merged = merge_config(overrides, state);
        let config_path = next_root.join("build.json");
        debug!(path = %config_path.display(), "writing next step config");
        let text = serde_json::to_string_pretty(&merged)
            .map_err(|err| chainbuild_core::Error::Configuration(err.to_string()))?;
        fs::write(&config_path, text)?;
    }

    Ok(Some(next_root))
}

/// Dispatch eligible successors strictly in declaration order.
///
/// Returns `None` when the step declares no successor list — distinct
/// from success or failure. A non-tolerated dispatch failure stops the
/// remaining specs immediately; a tolerated one is recorded and iteration
/// continues, so the final result is the last dispatched spec's.
pub fn call_next(
    scope: &Scope<'_>,
    top_root: Option<&Path>,
    dispatcher: &dyn Dispatcher,
) -> Result<Option<bool>> {
    let state = scope.state;
    let Some(specs) = &state.next else {
        return Ok(None);
    };

    let mut result = true;
    for spec in specs {
        if !validate_next(spec, &state.events) {
            continue;
        }

        let next_root = prepare_next(spec, state, top_root)?;
        let request = DispatchRequest {
            build: spec.build.clone(),
            path: next_root,
            build_in: spec.build_folder(),
            events: state.events.clone(),
            args: ConfigMap::new(),
        };

        result = dispatcher.dispatch(request, Some(scope))?;
        if !result {
            if spec.tolerate_failure {
                warn!(next = %spec.build, "next step failed, tolerated");
            } else {
                error!(next = %spec.build, "next step failed, aborting chain");
                return Ok(Some(false));
            }
        }
    }

    Ok(Some(result))
}

fn resolve_next_root(spec_path: Option<&str>, build_path: &Path, top_root: Option<&Path>) -> PathBuf {
    match spec_path {
        Some(path) => match path.strip_prefix(ROOT_MARKER) {
            Some(relative) => top_root.unwrap_or(build_path).join(relative),
            None => build_path.join(path),
        },
        None => build_path.to_path_buf(),
    }
}

/// The generated successor config: inline overrides first, then the
/// current step's key-mapped values for any key not already set.
fn merge_config(overrides: &ConfigMap, state: &StepState) -> ConfigMap {
    let mut merged = overrides.clone();
    for (key, field) in state.key_map.entries() {
        if merged.contains_key(key) {
            continue;
        }
        if let Some(value) = state.field(field) {
            debug!(key, value, "adding key-mapped value to next step config");
            merged.insert(key.to_string(), Value::String(value.to_string()));
        }
    }
    merged
}
