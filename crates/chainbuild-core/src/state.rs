//! Per-step state record.

use crate::{ConfigKeyMap, EventSet, NextStepSpec, StateField, StepPaths};

/// A flat key/value configuration mapping. Absence of configuration is
/// legal and represented as an empty mapping.
pub type ConfigMap = serde_json::Map<String, serde_json::Value>;

/// Everything resolved for one dispatched step.
///
/// Created per dispatch, populated once during configuration before any
/// lifecycle hook runs, and mutated only by that step's own hooks.
#[derive(Debug)]
pub struct StepState {
    /// Identifier the dispatch named, e.g. `package`.
    pub step_name: String,
    pub project_type: Option<String>,
    pub project_name: Option<String>,
    pub paths: StepPaths,
    /// Key-to-field table, fixed at construction.
    pub key_map: ConfigKeyMap,
    /// Event tags for this chain, passed through unchanged.
    pub events: EventSet,
    pub clear_build_path: bool,
    /// Explicit per-dispatch arguments, the strongest config source.
    pub args: ConfigMap,
    /// Local configuration; empty when nothing was discovered.
    pub config: ConfigMap,
    /// Declared successor list; absent when the step ends its chain.
    pub next: Option<Vec<NextStepSpec>>,
    /// Explicit success flag a concrete `build` hook may set.
    pub build_succeeded: Option<bool>,
}

impl StepState {
    pub fn new(step_name: impl Into<String>, events: EventSet) -> Self {
        Self {
            step_name: step_name.into(),
            project_type: None,
            project_name: None,
            paths: StepPaths::default(),
            key_map: ConfigKeyMap::standard(),
            events,
            clear_build_path: false,
            args: ConfigMap::new(),
            config: ConfigMap::new(),
            next: None,
            build_succeeded: None,
        }
    }

    /// Read the state field a config key maps to.
    pub fn field(&self, field: StateField) -> Option<&str> {
        match field {
            StateField::ProjectName => self.project_name.as_deref(),
            StateField::ProjectType => self.project_type.as_deref(),
        }
    }

    /// Write the state field a config key maps to.
    pub fn set_field(&mut self, field: StateField, value: String) {
        match field {
            StateField::ProjectName => self.project_name = Some(value),
            StateField::ProjectType => self.project_type = Some(value),
        }
    }
}
