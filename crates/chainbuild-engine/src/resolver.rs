//! Multi-source configuration lookup with caller-specified precedence.

use chainbuild_config::Interpolator;
use chainbuild_core::{Scope, StepState};
use serde_json::Value;
use tracing::debug;

/// A configuration source consulted by [`Resolver::fetch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicit per-dispatch arguments.
    Args,
    /// Fields already resolved on the step state, via its key table.
    State,
    /// The step's local config mapping.
    Local,
    /// The precursor chain, with orchestrator and environment excluded.
    Precursor,
    /// Orchestrator-level arguments and config.
    Orchestrator,
    /// The injected environment snapshot.
    Env,
}

/// Default source order for scalar settings.
pub const DEFAULT_ORDER: [ConfigSource; 6] = [
    ConfigSource::Args,
    ConfigSource::State,
    ConfigSource::Local,
    ConfigSource::Precursor,
    ConfigSource::Orchestrator,
    ConfigSource::Env,
];

/// Orchestrator-level values the resolver may consult.
#[derive(Debug, Clone, Copy)]
pub struct OrchestratorSources<'a> {
    pub args: &'a chainbuild_core::ConfigMap,
    pub config: &'a chainbuild_core::ConfigMap,
    pub env: &'a chainbuild_core::ConfigMap,
}

/// Value lookup over one step's reachable sources.
pub struct Resolver<'a> {
    state: &'a StepState,
    precursor: Option<&'a Scope<'a>>,
    orch: OrchestratorSources<'a>,
}

impl<'a> Resolver<'a> {
    pub fn new(
        state: &'a StepState,
        precursor: Option<&'a Scope<'a>>,
        orch: OrchestratorSources<'a>,
    ) -> Self {
        Self {
            state,
            precursor,
            orch,
        }
    }

    /// Look `key` up in each source in order; the first hit wins, and
    /// `default` is returned when no source yields a value (not an error).
    ///
    /// String results are interpolated; use [`Resolver::fetch_raw`] for
    /// values that must be copied verbatim.
    pub fn fetch(
        &self,
        key: &str,
        default: Value,
        order: &[ConfigSource],
        exclude: &[ConfigSource],
    ) -> Value {
        let raw = self.fetch_raw(key, default, order, exclude);
        self.interpolator().interpolate_value(&raw)
    }

    /// [`Resolver::fetch`] without expression interpolation.
    pub fn fetch_raw(
        &self,
        key: &str,
        default: Value,
        order: &[ConfigSource],
        exclude: &[ConfigSource],
    ) -> Value {
        for source in order {
            if exclude.contains(source) {
                continue;
            }
            if let Some(value) = self.lookup(*source, key) {
                debug!(key, source = ?source, "resolved config value");
                return value;
            }
        }
        default
    }

    fn lookup(&self, source: ConfigSource, key: &str) -> Option<Value> {
        match source {
            ConfigSource::Args => self.state.args.get(key).cloned(),
            ConfigSource::State => self.lookup_state(self.state, key),
            ConfigSource::Local => self.state.config.get(key).cloned(),
            ConfigSource::Precursor => self.lookup_precursor(key),
            ConfigSource::Orchestrator => self
                .orch
                .args
                .get(key)
                .or_else(|| self.orch.config.get(key))
                .cloned(),
            ConfigSource::Env => self.orch.env.get(key).cloned(),
        }
    }

    fn lookup_state(&self, state: &StepState, key: &str) -> Option<Value> {
        let field = state.key_map.field_for(key)?;
        state
            .field(field)
            .map(|value| Value::String(value.to_string()))
    }

    /// Walk the precursor chain applying the same precedence over each
    /// ancestor's own layers. Orchestrator and environment are consulted
    /// exactly once, by the original caller, so they are excluded here.
    fn lookup_precursor(&self, key: &str) -> Option<Value> {
        let mut scope = self.precursor;
        while let Some(current) = scope {
            let state = current.state;
            if let Some(value) = state.args.get(key) {
                return Some(value.clone());
            }
            if let Some(value) = self.lookup_state(state, key) {
                return Some(value);
            }
            if let Some(value) = state.config.get(key) {
                return Some(value.clone());
            }
            scope = current.parent;
        }
        None
    }

    fn interpolator(&self) -> Interpolator {
        let mut interpolator = Interpolator::new();
        for (key, value) in self.orch.env {
            if let Value::String(text) = value {
                interpolator.set_env(key.as_str(), text.as_str());
            }
        }
        for (key, field) in self.state.key_map.entries() {
            if let Some(value) = self.state.field(field) {
                interpolator.set(key, value);
            }
        }
        interpolator
    }
}
