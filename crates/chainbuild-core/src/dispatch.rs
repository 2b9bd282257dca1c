//! Dispatch contract between steps and the orchestrator.

use std::path::PathBuf;

use crate::{ConfigMap, EventSet, Result, StepState};

/// A linked chain of step states on the synchronous call stack.
///
/// The parent link is the precursor back-reference: a configuration
/// fallback only, never control flow.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub state: &'a StepState,
    pub parent: Option<&'a Scope<'a>>,
}

/// Request to run one build step.
#[derive(Debug)]
pub struct DispatchRequest {
    /// Step identifier to instantiate.
    pub build: String,
    /// Root path for the step; absent dispatches it headless.
    pub path: Option<PathBuf>,
    /// Build folder name under the root.
    pub build_in: String,
    /// Event tags, passed through the chain unchanged.
    pub events: EventSet,
    /// Explicit per-dispatch argument overrides.
    pub args: ConfigMap,
}

/// The orchestrator side of the step/orchestrator contract.
///
/// A dispatch call does not return until the step and all of its
/// dispatched successors have completed.
pub trait Dispatcher {
    fn dispatch(&self, request: DispatchRequest, precursor: Option<&Scope<'_>>) -> Result<bool>;
}
