//! The build-step contract implemented by concrete variants.

use crate::{Result, StepState};

/// Lifecycle contract for one unit of orchestrated work.
///
/// `build` is the only meaningful override point; its default is a no-op
/// so a step can exist purely to start a chain. The orchestrator holds
/// steps as trait objects and drives the hook sequence
/// `pre_build -> build -> post_build -> did_build_succeed`.
pub trait Builder {
    /// Name of this builder.
    fn name(&self) -> &'static str;

    /// Project types this builder can handle. Empty means no restriction.
    fn supported_project_types(&self) -> &[&str] {
        &[]
    }

    /// Hook for any pre-build configuration.
    fn pre_build(&mut self, state: &mut StepState) -> Result<()> {
        let _ = state;
        Ok(())
    }

    /// Perform the project-specific work.
    fn build(&mut self, state: &mut StepState) -> Result<()> {
        let _ = state;
        Ok(())
    }

    /// Hook for any post-build work.
    fn post_build(&mut self, state: &mut StepState) -> Result<()> {
        let _ = state;
        Ok(())
    }

    /// Whether the step succeeded; consulted before successors run.
    fn did_build_succeed(&self, state: &StepState) -> bool {
        state.build_succeeded.unwrap_or(true)
    }
}
