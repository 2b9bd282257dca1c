//! Chain-root step.

use chainbuild_core::Builder;

/// A step with no work of its own.
///
/// Dispatched against a directory with a config file declaring `next`,
/// it exists purely to start a build tree.
#[derive(Debug, Default)]
pub struct StartStep;

impl Builder for StartStep {
    fn name(&self) -> &'static str {
        "start"
    }
}
