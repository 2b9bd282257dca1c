//! Built-in build steps for chainbuild.
//!
//! Provides the steps every installation ships with:
//! - `start` - no work of its own, roots a chain from a config file
//! - `command` - runs an ordered list of shell commands

pub mod command;
pub mod start;

pub use command::CommandStep;
pub use start::StartStep;

use chainbuild_engine::OrchestratorBuilder;

/// Register the built-in steps on an orchestrator builder.
pub fn register_builtin(builder: OrchestratorBuilder) -> OrchestratorBuilder {
    builder
        .register("start", || Box::new(StartStep))
        .register("command", || Box::new(CommandStep))
}
