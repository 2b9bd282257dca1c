//! Shell-command step.

use chainbuild_core::{Builder, Error, Result, StepState};
use serde_json::Value;
use std::process::Command;
use tracing::{info, warn};

/// Runs the ordered command list from the `run` config key inside the
/// build directory.
///
/// The first failing command stops the list and marks the step failed;
/// later commands do not run.
#[derive(Debug, Default)]
pub struct CommandStep;

impl CommandStep {
    fn commands(state: &StepState) -> Result<Vec<String>> {
        let value = state
            .args
            .get("run")
            .or_else(|| state.config.get("run"))
            .ok_or_else(|| Error::Build("command step requires a 'run' list".to_string()))?;

        let Value::Array(items) = value else {
            return Err(Error::Build("'run' must be a list of commands".to_string()));
        };
        items
            .iter()
            .map(|item| match item {
                Value::String(command) => Ok(command.clone()),
                _ => Err(Error::Build("'run' must be a list of commands".to_string())),
            })
            .collect()
    }
}

impl Builder for CommandStep {
    fn name(&self) -> &'static str {
        "command"
    }

    fn build(&mut self, state: &mut StepState) -> Result<()> {
        for command in Self::commands(state)? {
            info!(command = %command, "running");

            let mut shell = Command::new("/bin/sh");
            shell.arg("-c").arg(&command);
            if let Some(build_path) = &state.paths.build {
                shell.current_dir(build_path);
            }

            let status = shell.status()?;
            if !status.success() {
                warn!(command = %command, code = ?status.code(), "command failed");
                state.build_succeeded = Some(false);
                return Ok(());
            }
        }

        state.build_succeeded = Some(true);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainbuild_core::{EventSet, StepPaths};
    use serde_json::json;
    use std::fs;

    fn state_with_commands(root: &std::path::Path, commands: Value) -> StepState {
        let mut state = StepState::new("command", EventSet::default());
        state.paths = StepPaths::populate(Some(root), "build").unwrap();
        state.config.insert("run".to_string(), commands);
        state
    }

    #[test]
    fn test_commands_run_in_build_dir() {
        let root = tempfile::tempdir().unwrap();
        let mut state = state_with_commands(root.path(), json!(["echo made > artifact.txt"]));

        let mut step = CommandStep;
        step.build(&mut state).unwrap();

        assert_eq!(state.build_succeeded, Some(true));
        assert!(root.path().join("build/artifact.txt").is_file());
    }

    #[test]
    fn test_failing_command_stops_the_list() {
        let root = tempfile::tempdir().unwrap();
        let mut state = state_with_commands(
            root.path(),
            json!(["false", "echo late > after.txt"]),
        );

        let mut step = CommandStep;
        step.build(&mut state).unwrap();

        assert_eq!(state.build_succeeded, Some(false));
        assert!(!root.path().join("build/after.txt").exists());
        assert!(!step.did_build_succeed(&state));
    }

    #[test]
    fn test_missing_run_list_is_a_build_error() {
        let root = tempfile::tempdir().unwrap();
        let mut state = StepState::new("command", EventSet::default());
        state.paths = StepPaths::populate(Some(root.path()), "build").unwrap();

        let mut step = CommandStep;
        assert!(matches!(step.build(&mut state), Err(Error::Build(_))));
    }
}
