//! Step instantiation and the top-level dispatch loop.

use std::collections::HashMap;
use std::path::PathBuf;

use chainbuild_core::{
    Builder, ConfigMap, DispatchRequest, Dispatcher, Error, EventSet, Result, Scope,
};
use serde_json::Value;
use tracing::{error, info};

use crate::resolver::OrchestratorSources;
use crate::{lifecycle, planner};

/// Factory producing a fresh step instance per dispatch.
pub type BuilderFactory = Box<dyn Fn() -> Box<dyn Builder> + Send + Sync>;

/// Owns the step registry and drives chains of build steps.
///
/// A dispatch is fully synchronous: it returns only after the step and
/// every successor it triggered have completed. The orchestrator must not
/// be asked to run two chains against the same root concurrently;
/// directory creation and deletion are shared resources.
pub struct Orchestrator {
    registry: HashMap<String, BuilderFactory>,
    root_path: Option<PathBuf>,
    args: ConfigMap,
    config: ConfigMap,
    env: ConfigMap,
}

impl Orchestrator {
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    pub(crate) fn sources(&self) -> OrchestratorSources<'_> {
        OrchestratorSources {
            args: &self.args,
            config: &self.config,
            env: &self.env,
        }
    }

    fn instantiate(&self, name: &str) -> Result<Box<dyn Builder>> {
        self.registry
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| Error::Configuration(format!("no build step registered for {name:?}")))
    }

    /// Run a chain from the top: dispatch `build` against the configured
    /// root path with no precursor.
    pub fn run(&self, build: &str, build_in: &str, events: EventSet) -> Result<bool> {
        let request = DispatchRequest {
            build: build.to_string(),
            path: self.root_path.clone(),
            build_in: build_in.to_string(),
            events,
            args: self.args.clone(),
        };
        self.dispatch(request, None)
    }
}

impl Dispatcher for Orchestrator {
    fn dispatch(&self, request: DispatchRequest, precursor: Option<&Scope<'_>>) -> Result<bool> {
        info!(step = %request.build, path = ?request.path, "dispatching build step");

        let mut builder = self.instantiate(&request.build)?;
        let mut state = lifecycle::configure(request, precursor, self.sources())?;
        let succeeded = lifecycle::run(builder.as_mut(), &mut state)?;
        if !succeeded {
            error!(step = %state.step_name, "build step reported failure");
            return Ok(false);
        }

        let scope = Scope {
            state: &state,
            parent: precursor,
        };
        match planner::call_next(&scope, self.root_path.as_deref(), self)? {
            Some(chain_result) => Ok(chain_result),
            None => Ok(true),
        }
    }
}

/// Builder for [`Orchestrator`].
pub struct OrchestratorBuilder {
    registry: HashMap<String, BuilderFactory>,
    root_path: Option<PathBuf>,
    args: ConfigMap,
    config: ConfigMap,
    env: Option<ConfigMap>,
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            registry: HashMap::new(),
            root_path: None,
            args: ConfigMap::new(),
            config: ConfigMap::new(),
            env: None,
        }
    }

    /// Top-level root path. Omitting it runs every chain headless.
    pub fn with_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root_path = Some(path.into());
        self
    }

    /// Add an explicit argument, passed to the first step of each chain.
    pub fn with_arg(mut self, key: impl Into<String>, value: Value) -> Self {
        self.args.insert(key.into(), value);
        self
    }

    /// Orchestrator-level config, inherited by precursor-less steps that
    /// discover no config file of their own.
    pub fn with_config(mut self, config: ConfigMap) -> Self {
        self.config = config;
        self
    }

    /// Inject an environment snapshot instead of capturing the process
    /// environment at build time.
    pub fn with_env(mut self, env: ConfigMap) -> Self {
        self.env = Some(env);
        self
    }

    /// Register a step factory under `name`.
    pub fn register(
        mut self,
        name: impl Into<String>,
        factory: impl Fn() -> Box<dyn Builder> + Send + Sync + 'static,
    ) -> Self {
        self.registry.insert(name.into(), Box::new(factory));
        self
    }

    pub fn build(self) -> Orchestrator {
        let env = self.env.unwrap_or_else(|| {
            std::env::vars()
                .map(|(key, value)| (key, Value::String(value)))
                .collect()
        });
        Orchestrator {
            registry: self.registry,
            root_path: self.root_path,
            args: self.args,
            config: self.config,
            env,
        }
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainbuild_core::StepState;
    use std::fs;
    use std::path::Path;

    struct NoopStep;

    impl Builder for NoopStep {
        fn name(&self) -> &'static str {
            "noop"
        }
    }

    /// Writes a marker file into its build directory.
    struct TouchStep;

    impl Builder for TouchStep {
        fn name(&self) -> &'static str {
            "touch"
        }

        fn build(&mut self, state: &mut StepState) -> Result<()> {
            if let Some(build_path) = &state.paths.build {
                fs::write(build_path.join("touched.txt"), "done")?;
            }
            Ok(())
        }
    }

    /// Writes its resolved project name into its build directory.
    struct RecordStep;

    impl Builder for RecordStep {
        fn name(&self) -> &'static str {
            "record"
        }

        fn build(&mut self, state: &mut StepState) -> Result<()> {
            let name = state.project_name.clone().unwrap_or_default();
            if let Some(build_path) = &state.paths.build {
                fs::write(build_path.join("name.txt"), name)?;
            }
            Ok(())
        }
    }

    fn orchestrator_for(root: &Path) -> Orchestrator {
        Orchestrator::builder()
            .with_root(root.to_path_buf())
            .with_env(ConfigMap::new())
            .register("noop", || Box::new(NoopStep))
            .register("touch", || Box::new(TouchStep))
            .register("record", || Box::new(RecordStep))
            .build()
    }

    #[test]
    fn test_unknown_step_is_a_configuration_error() {
        let root = tempfile::tempdir().unwrap();
        let orchestrator = orchestrator_for(root.path());

        let err = orchestrator
            .run("missing", "build", EventSet::default())
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_chain_dispatches_gated_successor() {
        let root = tempfile::tempdir().unwrap();
        fs::write(
            root.path().join("build.json"),
            r#"{"next": [{"build": "touch", "run_when_any": ["publish"]}]}"#,
        )
        .unwrap();
        let orchestrator = orchestrator_for(root.path());

        let ok = orchestrator
            .run("noop", "build", EventSet::new(["publish"]))
            .unwrap();
        assert!(ok);
        assert!(
            root.path()
                .join("build/then_build_touch/touched.txt")
                .is_file()
        );
    }

    #[test]
    fn test_chain_skips_successor_without_event() {
        let root = tempfile::tempdir().unwrap();
        fs::write(
            root.path().join("build.json"),
            r#"{"next": [{"build": "touch", "run_when_any": ["publish"]}]}"#,
        )
        .unwrap();
        let orchestrator = orchestrator_for(root.path());

        let ok = orchestrator
            .run("noop", "build", EventSet::new(["test"]))
            .unwrap();
        assert!(ok);
        assert!(!root.path().join("build/then_build_touch").exists());
    }

    #[test]
    fn test_generated_config_reaches_successor() {
        let root = tempfile::tempdir().unwrap();
        fs::write(
            root.path().join("build.json"),
            r#"{"name": "demo", "type": "lib", "next": [{"build": "record", "config": {"flavor": "release"}}]}"#,
        )
        .unwrap();
        let orchestrator = orchestrator_for(root.path());

        let ok = orchestrator
            .run("noop", "build", EventSet::default())
            .unwrap();
        assert!(ok);

        // The planner injected the key-mapped `name` into the generated
        // config, and the successor resolved it from there.
        let recorded = fs::read_to_string(
            root.path().join("build/then_build_record/name.txt"),
        )
        .unwrap();
        assert_eq!(recorded, "demo");
    }

    #[test]
    fn test_headless_chain_runs_without_filesystem() {
        let orchestrator = Orchestrator::builder()
            .with_env(ConfigMap::new())
            .register("noop", || Box::new(NoopStep))
            .build();

        let ok = orchestrator
            .run("noop", "build", EventSet::default())
            .unwrap();
        assert!(ok);
    }
}
