//! Step lifecycle: configuration, then the hook sequence.

use std::fs;
use std::path::Path;

use chainbuild_core::{
    Builder, DispatchRequest, Error, Result, Scope, StateField, StepPaths, StepState,
};
use serde_json::Value;
use tracing::{debug, info};

use crate::resolver::{ConfigSource, OrchestratorSources, Resolver};

/// Populate a fresh [`StepState`] for a dispatch request.
///
/// Runs before any lifecycle hook: paths, local config, project
/// identifiers, `clear_build_path`, and the successor list are all
/// resolved here and never change afterwards except through the step's
/// own hooks.
pub fn configure(
    request: DispatchRequest,
    precursor: Option<&Scope<'_>>,
    sources: OrchestratorSources<'_>,
) -> Result<StepState> {
    let DispatchRequest {
        build,
        path,
        build_in,
        events,
        args,
    } = request;

    let mut state = StepState::new(build, events);
    state.args = args;
    state.paths = StepPaths::populate(path.as_deref(), &build_in)?;

    let mut discovered = false;
    if let Some(root) = state.paths.root.clone() {
        if let Some((config_path, config)) =
            chainbuild_config::discovery::discover_and_load(&root, &state.step_name)?
        {
            debug!(step = %state.step_name, path = %config_path.display(), "using local config");
            state.config = config;
            discovered = true;
        }
    }
    // Without a local file, a top-of-chain step inherits the orchestrator
    // config. Steps with a precursor reach it through resolution
    // precedence instead; inheriting its mapping verbatim would replay
    // its successor list.
    if !discovered && precursor.is_none() {
        state.config = sources.config.clone();
    }

    let (default_type, default_name) = project_defaults(state.paths.root.as_deref());

    let mut resolved_fields = Vec::new();
    let clear_build_path;
    let next_value;
    {
        let resolver = Resolver::new(&state, precursor, sources);

        // Project identifiers cannot consult the fields being resolved or
        // the precursor; an explicit value, the local config, or the
        // orchestrator wins over the root-derived default.
        let identifier_order = [
            ConfigSource::Args,
            ConfigSource::Local,
            ConfigSource::Orchestrator,
        ];
        for (key, field) in state.key_map.entries() {
            let default = match field {
                StateField::ProjectType => default_type.clone(),
                StateField::ProjectName => default_name.clone(),
            };
            let default = default.map(Value::String).unwrap_or(Value::Null);
            if let Value::String(text) = resolver.fetch(key, default, &identifier_order, &[]) {
                resolved_fields.push((field, text));
            }
        }

        // Must come from an explicit argument or a config value, never
        // from the environment or the orchestrator.
        clear_build_path = resolver.fetch(
            "clear_build_path",
            Value::Bool(false),
            &[ConfigSource::Args, ConfigSource::Local],
            &[],
        );

        // The successor list is copied verbatim, never interpolated.
        next_value = resolver.fetch_raw(
            "next",
            Value::Null,
            &[ConfigSource::Args, ConfigSource::Local],
            &[],
        );
    }

    for (field, value) in resolved_fields {
        state.set_field(field, value);
    }
    state.clear_build_path = value_as_bool(&clear_build_path);
    state.next = match next_value {
        Value::Null => None,
        value => Some(chainbuild_config::parse_next(&value)?),
    };

    Ok(state)
}

/// Run the hook sequence and report success.
///
/// The build path is cleared (when requested) and recreated before
/// `pre_build`; the supported-type gate sits between `pre_build` and
/// `build`. Hook failures propagate uncaught.
pub fn run(builder: &mut dyn Builder, state: &mut StepState) -> Result<bool> {
    if let Some(build_path) = state.paths.build.clone() {
        if state.clear_build_path && build_path.exists() {
            info!(path = %build_path.display(), "clearing build path");
            fs::remove_dir_all(&build_path)?;
        }
        fs::create_dir_all(&build_path)?;
    }

    builder.pre_build(state)?;

    let supported = builder.supported_project_types();
    if !supported.is_empty() {
        let found = state.project_type.clone().unwrap_or_default();
        if !supported.contains(&found.as_str()) {
            return Err(Error::ProjectTypeNotSupported {
                step: state.step_name.clone(),
                found,
                supported: supported.iter().map(ToString::to_string).collect(),
            });
        }
    }

    info!(
        step = %state.step_name,
        project = state.project_name.as_deref().unwrap_or("?"),
        kind = state.project_type.as_deref().unwrap_or("?"),
        "building"
    );

    builder.build(state)?;
    builder.post_build(state)?;

    Ok(builder.did_build_succeed(state))
}

/// Defaults for the project identifiers, derived from the root directory
/// name: the segment after the final `.` is the type, the remainder the
/// name, and a name without a `.` is both.
fn project_defaults(root: Option<&Path>) -> (Option<String>, Option<String>) {
    let Some(name) = root.and_then(Path::file_name).and_then(|n| n.to_str()) else {
        return (None, None);
    };
    match name.rsplit_once('.') {
        Some((rest, last)) if !rest.is_empty() => {
            (Some(last.to_string()), Some(rest.to_string()))
        }
        _ => (Some(name.to_string()), Some(name.to_string())),
    }
}

fn value_as_bool(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::String(text) => text == "true" || text == "1",
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainbuild_core::{ConfigMap, EventSet};
    use serde_json::json;
    use std::path::PathBuf;

    fn empty_sources() -> (ConfigMap, ConfigMap, ConfigMap) {
        (ConfigMap::new(), ConfigMap::new(), ConfigMap::new())
    }

    fn request(path: Option<PathBuf>) -> DispatchRequest {
        DispatchRequest {
            build: "probe".to_string(),
            path,
            build_in: "build".to_string(),
            events: EventSet::default(),
            args: ConfigMap::new(),
        }
    }

    /// Builder that records which hooks ran.
    #[derive(Default)]
    struct Probe {
        supported: Vec<&'static str>,
        pre_build_ran: bool,
        build_ran: bool,
        post_build_ran: bool,
    }

    impl Builder for Probe {
        fn name(&self) -> &'static str {
            "probe"
        }

        fn supported_project_types(&self) -> &[&str] {
            &self.supported
        }

        fn pre_build(&mut self, _state: &mut StepState) -> Result<()> {
            self.pre_build_ran = true;
            Ok(())
        }

        fn build(&mut self, _state: &mut StepState) -> Result<()> {
            self.build_ran = true;
            Ok(())
        }

        fn post_build(&mut self, _state: &mut StepState) -> Result<()> {
            self.post_build_ran = true;
            Ok(())
        }
    }

    #[test]
    fn test_configure_derives_identifiers_from_root_name() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("demo.lib");
        fs::create_dir(&root).unwrap();

        let (args, config, env) = empty_sources();
        let sources = OrchestratorSources {
            args: &args,
            config: &config,
            env: &env,
        };
        let state = configure(request(Some(root)), None, sources).unwrap();

        assert_eq!(state.project_type.as_deref(), Some("lib"));
        assert_eq!(state.project_name.as_deref(), Some("demo"));
    }

    #[test]
    fn test_configure_single_segment_root_name_is_both() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("demo");
        fs::create_dir(&root).unwrap();

        let (args, config, env) = empty_sources();
        let sources = OrchestratorSources {
            args: &args,
            config: &config,
            env: &env,
        };
        let state = configure(request(Some(root)), None, sources).unwrap();

        assert_eq!(state.project_type.as_deref(), Some("demo"));
        assert_eq!(state.project_name.as_deref(), Some("demo"));
    }

    #[test]
    fn test_configure_config_file_wins_over_derived_default() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("demo.exe");
        fs::create_dir(&root).unwrap();
        fs::write(
            root.join("build.json"),
            r#"{"name": "other", "type": "lib"}"#,
        )
        .unwrap();

        let (args, config, env) = empty_sources();
        let sources = OrchestratorSources {
            args: &args,
            config: &config,
            env: &env,
        };
        let state = configure(request(Some(root)), None, sources).unwrap();

        assert_eq!(state.project_type.as_deref(), Some("lib"));
        assert_eq!(state.project_name.as_deref(), Some("other"));
    }

    #[test]
    fn test_clear_build_path_never_comes_from_environment() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("demo");
        fs::create_dir(&root).unwrap();

        let (args, config) = (ConfigMap::new(), ConfigMap::new());
        let mut env = ConfigMap::new();
        env.insert("clear_build_path".to_string(), json!(true));
        let sources = OrchestratorSources {
            args: &args,
            config: &config,
            env: &env,
        };
        let state = configure(request(Some(root)), None, sources).unwrap();

        assert!(!state.clear_build_path);
    }

    #[test]
    fn test_clear_build_path_from_dispatch_args() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("demo");
        fs::create_dir(&root).unwrap();

        let (args, config, env) = empty_sources();
        let sources = OrchestratorSources {
            args: &args,
            config: &config,
            env: &env,
        };
        let mut req = request(Some(root));
        req.args
            .insert("clear_build_path".to_string(), json!(true));
        let state = configure(req, None, sources).unwrap();

        assert!(state.clear_build_path);
    }

    #[test]
    fn test_headless_configure_has_no_identifiers() {
        let (args, config, env) = empty_sources();
        let sources = OrchestratorSources {
            args: &args,
            config: &config,
            env: &env,
        };
        let state = configure(request(None), None, sources).unwrap();

        assert!(state.paths.is_headless());
        assert!(state.project_type.is_none());
        assert!(state.project_name.is_none());
        assert!(state.next.is_none());
    }

    #[test]
    fn test_top_of_chain_inherits_orchestrator_config() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("demo");
        fs::create_dir(&root).unwrap();

        let (args, env) = (ConfigMap::new(), ConfigMap::new());
        let mut config = ConfigMap::new();
        config.insert("flavor".to_string(), json!("release"));
        let sources = OrchestratorSources {
            args: &args,
            config: &config,
            env: &env,
        };
        let state = configure(request(Some(root)), None, sources).unwrap();

        assert_eq!(state.config.get("flavor").unwrap(), "release");
    }

    #[test]
    fn test_run_clears_preexisting_build_path() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("demo");
        fs::create_dir(&root).unwrap();
        let stale = root.join("build").join("stale.txt");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "old artifact").unwrap();

        let (args, config, env) = empty_sources();
        let sources = OrchestratorSources {
            args: &args,
            config: &config,
            env: &env,
        };
        let mut req = request(Some(root.clone()));
        req.args
            .insert("clear_build_path".to_string(), json!(true));
        let mut state = configure(req, None, sources).unwrap();

        struct Touch;
        impl Builder for Touch {
            fn name(&self) -> &'static str {
                "touch"
            }
            fn build(&mut self, state: &mut StepState) -> Result<()> {
                let build_path = state.paths.build.as_ref().unwrap();
                fs::write(build_path.join("fresh.txt"), "new artifact")?;
                Ok(())
            }
        }

        let ok = run(&mut Touch, &mut state).unwrap();
        assert!(ok);

        // Only the step's own output survives.
        let entries: Vec<String> = fs::read_dir(root.join("build"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, ["fresh.txt"]);
    }

    #[test]
    fn test_unsupported_project_type_fails_before_build() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("demo.exe");
        fs::create_dir(&root).unwrap();

        let (args, config, env) = empty_sources();
        let sources = OrchestratorSources {
            args: &args,
            config: &config,
            env: &env,
        };
        let mut state = configure(request(Some(root)), None, sources).unwrap();
        assert_eq!(state.project_type.as_deref(), Some("exe"));

        let mut probe = Probe {
            supported: vec!["lib"],
            ..Probe::default()
        };
        let err = run(&mut probe, &mut state).unwrap_err();

        assert!(matches!(err, Error::ProjectTypeNotSupported { .. }));
        assert!(probe.pre_build_ran);
        assert!(!probe.build_ran);
        assert!(!probe.post_build_ran);
    }

    #[test]
    fn test_run_reports_explicit_failure_flag() {
        let (args, config, env) = empty_sources();
        let sources = OrchestratorSources {
            args: &args,
            config: &config,
            env: &env,
        };
        let mut state = configure(request(None), None, sources).unwrap();

        struct Failing;
        impl Builder for Failing {
            fn name(&self) -> &'static str {
                "failing"
            }
            fn build(&mut self, state: &mut StepState) -> Result<()> {
                state.build_succeeded = Some(false);
                Ok(())
            }
        }

        let ok = run(&mut Failing, &mut state).unwrap();
        assert!(!ok);
    }
}
