//! chainbuild CLI tool.

use anyhow::{Context, Result};
use chainbuild_core::EventSet;
use chainbuild_engine::Orchestrator;
use chainbuild_steps::register_builtin;
use clap::Parser;
use serde_json::Value;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chainbuild")]
#[command(about = "Event-gated build step chaining", long_about = None)]
struct Cli {
    /// Build step to run first
    #[arg(default_value = "start")]
    build: String,

    /// Project root directory
    #[arg(short, long, default_value = ".")]
    path: PathBuf,

    /// Build folder name under the project root
    #[arg(short, long, default_value = "build", env = "CHAINBUILD_BUILD_IN")]
    build_in: String,

    /// Event tag gating conditional next steps (repeatable)
    #[arg(short, long = "event")]
    events: Vec<String>,

    /// Orchestrator-level config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Delete the build folder before building
    #[arg(long)]
    clear_build_path: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut builder = Orchestrator::builder().with_root(cli.path.clone());
    if let Some(config_path) = &cli.config {
        let config = chainbuild_config::discovery::load(config_path)
            .with_context(|| format!("failed to load config file: {}", config_path.display()))?;
        builder = builder.with_config(config);
    }
    if cli.clear_build_path {
        builder = builder.with_arg("clear_build_path", Value::Bool(true));
    }
    let orchestrator = register_builtin(builder).build();

    let events = EventSet::new(cli.events);
    let succeeded = orchestrator
        .run(&cli.build, &cli.build_in, events)
        .context("build chain did not run")?;

    if !succeeded {
        anyhow::bail!("build chain failed");
    }
    Ok(())
}
