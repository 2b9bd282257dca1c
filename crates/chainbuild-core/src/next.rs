//! Declarative successor step descriptors.

use crate::ConfigMap;

/// One copy instruction executed while preparing a successor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyInstruction {
    pub source: String,
    pub destination: String,
}

/// A build step to run after the current one, with gating, copy, and
/// config instructions.
#[derive(Debug, Clone, Default)]
pub struct NextStepSpec {
    /// Step identifier to dispatch.
    pub build: String,
    /// Location of the successor's root, relative to the current build
    /// path; a leading `//` resolves against the top-level root instead.
    pub path: Option<String>,
    /// Build folder name; defaults to `then_build_<build>`.
    pub build_in: Option<String>,
    /// Run only if at least one of these events is present.
    pub run_when_any: Option<Vec<String>>,
    /// Run only if all of these events are present.
    pub run_when_all: Option<Vec<String>>,
    /// Skip if any of these events is present.
    pub run_when_none: Option<Vec<String>>,
    /// Copy instructions, executed in declaration order.
    pub copy: Vec<CopyInstruction>,
    /// Config overrides written to the successor's config file.
    pub config: Option<ConfigMap>,
    /// Keep processing later specs if this one fails.
    pub tolerate_failure: bool,
}

impl NextStepSpec {
    /// The build folder name the successor will be dispatched with.
    pub fn build_folder(&self) -> String {
        self.build_in
            .clone()
            .unwrap_or_else(|| format!("then_build_{}", self.build))
    }
}
