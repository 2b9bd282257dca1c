//! Working-directory tree computation for a build step.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::Result;

/// Conventional subdirectory names detected under a project root.
pub const CONVENTION_DIRS: [&str; 6] = ["src", "inc", "dep", "lib", "exe", "test"];

/// Resolved filesystem locations for one step.
///
/// Every field is absent in headless mode.
#[derive(Debug, Clone, Default)]
pub struct StepPaths {
    pub root: Option<PathBuf>,
    pub build: Option<PathBuf>,
    pub src: Option<PathBuf>,
    pub inc: Option<PathBuf>,
    pub dep: Option<PathBuf>,
    pub lib: Option<PathBuf>,
    pub exe: Option<PathBuf>,
    pub test: Option<PathBuf>,
}

impl StepPaths {
    /// Compute the path set under `root` and create the build directory.
    ///
    /// Without a root the step is headless: every field stays absent and
    /// the filesystem is not touched. Convention directories are only
    /// detected, never created, and the build directory is created
    /// idempotently.
    pub fn populate(root: Option<&Path>, build_folder: &str) -> Result<Self> {
        let Some(root) = root else {
            debug!("no root path supplied, running headless");
            return Ok(Self::default());
        };

        let root = fs::canonicalize(root)?;
        let build = root.join(build_folder);
        fs::create_dir_all(&build)?;
        debug!(root = %root.display(), build = %build.display(), "populated step paths");

        let detect = |name: &str| {
            let dir = root.join(name);
            dir.is_dir().then_some(dir)
        };

        Ok(Self {
            src: detect("src"),
            inc: detect("inc"),
            dep: detect("dep"),
            lib: detect("lib"),
            exe: detect("exe"),
            test: detect("test"),
            root: Some(root),
            build: Some(build),
        })
    }

    /// Headless steps skip every filesystem operation.
    pub fn is_headless(&self) -> bool {
        self.build.is_none()
    }

    /// Look up a conventional subpath by its directory name.
    pub fn convention(&self, name: &str) -> Option<&Path> {
        let slot = match name {
            "src" => &self.src,
            "inc" => &self.inc,
            "dep" => &self.dep,
            "lib" => &self.lib,
            "exe" => &self.exe,
            "test" => &self.test,
            _ => &None,
        };
        slot.as_deref()
    }
}
