//! Filesystem helpers for successor preparation.

use std::fs;
use std::path::{Path, PathBuf};

use chainbuild_core::{CopyInstruction, Error, Result};
use tracing::debug;

use crate::planner::ROOT_MARKER;

/// Execute one copy instruction: sources resolve against the top-level
/// root, destinations against the prepared successor root.
///
/// A file destination ending in `/` (or naming an existing directory)
/// copies the source into that directory under its own name.
pub fn copy_entry(
    instruction: &CopyInstruction,
    source_root: &Path,
    dest_root: &Path,
) -> Result<()> {
    let source = resolve(source_root, &instruction.source);
    if !source.exists() {
        return Err(Error::Copy(format!(
            "source {} does not exist",
            source.display()
        )));
    }
    let destination = resolve(dest_root, &instruction.destination);
    debug!(source = %source.display(), destination = %destination.display(), "copying");

    if source.is_dir() {
        copy_dir(&source, &destination)?;
        return Ok(());
    }

    let target = if instruction.destination.ends_with('/') || destination.is_dir() {
        fs::create_dir_all(&destination)?;
        let file_name = source.file_name().ok_or_else(|| {
            Error::Copy(format!("source {} has no file name", source.display()))
        })?;
        destination.join(file_name)
    } else {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        destination
    };
    fs::copy(&source, &target)?;
    Ok(())
}

/// A root-relative marker or an absolute path overrides `root`.
fn resolve(root: &Path, spec: &str) -> PathBuf {
    let relative = spec.strip_prefix(ROOT_MARKER).unwrap_or(spec);
    root.join(relative)
}

fn copy_dir(source: &Path, destination: &Path) -> Result<()> {
    fs::create_dir_all(destination)?;
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let target = destination.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
