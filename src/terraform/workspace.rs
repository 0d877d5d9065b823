// Copyright (c) 2025 - Cowboy AI, Inc.
//! Per-run working copy of the definition set
//!
//! Parallel runs must not share `.terraform/` or state files, so each run
//! applies from its own temporary copy. The copy is removed on drop unless
//! it was persisted, which the harness does when teardown fails and the
//! state file is the only record of what is left in Azure.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::errors::{InfrastructureError, InfrastructureResult};

/// Temporary directory holding a copy of the definition set
#[derive(Debug)]
pub struct Workspace {
    source: PathBuf,
    path: PathBuf,
    /// `None` once persisted
    dir: Option<TempDir>,
}

impl Workspace {
    /// Copy `source` into a fresh temporary directory
    ///
    /// Local engine state (`.terraform/`, state files, var files) is left
    /// behind so every run starts clean.
    pub fn copy_from(source: impl AsRef<Path>) -> InfrastructureResult<Self> {
        let source = source.as_ref();
        if !source.is_dir() {
            return Err(InfrastructureError::Workspace(format!(
                "definition directory {} does not exist",
                source.display()
            )));
        }

        let dir = tempfile::Builder::new().prefix("aks-infra-").tempdir()?;
        let copied = copy_tree(source, dir.path())?;
        if copied == 0 {
            return Err(InfrastructureError::Workspace(format!(
                "definition directory {} contains no .tf files",
                source.display()
            )));
        }

        debug!(
            "Copied {} definition files from {} to {}",
            copied,
            source.display(),
            dir.path().display()
        );

        Ok(Self {
            source: source.to_path_buf(),
            path: dir.path().to_path_buf(),
            dir: Some(dir),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Keep the directory on disk after drop and return its path
    pub fn persist(&mut self) -> &Path {
        if let Some(dir) = self.dir.take() {
            let _ = dir.keep();
        }
        &self.path
    }

    pub fn is_persisted(&self) -> bool {
        self.dir.is_none()
    }
}

/// Copy the tree, returning how many `.tf`/`.tf.json` files were copied
fn copy_tree(from: &Path, to: &Path) -> InfrastructureResult<usize> {
    let mut definitions = 0;

    let entries = WalkDir::new(from)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| !is_local_state(entry));

    for entry in entries {
        let entry = entry.map_err(|e| InfrastructureError::Workspace(e.to_string()))?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| InfrastructureError::Workspace(e.to_string()))?;
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &target)?;
            let name = entry.file_name().to_string_lossy();
            if name.ends_with(".tf") || name.ends_with(".tf.json") {
                definitions += 1;
            }
        }
    }

    Ok(definitions)
}

fn is_local_state(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    name == ".terraform"
        || name == ".terraform.tfstate.lock.info"
        || name.starts_with("terraform.tfstate")
        || name.ends_with(".tfvars")
        || name.ends_with(".tfvars.json")
}
