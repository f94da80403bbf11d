//! Stack discovery.
//!
//! A stack is any directory one or two levels below the root that holds a
//! compose descriptor. Discovery runs fresh on every invocation and never
//! touches the filesystem beyond reading it.

use crate::error::{Result, StacksError};
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// File names the compose runtime picks up on its own, in its lookup order.
pub const DESCRIPTORS: [&str; 4] = [
    "compose.yaml",
    "compose.yml",
    "docker-compose.yaml",
    "docker-compose.yml",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stack {
    /// Path relative to the root, `/`-separated.
    pub name: String,
    pub dir: PathBuf,
    pub descriptor: PathBuf,
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|s| s.starts_with('.'))
            .unwrap_or(false)
}

/// The descriptor the compose runtime would pick in `dir`, if any.
/// Only stats the candidate files, so unreadable data directories are never listed.
fn descriptor_in(dir: &Path) -> Option<PathBuf> {
    DESCRIPTORS
        .iter()
        .map(|d| dir.join(d))
        .find(|p| p.is_file())
}

fn relative_name(root: &Path, dir: &Path) -> String {
    let rel = dir.strip_prefix(root).unwrap_or(dir);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Every directory at depth 1 or 2 under `root` containing a compose descriptor,
/// each exactly once, sorted by name. An empty result is not an error.
pub fn discover(root: &Path) -> Result<Vec<Stack>> {
    let mut stacks = Vec::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(2)
        .into_iter()
        .filter_entry(|e| !is_hidden(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            // The root itself must be readable; anything below it is skipped.
            Err(e) if e.depth() == 0 => {
                return Err(StacksError::Discovery {
                    root: root.to_path_buf(),
                    message: e.to_string(),
                })
            }
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable directory");
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        let Some(descriptor) = descriptor_in(entry.path()) else {
            continue;
        };

        stacks.push(Stack {
            name: relative_name(root, entry.path()),
            dir: entry.path().to_path_buf(),
            descriptor,
        });
    }
    stacks.sort_by(|a, b| a.name.cmp(&b.name));

    tracing::debug!(root = %root.display(), count = stacks.len(), "discovered stacks");
    Ok(stacks)
}

/// Find a stack by its relative path, or failing that by its final path component.
pub fn resolve(root: &Path, name: &str) -> Result<Stack> {
    let wanted = name.trim().trim_matches('/');
    let stacks = discover(root)?;

    if let Some(hit) = stacks.iter().find(|s| s.name == wanted) {
        return Ok(hit.clone());
    }

    let by_leaf: Vec<&Stack> = stacks
        .iter()
        .filter(|s| s.name.rsplit('/').next() == Some(wanted))
        .collect();

    match by_leaf.as_slice() {
        [] => Err(StacksError::UnknownStack(name.to_string())),
        [one] => Ok((*one).clone()),
        many => Err(StacksError::AmbiguousStack {
            name: name.to_string(),
            candidates: many.iter().map(|s| s.name.clone()).collect(),
        }),
    }
}
