//! Local savegame search.
//!
//! Three mechanisms produce the same result shape:
//!
//! - `Traversal::DirectoryListing` — immediate children of one directory
//! - `Traversal::Recursive` — deep walk with walkdir
//! - `search_with_find` — shells out to the system `find` utility and
//!   filters its output (the "no file API" strategy)
//!
//! All of them keep only entries whose filename exactly matches the
//! allow-list; everything else is dropped without a sound. A starting path
//! that does not exist is logged as a warning and produces an empty result.

use anyhow::{Context, Result};
use std::path::Path;
use walkdir::WalkDir;

use crate::savegame::{self, SavegameRef};

/// How far a search descends from its starting directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// Only the directory's immediate children.
    DirectoryListing,
    /// The whole tree below the directory.
    Recursive,
}

/// Search `root` for recognized savegames.
///
/// Result order follows the underlying directory listing. Missing `root`
/// is not an error; an unreadable one is.
pub fn search(root: &Path, traversal: Traversal) -> Result<Vec<SavegameRef>> {
    if !root.exists() {
        tracing::warn!("Search directory does not exist: '{}'", root.display());
        return Ok(Vec::new());
    }

    match traversal {
        Traversal::DirectoryListing => list_directory(root),
        Traversal::Recursive => walk_tree(root),
    }
}

fn list_directory(root: &Path) -> Result<Vec<SavegameRef>> {
    let mut found = Vec::new();

    let entries = std::fs::read_dir(root)
        .with_context(|| format!("Failed to read directory {}", root.display()))?;
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name();
        if savegame::is_recognized(&name.to_string_lossy()) {
            found.push(SavegameRef::from_path(path));
        }
    }

    Ok(found)
}

fn walk_tree(root: &Path) -> Result<Vec<SavegameRef>> {
    let mut found = Vec::new();

    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if savegame::is_recognized(&name) {
            found.push(SavegameRef::from_path(entry.into_path()));
        }
    }

    Ok(found)
}

/// Search using the system `find` utility instead of the file API.
///
/// Spawns `find <root> -type f -name "GTASAsf*.b"` and filters the output
/// lines through the allow-list (the glob also matches names like
/// `GTASAsf10.b`, which the filter drops). A missing root or an
/// unspawnable `find` degrade to an empty result with a warning.
pub async fn search_with_find(root: &Path) -> Result<Vec<SavegameRef>> {
    if !root.exists() {
        tracing::warn!("Search directory does not exist: '{}'", root.display());
        return Ok(Vec::new());
    }

    let output = match tokio::process::Command::new("find")
        .arg(root)
        .arg("-type")
        .arg("f")
        .arg("-name")
        .arg("GTASAsf*.b")
        .output()
        .await
    {
        Ok(output) => output,
        Err(e) => {
            tracing::warn!("Could not run find: {}", e);
            return Ok(Vec::new());
        }
    };

    if !output.status.success() {
        // find exits non-zero on unreadable subtrees but still prints what
        // it could reach; keep whatever came through.
        tracing::debug!(
            "find exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut found = Vec::new();
    for line in stdout.lines() {
        let path = Path::new(line);
        let Some(name) = path.file_name() else {
            continue;
        };
        if savegame::is_recognized(&name.to_string_lossy()) {
            found.push(SavegameRef::from_path(path.to_path_buf()));
        }
    }

    Ok(found)
}
