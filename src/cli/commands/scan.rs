//! Local savegame scanning command

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

use crate::cli::output::{print_error, print_formatted, OutputFormat};
use crate::config::Config;
use crate::savegame;
use crate::search::{self, Traversal};
use crate::util::format_size;

/// Traversal strategy for the scan command
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMethod {
    /// Immediate children of the scan directory only
    Listing,
    /// Recursive directory walk
    Walk,
    /// The system find utility
    Find,
}

/// JSON-serializable scan result
#[derive(Serialize)]
struct ScanResult {
    root: String,
    total_count: usize,
    savegames: Vec<ScanEntry>,
}

#[derive(Serialize)]
struct ScanEntry {
    name: String,
    slot: Option<usize>,
    path: String,
    size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha256: Option<String>,
}

pub async fn run(
    root: Option<PathBuf>,
    method: ScanMethod,
    hashes: bool,
    format: OutputFormat,
    _quiet: bool,
) -> Result<()> {
    let config = Config::load()?;
    let root = root
        .or_else(|| config.scan_root())
        .context("No scan directory specified. Use --root or configure one in settings.")?;

    let saves = match method {
        ScanMethod::Listing => search::search(&root, Traversal::DirectoryListing)?,
        ScanMethod::Walk => search::search(&root, Traversal::Recursive)?,
        ScanMethod::Find => search::search_with_find(&root).await?,
    };

    let entries: Vec<ScanEntry> = saves
        .iter()
        .map(|save| {
            let sha256 = if hashes {
                match savegame::calculate_sha256(&save.path) {
                    Ok(digest) => Some(digest),
                    Err(e) => {
                        print_error(&format!("Could not hash {}: {}", save.path.display(), e));
                        None
                    }
                }
            } else {
                None
            };

            ScanEntry {
                name: save.name(),
                slot: save.slot(),
                path: save.path.to_string_lossy().to_string(),
                size_bytes: std::fs::metadata(&save.path).map(|m| m.len()).ok(),
                sha256,
            }
        })
        .collect();

    let result = ScanResult {
        root: root.to_string_lossy().to_string(),
        total_count: entries.len(),
        savegames: entries,
    };

    print_formatted(&result, format, |r| format_scan_list(r));

    Ok(())
}

fn format_scan_list(result: &ScanResult) -> String {
    if result.savegames.is_empty() {
        return format!("No savegames found in {}.", result.root);
    }

    let mut lines = vec![format!(
        "Savegames in {} ({} found):\n",
        result.root, result.total_count
    )];

    lines.push(format!("{:<12} {:>4} {:>10}  PATH", "NAME", "SLOT", "SIZE"));
    lines.push("-".repeat(60));

    for save in &result.savegames {
        let slot = save
            .slot
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        let size = save
            .size_bytes
            .map(format_size)
            .unwrap_or_else(|| "?".to_string());
        lines.push(format!(
            "{:<12} {:>4} {:>10}  {}",
            save.name, slot, size, save.path
        ));
        if let Some(sha256) = &save.sha256 {
            lines.push(format!("{:>28}  sha256 {}", "", sha256));
        }
    }

    lines.join("\n")
}
