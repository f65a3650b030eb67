//! Sync service commands

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use serde::Serialize;

use crate::cli::output::{print_formatted, print_success, OutputFormat};
use crate::config::Config;
use crate::savegame;
use crate::service::{ServiceClient, ServiceEndpoint};
use crate::util::format_size;

#[derive(Subcommand, Debug)]
pub enum RemoteCommands {
    /// List savegames stored on the service
    List,

    /// Download a savegame from the service
    Download {
        /// Savegame name, e.g. GTASAsf1.b
        name: String,

        /// Destination directory (configured download directory if not specified)
        #[arg(long)]
        to: Option<PathBuf>,
    },

    /// Upload a local savegame to the service
    Upload {
        /// Path of the savegame file
        path: PathBuf,
    },
}

#[derive(Serialize)]
struct RemoteListResult {
    endpoint: String,
    total_count: usize,
    savegames: Vec<RemoteEntry>,
}

#[derive(Serialize)]
struct RemoteEntry {
    name: String,
    slot: Option<usize>,
    size_bytes: u64,
    modified: Option<String>,
}

pub async fn run(
    command: RemoteCommands,
    addresses: &[String],
    port: u16,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let endpoint = ServiceEndpoint::from_candidates(addresses, port)
        .context("No service address given. Pass at least one --address.")?;
    tracing::info!("Using address: '{}'", endpoint);
    let client = ServiceClient::new(endpoint)?;

    match command {
        RemoteCommands::List => list(&client, format).await,
        RemoteCommands::Download { name, to } => download(&client, &name, to, quiet).await,
        RemoteCommands::Upload { path } => upload(&client, &path, quiet).await,
    }
}

async fn list(client: &ServiceClient, format: OutputFormat) -> Result<()> {
    let saves = client.list_savegames().await?;

    let entries: Vec<RemoteEntry> = saves
        .iter()
        .map(|save| RemoteEntry {
            name: save.name.clone(),
            slot: savegame::slot_number(&save.name),
            size_bytes: save.size,
            modified: save
                .modified
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string()),
        })
        .collect();

    let result = RemoteListResult {
        endpoint: client.endpoint().to_string(),
        total_count: entries.len(),
        savegames: entries,
    };

    print_formatted(&result, format, |r| format_remote_list(r));

    Ok(())
}

fn format_remote_list(result: &RemoteListResult) -> String {
    if result.savegames.is_empty() {
        return format!("No savegames on {}.", result.endpoint);
    }

    let mut lines = vec![format!(
        "Savegames on {} ({} total):\n",
        result.endpoint, result.total_count
    )];

    lines.push(format!(
        "{:<12} {:>4} {:>10}  {:<16}",
        "NAME", "SLOT", "SIZE", "MODIFIED"
    ));
    lines.push("-".repeat(48));

    for save in &result.savegames {
        let slot = save
            .slot
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        lines.push(format!(
            "{:<12} {:>4} {:>10}  {:<16}",
            save.name,
            slot,
            format_size(save.size_bytes),
            save.modified.as_deref().unwrap_or("unknown")
        ));
    }

    lines.join("\n")
}

async fn download(
    client: &ServiceClient,
    name: &str,
    to: Option<PathBuf>,
    quiet: bool,
) -> Result<()> {
    let dest_dir = match to {
        Some(dir) => dir,
        None => Config::load()?.download_dir()?,
    };

    let path = client.download(name, &dest_dir).await?;

    print_success(&format!("Downloaded {} to {}", name, path.display()), quiet);
    Ok(())
}

async fn upload(client: &ServiceClient, path: &Path, quiet: bool) -> Result<()> {
    let digest = client.upload(path).await?;

    print_success(
        &format!("Uploaded {} (sha256 {})", path.display(), digest),
        quiet,
    );
    Ok(())
}
