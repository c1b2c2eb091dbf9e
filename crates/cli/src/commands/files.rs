// File commands: batch upload, folder moves, tagging

use crate::output::{print_field, OutputFormat};
use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::Path;
use weav_client::files::UploadOptions;
use weav_client::{Client, Config};

#[derive(Subcommand)]
pub enum FilesCommand {
    /// Upload every accepted file in a folder
    Upload {
        /// Folder to upload from (defaults to source_file_folder in the config)
        folder: Option<String>,

        /// Destination folder ID (defaults to destination_folder_id in the config)
        #[arg(long)]
        folder_id: Option<String>,
    },

    /// Move uploaded documents to a folder; IDs are read one per line
    Move {
        /// File holding the document IDs to move
        ids_file: String,

        /// Destination folder ID (defaults to destination_folder_id in the config)
        #[arg(long)]
        folder_id: Option<String>,
    },

    /// Replace the tags on an uploaded document
    Tag {
        /// Document ID
        file_id: String,

        /// Tag to apply (repeatable)
        #[arg(long = "tag", short)]
        tags: Vec<String>,
    },
}

pub async fn run(
    command: FilesCommand,
    client: &Client,
    config: &Config,
    output: OutputFormat,
    quiet: bool,
) -> Result<()> {
    match command {
        FilesCommand::Upload { folder, folder_id } => {
            upload(client, config, output, quiet, folder, folder_id).await
        }
        FilesCommand::Move { ids_file, folder_id } => {
            move_files(client, config, output, quiet, &ids_file, folder_id).await
        }
        FilesCommand::Tag { file_id, tags } => tag(client, output, quiet, &file_id, tags).await,
    }
}

fn destination_folder(config: &Config, folder_id: Option<String>) -> Result<String> {
    folder_id
        .or_else(|| config.destination_folder_id.clone())
        .context("No destination folder: pass --folder-id or set destination_folder_id in the config")
}

async fn upload(
    client: &Client,
    config: &Config,
    output: OutputFormat,
    quiet: bool,
    folder: Option<String>,
    folder_id: Option<String>,
) -> Result<()> {
    let folder = folder
        .or_else(|| config.source_file_folder.clone())
        .context("No source folder: pass one or set source_file_folder in the config")?;
    let dir = Path::new(&folder);
    if !dir.is_dir() {
        anyhow::bail!("Folder {} does not exist", folder);
    }

    let mut options = UploadOptions::from_config(config)?;
    if let Some(folder_id) = folder_id {
        options.folder_id = folder_id;
    }

    let summary = client.files().upload_dir(dir, &options).await?;

    if output.is_text() {
        if !quiet {
            for uploaded in &summary.uploaded {
                match &uploaded.id {
                    Some(id) => println!("Uploaded {} ({})", uploaded.path, id),
                    None => println!("Uploaded {}", uploaded.path),
                }
            }
            for skipped in &summary.skipped {
                println!("Skipped {} : {}", skipped.path, skipped.reason);
            }
        }
        println!(
            "{} uploaded, {} skipped",
            summary.uploaded.len(),
            summary.skipped.len()
        );
    } else {
        output.print_value(&summary);
    }

    Ok(())
}

async fn move_files(
    client: &Client,
    config: &Config,
    output: OutputFormat,
    quiet: bool,
    ids_file: &str,
    folder_id: Option<String>,
) -> Result<()> {
    let raw = std::fs::read_to_string(ids_file)
        .with_context(|| format!("Failed to read file IDs from {}", ids_file))?;
    let file_ids: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    if file_ids.is_empty() {
        anyhow::bail!("No file ids found in {}", ids_file);
    }

    let dest_folder_id = destination_folder(config, folder_id)?;
    client.files().move_files(&file_ids, &dest_folder_id).await?;

    if output.is_text() {
        if !quiet {
            println!("{} files moved successfully.", file_ids.len());
        }
    } else {
        output.print_value(&serde_json::json!({
            "moved": file_ids,
            "dest_folder_id": dest_folder_id,
        }));
    }

    Ok(())
}

async fn tag(
    client: &Client,
    output: OutputFormat,
    quiet: bool,
    file_id: &str,
    tags: Vec<String>,
) -> Result<()> {
    if tags.is_empty() {
        anyhow::bail!("Pass at least one --tag");
    }

    let updated = client.files().set_tags(file_id, &tags).await?;

    if output.is_text() {
        if !quiet {
            print_field("Document", file_id);
            print_field("Tags", &tags.join(", "));
        }
    } else {
        output.print_value(&updated);
    }

    Ok(())
}
