// Document operations: batch upload, folder moves, tagging
//
// Uploads are strictly sequential. A file that cannot be read or that the
// service rejects is reported, skipped, and never retried; files already
// uploaded stay uploaded.

use crate::client::Client;
use crate::config::Config;
use crate::error::Error;
use crate::normalize::rename_storage_id;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const DOCUMENTS: &str = "file-service/documents/";
const MOVE_FILES: &str = "file-service/folders/move/";

fn tags_path(file_id: &str) -> String {
    format!("file-service/documents/{file_id}/tags")
}

/// Upload behavior, taken from the config file.
#[derive(Debug, Clone)]
pub struct UploadOptions {
    /// Folder the documents land in.
    pub folder_id: String,
    /// Accepted extensions, lowercase without the dot. An empty list accepts
    /// nothing, matching the config contract that the list is always supplied.
    pub allowed_file_types: Vec<String>,
    /// Descend into subfolders.
    pub recurse: bool,
    /// Tag each document with its directory components relative to the upload
    /// root.
    pub tags_from_folder_path: bool,
    /// Skip any path containing one of these substrings.
    pub ignore_substrings: Vec<String>,
}

impl UploadOptions {
    /// Build from the config file; fails when no destination folder is set.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let folder_id = config.destination_folder_id.clone().ok_or_else(|| {
            Error::Config("config file has no destination_folder_id for uploads".to_string())
        })?;
        Ok(Self {
            folder_id,
            allowed_file_types: config
                .allowed_file_types
                .iter()
                .map(|ext| ext.to_lowercase())
                .collect(),
            recurse: config.recurse_subfolders,
            tags_from_folder_path: config.tags_from_folder_path,
            ignore_substrings: config.ignore_substrings.clone(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadedDocument {
    pub path: String,
    /// Document identifier from the service, when the response carried one.
    pub id: Option<String>,
    /// Tags actually applied through the tagging endpoint; empty when tagging
    /// was off, impossible, or failed.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: String,
    pub reason: String,
}

/// What a batch upload did. Skips are expected operation, not failure.
#[derive(Debug, Default, Serialize)]
pub struct UploadSummary {
    pub uploaded: Vec<UploadedDocument>,
    pub skipped: Vec<SkippedFile>,
}

#[derive(Serialize)]
struct MoveFilesRequest<'a> {
    dest_folder_id: &'a str,
    file_ids: &'a [String],
}

pub struct Files<'a> {
    client: &'a Client,
}

impl Client {
    pub fn files(&self) -> Files<'_> {
        Files { client: self }
    }
}

impl Files<'_> {
    /// Upload every accepted file under `dir`, one at a time.
    pub async fn upload_dir(
        &self,
        dir: &Path,
        options: &UploadOptions,
    ) -> Result<UploadSummary, Error> {
        let mut paths = Vec::new();
        collect_files(dir, options.recurse, &mut paths)?;
        paths.sort();

        let mut summary = UploadSummary::default();
        for path in paths {
            let path_text = path.display().to_string();

            if !has_allowed_extension(&path, &options.allowed_file_types) {
                info!(path = %path_text, "invalid file type, skipping");
                summary.skipped.push(SkippedFile {
                    path: path_text,
                    reason: "file type not allowed".to_string(),
                });
                continue;
            }
            if is_ignored(&path_text, &options.ignore_substrings) {
                info!(path = %path_text, "ignored path, skipping");
                summary.skipped.push(SkippedFile {
                    path: path_text,
                    reason: "matched ignore list".to_string(),
                });
                continue;
            }

            match self.upload_one(&path, &options.folder_id).await {
                Ok(id) => {
                    info!(path = %path_text, "uploaded");
                    let mut tags = if options.tags_from_folder_path {
                        folder_tags(dir, &path)
                    } else {
                        Vec::new()
                    };
                    if !tags.is_empty() {
                        match &id {
                            Some(id) => {
                                if let Err(err) = self.set_tags(id, &tags).await {
                                    warn!(path = %path_text, error = %err, "failed to tag document");
                                    tags.clear();
                                }
                            }
                            // no document id, nothing to tag
                            None => tags.clear(),
                        }
                    }
                    summary.uploaded.push(UploadedDocument {
                        path: path_text,
                        id,
                        tags,
                    });
                }
                Err(err) => {
                    warn!(path = %path_text, error = %err, "upload failed, skipping");
                    summary.skipped.push(SkippedFile {
                        path: path_text,
                        reason: err.to_string(),
                    });
                }
            }
        }
        Ok(summary)
    }

    /// Upload a single file and return the document identifier the service
    /// assigned, when the response carries one.
    pub async fn upload_one(&self, path: &Path, folder_id: &str) -> Result<Option<String>, Error> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(content_type(path))
            .map_err(Error::Http)?;
        let form = Form::new()
            .text("folder_id", folder_id.to_string())
            .part("file_uploaded", part);

        let response: Value = self.client.post_multipart(DOCUMENTS, form).await?;
        let response = rename_storage_id(response);
        Ok(response
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    /// Move already-uploaded documents into another folder.
    pub async fn move_files(&self, file_ids: &[String], dest_folder_id: &str) -> Result<(), Error> {
        info!(count = file_ids.len(), dest_folder_id, "moving files");
        self.client
            .put_unit(
                MOVE_FILES,
                &MoveFilesRequest {
                    dest_folder_id,
                    file_ids,
                },
            )
            .await
    }

    /// Replace the tags on an uploaded document.
    pub async fn set_tags(&self, file_id: &str, tags: &[String]) -> Result<Value, Error> {
        self.client
            .patch(&tags_path(file_id), &json!({ "tags": tags }))
            .await
    }
}

fn collect_files(dir: &Path, recurse: bool, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            if recurse {
                collect_files(&path, recurse, out)?;
            }
        } else {
            out.push(path);
        }
    }
    Ok(())
}

fn has_allowed_extension(path: &Path, allowed: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| allowed.iter().any(|a| a == &ext.to_lowercase()))
        .unwrap_or(false)
}

fn is_ignored(path: &str, ignore_substrings: &[String]) -> bool {
    ignore_substrings.iter().any(|s| path.contains(s.as_str()))
}

/// Directory components of `path` relative to the upload root, used as tags.
fn folder_tags(root: &Path, path: &Path) -> Vec<String> {
    path.parent()
        .and_then(|parent| parent.strip_prefix(root).ok())
        .map(|rel| {
            rel.components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default()
}

fn content_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("txt") | Some("md") => "text/plain",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}
