// Configuration file loading
//
// The scripts read a local JSON file of the shape `{ "config": { ... } }` holding
// the bearer token, service base URL, and upload behavior. The decoded value is
// passed into `Client::new` explicitly; nothing here is process-global.

use crate::error::Error;
use serde::Deserialize;
use std::path::Path;

/// Settings for the Weav AI services and the uploader.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Bearer token sent on every request.
    pub token: String,
    /// Base URL of the Weav AI deployment, without a trailing slash.
    pub base_weav_url: String,
    /// Folder documents are uploaded into or moved to.
    #[serde(default)]
    pub destination_folder_id: Option<String>,
    /// File extensions the uploader will accept (lowercase, no dot).
    #[serde(default)]
    pub allowed_file_types: Vec<String>,
    /// Default folder to upload from when the command line gives none.
    #[serde(default)]
    pub source_file_folder: Option<String>,
    /// Descend into subfolders when collecting files to upload.
    #[serde(default)]
    pub recurse_subfolders: bool,
    /// Tag each uploaded document with its relative directory components.
    #[serde(default)]
    pub tags_from_folder_path: bool,
    /// Paths containing any of these substrings are skipped by the uploader.
    #[serde(default)]
    pub ignore_substrings: Vec<String>,
}

#[derive(Deserialize)]
struct ConfigFile {
    config: Config,
}

impl Config {
    /// Load settings from a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path)?;
        let file: ConfigFile = serde_json::from_str(&raw)?;
        let mut config = file.config;
        config.base_weav_url = config.base_weav_url.trim_end_matches('/').to_string();
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_reads_nested_config_object() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"config": {{
                "token": "tok-123",
                "base_weav_url": "https://acme.weav.ai/",
                "destination_folder_id": "folder-9",
                "allowed_file_types": ["pdf", "txt"],
                "recurse_subfolders": true
            }}}}"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.token, "tok-123");
        // trailing slash is stripped so URL joins stay predictable
        assert_eq!(config.base_weav_url, "https://acme.weav.ai");
        assert_eq!(config.destination_folder_id.as_deref(), Some("folder-9"));
        assert_eq!(config.allowed_file_types, vec!["pdf", "txt"]);
        assert!(config.recurse_subfolders);
        assert!(!config.tags_from_folder_path);
        assert!(config.ignore_substrings.is_empty());
    }

    #[test]
    fn load_missing_file_is_an_io_error() {
        let err = Config::load("/definitely/not/here/config.json").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
