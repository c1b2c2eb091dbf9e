// Prompt management: versioned prompt records
//
// Versions are immutable on the server. Changing a prompt means deactivating
// the current version in place (PUT, identifier kept) and creating a fresh
// record (POST) with every server-managed field stripped first.

use crate::client::Client;
use crate::error::Error;
use crate::normalize::{strip_audit_fields, strip_server_fields};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

const PROMPTS: &str = "prompt-management-service/prompts";

fn prompt_path(prompt_id: &str) -> String {
    format!("{PROMPTS}/{prompt_id}")
}

/// Listing row for one prompt version. The service calls the name field `name`
/// on the wire; it is exposed as `prompt_name` here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptSummary {
    pub prompt_type: String,
    #[serde(rename(deserialize = "name"))]
    pub prompt_name: String,
    pub version_tag: String,
    pub is_active: bool,
}

fn set_field(record: &mut Value, key: &str, value: Value) -> Result<(), Error> {
    let map = record.as_object_mut().ok_or_else(|| {
        Error::UnexpectedResponse("prompt record was not a JSON object".to_string())
    })?;
    map.insert(key.to_string(), value);
    Ok(())
}

pub struct Prompts<'a> {
    client: &'a Client,
}

impl Client {
    pub fn prompts(&self) -> Prompts<'_> {
        Prompts { client: self }
    }
}

impl Prompts<'_> {
    /// List every prompt version the service knows about.
    pub async fn list(&self) -> Result<Vec<PromptSummary>, Error> {
        self.client.get(PROMPTS).await
    }

    /// Fetch one full prompt record, including its `prompt_definition`.
    /// Without a version tag the service answers with the active version.
    pub async fn get(&self, prompt_id: &str, version_tag: Option<&str>) -> Result<Value, Error> {
        let path = prompt_path(prompt_id);
        match version_tag {
            Some(tag) => self.client.get_query(&path, &[("version_tag", tag)]).await,
            None => self.client.get(&path).await,
        }
    }

    /// Mark the current version of a prompt inactive. The record is written
    /// back in place, so the identifier is kept and only the audit fields are
    /// stripped before the PUT.
    pub async fn deactivate(&self, prompt_id: &str) -> Result<Value, Error> {
        let mut record = self.get(prompt_id, None).await?;
        set_field(&mut record, "is_active", Value::Bool(false))?;
        strip_audit_fields(&mut record);
        info!(prompt_id, "deactivating active prompt version");
        self.client.put(PROMPTS, &record).await
    }

    /// Create a new active version of a prompt: fetch the current record,
    /// deactivate it, then POST a copy carrying the new tag and definition with
    /// all five server-managed fields removed.
    pub async fn create_version(
        &self,
        prompt_id: &str,
        new_version_tag: &str,
        prompt_definition: &str,
    ) -> Result<Value, Error> {
        let mut record = self.get(prompt_id, None).await?;
        self.deactivate(prompt_id).await?;

        set_field(&mut record, "version_tag", Value::String(new_version_tag.to_string()))?;
        set_field(
            &mut record,
            "prompt_definition",
            Value::String(prompt_definition.to_string()),
        )?;
        set_field(&mut record, "is_active", Value::Bool(true))?;
        strip_server_fields(&mut record);

        info!(prompt_id, version_tag = new_version_tag, "creating prompt version");
        self.client.post(PROMPTS, &record).await
    }
}
