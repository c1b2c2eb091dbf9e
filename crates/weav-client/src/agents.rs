// Agent operations: configurations, streamed replies, chat history

use crate::client::Client;
use crate::error::Error;
use crate::normalize::rename_storage_id;
use crate::sse::{self, AgentEvent, BlockBuffer, ParseMode};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const AGENT_CONFIGURATIONS: &str = "agent-service/agents/configurations";
const AGENT_RESPONSE: &str = "agent-service/chats/get_agent_response";

fn agent_path(agent_id: &str) -> String {
    format!("agent-service/agents/{agent_id}")
}

fn chat_history_path(chat_id: &str) -> String {
    format!("agent-service/chats/{chat_id}/history")
}

const DELETE_CHAT_HISTORY: &str = "agent-service/chats/history";

/// One agent type known to the service. Built only from normalized responses,
/// so the public identifier is always under `id`. Attributes the service sends
/// beyond the identifier (name, description, model parameters) pass through
/// unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfiguration {
    pub id: String,
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, Value>,
}

/// Body for a message POST.
#[derive(Debug, Clone, Serialize)]
pub struct AgentRequest {
    pub user_input: String,
    pub chat_id: String,
    pub agent_id: String,
    pub stream: bool,
}

#[derive(Serialize)]
struct DeleteChatHistoryRequest<'a> {
    chat_id: &'a str,
}

pub struct Agents<'a> {
    client: &'a Client,
}

impl Client {
    pub fn agents(&self) -> Agents<'_> {
        Agents { client: self }
    }
}

impl Agents<'_> {
    /// Fetch every agent configuration, normalized at the boundary.
    pub async fn list(&self) -> Result<Vec<AgentConfiguration>, Error> {
        let raw: Value = self.client.get(AGENT_CONFIGURATIONS).await?;
        Ok(serde_json::from_value(rename_storage_id(raw))?)
    }

    /// Fetch one agent configuration. The service answers with a one-element
    /// array; an empty array is treated as a missing resource.
    pub async fn get(&self, agent_id: &str) -> Result<AgentConfiguration, Error> {
        let raw: Vec<Value> = self.client.get(&agent_path(agent_id)).await?;
        let first = raw.into_iter().next().ok_or(Error::NotFound)?;
        Ok(serde_json::from_value(rename_storage_id(first))?)
    }

    /// Post a user message and assemble the streamed reply into discrete
    /// events. Blocks the service sends without a payload are dropped in
    /// lenient mode, so the sequence can be shorter than the stream.
    pub async fn respond(
        &self,
        request: &AgentRequest,
        mode: ParseMode,
    ) -> Result<Vec<AgentEvent>, Error> {
        let response = self.client.post_stream(AGENT_RESPONSE, request).await?;

        let mut stream = response.bytes_stream();
        let mut buffer = BlockBuffer::new();
        let mut events = Vec::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            for block in buffer.push_bytes(&chunk) {
                if let Some(event) = sse::parse_block(&block, mode)? {
                    events.push(event);
                }
            }
        }
        if let Some(block) = buffer.finish() {
            if let Some(event) = sse::parse_block(&block, mode)? {
                events.push(event);
            }
        }
        Ok(events)
    }

    /// Fetch the history of one chat session as the service sends it.
    pub async fn chat_history(&self, chat_id: &str) -> Result<Value, Error> {
        self.client.get(&chat_history_path(chat_id)).await
    }

    /// Delete the history of one chat session.
    pub async fn delete_chat_history(&self, chat_id: &str) -> Result<(), Error> {
        self.client
            .delete_json(DELETE_CHAT_HISTORY, &DeleteChatHistoryRequest { chat_id })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn configuration_keeps_unknown_attributes() {
        let value = json!({"id": "a-1", "name": "underwriter", "temperature": 0.2});
        let config: AgentConfiguration = serde_json::from_value(value).unwrap();
        assert_eq!(config.id, "a-1");
        assert_eq!(config.attributes["name"], "underwriter");
        assert_eq!(config.attributes["temperature"], 0.2);
    }

    #[test]
    fn configuration_requires_the_public_identifier() {
        // un-normalized payloads must not sneak past the boundary
        let value = json!({"_id": "a-1", "name": "underwriter"});
        assert!(serde_json::from_value::<AgentConfiguration>(value).is_err());
    }
}
