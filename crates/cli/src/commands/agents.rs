// Agent commands: configurations, chat, history

use crate::output::{print_field, print_table_header, print_table_row, OutputFormat};
use anyhow::Result;
use clap::Subcommand;
use serde_json::Value;
use weav_client::agents::AgentRequest;
use weav_client::sse::ParseMode;
use weav_client::{Client, Error};

#[derive(Subcommand)]
pub enum AgentsCommand {
    /// List all agent configurations
    List,

    /// Get one agent configuration by ID
    Get {
        /// Agent ID
        agent_id: String,
    },

    /// Send a message to an agent and print the reply events
    Chat {
        /// Message text to send
        #[arg(long, short)]
        message: String,

        /// Chat session ID
        #[arg(long)]
        chat_id: String,

        /// Agent ID
        #[arg(long)]
        agent_id: String,

        /// Ask the service for a buffered reply instead of a streamed one
        #[arg(long)]
        buffered: bool,

        /// Fail on malformed stream blocks instead of silently dropping them
        #[arg(long)]
        strict: bool,
    },

    /// Print the history of a chat session
    History {
        /// Chat session ID
        chat_id: String,
    },

    /// Delete the history of a chat session
    ClearHistory {
        /// Chat session ID
        chat_id: String,
    },
}

pub async fn run(
    command: AgentsCommand,
    client: &Client,
    output: OutputFormat,
    quiet: bool,
) -> Result<()> {
    match command {
        AgentsCommand::List => list(client, output).await,
        AgentsCommand::Get { agent_id } => get(client, output, &agent_id).await,
        AgentsCommand::Chat {
            message,
            chat_id,
            agent_id,
            buffered,
            strict,
        } => chat(client, output, quiet, message, chat_id, agent_id, buffered, strict).await,
        AgentsCommand::History { chat_id } => history(client, output, &chat_id).await,
        AgentsCommand::ClearHistory { chat_id } => {
            clear_history(client, output, quiet, &chat_id).await
        }
    }
}

fn attribute<'a>(attributes: &'a serde_json::Map<String, Value>, key: &str) -> &'a str {
    attributes.get(key).and_then(Value::as_str).unwrap_or("-")
}

async fn list(client: &Client, output: OutputFormat) -> Result<()> {
    let agents = client.agents().list().await?;

    if output.is_text() {
        if agents.is_empty() {
            println!("No agents found");
            return Ok(());
        }

        print_table_header(&[("ID", 26), ("NAME", 30), ("DESCRIPTION", 40)]);
        for agent in &agents {
            print_table_row(&[
                (&agent.id, 26),
                (attribute(&agent.attributes, "name"), 30),
                (attribute(&agent.attributes, "description"), 40),
            ]);
        }
    } else {
        output.print_value(&agents);
    }

    Ok(())
}

async fn get(client: &Client, output: OutputFormat, agent_id: &str) -> Result<()> {
    let agent = client.agents().get(agent_id).await.map_err(|e| match e {
        Error::NotFound => anyhow::anyhow!("Failed to find agent with ID {}", agent_id),
        e => e.into(),
    })?;

    if output.is_text() {
        print_field("ID", &agent.id);
        print_field("Name", attribute(&agent.attributes, "name"));
        for (key, value) in &agent.attributes {
            if key == "name" {
                continue;
            }
            match value.as_str() {
                Some(text) => print_field(key, text),
                None => print_field(key, &value.to_string()),
            }
        }
    } else {
        output.print_value(&agent);
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn chat(
    client: &Client,
    output: OutputFormat,
    quiet: bool,
    message: String,
    chat_id: String,
    agent_id: String,
    buffered: bool,
    strict: bool,
) -> Result<()> {
    let request = AgentRequest {
        user_input: message.clone(),
        chat_id,
        agent_id,
        stream: !buffered,
    };
    let mode = if strict {
        ParseMode::Strict
    } else {
        ParseMode::Lenient
    };

    if !quiet && output.is_text() {
        println!("You: {}\n", message);
    }

    let events = client.agents().respond(&request, mode).await?;

    if output.is_text() {
        if events.is_empty() {
            println!("(no reply events)");
            return Ok(());
        }
        for event in &events {
            println!("{}", event.data);
        }
    } else {
        output.print_value(&events);
    }

    Ok(())
}

async fn history(client: &Client, output: OutputFormat, chat_id: &str) -> Result<()> {
    let history = client
        .agents()
        .chat_history(chat_id)
        .await
        .map_err(|e| match e {
            Error::NotFound => anyhow::anyhow!("No chat history for ID {}", chat_id),
            e => e.into(),
        })?;

    if output.is_text() {
        println!("{}", serde_json::to_string_pretty(&history)?);
    } else {
        output.print_value(&history);
    }

    Ok(())
}

async fn clear_history(
    client: &Client,
    output: OutputFormat,
    quiet: bool,
    chat_id: &str,
) -> Result<()> {
    client.agents().delete_chat_history(chat_id).await?;

    if output.is_text() && !quiet {
        println!("Deleted chat history: {}", chat_id);
    } else if !output.is_text() {
        output.print_value(&serde_json::json!({ "chat_id": chat_id, "status": "deleted" }));
    }

    Ok(())
}
