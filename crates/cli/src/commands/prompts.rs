// Prompt commands: list, inspect, deactivate, publish a new version

use crate::output::{print_table_header, print_table_row, OutputFormat};
use anyhow::{Context, Result};
use clap::Subcommand;
use weav_client::{Client, Error};

#[derive(Subcommand)]
pub enum PromptsCommand {
    /// List every prompt version
    List,

    /// Get one full prompt record
    Get {
        /// Prompt ID
        prompt_id: String,

        /// Specific version tag (defaults to the active version)
        #[arg(long)]
        version_tag: Option<String>,
    },

    /// Mark the active version of a prompt inactive
    Deactivate {
        /// Prompt ID
        prompt_id: String,
    },

    /// Create a new active version with prompt text read from a file
    Update {
        /// Prompt ID
        prompt_id: String,

        /// Version tag for the new version
        #[arg(long)]
        version_tag: String,

        /// File holding the new prompt text
        #[arg(long, short)]
        file: String,
    },
}

pub async fn run(command: PromptsCommand, client: &Client, output: OutputFormat) -> Result<()> {
    match command {
        PromptsCommand::List => list(client, output).await,
        PromptsCommand::Get {
            prompt_id,
            version_tag,
        } => get(client, output, &prompt_id, version_tag.as_deref()).await,
        PromptsCommand::Deactivate { prompt_id } => deactivate(client, output, &prompt_id).await,
        PromptsCommand::Update {
            prompt_id,
            version_tag,
            file,
        } => update(client, output, &prompt_id, &version_tag, &file).await,
    }
}

fn not_found(prompt_id: &str) -> impl Fn(Error) -> anyhow::Error + '_ {
    move |e| match e {
        Error::NotFound => anyhow::anyhow!("Prompt with ID {} not found", prompt_id),
        e => e.into(),
    }
}

async fn list(client: &Client, output: OutputFormat) -> Result<()> {
    let prompts = client.prompts().list().await?;

    if output.is_text() {
        if prompts.is_empty() {
            println!("No prompts found");
            return Ok(());
        }

        print_table_header(&[("TYPE", 10), ("NAME", 34), ("VERSION", 12), ("ACTIVE", 6)]);
        for prompt in &prompts {
            let active = if prompt.is_active { "yes" } else { "no" };
            print_table_row(&[
                (&prompt.prompt_type, 10),
                (&prompt.prompt_name, 34),
                (&prompt.version_tag, 12),
                (active, 6),
            ]);
        }
    } else {
        output.print_value(&prompts);
    }

    Ok(())
}

async fn get(
    client: &Client,
    output: OutputFormat,
    prompt_id: &str,
    version_tag: Option<&str>,
) -> Result<()> {
    let record = client
        .prompts()
        .get(prompt_id, version_tag)
        .await
        .map_err(not_found(prompt_id))?;

    if output.is_text() {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        output.print_value(&record);
    }

    Ok(())
}

async fn deactivate(client: &Client, output: OutputFormat, prompt_id: &str) -> Result<()> {
    let record = client
        .prompts()
        .deactivate(prompt_id)
        .await
        .map_err(not_found(prompt_id))?;

    if output.is_text() {
        println!("Deactivated prompt: {}", prompt_id);
    } else {
        output.print_value(&record);
    }

    Ok(())
}

async fn update(
    client: &Client,
    output: OutputFormat,
    prompt_id: &str,
    version_tag: &str,
    file: &str,
) -> Result<()> {
    let prompt_text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read prompt text file: {}", file))?;

    let created = client
        .prompts()
        .create_version(prompt_id, version_tag, &prompt_text)
        .await
        .map_err(not_found(prompt_id))?;

    if output.is_text() {
        println!("Created prompt version {} for {}", version_tag, prompt_id);
        println!("{}", serde_json::to_string_pretty(&created)?);
    } else {
        output.print_value(&created);
    }

    Ok(())
}
