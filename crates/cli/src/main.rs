// Weav AI CLI
//
// Design Decision: Use clap derive for ergonomic argument parsing.
// Design Decision: Support text/json/yaml output formats for scripting.
// Design Decision: The config file is loaded once and passed into the client
// constructor as a value; nothing reads it ambiently afterwards.

mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use weav_client::{Client, Config};

#[derive(Parser)]
#[command(name = "weav")]
#[command(about = "Weav AI CLI - Manage agents, prompts, and document uploads")]
#[command(version)]
pub struct Cli {
    /// Path to the JSON config file (token, base URL, upload settings)
    #[arg(long, env = "WEAV_CONFIG", default_value = "config.json")]
    pub config: String,

    /// Output format
    #[arg(long, short, default_value = "text", value_parser = ["text", "json", "yaml"])]
    pub output: String,

    /// Suppress non-essential output
    #[arg(long, short)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Work with conversational agents
    Agents {
        #[command(subcommand)]
        command: commands::agents::AgentsCommand,
    },

    /// Manage versioned prompts
    Prompts {
        #[command(subcommand)]
        command: commands::prompts::PromptsCommand,
    },

    /// Upload, move, and tag documents
    Files {
        #[command(subcommand)]
        command: commands::files::FilesCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weav=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)
        .with_context(|| format!("Failed to load config file: {}", cli.config))?;
    let client = Client::from_config(&config);
    let output_format = output::OutputFormat::from_str(&cli.output);

    match cli.command {
        Commands::Agents { command } => {
            commands::agents::run(command, &client, output_format, cli.quiet).await
        }
        Commands::Prompts { command } => {
            commands::prompts::run(command, &client, output_format).await
        }
        Commands::Files { command } => {
            commands::files::run(command, &client, &config, output_format, cli.quiet).await
        }
    }
}
