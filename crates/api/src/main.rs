//! Matchmate server binary.
//!
//! Usage:
//!   matchmate                       # serve on 127.0.0.1:8000
//!   matchmate --config matchmate.toml serve
//!   matchmate --roster data/students.csv run
//!
//! # Environment Variables
//!
//! - `MATCHMATE_CONFIG` - Path to a TOML config file
//! - `MATCHMATE_BIND_ADDR` - Server bind address (default: 127.0.0.1)
//! - `MATCHMATE_PORT` - Server port (default: 8000)
//! - `MATCHMATE_ROSTER` - Roster CSV path (default: data/students.csv)
//! - `GEMINI_API_KEY` / `GOOGLE_API_KEY` - Gemini credential

use clap::{Parser, Subcommand};
use matchmate_api::{serve, AppState, ServerConfig};
use matchmate_matcher::{LlmCollaborator, RecommendationPipeline};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "matchmate", version, about = "Student pairing recommendations over HTTP")]
struct Cli {
    /// Path to config.toml file
    #[arg(short, long, env = "MATCHMATE_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Bind address
    #[arg(short, long, env = "MATCHMATE_BIND_ADDR", global = true)]
    bind: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "MATCHMATE_PORT", global = true)]
    port: Option<u16>,

    /// Roster CSV file
    #[arg(short, long, env = "MATCHMATE_ROSTER", global = true)]
    roster: Option<PathBuf>,

    /// LLM model name
    #[arg(long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Start the web server (default)
    Serve,
    /// Run the matcher once and print the recommendations
    Run,
}

impl Cli {
    /// Resolve configuration: CLI flag > env var > config file > default.
    fn load_config(&self) -> anyhow::Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!(path = %path.display(), "Loading configuration");
                ServerConfig::from_file(path)?
            }
            None => {
                tracing::info!("Using default configuration");
                ServerConfig::default()
            }
        };

        if let Some(ref bind) = self.bind {
            config.bind = bind.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(ref roster) = self.roster {
            config.roster_path = roster.clone();
        }
        if let Some(ref model) = self.model {
            config.llm.model = model.clone();
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,matchmate_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = cli.load_config()?;

    if config.llm.resolve_api_key().is_none() {
        tracing::warn!(
            provider = %config.llm.provider,
            env = ?config.llm.api_key_env_vars(),
            "No API key configured. Every matching run will fail until one is set."
        );
    }

    let collaborator = LlmCollaborator::from_config(&config.llm)?;
    tracing::info!(
        provider = %config.llm.provider,
        model = %config.llm.model,
        roster = %config.roster_path.display(),
        "Matcher configured"
    );
    let pipeline = RecommendationPipeline::new(Arc::new(collaborator));

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            if config.bind == "0.0.0.0" {
                tracing::warn!(
                    "Server binding to 0.0.0.0. The matching endpoint has no authentication \
                     and will be reachable from every network interface."
                );
            }
            let addr = config.socket_addr()?;
            let state = AppState::new(pipeline, config.roster_path);
            serve(Arc::new(state), addr).await?;
        }
        Command::Run => {
            let result = pipeline.run(&config.roster_path).await;
            if !result.is_success() {
                anyhow::bail!(result.output());
            }
            println!("################################");
            println!("Final Matching Recommendations:");
            println!("################################\n");
            println!("{}", result.output());
        }
    }

    Ok(())
}
