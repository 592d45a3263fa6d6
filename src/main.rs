use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::io;
use std::path::PathBuf;

mod cli;

use cli::{Cli, Commands};
use gateway_agent::auth::DefaultCredential;
use gateway_agent::config::{Config, ENV_RUST_LOG};
use gateway_agent::foundry::FoundryClient;
use gateway_agent::prompt;
use gateway_agent::session::run_session;
use gateway_agent::tools::ToolCatalog;

fn setup_logging(filter: &str) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gateway-agent")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("gateway-agent.log");

    // Setup env_logger with file output; stdout belongs to the chat
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::new()
        .parse_filters(filter)
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized at {}, writing to: {}", filter, log_file.display());
    Ok(())
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match cli.command.clone().unwrap_or(Commands::Chat) {
        Commands::Chat => run_chat(config).await,
        Commands::Tools { json } => handle_tools_command(json, config),
        Commands::Prompt => {
            println!("{}", prompt::instructions());
            Ok(())
        }
    }
}

async fn run_chat(config: &Config) -> Result<()> {
    println!("{}", "Connecting to Azure AI Foundry project ...".cyan());
    println!("  Endpoint : {}", config.project_endpoint);
    println!("  Model    : {}", config.model);
    println!("  Gateway  : {}", config.gateway_url);
    println!("  GitHub   : {}", config.github_mcp_url);
    println!();

    let credential = DefaultCredential::new();
    let client = FoundryClient::connect(config, &credential)
        .await
        .context("Failed to connect to the agent service")?;

    let catalog = ToolCatalog::from_config(config);
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    run_session(&client, config, catalog, stdin.lock(), &mut stdout)
        .await
        .context("Chat session failed")?;

    Ok(())
}

fn handle_tools_command(json: bool, config: &Config) -> Result<()> {
    let catalog = ToolCatalog::from_config(config);
    info!("Tool servers: {}", catalog.labels().join(", "));

    if json {
        let schema = serde_json::to_string_pretty(&catalog.to_api_schema()).context("Failed to serialize tools")?;
        println!("{}", schema);
        return Ok(());
    }

    for tool in catalog.all() {
        println!("{} {}", tool.server_label.green(), tool.server_url);
        println!("  approval   : {}", tool.require_approval.as_str());
        if let Some(connection) = &tool.project_connection_id {
            println!("  connection : {}", connection);
        }
        if let Some(allowed) = &tool.allowed_tools {
            println!("  allowed    : {} tools", allowed.len());
            for name in allowed {
                println!("    - {}", name);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Optional .env in the working directory; may carry RUST_LOG
    let dotenv = dotenvy::dotenv();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration before the logger so log_level can apply
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    let rust_log = std::env::var(ENV_RUST_LOG).ok();
    setup_logging(&config.log_filter(rust_log.as_deref())).context("Failed to setup logging")?;

    match dotenv {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) => info!("No .env loaded: {}", e),
    }

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
