use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mcp_goal_router::{
    assistant::AssistantClient,
    config::{Config, LogFormat},
    engine::{plan_goal, GoalEngine, RunContext},
    history::HistoryStore,
    planner::{ContentType, Page, ToolClassifier},
    server::{AppState, McpServer},
};

#[derive(Parser, Debug)]
#[command(name = "mcp-goal-router", version, about = "Goal decomposition and tool routing over MCP")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Serve MCP over stdio (default)
    Serve,

    /// Show how a goal would be routed, without calling the assistant
    Plan {
        #[arg(long)]
        goal: String,

        /// Page as `title` or `title:type` (text, code, image, video); repeatable
        #[arg(long = "page", required = true)]
        pages: Vec<String>,
    },

    /// Execute one goal against the assistant and print the result tabs
    Run {
        #[arg(long)]
        goal: String,

        /// Defaults to DEFAULT_SPACE
        #[arg(long)]
        space: Option<String>,

        /// Page title; repeatable, selection order matters
        #[arg(long = "page", required = true)]
        pages: Vec<String>,
    },

    /// List the keyword rules in priority order
    Rules,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(&config);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Plan { goal, pages } => {
            let pages: Vec<Page> = pages.iter().map(|p| parse_page(p)).collect();
            let report = plan_goal(&goal, &pages, &ToolClassifier::new());
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Commands::Run { goal, space, pages } => {
            let space = space
                .or_else(|| config.run.default_space.clone())
                .unwrap_or_default();
            let client = AssistantClient::new(&config.assistant, config.request.clone())?;
            let engine = GoalEngine::new(Arc::new(client));
            let history = HistoryStore::new();

            let entry = engine
                .run_and_record(&RunContext::new(goal, space, pages), &history)
                .await?;
            for tab in &entry.tabs {
                println!("# {}\n\n{}\n", tab.title, tab.content);
            }
            Ok(())
        }
        Commands::Rules => {
            for (rank, rule) in ToolClassifier::new().rules().iter().enumerate() {
                println!("{:>2}. {:<16} {:<18} {}", rank + 1, rule.name, rule.tool.as_str(), rule.pattern());
            }
            Ok(())
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        "MCP goal router starting..."
    );

    let client = match AssistantClient::new(&config.assistant, config.request.clone()) {
        Ok(c) => {
            info!(base_url = %config.assistant.base_url, "Assistant client initialized");
            c
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize assistant client");
            return Err(e.into());
        }
    };

    let state = Arc::new(AppState::new(config, Arc::new(client)));
    let server = McpServer::new(state);

    info!("Server ready, waiting for requests on stdin...");

    if let Err(e) = server.run().await {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}

/// `title:type` when the suffix names a content type, otherwise the whole
/// argument is a text page title.
fn parse_page(arg: &str) -> Page {
    if let Some((title, suffix)) = arg.rsplit_once(':') {
        if let Ok(content_type) = suffix.parse::<ContentType>() {
            return Page::new(title.trim(), content_type);
        }
    }
    Page::new(arg.trim(), ContentType::Text)
}

/// Initialize tracing/logging
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
