//! tg_tools CLI - main entry point
//!
//! Read-only Telegram tools: login, dialogs, tail, search.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use tg_tools::config::{DEFAULT_DIALOGS_LIMIT, DEFAULT_SEARCH_LIMIT, DEFAULT_TAIL_LIMIT};
use tg_tools::metrics::{spawn_metrics_server, CommandTimer};
use tg_tools::{commands, Config, OutputFormat};

#[derive(Parser)]
#[command(name = "tg_tools")]
#[command(about = "Telegram read/search tools", long_about = None)]
#[command(version)]
struct Cli {
    /// Env file with TG_API_ID / TG_API_HASH
    #[arg(long, env = "TG_ENV_FILE", global = true)]
    env_file: Option<PathBuf>,

    /// Session file path
    #[arg(long, env = "TG_SESSION_PATH", global = true)]
    session: Option<PathBuf>,

    /// Serve Prometheus metrics on this address (e.g., 127.0.0.1:9898).
    ///
    /// The endpoint lives only while the command runs, so it is scrapeable
    /// mainly during an interactive `login`. Short commands only update the
    /// in-process counters.
    #[arg(long, env = "METRICS_ADDR", global = true)]
    metrics_addr: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in (first time) or show the logged-in account
    Login {
        /// Phone in E.164, e.g. +15551234567
        #[arg(long)]
        phone: Option<String>,
    },

    /// List recent dialogs as <id>\t<title>
    Dialogs {
        /// Maximum number of dialogs
        #[arg(long, default_value_t = DEFAULT_DIALOGS_LIMIT)]
        limit: usize,

        /// Output format: text | json | yaml
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the latest messages of a chat, oldest first
    Tail {
        /// Chat id, @username or t.me link
        #[arg(long)]
        chat: String,

        /// Maximum number of messages
        #[arg(long, default_value_t = DEFAULT_TAIL_LIMIT)]
        limit: usize,

        /// Output format: text | json | yaml
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },

    /// Search messages in all chats
    Search {
        /// Keywords to search for
        #[arg(long)]
        query: String,

        /// Maximum number of results
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: usize,

        /// Output format: text | json | yaml
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Login { .. } => "login",
            Commands::Dialogs { .. } => "dialogs",
            Commands::Tail { .. } => "tail",
            Commands::Search { .. } => "search",
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Records go to stdout, diagnostics to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("tg_tools=warn".parse()?))
        .init();

    let cli = Cli::parse();

    if let Some(addr) = cli.metrics_addr.as_deref() {
        match addr.parse::<SocketAddr>() {
            Ok(socket) => {
                if let Err(err) = spawn_metrics_server(socket).await {
                    warn!(%addr, "Metrics endpoint not started: {}", err);
                }
            }
            Err(err) => warn!(%addr, "Invalid metrics address: {}", err),
        }
    }

    let config = Config::with_paths(cli.env_file, cli.session);

    let timer = CommandTimer::start(cli.command.name());
    let result = execute_command(&config, cli.command).await;
    timer.finish(result.is_ok());

    result
}

async fn execute_command(config: &Config, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Login { phone } => {
            commands::login::run(config, phone.as_deref()).await?;
        }
        Commands::Dialogs { limit, format } => {
            commands::dialogs::run(config, limit, format).await?;
        }
        Commands::Tail {
            chat,
            limit,
            format,
        } => {
            commands::tail::run(config, &chat, limit, format).await?;
        }
        Commands::Search {
            query,
            limit,
            format,
        } => {
            commands::search::run(config, &query, limit, format).await?;
        }
    }

    Ok(())
}
