//! hostctl CLI - command-line interface for the resource API.
//!
//! Lists, adds and deletes resources, inspects and waits on asynchronous
//! jobs, and manages the local configuration file.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;

use hostctl_core::config::{AppConfig, ConfigHandle};
use hostctl_core::error::HcResult;
use hostctl_core::logging;

/// hostctl - manage resources and jobs on the remote API.
#[derive(Parser)]
#[command(
    name = "hostctl",
    version,
    about = "Resource and job client for the hostctl REST API",
    long_about = "A command-line client for the hostctl REST API.\n\
                  Add and delete resources, list them, and follow the asynchronous jobs they start."
)]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json).
    #[arg(short = 'f', long, global = true, default_value = "text")]
    format: OutputFormat,

    /// API endpoint (overrides config).
    #[arg(short, long, global = true)]
    endpoint: Option<String>,

    /// Wait for add/delete jobs to finish (overrides config).
    #[arg(long = "async", global = true)]
    async_mode: bool,

    /// Job wait budget in seconds (overrides config).
    #[arg(short, long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output for scripting.
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List all resources.
    List,
    /// Add a resource.
    Add {
        /// Resource identifier.
        id: String,
        /// IP address of the resource.
        #[arg(long = "ip")]
        ip_address: String,
        /// Port of the resource.
        #[arg(short, long)]
        port: u16,
    },
    /// Delete a resource.
    Delete {
        /// Resource identifier.
        id: String,
    },
    /// Inspect asynchronous jobs.
    Job {
        #[command(subcommand)]
        action: commands::job::JobAction,
    },
    /// View and modify the configuration file.
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

#[tokio::main]
async fn main() -> HcResult<()> {
    let cli = Cli::parse();

    let (config_path, mut config) = match cli.config.clone() {
        Some(path) => {
            let config = AppConfig::load_or_default(&path)?;
            (path, config)
        }
        None => (AppConfig::default_config_path()?, AppConfig::load_default()?),
    };

    // Initialize logging
    let log_level = if cli.verbose { "debug".to_string() } else { config.logging.level.clone() };
    let file_logging = config
        .effective_log_dir()
        .and_then(|dir| logging::init_logging(&log_level, &dir, config.logging.json_output));
    let _guard = match file_logging {
        Ok(guard) => Some(guard),
        Err(_) => {
            logging::init_console_logging(&log_level);
            None
        }
    };

    commands::apply_overrides(
        &mut config,
        &commands::Overrides {
            endpoint: cli.endpoint,
            async_mode: cli.async_mode,
            timeout_secs: cli.timeout,
        },
    );
    let config_handle = ConfigHandle::new(config);

    debug!("hostctl v{}", hostctl_core::constants::APP_VERSION);

    // Dispatch to command handlers
    match cli.command {
        Commands::List => commands::resources::list(config_handle, cli.format).await,
        Commands::Add { id, ip_address, port } => {
            commands::resources::add(config_handle, id, ip_address, port, cli.format).await
        }
        Commands::Delete { id } => {
            commands::resources::delete(config_handle, id, cli.format).await
        }
        Commands::Job { action } => commands::job::run(config_handle, action, cli.format).await,
        Commands::Config { action } => {
            commands::config::run(config_handle, &config_path, action, cli.format).await
        }
    }
}
