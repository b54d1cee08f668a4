//! PantryPal command-line client
//!
#![doc = "PantryPal - pantry and recipe assistant client"]
#![doc = "Main entry point for the PantryPal CLI."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pantrypal::cli::{Cli, Commands};
use pantrypal::commands;
use pantrypal::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose, cli.json_logs);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Login { username, password } => {
            commands::auth::login(&config, &username, &password).await?;
            Ok(())
        }
        Commands::Logout => {
            commands::auth::logout(&config).await?;
            Ok(())
        }
        Commands::Refresh => {
            commands::auth::refresh(&config).await?;
            Ok(())
        }
        Commands::Chats { command } => {
            tracing::debug!("Starting chats command");
            commands::chats::handle_chats(&config, command).await?;
            Ok(())
        }
        Commands::Request {
            method,
            path,
            body,
            headers,
            query,
            timeout,
        } => {
            let args = commands::request::RequestArgs {
                method,
                path,
                body,
                headers,
                query,
                timeout,
            };
            commands::request::run_request(&config, args).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// `RUST_LOG` wins when set; otherwise `--verbose` selects debug output.
fn init_tracing(verbose: bool, json: bool) {
    let default_filter = if verbose {
        "pantrypal=debug"
    } else {
        "pantrypal=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
