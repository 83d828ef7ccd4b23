//! precis - Meeting notes summarizer
//!
//! Entry point for the precis CLI and API server.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use precis::cli::{Cli, Commands};
use precis::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        precis::cli::completions::print(shell);
        return Ok(());
    }

    // Load configuration only for runtime commands.
    let settings = Settings::load()?;

    // Initialize logging
    let default_level = if cli.verbose {
        "debug"
    } else {
        settings.general.log_level.as_str()
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Execute command
    match cli.command {
        Commands::Serve { port } => {
            precis::cli::commands::serve(&settings, port).await?;
        }
        Commands::Summarize {
            file,
            prompt,
            title,
            save,
            offline,
        } => {
            precis::cli::commands::summarize_transcript(
                &settings, file, &prompt, title, save, offline,
            )
            .await?;
        }
        Commands::List { page, limit } => {
            precis::cli::commands::list_summaries(&settings, page, limit).await?;
        }
        Commands::Show { id } => {
            precis::cli::commands::show_summary(&settings, &id).await?;
        }
        Commands::Delete { id } => {
            precis::cli::commands::delete_summary(&settings, &id).await?;
        }
        Commands::Share { id, recipients } => {
            precis::cli::commands::share_summary(&settings, &id, &recipients).await?;
        }
        Commands::Stats => {
            precis::cli::commands::show_stats(&settings).await?;
        }
        Commands::Config(config_cmd) => {
            precis::cli::commands::config_command(&settings, config_cmd)?;
        }
        Commands::Completions { .. } => unreachable!(),
    }

    Ok(())
}
