//! CLI argument definitions using clap

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// precis - Meeting notes summarizer with instruction-driven summaries
#[derive(Parser, Debug)]
#[command(name = "precis")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Summarize a transcript from a file or stdin
    Summarize {
        /// Transcript file (reads stdin when omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Instruction describing the summary you want
        #[arg(short, long)]
        prompt: String,

        /// Title used when saving
        #[arg(short, long)]
        title: Option<String>,

        /// Store the result in history
        #[arg(short, long)]
        save: bool,

        /// Skip the provider and use the local extractive summarizer
        #[arg(long)]
        offline: bool,
    },

    /// List saved summaries
    List {
        /// Page number, starting at 1
        #[arg(long, default_value = "1")]
        page: usize,

        /// Summaries per page
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Show a saved summary
    Show {
        /// Summary ID or unique prefix
        id: String,
    },

    /// Delete a saved summary
    Delete {
        /// Summary ID or unique prefix
        id: String,
    },

    /// Email a saved summary
    Share {
        /// Summary ID or unique prefix
        id: String,

        /// Recipient addresses
        #[arg(required = true)]
        recipients: Vec<String>,
    },

    /// Show sharing statistics
    Stats,

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}
