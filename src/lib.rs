//! precis - Meeting notes summarizer with AI summaries, history, and email sharing
//!
//! A "précis" is a short summary of the essential points of a text.

pub mod cli;
pub mod config;
pub mod llm;
pub mod mail;
pub mod server;
pub mod storage;

use thiserror::Error;

/// Main error type for precis
#[derive(Error, Debug)]
pub enum PrecisError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),

    #[error("Summarization error: {0}")]
    Llm(#[from] llm::LlmError),

    #[error("Email error: {0}")]
    Mail(#[from] mail::MailError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, PrecisError>;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "precis";
