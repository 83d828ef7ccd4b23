//! CLI command implementations

use anyhow::{Context, Result};
use chrono::Local;
use std::io::Read;
use std::path::PathBuf;

use crate::cli::args::ConfigCommand;
use crate::config::Settings;
use crate::llm::{summarize_fallback, SummarySource};
use crate::mail::validate_addresses;
use crate::server::validation::{
    Validator, MAX_PROMPT_CHARS, MAX_TEXT_CHARS, MAX_TITLE_CHARS, MIN_PROMPT_CHARS,
    MIN_TEXT_CHARS, MIN_TITLE_CHARS,
};
use crate::server::{build_mailer, build_summarizer};
use crate::storage::{Repository, Summary};

/// Run the HTTP API server
pub async fn serve(settings: &Settings, port: Option<u16>) -> Result<()> {
    let mut settings = settings.clone();
    if let Some(port) = port {
        settings.server.port = port;
    }
    crate::server::run(&settings).await
}

/// Summarize a transcript and optionally save it
pub async fn summarize_transcript(
    settings: &Settings,
    file: Option<PathBuf>,
    prompt: &str,
    title: Option<String>,
    save: bool,
    offline: bool,
) -> Result<()> {
    let transcript = read_transcript(file.as_ref())?;
    let title =
        title.unwrap_or_else(|| format!("Meeting {}", Local::now().format("%Y-%m-%d %H:%M")));

    let mut v = Validator::new();
    v.required_text(
        "file",
        Some(transcript.as_str()),
        "Transcript",
        MIN_TEXT_CHARS,
        MAX_TEXT_CHARS,
    );
    v.required_text(
        "prompt",
        Some(prompt),
        "Prompt",
        MIN_PROMPT_CHARS,
        MAX_PROMPT_CHARS,
    );
    v.required_text(
        "title",
        Some(title.as_str()),
        "Title",
        MIN_TITLE_CHARS,
        MAX_TITLE_CHARS,
    );
    if let Err(errors) = v.finish() {
        let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
        anyhow::bail!("Invalid input: {}", messages.join("; "));
    }

    let (text, source) = if offline {
        (summarize_fallback(&transcript, prompt), "fallback")
    } else {
        let outcome = build_summarizer(settings)?
            .summarize(&transcript, prompt)
            .await?;
        let source = match outcome.source {
            SummarySource::Provider => "provider",
            SummarySource::Fallback => "fallback",
        };
        (outcome.text, source)
    };

    if save {
        let repo = Repository::new(settings)?;
        let summary = repo
            .create_summary(Summary::new(
                title,
                transcript,
                prompt.to_string(),
                text.clone(),
            ))
            .await?;
        println!("Summary saved: {} ({})", short_id(&summary.id), source);
        println!();
    }

    println!("{}", text);

    Ok(())
}

/// List saved summaries
pub async fn list_summaries(settings: &Settings, page: usize, limit: usize) -> Result<()> {
    let repo = Repository::new(settings)?;
    let page = repo.list_page(page, limit).await?;

    if page.items.is_empty() {
        println!("No summaries found");
        return Ok(());
    }

    println!(
        "{:<10} {:<40} {:<12} {:<8}",
        "ID", "Title", "Updated", "Shared"
    );
    println!("{}", "-".repeat(72));

    for item in &page.items {
        println!(
            "{:<10} {:<40} {:<12} {:<8}",
            short_id(&item.id),
            truncate(&item.title, 38),
            item.updated_at.with_timezone(&Local).format("%Y-%m-%d"),
            if item.is_shared { "yes" } else { "no" }
        );
    }

    let p = page.pagination;
    println!();
    println!("Page {} of {} ({} total)", p.page, p.pages.max(1), p.total);

    Ok(())
}

/// Print a saved summary
pub async fn show_summary(settings: &Settings, id: &str) -> Result<()> {
    let repo = Repository::new(settings)?;
    let summary = repo
        .find_by_prefix(id)
        .await?
        .context("Summary not found")?;

    println!("Title: {}", summary.title);
    println!(
        "Created: {}",
        summary.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
    );
    println!("Prompt: {}", summary.custom_prompt);
    if !summary.tags.is_empty() {
        println!("Tags: {}", summary.tags.join(", "));
    }
    if summary.edited_summary.is_some() {
        println!("(edited)");
    }
    println!();
    println!("{}", summary.final_summary());

    if !summary.shared_with.is_empty() {
        println!();
        println!("Shared with:");
        for share in &summary.shared_with {
            println!(
                "  - {} ({})",
                share.email,
                share.shared_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
            );
        }
    }

    Ok(())
}

/// Delete a saved summary
pub async fn delete_summary(settings: &Settings, id: &str) -> Result<()> {
    let repo = Repository::new(settings)?;
    let summary = repo
        .find_by_prefix(id)
        .await?
        .context("Summary not found")?;

    repo.delete_summary(&summary.id).await?;
    println!("Deleted: {} ({})", summary.title, short_id(&summary.id));

    Ok(())
}

/// Email a saved summary and record the deliveries
pub async fn share_summary(settings: &Settings, id: &str, recipients: &[String]) -> Result<()> {
    let repo = Repository::new(settings)?;
    let summary = repo
        .find_by_prefix(id)
        .await?
        .context("Summary not found")?;

    let check = validate_addresses(recipients);
    if !check.invalid.is_empty() {
        anyhow::bail!("Invalid email addresses: {}", check.invalid.join(", "));
    }

    let mailer = build_mailer(settings)?
        .context("Email is not configured. Set [email] in the config file or EMAIL_* variables.")?;

    let receipt = mailer
        .send_summary(&check.valid, summary.final_summary(), &summary.title)
        .await?;
    repo.record_shares(&summary.id, &check.valid).await?;

    println!(
        "Shared {} with {} ({})",
        short_id(&summary.id),
        check.valid.join(", "),
        receipt.message_id
    );

    Ok(())
}

/// Print sharing statistics
pub async fn show_stats(settings: &Settings) -> Result<()> {
    let repo = Repository::new(settings)?;
    let totals = repo.share_totals().await?;

    println!("Summaries:           {}", totals.total_summaries);
    println!("Shared:              {}", totals.shared_summaries);
    println!("Unshared:            {}", totals.unshared_summaries());
    println!("Share rate:          {:.1}%", totals.share_rate());
    println!("Total shares:        {}", totals.total_shares);
    println!("Unique recipients:   {}", totals.unique_recipients);
    println!("Shares per summary:  {:.1}", totals.average_shares_per_summary());

    Ok(())
}

/// Configuration management
pub fn config_command(settings: &Settings, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let mut shown = settings.clone();
            redact(&mut shown.llm.api_key);
            redact(&mut shown.email.pass);
            let toml = toml::to_string_pretty(&shown)?;
            println!("{}", toml);
        }
        ConfigCommand::Path => {
            let path = Settings::config_path()?;
            println!("{}", path.display());
        }
        ConfigCommand::Init { force } => {
            let path = Settings::config_path()?;
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }
            Settings::write_default(&path)?;
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

// Helper functions

fn read_transcript(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read transcript: {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read transcript from stdin")?;
            Ok(buf)
        }
    }
}

fn redact(secret: &mut String) {
    if !secret.is_empty() {
        *secret = "********".to_string();
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
