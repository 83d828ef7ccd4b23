//! HTTP API server for precis
//!
//! JSON endpoints for generating, editing, listing and sharing summaries.

pub mod error;
pub mod routes;
pub mod validation;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Settings;
use crate::llm::{build_provider, LlmError, Summarizer};
use crate::mail::{MailRelay, SmtpRelay};
use crate::storage::Repository;

/// Request bodies above this size are rejected
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Shared handles passed to every handler
#[derive(Clone)]
pub struct AppState {
    pub repo: Repository,
    pub summarizer: Summarizer,
    pub mailer: Option<Arc<dyn MailRelay>>,
}

/// Build the API router
pub fn build_router(state: AppState, frontend_url: &str) -> Result<Router> {
    let origin = HeaderValue::from_str(frontend_url)
        .with_context(|| format!("Invalid frontend URL: {}", frontend_url))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    // Unsupported methods on a known path answer like unknown paths.
    let router = Router::new()
        .route(
            "/api/health",
            get(routes::health).fallback(routes::not_found),
        )
        .route(
            "/api/summarize",
            post(routes::summarize::create_summary)
                .get(routes::summarize::list_summaries)
                .fallback(routes::not_found),
        )
        .route(
            "/api/summarize/test-ai",
            post(routes::summarize::test_ai).fallback(routes::not_found),
        )
        .route(
            "/api/summarize/:id",
            get(routes::summarize::get_summary)
                .put(routes::summarize::update_summary)
                .delete(routes::summarize::delete_summary)
                .fallback(routes::not_found),
        )
        .route(
            "/api/share",
            post(routes::share::share_summary).fallback(routes::not_found),
        )
        .route(
            "/api/share/history/:summary_id",
            get(routes::share::share_history).fallback(routes::not_found),
        )
        .route(
            "/api/share/test-email",
            post(routes::share::test_email).fallback(routes::not_found),
        )
        .route(
            "/api/share/stats",
            get(routes::share::share_stats).fallback(routes::not_found),
        )
        .fallback(routes::not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(router)
}

/// Construct the provider-backed summarizer.
///
/// A missing API key leaves the server usable for history and sharing;
/// summarize requests then fail with a configuration error.
pub fn build_summarizer(settings: &Settings) -> Result<Summarizer> {
    match build_provider(settings) {
        Ok(provider) => Ok(Summarizer::new(provider)),
        Err(LlmError::MissingApiKey) => {
            warn!("{}", LlmError::MissingApiKey);
            Ok(Summarizer::unconfigured())
        }
        Err(e) => Err(e.into()),
    }
}

/// Construct the SMTP relay, or `None` when email is not configured
pub fn build_mailer(settings: &Settings) -> Result<Option<Arc<dyn MailRelay>>> {
    match SmtpRelay::from_settings(&settings.email) {
        Ok(relay) => {
            let relay: Arc<dyn MailRelay> = Arc::new(relay);
            Ok(Some(relay))
        }
        Err(e) if e.is_configuration() => {
            warn!("Email sharing disabled: {}", e);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Run the HTTP server until interrupted
pub async fn run(settings: &Settings) -> Result<()> {
    info!("Starting precis server");

    let state = AppState {
        repo: Repository::new(settings)?,
        summarizer: build_summarizer(settings)?,
        mailer: build_mailer(settings)?,
    };

    let app = build_router(state, &settings.server.frontend_url)?;

    let addr = settings.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Server listening on {}", listener.local_addr()?);
    info!(
        host = or_not_set(&settings.email.host),
        user = or_not_set(&settings.email.user),
        pass = if settings.email.pass.is_empty() { "NOT SET" } else { "SET" },
        "Email config check"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server");
    Ok(())
}

fn or_not_set(value: &str) -> &str {
    if value.trim().is_empty() {
        "NOT SET"
    } else {
        value
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
