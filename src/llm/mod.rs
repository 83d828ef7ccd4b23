//! LLM module for precis
//!
//! Handles AI-powered summaries through Groq, with a deterministic local
//! fallback when the provider cannot answer.

mod client;
pub mod fallback;
mod groq;
mod prompts;
mod summarizer;

pub use client::{build_provider, LlmError, LlmProvider, SummaryRequest};
pub use fallback::{summarize_fallback, SummaryMode};
pub use groq::GroqClient;
pub use summarizer::{ConnectionTest, Summarizer, SummaryOutcome, SummarySource};
