//! Storage module for precis
//!
//! Persists summaries and share history in SQLite.

mod database;
mod models;
mod repository;

pub use database::Database;
pub use models::{
    clean_tags, ShareRecord, ShareTotals, Summary, SummaryEdit, SummaryListItem,
};
pub use repository::{Pagination, Repository, SummaryPage, DEFAULT_PAGE_LIMIT};
