//! Repository pattern wrapper for database operations
//!
//! Provides a cloneable, async-friendly handle over a single SQLite
//! connection for the HTTP server and CLI.

use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::Settings;
use crate::storage::{Database, ShareRecord, ShareTotals, Summary, SummaryEdit, SummaryListItem};

/// Default page size for history listings
pub const DEFAULT_PAGE_LIMIT: usize = 10;

/// Pagination metadata for a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub pages: usize,
}

impl Pagination {
    /// Compute page metadata; zero page or limit fall back to defaults
    pub fn new(page: usize, limit: usize, total: usize) -> Self {
        let page = if page == 0 { 1 } else { page };
        let limit = if limit == 0 { DEFAULT_PAGE_LIMIT } else { limit };
        Self {
            page,
            limit,
            total,
            pages: total.div_ceil(limit),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// One page of history rows
#[derive(Debug, Clone, Serialize)]
pub struct SummaryPage {
    pub items: Vec<SummaryListItem>,
    pub pagination: Pagination,
}

/// Repository for managing summaries and their share history
#[derive(Clone)]
pub struct Repository {
    db: Arc<Mutex<Database>>,
}

impl Repository {
    /// Open the configured database
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(Self::from_database(Database::open(settings)?))
    }

    /// Wrap an already-open database
    pub fn from_database(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    /// Persist a freshly generated summary
    pub async fn create_summary(&self, summary: Summary) -> Result<Summary> {
        self.db.lock().await.insert_summary(&summary)?;
        Ok(summary)
    }

    /// Get a summary by ID
    pub async fn get_summary(&self, id: &str) -> Result<Option<Summary>> {
        self.db.lock().await.get_summary(id)
    }

    /// Resolve a full or abbreviated ID
    pub async fn find_by_prefix(&self, prefix: &str) -> Result<Option<Summary>> {
        self.db.lock().await.find_summary_by_prefix(prefix)
    }

    /// Store a user edit
    pub async fn edit_summary(&self, id: &str, edit: SummaryEdit) -> Result<Option<Summary>> {
        self.db.lock().await.apply_edit(id, edit)
    }

    /// Delete a summary; `false` if it did not exist
    pub async fn delete_summary(&self, id: &str) -> Result<bool> {
        self.db.lock().await.delete_summary(id)
    }

    /// List a page of summaries, most recently updated first
    pub async fn list_page(&self, page: usize, limit: usize) -> Result<SummaryPage> {
        let db = self.db.lock().await;
        let total = db.count_summaries()?;
        let pagination = Pagination::new(page, limit, total);
        let items = db.list_summaries(pagination.offset(), pagination.limit)?;

        Ok(SummaryPage { items, pagination })
    }

    /// Record deliveries of a summary
    pub async fn record_shares(&self, id: &str, emails: &[String]) -> Result<Vec<ShareRecord>> {
        self.db.lock().await.record_shares(id, emails)
    }

    /// Aggregate sharing statistics
    pub async fn share_totals(&self) -> Result<ShareTotals> {
        self.db.lock().await.share_totals()
    }
}
