//! SQLite document store for summaries and their share history

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::config::Settings;
use crate::storage::models::{
    clean_tags, ShareRecord, ShareTotals, Summary, SummaryEdit, SummaryListItem,
};

/// Database wrapper for precis
pub struct Database {
    conn: Connection,
}

const CURRENT_SCHEMA_VERSION: i64 = 1;

const SUMMARY_COLUMNS: &str = "id, title, original_text, custom_prompt, generated_summary, \
     edited_summary, tags, is_shared, created_at, updated_at";

impl Database {
    /// Open or create the database
    pub fn open(settings: &Settings) -> Result<Self> {
        let db_path = settings.database_path();

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        Self::open_path(&db_path)
    }

    /// Open database at a specific path (useful for testing)
    pub fn open_path(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;

        let db = Self { conn };
        db.initialize()?;

        Ok(db)
    }

    /// Open an in-memory database
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize database schema
    fn initialize(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let current_version = self.schema_version()?;
        if current_version > CURRENT_SCHEMA_VERSION {
            anyhow::bail!(
                "Database schema version {} is newer than supported version {}",
                current_version,
                CURRENT_SCHEMA_VERSION
            );
        }

        if current_version < 1 {
            self.migrate_to_v1()?;
            self.set_schema_version(1)?;
        }

        Ok(())
    }

    /// Current schema version tracked in PRAGMA user_version.
    pub fn schema_version(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))?)
    }

    fn set_schema_version(&self, version: i64) -> Result<()> {
        self.conn
            .execute(&format!("PRAGMA user_version = {}", version), [])?;
        Ok(())
    }

    fn migrate_to_v1(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS summaries (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                original_text TEXT NOT NULL,
                custom_prompt TEXT NOT NULL,
                generated_summary TEXT NOT NULL,
                edited_summary TEXT,
                tags TEXT NOT NULL DEFAULT '[]',
                is_shared INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_summaries_updated_at
                ON summaries(updated_at DESC);
            CREATE INDEX IF NOT EXISTS idx_summaries_is_shared
                ON summaries(is_shared);

            CREATE TABLE IF NOT EXISTS summary_shares (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                summary_id TEXT NOT NULL,
                email TEXT NOT NULL,
                shared_at INTEGER NOT NULL,
                FOREIGN KEY (summary_id) REFERENCES summaries(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_shares_summary_id
                ON summary_shares(summary_id);
            "#,
        )?;

        Ok(())
    }

    /// Insert a new summary
    pub fn insert_summary(&self, summary: &Summary) -> Result<()> {
        let tags_json = serde_json::to_string(&summary.tags)?;

        self.conn.execute(
            r#"
            INSERT INTO summaries (id, title, original_text, custom_prompt, generated_summary,
                                   edited_summary, tags, is_shared, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                summary.id,
                summary.title,
                summary.original_text,
                summary.custom_prompt,
                summary.generated_summary,
                summary.edited_summary,
                tags_json,
                summary.is_shared,
                summary.created_at.timestamp_millis(),
                summary.updated_at.timestamp_millis(),
            ],
        )?;

        Ok(())
    }

    /// Overwrite a summary's mutable fields and bump `updated_at`
    pub fn update_summary(&self, summary: &Summary) -> Result<()> {
        let tags_json = serde_json::to_string(&summary.tags)?;

        self.conn.execute(
            r#"
            UPDATE summaries
            SET title = ?2, generated_summary = ?3, edited_summary = ?4, tags = ?5,
                is_shared = ?6, updated_at = ?7
            WHERE id = ?1
            "#,
            params![
                summary.id,
                summary.title,
                summary.generated_summary,
                summary.edited_summary,
                tags_json,
                summary.is_shared,
                Utc::now().timestamp_millis(),
            ],
        )?;

        Ok(())
    }

    /// Apply a user edit. Returns the updated summary, or `None` if the id
    /// is unknown.
    pub fn apply_edit(&self, id: &str, edit: SummaryEdit) -> Result<Option<Summary>> {
        let Some(mut summary) = self.get_summary(id)? else {
            return Ok(None);
        };

        summary.edited_summary = Some(edit.edited_summary);
        if let Some(title) = edit.title.filter(|t| !t.is_empty()) {
            summary.title = title;
        }
        if let Some(tags) = edit.tags {
            summary.tags = clean_tags(tags);
        }

        self.update_summary(&summary)?;
        self.get_summary(id)
    }

    /// Get a summary by ID, including its share history
    pub fn get_summary(&self, id: &str) -> Result<Option<Summary>> {
        let result = self
            .conn
            .query_row(
                &format!("SELECT {SUMMARY_COLUMNS} FROM summaries WHERE id = ?1"),
                params![id],
                Self::row_to_summary,
            )
            .optional()?;

        match result {
            Some(mut summary) => {
                summary.shared_with = self.get_shares(&summary.id)?;
                Ok(Some(summary))
            }
            None => Ok(None),
        }
    }

    /// Find a summary by a unique ID prefix, as typed on the command line
    pub fn find_summary_by_prefix(&self, prefix: &str) -> Result<Option<Summary>> {
        if prefix.is_empty() {
            return Ok(None);
        }

        let pattern = format!("{}%", prefix.replace(['%', '_'], ""));
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM summaries WHERE id LIKE ?1 LIMIT 2")?;
        let ids = stmt
            .query_map(params![pattern], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        match ids.as_slice() {
            [id] => self.get_summary(id),
            [] => Ok(None),
            _ => anyhow::bail!("Summary ID prefix '{}' is ambiguous", prefix),
        }
    }

    /// Delete a summary and its share history. Returns whether it existed.
    pub fn delete_summary(&self, id: &str) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM summaries WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    /// One page of summaries, most recently updated first
    pub fn list_summaries(&self, offset: usize, limit: usize) -> Result<Vec<SummaryListItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, tags, is_shared, created_at, updated_at
             FROM summaries
             ORDER BY updated_at DESC, created_at DESC, rowid DESC
             LIMIT ?1 OFFSET ?2",
        )?;

        let items = stmt
            .query_map(params![sql_count(limit), sql_count(offset)], |row| {
                let tags_json: String = row.get(2)?;
                Ok(SummaryListItem {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    tags: serde_json::from_str(&tags_json).unwrap_or_default(),
                    is_shared: row.get(3)?,
                    created_at: from_millis(row.get(4)?),
                    updated_at: from_millis(row.get(5)?),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(items)
    }

    /// Total number of summaries
    pub fn count_summaries(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM summaries", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Number of summaries emailed at least once
    pub fn count_shared_summaries(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM summaries WHERE is_shared = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Append share records and mark the summary shared, in one transaction
    pub fn record_shares(&self, id: &str, emails: &[String]) -> Result<Vec<ShareRecord>> {
        let now = Utc::now();
        let tx = self.conn.unchecked_transaction()?;

        let mut records = Vec::with_capacity(emails.len());
        for email in emails {
            tx.execute(
                "INSERT INTO summary_shares (summary_id, email, shared_at) VALUES (?1, ?2, ?3)",
                params![id, email, now.timestamp_millis()],
            )?;
            records.push(ShareRecord {
                email: email.clone(),
                shared_at: now,
            });
        }

        tx.execute(
            "UPDATE summaries SET is_shared = 1, updated_at = ?2 WHERE id = ?1",
            params![id, now.timestamp_millis()],
        )?;

        tx.commit()?;
        Ok(records)
    }

    /// Share history for a summary, oldest first
    pub fn get_shares(&self, summary_id: &str) -> Result<Vec<ShareRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT email, shared_at
             FROM summary_shares
             WHERE summary_id = ?1
             ORDER BY shared_at, id",
        )?;

        let shares = stmt
            .query_map(params![summary_id], |row| {
                Ok(ShareRecord {
                    email: row.get(0)?,
                    shared_at: from_millis(row.get(1)?),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(shares)
    }

    /// Aggregate sharing statistics
    pub fn share_totals(&self) -> Result<ShareTotals> {
        let (total_shares, unique_recipients): (i64, i64) = self.conn.query_row(
            "SELECT COUNT(*), COUNT(DISTINCT sh.email)
             FROM summary_shares sh
             JOIN summaries s ON sh.summary_id = s.id
             WHERE s.is_shared = 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(ShareTotals {
            total_summaries: self.count_summaries()?,
            shared_summaries: self.count_shared_summaries()?,
            total_shares: total_shares as usize,
            unique_recipients: unique_recipients as usize,
        })
    }

    fn row_to_summary(row: &rusqlite::Row) -> rusqlite::Result<Summary> {
        let tags_json: String = row.get(6)?;

        Ok(Summary {
            id: row.get(0)?,
            title: row.get(1)?,
            original_text: row.get(2)?,
            custom_prompt: row.get(3)?,
            generated_summary: row.get(4)?,
            edited_summary: row.get(5)?,
            tags: serde_json::from_str(&tags_json).unwrap_or_default(),
            is_shared: row.get(7)?,
            shared_with: Vec::new(),
            created_at: from_millis(row.get(8)?),
            updated_at: from_millis(row.get(9)?),
        })
    }
}

/// Clamp a row count to SQLite's signed range; wrapping would turn a huge
/// OFFSET negative, which SQLite reads as zero.
fn sql_count(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn from_millis(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use tempfile::tempdir;

    fn sample(title: &str) -> Summary {
        Summary::new(
            title.to_string(),
            "We met and agreed on the plan.".to_string(),
            "Overview".to_string(),
            "Plan agreed.".to_string(),
        )
    }

    #[test]
    fn test_create_database() {
        let db = Database::open_memory().unwrap();
        assert_eq!(db.count_summaries().unwrap(), 0);
        assert_eq!(db.schema_version().unwrap(), 1);
    }

    #[test]
    fn test_insert_and_get_summary() {
        let db = Database::open_memory().unwrap();

        let summary = sample("Weekly sync").with_tags(vec!["team".to_string()]);
        db.insert_summary(&summary).unwrap();

        let retrieved = db.get_summary(&summary.id).unwrap().unwrap();
        assert_eq!(retrieved.title, "Weekly sync");
        assert_eq!(retrieved.tags, vec!["team".to_string()]);
        assert_eq!(retrieved.final_summary(), "Plan agreed.");
        assert!(!retrieved.is_shared);
    }

    #[test]
    fn test_find_summary_by_prefix() {
        let db = Database::open_memory().unwrap();
        let summary = sample("Planning");
        db.insert_summary(&summary).unwrap();

        let found = db.find_summary_by_prefix(&summary.id[..8]).unwrap().unwrap();
        assert_eq!(found.id, summary.id);
        assert!(db.find_summary_by_prefix("zzzz").unwrap().is_none());
        assert!(db.find_summary_by_prefix("").unwrap().is_none());
    }

    #[test]
    fn test_list_offset_past_end_is_empty() {
        let db = Database::open_memory().unwrap();
        db.insert_summary(&sample("Only")).unwrap();

        assert_eq!(db.list_summaries(0, 10).unwrap().len(), 1);
        assert!(db.list_summaries(usize::MAX, 10).unwrap().is_empty());
        assert!(db.list_summaries(1, usize::MAX).unwrap().is_empty());
    }

    #[test]
    fn test_apply_edit_keeps_generated_text() {
        let db = Database::open_memory().unwrap();
        let summary = sample("Retro");
        db.insert_summary(&summary).unwrap();

        let edited = db
            .apply_edit(
                &summary.id,
                SummaryEdit {
                    edited_summary: "Better plan.".to_string(),
                    title: Some("Retro v2".to_string()),
                    tags: Some(vec![" ".to_string(), "retro".to_string()]),
                },
            )
            .unwrap()
            .unwrap();

        assert_eq!(edited.generated_summary, "Plan agreed.");
        assert_eq!(edited.final_summary(), "Better plan.");
        assert_eq!(edited.title, "Retro v2");
        assert_eq!(edited.tags, vec!["retro".to_string()]);

        let missing = db.apply_edit("nope", SummaryEdit::default()).unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_record_shares_and_totals() {
        let db = Database::open_memory().unwrap();
        let first = sample("One");
        let second = sample("Two");
        db.insert_summary(&first).unwrap();
        db.insert_summary(&second).unwrap();

        db.record_shares(&first.id, &["a@example.com".to_string(), "b@example.com".to_string()])
            .unwrap();
        db.record_shares(&first.id, &["a@example.com".to_string()])
            .unwrap();

        let shared = db.get_summary(&first.id).unwrap().unwrap();
        assert!(shared.is_shared);
        assert_eq!(shared.shared_with.len(), 3);
        assert_eq!(shared.unique_recipients(), 2);

        let totals = db.share_totals().unwrap();
        assert_eq!(
            totals,
            ShareTotals {
                total_summaries: 2,
                shared_summaries: 1,
                total_shares: 3,
                unique_recipients: 2,
            }
        );
    }

    #[test]
    fn test_list_orders_by_last_update() {
        let db = Database::open_memory().unwrap();
        let older = sample("Older");
        db.insert_summary(&older).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let newer = sample("Newer");
        db.insert_summary(&newer).unwrap();

        let page = db.list_summaries(0, 10).unwrap();
        let titles: Vec<&str> = page.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Newer", "Older"]);

        std::thread::sleep(std::time::Duration::from_millis(5));
        db.apply_edit(
            &older.id,
            SummaryEdit {
                edited_summary: "touched".to_string(),
                ..SummaryEdit::default()
            },
        )
        .unwrap();

        let page = db.list_summaries(0, 1).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].title, "Older");

        let second_page = db.list_summaries(1, 1).unwrap();
        assert_eq!(second_page[0].title, "Newer");
    }

    #[test]
    fn test_delete_cascades_to_shares() {
        let db = Database::open_memory().unwrap();
        let summary = sample("Temp");
        db.insert_summary(&summary).unwrap();
        db.record_shares(&summary.id, &["x@example.com".to_string()])
            .unwrap();

        assert!(db.delete_summary(&summary.id).unwrap());
        assert!(!db.delete_summary(&summary.id).unwrap());
        assert!(db.get_shares(&summary.id).unwrap().is_empty());
        assert_eq!(db.share_totals().unwrap(), ShareTotals::default());
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let tmp = tempdir().unwrap();
        let db_path = tmp.path().join("future.db");

        let conn = Connection::open(&db_path).unwrap();
        conn.execute_batch("PRAGMA user_version = 99;").unwrap();
        drop(conn);

        let err = match Database::open_path(&db_path) {
            Ok(_) => panic!("expected newer schema to be rejected"),
            Err(e) => e.to_string(),
        };
        assert!(err.contains("newer than supported"));
    }
}
