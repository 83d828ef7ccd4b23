use anyhow::Result;
use tempfile::tempdir;

use precis::storage::{Database, Repository, Summary, SummaryEdit};

fn sample(title: &str, generated: &str) -> Summary {
    Summary::new(
        title.to_string(),
        "Alice will send the notes. Bob should book the room.".to_string(),
        "Action items".to_string(),
        generated.to_string(),
    )
}

#[test]
fn database_supports_core_summary_workflow() -> Result<()> {
    let tmp = tempdir()?;
    let db_path = tmp.path().join("precis.db");
    let db = Database::open_path(&db_path)?;

    let summary = sample("Team sync", "Action Items:\n• Alice will send the notes")
        .with_tags(vec!["weekly".to_string(), "  ".to_string()]);
    db.insert_summary(&summary)?;

    let stored = db.get_summary(&summary.id)?.expect("summary should exist");
    assert_eq!(stored.tags, vec!["weekly".to_string()]);
    assert_eq!(stored.final_summary(), summary.generated_summary);

    let edited = db
        .apply_edit(
            &summary.id,
            SummaryEdit {
                edited_summary: "Alice sends notes; Bob books room.".to_string(),
                title: Some("Team sync (edited)".to_string()),
                tags: None,
            },
        )?
        .expect("edit should find the summary");
    assert_eq!(edited.title, "Team sync (edited)");
    assert_eq!(edited.final_summary(), "Alice sends notes; Bob books room.");
    assert_eq!(edited.generated_summary, summary.generated_summary);
    assert_eq!(edited.tags, vec!["weekly".to_string()]);

    let records = db.record_shares(
        &summary.id,
        &["a@example.com".to_string(), "b@example.com".to_string()],
    )?;
    assert_eq!(records.len(), 2);
    db.record_shares(&summary.id, &["a@example.com".to_string()])?;

    let shared = db.get_summary(&summary.id)?.expect("summary should exist");
    assert!(shared.is_shared);
    assert_eq!(shared.shared_with.len(), 3);
    assert_eq!(shared.unique_recipients(), 2);

    let totals = db.share_totals()?;
    assert_eq!(totals.total_summaries, 1);
    assert_eq!(totals.shared_summaries, 1);
    assert_eq!(totals.total_shares, 3);
    assert_eq!(totals.unique_recipients, 2);
    assert_eq!(totals.share_rate(), 100.0);
    assert_eq!(totals.average_shares_per_summary(), 3.0);

    Ok(())
}

#[test]
fn deleting_summary_removes_share_history() -> Result<()> {
    let tmp = tempdir()?;
    let db_path = tmp.path().join("precis.db");
    let db = Database::open_path(&db_path)?;

    let summary = sample("Delete me", "Temporary");
    db.insert_summary(&summary)?;
    db.record_shares(&summary.id, &["ops@example.com".to_string()])?;

    assert!(db.delete_summary(&summary.id)?);
    assert!(!db.delete_summary(&summary.id)?);

    assert!(db.get_summary(&summary.id)?.is_none());
    assert!(db.get_shares(&summary.id)?.is_empty());
    assert_eq!(db.share_totals()?.total_shares, 0);

    Ok(())
}

#[test]
fn database_reopens_with_existing_rows() -> Result<()> {
    let tmp = tempdir()?;
    let db_path = tmp.path().join("precis.db");

    let summary = sample("Persisted", "Kept across restarts");
    {
        let db = Database::open_path(&db_path)?;
        db.insert_summary(&summary)?;
    }

    let db = Database::open_path(&db_path)?;
    assert_eq!(db.schema_version()?, 1);
    assert_eq!(db.count_summaries()?, 1);
    assert!(db.get_summary(&summary.id)?.is_some());

    Ok(())
}

#[tokio::test]
async fn repository_pages_most_recent_first() -> Result<()> {
    let repo = Repository::from_database(Database::open_memory()?);

    let mut ids = Vec::new();
    for i in 0..5 {
        let mut summary = sample(&format!("Meeting {i}"), "Body");
        summary.updated_at += chrono::Duration::seconds(i);
        ids.push(repo.create_summary(summary).await?.id);
    }

    let first = repo.list_page(1, 2).await?;
    assert_eq!(first.pagination.total, 5);
    assert_eq!(first.pagination.pages, 3);
    assert_eq!(first.items.len(), 2);
    assert_eq!(first.items[0].id, ids[4]);
    assert_eq!(first.items[1].id, ids[3]);

    let last = repo.list_page(3, 2).await?;
    assert_eq!(last.items.len(), 1);
    assert_eq!(last.items[0].id, ids[0]);

    let beyond = repo.list_page(9, 2).await?;
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.pagination.page, 9);

    let far = repo.list_page(i64::MAX as usize, 10).await?;
    assert!(far.items.is_empty());
    assert_eq!(far.pagination.total, 5);

    let farthest = repo.list_page(usize::MAX, usize::MAX).await?;
    assert!(farthest.items.is_empty());

    Ok(())
}
