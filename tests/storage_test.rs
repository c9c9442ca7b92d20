mod common;

use anyhow::Result;
use common::db_path;
use pennywise::domain::{Ledger, TransactionKind};
use pennywise::storage::{Repository, SNAPSHOT_KEY};
use tempfile::TempDir;

async fn test_repo() -> Result<(Repository, TempDir)> {
    let temp_dir = TempDir::new()?;
    let url = format!("sqlite:{}?mode=rwc", db_path(&temp_dir).display());
    let repo = Repository::init(&url).await?;
    Ok((repo, temp_dir))
}

#[tokio::test]
async fn test_empty_database_has_no_snapshot() -> Result<()> {
    let (repo, _temp) = test_repo().await?;

    assert!(repo.load_snapshot().await?.is_none());
    assert!(repo.last_saved_at().await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_snapshot_roundtrip() -> Result<()> {
    let (repo, _temp) = test_repo().await?;

    let mut ledger = Ledger::new();
    ledger.add_transaction(TransactionKind::Income, "Salary", 500_000, "2024-01")?;
    ledger.add_transaction(TransactionKind::Expense, "Rent", 200_000, "2024-01")?;
    ledger.set_goal(1_000_000)?;

    repo.save_snapshot(&ledger.snapshot()).await?;
    let loaded = repo.load_snapshot().await?.expect("Snapshot should exist");
    assert_eq!(loaded, ledger.snapshot());
    assert!(repo.last_saved_at().await?.is_some());

    // Saving again overwrites rather than duplicating
    ledger.clear_goal();
    repo.save_snapshot(&ledger.snapshot()).await?;
    let loaded = repo.load_snapshot().await?.expect("Snapshot should exist");
    assert_eq!(loaded.savings_goal, None);
    assert_eq!(loaded.entries.len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_migration_is_idempotent() -> Result<()> {
    let (repo, temp) = test_repo().await?;
    repo.put("theme", "dark").await?;
    repo.migrate().await?;
    drop(repo);

    let url = format!("sqlite:{}", db_path(&temp).display());
    let repo = Repository::init(&url).await?;
    let stored = repo.get("theme").await?.expect("Value should survive");
    assert_eq!(stored.value, "dark");

    Ok(())
}

#[tokio::test]
async fn test_key_value_operations() -> Result<()> {
    let (repo, _temp) = test_repo().await?;

    repo.put("a", "1").await?;
    repo.put("a", "2").await?;
    assert_eq!(repo.get("a").await?.map(|v| v.value), Some("2".to_string()));

    assert!(repo.remove("a").await?);
    assert!(!repo.remove("a").await?);
    assert!(repo.get("a").await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_corrupt_snapshot_is_reported() -> Result<()> {
    let (repo, _temp) = test_repo().await?;
    repo.put(SNAPSHOT_KEY, "{not json").await?;

    let err = repo.load_snapshot().await.unwrap_err();
    assert!(err.to_string().contains("corrupt"));

    Ok(())
}
