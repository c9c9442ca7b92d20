// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::path::PathBuf;

use anyhow::Result;
use pennywise::application::LedgerService;
use pennywise::domain::TransactionKind::{self, Expense, Income};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let service = LedgerService::open(db_path(&temp_dir).to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Reopen the database behind a test service, as a fresh process would
pub async fn reopen(temp_dir: &TempDir) -> Result<LedgerService> {
    Ok(LedgerService::open(db_path(temp_dir).to_str().unwrap()).await?)
}

pub fn db_path(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("test.db")
}

/// The reference data set: two months of income and five expense categories
pub const REFERENCE_ENTRIES: [(TransactionKind, &str, i64, &str); 8] = [
    (Income, "Salary", 5_000_000, "2024-01"),
    (Income, "Freelance Work", 1_500_000, "2024-01"),
    (Expense, "Rent", 2_000_000, "2024-01"),
    (Expense, "Groceries", 800_000, "2024-01"),
    (Expense, "Transportation", 300_000, "2024-01"),
    (Expense, "Entertainment", 500_000, "2024-01"),
    (Expense, "Utilities", 200_000, "2024-01"),
    (Income, "Salary", 5_000_000, "2024-02"),
];

/// Record the reference entries and a goal of 30000.00
pub async fn seed_reference(service: &mut LedgerService) -> Result<()> {
    for (kind, description, amount, month) in REFERENCE_ENTRIES {
        service
            .add_transaction(kind, description, amount, month)
            .await?;
    }
    service.set_goal(3_000_000).await?;
    Ok(())
}
