mod common;

use std::io::Cursor;

use anyhow::Result;
use chrono::NaiveDate;
use common::{reopen, seed_reference, test_service};
use pennywise::domain::TransactionKind;
use pennywise::io::{Exporter, ImportOptions, Importer, SnapshotFile};

fn export_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

#[tokio::test]
async fn test_csv_export_of_reference_ledger() -> Result<()> {
    let (mut service, _temp) = test_service().await?;
    seed_reference(&mut service).await?;

    let mut buffer = Vec::new();
    let count = Exporter::new(service.ledger()).export_csv(&mut buffer, export_date())?;
    assert_eq!(count, 8);

    let csv = String::from_utf8(buffer)?;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "Date,Type,Description,Amount,Month");
    assert_eq!(lines[1], "2024-03-01,income,Salary,50000.00,2024-01");
    assert_eq!(lines[2], "2024-03-01,income,Freelance Work,15000.00,2024-01");
    assert_eq!(lines[9], "");
    assert_eq!(lines[10], "--- SUMMARY ---");
    assert_eq!(lines[11], "Total Income,115000.00");
    assert_eq!(lines[12], "Total Expenses,38000.00");
    assert_eq!(lines[13], "Net Savings,77000.00");
    assert_eq!(lines[14], "Savings Goal,30000.00");
    assert_eq!(lines.len(), 15);

    Ok(())
}

#[tokio::test]
async fn test_csv_roundtrip_into_empty_ledger() -> Result<()> {
    let (mut source, _source_temp) = test_service().await?;
    seed_reference(&mut source).await?;
    source
        .add_transaction(TransactionKind::Expense, "Food, drinks", 1_250, "2024-02")
        .await?;

    let mut buffer = Vec::new();
    Exporter::new(source.ledger()).export_csv(&mut buffer, export_date())?;

    let (mut target, temp) = test_service().await?;
    let result = Importer::new(&mut target)
        .import_csv(Cursor::new(buffer), ImportOptions::default())
        .await?;
    assert_eq!(result.imported, 9);
    assert!(result.errors.is_empty());

    let ledger = target.ledger();
    assert_eq!(ledger.total_income(), source.ledger().total_income());
    assert_eq!(ledger.total_expenses(), source.ledger().total_expenses());
    assert_eq!(ledger.monthly_breakdown(), source.ledger().monthly_breakdown());
    // Commas were replaced on export
    assert!(ledger
        .transactions()
        .iter()
        .any(|t| t.description == "Food; drinks"));
    // The goal lives in the summary block and is not imported
    assert_eq!(ledger.goal(), None);
    drop(target);

    assert_eq!(reopen(&temp).await?.ledger().len(), 9);

    Ok(())
}

#[tokio::test]
async fn test_csv_import_reports_bad_rows() -> Result<()> {
    let (mut service, _temp) = test_service().await?;
    let csv = "\
Date,Type,Description,Amount,Month
2024-03-01,income,Salary,1000.00,2024-01
2024-03-01,gift,Birthday,50.00,2024-01
2024-03-01,expense,Rent,abc,2024-01
2024-03-01,expense,Rent,0,2024-01
2024-03-01,expense,,10.00,2024-01
2024-03-01,expense,Rent,500.00,2024-13
2024-03-01,expense,Rent,500.00,2024-01
";

    let result = Importer::new(&mut service)
        .import_csv(Cursor::new(csv), ImportOptions::default())
        .await?;

    assert_eq!(result.imported, 2);
    assert_eq!(result.skipped, 5);
    let lines: Vec<usize> = result.errors.iter().map(|e| e.line).collect();
    assert_eq!(lines, vec![3, 4, 5, 6, 7]);
    assert_eq!(result.errors[0].field.as_deref(), Some("Type"));
    assert_eq!(result.errors[1].field.as_deref(), Some("Amount"));
    assert_eq!(service.ledger().net_savings(), 50_000);

    Ok(())
}

#[tokio::test]
async fn test_csv_dry_run_changes_nothing() -> Result<()> {
    let (mut service, _temp) = test_service().await?;
    let csv = "Date,Type,Description,Amount,Month\n2024-03-01,income,Salary,10.00,2024-01\n";

    let result = Importer::new(&mut service)
        .import_csv(
            Cursor::new(csv),
            ImportOptions {
                dry_run: true,
                ..ImportOptions::default()
            },
        )
        .await?;

    assert_eq!(result.imported, 1);
    assert!(service.ledger().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_full_json_merge_and_replace() -> Result<()> {
    let (mut source, _source_temp) = test_service().await?;
    seed_reference(&mut source).await?;

    let mut buffer = Vec::new();
    let exported = Exporter::new(source.ledger()).export_full_json(&mut buffer)?;
    assert_eq!(exported.ledger.entries.len(), 8);

    let (mut target, temp) = test_service().await?;
    target
        .add_transaction(TransactionKind::Expense, "Coffee", 300, "2024-01")
        .await?;

    // Merge keeps existing entries and adopts the goal
    let result = Importer::new(&mut target)
        .import_full_json(Cursor::new(buffer.clone()), ImportOptions::default())
        .await?;
    assert_eq!(result.imported, 8);
    assert_eq!(target.ledger().len(), 9);
    assert_eq!(target.ledger().goal(), Some(3_000_000));

    // Merging the same file again skips every entry
    let result = Importer::new(&mut target)
        .import_full_json(Cursor::new(buffer.clone()), ImportOptions::default())
        .await?;
    assert_eq!(result.imported, 0);
    assert_eq!(result.skipped, 8);

    // Replace drops the coffee
    let result = Importer::new(&mut target)
        .import_full_json(
            Cursor::new(buffer),
            ImportOptions {
                replace: true,
                ..ImportOptions::default()
            },
        )
        .await?;
    assert_eq!(result.imported, 8);
    assert_eq!(target.ledger().transactions(), source.ledger().transactions());
    drop(target);

    let reopened = reopen(&temp).await?;
    assert_eq!(reopened.ledger().len(), 8);
    assert_eq!(reopened.ledger().net_savings(), 7_700_000);

    Ok(())
}

#[tokio::test]
async fn test_full_json_accepts_bare_snapshot() -> Result<()> {
    let (mut service, _temp) = test_service().await?;
    let json = r#"{
        "entries": [
            {
                "id": "0b6f8f5e-5a7c-4f57-9d55-2b1d7a9b1c01",
                "kind": "income",
                "description": "Salary",
                "amount_cents": 100000,
                "month": "2024-05"
            }
        ],
        "savings_goal": null
    }"#;

    let file: SnapshotFile = serde_json::from_str(json)?;
    assert!(file.version.is_none());

    let result = Importer::new(&mut service)
        .import_full_json(Cursor::new(json), ImportOptions::default())
        .await?;
    assert_eq!(result.imported, 1);
    assert_eq!(service.ledger().total_income(), 100_000);

    Ok(())
}

#[tokio::test]
async fn test_full_json_rejects_invalid_entries() -> Result<()> {
    let (mut service, _temp) = test_service().await?;
    let json = r#"{
        "entries": [
            {
                "id": "0b6f8f5e-5a7c-4f57-9d55-2b1d7a9b1c01",
                "kind": "expense",
                "description": "Rent",
                "amount_cents": -5,
                "month": "2024-05"
            }
        ],
        "savings_goal": null
    }"#;

    let result = Importer::new(&mut service)
        .import_full_json(Cursor::new(json), ImportOptions::default())
        .await;
    assert!(result.is_err());
    assert!(service.ledger().is_empty());

    Ok(())
}
