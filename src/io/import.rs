use anyhow::{Context, Result};
use std::io::Read;

use crate::application::LedgerService;
use crate::domain::{Ledger, TransactionKind, parse_cents};
use crate::io::export::{SUMMARY_MARKER, SnapshotFile};

/// Result of an import operation
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<ImportError>,
}

/// Error that occurred during import
#[derive(Debug, Clone)]
pub struct ImportError {
    pub line: usize,
    pub field: Option<String>,
    pub error: String,
}

/// Options for import operations
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Parse and validate without saving anything
    pub dry_run: bool,
    /// Replace the ledger instead of merging into it (JSON only)
    pub replace: bool,
}

/// Importer for loading exported data back into the ledger
pub struct Importer<'a> {
    service: &'a mut LedgerService,
}

impl<'a> Importer<'a> {
    pub fn new(service: &'a mut LedgerService) -> Self {
        Self { service }
    }

    /// Import transactions from a CSV file in the export layout.
    /// Reading stops at the summary block; each valid row gets a fresh id.
    pub async fn import_csv<R: Read>(
        &mut self,
        reader: R,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);
        let mut staged = Ledger::new();
        let mut errors = Vec::new();

        for (line_num, result) in csv_reader.records().enumerate() {
            let line = line_num + 2; // +2 for header and 0-indexing

            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    errors.push(ImportError {
                        line,
                        field: None,
                        error: format!("CSV parse error: {}", e),
                    });
                    continue;
                }
            };

            if record.get(0) == Some(SUMMARY_MARKER) {
                break;
            }

            let kind_str = record.get(1).unwrap_or("");
            let description = record.get(2).unwrap_or("");
            let amount_str = record.get(3).unwrap_or("");
            let month = record.get(4).unwrap_or("");

            let Some(kind) = TransactionKind::from_str(kind_str) else {
                errors.push(ImportError {
                    line,
                    field: Some("Type".to_string()),
                    error: format!("Unknown transaction type '{}'", kind_str),
                });
                continue;
            };

            let amount_cents = match parse_cents(amount_str) {
                Ok(a) => a,
                Err(e) => {
                    errors.push(ImportError {
                        line,
                        field: Some("Amount".to_string()),
                        error: format!("Invalid amount: {}", e),
                    });
                    continue;
                }
            };

            if let Err(e) = staged.add_transaction(kind, description, amount_cents, month) {
                errors.push(ImportError {
                    line,
                    field: None,
                    error: e.to_string(),
                });
            }
        }

        let mut result = ImportResult {
            imported: staged.len(),
            skipped: errors.len(),
            errors,
        };

        if !options.dry_run && !staged.is_empty() {
            let merged = self.service.merge(staged.snapshot()).await?;
            result.imported = merged.imported;
        }

        Ok(result)
    }

    /// Import a full JSON snapshot, merging by id or replacing the ledger.
    pub async fn import_full_json<R: Read>(
        &mut self,
        reader: R,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        let file: SnapshotFile =
            serde_json::from_reader(reader).context("Failed to parse JSON snapshot")?;

        // Validate up front so dry runs report the same failures
        let incoming = Ledger::from_snapshot(file.ledger).context("Snapshot is invalid")?;
        let total = incoming.len();

        if options.dry_run {
            let skipped = if options.replace {
                0
            } else {
                incoming
                    .transactions()
                    .iter()
                    .filter(|t| self.service.ledger().get(t.id).is_some())
                    .count()
            };
            return Ok(ImportResult {
                imported: total - skipped,
                skipped,
                errors: Vec::new(),
            });
        }

        if options.replace {
            let imported = self.service.replace_with(incoming.snapshot()).await?;
            return Ok(ImportResult {
                imported,
                ..ImportResult::default()
            });
        }

        let merged = self.service.merge(incoming.snapshot()).await?;
        Ok(ImportResult {
            imported: merged.imported,
            skipped: merged.skipped,
            errors: Vec::new(),
        })
    }
}
