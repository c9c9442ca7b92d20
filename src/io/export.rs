use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::domain::{Ledger, LedgerSnapshot, format_cents};

/// Header row of the CSV export
pub const CSV_HEADER: [&str; 5] = ["Date", "Type", "Description", "Amount", "Month"];

/// Line separating transactions from the summary block
pub const SUMMARY_MARKER: &str = "--- SUMMARY ---";

/// Full ledger export with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotFile {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub exported_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub ledger: LedgerSnapshot,
}

/// Exporter for converting ledger data to files
pub struct Exporter<'a> {
    ledger: &'a Ledger,
}

impl<'a> Exporter<'a> {
    pub fn new(ledger: &'a Ledger) -> Self {
        Self { ledger }
    }

    /// Export transactions plus a summary block as CSV.
    ///
    /// Every row carries `exported_on` in the Date column. Commas in
    /// descriptions are replaced with semicolons.
    pub fn export_csv<W: Write>(&self, writer: W, exported_on: NaiveDate) -> Result<usize> {
        let mut csv_writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(writer);
        let date = exported_on.format("%Y-%m-%d").to_string();

        csv_writer.write_record(CSV_HEADER)?;

        let mut count = 0;
        for transaction in self.ledger.transactions() {
            let description = transaction.description.replace(',', ";");
            let amount = format_cents(transaction.amount_cents);
            let month = transaction.month.to_string();
            csv_writer.write_record([
                date.as_str(),
                transaction.kind.as_str(),
                description.as_str(),
                amount.as_str(),
                month.as_str(),
            ])?;
            count += 1;
        }

        // The blank line and marker are not CSV records
        let mut writer = csv_writer.into_inner().map_err(|e| e.into_error())?;
        writeln!(writer)?;
        writeln!(writer, "{}", SUMMARY_MARKER)?;
        let mut csv_writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(writer);

        let mut summary = vec![
            ("Total Income", self.ledger.total_income()),
            ("Total Expenses", self.ledger.total_expenses()),
            ("Net Savings", self.ledger.net_savings()),
        ];
        if let Some(goal) = self.ledger.goal() {
            summary.push(("Savings Goal", goal));
        }
        for (label, amount) in summary {
            csv_writer.write_record([label, format_cents(amount).as_str()])?;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export the full ledger as a JSON snapshot
    pub fn export_full_json<W: Write>(&self, mut writer: W) -> Result<SnapshotFile> {
        let snapshot = SnapshotFile {
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
            exported_at: Some(Utc::now()),
            ledger: self.ledger.snapshot(),
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}
