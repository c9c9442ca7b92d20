use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::application::{AppError, LedgerService, SummaryReport};
use crate::domain::{
    GoalProgress, Month, MonthlySummary, Transaction, TransactionKind, format_cents, parse_cents,
};

/// Pennywise - Personal Budget Ledger
#[derive(Parser)]
#[command(name = "pennywise")]
#[command(about = "Track income and expenses by month, set a savings goal, and get tips")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "PENNYWISE_DB", default_value = "pennywise.db")]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record an income or expense
    Add {
        /// Transaction type: income, expense
        kind: String,

        /// Amount (e.g., "50.00" or "50")
        amount: String,

        /// What the money was for; expenses are grouped by this text
        #[arg(short, long)]
        description: String,

        /// Month the transaction belongs to (YYYY-MM, defaults to the current month)
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Delete a transaction by id (a unique prefix is enough)
    Delete {
        /// Transaction ID
        id: String,
    },

    /// List transactions, newest month first
    List {
        /// Only show this month (YYYY-MM)
        #[arg(long)]
        month: Option<String>,

        /// Only show this type: income, expense
        #[arg(short = 't', long = "type")]
        kind: Option<String>,

        /// Maximum number of transactions to show
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Savings goal commands
    #[command(subcommand)]
    Goal(GoalCommands),

    /// Show totals, savings rate and goal progress
    Summary {
        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Show income and expenses per month
    Monthly {
        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Show personalized saving tips
    Tips {
        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Show a financial health score with recommendations
    Health {
        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Export data to CSV or JSON
    Export {
        /// What to export: csv, full
        export_type: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Import data exported earlier
    Import {
        /// What to import: csv, full
        import_type: String,

        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,

        /// Replace the whole ledger instead of merging (full only)
        #[arg(long)]
        replace: bool,

        /// Preview without importing
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Subcommand)]
pub enum GoalCommands {
    /// Set the savings goal, replacing any previous one
    Set {
        /// Goal amount (e.g., "30000")
        amount: String,
    },

    /// Show the savings goal and progress
    Show,

    /// Remove the savings goal
    Clear,
}

/// Install the global tracing subscriber. `RUST_LOG` takes precedence.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "pennywise=debug" } else { "pennywise=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let mut service = LedgerService::open(&self.database)
            .await
            .with_context(|| format!("Failed to open ledger at {}", self.database))?;

        match self.command {
            Commands::Add {
                kind,
                amount,
                description,
                month,
            } => {
                let kind = TransactionKind::from_str(&kind).ok_or_else(|| {
                    anyhow::anyhow!("Invalid type '{}'. Valid types: income, expense", kind)
                })?;
                let amount_cents =
                    parse_cents(&amount).context("Invalid amount format. Use '50.00' or '50'")?;
                let month =
                    month.unwrap_or_else(|| Month::from_date(Local::now().date_naive()).to_string());

                let transaction = service
                    .add_transaction(kind, &description, amount_cents, &month)
                    .await?;

                println!(
                    "Recorded {}: {} {} in {} ({})",
                    transaction.kind,
                    transaction.description,
                    format_cents(transaction.amount_cents),
                    transaction.month,
                    transaction.id
                );
            }

            Commands::Delete { id } => {
                let id = match service.resolve_id(&id) {
                    Ok(id) => id,
                    Err(AppError::TransactionNotFound(_)) => {
                        println!("No transaction matches '{}', nothing deleted", id);
                        return Ok(());
                    }
                    Err(e) => return Err(e.into()),
                };

                if let Some(removed) = service.delete_transaction(id).await? {
                    println!(
                        "Deleted {} '{}' {} ({})",
                        removed.kind,
                        removed.description,
                        format_cents(removed.amount_cents),
                        removed.id
                    );
                }
            }

            Commands::List {
                month,
                kind,
                limit,
                format,
            } => {
                run_list_command(&service, month, kind, limit, &format)?;
            }

            Commands::Goal(goal_cmd) => {
                run_goal_command(&mut service, goal_cmd).await?;
            }

            Commands::Summary { format } => {
                let report = service.summary();
                match format.as_str() {
                    "json" => println!("{}", serde_json::to_string_pretty(&report)?),
                    _ => print_summary(&report),
                }
            }

            Commands::Monthly { format } => {
                run_monthly_command(&service, &format)?;
            }

            Commands::Tips { format } => {
                let report = service.tips();
                match format.as_str() {
                    "json" => println!("{}", serde_json::to_string_pretty(&report)?),
                    _ => {
                        println!("Saving Tips");
                        println!();
                        for (i, entry) in report.tips.iter().enumerate() {
                            println!("  {}. {}", i + 1, entry.message);
                        }
                    }
                }
            }

            Commands::Health { format } => {
                let report = service.health();
                match format.as_str() {
                    "json" => println!("{}", serde_json::to_string_pretty(&report)?),
                    _ => {
                        println!("Financial Health");
                        println!();
                        println!("Score:          {:>6}/100", report.score);
                        println!("Level:          {:>10}", report.level);
                        println!("Savings rate:   {:>9.1}%", report.savings_rate);
                        if !report.recommendations.is_empty() {
                            println!();
                            println!("Recommendations:");
                            for rec in &report.recommendations {
                                println!("  - {}", rec);
                            }
                        }
                    }
                }
            }

            Commands::Export {
                export_type,
                output,
            } => {
                run_export_command(&service, &export_type, output.as_deref())?;
            }

            Commands::Import {
                import_type,
                input,
                replace,
                dry_run,
            } => {
                run_import_command(
                    &mut service,
                    &import_type,
                    input.as_deref(),
                    replace,
                    dry_run,
                )
                .await?;
            }
        }

        Ok(())
    }
}

fn run_list_command(
    service: &LedgerService,
    month: Option<String>,
    kind: Option<String>,
    limit: Option<usize>,
    format: &str,
) -> Result<()> {
    let month: Option<Month> = month
        .map(|m| m.parse())
        .transpose()
        .context("Invalid month. Use YYYY-MM")?;
    let kind = kind
        .map(|k| {
            TransactionKind::from_str(&k)
                .ok_or_else(|| anyhow::anyhow!("Invalid type '{}'. Valid types: income, expense", k))
        })
        .transpose()?;

    let transactions: Vec<&Transaction> = service
        .ledger()
        .sorted_for_display()
        .into_iter()
        .filter(|t| month.is_none_or(|m| t.month == m))
        .filter(|t| kind.is_none_or(|k| t.kind == k))
        .take(limit.unwrap_or(usize::MAX))
        .collect();

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&transactions)?);
        return Ok(());
    }

    if transactions.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }

    println!(
        "{:<10} {:<8} {:<8} {:<30} {:>12}",
        "ID", "MONTH", "TYPE", "DESCRIPTION", "AMOUNT"
    );
    println!("{}", "-".repeat(72));

    for t in &transactions {
        let amount = match t.kind {
            TransactionKind::Income => format!("+{}", format_cents(t.amount_cents)),
            TransactionKind::Expense => format!("-{}", format_cents(t.amount_cents)),
        };
        println!(
            "{:<10} {:<8} {:<8} {:<30} {:>12}",
            &t.id.to_string()[..8],
            t.month.to_string(),
            t.kind.as_str(),
            truncate(&t.description, 30),
            amount
        );
    }

    Ok(())
}

async fn run_goal_command(service: &mut LedgerService, cmd: GoalCommands) -> Result<()> {
    match cmd {
        GoalCommands::Set { amount } => {
            let amount_cents =
                parse_cents(&amount).context("Invalid amount format. Use '50.00' or '50'")?;
            service.set_goal(amount_cents).await?;
            println!("Savings goal set to {}", format_cents(amount_cents));
        }

        GoalCommands::Show => {
            print_goal(&service.summary());
        }

        GoalCommands::Clear => match service.clear_goal().await? {
            Some(previous) => println!("Removed savings goal of {}", format_cents(previous)),
            None => println!("No savings goal set"),
        },
    }
    Ok(())
}

fn run_monthly_command(service: &LedgerService, format: &str) -> Result<()> {
    let report = service.monthly_report();

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        "csv" => {
            for line in monthly_csv_lines(&report.months) {
                println!("{}", line);
            }
        }
        _ => {
            println!("Monthly Breakdown");
            println!();
            println!(
                "{:<8} {:>14} {:>14} {:>14}",
                "MONTH", "INCOME", "EXPENSE", "NET"
            );
            println!("{}", "-".repeat(53));

            for m in &report.months {
                println!(
                    "{:<8} {:>14} {:>14} {:>14}",
                    m.month.to_string(),
                    format_cents(m.income),
                    format_cents(m.expense),
                    format_cents(m.net)
                );
            }

            println!("{}", "-".repeat(53));
            println!(
                "{:<8} {:>14} {:>14} {:>14}",
                "TOTAL",
                format_cents(report.total_income),
                format_cents(report.total_expenses),
                format_cents(report.total_income - report.total_expenses)
            );
        }
    }

    Ok(())
}

fn print_summary(report: &SummaryReport) {
    println!("Summary ({} transactions)", report.transaction_count);
    println!();
    println!("Total Income:   {:>15}", format_cents(report.total_income));
    println!("Total Expenses: {:>15}", format_cents(report.total_expenses));
    println!("{}", "-".repeat(31));
    println!("Net Savings:    {:>15}", format_cents(report.net_savings));

    if let (Some(rate), Some(band)) = (report.savings_rate, report.savings_rate_band) {
        println!("Savings Rate:   {:>14.1}% ({})", rate, band);
    }

    if let Some(top) = &report.top_expense {
        println!(
            "Top Expense:    {} ({})",
            top.description,
            format_cents(top.total)
        );
    }

    println!();
    print_goal(report);
}

fn print_goal(report: &SummaryReport) {
    match report.goal_progress {
        GoalProgress::NoGoal => println!("No savings goal set"),
        GoalProgress::Tracking {
            goal,
            percent,
            achieved,
            remaining,
        } => {
            println!("Savings Goal:   {:>15}", format_cents(goal));
            println!("Progress:       {:>14.1}%", percent);
            if achieved {
                println!("Goal achieved!");
            } else {
                println!("Remaining:      {:>15}", format_cents(remaining));
                if let Some(months) = report.months_to_goal {
                    println!("Estimated:      {:>8} month(s) at the current pace", months);
                }
            }
        }
    }
}

fn run_export_command(
    service: &LedgerService,
    export_type: &str,
    output: Option<&str>,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{Write, stdout};

    let exporter = Exporter::new(service.ledger());

    // Determine output writer
    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match export_type {
        "csv" => {
            let count = exporter.export_csv(writer, Local::now().date_naive())?;
            if output.is_some() {
                eprintln!("Exported {} transactions", count);
            }
        }
        "full" => {
            let snapshot = exporter.export_full_json(writer)?;
            if output.is_some() {
                eprintln!(
                    "Exported full ledger: {} transactions, goal {}",
                    snapshot.ledger.entries.len(),
                    snapshot
                        .ledger
                        .savings_goal
                        .map(format_cents)
                        .unwrap_or_else(|| "not set".to_string())
                );
            }
        }
        _ => {
            anyhow::bail!(
                "Invalid export type '{}'. Valid types: csv, full",
                export_type
            );
        }
    }

    Ok(())
}

async fn run_import_command(
    service: &mut LedgerService,
    import_type: &str,
    input: Option<&str>,
    replace: bool,
    dry_run: bool,
) -> Result<()> {
    use crate::io::{ImportOptions, Importer};
    use std::fs::File;
    use std::io::{Read, stdin};

    // Determine input reader
    let reader: Box<dyn Read> = match input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("Failed to open input file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdin()),
    };

    let options = ImportOptions { dry_run, replace };
    let mut importer = Importer::new(service);

    let result = match import_type {
        "csv" => importer.import_csv(reader, options).await?,
        "full" => importer.import_full_json(reader, options).await?,
        _ => {
            anyhow::bail!(
                "Invalid import type '{}'. Valid types: csv, full",
                import_type
            );
        }
    };

    if dry_run {
        println!("Validation successful");
    } else {
        println!("Import complete");
    }
    println!("  Imported: {}", result.imported);
    println!("  Skipped:  {}", result.skipped);
    println!("  Errors:   {}", result.errors.len());

    if !result.errors.is_empty() {
        println!("\nErrors:");
        for error in result.errors.iter().take(10) {
            println!(
                "  Line {}: {}",
                error.line,
                error
                    .field
                    .as_ref()
                    .map(|f| format!("{}: ", f))
                    .unwrap_or_default()
                    + &error.error
            );
        }
        if result.errors.len() > 10 {
            println!("  ... and {} more errors", result.errors.len() - 10);
        }
    }

    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

fn monthly_csv_lines(months: &[MonthlySummary]) -> Vec<String> {
    let mut lines = vec!["month,income,expense,net".to_string()];
    lines.extend(months.iter().map(|m| {
        format!(
            "{},{},{},{}",
            m.month,
            format_cents(m.income),
            format_cents(m.expense),
            format_cents(m.net)
        )
    }));
    lines
}
