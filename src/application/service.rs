use crate::domain::{
    Cents, HealthReport, Ledger, LedgerSnapshot, Transaction, TransactionId, TransactionKind,
    financial_health,
};
use crate::storage::Repository;

use super::{AppError, MonthlyReport, SummaryReport, TipsReport};

/// Application service providing high-level operations on the ledger.
///
/// Owns the in-memory [`Ledger`] and persists a snapshot after every
/// operation that changed it. This is the primary interface for the CLI.
pub struct LedgerService {
    repo: Repository,
    ledger: Ledger,
    saved_revision: u64,
}

/// Outcome of merging transactions from another snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeResult {
    pub imported: usize,
    pub skipped: usize,
    pub goal_updated: bool,
}

impl LedgerService {
    /// Create a service over an already-opened repository and ledger.
    pub fn new(repo: Repository, ledger: Ledger) -> Self {
        let saved_revision = ledger.revision();
        Self {
            repo,
            ledger,
            saved_revision,
        }
    }

    /// Open the database at the given path, creating it if needed,
    /// and restore the ledger from the stored snapshot.
    pub async fn open(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;

        let ledger = match repo.load_snapshot().await? {
            Some(snapshot) => Ledger::from_snapshot(snapshot).map_err(AppError::CorruptSnapshot)?,
            None => Ledger::new(),
        };
        tracing::info!(
            path = database_path,
            transactions = ledger.len(),
            "opened ledger"
        );

        Ok(Self::new(repo, ledger))
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Save the snapshot if the ledger changed since the last save.
    async fn persist(&mut self) -> Result<(), AppError> {
        if self.ledger.revision() == self.saved_revision {
            return Ok(());
        }
        self.repo.save_snapshot(&self.ledger.snapshot()).await?;
        self.saved_revision = self.ledger.revision();
        Ok(())
    }

    // ========================
    // Transaction operations
    // ========================

    /// Record a new transaction.
    pub async fn add_transaction(
        &mut self,
        kind: TransactionKind,
        description: &str,
        amount_cents: Cents,
        month: &str,
    ) -> Result<Transaction, AppError> {
        let transaction = self
            .ledger
            .add_transaction(kind, description, amount_cents, month)?;
        self.persist().await?;

        tracing::info!(
            id = %transaction.id,
            kind = %transaction.kind,
            amount_cents = transaction.amount_cents,
            month = %transaction.month,
            "recorded transaction"
        );
        Ok(transaction)
    }

    /// Delete a transaction by id. A missing id is not an error.
    pub async fn delete_transaction(
        &mut self,
        id: TransactionId,
    ) -> Result<Option<Transaction>, AppError> {
        let removed = self.ledger.delete_transaction(id);
        match &removed {
            Some(transaction) => {
                self.persist().await?;
                tracing::info!(id = %transaction.id, "deleted transaction");
            }
            None => tracing::warn!(id = %id, "no transaction to delete"),
        }
        Ok(removed)
    }

    /// Resolve a full id or a unique id prefix to a transaction id.
    pub fn resolve_id(&self, input: &str) -> Result<TransactionId, AppError> {
        let needle = input.trim().to_lowercase();
        if needle.is_empty() {
            return Err(AppError::TransactionNotFound(input.to_string()));
        }

        let mut matches = self
            .ledger
            .transactions()
            .iter()
            .filter(|t| t.id.to_string().starts_with(&needle));

        match (matches.next(), matches.next()) {
            (Some(t), None) => Ok(t.id),
            (Some(_), Some(_)) => Err(AppError::AmbiguousTransactionId(input.to_string())),
            (None, _) => Err(AppError::TransactionNotFound(input.to_string())),
        }
    }

    // ========================
    // Goal operations
    // ========================

    /// Replace the savings goal.
    pub async fn set_goal(&mut self, amount_cents: Cents) -> Result<(), AppError> {
        self.ledger.set_goal(amount_cents)?;
        self.persist().await?;
        tracing::info!(amount_cents, "savings goal set");
        Ok(())
    }

    /// Remove the savings goal, returning the previous one.
    pub async fn clear_goal(&mut self) -> Result<Option<Cents>, AppError> {
        let previous = self.ledger.clear_goal();
        self.persist().await?;
        if previous.is_some() {
            tracing::info!("savings goal cleared");
        }
        Ok(previous)
    }

    // ========================
    // Snapshot operations
    // ========================

    /// Replace the whole ledger with the given snapshot.
    pub async fn replace_with(&mut self, snapshot: LedgerSnapshot) -> Result<usize, AppError> {
        let ledger = Ledger::from_snapshot(snapshot)?;
        let count = ledger.len();
        self.ledger = ledger;

        // A restored ledger restarts its revision count, so save unconditionally
        self.repo.save_snapshot(&self.ledger.snapshot()).await?;
        self.saved_revision = self.ledger.revision();

        tracing::info!(transactions = count, "replaced ledger contents");
        Ok(count)
    }

    /// Add transactions from the snapshot whose ids are not present yet.
    /// The snapshot's goal is applied when the ledger has none.
    pub async fn merge(&mut self, snapshot: LedgerSnapshot) -> Result<MergeResult, AppError> {
        // Validate everything before touching the ledger
        let incoming = Ledger::from_snapshot(snapshot)?;

        let mut result = MergeResult::default();
        for transaction in incoming.transactions() {
            if self.ledger.get(transaction.id).is_some() {
                result.skipped += 1;
                continue;
            }
            self.ledger.insert(transaction.clone())?;
            result.imported += 1;
        }

        if let (None, Some(goal)) = (self.ledger.goal(), incoming.goal()) {
            self.ledger.set_goal(goal)?;
            result.goal_updated = true;
        }

        self.persist().await?;
        tracing::info!(
            imported = result.imported,
            skipped = result.skipped,
            "merged snapshot"
        );
        Ok(result)
    }

    // ========================
    // Reports
    // ========================

    pub fn summary(&self) -> SummaryReport {
        SummaryReport::from_ledger(&self.ledger)
    }

    pub fn monthly_report(&self) -> MonthlyReport {
        MonthlyReport::from_ledger(&self.ledger)
    }

    pub fn tips(&self) -> TipsReport {
        TipsReport::from_ledger(&self.ledger)
    }

    pub fn health(&self) -> HealthReport {
        financial_health(&self.ledger)
    }
}
