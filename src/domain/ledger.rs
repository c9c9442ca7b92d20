use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    percentage, CategoryStats, CategoryTotal, Cents, GoalProgress, MAX_AMOUNT, Month,
    MonthlySummary, SavingsRateBand, Transaction, TransactionId, TransactionKind, UNIT,
};

/// Rejected user input. Nothing is changed when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Description must not be empty")]
    EmptyDescription,

    #[error("Amount must be positive, got {0} cents")]
    NonPositiveAmount(Cents),

    #[error("Amount is too large, got {0} cents")]
    AmountTooLarge(Cents),

    #[error("Month is required")]
    MissingMonth,

    #[error("Invalid month '{0}', expected YYYY-MM")]
    InvalidMonth(String),

    #[error("Savings goal must be positive, got {0} cents")]
    NonPositiveGoal(Cents),

    #[error("Duplicate transaction id: {0}")]
    DuplicateId(TransactionId),
}

/// The persisted shape of a ledger: every transaction plus the goal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub entries: Vec<Transaction>,
    pub savings_goal: Option<Cents>,
}

/// All transactions in insertion order plus the optional savings goal.
///
/// The ledger never performs I/O. Every state change bumps [`Ledger::revision`],
/// which the owner uses to decide when to persist.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    entries: Vec<Transaction>,
    savings_goal: Option<Cents>,
    revision: u64,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a ledger from a snapshot, re-checking every entry.
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Result<Self, ValidationError> {
        let mut seen = HashSet::new();
        for entry in &snapshot.entries {
            validate_description(&entry.description)?;
            validate_amount(entry.amount_cents)?;
            if !seen.insert(entry.id) {
                return Err(ValidationError::DuplicateId(entry.id));
            }
        }
        if let Some(goal) = snapshot.savings_goal {
            validate_goal(goal)?;
        }

        Ok(Self {
            entries: snapshot.entries,
            savings_goal: snapshot.savings_goal,
            revision: 0,
        })
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            entries: self.entries.clone(),
            savings_goal: self.savings_goal,
        }
    }

    /// Counter bumped on every state change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: TransactionId) -> Option<&Transaction> {
        self.entries.iter().find(|t| t.id == id)
    }

    pub fn goal(&self) -> Option<Cents> {
        self.savings_goal
    }

    // ========================
    // Mutations
    // ========================

    /// Record a new transaction and return it.
    pub fn add_transaction(
        &mut self,
        kind: TransactionKind,
        description: &str,
        amount_cents: Cents,
        month: &str,
    ) -> Result<Transaction, ValidationError> {
        let description = description.trim();
        validate_description(description)?;
        validate_amount(amount_cents)?;
        let month = parse_month(month)?;

        let transaction = Transaction::new(kind, description.to_string(), amount_cents, month);
        self.entries.push(transaction.clone());
        self.revision += 1;
        Ok(transaction)
    }

    /// Insert an already-built transaction, e.g. from an import.
    pub fn insert(&mut self, transaction: Transaction) -> Result<(), ValidationError> {
        validate_description(&transaction.description)?;
        validate_amount(transaction.amount_cents)?;
        if self.get(transaction.id).is_some() {
            return Err(ValidationError::DuplicateId(transaction.id));
        }
        self.entries.push(transaction);
        self.revision += 1;
        Ok(())
    }

    /// Remove a transaction by id. Returns `None` if there was nothing to remove.
    pub fn delete_transaction(&mut self, id: TransactionId) -> Option<Transaction> {
        let index = self.entries.iter().position(|t| t.id == id)?;
        self.revision += 1;
        Some(self.entries.remove(index))
    }

    /// Replace the savings goal.
    pub fn set_goal(&mut self, amount_cents: Cents) -> Result<(), ValidationError> {
        validate_goal(amount_cents)?;
        self.savings_goal = Some(amount_cents);
        self.revision += 1;
        Ok(())
    }

    /// Remove the savings goal. Returns the previous goal, if any.
    pub fn clear_goal(&mut self) -> Option<Cents> {
        let previous = self.savings_goal.take();
        if previous.is_some() {
            self.revision += 1;
        }
        previous
    }

    // ========================
    // Derivations
    // ========================

    pub fn total_income(&self) -> Cents {
        self.total_of(TransactionKind::Income)
    }

    pub fn total_expenses(&self) -> Cents {
        self.total_of(TransactionKind::Expense)
    }

    pub fn net_savings(&self) -> Cents {
        self.total_income() - self.total_expenses()
    }

    fn total_of(&self, kind: TransactionKind) -> Cents {
        self.entries
            .iter()
            .filter(|t| t.kind == kind)
            .map(|t| t.amount_cents)
            .sum()
    }

    /// Per-month income and expense, oldest month first.
    /// Months without transactions are left out.
    pub fn monthly_breakdown(&self) -> Vec<MonthlySummary> {
        let mut months: BTreeMap<Month, (Cents, Cents)> = BTreeMap::new();
        for t in &self.entries {
            let (income, expense) = months.entry(t.month).or_insert((0, 0));
            match t.kind {
                TransactionKind::Income => *income += t.amount_cents,
                TransactionKind::Expense => *expense += t.amount_cents,
            }
        }

        months
            .into_iter()
            .map(|(month, (income, expense))| MonthlySummary {
                month,
                income,
                expense,
                net: income - expense,
            })
            .collect()
    }

    /// Distinct months that have at least one transaction.
    pub fn distinct_months(&self) -> usize {
        self.entries
            .iter()
            .map(|t| t.month)
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn goal_progress(&self) -> GoalProgress {
        let Some(goal) = self.savings_goal else {
            return GoalProgress::NoGoal;
        };
        let net = self.net_savings();

        GoalProgress::Tracking {
            goal,
            percent: percentage(net, goal).clamp(0.0, 100.0),
            achieved: net >= goal,
            remaining: (goal - net).max(0),
        }
    }

    /// Expenses grouped by description, largest total first.
    /// Equal totals keep the order in which the description was first recorded.
    pub fn expense_categories(&self) -> Vec<CategoryStats> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut stats: Vec<CategoryStats> = Vec::new();

        for t in self.entries.iter().filter(|t| t.is_expense()) {
            let slot = *index.entry(t.description.as_str()).or_insert_with(|| {
                stats.push(CategoryStats {
                    description: t.description.clone(),
                    total: 0,
                    count: 0,
                    average: 0,
                });
                stats.len() - 1
            });
            stats[slot].total += t.amount_cents;
            stats[slot].count += 1;
        }

        for s in &mut stats {
            s.average = s.total / s.count as Cents;
        }
        // Stable sort keeps first-recorded order for ties
        stats.sort_by(|a, b| b.total.cmp(&a.total));
        stats
    }

    /// The expense description with the highest summed amount.
    pub fn top_expense_category(&self) -> Option<CategoryTotal> {
        self.expense_categories()
            .into_iter()
            .next()
            .map(|s| CategoryTotal {
                description: s.description,
                total: s.total,
            })
    }

    /// Net savings as a percentage of income, `None` without income.
    pub fn savings_rate(&self) -> Option<f64> {
        let income = self.total_income();
        if income == 0 {
            return None;
        }
        Some(percentage(self.net_savings(), income))
    }

    pub fn savings_rate_band(&self) -> Option<SavingsRateBand> {
        self.savings_rate().map(SavingsRateBand::classify)
    }

    /// Rough number of months until the goal is reached at the current pace.
    ///
    /// The pace is net savings spread over `transaction count / 12` months
    /// (at least one), and never less than one unit per month. Transaction
    /// count is not elapsed time, so treat the result as a rough hint.
    /// Returns `None` without a goal and `Some(0)` once it is reached.
    pub fn estimated_months_to_goal(&self) -> Option<u64> {
        let goal = self.savings_goal?;
        let net = self.net_savings();
        let remaining = goal - net;
        if remaining <= 0 {
            return Some(0);
        }

        let elapsed_months = (self.entries.len() as f64 / 12.0).max(1.0);
        let monthly_rate = (net as f64 / elapsed_months).max(UNIT as f64);
        Some((remaining as f64 / monthly_rate).ceil() as u64)
    }

    /// Transactions ordered for display: newest month first, then by kind name.
    pub fn sorted_for_display(&self) -> Vec<&Transaction> {
        let mut sorted: Vec<&Transaction> = self.entries.iter().collect();
        sorted.sort_by(|a, b| b.month.cmp(&a.month).then(a.kind.cmp(&b.kind)));
        sorted
    }
}

fn validate_description(description: &str) -> Result<(), ValidationError> {
    if description.trim().is_empty() {
        return Err(ValidationError::EmptyDescription);
    }
    Ok(())
}

fn validate_amount(amount_cents: Cents) -> Result<(), ValidationError> {
    if amount_cents <= 0 {
        return Err(ValidationError::NonPositiveAmount(amount_cents));
    }
    if amount_cents > MAX_AMOUNT {
        return Err(ValidationError::AmountTooLarge(amount_cents));
    }
    Ok(())
}

fn validate_goal(amount_cents: Cents) -> Result<(), ValidationError> {
    if amount_cents <= 0 {
        return Err(ValidationError::NonPositiveGoal(amount_cents));
    }
    if amount_cents > MAX_AMOUNT {
        return Err(ValidationError::AmountTooLarge(amount_cents));
    }
    Ok(())
}

fn parse_month(month: &str) -> Result<Month, ValidationError> {
    if month.trim().is_empty() {
        return Err(ValidationError::MissingMonth);
    }
    month
        .parse()
        .map_err(|_| ValidationError::InvalidMonth(month.to_string()))
}
