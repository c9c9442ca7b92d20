use serde::{Deserialize, Serialize};

use crate::domain::{
    CategoryTotal, Cents, GoalProgress, Ledger, MonthlySummary, SavingsRateBand, Tip,
    generate_tips,
};

/// Headline numbers for the whole ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryReport {
    pub transaction_count: usize,
    pub total_income: Cents,
    pub total_expenses: Cents,
    pub net_savings: Cents,
    pub savings_rate: Option<f64>,
    pub savings_rate_band: Option<SavingsRateBand>,
    pub goal_progress: GoalProgress,
    pub months_to_goal: Option<u64>,
    pub top_expense: Option<CategoryTotal>,
}

impl SummaryReport {
    pub fn from_ledger(ledger: &Ledger) -> Self {
        Self {
            transaction_count: ledger.len(),
            total_income: ledger.total_income(),
            total_expenses: ledger.total_expenses(),
            net_savings: ledger.net_savings(),
            savings_rate: ledger.savings_rate(),
            savings_rate_band: ledger.savings_rate_band(),
            goal_progress: ledger.goal_progress(),
            months_to_goal: ledger.estimated_months_to_goal(),
            top_expense: ledger.top_expense_category(),
        }
    }
}

/// Monthly breakdown, the feed for charts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub months: Vec<MonthlySummary>,
    pub total_income: Cents,
    pub total_expenses: Cents,
}

impl MonthlyReport {
    pub fn from_ledger(ledger: &Ledger) -> Self {
        Self {
            months: ledger.monthly_breakdown(),
            total_income: ledger.total_income(),
            total_expenses: ledger.total_expenses(),
        }
    }
}

/// Tips rendered alongside their structured form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TipsReport {
    pub tips: Vec<TipEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TipEntry {
    pub message: String,
    #[serde(flatten)]
    pub tip: Tip,
}

impl TipsReport {
    pub fn from_ledger(ledger: &Ledger) -> Self {
        Self {
            tips: generate_tips(ledger)
                .into_iter()
                .map(|tip| TipEntry {
                    message: tip.to_string(),
                    tip,
                })
                .collect(),
        }
    }
}
