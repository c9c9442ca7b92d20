use serde::{Deserialize, Serialize};

use super::{Cents, Month};

/// Income and expense totals for one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub month: Month,
    pub income: Cents,
    pub expense: Cents,
    pub net: Cents,
}

/// Total spent under one expense description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub description: String,
    pub total: Cents,
}

/// Spending statistics for one expense description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub description: String,
    pub total: Cents,
    pub count: usize,
    pub average: Cents,
}

/// Progress of net savings toward the savings goal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GoalProgress {
    NoGoal,
    Tracking {
        goal: Cents,
        /// Share of the goal reached, clamped to 0..=100
        percent: f64,
        achieved: bool,
        /// Amount still missing, never negative
        remaining: Cents,
    },
}

impl GoalProgress {
    pub fn is_achieved(&self) -> bool {
        matches!(self, GoalProgress::Tracking { achieved: true, .. })
    }
}

/// Classification of the savings rate (net savings over income).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SavingsRateBand {
    /// Above 20%
    Excellent,
    /// Above 10%
    Good,
    /// Above 0%
    Marginal,
    /// Spending at or above income
    Deficit,
}

impl SavingsRateBand {
    pub fn classify(rate_percent: f64) -> Self {
        if rate_percent > 20.0 {
            SavingsRateBand::Excellent
        } else if rate_percent > 10.0 {
            SavingsRateBand::Good
        } else if rate_percent > 0.0 {
            SavingsRateBand::Marginal
        } else {
            SavingsRateBand::Deficit
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SavingsRateBand::Excellent => "excellent",
            SavingsRateBand::Good => "good",
            SavingsRateBand::Marginal => "marginal",
            SavingsRateBand::Deficit => "deficit",
        }
    }
}

impl std::fmt::Display for SavingsRateBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
