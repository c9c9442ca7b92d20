//! Heuristic tips and a financial health score derived from a [`Ledger`].
//!
//! None of this is financial advice; the thresholds are rules of thumb.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{format_cents, Cents, GoalProgress, Ledger, SavingsRateBand, UNIT};

/// Maximum number of tips returned by [`generate_tips`].
pub const MAX_TIPS: usize = 5;

/// An expense category counts as "small but frequent" below this average.
pub const SMALL_EXPENSE_AVERAGE: Cents = 500 * UNIT;

/// Minimum number of entries for a category to count as frequent.
pub const FREQUENT_EXPENSE_COUNT: usize = 3;

/// Transaction count that earns the tracking-streak tip.
pub const TRACKING_STREAK: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Tip {
    NoData,
    SavingsRate {
        band: SavingsRateBand,
        rate: f64,
    },
    TopExpense {
        description: String,
        total: Cents,
        count: usize,
    },
    FrequentSmallExpense {
        description: String,
        total: Cents,
    },
    SavingsImproved {
        by: Cents,
    },
    SavingsDeclined {
        by: Cents,
    },
    GoalAchieved {
        goal: Cents,
    },
    GoalEta {
        remaining: Cents,
        months: u64,
    },
    TrackingStreak {
        transactions: usize,
    },
}

impl fmt::Display for Tip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tip::NoData => write!(f, "Add some income and expenses to get personalized tips."),
            Tip::SavingsRate { band, rate } => match band {
                SavingsRateBand::Excellent => write!(
                    f,
                    "Excellent! You're saving {:.1}% of your income. Keep it up.",
                    rate
                ),
                SavingsRateBand::Good => write!(
                    f,
                    "Good job saving {:.1}% of your income. Aim for 20% or more.",
                    rate
                ),
                SavingsRateBand::Marginal => write!(
                    f,
                    "You're saving {:.1}% of your income. Try to reach at least 10%.",
                    rate
                ),
                SavingsRateBand::Deficit => write!(
                    f,
                    "You're spending more than you earn ({:.1}% savings rate). Review your expenses.",
                    rate
                ),
            },
            Tip::TopExpense {
                description,
                total,
                count,
            } => write!(
                f,
                "Your biggest expense is '{}' at {} ({} transaction{}). Check that it matches your priorities.",
                description,
                format_cents(*total),
                count,
                if *count == 1 { "" } else { "s" }
            ),
            Tip::FrequentSmallExpense { description, total } => write!(
                f,
                "Small but frequent: you've spent {} on '{}'. Small amounts add up.",
                format_cents(*total),
                description
            ),
            Tip::SavingsImproved { by } => write!(
                f,
                "Your savings improved by {} compared to the previous month.",
                format_cents(*by)
            ),
            Tip::SavingsDeclined { by } => write!(
                f,
                "Your savings dropped by {} compared to the previous month. Review recent expenses.",
                format_cents(*by)
            ),
            Tip::GoalAchieved { goal } => write!(
                f,
                "Congratulations! You've reached your savings goal of {}.",
                format_cents(*goal)
            ),
            Tip::GoalEta { remaining, months } => write!(
                f,
                "{} to go. At your current pace you'll reach your goal in about {} month{}.",
                format_cents(*remaining),
                months,
                if *months == 1 { "" } else { "s" }
            ),
            Tip::TrackingStreak { transactions } => write!(
                f,
                "You've recorded {} transactions. Consistent tracking pays off.",
                transactions
            ),
        }
    }
}

/// Build up to [`MAX_TIPS`] tips, most relevant first.
pub fn generate_tips(ledger: &Ledger) -> Vec<Tip> {
    if ledger.is_empty() {
        return vec![Tip::NoData];
    }

    let mut tips = Vec::new();

    if let (Some(rate), Some(band)) = (ledger.savings_rate(), ledger.savings_rate_band()) {
        tips.push(Tip::SavingsRate { band, rate });
    }

    let categories = ledger.expense_categories();
    if let Some(top) = categories.first() {
        tips.push(Tip::TopExpense {
            description: top.description.clone(),
            total: top.total,
            count: top.count,
        });
    }

    if let Some(small) = categories
        .iter()
        .find(|c| c.count >= FREQUENT_EXPENSE_COUNT && c.average < SMALL_EXPENSE_AVERAGE)
    {
        tips.push(Tip::FrequentSmallExpense {
            description: small.description.clone(),
            total: small.total,
        });
    }

    if let [.., previous, latest] = ledger.monthly_breakdown().as_slice() {
        let change = latest.net - previous.net;
        if change > 0 {
            tips.push(Tip::SavingsImproved { by: change });
        } else if change < 0 {
            tips.push(Tip::SavingsDeclined { by: -change });
        }
    }

    if let GoalProgress::Tracking {
        goal,
        achieved,
        remaining,
        ..
    } = ledger.goal_progress()
    {
        if achieved {
            tips.push(Tip::GoalAchieved { goal });
        } else if let Some(months) = ledger.estimated_months_to_goal() {
            tips.push(Tip::GoalEta { remaining, months });
        }
    }

    if ledger.len() >= TRACKING_STREAK {
        tips.push(Tip::TrackingStreak {
            transactions: ledger.len(),
        });
    }

    tips.truncate(MAX_TIPS);
    tips
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthLevel {
    NoData,
    Critical,
    NeedsImprovement,
    Fair,
    Good,
    Excellent,
}

impl HealthLevel {
    fn from_score(score: u32) -> Self {
        match score {
            80.. => HealthLevel::Excellent,
            60..=79 => HealthLevel::Good,
            40..=59 => HealthLevel::Fair,
            20..=39 => HealthLevel::NeedsImprovement,
            _ => HealthLevel::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthLevel::NoData => "No Data",
            HealthLevel::Critical => "Critical",
            HealthLevel::NeedsImprovement => "Needs Improvement",
            HealthLevel::Fair => "Fair",
            HealthLevel::Good => "Good",
            HealthLevel::Excellent => "Excellent",
        }
    }
}

impl fmt::Display for HealthLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Financial health score out of 100 with recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub score: u32,
    pub level: HealthLevel,
    pub savings_rate: f64,
    pub recommendations: Vec<String>,
}

/// Score the ledger on savings rate (40 points), expense spread (20),
/// goal attainment (20) and tracking consistency (20).
pub fn financial_health(ledger: &Ledger) -> HealthReport {
    if ledger.is_empty() {
        return HealthReport {
            score: 0,
            level: HealthLevel::NoData,
            savings_rate: 0.0,
            recommendations: vec![
                "Start tracking your income and expenses to get insights.".to_string(),
            ],
        };
    }

    let mut score = 0;
    let mut recommendations = Vec::new();
    let savings_rate = ledger.savings_rate();

    if let Some(rate) = savings_rate {
        if rate >= 20.0 {
            score += 40;
        } else if rate >= 10.0 {
            score += 25;
            recommendations.push(
                "Great job saving! Try to raise your savings rate to 20%.".to_string(),
            );
        } else if rate >= 0.0 {
            score += 10;
            recommendations
                .push("You're saving some money, but aim for 10-20% of your income.".to_string());
        } else {
            recommendations
                .push("You're spending more than you earn. This needs attention.".to_string());
        }
    }

    let categories = ledger.expense_categories().len();
    if categories >= 5 {
        score += 20;
    } else if categories >= 3 {
        score += 15;
    } else {
        score += 5;
        recommendations
            .push("Break your expenses into more categories for clearer insights.".to_string());
    }

    let net = ledger.net_savings();
    match ledger.goal() {
        Some(goal) => {
            // Compare against 75% / 50% of the goal without leaving integer math
            let (net, goal) = (i128::from(net), i128::from(goal));
            if net >= goal {
                score += 20;
                recommendations.push("Congratulations! You've achieved your savings goal.".to_string());
            } else if net * 4 >= goal * 3 {
                score += 15;
                recommendations.push("You're close to your savings goal. Keep going.".to_string());
            } else if net * 2 >= goal {
                score += 10;
            } else {
                score += 5;
                recommendations
                    .push("Focus on reaching your savings goal for more stability.".to_string());
            }
        }
        None => {
            score += 10;
            recommendations
                .push("Set a savings goal to give your budget a target.".to_string());
        }
    }

    let months = ledger.distinct_months();
    score += match months {
        6.. => 20,
        3..=5 => 15,
        2 => 10,
        _ => 5,
    };
    if months >= 2 {
        recommendations.push("Great job tracking your finances consistently.".to_string());
    }

    let score = score.min(100);
    HealthReport {
        score,
        level: HealthLevel::from_score(score),
        savings_rate: savings_rate.unwrap_or(0.0),
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MAX_AMOUNT;
    use crate::domain::TransactionKind::{Expense, Income};

    fn reference_ledger() -> Ledger {
        let mut ledger = Ledger::new();
        let rows = [
            (Income, "Salary", 5_000_000, "2024-01"),
            (Income, "Freelance Work", 1_500_000, "2024-01"),
            (Expense, "Rent", 2_000_000, "2024-01"),
            (Expense, "Groceries", 800_000, "2024-01"),
            (Expense, "Transportation", 300_000, "2024-01"),
            (Expense, "Entertainment", 500_000, "2024-01"),
            (Expense, "Utilities", 200_000, "2024-01"),
            (Income, "Salary", 5_000_000, "2024-02"),
        ];
        for (kind, desc, amount, month) in rows {
            ledger.add_transaction(kind, desc, amount, month).unwrap();
        }
        ledger.set_goal(3_000_000).unwrap();
        ledger
    }

    #[test]
    fn test_tips_for_empty_ledger() {
        assert_eq!(generate_tips(&Ledger::new()), vec![Tip::NoData]);
    }

    #[test]
    fn test_tips_for_reference_ledger() {
        let tips = generate_tips(&reference_ledger());

        assert!(matches!(
            tips[0],
            Tip::SavingsRate {
                band: SavingsRateBand::Excellent,
                ..
            }
        ));
        assert_eq!(
            tips[1],
            Tip::TopExpense {
                description: "Rent".into(),
                total: 2_000_000,
                count: 1,
            }
        );
        // January net 2_700_000, February net 5_000_000
        assert_eq!(tips[2], Tip::SavingsImproved { by: 2_300_000 });
        assert_eq!(tips[3], Tip::GoalAchieved { goal: 3_000_000 });
        assert_eq!(tips.len(), 4);
    }

    #[test]
    fn test_frequent_small_expense_tip() {
        let mut ledger = Ledger::new();
        for _ in 0..3 {
            ledger.add_transaction(Expense, "Coffee", 350, "2024-01").unwrap();
        }
        ledger.add_transaction(Expense, "Rent", 100_000, "2024-01").unwrap();

        let tips = generate_tips(&ledger);
        assert!(tips.contains(&Tip::FrequentSmallExpense {
            description: "Coffee".into(),
            total: 1_050,
        }));
        // No income means no savings rate tip
        assert!(!tips.iter().any(|t| matches!(t, Tip::SavingsRate { .. })));
    }

    #[test]
    fn test_goal_eta_and_declining_savings() {
        let mut ledger = Ledger::new();
        ledger.add_transaction(Income, "Salary", 50_000, "2024-01").unwrap();
        ledger.add_transaction(Income, "Salary", 50_000, "2024-02").unwrap();
        ledger.add_transaction(Expense, "Trip", 40_000, "2024-02").unwrap();
        ledger.set_goal(100_000).unwrap();

        let tips = generate_tips(&ledger);
        assert!(tips.contains(&Tip::SavingsDeclined { by: 40_000 }));
        assert!(tips.contains(&Tip::GoalEta {
            remaining: 40_000,
            months: 1,
        }));
    }

    #[test]
    fn test_tips_are_capped() {
        let mut ledger = Ledger::new();
        for month in ["2024-01", "2024-02", "2024-03", "2024-04", "2024-05", "2024-06"] {
            ledger.add_transaction(Income, "Salary", 100_000, month).unwrap();
            ledger.add_transaction(Expense, "Snacks", 1_000, month).unwrap();
        }
        ledger.add_transaction(Expense, "Snacks", 5_000, "2024-06").unwrap();
        ledger.set_goal(10_000_000).unwrap();

        let tips = generate_tips(&ledger);
        assert_eq!(tips.len(), MAX_TIPS);
        assert!(!tips.iter().any(|t| matches!(t, Tip::TrackingStreak { .. })));
    }

    #[test]
    fn test_tip_messages() {
        let tip = Tip::TopExpense {
            description: "Rent".into(),
            total: 2_000_000,
            count: 1,
        };
        assert_eq!(
            tip.to_string(),
            "Your biggest expense is 'Rent' at 20000.00 (1 transaction). Check that it matches your priorities."
        );
        assert!(Tip::GoalEta { remaining: 100, months: 2 }
            .to_string()
            .contains("about 2 months"));
    }

    #[test]
    fn test_health_for_empty_ledger() {
        let report = financial_health(&Ledger::new());
        assert_eq!(report.score, 0);
        assert_eq!(report.level, HealthLevel::NoData);
        assert_eq!(report.recommendations.len(), 1);
    }

    #[test]
    fn test_health_for_reference_ledger() {
        let report = financial_health(&reference_ledger());

        // 40 (rate) + 20 (5 categories) + 20 (goal met) + 10 (2 months)
        assert_eq!(report.score, 90);
        assert_eq!(report.level, HealthLevel::Excellent);
        assert!((report.savings_rate - 66.95).abs() < 0.01);
        assert_eq!(report.recommendations.len(), 2);
    }

    #[test]
    fn test_health_for_struggling_ledger() {
        let mut ledger = Ledger::new();
        ledger.add_transaction(Income, "Salary", 1_000, "2024-01").unwrap();
        ledger.add_transaction(Expense, "Rent", 1_500, "2024-01").unwrap();
        ledger.set_goal(10_000).unwrap();

        let report = financial_health(&ledger);
        // 0 (deficit) + 5 (1 category) + 5 (goal far away) + 5 (1 month)
        assert_eq!(report.score, 15);
        assert_eq!(report.level, HealthLevel::Critical);
        assert_eq!(report.recommendations.len(), 3);
    }

    #[test]
    fn test_health_goal_thresholds() {
        let mut ledger = Ledger::new();
        ledger.add_transaction(Income, "Salary", 7_500, "2024-01").unwrap();

        ledger.set_goal(10_000).unwrap();
        // 40 + 5 + 15 + 5
        assert_eq!(financial_health(&ledger).score, 65);

        ledger.set_goal(15_000).unwrap();
        assert_eq!(financial_health(&ledger).score, 60);

        ledger.clear_goal();
        assert_eq!(financial_health(&ledger).score, 60);
    }

    #[test]
    fn test_health_goal_thresholds_at_maximum_amount() {
        let mut ledger = Ledger::new();
        ledger.add_transaction(Income, "Salary", MAX_AMOUNT, "2024-01").unwrap();
        ledger.add_transaction(Expense, "Rent", MAX_AMOUNT / 5, "2024-01").unwrap();
        ledger.set_goal(MAX_AMOUNT).unwrap();

        // 40 + 5 + 15 (80% of goal) + 5
        assert_eq!(financial_health(&ledger).score, 65);
    }
}
