//! Report shapes produced by the period engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::period::{Period, PeriodBounds};

/// Counts of records left out of sums because their amount was malformed.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DataQuality {
    pub skipped_budgets: usize,
    pub skipped_expenses: usize,
}

impl DataQuality {
    pub fn is_clean(&self) -> bool {
        self.skipped_budgets == 0 && self.skipped_expenses == 0
    }
}

/// Spend against one category budget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetSummary {
    pub budget_id: Uuid,
    pub category: String,
    /// `None` when the stored amount is malformed.
    pub budget_amount: Option<f64>,
    pub spent_amount: f64,
    pub over_budget: bool,
}

impl BudgetSummary {
    pub fn from_parts(
        budget_id: Uuid,
        category: String,
        budget_amount: Option<f64>,
        spent_amount: f64,
    ) -> Self {
        let over_budget = budget_amount
            .map(|budget| spent_amount > budget)
            .unwrap_or(false);
        Self {
            budget_id,
            category,
            budget_amount,
            spent_amount,
            over_budget,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PeriodSummary {
    pub period: Period,
    pub lines: Vec<BudgetSummary>,
    pub data_quality: DataQuality,
}

impl PeriodSummary {
    pub fn over_budget(&self) -> impl Iterator<Item = &BudgetSummary> {
        self.lines.iter().filter(|line| line.over_budget)
    }
}

/// Dashboard figures for the elapsed part of the current period, compared
/// against the full previous period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardStats {
    pub period: Period,
    pub bounds: PeriodBounds,
    pub as_of: NaiveDate,
    pub days_elapsed: i64,
    pub total_budget: f64,
    pub total_spent: f64,
    pub avg_daily_spend: f64,
    pub savings: f64,
    pub budget_change: String,
    pub spent_change: String,
    pub avg_daily_change: String,
    pub savings_change: String,
    pub data_quality: DataQuality,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum SkipReason {
    /// The category already had a budget in the target period.
    AlreadyPresent,
    /// A concurrent writer created the budget between check and insert.
    LostRace,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum RolloverOutcome {
    Copied { budget_id: Uuid },
    Skipped(SkipReason),
    Failed(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RolloverItem {
    pub category: String,
    pub outcome: RolloverOutcome,
}

/// Per-category results of copying one user's budgets forward.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RolloverReport {
    pub user_id: Uuid,
    pub previous: Period,
    pub current: Period,
    pub items: Vec<RolloverItem>,
}

impl RolloverReport {
    pub fn new(user_id: Uuid, previous: Period, current: Period) -> Self {
        Self {
            user_id,
            previous,
            current,
            items: Vec::new(),
        }
    }

    pub fn record(&mut self, category: impl Into<String>, outcome: RolloverOutcome) {
        self.items.push(RolloverItem {
            category: category.into(),
            outcome,
        });
    }

    pub fn copied_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item.outcome, RolloverOutcome::Copied { .. }))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item.outcome, RolloverOutcome::Skipped(_)))
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &RolloverItem> {
        self.items
            .iter()
            .filter(|item| matches!(item.outcome, RolloverOutcome::Failed(_)))
    }
}

/// Chart-friendly label/value pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportEntry {
    pub label: String,
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn over_budget_is_strict() {
        let id = Uuid::new_v4();
        assert!(!BudgetSummary::from_parts(id, "Food".into(), Some(100.0), 100.0).over_budget);
        assert!(BudgetSummary::from_parts(id, "Food".into(), Some(100.0), 100.01).over_budget);
        assert!(!BudgetSummary::from_parts(id, "Food".into(), None, 500.0).over_budget);
    }

    #[test]
    fn rollover_report_counts_only_copies() {
        let period = Period::new(2024, 11).unwrap();
        let mut report = RolloverReport::new(Uuid::new_v4(), period.pred(), period);
        report.record("Food", RolloverOutcome::Copied { budget_id: Uuid::new_v4() });
        report.record("Rent", RolloverOutcome::Skipped(SkipReason::AlreadyPresent));
        report.record("Gym", RolloverOutcome::Failed("disk full".into()));
        assert_eq!(report.copied_count(), 1);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.failures().count(), 1);
    }
}
