//! Chart-oriented aggregations over a user's expenses.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use uuid::Uuid;

use finperiod_domain::{Expense, Period, ReportEntry};

use crate::{
    storage::{BudgetStore, ExpenseStore},
    summary_service::Accumulator,
    CoreError,
};

/// Which expenses a report covers, by expense date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportRange {
    All,
    /// The as-of calendar month and the five before it.
    LastSixMonths { as_of: NaiveDate },
}

impl ReportRange {
    /// Inclusive date window, or `None` for an unbounded range.
    pub fn window(self) -> Option<(NaiveDate, NaiveDate)> {
        match self {
            ReportRange::All => None,
            ReportRange::LastSixMonths { as_of } => {
                let month = Period::from_date(as_of);
                Some((month.shift(-5).first_day(), month.last_day()))
            }
        }
    }
}

pub struct ReportService;

impl ReportService {
    /// Total spend per budget category, largest first.
    pub fn expenses_by_category(
        budgets: &dyn BudgetStore,
        expenses: &dyn ExpenseStore,
        user_id: Uuid,
        range: ReportRange,
    ) -> Result<Vec<ReportEntry>, CoreError> {
        let mut categories: HashMap<Uuid, Option<String>> = HashMap::new();
        let mut totals: BTreeMap<String, Accumulator> = BTreeMap::new();

        for expense in Self::expenses_in(expenses, user_id, range)? {
            let category = match categories.get(&expense.budget_id) {
                Some(cached) => cached.clone(),
                None => {
                    let found = budgets
                        .find_budget_by_id(expense.budget_id)?
                        .map(|budget| budget.category);
                    categories.insert(expense.budget_id, found.clone());
                    found
                }
            };
            // Expenses whose budget disappeared have no category to report under.
            if let Some(category) = category {
                totals.entry(category).or_default().add(&expense);
            }
        }

        let mut entries: Vec<ReportEntry> = totals
            .into_iter()
            .map(|(label, acc)| ReportEntry {
                label,
                value: acc.total,
            })
            .collect();
        entries.sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.label.cmp(&b.label)));
        Ok(entries)
    }

    /// Spend per calendar month, oldest first, labelled like `Nov 2024`.
    ///
    /// A bounded range lists every month in the window, including empty ones.
    pub fn monthly_trend(
        expenses: &dyn ExpenseStore,
        user_id: Uuid,
        range: ReportRange,
    ) -> Result<Vec<ReportEntry>, CoreError> {
        let mut months: BTreeMap<Period, Accumulator> = BTreeMap::new();
        if let Some((from, to)) = range.window() {
            let mut month = Period::from_date(from);
            while month <= Period::from_date(to) {
                months.insert(month, Accumulator::default());
                month = month.succ();
            }
        }
        for expense in Self::expenses_in(expenses, user_id, range)? {
            months
                .entry(Period::from_date(expense.date))
                .or_default()
                .add(&expense);
        }

        Ok(months
            .into_iter()
            .map(|(month, acc)| ReportEntry {
                label: month.first_day().format("%b %Y").to_string(),
                value: acc.total,
            })
            .collect())
    }

    fn expenses_in(
        expenses: &dyn ExpenseStore,
        user_id: Uuid,
        range: ReportRange,
    ) -> Result<Vec<Expense>, CoreError> {
        match range.window() {
            Some((from, to)) => expenses.find_expenses_between(user_id, from, to),
            None => expenses.find_expenses(user_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use finperiod_domain::{Budget, User};

    use super::*;
    use crate::{MemoryStore, UserStore};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seeded() -> (MemoryStore, User) {
        let store = MemoryStore::new();
        let user = User::new("Sam");
        store.save_user(&user).unwrap();
        let food = store
            .insert_budget(Budget::new(user.id, "Food", 300.0, Period::new(2024, 11).unwrap()))
            .unwrap();
        let rent = store
            .insert_budget(Budget::new(user.id, "Rent", 900.0, Period::new(2024, 11).unwrap()))
            .unwrap();
        for (budget, amount, when) in [
            (&food, 40.0, date(2024, 11, 2)),
            (&food, 25.0, date(2024, 9, 14)),
            (&rent, 900.0, date(2024, 11, 1)),
            (&food, 10.0, date(2024, 3, 3)),
        ] {
            store
                .insert_expense(Expense::new(user.id, budget.id, amount, when))
                .unwrap();
        }
        (store, user)
    }

    #[test]
    fn six_month_window_spans_calendar_months() {
        let range = ReportRange::LastSixMonths {
            as_of: date(2024, 11, 18),
        };
        assert_eq!(range.window(), Some((date(2024, 6, 1), date(2024, 11, 30))));
        assert_eq!(ReportRange::All.window(), None);
    }

    #[test]
    fn categories_are_totalled_largest_first() {
        let (store, user) = seeded();
        let all = ReportService::expenses_by_category(&store, &store, user.id, ReportRange::All)
            .unwrap();
        assert_eq!(
            all,
            vec![
                ReportEntry { label: "Rent".into(), value: 900.0 },
                ReportEntry { label: "Food".into(), value: 75.0 },
            ]
        );

        let recent = ReportService::expenses_by_category(
            &store,
            &store,
            user.id,
            ReportRange::LastSixMonths { as_of: date(2024, 11, 18) },
        )
        .unwrap();
        assert_eq!(recent[1].value, 65.0);
    }

    #[test]
    fn trend_fills_the_window_in_order() {
        let (store, user) = seeded();
        let trend = ReportService::monthly_trend(
            &store,
            user.id,
            ReportRange::LastSixMonths { as_of: date(2024, 11, 18) },
        )
        .unwrap();
        let labels: Vec<_> = trend.iter().map(|entry| entry.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Jun 2024", "Jul 2024", "Aug 2024", "Sep 2024", "Oct 2024", "Nov 2024"]
        );
        assert_eq!(trend[3].value, 25.0);
        assert_eq!(trend[5].value, 940.0);

        let everything = ReportService::monthly_trend(&store, user.id, ReportRange::All).unwrap();
        assert_eq!(everything.first().map(|e| e.label.as_str()), Some("Mar 2024"));
        assert_eq!(everything.len(), 3);
    }
}
