//! Dashboard summary built from the aggregator.

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    Category, CategoryTotal, Donut, Expense, MoneyCents, YearMonth, aggregate, chart,
};

/// Categories shown with a bar on the dashboard.
pub const TOP_CATEGORIES: usize = 6;
/// Records shown under "recent transactions".
pub const RECENT_EXPENSES: usize = 5;

/// A breakdown row with its bar width.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryBar {
    pub category: &'static Category,
    pub total: MoneyCents,
    /// Bar width in percent, clamped to `[0, 100]`.
    pub percent: f64,
}

impl From<&CategoryTotal> for CategoryBar {
    fn from(row: &CategoryTotal) -> Self {
        Self {
            category: row.category,
            total: row.total,
            percent: chart::clamp_percent(row.percent),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Summary {
    pub total: MoneyCents,
    pub month: YearMonth,
    pub month_total: MoneyCents,
    pub count: usize,
    pub average: MoneyCents,
    pub top_categories: Vec<CategoryBar>,
    pub recent: Vec<Expense>,
    pub donut: Donut,
}

impl Summary {
    /// Computes the summary; `today` decides which month is "this month".
    pub fn compute(expenses: &[Expense], today: NaiveDate) -> Self {
        let month = YearMonth::of(today);
        let top_categories = aggregate::breakdown_by_category(expenses, Category::all())
            .iter()
            .take(TOP_CATEGORIES)
            .map(CategoryBar::from)
            .collect();

        Self {
            total: aggregate::total(expenses),
            month,
            month_total: aggregate::total_for_month(expenses, month),
            count: expenses.len(),
            average: aggregate::average_per_transaction(expenses),
            top_categories,
            recent: expenses.iter().take(RECENT_EXPENSES).cloned().collect(),
            donut: chart::donut(expenses),
        }
    }
}
