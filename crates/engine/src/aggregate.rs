//! Pure aggregations over a sequence of expenses.
//!
//! Nothing here allocates state or touches storage; every function can be
//! recomputed on each change of the collection. Sums are exact integer cents.

use chrono::NaiveDate;
use serde::Serialize;

use crate::{Category, Expense, MoneyCents, YearMonth};

/// Sum of all amounts. Empty input is zero.
pub fn total(expenses: &[Expense]) -> MoneyCents {
    expenses.iter().map(|e| e.amount).sum()
}

/// Sum of amounts dated within `month`. Records without a valid date are
/// excluded.
pub fn total_for_month(expenses: &[Expense], month: YearMonth) -> MoneyCents {
    expenses
        .iter()
        .filter(|e| e.date.is_some_and(|date| month.contains(date)))
        .map(|e| e.amount)
        .sum()
}

/// Sum of amounts dated exactly `date`.
pub fn total_for_date(expenses: &[Expense], date: NaiveDate) -> MoneyCents {
    expenses
        .iter()
        .filter(|e| e.date == Some(date))
        .map(|e| e.amount)
        .sum()
}

/// `total / count`, rounded to a whole cent; zero for an empty input.
pub fn average_per_transaction(expenses: &[Expense]) -> MoneyCents {
    total(expenses).div_rounded(expenses.len())
}

/// `category_sum / total * 100`, or 0 when `total` is zero.
pub fn percent_of_total(category_sum: MoneyCents, total: MoneyCents) -> f64 {
    if total.is_zero() {
        return 0.0;
    }
    category_sum.cents() as f64 / total.cents() as f64 * 100.0
}

/// One row of [`breakdown_by_category`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: &'static Category,
    pub total: MoneyCents,
    pub percent: f64,
}

/// Per-category sums for every category in `categories`.
///
/// Records are grouped by their display category, so a name outside the
/// taxonomy counts towards "Other" and the rows always add up to [`total`].
/// Categories with nothing spent are left out. Rows are ordered by
/// descending sum; equal sums keep taxonomy order.
pub fn breakdown_by_category(
    expenses: &[Expense],
    categories: &'static [Category],
) -> Vec<CategoryTotal> {
    let grand_total = total(expenses);
    let mut rows: Vec<CategoryTotal> = categories
        .iter()
        .map(|category| {
            let sum = expenses
                .iter()
                .filter(|e| e.display_category().name == category.name)
                .map(|e| e.amount)
                .sum();
            CategoryTotal {
                category,
                total: sum,
                percent: percent_of_total(sum, grand_total),
            }
        })
        .filter(|row| !row.total.is_zero())
        .collect();

    // Stable sort: ties stay in taxonomy order.
    rows.sort_by(|a, b| b.total.cmp(&a.total));
    rows
}

/// Category constraint for [`filter`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    /// Exact match on the stored category name.
    Named(String),
}

impl CategoryFilter {
    /// `"all"` (any case) or an empty string is the wildcard.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Named(raw.to_string())
        }
    }

    pub fn matches(&self, expense: &Expense) -> bool {
        match self {
            Self::All => true,
            Self::Named(name) => expense.category == *name,
        }
    }
}

/// Order-preserving subsequence of `expenses` matching both constraints.
///
/// `date == None` means no date constraint.
pub fn filter<'a>(
    expenses: &'a [Expense],
    category: &CategoryFilter,
    date: Option<NaiveDate>,
) -> Vec<&'a Expense> {
    expenses
        .iter()
        .filter(|e| category.matches(e))
        .filter(|e| date.is_none_or(|date| e.date == Some(date)))
        .collect()
}
