use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Signup {
        pub name: String,
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Login {
        pub email: String,
        pub password: String,
    }

    /// Public view of an account. Never carries the password hash.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct Profile {
        pub id: Uuid,
        pub name: String,
        pub email: String,
        pub created_at: DateTime<Utc>,
        /// Number of expenses in the session opened by the login.
        pub expenses: Option<usize>,
    }
}

pub mod category {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CategoryView {
        pub name: String,
        pub icon: String,
        pub color: String,
        pub background: String,
    }
}

pub mod expense {
    use super::*;
    use crate::category::CategoryView;

    /// Form input for a new expense. Every field is the raw string the user
    /// typed; the server validates and normalizes it.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseNew {
        #[serde(default)]
        pub title: String,
        #[serde(default)]
        pub amount: String,
        pub category: Option<String>,
        /// `YYYY-MM-DD`, defaults to today.
        pub date: Option<String>,
        pub note: Option<String>,
    }

    /// Query string of `GET /expenses`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseFilter {
        /// A category name, or `All`.
        pub category: Option<String>,
        /// `YYYY-MM-DD`.
        pub date: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(tag = "state", rename_all = "snake_case")]
    pub enum ExpenseState {
        New { until: DateTime<Utc> },
        Visible,
        PendingDeletion { until: DateTime<Utc> },
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: i64,
        pub title: String,
        pub amount_minor: i64,
        /// Amount with the currency symbol, e.g. `₹4.50`.
        pub amount: String,
        /// Stored category name, possibly outside the taxonomy.
        pub category: String,
        /// Taxonomy entry used to draw the record.
        pub display: CategoryView,
        pub date: Option<NaiveDate>,
        pub note: Option<String>,
        pub state: ExpenseState,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseCreated {
        pub expense: ExpenseView,
        /// `false` when the store could not save the collection.
        pub synced: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseList {
        pub expenses: Vec<ExpenseView>,
        pub count: usize,
        pub total_minor: i64,
        pub total: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Deletion {
        pub id: i64,
        /// When the record leaves the collection; `None` if it was unknown.
        pub pending_until: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Reloaded {
        pub count: usize,
    }
}

pub mod stats {
    use super::*;
    use crate::{category::CategoryView, expense::ExpenseView};

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryAmount {
        pub category: CategoryView,
        pub total_minor: i64,
        pub total: String,
        pub percent: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Breakdown {
        pub categories: Vec<CategoryAmount>,
        pub total_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DonutSlice {
        pub category: String,
        pub color: String,
        pub percent: f64,
        pub dash: f64,
        pub gap: f64,
        pub offset: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Donut {
        pub size: f64,
        pub stroke: f64,
        pub radius: f64,
        pub circumference: f64,
        pub total_minor: i64,
        pub total: String,
        pub slices: Vec<DonutSlice>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Summary {
        pub total_minor: i64,
        pub total: String,
        /// `YYYY-MM` of the current month.
        pub month: String,
        pub month_total_minor: i64,
        pub month_total: String,
        pub count: usize,
        pub average_minor: i64,
        pub average: String,
        pub top_categories: Vec<CategoryAmount>,
        pub recent: Vec<ExpenseView>,
        pub donut: Donut,
    }

    /// Query string of `GET /totals`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TotalsQuery {
        /// `YYYY-MM`, defaults to the current month.
        pub month: Option<String>,
        /// `YYYY-MM-DD`.
        pub date: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Totals {
        pub total_minor: i64,
        pub month: String,
        pub month_total_minor: i64,
        pub date: Option<NaiveDate>,
        pub date_total_minor: Option<i64>,
    }
}

pub mod errors {
    use super::*;

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct FieldError {
        pub field: String,
        pub message: String,
    }

    /// Body of every error response.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ErrorBody {
        pub error: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub fields: Vec<FieldError>,
    }
}
