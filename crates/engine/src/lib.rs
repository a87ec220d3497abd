//! Expense tracking engine.
//!
//! The [`Engine`] owns one [`ExpenseBook`] per active user and wires it to an
//! injected [`ExpenseStore`]. All numbers shown to a user come from the
//! pure functions in [`aggregate`], [`chart`] and [`summary`], computed over
//! the in-memory book, never over what the store has confirmed.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};

pub use aggregate::{CategoryFilter, CategoryTotal};
pub use book::{BookTimings, DisplayState, ExpenseBook};
pub use category::{CATEGORIES, Category};
pub use chart::{Donut, DonutSlice};
pub use error::EngineError;
pub use expense::{
    Expense, ExpenseDraft, ExpenseId, ValidExpense, ValidationError, ValidationErrors, YearMonth,
};
pub use money::{MoneyCents, ParseMoneyError};
pub use store::{DatabaseStore, ExpenseStore, LocalStore, MemoryStore, StoreKind};
pub use summary::{CategoryBar, Summary};

pub mod aggregate;
mod book;
mod category;
pub mod chart;
mod error;
pub mod expense;
mod money;
pub mod store;
pub mod summary;

type ResultEngine<T> = Result<T, EngineError>;

/// Whether the store accepted the collection after a mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Saved,
    /// The store failed; the in-memory book still has the change.
    Failed,
}

/// Result of a mutation plus the outcome of persisting it.
#[derive(Clone, Debug, PartialEq)]
pub struct Mutation<T> {
    pub value: T,
    pub sync: SyncStatus,
}

/// A record together with its display state.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExpenseEntry {
    pub expense: Expense,
    pub state: DisplayState,
}

/// Filtered history and its sum.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct History {
    pub entries: Vec<ExpenseEntry>,
    pub total: MoneyCents,
}

/// Month and (optionally) day totals.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PeriodTotals {
    pub total: MoneyCents,
    pub month: YearMonth,
    pub month_total: MoneyCents,
    pub date: Option<NaiveDate>,
    pub date_total: Option<MoneyCents>,
}

type SharedBook = Arc<Mutex<ExpenseBook>>;

pub struct Engine {
    store: Arc<dyn ExpenseStore>,
    books: RwLock<HashMap<String, SharedBook>>,
    timings: BookTimings,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("store", &self.store.kind())
            .field("timings", &self.timings)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn store_kind(&self) -> StoreKind {
        self.store.kind()
    }

    pub fn timings(&self) -> BookTimings {
        self.timings
    }

    /// Loads a user's collection from the store unless it is already open.
    ///
    /// Returns the number of records in the session.
    pub async fn open_session(&self, user_id: &str) -> ResultEngine<usize> {
        let book = self.book(user_id).await?;
        let book = book.lock().await;
        Ok(book.len())
    }

    /// Re-reads a user's collection from the store, e.g. after the store
    /// reported an external change. Transient display states are dropped.
    pub async fn reload(&self, user_id: &str) -> ResultEngine<usize> {
        let expenses = self.store.load(user_id).await?;
        let book = self.book(user_id).await?;
        let mut book = book.lock().await;
        book.replace_all(expenses);
        tracing::info!("reloaded {} expenses for {user_id}", book.len());
        Ok(book.len())
    }

    /// Forgets a user's in-memory collection. Returns `false` if no session
    /// was open.
    ///
    /// Deletions still in their grace period are completed and saved first,
    /// so a closed session never resurrects a deleted record.
    pub async fn close_session(&self, user_id: &str) -> bool {
        let Some(book) = self.books.read().await.get(user_id).map(Arc::clone) else {
            return false;
        };
        let mut book = book.lock().await;
        let removed = book.flush_deletions();
        if !removed.is_empty() {
            tracing::debug!(
                "completed {} pending deletions for {user_id} at session close",
                removed.len()
            );
            self.persist(user_id, &book).await;
        }
        self.books.write().await.remove(user_id).is_some()
    }

    /// Validates `draft` and puts the new record at the head of the user's
    /// collection, then hands the collection to the store.
    pub async fn add_expense(
        &self,
        user_id: &str,
        draft: &ExpenseDraft,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> ResultEngine<Mutation<Expense>> {
        let valid = draft.validate(today)?;
        let book = self.book(user_id).await?;
        let mut book = book.lock().await;
        self.sweep_locked(user_id, &mut book, now).await;

        let expense = book.insert(valid, now).clone();
        tracing::debug!("added expense {} for {user_id}", expense.id);
        let sync = self.persist(user_id, &book).await;
        Ok(Mutation {
            value: expense,
            sync,
        })
    }

    /// Starts deleting a record. Returns when it will leave the collection,
    /// or `None` when the id is unknown (a no-op).
    ///
    /// The record keeps counting in every aggregate until a sweep at or after
    /// the returned instant removes it.
    pub async fn delete_expense(
        &self,
        user_id: &str,
        id: ExpenseId,
        now: DateTime<Utc>,
    ) -> ResultEngine<Option<DateTime<Utc>>> {
        let book = self.book(user_id).await?;
        let mut book = book.lock().await;
        self.sweep_locked(user_id, &mut book, now).await;
        let until = book.request_deletion(id, now);
        match until {
            Some(until) => tracing::debug!("expense {id} of {user_id} pending deletion until {until}"),
            None => tracing::debug!("expense {id} of {user_id} not found, nothing to delete"),
        }
        Ok(until)
    }

    /// Completes every display transition due at `now`, persisting the
    /// collection when records were removed.
    pub async fn sweep(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Mutation<Vec<ExpenseId>>> {
        let book = self.book(user_id).await?;
        let mut book = book.lock().await;
        let (removed, sync) = self.sweep_locked(user_id, &mut book, now).await;
        Ok(Mutation {
            value: removed,
            sync,
        })
    }

    /// Every record, newest first, with its display state.
    pub async fn expenses(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Vec<ExpenseEntry>> {
        self.history(user_id, &CategoryFilter::All, None, now)
            .await
            .map(|history| history.entries)
    }

    /// Records matching the filters, in collection order, and their sum.
    pub async fn history(
        &self,
        user_id: &str,
        category: &CategoryFilter,
        date: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> ResultEngine<History> {
        self.read(user_id, now, |book| {
            let matching = aggregate::filter(book.expenses(), category, date);
            let total = matching.iter().map(|e| e.amount).sum();
            let entries = matching
                .into_iter()
                .map(|expense| ExpenseEntry {
                    expense: expense.clone(),
                    state: book.state(expense.id, now).unwrap_or(DisplayState::Visible),
                })
                .collect();
            History { entries, total }
        })
        .await
    }

    /// Display states of `ids` at `now`. Ids not in the collection are left
    /// out.
    pub async fn states(
        &self,
        user_id: &str,
        ids: &[ExpenseId],
        now: DateTime<Utc>,
    ) -> ResultEngine<HashMap<ExpenseId, DisplayState>> {
        self.read(user_id, now, |book| {
            ids.iter()
                .filter_map(|&id| book.state(id, now).map(|state| (id, state)))
                .collect()
        })
        .await
    }

    pub async fn summary(
        &self,
        user_id: &str,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> ResultEngine<Summary> {
        self.read(user_id, now, |book| Summary::compute(book.expenses(), today))
            .await
    }

    pub async fn breakdown(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Vec<CategoryTotal>> {
        self.read(user_id, now, |book| {
            aggregate::breakdown_by_category(book.expenses(), Category::all())
        })
        .await
    }

    pub async fn donut(&self, user_id: &str, now: DateTime<Utc>) -> ResultEngine<Donut> {
        self.read(user_id, now, |book| chart::donut(book.expenses()))
            .await
    }

    pub async fn totals(
        &self,
        user_id: &str,
        month: YearMonth,
        date: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> ResultEngine<PeriodTotals> {
        self.read(user_id, now, |book| {
            let expenses = book.expenses();
            PeriodTotals {
                total: aggregate::total(expenses),
                month,
                month_total: aggregate::total_for_month(expenses, month),
                date,
                date_total: date.map(|date| aggregate::total_for_date(expenses, date)),
            }
        })
        .await
    }

    async fn read<T>(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
        f: impl FnOnce(&ExpenseBook) -> T,
    ) -> ResultEngine<T> {
        let book = self.book(user_id).await?;
        let mut book = book.lock().await;
        self.sweep_locked(user_id, &mut book, now).await;
        Ok(f(&book))
    }

    async fn sweep_locked(
        &self,
        user_id: &str,
        book: &mut ExpenseBook,
        now: DateTime<Utc>,
    ) -> (Vec<ExpenseId>, SyncStatus) {
        let removed = book.sweep(now);
        if removed.is_empty() {
            return (removed, SyncStatus::Saved);
        }
        tracing::debug!("removed {} expenses for {user_id}", removed.len());
        let sync = self.persist(user_id, book).await;
        (removed, sync)
    }

    async fn persist(&self, user_id: &str, book: &ExpenseBook) -> SyncStatus {
        match self.store.save(user_id, book.expenses()).await {
            Ok(()) => SyncStatus::Saved,
            Err(err) => {
                tracing::warn!(
                    "failed to save expenses for {user_id} to {} store: {err}",
                    self.store.kind()
                );
                SyncStatus::Failed
            }
        }
    }

    /// Returns the user's book, loading it from the store on first use.
    async fn book(&self, user_id: &str) -> ResultEngine<SharedBook> {
        if let Some(book) = self.books.read().await.get(user_id) {
            return Ok(Arc::clone(book));
        }

        let expenses = self.store.load(user_id).await?;
        let mut books = self.books.write().await;
        let book = books.entry(user_id.to_string()).or_insert_with(|| {
            tracing::info!("opened session for {user_id} with {} expenses", expenses.len());
            Arc::new(Mutex::new(ExpenseBook::from_expenses(expenses, self.timings)))
        });
        Ok(Arc::clone(book))
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    store: Option<Arc<dyn ExpenseStore>>,
    timings: BookTimings,
}

impl EngineBuilder {
    /// Pass the persistence collaborator. Defaults to a [`MemoryStore`].
    pub fn store(mut self, store: Arc<dyn ExpenseStore>) -> EngineBuilder {
        self.store = Some(store);
        self
    }

    /// How long a deleted record stays pending before it is removed.
    pub fn deletion_grace(mut self, grace: chrono::TimeDelta) -> EngineBuilder {
        self.timings.deletion_grace = grace;
        self
    }

    /// How long a new record is highlighted.
    pub fn highlight(mut self, highlight: chrono::TimeDelta) -> EngineBuilder {
        self.timings.highlight = highlight;
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> Engine {
        Engine {
            store: self
                .store
                .unwrap_or_else(|| Arc::new(MemoryStore::new())),
            books: RwLock::new(HashMap::new()),
            timings: self.timings,
        }
    }
}
