//! A user's owned expense collection.
//!
//! The book keeps the records newest-first and tracks a small display state
//! machine per record:
//!
//! ```text
//! created ──► New ──(highlight elapses)──► Visible
//!               │                             │
//!               └──────(delete requested)─────┴──► PendingDeletion ──(grace elapses)──► removed
//! ```
//!
//! A record in `PendingDeletion` is still part of [`ExpenseBook::expenses`]
//! and therefore of every aggregate. Time never comes from the system clock
//! here: callers pass `now`, and [`ExpenseBook::sweep`] applies whatever
//! transitions are due at that instant.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::{Expense, ExpenseId, ValidExpense};

/// Presentation state of a single record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DisplayState {
    /// Just created; highlighted until `until`.
    New { until: DateTime<Utc> },
    Visible,
    /// Deletion requested; removed at `until`.
    PendingDeletion { until: DateTime<Utc> },
}

/// Durations of the transient display states.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BookTimings {
    pub highlight: TimeDelta,
    pub deletion_grace: TimeDelta,
}

impl Default for BookTimings {
    fn default() -> Self {
        Self {
            highlight: TimeDelta::milliseconds(1600),
            deletion_grace: TimeDelta::milliseconds(380),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ExpenseBook {
    expenses: Vec<Expense>,
    states: HashMap<ExpenseId, DisplayState>,
    timings: BookTimings,
}

impl ExpenseBook {
    pub fn new(timings: BookTimings) -> Self {
        Self {
            expenses: Vec::new(),
            states: HashMap::new(),
            timings,
        }
    }

    /// Builds a book from stored records.
    ///
    /// Records are sorted newest-first by id; a repeated id keeps its first
    /// occurrence. Every record starts `Visible`.
    pub fn from_expenses(expenses: Vec<Expense>, timings: BookTimings) -> Self {
        let mut book = Self::new(timings);
        book.replace_all(expenses);
        book
    }

    /// Replaces the whole collection, dropping any transient state.
    pub fn replace_all(&mut self, expenses: Vec<Expense>) {
        let mut seen = HashSet::with_capacity(expenses.len());
        let mut expenses: Vec<Expense> = expenses
            .into_iter()
            .filter(|expense| seen.insert(expense.id))
            .collect();
        expenses.sort_by(|a, b| b.id.cmp(&a.id));
        self.expenses = expenses;
        self.states.clear();
    }

    /// The records, newest first, including those pending deletion.
    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    pub fn get(&self, id: ExpenseId) -> Option<&Expense> {
        self.expenses.iter().find(|expense| expense.id == id)
    }

    pub fn newest_id(&self) -> Option<ExpenseId> {
        self.expenses.first().map(|expense| expense.id)
    }

    pub fn timings(&self) -> BookTimings {
        self.timings
    }

    /// Inserts a validated draft at the head of the collection.
    pub fn insert(&mut self, valid: ValidExpense, now: DateTime<Utc>) -> &Expense {
        let id = ExpenseId::next(now, self.newest_id());
        let expense = valid.into_expense(id);
        self.states.insert(
            id,
            DisplayState::New {
                until: now + self.timings.highlight,
            },
        );
        self.expenses.insert(0, expense);
        &self.expenses[0]
    }

    /// State of a record as seen at `now`. A `New` record whose highlight has
    /// elapsed reads as `Visible`.
    pub fn state(&self, id: ExpenseId, now: DateTime<Utc>) -> Option<DisplayState> {
        self.get(id)?;
        Some(match self.states.get(&id) {
            Some(DisplayState::New { until }) if *until <= now => DisplayState::Visible,
            Some(state) => *state,
            None => DisplayState::Visible,
        })
    }

    /// Starts deleting `id`; returns when the record will be removed.
    ///
    /// Absent ids are a no-op and return `None`. Asking again for a record
    /// that is already pending keeps its first deadline.
    pub fn request_deletion(&mut self, id: ExpenseId, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.get(id)?;
        if let Some(DisplayState::PendingDeletion { until }) = self.states.get(&id) {
            return Some(*until);
        }
        let until = now + self.timings.deletion_grace;
        self.states
            .insert(id, DisplayState::PendingDeletion { until });
        Some(until)
    }

    /// Applies every transition due at `now` and returns the removed ids.
    pub fn sweep(&mut self, now: DateTime<Utc>) -> Vec<ExpenseId> {
        let mut removed = Vec::new();
        self.states.retain(|id, state| match state {
            DisplayState::New { until } => *until > now,
            DisplayState::PendingDeletion { until } if *until <= now => {
                removed.push(*id);
                false
            }
            _ => true,
        });
        if !removed.is_empty() {
            self.expenses
                .retain(|expense| !removed.contains(&expense.id));
        }
        removed
    }

    /// Removes every record pending deletion, whatever its deadline, and
    /// returns the removed ids. Other transient states are kept.
    pub fn flush_deletions(&mut self) -> Vec<ExpenseId> {
        let mut removed = Vec::new();
        self.states.retain(|id, state| match state {
            DisplayState::PendingDeletion { .. } => {
                removed.push(*id);
                false
            }
            _ => true,
        });
        if !removed.is_empty() {
            self.expenses
                .retain(|expense| !removed.contains(&expense.id));
        }
        removed
    }

    /// Earliest pending deletion deadline, if any.
    pub fn next_deletion(&self) -> Option<DateTime<Utc>> {
        self.states
            .values()
            .filter_map(|state| match state {
                DisplayState::PendingDeletion { until } => Some(*until),
                _ => None,
            })
            .min()
    }
}
