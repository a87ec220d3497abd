//! Persistence collaborators.
//!
//! The engine never decides how a collection is stored. It hands the whole,
//! newest-first collection of a user to an [`ExpenseStore`] after every
//! mutation and asks for it back when a session starts. Format, transport
//! and durability are the store's business.

use std::{collections::HashMap, fmt, sync::Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{EngineError, Expense, ResultEngine};

pub mod database;
pub mod local;

pub use database::DatabaseStore;
pub use local::LocalStore;

/// Which backend a store is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    /// A JSON document per user on local disk.
    Local,
    /// Rows in a SQL database, scoped by user.
    #[default]
    Database,
    /// Process memory only.
    Memory,
}

impl StoreKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Database => "database",
            Self::Memory => "memory",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durable home of every user's expense collection.
///
/// `user_id` is an opaque key; stores must keep collections of different
/// users apart and must not interpret it.
#[async_trait]
pub trait ExpenseStore: Send + Sync {
    fn kind(&self) -> StoreKind;

    /// Reads a user's collection. A user with nothing stored has an empty one.
    async fn load(&self, user_id: &str) -> ResultEngine<Vec<Expense>>;

    /// Replaces a user's stored collection with `expenses`.
    async fn save(&self, user_id: &str, expenses: &[Expense]) -> ResultEngine<()>;
}

/// Keeps collections in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<Expense>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> EngineError {
        EngineError::Storage("memory store lock poisoned".to_string())
    }
}

#[async_trait]
impl ExpenseStore for MemoryStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Memory
    }

    async fn load(&self, user_id: &str) -> ResultEngine<Vec<Expense>> {
        let collections = self.collections.lock().map_err(|_| Self::poisoned())?;
        Ok(collections.get(user_id).cloned().unwrap_or_default())
    }

    async fn save(&self, user_id: &str, expenses: &[Expense]) -> ResultEngine<()> {
        let mut collections = self.collections.lock().map_err(|_| Self::poisoned())?;
        collections.insert(user_id.to_string(), expenses.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ExpenseId, MoneyCents};

    fn record(id: i64) -> Expense {
        Expense {
            id: ExpenseId::new(id),
            title: "Lunch".to_string(),
            amount: MoneyCents::new(1200),
            category: "Food & Dining".to_string(),
            date: None,
            note: None,
        }
    }

    #[tokio::test]
    async fn memory_store_scopes_by_user() {
        let store = MemoryStore::new();
        store.save("alice", &[record(2), record(1)]).await.unwrap();
        store.save("bob", &[record(3)]).await.unwrap();

        assert_eq!(store.load("alice").await.unwrap().len(), 2);
        assert_eq!(store.load("bob").await.unwrap(), vec![record(3)]);
        assert!(store.load("carol").await.unwrap().is_empty());
        assert_eq!(store.kind(), StoreKind::Memory);
    }
}
