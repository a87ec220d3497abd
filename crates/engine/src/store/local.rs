//! Local-only persistence: one JSON document per user.
//!
//! Each user's collection lives in `<root>/<user_id>.json` as a JSON array,
//! newest first. A missing file is an empty collection. Writes go to a
//! temporary sibling first and are renamed into place.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{ExpenseStore, StoreKind};
use crate::{EngineError, Expense, ResultEngine};

#[derive(Clone, Debug)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, user_id: &str) -> ResultEngine<PathBuf> {
        let valid = !user_id.is_empty()
            && user_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(EngineError::Storage(format!(
                "user id not usable as a file name: {user_id:?}"
            )));
        }
        Ok(self.root.join(format!("{user_id}.json")))
    }
}

#[async_trait]
impl ExpenseStore for LocalStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Local
    }

    async fn load(&self, user_id: &str) -> ResultEngine<Vec<Expense>> {
        let path = self.path_for(user_id)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn save(&self, user_id: &str, expenses: &[Expense]) -> ResultEngine<()> {
        let path = self.path_for(user_id)?;
        tokio::fs::create_dir_all(&self.root).await?;

        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(expenses)?;
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        tracing::debug!(
            "saved {} expenses for {user_id} to {}",
            expenses.len(),
            path.display()
        );
        Ok(())
    }
}
