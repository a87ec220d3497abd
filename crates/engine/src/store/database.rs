//! Remote-backed persistence: an `expenses` table scoped by user.

use async_trait::async_trait;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, entity::prelude::*};

use super::{ExpenseStore, StoreKind};
use crate::{Expense, ExpenseId, MoneyCents, ResultEngine, expense};

const INSERT_CHUNK: usize = 100;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub title: String,
    pub amount_minor: i64,
    pub category: String,
    pub date: Option<String>,
    pub note: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// A stored date that is not `YYYY-MM-DD` loads as "no date"; the next save
/// of the collection writes it back as NULL.
impl From<Model> for Expense {
    fn from(model: Model) -> Self {
        let date = model.date.as_deref().and_then(|raw| {
            let parsed = expense::parse_date(raw);
            if parsed.is_none() {
                tracing::warn!("expense {} has malformed date {raw:?}, ignoring it", model.id);
            }
            parsed
        });
        Self {
            id: ExpenseId::new(model.id),
            title: model.title,
            amount: MoneyCents::new(model.amount_minor),
            category: model.category,
            date,
            note: model.note,
        }
    }
}

fn active_model(user_id: &str, expense: &Expense) -> ActiveModel {
    ActiveModel {
        user_id: ActiveValue::Set(user_id.to_string()),
        id: ActiveValue::Set(expense.id.value()),
        title: ActiveValue::Set(expense.title.clone()),
        amount_minor: ActiveValue::Set(expense.amount.cents()),
        category: ActiveValue::Set(expense.category.clone()),
        date: ActiveValue::Set(expense.date.map(expense::format_date)),
        note: ActiveValue::Set(expense.note.clone()),
    }
}

/// Stores collections through sea-orm.
#[derive(Clone, Debug)]
pub struct DatabaseStore {
    database: DatabaseConnection,
}

impl DatabaseStore {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }
}

#[async_trait]
impl ExpenseStore for DatabaseStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Database
    }

    async fn load(&self, user_id: &str) -> ResultEngine<Vec<Expense>> {
        let models = Entity::find()
            .filter(Column::UserId.eq(user_id))
            .order_by_desc(Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Expense::from).collect())
    }

    async fn save(&self, user_id: &str, expenses: &[Expense]) -> ResultEngine<()> {
        let db_tx = self.database.begin().await?;

        Entity::delete_many()
            .filter(Column::UserId.eq(user_id))
            .exec(&db_tx)
            .await?;

        // Keeps each statement under SQLite's bound-parameter limit.
        for chunk in expenses.chunks(INSERT_CHUNK) {
            Entity::insert_many(chunk.iter().map(|expense| active_model(user_id, expense)))
                .exec(&db_tx)
                .await?;
        }

        db_tx.commit().await?;
        Ok(())
    }
}
