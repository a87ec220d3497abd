use std::sync::Arc;

use chrono::TimeDelta;
use engine::{DatabaseStore, Engine, ExpenseStore, LocalStore, MemoryStore, StoreKind};
use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "expensify={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let db = match parse_database(&settings.server.database).await {
        Ok(db) => db,
        Err(err) => {
            tracing::error!("failed to initialize database: {err}");
            return Err(err);
        }
    };

    let store: Arc<dyn ExpenseStore> = match settings.storage.backend {
        StoreKind::Local => {
            tracing::info!("storing expenses in {}", settings.storage.path.display());
            Arc::new(LocalStore::new(&settings.storage.path))
        }
        StoreKind::Database => Arc::new(DatabaseStore::new(db.clone())),
        StoreKind::Memory => {
            tracing::warn!("expenses are kept in memory and lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    let engine = Engine::builder()
        .store(store)
        .deletion_grace(TimeDelta::milliseconds(settings.display.deletion_grace_ms.into()))
        .highlight(TimeDelta::milliseconds(settings.display.highlight_ms.into()))
        .build();

    let options = server::Options {
        timezone: settings.app.timezone,
        currency_symbol: settings.app.currency_symbol.clone(),
        messages: settings.message_style(),
    };

    let bind = settings
        .server
        .bind
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, settings.server.port);
    server::run(engine, db, options, &addr).await;

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
