//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` and from `EXPENSIFY_*` environment variables,
//! e.g. `EXPENSIFY_SERVER__PORT=8080`.
//!
//! See `settings.toml` for the configuration.
use std::path::PathBuf;

use chrono_tz::Tz;
use config::{Config, ConfigError, Environment, File};
use engine::StoreKind;
use serde::Deserialize;
use server::MessageStyle;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
    /// Zone whose calendar decides "today".
    pub timezone: Tz,
    pub currency_symbol: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    /// Holds the accounts, and the expenses with the `database` backend.
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
    pub backend: StoreKind,
    /// Directory of the `local` backend.
    pub path: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct Display {
    pub deletion_grace_ms: u32,
    pub highlight_ms: u32,
}

#[derive(Debug, Default, Deserialize)]
pub struct Auth {
    /// Overrides the backend's default wording of auth failures.
    pub messages: Option<MessageStyle>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub storage: Storage,
    pub display: Display,
    #[serde(default)]
    pub auth: Auth,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("app.level", "info")?
            .set_default("app.timezone", "Asia/Kolkata")?
            .set_default("app.currency_symbol", "₹")?
            .set_default("server.port", 3000)?
            .set_default("server.database", "memory")?
            .set_default("storage.backend", StoreKind::default().as_str())?
            .set_default("storage.path", "data/expenses")?
            .set_default("display.deletion_grace_ms", 380)?
            .set_default("display.highlight_ms", 1600)?
            .add_source(File::with_name("settings").required(false))
            .add_source(
                Environment::with_prefix("EXPENSIFY")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Auth message style, falling back to the storage backend's default.
    pub fn message_style(&self) -> MessageStyle {
        self.auth
            .messages
            .unwrap_or_else(|| MessageStyle::default_for(self.storage.backend))
    }
}
