use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use sea_orm::DatabaseConnection;

use std::sync::Arc;

use crate::{
    MessageStyle,
    accounts::{self, AccountError},
    categories, expenses, statistics, user,
};
use engine::Engine;

/// Presentation settings of the HTTP API.
#[derive(Clone, Debug)]
pub struct Options {
    /// Zone whose calendar decides "today" and "this month".
    pub timezone: Tz,
    pub currency_symbol: String,
    pub messages: MessageStyle,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::Asia::Kolkata,
            currency_symbol: "₹".to_string(),
            messages: MessageStyle::Specific,
        }
    }
}

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
    pub options: Arc<Options>,
}

impl ServerState {
    /// Current instant and the calendar date it falls on locally.
    pub fn clock(&self) -> (NaiveDate, DateTime<Utc>) {
        let now = Utc::now();
        (now.with_timezone(&self.options.timezone).date_naive(), now)
    }

    pub fn money(&self, amount: engine::MoneyCents) -> String {
        amount.format_with(&self.options.currency_symbol)
    }
}

/// Checks Basic credentials (`email:password`) and exposes the account to
/// the handlers.
async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(credentials)) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if credentials.username().is_empty() || credentials.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user = match accounts::authenticate(
        &state.db,
        credentials.username(),
        credentials.password(),
    )
    .await
    {
        Ok(user) => user,
        Err(AccountError::Auth(_) | AccountError::Form(_)) => {
            return Err(StatusCode::UNAUTHORIZED);
        }
        Err(AccountError::Database(err)) => {
            tracing::error!("failed to load user: {err}");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Builds the application router.
pub fn router(engine: Engine, db: DatabaseConnection, options: Options) -> Router {
    let state = ServerState {
        engine: Arc::new(engine),
        db,
        options: Arc::new(options),
    };

    Router::new()
        .route("/logout", post(user::logout))
        .route("/expenses", get(expenses::list).post(expenses::create))
        .route("/expenses/reload", post(expenses::reload))
        .route("/expenses/{id}", delete(expenses::remove))
        .route("/summary", get(statistics::summary))
        .route("/breakdown", get(statistics::breakdown))
        .route("/donut", get(statistics::donut))
        .route("/totals", get(statistics::totals))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .route("/signup", post(user::signup))
        .route("/login", post(user::login))
        .route("/categories", get(categories::list))
        .with_state(state)
}

pub async fn run(engine: Engine, db: DatabaseConnection, options: Options, addr: &str) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, db, options, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    options: Options,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(
        "Server listening on {} with {} store",
        addr,
        engine.store_kind()
    );

    axum::serve(listener, router(engine, db, options)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    options: Options,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, db, options, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
