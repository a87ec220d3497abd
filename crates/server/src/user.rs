//! Signup, login and logout endpoints.

use api_types::user::{Login, Profile, Signup};
use axum::{Extension, Json, extract::State, http::StatusCode};
use uuid::Uuid;

use crate::{
    ServerError,
    accounts::{self, AccountError, Model},
    server::ServerState,
};

fn reject(state: &ServerState, err: AccountError) -> ServerError {
    match err {
        AccountError::Form(errors) => ServerError::Form(errors),
        AccountError::Auth(err) => ServerError::Auth(err, state.options.messages),
        AccountError::Database(err) => err.into(),
    }
}

fn profile(user: Model, expenses: Option<usize>) -> Result<Profile, ServerError> {
    let id = Uuid::parse_str(&user.id)
        .map_err(|err| ServerError::Generic(format!("malformed user id: {err}")))?;
    Ok(Profile {
        id,
        name: user.name,
        email: user.email,
        created_at: user.created_at,
        expenses,
    })
}

/// Creates an account and opens its (empty) session.
pub async fn signup(
    State(state): State<ServerState>,
    Json(payload): Json<Signup>,
) -> Result<(StatusCode, Json<Profile>), ServerError> {
    let user = accounts::register(&state.db, &payload.name, &payload.email, &payload.password)
        .await
        .map_err(|err| reject(&state, err))?;
    let expenses = state.engine.open_session(&user.id).await?;

    Ok((StatusCode::CREATED, Json(profile(user, Some(expenses))?)))
}

/// Verifies the credentials and loads the user's expenses.
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<Login>,
) -> Result<Json<Profile>, ServerError> {
    let user = accounts::authenticate(&state.db, &payload.email, &payload.password)
        .await
        .map_err(|err| reject(&state, err))?;
    let expenses = state.engine.open_session(&user.id).await?;
    tracing::info!("user {} logged in with {expenses} expenses", user.id);

    Ok(Json(profile(user, Some(expenses))?))
}

pub async fn logout(
    Extension(user): Extension<Model>,
    State(state): State<ServerState>,
) -> StatusCode {
    if state.engine.close_session(&user.id).await {
        tracing::info!("user {} logged out", user.id);
    }
    StatusCode::NO_CONTENT
}
