//! Expenses API endpoints.

use api_types::expense::{
    Deletion, ExpenseCreated, ExpenseFilter, ExpenseList, ExpenseNew, Reloaded,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{NaiveDate, Utc};
use engine::{
    CategoryFilter, DisplayState, ExpenseDraft, ExpenseId, SyncStatus, expense::parse_date,
};

use crate::{ServerError, accounts, server::ServerState, views};

/// Reads an optional `YYYY-MM-DD` query value; empty means "no filter".
pub(crate) fn date_param(raw: Option<&str>) -> Result<Option<NaiveDate>, ServerError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => parse_date(raw)
            .map(Some)
            .ok_or_else(|| ServerError::Generic(format!("invalid date: {raw}"))),
    }
}

pub async fn list(
    Extension(user): Extension<accounts::Model>,
    State(state): State<ServerState>,
    Query(query): Query<ExpenseFilter>,
) -> Result<Json<ExpenseList>, ServerError> {
    let category = CategoryFilter::parse(query.category.as_deref().unwrap_or_default());
    let date = date_param(query.date.as_deref())?;
    let (_, now) = state.clock();

    let history = state.engine.history(&user.id, &category, date, now).await?;
    let expenses: Vec<_> = history
        .entries
        .into_iter()
        .map(|entry| views::expense(&state, entry.expense, entry.state))
        .collect();

    Ok(Json(ExpenseList {
        count: expenses.len(),
        expenses,
        total_minor: history.total.cents(),
        total: state.money(history.total),
    }))
}

pub async fn create(
    Extension(user): Extension<accounts::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseCreated>), ServerError> {
    let draft = ExpenseDraft {
        title: payload.title,
        amount: payload.amount,
        category: payload.category,
        date: payload.date,
        note: payload.note,
    };
    let (today, now) = state.clock();

    let created = state.engine.add_expense(&user.id, &draft, today, now).await?;
    let display = state
        .engine
        .states(&user.id, &[created.value.id], now)
        .await?
        .remove(&created.value.id)
        .unwrap_or(DisplayState::Visible);

    Ok((
        StatusCode::CREATED,
        Json(ExpenseCreated {
            expense: views::expense(&state, created.value, display),
            synced: created.sync == SyncStatus::Saved,
        }),
    ))
}

/// Starts deleting an expense and schedules the sweep that completes it.
pub async fn remove(
    Extension(user): Extension<accounts::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<Deletion>), ServerError> {
    let id = ExpenseId::new(id);
    let (_, now) = state.clock();
    let pending_until = state.engine.delete_expense(&user.id, id, now).await?;

    if let Some(until) = pending_until {
        let engine = state.engine.clone();
        let user_id = user.id.clone();
        let wait = (until - now).to_std().unwrap_or_default();
        tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            match engine.sweep(&user_id, Utc::now()).await {
                Ok(swept) if swept.sync == SyncStatus::Failed => {
                    tracing::warn!("deletion of {id} for {user_id} was not saved");
                }
                Ok(_) => {}
                Err(err) => tracing::warn!("sweep for {user_id} failed: {err}"),
            }
        });
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(Deletion {
            id: id.value(),
            pending_until,
        }),
    ))
}

/// Re-reads the collection after the store changed elsewhere.
pub async fn reload(
    Extension(user): Extension<accounts::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Reloaded>, ServerError> {
    let count = state.engine.reload(&user.id).await?;
    Ok(Json(Reloaded { count }))
}
