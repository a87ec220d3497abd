//! Statistics API endpoints: dashboard summary, breakdown and period totals.

use api_types::stats::{Breakdown, Donut, Summary, Totals, TotalsQuery};
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use engine::{DisplayState, YearMonth};

use crate::{ServerError, accounts, expenses::date_param, server::ServerState, views};

pub async fn summary(
    Extension(user): Extension<accounts::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Summary>, ServerError> {
    let (today, now) = state.clock();
    let summary = state.engine.summary(&user.id, today, now).await?;
    let ids: Vec<_> = summary.recent.iter().map(|expense| expense.id).collect();
    let states = state.engine.states(&user.id, &ids, now).await?;

    let recent = summary
        .recent
        .iter()
        .map(|expense| {
            let display = states
                .get(&expense.id)
                .copied()
                .unwrap_or(DisplayState::Visible);
            (expense.clone(), display)
        })
        .collect();

    Ok(Json(views::summary(&state, summary, recent)))
}

pub async fn breakdown(
    Extension(user): Extension<accounts::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Breakdown>, ServerError> {
    let (_, now) = state.clock();
    let rows = state.engine.breakdown(&user.id, now).await?;
    let total_minor = rows.iter().map(|row| row.total.cents()).sum();

    Ok(Json(Breakdown {
        categories: rows
            .iter()
            .map(|row| views::category_total(&state, row))
            .collect(),
        total_minor,
    }))
}

pub async fn donut(
    Extension(user): Extension<accounts::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Donut>, ServerError> {
    let (_, now) = state.clock();
    let donut = state.engine.donut(&user.id, now).await?;
    Ok(Json(views::donut(&state, donut)))
}

pub async fn totals(
    Extension(user): Extension<accounts::Model>,
    State(state): State<ServerState>,
    Query(query): Query<TotalsQuery>,
) -> Result<Json<Totals>, ServerError> {
    let (today, now) = state.clock();
    let month = match query.month.as_deref().map(str::trim) {
        None | Some("") => YearMonth::of(today),
        Some(raw) => raw
            .parse()
            .map_err(|err| ServerError::Generic(format!("{err}: {raw}")))?,
    };
    let date = date_param(query.date.as_deref())?;

    let totals = state.engine.totals(&user.id, month, date, now).await?;
    Ok(Json(Totals {
        total_minor: totals.total.cents(),
        month: totals.month.to_string(),
        month_total_minor: totals.month_total.cents(),
        date: totals.date,
        date_total_minor: totals.date_total.map(|total| total.cents()),
    }))
}
