//! Conversions from engine values to API bodies.

use api_types::{
    category::CategoryView,
    expense::{ExpenseState, ExpenseView},
    stats::{CategoryAmount, Donut, DonutSlice, Summary},
};
use engine::{Category, CategoryBar, CategoryTotal, DisplayState, Expense, MoneyCents};

use crate::server::ServerState;

pub fn category(category: &Category) -> CategoryView {
    CategoryView {
        name: category.name.to_string(),
        icon: category.icon.to_string(),
        color: category.color.to_string(),
        background: category.background.to_string(),
    }
}

fn state(state: DisplayState) -> ExpenseState {
    match state {
        DisplayState::New { until } => ExpenseState::New { until },
        DisplayState::Visible => ExpenseState::Visible,
        DisplayState::PendingDeletion { until } => ExpenseState::PendingDeletion { until },
    }
}

pub fn expense(server: &ServerState, expense: Expense, display: DisplayState) -> ExpenseView {
    ExpenseView {
        id: expense.id.value(),
        amount_minor: expense.amount.cents(),
        amount: server.money(expense.amount),
        display: category(expense.display_category()),
        title: expense.title,
        category: expense.category,
        date: expense.date,
        note: expense.note,
        state: state(display),
    }
}

fn amount(server: &ServerState, category: &Category, total: MoneyCents, percent: f64) -> CategoryAmount {
    CategoryAmount {
        category: self::category(category),
        total_minor: total.cents(),
        total: server.money(total),
        percent,
    }
}

pub fn category_total(server: &ServerState, row: &CategoryTotal) -> CategoryAmount {
    amount(server, row.category, row.total, row.percent)
}

fn category_bar(server: &ServerState, bar: &CategoryBar) -> CategoryAmount {
    amount(server, bar.category, bar.total, bar.percent)
}

pub fn donut(server: &ServerState, donut: engine::Donut) -> Donut {
    Donut {
        size: donut.size,
        stroke: donut.stroke,
        radius: donut.radius,
        circumference: donut.circumference,
        total_minor: donut.total.cents(),
        total: server.money(donut.total),
        slices: donut
            .slices
            .into_iter()
            .map(|slice| DonutSlice {
                category: slice.category.name.to_string(),
                color: slice.category.color.to_string(),
                percent: slice.percent,
                dash: slice.dash,
                gap: slice.gap,
                offset: slice.offset,
            })
            .collect(),
    }
}

/// `recent` carries the display state of each recent record.
pub fn summary(
    server: &ServerState,
    summary: engine::Summary,
    recent: Vec<(Expense, DisplayState)>,
) -> Summary {
    Summary {
        total_minor: summary.total.cents(),
        total: server.money(summary.total),
        month: summary.month.to_string(),
        month_total_minor: summary.month_total.cents(),
        month_total: server.money(summary.month_total),
        count: summary.count,
        average_minor: summary.average.cents(),
        average: server.money(summary.average),
        top_categories: summary
            .top_categories
            .iter()
            .map(|bar| category_bar(server, bar))
            .collect(),
        recent: recent
            .into_iter()
            .map(|(record, display)| expense(server, record, display))
            .collect(),
        donut: donut(server, summary.donut),
    }
}
