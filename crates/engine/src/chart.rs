//! Geometry for the spending donut.
//!
//! The donut is a ring of arcs, one per category in taxonomy order. Arcs too
//! short to render are dropped from the drawing but still take up their
//! share of the ring and of the center total.

use std::f64::consts::PI;

use serde::Serialize;

use crate::{Category, Expense, MoneyCents, aggregate};

/// Outer size of the chart.
pub const DONUT_SIZE: f64 = 170.0;
/// Ring thickness.
pub const DONUT_STROKE: f64 = 22.0;
/// Arcs of this length or less are not drawn.
pub const MIN_ARC: f64 = 2.0;

/// One drawable arc.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DonutSlice {
    pub category: &'static Category,
    pub total: MoneyCents,
    /// Percentage of the total, clamped to `[0, 100]`.
    pub percent: f64,
    /// Arc length.
    pub dash: f64,
    /// Remaining circumference after the arc.
    pub gap: f64,
    /// Arc start, measured along the ring.
    pub offset: f64,
}

/// The laid-out donut.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Donut {
    pub size: f64,
    pub stroke: f64,
    pub radius: f64,
    pub circumference: f64,
    /// Center label: everything spent, including omitted slivers.
    pub total: MoneyCents,
    pub slices: Vec<DonutSlice>,
}

impl Donut {
    /// `true` when there is nothing to draw ("No data yet").
    pub fn is_empty(&self) -> bool {
        self.total.is_zero()
    }
}

/// Clamps a percentage into `[0, 100]`; NaN becomes 0.
pub fn clamp_percent(percent: f64) -> f64 {
    if percent.is_nan() {
        return 0.0;
    }
    percent.clamp(0.0, 100.0)
}

/// Lays out the donut for `expenses` over the whole taxonomy.
pub fn donut(expenses: &[Expense]) -> Donut {
    let radius = (DONUT_SIZE - DONUT_STROKE) / 2.0;
    let circumference = 2.0 * PI * radius;
    let total = aggregate::total(expenses);

    let mut slices = Vec::new();
    if !total.is_zero() {
        let mut offset = 0.0;
        for category in Category::all() {
            let sum: MoneyCents = expenses
                .iter()
                .filter(|e| e.display_category().name == category.name)
                .map(|e| e.amount)
                .sum();
            let percent = clamp_percent(aggregate::percent_of_total(sum, total));
            let dash = percent / 100.0 * circumference;
            let start = offset;
            offset += dash;
            if dash > MIN_ARC {
                slices.push(DonutSlice {
                    category,
                    total: sum,
                    percent,
                    dash,
                    gap: circumference - dash,
                    offset: start,
                });
            }
        }
    }

    Donut {
        size: DONUT_SIZE,
        stroke: DONUT_STROKE,
        radius,
        circumference,
        total,
        slices,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::ExpenseId;

    fn expense(id: i64, cents: i64, category: &str) -> Expense {
        Expense {
            id: ExpenseId::new(id),
            title: "x".to_string(),
            amount: MoneyCents::new(cents),
            category: category.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1),
            note: None,
        }
    }

    #[test]
    fn empty_donut_has_no_slices() {
        let chart = donut(&[]);
        assert!(chart.is_empty());
        assert!(chart.slices.is_empty());
        assert_eq!(chart.radius, 74.0);
    }

    #[test]
    fn slices_follow_taxonomy_order_and_fill_the_ring() {
        let chart = donut(&[expense(2, 300, "Health"), expense(1, 100, "Food & Dining")]);
        let names: Vec<&str> = chart.slices.iter().map(|s| s.category.name).collect();
        assert_eq!(names, vec!["Food & Dining", "Health"]);
        assert!((chart.slices[0].percent - 25.0).abs() < 1e-9);
        assert_eq!(chart.slices[0].offset, 0.0);
        assert!((chart.slices[1].offset - chart.slices[0].dash).abs() < 1e-9);
        let drawn: f64 = chart.slices.iter().map(|s| s.dash).sum();
        assert!((drawn - chart.circumference).abs() < 1e-9);
        for slice in &chart.slices {
            assert!((slice.dash + slice.gap - chart.circumference).abs() < 1e-9);
        }
    }

    #[test]
    fn slivers_are_omitted_but_counted() {
        // 1 cent out of 100_001 is far below a 2-unit arc.
        let chart = donut(&[expense(2, 100_000, "Shopping"), expense(1, 1, "Transport")]);
        assert_eq!(chart.slices.len(), 1);
        assert_eq!(chart.slices[0].category.name, "Shopping");
        assert_eq!(chart.total, MoneyCents::new(100_001));
        // Transport precedes Shopping, so its sliver still shifts the offset.
        assert!(chart.slices[0].offset > 0.0);
    }

    #[test]
    fn clamp_keeps_percent_in_range() {
        assert_eq!(clamp_percent(-5.0), 0.0);
        assert_eq!(clamp_percent(150.0), 100.0);
        assert_eq!(clamp_percent(f64::NAN), 0.0);
        assert_eq!(clamp_percent(42.5), 42.5);
    }
}
