//! The `Expense` record and the draft it is validated from.
//!
//! An expense is created from an [`ExpenseDraft`] (the raw form input) through
//! [`ExpenseDraft::validate`]. Once created it is immutable; the only other
//! lifecycle step is deletion, handled by the [`ExpenseBook`].
//!
//! [`ExpenseBook`]: crate::ExpenseBook

use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Category, MoneyCents};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Largest amount a single expense may carry: one billion in major units.
pub const MAX_AMOUNT: MoneyCents = MoneyCents::new(100_000_000_000);

/// Identifier of an expense: milliseconds since the epoch at creation.
///
/// Ids double as the default sort key (higher = newer).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ExpenseId(i64);

impl ExpenseId {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> i64 {
        self.0
    }

    /// Id for a record created at `now`, strictly greater than `newest`.
    ///
    /// Two records created within the same millisecond (or a clock that went
    /// backwards) still get distinct, increasing ids.
    pub fn next(now: DateTime<Utc>, newest: Option<ExpenseId>) -> Self {
        let candidate = now.timestamp_millis();
        match newest {
            Some(ExpenseId(newest)) if candidate <= newest => Self(newest.saturating_add(1)),
            _ => Self(candidate),
        }
    }
}

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ExpenseId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// A single user-entered spending event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub title: String,
    #[serde(rename = "amount_minor")]
    pub amount: MoneyCents,
    pub category: String,
    /// `None` when the stored value was missing or not a `YYYY-MM-DD` date.
    #[serde(default, with = "lenient_date")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Expense {
    /// Display category, with unknown names resolved to "Other".
    pub fn display_category(&self) -> &'static Category {
        Category::lookup(&self.category)
    }
}

/// A field-level problem with an [`ExpenseDraft`].
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationError {
    #[error("title required")]
    TitleRequired,
    #[error("invalid amount")]
    InvalidAmount,
    #[error("invalid date")]
    InvalidDate,
}

impl ValidationError {
    /// The draft field the error belongs to.
    pub fn field(self) -> &'static str {
        match self {
            Self::TitleRequired => "title",
            Self::InvalidAmount => "amount",
            Self::InvalidDate => "date",
        }
    }
}

/// Every problem found in a draft, in field order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn contains(&self, error: ValidationError) -> bool {
        self.0.contains(&error)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        f.write_str(&joined)
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationError> for ValidationErrors {
    fn from(value: ValidationError) -> Self {
        Self(vec![value])
    }
}

/// Raw create-expense input, as typed into the form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ExpenseDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub amount: String,
    /// Defaults to the first taxonomy category.
    pub category: Option<String>,
    /// `YYYY-MM-DD`; defaults to today.
    pub date: Option<String>,
    pub note: Option<String>,
}

impl ExpenseDraft {
    pub fn new(title: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            amount: amount.into(),
            ..Default::default()
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Checks the draft and normalises it.
    ///
    /// The amount is rounded to cents here and only here. `today` fills in a
    /// missing date.
    pub fn validate(&self, today: NaiveDate) -> Result<ValidExpense, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let title = self.title.trim();
        if title.is_empty() {
            errors.push(ValidationError::TitleRequired);
        }

        let amount = match self.amount.parse::<MoneyCents>() {
            Ok(amount) if amount.is_positive() && amount <= MAX_AMOUNT => Some(amount),
            _ => {
                errors.push(ValidationError::InvalidAmount);
                None
            }
        };

        let date = match self.date.as_deref().map(str::trim) {
            None | Some("") => Some(today),
            Some(raw) => {
                let parsed = parse_date(raw);
                if parsed.is_none() {
                    errors.push(ValidationError::InvalidDate);
                }
                parsed
            }
        };

        match (amount, date) {
            (Some(amount), Some(date)) if errors.is_empty() => Ok(ValidExpense {
                title: title.to_string(),
                amount,
                category: self
                    .category
                    .clone()
                    .filter(|c| !c.trim().is_empty())
                    .unwrap_or_else(|| Category::default_for_new().name.to_string()),
                date,
                note: normalize_optional_text(self.note.as_deref()),
            }),
            _ => Err(errors),
        }
    }
}

/// A draft that passed validation and only needs an id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidExpense {
    pub title: String,
    pub amount: MoneyCents,
    pub category: String,
    pub date: NaiveDate,
    pub note: Option<String>,
}

impl ValidExpense {
    pub fn into_expense(self, id: ExpenseId) -> Expense {
        Expense {
            id,
            title: self.title,
            amount: self.amount,
            category: self.category,
            date: Some(self.date),
            note: self.note,
        }
    }
}

/// A calendar month, `YYYY-MM`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        Self::of(date) == self
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

/// Error for a string that is not `YYYY-MM`.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("expected a YYYY-MM month")]
pub struct ParseYearMonthError;

impl FromStr for YearMonth {
    type Err = ParseYearMonthError;

    /// Reads the `YYYY-MM` prefix; a full `YYYY-MM-DD` date is accepted too.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let prefix = s.trim().get(..7).ok_or(ParseYearMonthError)?;
        let (year, month) = prefix.split_once('-').ok_or(ParseYearMonthError)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(ParseYearMonthError);
        }
        if !year.chars().chain(month.chars()).all(|c| c.is_ascii_digit()) {
            return Err(ParseYearMonthError);
        }
        let year = year.parse().map_err(|_| ParseYearMonthError)?;
        let month = month.parse().map_err(|_| ParseYearMonthError)?;
        Self::new(year, month).ok_or(ParseYearMonthError)
    }
}

/// Parses a strict `YYYY-MM-DD` calendar date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
}

/// Formats a date as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Serde adapter that never fails on a bad stored date.
mod lenient_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de::IgnoredAny};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Other(IgnoredAny),
    }

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => s.serialize_some(&super::format_date(*date)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        Ok(match Option::<Raw>::deserialize(d)? {
            Some(Raw::Text(text)) => super::parse_date(&text),
            Some(Raw::Other(_)) | None => None,
        })
    }
}
