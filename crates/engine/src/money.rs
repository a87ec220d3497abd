use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Money amount represented as **integer cents**.
///
/// Use this type for **all** monetary values in the engine (expense amounts,
/// totals, averages) to avoid floating-point drift. Rounding to cents happens
/// exactly once, when user input is parsed. Arithmetic saturates at the `i64`
/// bounds instead of wrapping.
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// assert_eq!(amount.format_with("₹"), "₹12.34");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; extra
/// decimals are rounded half away from zero):
///
/// ```rust
/// use engine::MoneyCents;
///
/// assert_eq!("10".parse::<MoneyCents>().unwrap().cents(), 1000);
/// assert_eq!("10,5".parse::<MoneyCents>().unwrap().cents(), 1050);
/// assert_eq!("19.995".parse::<MoneyCents>().unwrap().cents(), 2000);
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct MoneyCents(i64);

/// Why a decimal string could not be turned into cents.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ParseMoneyError {
    #[error("empty amount")]
    Empty,
    #[error("invalid amount")]
    Invalid,
    #[error("amount too large")]
    Overflow,
}

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_add(rhs.0).map(MoneyCents)
    }

    /// Divides by `count`, rounding half away from zero to a whole cent.
    ///
    /// Returns zero when `count` is zero.
    #[must_use]
    pub fn div_rounded(self, count: usize) -> MoneyCents {
        if count == 0 {
            return MoneyCents::ZERO;
        }
        let count = i128::try_from(count).unwrap_or(i128::MAX);
        let value = i128::from(self.0);
        let half = count / 2;
        let rounded = if value >= 0 {
            (value + half) / count
        } else {
            (value - half) / count
        };
        MoneyCents(i64::try_from(rounded).unwrap_or(i64::MAX))
    }

    /// The amount as a floating-point number of major units.
    ///
    /// Only meant for ratios (percentages, chart geometry), never for sums.
    #[must_use]
    pub fn as_major_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Formats the amount prefixed by a currency symbol.
    #[must_use]
    pub fn format_with(self, symbol: &str) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{sign}{symbol}{}.{:02}", abs / 100, abs % 100)
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_with(""))
    }
}

impl From<i64> for MoneyCents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<MoneyCents> for i64 {
    fn from(value: MoneyCents) -> Self {
        value.0
    }
}

impl Add for MoneyCents {
    type Output = MoneyCents;

    fn add(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for MoneyCents {
    fn add_assign(&mut self, rhs: MoneyCents) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for MoneyCents {
    type Output = MoneyCents;

    fn sub(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for MoneyCents {
    fn sub_assign(&mut self, rhs: MoneyCents) {
        self.0 = self.0.saturating_sub(rhs.0);
    }
}

impl Sum for MoneyCents {
    fn sum<I: Iterator<Item = MoneyCents>>(iter: I) -> Self {
        iter.fold(MoneyCents::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a MoneyCents> for MoneyCents {
    fn sum<I: Iterator<Item = &'a MoneyCents>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl FromStr for MoneyCents {
    type Err = ParseMoneyError;

    /// Parses a decimal string into cents.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
    /// Digits past the second decimal are rounded half away from zero using
    /// the decimal digits themselves, so `19.995` is exactly `20.00`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseMoneyError::Empty);
        }

        let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (true, stripped)
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (false, stripped)
        } else {
            (false, trimmed)
        };

        let rest = rest.trim();
        if rest.is_empty() {
            return Err(ParseMoneyError::Empty);
        }

        let rest = rest.replace(',', ".");
        let mut parts = rest.split('.');
        let units_str = parts.next().ok_or(ParseMoneyError::Invalid)?;
        let frac_str = parts.next().unwrap_or("");

        if parts.next().is_some() {
            return Err(ParseMoneyError::Invalid);
        }
        // ".5" is fine, "." is not.
        if units_str.is_empty() && frac_str.is_empty() {
            return Err(ParseMoneyError::Invalid);
        }
        if !units_str.chars().all(|c| c.is_ascii_digit())
            || !frac_str.chars().all(|c| c.is_ascii_digit())
        {
            return Err(ParseMoneyError::Invalid);
        }

        let units: i64 = if units_str.is_empty() {
            0
        } else {
            units_str.parse().map_err(|_| ParseMoneyError::Overflow)?
        };

        let digit = |idx: usize| -> i64 {
            frac_str
                .as_bytes()
                .get(idx)
                .map_or(0, |b| i64::from(b - b'0'))
        };
        let mut cents = digit(0) * 10 + digit(1);
        if digit(2) >= 5 {
            cents += 1;
        }

        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or(ParseMoneyError::Overflow)?;

        Ok(MoneyCents(if negative { -total } else { total }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_two_decimals() {
        assert_eq!(MoneyCents::new(0).to_string(), "0.00");
        assert_eq!(MoneyCents::new(1).to_string(), "0.01");
        assert_eq!(MoneyCents::new(10).to_string(), "0.10");
        assert_eq!(MoneyCents::new(1050).to_string(), "10.50");
        assert_eq!(MoneyCents::new(-1050).to_string(), "-10.50");
        assert_eq!(MoneyCents::new(-1050).format_with("₹"), "-₹10.50");
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("10".parse::<MoneyCents>().unwrap().cents(), 1000);
        assert_eq!("10.5".parse::<MoneyCents>().unwrap().cents(), 1050);
        assert_eq!("10,50".parse::<MoneyCents>().unwrap().cents(), 1050);
        assert_eq!(".5".parse::<MoneyCents>().unwrap().cents(), 50);
        assert_eq!("4.".parse::<MoneyCents>().unwrap().cents(), 400);
        assert_eq!("-0.01".parse::<MoneyCents>().unwrap().cents(), -1);
        assert_eq!("+1.00".parse::<MoneyCents>().unwrap().cents(), 100);
        assert_eq!("  2.30 ".parse::<MoneyCents>().unwrap().cents(), 230);
    }

    #[test]
    fn parse_rounds_half_away_from_zero() {
        assert_eq!("19.995".parse::<MoneyCents>().unwrap().cents(), 2000);
        assert_eq!("19.994".parse::<MoneyCents>().unwrap().cents(), 1999);
        assert_eq!("0.004".parse::<MoneyCents>().unwrap().cents(), 0);
        assert_eq!("0.005".parse::<MoneyCents>().unwrap().cents(), 1);
        assert_eq!("-2.345".parse::<MoneyCents>().unwrap().cents(), -235);
        assert_eq!("1.23999".parse::<MoneyCents>().unwrap().cents(), 124);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!("".parse::<MoneyCents>(), Err(ParseMoneyError::Empty));
        assert_eq!("  ".parse::<MoneyCents>(), Err(ParseMoneyError::Empty));
        assert_eq!("-".parse::<MoneyCents>(), Err(ParseMoneyError::Empty));
        assert_eq!(".".parse::<MoneyCents>(), Err(ParseMoneyError::Invalid));
        assert_eq!("abc".parse::<MoneyCents>(), Err(ParseMoneyError::Invalid));
        assert_eq!("1e3".parse::<MoneyCents>(), Err(ParseMoneyError::Invalid));
        assert_eq!("1.2.3".parse::<MoneyCents>(), Err(ParseMoneyError::Invalid));
        assert_eq!("1 000".parse::<MoneyCents>(), Err(ParseMoneyError::Invalid));
        assert_eq!(
            "99999999999999999999".parse::<MoneyCents>(),
            Err(ParseMoneyError::Overflow)
        );
    }

    #[test]
    fn div_rounded_handles_zero_and_halves() {
        assert_eq!(MoneyCents::new(1000).div_rounded(0), MoneyCents::ZERO);
        assert_eq!(MoneyCents::new(1000).div_rounded(3), MoneyCents::new(333));
        assert_eq!(MoneyCents::new(1001).div_rounded(2), MoneyCents::new(501));
        assert_eq!(MoneyCents::new(-1001).div_rounded(2), MoneyCents::new(-501));
    }

    #[test]
    fn sums_saturate_instead_of_overflowing() {
        let huge = MoneyCents::new(i64::MAX - 1);
        let total: MoneyCents = [huge, huge, MoneyCents::new(5)].iter().sum();
        assert_eq!(total, MoneyCents::new(i64::MAX));

        let mut running = huge;
        running += huge;
        assert_eq!(running, MoneyCents::new(i64::MAX));
        assert_eq!(MoneyCents::new(i64::MIN) - MoneyCents::new(1), MoneyCents::new(i64::MIN));
    }

    #[test]
    fn repeated_sums_do_not_drift() {
        let amount: MoneyCents = "19.995".parse().unwrap();
        let total: MoneyCents = std::iter::repeat_n(amount, 1000).sum();
        assert_eq!(total, MoneyCents::new(2_000_000));
    }
}
