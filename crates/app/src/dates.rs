//! Report dates as typed on the command line.

use chrono::{Days, NaiveDate};

use crate::error::{AppError, Result};

/// Resolve `input` against `today`.
///
/// Accepts `today`/`hoy`, `yesterday`/`ayer`, `N days ago`, `hace N dias`,
/// `-N` and ISO `YYYY-MM-DD`.
pub fn parse(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let normalized = input.trim().to_lowercase();
    let words: Vec<&str> = normalized.split_whitespace().collect();

    let days_back = match words.as_slice() {
        ["today"] | ["hoy"] => Some(0),
        ["yesterday"] | ["ayer"] => Some(1),
        [n, "day" | "days", "ago"] | ["hace", n, "dia" | "dias" | "día" | "días"] => {
            Some(count(n, input)?)
        }
        [single] if single.starts_with('-') => Some(count(&single[1..], input)?),
        _ => None,
    };

    match days_back {
        Some(days) => today
            .checked_sub_days(Days::new(days))
            .ok_or_else(|| AppError::InvalidDate(input.to_string())),
        None => NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
            .map_err(|_| AppError::InvalidDate(input.to_string())),
    }
}

fn count(n: &str, input: &str) -> Result<u64> {
    n.parse()
        .map_err(|_| AppError::InvalidDate(input.to_string()))
}
