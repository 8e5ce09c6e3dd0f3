//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Formats a price-like value as rupees.
///
/// Usage in templates: `{{ item.price|lkr }}`
#[askama::filter_fn]
pub fn lkr(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let raw = value.to_string();
    // Prices render as "LKR 1234.50"; pass through values that already
    // carry the prefix (Price's Display does).
    if raw.starts_with("LKR ") {
        return Ok(raw);
    }
    raw.parse::<f64>().map_or_else(
        |_| Ok(format!("LKR {raw}")),
        |amount| Ok(format!("LKR {amount:.2}")),
    )
}

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}
