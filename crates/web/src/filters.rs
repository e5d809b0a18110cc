//! Custom Askama template filters.

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Result count line for a store listing.
///
/// Usage in templates: `{{ total|store_count }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn store_count(total: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(store_count_label(&total.to_string()))
}

fn store_count_label(total: &str) -> String {
    match total {
        "0" => "No stores found".to_owned(),
        "1" => "1 store".to_owned(),
        n => format!("{n} stores"),
    }
}
