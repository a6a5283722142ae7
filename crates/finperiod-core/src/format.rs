//! Period-over-period percentage formatting.

/// Relative change from `previous` to `current`, in percent.
///
/// Returns `None` when `previous` is zero.
pub fn percent_change(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 {
        return None;
    }
    // `+ 0.0` folds negative zero so equal values never print as `-0.00%`.
    Some((current - previous) / previous * 100.0 + 0.0)
}

/// Formats the change with an explicit sign and two decimals, e.g. `+50.00%`.
///
/// A zero baseline always yields `+0.00%`.
pub fn format_change(current: f64, previous: f64) -> String {
    match percent_change(current, previous) {
        Some(change) => format!("{change:+.2}%"),
        None => "+0.00%".to_string(),
    }
}
