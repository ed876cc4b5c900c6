//! Small numeric helpers shared by the breadth and scoring code.

/// Round to two decimal places, ties to the even digit.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Percentage `part / whole * 100` rounded to two places.
/// Returns `None` when `whole` is zero so callers can omit the row.
pub fn pct_of(part: usize, whole: usize) -> Option<f64> {
    if whole == 0 {
        return None;
    }
    Some(round2(part as f64 / whole as f64 * 100.0))
}

/// Signed distance of `value` from `reference` in percent, rounded to two places.
/// `None` for a zero or non-finite reference.
pub fn pct_from(value: f64, reference: f64) -> Option<f64> {
    if reference == 0.0 || !reference.is_finite() || !value.is_finite() {
        return None;
    }
    Some(round2((value - reference) / reference * 100.0))
}
