//! Input sanitization for numeric budget fields
//!
//! Fields are cleaned on every keystroke. Values are clamped into
//! `[0, max]`, never rejected; hitting the ceiling raises a
//! `limit_exceeded` flag the session turns into a warning toast.

use crate::models::MAX_AMOUNT;

/// Result of sanitizing a raw field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitized {
    /// Cleaned field contents (may be empty)
    pub value: String,
    /// True when the value was clamped down to the maximum
    pub limit_exceeded: bool,
}

/// Sanitize a raw field against the default maximum (999999)
pub fn sanitize(raw: &str) -> Sanitized {
    sanitize_with_limit(raw, MAX_AMOUNT)
}

/// Sanitize a raw field against an explicit maximum
///
/// Keeps only ASCII digits and `.`; with several decimal points the first
/// one is kept and the remaining digit groups are concatenated
/// (`"1.2.3"` becomes `"1.23"`).
pub fn sanitize_with_limit(raw: &str, max: f64) -> Sanitized {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let mut value = match cleaned.split_once('.') {
        Some((head, tail)) if tail.contains('.') => {
            format!("{}.{}", head, tail.replace('.', ""))
        }
        _ => cleaned,
    };

    if leading_number(&value).is_some_and(|v| v < 0.0) {
        value = "0".to_string();
    }

    let mut limit_exceeded = false;
    if leading_number(&value).unwrap_or(0.0) > max {
        value = max.to_string();
        limit_exceeded = true;
    }

    Sanitized {
        value,
        limit_exceeded,
    }
}

/// Numeric reading of a field, as used by every computation
///
/// Reads the leading number (so `"12abc"` is 12), treats empty or
/// unreadable input as 0 and clamps into `[0, 999999]`.
pub fn parse_amount(raw: &str) -> f64 {
    parse_amount_with_limit(raw, MAX_AMOUNT)
}

pub fn parse_amount_with_limit(raw: &str, max: f64) -> f64 {
    match leading_number(raw) {
        Some(v) if v.is_finite() => v.clamp(0.0, max),
        Some(v) if v == f64::INFINITY => max,
        _ => 0.0,
    }
}

/// Parse the longest numeric prefix of `s` (after leading whitespace)
fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut has_digits = end > digits_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start || has_digits {
            end = frac_end;
            has_digits = true;
        }
    }

    if !has_digits {
        return None;
    }
    s[..end].trim_end_matches('.').parse::<f64>().ok()
}

/// Which form field a feedback bar belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Income,
    Expense,
}

/// How alarming an expense share looks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackLevel {
    Empty,
    Ok,
    Caution,
    Danger,
}

/// Fill level of the small bar under each input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputFeedback {
    /// Bar fill in percent, `[0, 100]`
    pub fill: f64,
    pub level: FeedbackLevel,
}

/// Income reference for the income bar
const INCOME_SCALE: f64 = 10_000.0;

/// Compute the feedback bar for a field
///
/// Income fills against a fixed 10,000 scale. Expenses fill against the
/// current income, dividing by 1 when no income is entered.
pub fn input_feedback(kind: FieldKind, value: f64, income: f64) -> InputFeedback {
    let fill = match kind {
        FieldKind::Income => value / INCOME_SCALE * 100.0,
        FieldKind::Expense => {
            let base = if income > 0.0 { income } else { 1.0 };
            value / base * 100.0
        }
    };
    let fill = if fill.is_finite() {
        fill.clamp(0.0, 100.0)
    } else {
        0.0
    };

    let level = match kind {
        _ if fill <= 0.0 => FeedbackLevel::Empty,
        FieldKind::Income => FeedbackLevel::Ok,
        FieldKind::Expense if fill > 50.0 => FeedbackLevel::Danger,
        FieldKind::Expense if fill > 30.0 => FeedbackLevel::Caution,
        FieldKind::Expense => FeedbackLevel::Ok,
    };

    InputFeedback { fill, level }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_non_numeric() {
        assert_eq!(sanitize("$1,234.50").value, "1234.50");
        assert_eq!(sanitize("abc").value, "");
        assert_eq!(sanitize("").value, "");
        assert_eq!(sanitize("-250").value, "250");
        assert_eq!(sanitize(" 12 ").value, "12");
    }

    #[test]
    fn test_sanitize_collapses_decimal_points() {
        assert_eq!(sanitize("1.2.3").value, "1.23");
        assert_eq!(sanitize("..5").value, ".5");
        assert_eq!(sanitize("10.").value, "10.");
        assert_eq!(sanitize("1.2.3.4").value, "1.234");
    }

    #[test]
    fn test_sanitize_clamps_to_maximum() {
        let result = sanitize("1000000");
        assert_eq!(result.value, "999999");
        assert!(result.limit_exceeded);

        let result = sanitize("999999");
        assert_eq!(result.value, "999999");
        assert!(!result.limit_exceeded);

        let result = sanitize("999999.01");
        assert_eq!(result.value, "999999");
        assert!(result.limit_exceeded);
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let inputs = [
            "", "abc", "12.5", "1.2.3", "$9,999,999", "-0.5", ".", "00012", "5e10", "1..",
        ];
        for raw in inputs {
            let once = sanitize(raw).value;
            let twice = sanitize(&once);
            assert_eq!(twice.value, once, "not idempotent for {:?}", raw);
            assert!(!twice.limit_exceeded);
        }
    }

    #[test]
    fn test_sanitized_values_parse_within_bounds() {
        let inputs = ["", "abc", "99999999999999999999", "1e400", "12.5", "..."];
        for raw in inputs {
            let value = parse_amount(&sanitize(raw).value);
            assert!((0.0..=MAX_AMOUNT).contains(&value), "{:?} -> {}", raw, value);
        }
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("."), 0.0);
        assert_eq!(parse_amount("abc"), 0.0);
        assert_eq!(parse_amount("12abc"), 12.0);
        assert_eq!(parse_amount("12."), 12.0);
        assert_eq!(parse_amount(".5"), 0.5);
        assert_eq!(parse_amount("-40"), 0.0);
        assert_eq!(parse_amount("5000000"), MAX_AMOUNT);
    }

    #[test]
    fn test_custom_limit() {
        let result = sanitize_with_limit("150", 100.0);
        assert_eq!(result.value, "100");
        assert!(result.limit_exceeded);
        assert_eq!(parse_amount_with_limit("150", 100.0), 100.0);
    }

    #[test]
    fn test_input_feedback_income_scale() {
        let fb = input_feedback(FieldKind::Income, 5000.0, 0.0);
        assert_eq!(fb.fill, 50.0);
        assert_eq!(fb.level, FeedbackLevel::Ok);

        let fb = input_feedback(FieldKind::Income, 20000.0, 0.0);
        assert_eq!(fb.fill, 100.0);
    }

    #[test]
    fn test_input_feedback_expense_levels() {
        assert_eq!(
            input_feedback(FieldKind::Expense, 0.0, 4000.0).level,
            FeedbackLevel::Empty
        );
        assert_eq!(
            input_feedback(FieldKind::Expense, 800.0, 4000.0).level,
            FeedbackLevel::Ok
        );
        assert_eq!(
            input_feedback(FieldKind::Expense, 1600.0, 4000.0).level,
            FeedbackLevel::Caution
        );
        assert_eq!(
            input_feedback(FieldKind::Expense, 2400.0, 4000.0).level,
            FeedbackLevel::Danger
        );
    }

    #[test]
    fn test_input_feedback_zero_income_divides_by_one() {
        let fb = input_feedback(FieldKind::Expense, 0.5, 0.0);
        assert_eq!(fb.fill, 50.0);
        let fb = input_feedback(FieldKind::Expense, 3.0, 0.0);
        assert_eq!(fb.fill, 100.0);
        assert_eq!(fb.level, FeedbackLevel::Danger);
    }
}
