//! Currency and percentage display formatting
//!
//! One fixed format: US dollars, two decimals, comma thousands separators.

/// Format an amount as `$1,234.50`
///
/// Negative amounts keep their sign after the symbol (`$-42.00`).
/// Non-finite amounts format as zero.
pub fn format_currency(amount: f64) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let fixed = format!("{:.2}", amount);
    let (sign, digits) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, "00"));
    format!("${}{}.{}", sign, group_thousands(whole), fraction)
}

/// Format an amount without cents (`$1,500`)
pub fn format_whole(amount: f64) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let fixed = format!("{:.0}", amount);
    match fixed.strip_prefix('-') {
        Some(rest) => format!("$-{}", group_thousands(rest)),
        None => format!("${}", group_thousands(&fixed)),
    }
}

/// Round a percentage to a whole number (`42%`)
pub fn format_percent(percentage: f64) -> String {
    let percentage = if percentage.is_finite() {
        percentage
    } else {
        0.0
    };
    format!("{}%", percentage.round() as i64)
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
