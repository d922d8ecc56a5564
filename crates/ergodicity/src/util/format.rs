//! Number formatting for text reports

/// Insert `,` between every group of three digits
fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

fn sign(value: f64) -> &'static str {
    if value < 0.0 { "-" } else { "" }
}

/// `$1,234.56`; non-finite values print as-is
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let cents = (value.abs() * 100.0).round() as u128;
    let whole = group_thousands(&(cents / 100).to_string());
    // Rounding can turn -0.004 into -$0.00
    let sign = if cents == 0 { "" } else { sign(value) };
    format!("{sign}${whole}.{:02}", cents % 100)
}

/// Currency rounded to whole units, for tight table columns
pub fn format_currency_short(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let whole = value.abs().round() as u128;
    let sign = if whole == 0 { "" } else { sign(value) };
    format!("{sign}${}", group_thousands(&whole.to_string()))
}

/// `$2.1M`, `$450K`, `$50`
pub fn format_compact_currency(value: f64) -> String {
    let abs = value.abs();
    let sign = sign(value);
    match abs {
        a if a >= 1e9 => format!("{sign}${:.1}B", a / 1e9),
        a if a >= 1e6 => format!("{sign}${:.1}M", a / 1e6),
        a if a >= 1e3 => format!("{sign}${:.0}K", a / 1e3),
        a => format!("{sign}${a:.0}"),
    }
}

/// A fraction as a percentage: `0.0525` is `5.25%`
pub fn format_percentage(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// A per-step growth rate, or `n/a` when undefined
pub fn format_growth(rate: Option<f64>) -> String {
    rate.map_or_else(|| "n/a".to_string(), |r| format!("{:+.3}%", r * 100.0))
}
