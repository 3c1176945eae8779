//! Display formatting for calculation traces and reports.
//!
//! Hundredths-scaled values (fen, COIN hundredths, basis points) print with
//! thousands grouping; whole values print without decimals and fractional
//! ones with exactly two.

use crate::constants::FEN_PER_YUAN;

/// Group digits in threes: `1234567` → `"1,234,567"`.
pub fn group_digits(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format a hundredths-scaled value: `84_000` → `"840"`, `35_050` → `"350.50"`.
pub fn format_hundredths(value: u64) -> String {
    let whole = value / FEN_PER_YUAN;
    let frac = value % FEN_PER_YUAN;
    if frac == 0 {
        group_digits(whole)
    } else {
        format!("{}.{frac:02}", group_digits(whole))
    }
}

/// Point counts: integer grouping.
pub fn format_points(points: u64) -> String {
    group_digits(points)
}

/// Currency in fen: `"¥10,000"`.
pub fn format_currency(fen: u64) -> String {
    format!("¥{}", format_hundredths(fen))
}

/// COIN in hundredths: `"840 枚"`.
pub fn format_coin(hundredths: u64) -> String {
    format!("{} 枚", format_hundredths(hundredths))
}

/// Basis points as a percentage: `7_000` → `"70%"`, `50` → `"0.50%"`.
pub fn format_percent(bps: u64) -> String {
    format!("{}%", format_hundredths(bps))
}
