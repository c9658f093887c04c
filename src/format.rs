//! Text formatting helpers for amounts, rates and multi-line fields.

/// Two-character sequence that separates lines in sender, recipient and note fields.
pub const LINE_BREAK: &str = "\\n";

/// Formats `value` as `symbol` followed by the value with exactly two decimals.
pub fn money(symbol: &str, value: f64) -> String {
    format!("{}{:.2}", symbol, value)
}

/// Formats a fractional rate as a percentage using the fewest digits that round-trip.
///
/// `0.15` becomes `15%` and `0.125` becomes `12.5%`.
pub fn percent(rate: f64) -> String {
    format!("{}%", rate * 100.0)
}

/// Builds a totals caption such as `Tax (15%)`.
pub fn rate_caption(label: &str, rate: f64) -> String {
    format!("{} ({})", label, percent(rate))
}

/// Splits a field on literal `\n` sequences. Real newline characters are also accepted.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split(LINE_BREAK).flat_map(|segment| segment.split('\n'))
}
