//! Formatters over an `AggregationResult`
//!
//! Nothing here computes: every number comes from the aggregation, and values
//! are rounded to two decimals only when rendered.

pub mod csv;
pub mod text;

use rust_decimal::{Decimal, RoundingStrategy};

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Render a decimal with exactly two fraction digits
pub fn format_hours(value: Decimal) -> String {
    format!("{:.2}", round2(value))
}

/// Render a decimal with two fraction digits and thousands separators
pub fn format_amount(value: Decimal) -> String {
    let plain = format_hours(value.abs());
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let len = int_part.len();
    let mut grouped = String::with_capacity(len + len / 3);
    // Digits are ASCII, so byte indexing is safe
    for (i, ch) in int_part.bytes().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch as char);
    }

    let sign = if value.is_sign_negative() && !round2(value).is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}{}.{}", sign, grouped, frac_part)
}
