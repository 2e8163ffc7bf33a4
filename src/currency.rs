//! Brazilian currency rendering for aggregated report values.

use bigdecimal::BigDecimal;

/// Formats an amount in the Brazilian convention: `R$` prefix, `.` as the
/// thousands separator, `,` as the decimal separator, two fraction digits
/// always shown (`R$16.540.000,00`).
///
/// Only aggregated report values pass through here; raw stored amounts are
/// returned to clients as plain numbers.
pub fn format_brl(amount: &BigDecimal) -> String {
    let value = amount.with_scale(2);
    let repr = value.to_string();
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*digit);
    }

    format!("R${grouped},{frac_part}")
}
