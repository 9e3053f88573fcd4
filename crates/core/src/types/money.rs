//! Money formatting helpers.
//!
//! All monetary amounts in Feira are `rust_decimal::Decimal` values in BRL.
//! Arithmetic stays in `Decimal` everywhere; formatting to the Brazilian
//! convention (`R$ 1.234,56`) happens only at the display edge.

use rust_decimal::Decimal;

/// Format a decimal amount as Brazilian reais.
///
/// Rounds to two decimal places, uses a comma as the decimal separator and a
/// dot as the thousands separator.
#[must_use]
pub fn format_brl(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let negative = rounded.is_sign_negative();
    let abs = rounded.abs();

    let plain = format!("{abs:.2}");
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    let digits: Vec<char> = int_part.chars().collect();
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*c);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}R$ {grouped},{frac_part}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(value: i64, scale: u32) -> Decimal {
        Decimal::new(value, scale)
    }

    #[test]
    fn test_format_brl_simple() {
        assert_eq!(format_brl(dec(1500, 2)), "R$ 15,00");
        assert_eq!(format_brl(dec(9999, 2)), "R$ 99,99");
    }

    #[test]
    fn test_format_brl_zero() {
        assert_eq!(format_brl(Decimal::ZERO), "R$ 0,00");
    }

    #[test]
    fn test_format_brl_thousands() {
        assert_eq!(format_brl(dec(123_456_789, 2)), "R$ 1.234.567,89");
        assert_eq!(format_brl(dec(100_000, 2)), "R$ 1.000,00");
    }

    #[test]
    fn test_format_brl_rounds_to_cents() {
        assert_eq!(format_brl(dec(10_005, 3)), "R$ 10,01");
    }

    #[test]
    fn test_format_brl_negative() {
        assert_eq!(format_brl(dec(-1050, 2)), "-R$ 10,50");
    }
}
