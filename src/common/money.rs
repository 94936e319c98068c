// src/common/money.rs

use rust_decimal::{Decimal, RoundingStrategy};

/// Arredonda para centavos (meio para cima, como o usuário espera ver no PDF).
pub fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Arredonda quantidades para a escala de NUMERIC(12, 3).
pub fn round_quantity(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero)
}

/// Maior valor que cabe em NUMERIC(14, 2).
pub fn max_amount() -> Decimal {
    Decimal::new(99_999_999_999_999, 2)
}

/// Maior quantidade que cabe em NUMERIC(12, 3).
pub fn max_quantity() -> Decimal {
    Decimal::new(999_999_999_999, 3)
}

/// quantity × price × (1 + vat/100), em centavos. `None` se estourar.
pub fn line_total(quantity: Decimal, price: Decimal, vat: Decimal) -> Option<Decimal> {
    let multiplier = Decimal::ONE + vat / Decimal::ONE_HUNDRED;
    quantity
        .checked_mul(price)?
        .checked_mul(multiplier)
        .map(round_cents)
}

pub fn document_total<I>(line_totals: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    line_totals.into_iter().fold(Decimal::ZERO, |acc, t| acc + t)
}

/// Formata um valor com duas casas.
/// Separador "," => "1 234,56"; qualquer outro => "1,234.56".
pub fn format_currency(amount: Decimal, decimal_separator: &str) -> String {
    let comma_decimal = decimal_separator == ",";
    let (thousands, decimal) = if comma_decimal { (' ', ',') } else { (',', '.') };

    let fixed = format!("{:.2}", round_cents(amount));
    let (sign, digits) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(thousands);
        }
        grouped.push(ch);
    }

    format!("{}{}{}{}", sign, grouped, decimal, frac_part)
}

pub fn format_price(amount: Decimal, currency: &str, decimal_separator: &str) -> String {
    format!("{} {}", format_currency(amount, decimal_separator), currency)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn line_total_applies_vat() {
        assert_eq!(line_total(d("2"), d("100"), d("21")), Some(d("242.00")));
        assert_eq!(line_total(d("1"), d("1500"), Decimal::ZERO), Some(d("1500")));
    }

    #[test]
    fn line_total_rounds_to_cents() {
        // 3 × 0.33 × 1.2 = 1.188
        assert_eq!(line_total(d("3"), d("0.33"), d("20")), Some(d("1.19")));
        assert_eq!(line_total(d("1"), d("0.125"), Decimal::ZERO), Some(d("0.13")));
    }

    #[test]
    fn line_total_overflow_is_none() {
        let huge = d("100000000000000000000");
        assert_eq!(line_total(huge, huge, Decimal::ZERO), None);
        assert_eq!(line_total(Decimal::MAX, d("2"), Decimal::ZERO), None);
    }

    #[test]
    fn column_limits() {
        assert_eq!(max_amount(), d("999999999999.99"));
        assert_eq!(max_quantity(), d("999999999.999"));
    }

    #[test]
    fn document_total_sums_lines() {
        let total = document_total(vec![d("242.00"), d("10.50"), d("0.01")]);
        assert_eq!(total, d("252.51"));
        assert_eq!(document_total(Vec::new()), Decimal::ZERO);
    }

    #[test]
    fn comma_separator_groups_with_spaces() {
        assert_eq!(format_currency(d("1234567.891"), ","), "1 234 567,89");
        assert_eq!(format_currency(d("999"), ","), "999,00");
        assert_eq!(format_currency(d("1000"), ","), "1 000,00");
    }

    #[test]
    fn dot_separator_groups_with_commas() {
        assert_eq!(format_currency(d("1234.5"), "."), "1,234.50");
        assert_eq!(format_currency(d("0"), "."), "0.00");
    }

    #[test]
    fn negative_amounts_keep_their_sign() {
        assert_eq!(format_currency(d("-1500"), ","), "-1 500,00");
    }

    #[test]
    fn price_appends_currency() {
        assert_eq!(format_price(d("12.3"), "EUR", ","), "12,30 EUR");
    }
}
