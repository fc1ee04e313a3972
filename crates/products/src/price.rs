//! Exact-decimal prices.
//!
//! Prices never pass through binary floating point. Text input must be a plain
//! decimal literal: optional sign, digits, optional fraction. Surrounding
//! whitespace is ignored; thousands separators, exponents and locale forms are
//! rejected. Parsing is exact (no rounding), and comparison is numeric, so
//! `"12.5"` and `"12.50"` are the same price.

use rust_decimal::Decimal;
use stockroom_core::{DataValidationError, ValidationResult};

/// Fractional digits kept by the store (`NUMERIC(14, 2)`).
pub const PRICE_SCALE: u32 = 2;

/// Total significant digits kept by the store (`NUMERIC(14, 2)`).
pub const PRICE_PRECISION: u32 = 14;

/// A price as supplied by a caller: already exact, or still text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceInput {
    Decimal(Decimal),
    Text(String),
}

impl PriceInput {
    /// Normalize to an exact decimal.
    pub fn to_decimal(&self) -> ValidationResult<Decimal> {
        match self {
            PriceInput::Decimal(d) => Ok(*d),
            PriceInput::Text(s) => parse_price(s),
        }
    }
}

impl From<Decimal> for PriceInput {
    fn from(value: Decimal) -> Self {
        PriceInput::Decimal(value)
    }
}

impl From<&str> for PriceInput {
    fn from(value: &str) -> Self {
        PriceInput::Text(value.to_string())
    }
}

impl From<String> for PriceInput {
    fn from(value: String) -> Self {
        PriceInput::Text(value)
    }
}

/// Parse a plain decimal literal exactly.
pub fn parse_price(text: &str) -> ValidationResult<Decimal> {
    let literal = plain_decimal_literal(text.trim()).ok_or_else(|| invalid_price(text))?;
    Decimal::from_str_exact(&literal).map_err(|_| invalid_price(text))
}

/// Parse the textual form of a JSON number (which may use an exponent).
pub(crate) fn parse_json_number(text: &str) -> ValidationResult<Decimal> {
    parse_price(text)
        .or_else(|_| Decimal::from_scientific(text).map_err(|_| invalid_price(text)))
}

/// Whether the price fits the store column without rounding.
pub fn fits_store_column(price: Decimal) -> bool {
    let max_integer_digits = PRICE_PRECISION - PRICE_SCALE;
    let limit = Decimal::from(10_i64.pow(max_integer_digits));
    price.normalize().scale() <= PRICE_SCALE && price.abs().trunc() < limit
}

/// Rewrite a plain literal as `[-]<int>[.<frac>]`, or `None` if it is not one.
fn plain_decimal_literal(s: &str) -> Option<String> {
    let (negative, unsigned) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part) {
        return None;
    }

    let mut literal = String::with_capacity(unsigned.len() + 2);
    if negative {
        literal.push('-');
    }
    literal.push_str(if int_part.is_empty() { "0" } else { int_part });
    if !frac_part.is_empty() {
        literal.push('.');
        literal.push_str(frac_part);
    }
    Some(literal)
}

fn invalid_price(text: &str) -> DataValidationError {
    DataValidationError::invalid(format!("Invalid decimal for [price]: {text}"))
}
