//! Monetary parsing and formatting in the Brazilian locale convention.
//!
//! Spreadsheet cells arrive either as plain decimals (`1234.56`) or as
//! locale-formatted text (`R$ 1.234,56`). [`parse_currency`] accepts both and,
//! under the lenient policy, turns anything unparsable into zero so that a
//! single garbled cell never aborts an import. [`format_currency`] is the
//! inverse used only at the export boundary.

use std::str::FromStr;

use anyhow::{Result, anyhow};
use rust_decimal::Decimal;

/// Currency marker prefixed to formatted values.
pub const CURRENCY_MARKER: &str = "R$";

/// How unparsable monetary text is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsePolicy {
    /// Unparsable cells become zero. Missing and garbled cells are
    /// indistinguishable under this policy.
    Lenient,
    /// Unparsable cells are an error.
    Strict,
}

/// Parses a monetary cell leniently, falling back to zero.
pub fn parse_currency(input: &str) -> Decimal {
    parse_currency_with(input, ParsePolicy::Lenient).unwrap_or(Decimal::ZERO)
}

/// Parses a monetary cell under the given policy.
///
/// A cell that already reads as a plain decimal is taken as-is. Otherwise the
/// currency marker is stripped, `.` thousands separators removed, and the `,`
/// decimal separator converted before parsing.
pub fn parse_currency_with(input: &str, policy: ParsePolicy) -> Result<Decimal> {
    match parse_currency_text(input) {
        Some(value) => Ok(value),
        None => match policy {
            ParsePolicy::Lenient => Ok(Decimal::ZERO),
            ParsePolicy::Strict => Err(anyhow!("Failed to parse '{input}' as currency")),
        },
    }
}

fn parse_currency_text(input: &str) -> Option<Decimal> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = Decimal::from_str(trimmed) {
        return Some(value);
    }
    let stripped = trimmed.strip_prefix(CURRENCY_MARKER).unwrap_or(trimmed).trim();
    let normalized = stripped.replace('.', "").replace(',', ".");
    Decimal::from_str(&normalized).ok()
}

/// Renders a decimal as `R$ 1.234,56`: two fraction digits, `.` thousands
/// separator, `,` decimal separator.
pub fn format_currency(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{CURRENCY_MARKER} {sign}{grouped},{frac_part}")
}
