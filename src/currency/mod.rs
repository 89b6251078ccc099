use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, TripError};

/// Rate applied when the live lookup has not succeeded this session.
pub const DEFAULT_SECONDARY_TO_PRIMARY: f64 = 0.215;

/// ISO 4217 currency representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CurrencyCode(pub String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which side of the fixed currency pair an amount is denominated in.
///
/// `Primary` is the traveller's home currency, `Secondary` the destination's.
/// The legacy codes `TWD` and `JPY` are accepted when reading older exports.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    #[serde(alias = "TWD")]
    Primary,
    #[serde(alias = "JPY")]
    Secondary,
}

impl Currency {
    pub fn other(self) -> Self {
        match self {
            Currency::Primary => Currency::Secondary,
            Currency::Secondary => Currency::Primary,
        }
    }

    /// Parses user input, accepting either the side name or a configured code.
    pub fn parse(input: &str, pair: &CurrencyPair) -> Result<Self> {
        let value = input.trim();
        if value.eq_ignore_ascii_case("primary") || value.eq_ignore_ascii_case(pair.primary.as_str())
        {
            return Ok(Currency::Primary);
        }
        if value.eq_ignore_ascii_case("secondary")
            || value.eq_ignore_ascii_case(pair.secondary.as_str())
        {
            return Ok(Currency::Secondary);
        }
        Err(TripError::InvalidInput(format!(
            "unknown currency `{}` (use {} or {})",
            value, pair.primary, pair.secondary
        )))
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Currency::Primary => "primary",
            Currency::Secondary => "secondary",
        };
        f.pad(label)
    }
}

/// The two currencies the app works with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrencyPair {
    pub primary: CurrencyCode,
    pub secondary: CurrencyCode,
}

impl CurrencyPair {
    pub fn code(&self, currency: Currency) -> &CurrencyCode {
        match currency {
            Currency::Primary => &self.primary,
            Currency::Secondary => &self.secondary,
        }
    }
}

impl Default for CurrencyPair {
    fn default() -> Self {
        Self {
            primary: CurrencyCode::new("TWD"),
            secondary: CurrencyCode::new("JPY"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RateSource {
    Live,
    Fallback,
}

impl fmt::Display for RateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RateSource::Live => "live",
            RateSource::Fallback => "fallback",
        };
        f.pad(label)
    }
}

/// How many primary units one secondary unit buys.
///
/// The value is always finite and strictly positive, so dividing by it is
/// always defined.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ExchangeRate {
    secondary_to_primary: f64,
    source: RateSource,
}

impl ExchangeRate {
    pub fn new(secondary_to_primary: f64, source: RateSource) -> Result<Self> {
        if !secondary_to_primary.is_finite() || secondary_to_primary <= 0.0 {
            return Err(TripError::InvalidInput(format!(
                "exchange rate must be a positive number, got {}",
                secondary_to_primary
            )));
        }
        Ok(Self {
            secondary_to_primary,
            source,
        })
    }

    pub fn live(secondary_to_primary: f64) -> Result<Self> {
        Self::new(secondary_to_primary, RateSource::Live)
    }

    /// Builds the session fallback, reverting to the built-in default when the
    /// configured value is unusable.
    pub fn fallback(secondary_to_primary: f64) -> Self {
        Self::new(secondary_to_primary, RateSource::Fallback).unwrap_or(Self {
            secondary_to_primary: DEFAULT_SECONDARY_TO_PRIMARY,
            source: RateSource::Fallback,
        })
    }

    pub fn secondary_to_primary(&self) -> f64 {
        self.secondary_to_primary
    }

    pub fn source(&self) -> RateSource {
        self.source
    }
}

impl Default for ExchangeRate {
    fn default() -> Self {
        Self::fallback(DEFAULT_SECONDARY_TO_PRIMARY)
    }
}

pub fn symbol_for(code: &str) -> String {
    match code {
        "TWD" => "NT$".into(),
        "JPY" => "¥".into(),
        "USD" => "$".into(),
        "EUR" => "€".into(),
        "GBP" => "£".into(),
        "KRW" => "₩".into(),
        _ => code.into(),
    }
}

pub fn minor_units_for(code: &str) -> u8 {
    match code {
        "JPY" | "KRW" => 0,
        "KWD" | "BHD" => 3,
        _ => 2,
    }
}

/// Formats `value` with `precision` decimals and comma thousands grouping.
pub fn format_number(value: f64, precision: u8) -> String {
    let body = format!("{:.*}", precision as usize, value.abs());
    let (int_part, frac_part) = match body.find('.') {
        Some(pos) => (&body[..pos], &body[pos..]),
        None => (body.as_str(), ""),
    };
    let sign = if value < 0.0 && body.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };
    format!("{}{}{}", sign, group_digits(int_part, ','), frac_part)
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::new();
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped
}

/// Renders an amount the way the expense screens show it, e.g. `NT$ 1,234`.
pub fn format_currency_value(amount: f64, code: &CurrencyCode, precision: u8) -> String {
    format!(
        "{} {}",
        symbol_for(code.as_str()),
        format_number(amount, precision)
    )
}

/// Whole-unit rendering used for totals and approximations.
pub fn format_rounded(amount: f64, code: &CurrencyCode) -> String {
    format_currency_value(amount.round(), code, 0)
}
