// 🖋️ Formatters - national ID, dates, card numbers, currency
//
// Every formatter is total: bad input renders the "-" placeholder (or the
// visible "NaN" for currency), never a panic or an error.

use crate::records::LegacyValue;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Rendered for any field with no usable value
pub const PLACEHOLDER: &str = "-";

const NATIONAL_ID_DIGITS: usize = 11;
const LONG_CARD_NUMBER: usize = 16;

// ============================================================================
// NATIONAL ID (CPF)
// ============================================================================

/// Format an 11-digit national ID as `XXX.XXX.XXX-XX`.
///
/// Non-digits are stripped and short input is left-padded with zeros (numeric
/// payloads lose their leading zeros upstream). More than 11 digits is not a
/// national ID and renders the placeholder.
pub fn format_national_id(raw: Option<&LegacyValue>) -> String {
    let Some(raw) = raw else {
        return PLACEHOLDER.to_string();
    };

    let digits: String = raw.as_text().chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.is_empty() || digits.len() > NATIONAL_ID_DIGITS {
        return PLACEHOLDER.to_string();
    }

    let padded = format!("{:0>width$}", digits, width = NATIONAL_ID_DIGITS);

    format!(
        "{}.{}.{}-{}",
        &padded[0..3],
        &padded[3..6],
        &padded[6..9],
        &padded[9..11]
    )
}

// ============================================================================
// DATES
// ============================================================================

/// Render a legacy date as `DD/MM/YYYY`.
///
/// ISO-8601 dates and date-times are accepted; the calendar date is taken as
/// written, so the time-of-day and offset never move the day. Input that is
/// already `DD/MM/YYYY` comes back unchanged.
pub fn format_date(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return PLACEHOLDER.to_string();
    };

    if let Some(date) = parse_iso_date(raw) {
        return date.format("%d/%m/%Y").to_string();
    }

    if is_display_date(raw) {
        return raw.to_string();
    }

    PLACEHOLDER.to_string()
}

fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.date_naive());
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}

/// `\d{2}/\d{2}/\d{4}`, shape only
fn is_display_date(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            2 | 5 => *b == b'/',
            _ => b.is_ascii_digit(),
        })
}

// ============================================================================
// CARD NUMBERS
// ============================================================================

/// Group a card / registration number for display.
///
/// 16 or more characters: `1 3 <middle> 1` (middle is 11 wide for 16, 12 for
/// 17). Shorter: groups of 4.
pub fn format_card_number(raw: Option<&str>) -> String {
    let chars: Vec<char> = raw
        .unwrap_or("")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if chars.is_empty() {
        return PLACEHOLDER.to_string();
    }

    if chars.len() >= LONG_CARD_NUMBER {
        let last = chars.len() - 1;
        let groups = [&chars[0..1], &chars[1..4], &chars[4..last], &chars[last..]];
        return groups
            .iter()
            .map(|g| g.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join(" ");
    }

    chars
        .chunks(4)
        .map(|g| g.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// CURRENCY
// ============================================================================

/// CurrencyInput - Amount as a number or as text to be parsed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CurrencyInput {
    Number(f64),
    Text(String),
}

impl CurrencyInput {
    /// Parsed value; unparseable or empty text is NaN, not zero
    pub fn value(&self) -> f64 {
        match self {
            CurrencyInput::Number(n) => *n,
            CurrencyInput::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    f64::NAN
                } else {
                    s.parse::<f64>().unwrap_or(f64::NAN)
                }
            }
        }
    }
}

impl From<f64> for CurrencyInput {
    fn from(value: f64) -> Self {
        CurrencyInput::Number(value)
    }
}

impl From<&str> for CurrencyInput {
    fn from(value: &str) -> Self {
        CurrencyInput::Text(value.to_string())
    }
}

/// Render an amount in Brazilian reais: `R$ 1.234,56`.
///
/// NaN stays visible as `R$ NaN` so data-quality problems are not masked as
/// zero.
pub fn format_currency(value: impl Into<CurrencyInput>) -> String {
    let value = value.into().value();

    if value.is_nan() {
        return "R$ NaN".to_string();
    }

    let sign = if value < 0.0 { "-" } else { "" };

    if value.is_infinite() {
        return format!("{}R$ ∞", sign);
    }

    let fixed = format!("{:.2}", value.abs());
    let (integer, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    format!("{}R$ {},{}", sign, group_thousands(integer), cents)
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }

    out
}

// ============================================================================
// TESTS
// ============================================================================
