use std::{fmt, sync::OnceLock};

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const DEFAULT_NA_REP: &str = "NA";
/// Written and read spelling of positive infinity; negative is `-Inf`.
pub const INF_REP: &str = "Inf";
const DATE_FORMAT: &str = "%Y-%m-%d";

fn na_regex() -> &'static Regex {
    static NA: OnceLock<Regex> = OnceLock::new();
    NA.get_or_init(|| Regex::new(r"(?i)^(NA|NaN|#?N/A)$").expect("valid NA pattern"))
}

fn number_regex() -> &'static Regex {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    NUMBER.get_or_init(|| {
        Regex::new(r"^[-+]?\d*\.?\d+([eE][-+]?\d+)?$").expect("valid number pattern")
    })
}

/// A single table value.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub enum Cell {
    Number(f64),
    Text(String),
    Date(NaiveDate),
    #[default]
    Missing,
}

/// Options controlling how cells are rendered as text.
#[derive(Debug, Clone)]
pub struct CellFormat {
    /// Decimal places for non-integer numbers; `None` keeps full precision.
    pub dp: Option<usize>,
    pub na_rep: String,
}

impl Default for CellFormat {
    fn default() -> Self {
        Self {
            dp: None,
            na_rep: DEFAULT_NA_REP.to_string(),
        }
    }
}

/// Returns true when `token` is one of the default NA sentinels
/// (empty, `NA`, `N/A`, `#N/A`, `NaN`).
pub fn is_na_token(token: &str) -> bool {
    token.is_empty() || na_regex().is_match(token)
}

impl Cell {
    /// Infers a typed cell from a raw token.
    pub fn parse(token: &str, keep_default_na: bool) -> Cell {
        if keep_default_na && is_na_token(token.trim()) {
            return Cell::Missing;
        }
        if token.is_empty() {
            return Cell::Text(String::new());
        }
        let trimmed = token.trim();
        if let Some(value) = parse_infinity(trimmed) {
            return Cell::Number(value);
        }
        if number_regex().is_match(trimmed)
            && let Ok(value) = trimmed.parse::<f64>()
        {
            return Cell::Number(value);
        }
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
            return Cell::Date(date);
        }
        Cell::Text(token.to_string())
    }

    pub fn text(value: impl Into<String>) -> Cell {
        Cell::Text(value.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Cell::Number(_))
    }

    /// Numeric view of the cell; anything that is not a number is `NaN`.
    pub fn as_f64(&self) -> f64 {
        match self {
            Cell::Number(v) => *v,
            _ => f64::NAN,
        }
    }

    /// Numeric value if this is a finite number.
    pub fn as_finite(&self) -> Option<f64> {
        match self {
            Cell::Number(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    pub fn as_display(&self) -> String {
        self.to_display_with(&CellFormat::default())
    }

    pub fn to_display_with(&self, format: &CellFormat) -> String {
        match self {
            Cell::Number(v) => format_number(*v, format.dp),
            Cell::Text(s) => s.clone(),
            Cell::Date(d) => d.format(DATE_FORMAT).to_string(),
            Cell::Missing => format.na_rep.clone(),
        }
    }
}

fn parse_infinity(token: &str) -> Option<f64> {
    let (sign, rest) = match token.as_bytes().first() {
        Some(b'-') => (-1.0, &token[1..]),
        Some(b'+') => (1.0, &token[1..]),
        _ => (1.0, token),
    };
    (rest == INF_REP).then_some(sign * f64::INFINITY)
}

fn format_number(value: f64, dp: Option<usize>) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let sign = if value < 0.0 { "-" } else { "" };
        return format!("{sign}{INF_REP}");
    }
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{value:.0}");
    }
    match dp {
        Some(places) => format!("{value:.places$}"),
        None => value.to_string(),
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Cell::Number(a), Cell::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Cell::Text(a), Cell::Text(b)) => a == b,
            (Cell::Date(a), Cell::Date(b)) => a == b,
            (Cell::Missing, Cell::Missing) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<NaiveDate> for Cell {
    fn from(value: NaiveDate) -> Self {
        Cell::Date(value)
    }
}

/// Spreadsheet-style name for a zero-based column: `A`..`Z`, `AA`, `AB`, ...
pub fn excel_col_name(col: usize) -> String {
    let mut n = col + 1;
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push((b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    letters.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_recognises_default_na_sentinels() {
        for token in ["", "NA", "na", "N/A", "#N/A", "NaN"] {
            assert_eq!(Cell::parse(token, true), Cell::Missing, "token {token:?}");
        }
        assert_eq!(Cell::parse("NA", false), Cell::text("NA"));
        assert_eq!(Cell::parse("", false), Cell::text(""));
    }

    #[test]
    fn parse_infers_numbers_dates_and_text() {
        assert_eq!(Cell::parse("42", true), Cell::Number(42.0));
        assert_eq!(Cell::parse("-1.5e3", true), Cell::Number(-1500.0));
        assert_eq!(Cell::parse(".25", true), Cell::Number(0.25));
        assert_eq!(
            Cell::parse("2024-05-06", true),
            Cell::Date(NaiveDate::from_ymd_opt(2024, 5, 6).unwrap())
        );
        assert_eq!(Cell::parse("BRCA1", true), Cell::text("BRCA1"));
        assert_eq!(Cell::parse("inf", true), Cell::text("inf"));
        assert_eq!(Cell::parse("Inf", true), Cell::Number(f64::INFINITY));
        assert_eq!(Cell::parse("+Inf", true), Cell::Number(f64::INFINITY));
        assert_eq!(Cell::parse("-Inf", true), Cell::Number(f64::NEG_INFINITY));
        assert_eq!(Cell::parse("Infinity", true), Cell::text("Infinity"));
        assert_eq!(Cell::parse("0x1F", true), Cell::text("0x1F"));
    }

    #[test]
    fn display_drops_fraction_for_integers() {
        assert_eq!(Cell::Number(3.0).as_display(), "3");
        assert_eq!(Cell::Number(0.125).as_display(), "0.125");
        let format = CellFormat {
            dp: Some(2),
            ..CellFormat::default()
        };
        assert_eq!(Cell::Number(0.126).to_display_with(&format), "0.13");
        assert_eq!(Cell::Missing.as_display(), "NA");
        assert_eq!(Cell::Number(f64::INFINITY).to_display_with(&format), "Inf");
        assert_eq!(Cell::Number(f64::NEG_INFINITY).as_display(), "-Inf");
    }

    #[test]
    fn excel_col_name_rolls_over() {
        assert_eq!(excel_col_name(0), "A");
        assert_eq!(excel_col_name(25), "Z");
        assert_eq!(excel_col_name(26), "AA");
        assert_eq!(excel_col_name(27), "AB");
        assert_eq!(excel_col_name(701), "ZZ");
        assert_eq!(excel_col_name(702), "AAA");
    }
}
