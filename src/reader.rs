//! Line-oriented parser turning delimited text into a [`DataFrame`].
//!
//! The reader is configured fluently; every setter consumes the reader and
//! overwrites the previous value of that option:
//!
//! ```
//! use tabstep::reader::DataFrameReader;
//!
//! let df = DataFrameReader::new()
//!     .sep(b'\t')
//!     .col_names(1)
//!     .index_cols(1)
//!     .read(&["\tA\tB", "r1\t1\tx", "r2\t2\ty"])
//!     .unwrap();
//! assert_eq!(df.col_names(), ["A", "B"]);
//! ```
//!
//! Rows are regularised rather than rejected: short rows are padded with
//! [`Cell::Missing`] and long rows are truncated to the header width, so
//! messy pasted tables still load.

use std::collections::{BTreeSet, HashSet};

use log::debug;

use crate::{
    cell::Cell,
    error::{FrameError, Result},
    frame::DataFrame,
    labels::Labels,
};

pub const DEFAULT_SEPARATOR: u8 = b'\t';
/// Joins the tokens of a multi-column row label.
pub const INDEX_JOIN: &str = "|";

#[derive(Debug, Clone)]
pub struct DataFrameReader {
    sep: u8,
    col_names: usize,
    index_cols: usize,
    skip_rows: usize,
    ignore_rows: BTreeSet<usize>,
    keep_default_na: bool,
}

impl Default for DataFrameReader {
    fn default() -> Self {
        Self {
            sep: DEFAULT_SEPARATOR,
            col_names: 1,
            index_cols: 0,
            skip_rows: 0,
            ignore_rows: BTreeSet::new(),
            keep_default_na: true,
        }
    }
}

impl DataFrameReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sep(mut self, sep: u8) -> Self {
        self.sep = sep;
        self
    }

    /// Number of leading header lines; the last one names the columns.
    pub fn col_names(mut self, col_names: usize) -> Self {
        self.col_names = col_names;
        self
    }

    /// Number of leading columns that make up the row label.
    pub fn index_cols(mut self, index_cols: usize) -> Self {
        self.index_cols = index_cols;
        self
    }

    pub fn skip_rows(mut self, skip_rows: usize) -> Self {
        self.skip_rows = skip_rows;
        self
    }

    /// Absolute input line numbers (zero-based) to drop before parsing.
    pub fn ignore_rows<I>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        self.ignore_rows = rows.into_iter().collect();
        self
    }

    pub fn keep_default_na(mut self, keep_default_na: bool) -> Self {
        self.keep_default_na = keep_default_na;
        self
    }

    pub fn separator(&self) -> u8 {
        self.sep
    }

    pub fn read_str(&self, text: &str) -> Result<DataFrame> {
        let lines: Vec<&str> = text.lines().collect();
        self.read(&lines)
    }

    pub fn read<S: AsRef<str>>(&self, lines: &[S]) -> Result<DataFrame> {
        self.validate()?;

        let kept: Vec<&str> = lines
            .iter()
            .enumerate()
            .skip(self.skip_rows)
            .filter(|(idx, _)| !self.ignore_rows.contains(idx))
            .map(|(_, line)| line.as_ref().trim_end_matches('\r'))
            .collect();

        let (header, body) = if self.col_names > 0 {
            if kept.len() < self.col_names {
                return Err(FrameError::MissingHeader {
                    expected: self.col_names,
                    found: kept.len(),
                });
            }
            let header_line = kept[self.col_names - 1];
            let tokens = self
                .tokenize(&[header_line])?
                .into_iter()
                .next()
                .unwrap_or_default();
            (Some(tokens), &kept[self.col_names..])
        } else {
            (None, &kept[..])
        };

        let records = self.tokenize_body(body)?;

        let width = match &header {
            Some(tokens) => tokens.len().saturating_sub(self.index_cols),
            None => records
                .iter()
                .map(|tokens| tokens.len().saturating_sub(self.index_cols))
                .max()
                .unwrap_or(0),
        };

        let mut row_labels = Vec::with_capacity(records.len());
        let mut data = Vec::with_capacity(records.len());
        let mut padded = 0usize;
        let mut truncated = 0usize;
        for tokens in &records {
            let split = self.index_cols.min(tokens.len());
            if self.index_cols > 0 {
                row_labels.push(tokens[..split].join(INDEX_JOIN));
            }
            let values = &tokens[split..];
            if values.len() < width {
                padded += 1;
            } else if values.len() > width {
                truncated += 1;
            }
            let mut cells: Vec<Cell> = values
                .iter()
                .take(width)
                .map(|token| Cell::parse(token, self.keep_default_na))
                .collect();
            cells.resize(width, Cell::Missing);
            data.push(cells);
        }
        if padded > 0 || truncated > 0 {
            debug!(
                "Regularised rows to {width} column(s): {padded} padded, {truncated} truncated"
            );
        }

        let (index_name, columns) = match header {
            Some(tokens) => {
                let split = self.index_cols.min(tokens.len());
                let name = tokens[..split]
                    .iter()
                    .filter(|t| !t.is_empty())
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(INDEX_JOIN);
                (name, Labels::new(dedupe_labels(tokens[split..].to_vec())))
            }
            None => (String::new(), Labels::excel(width)),
        };
        let index = if self.index_cols > 0 {
            Labels::new(row_labels).with_name(index_name)
        } else {
            Labels::numbered(data.len()).with_name(index_name)
        };

        DataFrame::new(data, Some(index), Some(columns))
    }

    fn validate(&self) -> Result<()> {
        match self.sep {
            b'\n' | b'\r' => Err(FrameError::InvalidConfig(
                "separator cannot be a line terminator".to_string(),
            )),
            b'"' => Err(FrameError::InvalidConfig(
                "separator cannot be a double quote".to_string(),
            )),
            0 => Err(FrameError::InvalidConfig(
                "separator cannot be NUL".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Tokenizes data lines. Trailing blank lines are dropped; an interior
    /// blank line becomes a single empty token and is padded like any short
    /// row.
    fn tokenize_body(&self, lines: &[&str]) -> Result<Vec<Vec<String>>> {
        let end = lines
            .iter()
            .rposition(|line| !line.is_empty())
            .map_or(0, |last| last + 1);
        let lines = &lines[..end];
        let filled: Vec<&str> = lines.iter().copied().filter(|line| !line.is_empty()).collect();
        let mut tokens = self.tokenize(&filled)?.into_iter();
        Ok(lines
            .iter()
            .map(|line| {
                if line.is_empty() {
                    vec![String::new()]
                } else {
                    tokens.next().unwrap_or_default()
                }
            })
            .collect())
    }

    fn tokenize(&self, lines: &[&str]) -> Result<Vec<Vec<String>>> {
        if lines.is_empty() {
            return Ok(Vec::new());
        }
        let text = lines.join("\n");
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.sep)
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_reader(text.as_bytes());
        reader
            .records()
            .map(|record| {
                record
                    .map(|r| r.iter().map(|token| token.replace('"', "")).collect())
                    .map_err(|err| FrameError::Parse(err.to_string()))
            })
            .collect()
    }
}

/// Makes header labels unique by suffixing repeats with `.1`, `.2`, ...
pub(crate) fn dedupe_labels(labels: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(labels.len());
    labels
        .into_iter()
        .map(|label| {
            if seen.insert(label.clone()) {
                return label;
            }
            let mut n = 1;
            loop {
                let candidate = format!("{label}.{n}");
                if seen.insert(candidate.clone()) {
                    return candidate;
                }
                n += 1;
            }
        })
        .collect()
}
