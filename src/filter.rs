//! Id-based row/column filtering and small frame helpers used by every
//! module page: column search and the human-readable shape summary.

use std::collections::HashMap;

use itertools::Itertools;
use serde::Deserialize;

use crate::{frame::DataFrame, labels::Labels};

/// Shown instead of a shape when no table is loaded.
pub const NO_TABLE_PROMPT: &str = "Open a file to get started";

/// How ids are matched against labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MatchOptions {
    pub case_sensitive: bool,
    /// Require the whole label to equal the id instead of containing it.
    pub entire_cell: bool,
    /// Emit matches in id order rather than frame order.
    pub keep_order: bool,
}

/// Keeps the rows whose index label matches any of `ids`.
///
/// Each row appears at most once, also in keep-order mode where ids that
/// match an already selected row are skipped. No match yields a frame with
/// zero rows; it is never an error.
pub fn filter_rows_by_id<S: AsRef<str>>(
    df: &DataFrame,
    ids: &[S],
    options: &MatchOptions,
) -> DataFrame {
    let positions = match_positions(df.index(), ids, options);
    let cols: Vec<usize> = (0..df.shape().cols).collect();
    df.take(&positions, &cols)
}

/// Column-axis counterpart of [`filter_rows_by_id`].
pub fn filter_cols_by_id<S: AsRef<str>>(
    df: &DataFrame,
    ids: &[S],
    options: &MatchOptions,
) -> DataFrame {
    let positions = match_positions(df.columns(), ids, options);
    let rows: Vec<usize> = (0..df.shape().rows).collect();
    df.take(&rows, &positions)
}

fn match_positions<S: AsRef<str>>(
    labels: &Labels,
    ids: &[S],
    options: &MatchOptions,
) -> Vec<usize> {
    let fold = |s: &str| {
        if options.case_sensitive {
            s.to_string()
        } else {
            s.to_lowercase()
        }
    };
    let needles: Vec<String> = ids.iter().map(|id| fold(id.as_ref())).collect();
    let haystack: Vec<String> = labels.iter().map(fold).collect();
    let hit = |label: &str, needle: &str| {
        if options.entire_cell {
            label == needle
        } else {
            label.contains(needle)
        }
    };

    if options.keep_order {
        if options.entire_cell {
            let mut first: HashMap<&str, usize> = HashMap::with_capacity(haystack.len());
            for (idx, label) in haystack.iter().enumerate() {
                first.entry(label.as_str()).or_insert(idx);
            }
            needles
                .iter()
                .filter_map(|needle| first.get(needle.as_str()).copied())
                .unique()
                .collect()
        } else {
            needles
                .iter()
                .filter_map(|needle| {
                    haystack
                        .iter()
                        .position(|label| hit(label.as_str(), needle.as_str()))
                })
                .unique()
                .collect()
        }
    } else {
        haystack
            .iter()
            .positions(|label| needles.iter().any(|needle| hit(label.as_str(), needle.as_str())))
            .collect()
    }
}

/// Human-readable "R rows x C cols" summary; empty when there is no frame.
pub fn formatted_shape(df: Option<&DataFrame>) -> String {
    match df {
        Some(df) => {
            let shape = df.shape();
            format!(
                "{} rows x {} cols",
                group_thousands(shape.rows),
                group_thousands(shape.cols)
            )
        }
        None => String::new(),
    }
}

/// Shape summary, or a prompt to open a file when nothing is loaded.
pub fn frame_info(df: Option<&DataFrame>) -> String {
    match df {
        Some(_) => formatted_shape(df),
        None => NO_TABLE_PROMPT.to_string(),
    }
}

fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Positions of every column whose name contains `query`, ignoring case.
pub fn find_cols(df: &DataFrame, query: &str) -> Vec<usize> {
    df.columns().find(query)
}

/// First column matched by the first query that matches anything.
pub fn find_col<S: AsRef<str>>(df: &DataFrame, queries: &[S]) -> Option<usize> {
    queries
        .iter()
        .find_map(|query| find_cols(df, query.as_ref()).into_iter().next())
}
