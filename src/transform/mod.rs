//! Whole-frame transforms that produce a new history step.

pub mod gct;
pub mod numeric;

use clap::ValueEnum;
use serde::Deserialize;

use crate::{
    error::Result,
    frame::DataFrame,
    stats::{self, RowStat},
};

use numeric::NumericOp;

/// Rows kept by `top_rows` when no count is given.
pub const DEFAULT_TOP: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    Add,
    Log2,
    Log10,
    Ln,
    ZscoreRows,
    ZscoreCols,
    TopRows,
}

/// A transform together with its parameters. `offset` applies to the
/// arithmetic kinds, `stat` and `top` to `top_rows`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransformSpec {
    pub kind: TransformKind,
    #[serde(default)]
    pub offset: f64,
    #[serde(default = "default_stat")]
    pub stat: RowStat,
    #[serde(default = "default_top")]
    pub top: usize,
}

fn default_stat() -> RowStat {
    RowStat::Stdev
}

fn default_top() -> usize {
    DEFAULT_TOP
}

impl TransformSpec {
    pub fn new(kind: TransformKind) -> Self {
        Self {
            kind,
            offset: 0.0,
            stat: default_stat(),
            top: DEFAULT_TOP,
        }
    }

    pub fn offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    pub fn top(mut self, stat: RowStat, top: usize) -> Self {
        self.stat = stat;
        self.top = top;
        self
    }

    /// Label of the history step this transform creates.
    pub fn step_name(&self) -> String {
        match self.kind {
            TransformKind::Add => format!("Add {}", self.offset),
            TransformKind::Log2 => format!("Log2(x + {})", self.offset),
            TransformKind::Log10 => format!("Log10(x + {})", self.offset),
            TransformKind::Ln => format!("Ln(x + {})", self.offset),
            TransformKind::ZscoreRows => "Row z-score".to_string(),
            TransformKind::ZscoreCols => "Column z-score".to_string(),
            TransformKind::TopRows => {
                format!("Filter rows using {}, top {}", self.stat, self.top)
            }
        }
    }

    pub fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        let numeric = |op: NumericOp| Ok(op.apply(df, self.offset));
        match self.kind {
            TransformKind::Add => numeric(NumericOp::Add),
            TransformKind::Log2 => numeric(NumericOp::Log2),
            TransformKind::Log10 => numeric(NumericOp::Log10),
            TransformKind::Ln => numeric(NumericOp::Ln),
            TransformKind::ZscoreRows => stats::row_zscore(df),
            TransformKind::ZscoreCols => stats::col_zscore(df),
            TransformKind::TopRows => stats::top_rows_by(df, self.stat, self.top),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_names_describe_parameters() {
        assert_eq!(
            TransformSpec::new(TransformKind::Log2).offset(1.0).step_name(),
            "Log2(x + 1)"
        );
        assert_eq!(
            TransformSpec::new(TransformKind::TopRows)
                .top(RowStat::Mean, 5)
                .step_name(),
            "Filter rows using mean, top 5"
        );
    }

    #[test]
    fn deserializes_with_defaults() {
        let spec: TransformSpec = serde_json::from_str(r#"{"kind": "top_rows"}"#).unwrap();
        assert_eq!(spec.stat, RowStat::Stdev);
        assert_eq!(spec.top, DEFAULT_TOP);
        assert_eq!(spec.offset, 0.0);
    }
}
