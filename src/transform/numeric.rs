//! Element-wise arithmetic on the numeric cells of a frame.

use crate::{cell::Cell, frame::DataFrame};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericOp {
    Add,
    Log2,
    Log10,
    Ln,
}

impl NumericOp {
    /// Applies the operation to `value + offset` (plain addition for `Add`).
    pub fn eval(self, value: f64, offset: f64) -> f64 {
        let shifted = value + offset;
        match self {
            NumericOp::Add => shifted,
            NumericOp::Log2 => shifted.log2(),
            NumericOp::Log10 => shifted.log10(),
            NumericOp::Ln => shifted.ln(),
        }
    }

    pub fn apply(self, df: &DataFrame, offset: f64) -> DataFrame {
        df.map(|cell, _, _| match cell {
            Cell::Number(v) => Cell::Number(self.eval(*v, offset)),
            _ => Cell::Missing,
        })
    }
}

pub fn add(df: &DataFrame, a: f64) -> DataFrame {
    NumericOp::Add.apply(df, a)
}

pub fn log2(df: &DataFrame, a: f64) -> DataFrame {
    NumericOp::Log2.apply(df, a)
}

pub fn log10(df: &DataFrame, a: f64) -> DataFrame {
    NumericOp::Log10.apply(df, a)
}

pub fn ln(df: &DataFrame, a: f64) -> DataFrame {
    NumericOp::Ln.apply(df, a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::Labels;

    fn frame() -> DataFrame {
        DataFrame::new(
            vec![vec![Cell::Number(1.0), Cell::Number(7.0), Cell::text("x")]],
            Some(Labels::new(["r1"])),
            Some(Labels::new(["A", "B", "C"])),
        )
        .unwrap()
        .with_name("counts")
    }

    #[test]
    fn log2_applies_offset_and_keeps_labels() {
        let out = log2(&frame(), 1.0);
        assert_eq!(out.get(0, 0).unwrap(), &Cell::Number(1.0));
        assert_eq!(out.get(0, 1).unwrap(), &Cell::Number(3.0));
        assert_eq!(out.get(0, 2).unwrap(), &Cell::Missing);
        assert_eq!(out.name(), "counts");
        assert_eq!(out.col_names(), ["A", "B", "C"]);
    }

    #[test]
    fn add_and_log10() {
        assert_eq!(add(&frame(), 2.0).get(0, 1).unwrap(), &Cell::Number(9.0));
        assert_eq!(log10(&frame(), 3.0).get(0, 1).unwrap(), &Cell::Number(1.0));
        assert_eq!(ln(&frame(), 0.0).get(0, 0).unwrap(), &Cell::Number(0.0));
    }
}
