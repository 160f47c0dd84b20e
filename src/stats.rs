//! Row and column aggregates, top-N row filters and z-scores.
//!
//! Only finite numbers take part in an aggregate; text, dates, missing
//! cells and `NaN` are skipped.

use std::fmt;

use clap::ValueEnum;
use log::debug;
use serde::Deserialize;

use crate::{cell::Cell, error::Result, frame::DataFrame};

pub const ZSCORE_NAME: &str = "z-score";

/// Running summary over the numeric cells of one row or column.
#[derive(Debug, Default)]
struct Summary {
    count: usize,
    sum: f64,
    sum_squares: f64,
    values: Vec<f64>,
}

impl Summary {
    fn from_cells(cells: &[Cell]) -> Self {
        let mut summary = Summary::default();
        for value in cells.iter().filter_map(Cell::as_finite) {
            summary.count += 1;
            summary.sum += value;
            summary.sum_squares += value * value;
            summary.values.push(value);
        }
        summary
    }

    fn mean(&self) -> Option<f64> {
        if self.count > 0 {
            Some(self.sum / self.count as f64)
        } else {
            None
        }
    }

    fn median(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        let mut sorted = self.values.clone();
        sorted.sort_by(f64::total_cmp);
        let mid = sorted.len() / 2;
        if sorted.len().is_multiple_of(2) {
            Some((sorted[mid - 1] + sorted[mid]) / 2.0)
        } else {
            Some(sorted[mid])
        }
    }

    /// Sample standard deviation.
    fn std_dev(&self) -> Option<f64> {
        if self.count < 2 {
            return None;
        }
        let mean = self.mean()?;
        let variance =
            (self.sum_squares - self.count as f64 * mean * mean) / (self.count as f64 - 1.0);
        Some(variance.max(0.0).sqrt())
    }
}

pub fn row_sums(df: &DataFrame) -> Vec<f64> {
    df.row_map(|row, _| Summary::from_cells(row).sum)
}

pub fn col_sums(df: &DataFrame) -> Vec<f64> {
    df.col_map(|col, _| Summary::from_cells(col).sum)
}

pub fn row_means(df: &DataFrame) -> Vec<Option<f64>> {
    df.row_map(|row, _| Summary::from_cells(row).mean())
}

pub fn col_means(df: &DataFrame) -> Vec<Option<f64>> {
    df.col_map(|col, _| Summary::from_cells(col).mean())
}

pub fn row_medians(df: &DataFrame) -> Vec<Option<f64>> {
    df.row_map(|row, _| Summary::from_cells(row).median())
}

pub fn row_stdevs(df: &DataFrame) -> Vec<Option<f64>> {
    df.row_map(|row, _| Summary::from_cells(row).std_dev())
}

/// Row statistic used to rank rows for [`top_rows_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowStat {
    Stdev,
    Mean,
    Median,
}

impl fmt::Display for RowStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RowStat::Stdev => "stdev",
            RowStat::Mean => "mean",
            RowStat::Median => "median",
        };
        f.write_str(label)
    }
}

/// Keeps the `top` rows with the highest `stat`, highest first.
///
/// Rows without a value for the statistic rank last; ties keep frame order.
pub fn top_rows_by(df: &DataFrame, stat: RowStat, top: usize) -> Result<DataFrame> {
    let scores = match stat {
        RowStat::Stdev => row_stdevs(df),
        RowStat::Mean => row_means(df),
        RowStat::Median => row_medians(df),
    };
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| match (scores[a], scores[b]) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    order.truncate(top);
    debug!("Kept {} of {} row(s) by {stat}", order.len(), scores.len());
    df.select_rows(&order)
        .map(|filtered| filtered.with_name(format!("Filter rows using {stat}, top {top}")))
}

/// Standardises each row to zero mean and unit sample deviation.
///
/// Non-numeric cells become missing. A row with fewer than two numbers or
/// no spread maps its numbers to `0`.
pub fn row_zscore(df: &DataFrame) -> Result<DataFrame> {
    let data = df.row_map(|row, _| zscore(row));
    df.with_values(data)
        .map(|scored| scored.with_name(ZSCORE_NAME))
}

/// Column-wise counterpart of [`row_zscore`].
pub fn col_zscore(df: &DataFrame) -> Result<DataFrame> {
    let columns = df.col_map(|col, _| zscore(col));
    let rows = df.shape().rows;
    let data = (0..rows)
        .map(|r| columns.iter().map(|col| col[r].clone()).collect())
        .collect();
    df.with_values(data)
        .map(|scored| scored.with_name(ZSCORE_NAME))
}

fn zscore(cells: &[Cell]) -> Vec<Cell> {
    let summary = Summary::from_cells(cells);
    let mean = summary.mean().unwrap_or(0.0);
    let sd = summary.std_dev().filter(|sd| *sd > 0.0);
    cells
        .iter()
        .map(|cell| match (cell.as_finite(), sd) {
            (Some(v), Some(sd)) => Cell::Number((v - mean) / sd),
            (Some(_), None) => Cell::Number(0.0),
            (None, _) => Cell::Missing,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::DataFrameReader;

    fn frame() -> DataFrame {
        DataFrameReader::new()
            .index_cols(1)
            .read_str("id\tA\tB\tC\nflat\t5\t5\t5\nwide\t1\t5\t9\nsparse\t2\tNA\tx")
            .unwrap()
    }

    #[test]
    fn aggregates_skip_non_numeric_cells() {
        let df = frame();
        assert_eq!(row_sums(&df), [15.0, 15.0, 2.0]);
        assert_eq!(row_means(&df), [Some(5.0), Some(5.0), Some(2.0)]);
        assert_eq!(row_medians(&df)[1], Some(5.0));
        assert_eq!(row_stdevs(&df)[0], Some(0.0));
        assert_eq!(row_stdevs(&df)[1], Some(4.0));
        assert_eq!(row_stdevs(&df)[2], None);
        assert_eq!(col_sums(&df), [8.0, 10.0, 14.0]);
    }

    #[test]
    fn median_of_even_count_averages_middle_pair() {
        let cells = [4.0, 1.0, 3.0, 2.0].map(Cell::Number);
        let summary = Summary::from_cells(&cells);
        assert_eq!(summary.median(), Some(2.5));
    }

    #[test]
    fn top_rows_by_stdev_orders_highest_first() {
        let filtered = top_rows_by(&frame(), RowStat::Stdev, 2).unwrap();
        assert_eq!(filtered.row_names(), ["wide", "flat"]);
        assert_eq!(filtered.name(), "Filter rows using stdev, top 2");
    }

    #[test]
    fn row_zscore_centres_each_row() {
        let scored = row_zscore(&frame()).unwrap();
        assert_eq!(scored.get(1, 0).unwrap(), &Cell::Number(-1.0));
        assert_eq!(scored.get(1, 1).unwrap(), &Cell::Number(0.0));
        assert_eq!(scored.get(1, 2).unwrap(), &Cell::Number(1.0));
        assert_eq!(scored.get(0, 0).unwrap(), &Cell::Number(0.0));
        assert_eq!(scored.get(2, 2).unwrap(), &Cell::Missing);
        assert_eq!(scored.name(), ZSCORE_NAME);
    }

    #[test]
    fn col_zscore_keeps_shape() {
        let df = frame();
        let scored = col_zscore(&df).unwrap();
        assert_eq!(scored.shape(), df.shape());
        assert_eq!(scored.col_names(), df.col_names());
    }
}
