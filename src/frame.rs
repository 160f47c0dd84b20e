//! The labeled 2-D table that flows through every history step.
//!
//! A [`DataFrame`] is immutable by convention: every operation that changes
//! data, labels, or shape returns a new frame. The only in-place edits are
//! the consuming builders such as [`DataFrame::with_name`].

use std::fmt;

use serde::Serialize;

use crate::{
    cell::Cell,
    error::{Axis, FrameError, Result},
    labels::Labels,
    series::Series,
};

/// Display name given to placeholder sheets.
pub const DEFAULT_SHEET_NAME: &str = "Sheet 1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Shape {
    pub rows: usize,
    pub cols: usize,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {}", self.rows, self.cols)
    }
}

/// A row or column reference, either by position or by label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loc<'a> {
    Pos(usize),
    Label(&'a str),
}

impl From<usize> for Loc<'_> {
    fn from(value: usize) -> Self {
        Loc::Pos(value)
    }
}

impl<'a> From<&'a str> for Loc<'a> {
    fn from(value: &'a str) -> Self {
        Loc::Label(value)
    }
}

impl<'a> From<&'a String> for Loc<'a> {
    fn from(value: &'a String) -> Self {
        Loc::Label(value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataFrame {
    name: String,
    index: Labels,
    columns: Labels,
    data: Vec<Vec<Cell>>,
}

impl DataFrame {
    /// Builds a frame from row-major data, checking the shape invariants.
    ///
    /// Missing `index` labels default to `1..=rows`; missing `columns`
    /// default to spreadsheet letters sized from the first row.
    pub fn new(
        data: Vec<Vec<Cell>>,
        index: Option<Labels>,
        columns: Option<Labels>,
    ) -> Result<Self> {
        let cols = match &columns {
            Some(labels) => labels.len(),
            None => data.first().map(Vec::len).unwrap_or(0),
        };
        for (row, cells) in data.iter().enumerate() {
            if cells.len() != cols {
                return Err(FrameError::RaggedRow {
                    row,
                    expected: cols,
                    found: cells.len(),
                });
            }
        }
        let index = index.unwrap_or_else(|| Labels::numbered(data.len()));
        if index.len() != data.len() {
            return Err(FrameError::LengthMismatch {
                axis: Axis::Rows,
                expected: data.len(),
                found: index.len(),
            });
        }
        let columns = columns.unwrap_or_else(|| Labels::excel(cols));
        if let Some(dup) = columns.first_duplicate() {
            return Err(FrameError::DuplicateColumn(dup.to_string()));
        }
        Ok(Self {
            name: String::new(),
            index,
            columns,
            data,
        })
    }

    /// An empty, unlabeled frame with the given display name.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Placeholder sheet shown before any data has been loaded.
    pub fn placeholder() -> Self {
        Self::empty(DEFAULT_SHEET_NAME)
    }

    // Callers guarantee the invariants; used by transforms that only reorder
    // or subset an already valid frame.
    pub(crate) fn from_parts(
        name: String,
        index: Labels,
        columns: Labels,
        data: Vec<Vec<Cell>>,
    ) -> Self {
        debug_assert_eq!(index.len(), data.len());
        debug_assert!(data.iter().all(|row| row.len() == columns.len()));
        Self {
            name,
            index,
            columns,
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Copy of this frame carrying a new display name.
    pub fn set_name(&self, name: impl Into<String>) -> DataFrame {
        self.clone().with_name(name)
    }

    pub fn shape(&self) -> Shape {
        Shape {
            rows: self.data.len(),
            cols: self.columns.len(),
        }
    }

    pub fn size(&self) -> usize {
        let shape = self.shape();
        shape.rows * shape.cols
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn index(&self) -> &Labels {
        &self.index
    }

    pub fn columns(&self) -> &Labels {
        &self.columns
    }

    pub fn col_names(&self) -> Vec<String> {
        self.columns.values().to_vec()
    }

    pub fn row_names(&self) -> Vec<String> {
        self.index.values().to_vec()
    }

    pub fn values(&self) -> &[Vec<Cell>] {
        &self.data
    }

    pub fn get(&self, row: usize, col: usize) -> Result<&Cell> {
        let cells = self.data.get(row).ok_or(FrameError::IndexOutOfRange {
            axis: Axis::Rows,
            index: row,
            len: self.data.len(),
        })?;
        cells.get(col).ok_or(FrameError::IndexOutOfRange {
            axis: Axis::Columns,
            index: col,
            len: self.columns.len(),
        })
    }

    /// Cell lookup by row and column label.
    pub fn at(&self, row: &str, col: &str) -> Result<&Cell> {
        let r = self.resolve_row(Loc::Label(row))?;
        let c = self.resolve_col(Loc::Label(col))?;
        self.get(r, c)
    }

    pub fn resolve_row<'a>(&self, loc: impl Into<Loc<'a>>) -> Result<usize> {
        resolve(&self.index, Axis::Rows, loc.into())
    }

    pub fn resolve_col<'a>(&self, loc: impl Into<Loc<'a>>) -> Result<usize> {
        resolve(&self.columns, Axis::Columns, loc.into())
    }

    pub fn col<'a>(&self, loc: impl Into<Loc<'a>>) -> Result<Series> {
        let c = self.resolve_col(loc)?;
        let values = self.data.iter().map(|row| row[c].clone()).collect();
        Ok(Series::new(self.columns.get(c).unwrap_or_default(), values))
    }

    pub fn row<'a>(&self, loc: impl Into<Loc<'a>>) -> Result<Series> {
        let r = self.resolve_row(loc)?;
        Ok(Series::new(
            self.index.get(r).unwrap_or_default(),
            self.data[r].clone(),
        ))
    }

    /// Positional selection of rows and columns, in the order given.
    ///
    /// Rows may repeat; columns may not, since column labels stay unique.
    pub fn iloc(&self, rows: &[usize], cols: &[usize]) -> Result<DataFrame> {
        let shape = self.shape();
        check_positions(rows, shape.rows, Axis::Rows)?;
        check_positions(cols, shape.cols, Axis::Columns)?;
        let selected = self.take(rows, cols);
        if let Some(dup) = selected.columns.first_duplicate() {
            return Err(FrameError::DuplicateColumn(dup.to_string()));
        }
        Ok(selected)
    }

    // Positions must be in range and `cols` free of repeats.
    pub(crate) fn take(&self, rows: &[usize], cols: &[usize]) -> DataFrame {
        let data = rows
            .iter()
            .map(|&r| cols.iter().map(|&c| self.data[r][c].clone()).collect())
            .collect();
        DataFrame::from_parts(
            self.name.clone(),
            self.index.select(rows),
            self.columns.select(cols),
            data,
        )
    }

    pub fn select_rows(&self, rows: &[usize]) -> Result<DataFrame> {
        let cols: Vec<usize> = (0..self.columns.len()).collect();
        self.iloc(rows, &cols)
    }

    pub fn select_cols(&self, cols: &[usize]) -> Result<DataFrame> {
        let rows: Vec<usize> = (0..self.data.len()).collect();
        self.iloc(&rows, cols)
    }

    /// Swaps rows and columns. Fails when the row labels are not unique.
    pub fn transpose(&self) -> Result<DataFrame> {
        let shape = self.shape();
        let data = (0..shape.cols)
            .map(|c| self.data.iter().map(|row| row[c].clone()).collect())
            .collect();
        let index = self.columns.clone();
        let columns = self.index.clone();
        if let Some(dup) = columns.first_duplicate() {
            return Err(FrameError::DuplicateColumn(dup.to_string()));
        }
        Ok(DataFrame::from_parts(self.name.clone(), index, columns, data))
    }

    /// Element-wise transform keeping labels and name.
    pub fn map<F>(&self, f: F) -> DataFrame
    where
        F: Fn(&Cell, usize, usize) -> Cell,
    {
        let data = self
            .data
            .iter()
            .enumerate()
            .map(|(r, row)| row.iter().enumerate().map(|(c, v)| f(v, r, c)).collect())
            .collect();
        DataFrame::from_parts(
            self.name.clone(),
            self.index.clone(),
            self.columns.clone(),
            data,
        )
    }

    pub fn row_map<T, F>(&self, f: F) -> Vec<T>
    where
        F: Fn(&[Cell], usize) -> T,
    {
        self.data
            .iter()
            .enumerate()
            .map(|(r, row)| f(row, r))
            .collect()
    }

    pub fn col_map<T, F>(&self, f: F) -> Vec<T>
    where
        F: Fn(&[Cell], usize) -> T,
    {
        (0..self.columns.len())
            .map(|c| {
                let column: Vec<Cell> = self.data.iter().map(|row| row[c].clone()).collect();
                f(&column, c)
            })
            .collect()
    }

    /// Same labels and name, new values. The replacement must have the same
    /// shape.
    pub fn with_values(&self, data: Vec<Vec<Cell>>) -> Result<DataFrame> {
        DataFrame::new(data, Some(self.index.clone()), Some(self.columns.clone()))
            .map(|df| df.with_name(self.name.clone()))
    }
}

fn resolve(labels: &Labels, axis: Axis, loc: Loc<'_>) -> Result<usize> {
    match loc {
        Loc::Pos(idx) if idx < labels.len() => Ok(idx),
        Loc::Pos(idx) => Err(FrameError::IndexOutOfRange {
            axis,
            index: idx,
            len: labels.len(),
        }),
        Loc::Label(label) => labels
            .position(label)
            .ok_or_else(|| FrameError::LabelNotFound {
                axis,
                label: label.to_string(),
            }),
    }
}

fn check_positions(positions: &[usize], len: usize, axis: Axis) -> Result<()> {
    match positions.iter().find(|&&p| p >= len) {
        Some(&index) => Err(FrameError::IndexOutOfRange { axis, index, len }),
        None => Ok(()),
    }
}
