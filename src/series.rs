use crate::cell::Cell;

/// A single row or column pulled out of a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    name: String,
    values: Vec<Cell>,
}

impl Series {
    pub fn new(name: impl Into<String>, values: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[Cell] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Cell> {
        self.values
    }

    pub fn get(&self, idx: usize) -> Option<&Cell> {
        self.values.get(idx)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values coerced to their display strings.
    pub fn strs(&self) -> Vec<String> {
        self.values.iter().map(Cell::as_display).collect()
    }

    /// Values coerced to numbers (`NaN` for non-numeric cells).
    pub fn nums(&self) -> Vec<f64> {
        self.values.iter().map(Cell::as_f64).collect()
    }

    /// Positions of the cells that are not missing and not `NaN`.
    pub fn non_na_positions(&self) -> Vec<usize> {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, cell)| match cell {
                Cell::Missing => false,
                Cell::Number(v) => !v.is_nan(),
                _ => true,
            })
            .map(|(idx, _)| idx)
            .collect()
    }
}
