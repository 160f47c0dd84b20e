//! Ordered label sequences used for both the row index and the column header
//! of a [`DataFrame`](crate::frame::DataFrame).

use std::collections::HashMap;

use crate::cell::excel_col_name;

#[derive(Debug, Clone, Default)]
pub struct Labels {
    name: String,
    values: Vec<String>,
    // first occurrence of each label
    lookup: HashMap<String, usize>,
}

impl Labels {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        let mut lookup = HashMap::with_capacity(values.len());
        for (idx, value) in values.iter().enumerate() {
            lookup.entry(value.clone()).or_insert(idx);
        }
        Self {
            name: String::new(),
            values,
            lookup,
        }
    }

    /// Default row labels `1..=len`.
    pub fn numbered(len: usize) -> Self {
        Self::new((1..=len).map(|n| n.to_string()))
    }

    /// Default column labels `A`, `B`, ... for `len` columns.
    pub fn excel(len: usize) -> Self {
        Self::new((0..len).map(excel_col_name))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.values.get(idx).map(String::as_str)
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    /// Position of the first label exactly equal to `label`.
    pub fn position(&self, label: &str) -> Option<usize> {
        self.lookup.get(label).copied()
    }

    /// First label that occurs more than once, if any.
    pub fn first_duplicate(&self) -> Option<&str> {
        if self.lookup.len() == self.values.len() {
            return None;
        }
        self.values
            .iter()
            .enumerate()
            .find(|(idx, value)| self.lookup.get(value.as_str()) != Some(idx))
            .map(|(_, value)| value.as_str())
    }

    /// Positions of all labels containing `query`, ignoring case.
    pub fn find(&self, query: &str) -> Vec<usize> {
        let query = query.to_lowercase();
        self.values
            .iter()
            .enumerate()
            .filter(|(_, value)| value.to_lowercase().contains(&query))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// New label set holding the labels at `positions`, in that order.
    /// Positions must be in range.
    pub fn select(&self, positions: &[usize]) -> Labels {
        Labels::new(positions.iter().map(|&p| self.values[p].clone())).with_name(self.name.clone())
    }
}

impl PartialEq for Labels {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.values == other.values
    }
}

impl<S: Into<String>> FromIterator<S> for Labels {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Labels::new(iter)
    }
}
