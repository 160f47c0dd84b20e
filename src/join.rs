//! Concatenation of several frames along either axis.
//!
//! Only labels present in every input survive, in the order they appear in
//! the first frame.

use itertools::Itertools;
use log::debug;

use crate::{
    cell::Cell,
    error::{Axis, Result},
    frame::DataFrame,
    labels::Labels,
    reader::dedupe_labels,
};

pub const JOINED_NAME: &str = "Joined";

pub fn join_frames(frames: &[DataFrame], axis: Axis) -> Result<DataFrame> {
    match axis {
        Axis::Rows => row_join(frames),
        Axis::Columns => col_join(frames),
    }
}

/// Stacks frames vertically on the columns they all share.
pub fn row_join(frames: &[DataFrame]) -> Result<DataFrame> {
    let Some(first) = frames.first() else {
        return Ok(DataFrame::empty(JOINED_NAME));
    };
    let shared: Vec<&str> = first
        .columns()
        .iter()
        .filter(|label| {
            frames[1..]
                .iter()
                .all(|df| df.columns().position(label).is_some())
        })
        .collect();
    debug!(
        "Row join of {} frame(s) keeps {} shared column(s)",
        frames.len(),
        shared.len()
    );

    let mut data: Vec<Vec<Cell>> = Vec::new();
    let mut index: Vec<String> = Vec::new();
    for df in frames {
        let positions: Vec<usize> = shared
            .iter()
            .filter_map(|label| df.columns().position(label))
            .collect();
        for (ri, row) in df.values().iter().enumerate() {
            data.push(positions.iter().map(|&c| row[c].clone()).collect());
            index.push(df.index().get(ri).unwrap_or_default().to_string());
        }
    }

    DataFrame::new(
        data,
        Some(Labels::new(index).with_name(first.index().name())),
        Some(Labels::new(shared)),
    )
    .map(|df| df.with_name(JOINED_NAME))
}

/// Places frames side by side on the row labels they all share. Column
/// labels that collide across inputs get `.1`, `.2` suffixes.
pub fn col_join(frames: &[DataFrame]) -> Result<DataFrame> {
    let Some(first) = frames.first() else {
        return Ok(DataFrame::empty(JOINED_NAME));
    };
    let shared: Vec<&str> = first
        .index()
        .iter()
        .unique()
        .filter(|label| frames[1..].iter().all(|df| df.index().position(label).is_some()))
        .collect();
    debug!(
        "Column join of {} frame(s) keeps {} shared row(s)",
        frames.len(),
        shared.len()
    );

    let data: Vec<Vec<Cell>> = shared
        .iter()
        .map(|label| {
            frames
                .iter()
                .filter_map(|df| df.index().position(label).map(|r| &df.values()[r]))
                .flat_map(|row| row.iter().cloned())
                .collect()
        })
        .collect();
    let columns = dedupe_labels(frames.iter().flat_map(|df| df.col_names()).collect());

    DataFrame::new(
        data,
        Some(Labels::new(shared).with_name(first.index().name())),
        Some(Labels::new(columns)),
    )
    .map(|df| df.with_name(JOINED_NAME))
}
