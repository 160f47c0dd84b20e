//! GCT 1.2 layout: a version line, a dimensions line, a `Name`/`Description`
//! header and each row prefixed by its label twice.

use crate::{
    cell::Cell,
    error::Result,
    frame::DataFrame,
};

pub const GCT_VERSION: &str = "#1.2";
pub const GCT_NAME: &str = "GCT";

/// Lays `df` out as GCT text rows. The result carries default labels and is
/// meant to be written without index or header.
pub fn to_gct(df: &DataFrame) -> Result<DataFrame> {
    let shape = df.shape();
    let width = shape.cols + 2;

    let mut version = vec![Cell::text(""); width];
    version[0] = Cell::text(GCT_VERSION);
    let mut dims = vec![Cell::text(""); width];
    dims[0] = Cell::from(shape.rows as i64);
    dims[1] = Cell::from(shape.cols as i64);
    let header: Vec<Cell> = ["Name", "Description"]
        .into_iter()
        .map(String::from)
        .chain(df.col_names())
        .map(Cell::from)
        .collect();

    let mut data = vec![version, dims, header];
    data.extend(df.row_map(|row, r| {
        let label = df.index().get(r).unwrap_or_default();
        [Cell::text(label), Cell::text(label)]
            .into_iter()
            .chain(row.iter().cloned())
            .collect::<Vec<_>>()
    }));

    DataFrame::new(data, None, None).map(|gct| gct.with_name(GCT_NAME))
}
