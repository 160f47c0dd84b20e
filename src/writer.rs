use std::io::Write;

use csv::{QuoteStyle, Terminator};

use crate::{
    cell::CellFormat,
    error::{FrameError, Result},
    frame::DataFrame,
    reader::DEFAULT_SEPARATOR,
};

/// Serializes a frame back to delimited text.
///
/// Output produced with the default settings reads back through a
/// `DataFrameReader` configured with the same separator, `col_names(1)` and
/// `index_cols(1)`.
#[derive(Debug, Clone)]
pub struct DataFrameWriter {
    sep: u8,
    has_index: bool,
    has_header: bool,
    format: CellFormat,
}

impl Default for DataFrameWriter {
    fn default() -> Self {
        Self {
            sep: DEFAULT_SEPARATOR,
            has_index: true,
            has_header: true,
            format: CellFormat::default(),
        }
    }
}

impl DataFrameWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sep(mut self, sep: u8) -> Self {
        self.sep = sep;
        self
    }

    /// Decimal places for non-integer numbers.
    pub fn dp(mut self, dp: Option<usize>) -> Self {
        self.format.dp = dp;
        self
    }

    pub fn has_index(mut self, has_index: bool) -> Self {
        self.has_index = has_index;
        self
    }

    pub fn has_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    pub fn na_rep(mut self, na_rep: impl Into<String>) -> Self {
        self.format.na_rep = na_rep.into();
        self
    }

    pub fn write_to<W: Write>(&self, df: &DataFrame, out: W) -> Result<()> {
        if matches!(self.sep, b'\n' | b'\r') {
            return Err(FrameError::InvalidConfig(
                "separator cannot be a line terminator".to_string(),
            ));
        }
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.sep)
            .quote_style(QuoteStyle::Never)
            .terminator(Terminator::Any(b'\n'))
            .flexible(true)
            .from_writer(out);

        if self.has_header {
            let mut record = Vec::with_capacity(df.columns().len() + 1);
            if self.has_index {
                record.push(df.index().name().to_string());
            }
            record.extend(df.col_names());
            writer.write_record(&record).map_err(write_error)?;
        }

        for (ri, row) in df.values().iter().enumerate() {
            let mut record = Vec::with_capacity(row.len() + 1);
            if self.has_index {
                record.push(df.index().get(ri).unwrap_or_default().to_string());
            }
            record.extend(row.iter().map(|cell| cell.to_display_with(&self.format)));
            writer.write_record(&record).map_err(write_error)?;
        }
        writer
            .flush()
            .map_err(|err| FrameError::Write(err.to_string()))
    }

    pub fn to_string(&self, df: &DataFrame) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_to(df, &mut buffer)?;
        String::from_utf8(buffer).map_err(|err| FrameError::Write(err.to_string()))
    }
}

fn write_error(err: csv::Error) -> FrameError {
    FrameError::Write(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{cell::Cell, labels::Labels};

    fn sample() -> DataFrame {
        DataFrame::new(
            vec![
                vec![Cell::Number(1.0), Cell::Number(0.5)],
                vec![Cell::Missing, Cell::text("y")],
            ],
            Some(Labels::new(["r1", "r2"]).with_name("id")),
            Some(Labels::new(["A", "B"])),
        )
        .unwrap()
    }

    #[test]
    fn writes_index_name_in_header_corner() {
        let text = DataFrameWriter::new().to_string(&sample()).unwrap();
        assert_eq!(text, "id\tA\tB\nr1\t1\t0.5\nr2\tNA\ty\n");
    }

    #[test]
    fn omits_index_and_header_on_request() {
        let text = DataFrameWriter::new()
            .sep(b',')
            .has_index(false)
            .has_header(false)
            .na_rep("")
            .to_string(&sample())
            .unwrap();
        assert_eq!(text, "1,0.5\n,y\n");
    }
}
