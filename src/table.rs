use std::borrow::Cow;
use std::fmt::Write as _;

use crate::frame::DataFrame;

/// Renders a frame as an aligned text table: the index column first, then
/// at most `limit` rows.
pub fn render_frame(df: &DataFrame, limit: usize) -> String {
    let mut headers = Vec::with_capacity(df.columns().len() + 1);
    headers.push(df.index().name().to_string());
    headers.extend(df.col_names());

    let rows: Vec<Vec<String>> = df
        .values()
        .iter()
        .take(limit)
        .enumerate()
        .map(|(ri, row)| {
            std::iter::once(df.index().get(ri).unwrap_or_default().to_string())
                .chain(row.iter().map(|cell| cell.as_display()))
                .collect()
        })
        .collect();
    render_table(&headers, &rows)
}

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| display_width(h)).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(display_width(cell));
        }
    }
    for width in &mut widths {
        *width = (*width).max(3);
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths));

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(output, "{}", format_row(&rule, &widths));

    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

pub fn print_frame(df: &DataFrame, limit: usize) {
    print!("{}", render_frame(df, limit));
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let cells: Vec<String> = values
        .iter()
        .zip(widths)
        .map(|(value, width)| {
            let cell = sanitize_cell(value);
            let padding = width.saturating_sub(display_width(&cell));
            format!("{cell}{}", " ".repeat(padding))
        })
        .collect();
    cells.join("  ").trim_end().to_string()
}

fn display_width(value: &str) -> usize {
    value.chars().count()
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::DataFrameReader;

    #[test]
    fn renders_index_and_aligns_columns() {
        let df = DataFrameReader::new()
            .index_cols(1)
            .read_str("id\tA\tLong\nr1\t1\tx\nrow2\t22\tNA")
            .unwrap();
        let rendered = render_frame(&df, 10);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "id    A    Long");
        assert_eq!(lines[1], "----  ---  ----");
        assert_eq!(lines[2], "r1    1    x");
        assert_eq!(lines[3], "row2  22   NA");
    }

    #[test]
    fn respects_row_limit() {
        let df = DataFrameReader::new()
            .read_str("A\n1\n2\n3")
            .unwrap();
        assert_eq!(render_frame(&df, 2).lines().count(), 4);
    }
}
