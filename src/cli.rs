use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::{
    error::Axis,
    filter::MatchOptions,
    reader::DataFrameReader,
    stats::RowStat,
    transform::{DEFAULT_TOP, TransformKind, TransformSpec},
    writer::DataFrameWriter,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Load, filter and transform delimited tables step by step", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the first rows of a table with its row labels
    Preview(PreviewArgs),
    /// Print the "rows x cols" shape of one or more tables
    Shape(ShapeArgs),
    /// Keep rows and/or columns whose labels match the given ids
    Filter(FilterArgs),
    /// Apply a numeric transform, z-score or top-N row filter
    Transform(TransformArgs),
    /// Concatenate tables on their shared row or column labels
    Join(JoinArgs),
    /// Write a table in GCT 1.2 layout
    Gct(GctArgs),
    /// Replay a YAML/JSON session script and report the resulting history
    Replay(ReplayArgs),
}

/// Options controlling how an input table is parsed.
#[derive(Debug, Clone, Args)]
pub struct ReaderArgs {
    /// Delimiter character (supports ',', 'tab', ';', '|'); defaults from the extension
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Number of header lines; the last one names the columns
    #[arg(long = "col-names", default_value_t = 1)]
    pub col_names: usize,
    /// Number of leading columns forming the row label
    #[arg(long = "index-cols", default_value_t = 1)]
    pub index_cols: usize,
    /// Lines to skip before the header
    #[arg(long = "skip-rows", default_value_t = 0)]
    pub skip_rows: usize,
    /// Zero-based input line numbers to drop
    #[arg(long = "ignore-rows", value_delimiter = ',')]
    pub ignore_rows: Vec<usize>,
    /// Keep NA-like tokens such as `NA` or `#N/A` as text
    #[arg(long = "no-default-na")]
    pub no_default_na: bool,
    /// Character encoding of the input (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

impl ReaderArgs {
    pub fn reader(&self, sep: u8) -> DataFrameReader {
        DataFrameReader::new()
            .sep(sep)
            .col_names(self.col_names)
            .index_cols(self.index_cols)
            .skip_rows(self.skip_rows)
            .ignore_rows(self.ignore_rows.iter().copied())
            .keep_default_na(!self.no_default_na)
    }
}

/// Options controlling how a result table is written.
#[derive(Debug, Clone, Args)]
pub struct OutputArgs {
    /// Output file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Output delimiter; defaults from the output extension, then the input delimiter
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
    /// Character encoding for the output (defaults to utf-8)
    #[arg(long = "output-encoding")]
    pub output_encoding: Option<String>,
    /// Decimal places for non-integer numbers
    #[arg(long)]
    pub dp: Option<usize>,
    /// Text written for missing cells
    #[arg(long = "na-rep", default_value = "NA")]
    pub na_rep: String,
}

impl OutputArgs {
    pub fn writer(&self, sep: u8) -> DataFrameWriter {
        DataFrameWriter::new()
            .sep(sep)
            .dp(self.dp)
            .na_rep(self.na_rep.clone())
    }
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Input table ('-' for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Number of rows to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
    #[command(flatten)]
    pub reader: ReaderArgs,
}

#[derive(Debug, Args)]
pub struct ShapeArgs {
    /// Input tables
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
    /// Emit a JSON object per input instead of text
    #[arg(long)]
    pub json: bool,
    #[command(flatten)]
    pub reader: ReaderArgs,
}

#[derive(Debug, Args)]
pub struct FilterArgs {
    /// Input table ('-' for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Row ids to keep (comma-separated or repeated)
    #[arg(long = "rows", value_delimiter = ',', action = clap::ArgAction::Append)]
    pub rows: Vec<String>,
    /// Column ids to keep (comma-separated or repeated)
    #[arg(long = "cols", value_delimiter = ',', action = clap::ArgAction::Append)]
    pub cols: Vec<String>,
    /// Match ids with case sensitivity
    #[arg(long = "case-sensitive")]
    pub case_sensitive: bool,
    /// Require ids to equal the whole label
    #[arg(long = "entire-cell")]
    pub entire_cell: bool,
    /// Emit matches in the order the ids were given
    #[arg(long = "keep-order")]
    pub keep_order: bool,
    #[command(flatten)]
    pub reader: ReaderArgs,
    #[command(flatten)]
    pub output: OutputArgs,
}

impl FilterArgs {
    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            case_sensitive: self.case_sensitive,
            entire_cell: self.entire_cell,
            keep_order: self.keep_order,
        }
    }
}

#[derive(Debug, Args)]
pub struct TransformArgs {
    /// Input table ('-' for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Transform to apply
    #[arg(long, value_enum)]
    pub kind: TransformKind,
    /// Value added before arithmetic and log transforms
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub offset: f64,
    /// Row statistic ranking rows for top-rows
    #[arg(long, value_enum, default_value = "stdev")]
    pub stat: RowStat,
    /// Number of rows kept by top-rows
    #[arg(long, default_value_t = DEFAULT_TOP)]
    pub top: usize,
    #[command(flatten)]
    pub reader: ReaderArgs,
    #[command(flatten)]
    pub output: OutputArgs,
}

impl TransformArgs {
    pub fn spec(&self) -> TransformSpec {
        TransformSpec::new(self.kind)
            .offset(self.offset)
            .top(self.stat, self.top)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum JoinAxis {
    Rows,
    Columns,
}

impl From<JoinAxis> for Axis {
    fn from(value: JoinAxis) -> Self {
        match value {
            JoinAxis::Rows => Axis::Rows,
            JoinAxis::Columns => Axis::Columns,
        }
    }
}

#[derive(Debug, Args)]
pub struct JoinArgs {
    /// Input tables, joined in order
    #[arg(required = true, num_args = 2..)]
    pub inputs: Vec<PathBuf>,
    /// Stack rows on shared columns, or columns on shared rows
    #[arg(long, value_enum, default_value = "rows")]
    pub axis: JoinAxis,
    #[command(flatten)]
    pub reader: ReaderArgs,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct GctArgs {
    /// Input table ('-' for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    #[command(flatten)]
    pub reader: ReaderArgs,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Session script (.yml/.yaml for YAML, anything else JSON)
    pub script: PathBuf,
    /// Print the history summary as JSON
    #[arg(long)]
    pub json: bool,
    /// Number of rows of the current sheet to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
    /// Also write the current sheet to this file ('-' for stdout)
    #[arg(long = "write")]
    pub write: Option<PathBuf>,
    /// Delimiter for the written sheet; defaults from the extension, then tab
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" | "\\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_delimiter_accepts_names_and_characters() {
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert_eq!(parse_delimiter("\\t"), Ok(b'\t'));
        assert_eq!(parse_delimiter("comma"), Ok(b','));
        assert_eq!(parse_delimiter(":"), Ok(b':'));
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter("ab").is_err());
        assert!(parse_delimiter("é").is_err());
    }

    #[test]
    fn cli_parses_transform_arguments() {
        let cli = Cli::try_parse_from([
            "tabstep", "transform", "-i", "a.tsv", "--kind", "top-rows", "--stat", "mean",
            "--top", "3",
        ])
        .unwrap();
        match cli.command {
            Commands::Transform(args) => {
                let spec = args.spec();
                assert_eq!(spec.kind, TransformKind::TopRows);
                assert_eq!(spec.stat, RowStat::Mean);
                assert_eq!(spec.top, 3);
                assert_eq!(args.reader.index_cols, 1);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn cli_splits_filter_ids() {
        let cli =
            Cli::try_parse_from(["tabstep", "filter", "-i", "a.tsv", "--rows", "r1,r2"]).unwrap();
        match cli.command {
            Commands::Filter(args) => assert_eq!(args.rows, ["r1", "r2"]),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
