pub mod cell;
pub mod cli;
pub mod error;
pub mod filter;
pub mod frame;
pub mod history;
pub mod io_utils;
pub mod join;
pub mod labels;
pub mod preview;
pub mod reader;
pub mod series;
pub mod session;
pub mod stats;
pub mod table;
pub mod transform;
pub mod writer;

use std::{env, path::Path, sync::OnceLock};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{LevelFilter, debug, info};
use serde::Serialize;

use crate::{
    cli::{Cli, Commands, OutputArgs, ReaderArgs},
    frame::DataFrame,
    reader::DEFAULT_SEPARATOR,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("tabstep", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Preview(args) => preview::execute(&args),
        Commands::Shape(args) => handle_shape(&args),
        Commands::Filter(args) => handle_filter(&args),
        Commands::Transform(args) => handle_transform(&args),
        Commands::Join(args) => handle_join(&args),
        Commands::Gct(args) => handle_gct(&args),
        Commands::Replay(args) => handle_replay(&args),
    }
}

/// Reads `path` with the shared reader options, returning the frame and the
/// delimiter it was parsed with.
fn load_input(path: &Path, args: &ReaderArgs) -> Result<(DataFrame, u8)> {
    let delimiter = io_utils::resolve_input_delimiter(path, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    info!(
        "Reading '{}' with delimiter '{}'",
        path.display(),
        printable_delimiter(delimiter)
    );
    let df = io_utils::read_frame(path, &args.reader(delimiter), encoding)?;
    Ok((df, delimiter))
}

fn write_output(df: &DataFrame, args: &OutputArgs, input_delimiter: u8) -> Result<()> {
    let path = args.output.as_deref();
    let delimiter =
        io_utils::resolve_output_delimiter(path, args.output_delimiter, input_delimiter);
    let encoding = io_utils::resolve_encoding(args.output_encoding.as_deref())?;
    io_utils::write_frame(df, &args.writer(delimiter), path, encoding)
}

#[derive(Debug, Serialize)]
struct ShapeReport<'a> {
    path: String,
    name: &'a str,
    rows: usize,
    cols: usize,
    shape: String,
}

fn handle_shape(args: &cli::ShapeArgs) -> Result<()> {
    for input in &args.inputs {
        let (df, _) = load_input(input, &args.reader)?;
        let shape = filter::formatted_shape(Some(&df));
        if args.json {
            let report = ShapeReport {
                path: input.display().to_string(),
                name: df.name(),
                rows: df.shape().rows,
                cols: df.shape().cols,
                shape,
            };
            println!("{}", serde_json::to_string(&report)?);
        } else {
            println!("{}\t{}", input.display(), shape);
        }
    }
    Ok(())
}

fn handle_filter(args: &cli::FilterArgs) -> Result<()> {
    if args.rows.is_empty() && args.cols.is_empty() {
        bail!("Provide --rows and/or --cols ids to filter on");
    }
    let (df, delimiter) = load_input(&args.input, &args.reader)?;
    let options = args.match_options();
    debug!("Match options: {options:?}");
    let mut filtered = df.clone();
    if !args.rows.is_empty() {
        filtered = filter::filter_rows_by_id(&filtered, &args.rows, &options);
    }
    if !args.cols.is_empty() {
        filtered = filter::filter_cols_by_id(&filtered, &args.cols, &options);
    }
    write_output(&filtered, &args.output, delimiter)?;
    info!(
        "Kept {} of {} row(s) and {} of {} column(s)",
        filtered.shape().rows,
        df.shape().rows,
        filtered.shape().cols,
        df.shape().cols
    );
    Ok(())
}

fn handle_transform(args: &cli::TransformArgs) -> Result<()> {
    let (df, delimiter) = load_input(&args.input, &args.reader)?;
    let spec = args.spec();
    let transformed = spec
        .apply(&df)
        .with_context(|| format!("Applying {}", spec.step_name()))?;
    write_output(&transformed, &args.output, delimiter)?;
    info!("{} produced {}", spec.step_name(), transformed.shape());
    Ok(())
}

fn handle_join(args: &cli::JoinArgs) -> Result<()> {
    let mut frames = Vec::with_capacity(args.inputs.len());
    let mut delimiter = DEFAULT_SEPARATOR;
    for (idx, input) in args.inputs.iter().enumerate() {
        let (df, sep) = load_input(input, &args.reader)?;
        if idx == 0 {
            delimiter = sep;
        }
        frames.push(df);
    }
    let joined = join::join_frames(&frames, args.axis.into()).context("Joining tables")?;
    write_output(&joined, &args.output, delimiter)?;
    info!(
        "Joined {} table(s) into {}",
        frames.len(),
        filter::formatted_shape(Some(&joined))
    );
    Ok(())
}

fn handle_gct(args: &cli::GctArgs) -> Result<()> {
    let (df, _) = load_input(&args.input, &args.reader)?;
    let gct = transform::gct::to_gct(&df).context("Building GCT layout")?;
    let path = args.output.output.as_deref();
    let delimiter =
        io_utils::resolve_output_delimiter(None, args.output.output_delimiter, DEFAULT_SEPARATOR);
    let encoding = io_utils::resolve_encoding(args.output.output_encoding.as_deref())?;
    let writer = args
        .output
        .writer(delimiter)
        .has_index(false)
        .has_header(false);
    io_utils::write_frame(&gct, &writer, path, encoding)?;
    info!("Wrote GCT for {} row(s)", df.shape().rows);
    Ok(())
}

fn handle_replay(args: &cli::ReplayArgs) -> Result<()> {
    let history = session::replay(&args.script)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&history.summary())?);
    } else {
        let summary = history.summary();
        for step in &summary.steps {
            let marker = if step.current { "*" } else { " " };
            let sheets = step
                .sheets
                .iter()
                .map(|sheet| format!("{} {}x{}", sheet.name, sheet.rows, sheet.cols))
                .collect::<Vec<_>>()
                .join(", ");
            println!("{marker} {}. {} [{sheets}]", step.index, step.name);
        }
        let current = history.current_sheet();
        println!();
        table::print_frame(current, args.rows);
        println!("{}", filter::frame_info(Some(current.as_ref())));
    }
    if let Some(path) = &args.write {
        let delimiter = io_utils::resolve_output_delimiter(
            Some(path.as_path()),
            args.output_delimiter,
            DEFAULT_SEPARATOR,
        );
        let writer = writer::DataFrameWriter::new().sep(delimiter);
        io_utils::write_frame(
            history.current_sheet(),
            &writer,
            Some(path.as_path()),
            encoding_rs::UTF_8,
        )?;
    }
    Ok(())
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
