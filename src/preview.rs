use anyhow::Result;
use log::info;

use crate::{cli::PreviewArgs, filter, io_utils, table};

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.reader.delimiter);
    let encoding = io_utils::resolve_encoding(args.reader.input_encoding.as_deref())?;
    let reader = args.reader.reader(delimiter);
    let df = io_utils::read_frame(&args.input, &reader, encoding)?;

    table::print_frame(&df, args.rows);
    println!("{}", filter::formatted_shape(Some(&df)));
    info!(
        "Displayed {} of {} row(s) from {:?}",
        args.rows.min(df.shape().rows),
        df.shape().rows,
        args.input
    );
    Ok(())
}
