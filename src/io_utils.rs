//! File and stream plumbing around the frame reader and writer.
//!
//! - **Delimiter resolution**: an explicit delimiter wins, otherwise `.csv`
//!   means comma and everything else tab.
//! - **Encoding**: input decoding and output transcoding via `encoding_rs`,
//!   defaulting to UTF-8.
//! - **stdin/stdout**: the `-` path convention routes through standard streams.

use std::{
    fs::File,
    io::{self, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::{Encoding, UTF_8};
use log::debug;

use crate::{
    frame::DataFrame,
    reader::{DEFAULT_SEPARATOR, DataFrameReader},
    writer::DataFrameWriter,
};

pub const CSV_DELIMITER: u8 = b',';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| delimiter_for_extension(path).unwrap_or(DEFAULT_SEPARATOR))
}

/// Output delimiter: explicit, then the output file's extension, then
/// `fallback` (normally the input delimiter).
pub fn resolve_output_delimiter(path: Option<&Path>, provided: Option<u8>, fallback: u8) -> u8 {
    provided
        .or_else(|| path.filter(|p| !is_dash(p)).and_then(delimiter_for_extension))
        .unwrap_or(fallback)
}

fn delimiter_for_extension(path: &Path) -> Option<u8> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => Some(CSV_DELIMITER),
        Some(ext) if ext.eq_ignore_ascii_case("tsv") || ext.eq_ignore_ascii_case("txt") => {
            Some(DEFAULT_SEPARATOR)
        }
        _ => None,
    }
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

/// Reads a whole file (or stdin for `-`) and splits it into lines.
pub fn read_lines(path: &Path, encoding: &'static Encoding) -> Result<Vec<String>> {
    let mut bytes = Vec::new();
    if is_dash(path) {
        io::stdin()
            .lock()
            .read_to_end(&mut bytes)
            .context("Reading standard input")?;
    } else {
        File::open(path)
            .with_context(|| format!("Opening input file {path:?}"))?
            .read_to_end(&mut bytes)
            .with_context(|| format!("Reading input file {path:?}"))?;
    }
    let text = decode_bytes(&bytes, encoding).with_context(|| format!("Decoding {path:?}"))?;
    Ok(text.lines().map(str::to_string).collect())
}

/// Display name for a frame loaded from `path`: the file stem, or `stdin`.
pub fn sheet_name(path: &Path) -> String {
    if is_dash(path) {
        return "stdin".to_string();
    }
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Loads `path` through `reader`, naming the frame after the file.
pub fn read_frame(
    path: &Path,
    reader: &DataFrameReader,
    encoding: &'static Encoding,
) -> Result<DataFrame> {
    let lines = read_lines(path, encoding)?;
    let df = reader
        .read(&lines[..])
        .with_context(|| format!("Parsing {path:?}"))?
        .with_name(sheet_name(path));
    debug!("Loaded {:?} as {} ({})", path, df.name(), df.shape());
    Ok(df)
}

/// Opens `path` for writing, or stdout when it is absent or `-`.
pub fn open_output(path: Option<&Path>, encoding: &'static Encoding) -> Result<Box<dyn Write>> {
    let base: Box<dyn Write> = match path {
        Some(p) if !is_dash(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        )),
        _ => Box::new(io::stdout()),
    };
    Ok(if encoding == UTF_8 {
        base
    } else {
        Box::new(TranscodingWriter::new(base, encoding))
    })
}

pub fn write_frame(
    df: &DataFrame,
    writer: &DataFrameWriter,
    path: Option<&Path>,
    encoding: &'static Encoding,
) -> Result<()> {
    let out = open_output(path, encoding)?;
    writer
        .write_to(df, out)
        .with_context(|| match path {
            Some(p) => format!("Writing {p:?}"),
            None => "Writing to stdout".to_string(),
        })
}

/// Re-encodes UTF-8 output into a legacy encoding, holding back any
/// incomplete multi-byte sequence until the next write.
struct TranscodingWriter<W: Write> {
    inner: W,
    encoding: &'static Encoding,
    pending: Vec<u8>,
}

impl<W: Write> TranscodingWriter<W> {
    fn new(inner: W, encoding: &'static Encoding) -> Self {
        Self {
            inner,
            encoding,
            pending: Vec::new(),
        }
    }

    fn encode_ready(&mut self) -> io::Result<()> {
        let ready = match std::str::from_utf8(&self.pending) {
            Ok(_) => self.pending.len(),
            Err(err) if err.error_len().is_none() => err.valid_up_to(),
            Err(err) => return Err(io::Error::new(io::ErrorKind::InvalidData, err)),
        };
        if ready == 0 {
            return Ok(());
        }
        let text = std::str::from_utf8(&self.pending[..ready])
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        let (encoded, _, had_errors) = self.encoding.encode(text);
        if had_errors {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Failed to encode text using {}", self.encoding.name()),
            ));
        }
        self.inner.write_all(&encoded)?;
        self.pending.drain(..ready);
        Ok(())
    }
}

impl<W: Write> Write for TranscodingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        self.encode_ready()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.encode_ready()?;
        if !self.pending.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "Incomplete UTF-8 sequence at end of output stream",
            ));
        }
        self.inner.flush()
    }
}
