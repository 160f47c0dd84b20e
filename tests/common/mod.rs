#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tabstep::{frame::DataFrame, reader::DataFrameReader};
use tempfile::{TempDir, tempdir};

/// Expression table with a named index column and one missing value.
pub const COUNTS_TSV: &str = "gene\tS1\tS2\tS3\n\
BRCA1\t10\t20\t30\n\
TP53\t5\t5\t5\n\
MYC\t1\tNA\t100\n\
brca2\t7\t8\t9\n";

/// Returns the absolute path to a fixture under `tests/data`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Parses tab-separated text with one header line and one index column.
pub fn indexed_frame(text: &str) -> DataFrame {
    DataFrameReader::new()
        .index_cols(1)
        .read_str(text)
        .expect("parse indexed frame")
}

pub fn counts() -> DataFrame {
    indexed_frame(COUNTS_TSV).with_name("counts")
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}
