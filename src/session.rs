//! Scripted sessions: a list of operations replayed against a [`History`].
//!
//! Scripts are YAML (`.yml`/`.yaml`) or JSON (anything else):
//!
//! ```yaml
//! operations:
//!   - op: load
//!     path: counts.tsv
//!     index_cols: 1
//!   - op: filter_rows
//!     ids: [gene1, gene2]
//!     entire_cell: true
//!   - op: transform
//!     kind: log2
//!     offset: 1
//!   - op: undo
//! ```
//!
//! Relative paths are resolved against the directory holding the script.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result, anyhow};
use log::{debug, info};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::{
    cli::parse_delimiter,
    filter::{self, MatchOptions},
    history::{History, HistoryAction, SheetId},
    io_utils,
    reader::DataFrameReader,
    transform::TransformSpec,
};

#[derive(Debug, Clone, Deserialize)]
pub struct SessionScript {
    pub operations: Vec<Operation>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// The first load resets the history; later loads add a step, or a
    /// sheet to the current step with `as_sheet`.
    Load(LoadSpec),
    FilterRows {
        ids: Vec<String>,
        #[serde(flatten)]
        options: MatchOptions,
    },
    FilterCols {
        ids: Vec<String>,
        #[serde(flatten)]
        options: MatchOptions,
    },
    Transform(TransformSpec),
    /// Renames the current sheet in place.
    Rename { name: String },
    Undo,
    Redo,
    Goto { step: SheetId },
    ChangeSheet { sheet: SheetId },
    Remove { step: SheetId },
    Clear,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoadSpec {
    pub path: PathBuf,
    /// Delimiter name or character; resolved from the extension when absent.
    #[serde(default)]
    pub sep: Option<String>,
    #[serde(default = "default_col_names")]
    pub col_names: usize,
    #[serde(default)]
    pub index_cols: usize,
    #[serde(default)]
    pub skip_rows: usize,
    #[serde(default)]
    pub ignore_rows: Vec<usize>,
    #[serde(default = "default_keep_default_na")]
    pub keep_default_na: bool,
    #[serde(default)]
    pub encoding: Option<String>,
    /// Sheet name; defaults to the file stem.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub as_sheet: bool,
}

fn default_col_names() -> usize {
    1
}

fn default_keep_default_na() -> bool {
    true
}

impl LoadSpec {
    pub fn reader(&self, path: &Path) -> Result<DataFrameReader> {
        let sep = self
            .sep
            .as_deref()
            .map(parse_delimiter)
            .transpose()
            .map_err(|err| anyhow!("Invalid separator for {path:?}: {err}"))?;
        Ok(DataFrameReader::new()
            .sep(io_utils::resolve_input_delimiter(path, sep))
            .col_names(self.col_names)
            .index_cols(self.index_cols)
            .skip_rows(self.skip_rows)
            .ignore_rows(self.ignore_rows.iter().copied())
            .keep_default_na(self.keep_default_na))
    }
}

pub fn load_script(path: &Path) -> Result<SessionScript> {
    let raw = fs::read_to_string(path).with_context(|| format!("Opening session {path:?}"))?;
    parse_script(&raw, is_yaml(path)).with_context(|| format!("Parsing session {path:?}"))
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some(ext) if ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml")
    )
}

pub fn parse_script<T: DeserializeOwned>(raw: &str, yaml: bool) -> Result<T> {
    if yaml {
        Ok(serde_yaml::from_str(raw)?)
    } else {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Replays operations against a history, loading files relative to
/// `base_dir`.
#[derive(Debug)]
pub struct Session {
    history: History,
    base_dir: PathBuf,
    loaded: bool,
}

impl Session {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            history: History::new(),
            base_dir: base_dir.into(),
            loaded: false,
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn into_history(self) -> History {
        self.history
    }

    pub fn apply(&mut self, operation: &Operation) -> Result<()> {
        let action = match operation {
            Operation::Load(spec) => self.load(spec)?,
            Operation::FilterRows { ids, options } => {
                let df = filter::filter_rows_by_id(self.history.current_sheet(), ids, options);
                HistoryAction::add_step("Filter rows", [df])
            }
            Operation::FilterCols { ids, options } => {
                let df = filter::filter_cols_by_id(self.history.current_sheet(), ids, options);
                HistoryAction::add_step("Filter columns", [df])
            }
            Operation::Transform(spec) => {
                let df = spec
                    .apply(self.history.current_sheet())
                    .with_context(|| format!("Applying {}", spec.step_name()))?;
                HistoryAction::add_step(spec.step_name(), [df])
            }
            Operation::Rename { name } => {
                let step = self.history.state().current_step();
                HistoryAction::ReplaceSheet {
                    sheet: SheetId::Index(step.current_sheet_index()),
                    frame: Arc::new(step.current_sheet().set_name(name.as_str())),
                }
            }
            Operation::Undo => HistoryAction::Undo,
            Operation::Redo => HistoryAction::Redo,
            Operation::Goto { step } => HistoryAction::Goto { step: step.clone() },
            Operation::ChangeSheet { sheet } => HistoryAction::ChangeSheet {
                sheet: sheet.clone(),
            },
            Operation::Remove { step } => HistoryAction::Remove { step: step.clone() },
            Operation::Clear => {
                self.loaded = false;
                HistoryAction::Clear
            }
        };
        self.history.dispatch(action);
        Ok(())
    }

    fn load(&mut self, spec: &LoadSpec) -> Result<HistoryAction> {
        let path = self.resolve_path(&spec.path);
        let reader = spec.reader(&path)?;
        let encoding = io_utils::resolve_encoding(spec.encoding.as_deref())?;
        let mut df = io_utils::read_frame(&path, &reader, encoding)?;
        if let Some(name) = &spec.name {
            df = df.with_name(name.as_str());
        }
        let step_name = format!("Load {}", df.name());
        let action = if spec.as_sheet && self.loaded {
            HistoryAction::add_sheets([df])
        } else if self.loaded {
            HistoryAction::add_step(step_name, [df])
        } else {
            HistoryAction::reset(step_name, [df])
        };
        self.loaded = true;
        Ok(action)
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() || io_utils::is_dash(path) {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

/// Loads and replays the script at `path`.
pub fn replay(path: &Path) -> Result<History> {
    let script = load_script(path)?;
    let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    replay_script(&script, &base_dir)
}

pub fn replay_script(script: &SessionScript, base_dir: &Path) -> Result<History> {
    let mut session = Session::new(base_dir);
    for (idx, operation) in script.operations.iter().enumerate() {
        debug!("Operation {}: {:?}", idx + 1, operation);
        session
            .apply(operation)
            .with_context(|| format!("Replaying operation {}", idx + 1))?;
    }
    let history = session.into_history();
    info!(
        "Replayed {} operation(s) into {} step(s)",
        script.operations.len(),
        history.state().steps().len()
    );
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_yaml_operations() {
        let script: SessionScript = parse_script(
            "operations:\n  - op: load\n    path: a.tsv\n    index_cols: 1\n  - op: filter_rows\n    ids: [r1]\n    entire_cell: true\n  - op: transform\n    kind: top_rows\n    top: 5\n  - op: goto\n    step: 0\n  - op: change_sheet\n    sheet: counts\n  - op: undo\n",
            true,
        )
        .unwrap();
        assert_eq!(script.operations.len(), 6);
        match &script.operations[1] {
            Operation::FilterRows { ids, options } => {
                assert_eq!(ids, &["r1"]);
                assert!(options.entire_cell);
                assert!(!options.case_sensitive);
            }
            other => panic!("unexpected operation {other:?}"),
        }
        assert!(matches!(
            &script.operations[3],
            Operation::Goto {
                step: SheetId::Index(0)
            }
        ));
        assert!(matches!(
            &script.operations[4],
            Operation::ChangeSheet {
                sheet: SheetId::Name(name)
            } if name == "counts"
        ));
    }

    #[test]
    fn parses_json_operations() {
        let script: SessionScript = parse_script(
            r#"{"operations": [{"op": "load", "path": "a.csv", "as_sheet": true}, {"op": "clear"}]}"#,
            false,
        )
        .unwrap();
        match &script.operations[0] {
            Operation::Load(spec) => {
                assert!(spec.as_sheet);
                assert_eq!(spec.col_names, 1);
                assert!(spec.keep_default_na);
            }
            other => panic!("unexpected operation {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_operations() {
        let parsed: Result<SessionScript> =
            parse_script(r#"{"operations": [{"op": "explode"}]}"#, false);
        assert!(parsed.is_err());
    }

    #[test]
    fn load_spec_resolves_separator() {
        let spec: LoadSpec = parse_script(r#"{"path": "a.csv", "sep": "tab"}"#, false).unwrap();
        assert_eq!(spec.reader(Path::new("a.csv")).unwrap().separator(), b'\t');
        let spec: LoadSpec = parse_script(r#"{"path": "a.csv"}"#, false).unwrap();
        assert_eq!(spec.reader(Path::new("a.csv")).unwrap().separator(), b',');
    }
}
