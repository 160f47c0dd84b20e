//! Linear undo/redo history of named steps, each holding one or more sheets.
//!
//! [`reduce`] is the whole state machine: a pure function from a state and
//! an action to the next state. [`History`] owns a state and funnels every
//! change through it.
//!
//! Navigation to a step or sheet that does not exist never fails; the state
//! is returned unchanged and the miss is logged at warn level.

use std::{fmt, sync::Arc};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::frame::DataFrame;

pub const DEFAULT_STEP_NAME: &str = "Load default sheet";

/// Reference to a step or a sheet, by position or by name.
///
/// Names match the first entry whose name contains the query, ignoring case.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SheetId {
    Index(usize),
    Name(String),
}

impl SheetId {
    fn resolve<'a, I>(&self, names: I, len: usize) -> Option<usize>
    where
        I: IntoIterator<Item = &'a str>,
    {
        match self {
            SheetId::Index(idx) => (*idx < len).then_some(*idx),
            SheetId::Name(query) => {
                let query = query.to_lowercase();
                names
                    .into_iter()
                    .position(|name| name.to_lowercase().contains(&query))
            }
        }
    }
}

impl fmt::Display for SheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetId::Index(idx) => write!(f, "#{idx}"),
            SheetId::Name(name) => write!(f, "'{name}'"),
        }
    }
}

impl From<usize> for SheetId {
    fn from(value: usize) -> Self {
        SheetId::Index(value)
    }
}

impl From<&str> for SheetId {
    fn from(value: &str) -> Self {
        SheetId::Name(value.to_string())
    }
}

impl From<String> for SheetId {
    fn from(value: String) -> Self {
        SheetId::Name(value)
    }
}

/// One point on the timeline. Always holds at least one sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryStep {
    name: String,
    sheets: Vec<Arc<DataFrame>>,
    current_sheet: usize,
}

impl HistoryStep {
    /// An empty `sheets` list is replaced by the placeholder sheet.
    pub fn new(name: impl Into<String>, sheets: Vec<Arc<DataFrame>>) -> Self {
        let sheets = if sheets.is_empty() {
            vec![Arc::new(DataFrame::placeholder())]
        } else {
            sheets
        };
        Self {
            name: name.into(),
            sheets,
            current_sheet: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sheets(&self) -> &[Arc<DataFrame>] {
        &self.sheets
    }

    pub fn current_sheet_index(&self) -> usize {
        self.current_sheet
    }

    pub fn current_sheet(&self) -> &Arc<DataFrame> {
        &self.sheets[self.current_sheet]
    }

    fn resolve_sheet(&self, id: &SheetId) -> Option<usize> {
        id.resolve(self.sheets.iter().map(|df| df.name()), self.sheets.len())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryState {
    steps: Vec<HistoryStep>,
    current_step: usize,
}

impl Default for HistoryState {
    /// A single step holding the placeholder sheet.
    fn default() -> Self {
        Self::single(HistoryStep::new(DEFAULT_STEP_NAME, Vec::new()))
    }
}

impl HistoryState {
    fn single(step: HistoryStep) -> Self {
        Self {
            steps: vec![step],
            current_step: 0,
        }
    }

    pub fn steps(&self) -> &[HistoryStep] {
        &self.steps
    }

    pub fn current_step_index(&self) -> usize {
        self.current_step
    }

    pub fn current_step(&self) -> &HistoryStep {
        &self.steps[self.current_step]
    }

    pub fn current_sheet(&self) -> &Arc<DataFrame> {
        self.current_step().current_sheet()
    }

    fn resolve_step(&self, id: &SheetId) -> Option<usize> {
        id.resolve(self.steps.iter().map(HistoryStep::name), self.steps.len())
    }

    fn apply(mut self, action: HistoryAction) -> Self {
        match action {
            HistoryAction::Reset { name, sheets } => {
                Self::single(HistoryStep::new(name, sheets))
            }
            HistoryAction::AddStep {
                name,
                sheets,
                sheet,
            } => {
                let mut step = HistoryStep::new(name, sheets);
                if let Some(id) = sheet {
                    step.current_sheet = step.resolve_sheet(&id).unwrap_or(0);
                }
                self.steps.truncate(self.current_step + 1);
                self.steps.push(step);
                self.current_step = self.steps.len() - 1;
                self
            }
            HistoryAction::Undo => {
                self.current_step = self.current_step.saturating_sub(1);
                self
            }
            HistoryAction::Redo => {
                if self.current_step + 1 < self.steps.len() {
                    self.current_step += 1;
                }
                self
            }
            HistoryAction::Goto { step } => match self.resolve_step(&step) {
                Some(idx) => {
                    self.current_step = idx;
                    self
                }
                None => {
                    warn!("Ignoring jump to unknown step {step}");
                    self
                }
            },
            HistoryAction::ChangeSheet { sheet } => {
                let current = self.current_step;
                match self.steps[current].resolve_sheet(&sheet) {
                    Some(idx) => self.steps[current].current_sheet = idx,
                    None => warn!("Ignoring switch to unknown sheet {sheet}"),
                }
                self
            }
            HistoryAction::AddSheets { sheets } => {
                if sheets.is_empty() {
                    return self;
                }
                let step = &mut self.steps[self.current_step];
                step.current_sheet = step.sheets.len();
                step.sheets.extend(sheets);
                self
            }
            HistoryAction::ReplaceSheet { sheet, frame } => {
                self.steps.truncate(self.current_step + 1);
                let step = &mut self.steps[self.current_step];
                match step.resolve_sheet(&sheet) {
                    Some(idx) => {
                        step.sheets[idx] = frame;
                        step.current_sheet = idx;
                    }
                    None => {
                        step.sheets.push(frame);
                        step.current_sheet = step.sheets.len() - 1;
                    }
                }
                self
            }
            HistoryAction::Remove { step } => {
                let Some(idx) = self.resolve_step(&step) else {
                    warn!("Ignoring removal of unknown step {step}");
                    return self;
                };
                if self.steps.len() == 1 {
                    return Self::default();
                }
                self.steps.remove(idx);
                if idx <= self.current_step {
                    self.current_step = self.current_step.saturating_sub(1);
                }
                self
            }
            HistoryAction::Clear => Self::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum HistoryAction {
    /// Replace the whole timeline with one step.
    Reset {
        name: String,
        sheets: Vec<Arc<DataFrame>>,
    },
    /// Drop any redo steps, then append and select a new step.
    AddStep {
        name: String,
        sheets: Vec<Arc<DataFrame>>,
        sheet: Option<SheetId>,
    },
    Undo,
    Redo,
    Goto {
        step: SheetId,
    },
    /// Select a sheet of the current step. Not an undoable edit.
    ChangeSheet {
        sheet: SheetId,
    },
    /// Append sheets to the current step and select the first new one.
    AddSheets {
        sheets: Vec<Arc<DataFrame>>,
    },
    /// Swap a sheet of the current step in place, appending when `sheet`
    /// does not resolve. Redo steps are dropped.
    ReplaceSheet {
        sheet: SheetId,
        frame: Arc<DataFrame>,
    },
    Remove {
        step: SheetId,
    },
    Clear,
}

impl HistoryAction {
    pub fn reset<I>(name: impl Into<String>, frames: I) -> Self
    where
        I: IntoIterator<Item = DataFrame>,
    {
        HistoryAction::Reset {
            name: name.into(),
            sheets: frames.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn add_step<I>(name: impl Into<String>, frames: I) -> Self
    where
        I: IntoIterator<Item = DataFrame>,
    {
        HistoryAction::AddStep {
            name: name.into(),
            sheets: frames.into_iter().map(Arc::new).collect(),
            sheet: None,
        }
    }

    pub fn add_sheets<I>(frames: I) -> Self
    where
        I: IntoIterator<Item = DataFrame>,
    {
        HistoryAction::AddSheets {
            sheets: frames.into_iter().map(Arc::new).collect(),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            HistoryAction::Reset { .. } => "reset",
            HistoryAction::AddStep { .. } => "add_step",
            HistoryAction::Undo => "undo",
            HistoryAction::Redo => "redo",
            HistoryAction::Goto { .. } => "goto",
            HistoryAction::ChangeSheet { .. } => "change_sheet",
            HistoryAction::AddSheets { .. } => "add_sheets",
            HistoryAction::ReplaceSheet { .. } => "replace_sheet",
            HistoryAction::Remove { .. } => "remove",
            HistoryAction::Clear => "clear",
        }
    }
}

/// The history state machine. Never panics and never fails.
pub fn reduce(state: &HistoryState, action: HistoryAction) -> HistoryState {
    state.clone().apply(action)
}

/// Owned history store; all changes go through [`History::dispatch`].
#[derive(Debug, Clone, Default)]
pub struct History {
    state: HistoryState,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&mut self, action: HistoryAction) {
        let label = action.label();
        let state = std::mem::take(&mut self.state);
        self.state = state.apply(action);
        debug!(
            "History {label}: step {}/{} '{}'",
            self.state.current_step + 1,
            self.state.steps.len(),
            self.state.current_step().name()
        );
    }

    pub fn state(&self) -> &HistoryState {
        &self.state
    }

    pub fn can_undo(&self) -> bool {
        self.state.current_step > 0
    }

    pub fn can_redo(&self) -> bool {
        self.state.current_step + 1 < self.state.steps.len()
    }

    pub fn current_sheet(&self) -> &Arc<DataFrame> {
        self.state.current_sheet()
    }

    pub fn summary(&self) -> HistorySummary {
        let steps = self
            .state
            .steps
            .iter()
            .enumerate()
            .map(|(index, step)| StepSummary {
                index,
                name: step.name.clone(),
                current: index == self.state.current_step,
                current_sheet: step.current_sheet,
                sheets: step
                    .sheets
                    .iter()
                    .map(|df| SheetSummary {
                        name: df.name().to_string(),
                        rows: df.shape().rows,
                        cols: df.shape().cols,
                    })
                    .collect(),
            })
            .collect();
        HistorySummary {
            current_step: self.state.current_step,
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            steps,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySummary {
    pub current_step: usize,
    pub can_undo: bool,
    pub can_redo: bool,
    pub steps: Vec<StepSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepSummary {
    pub index: usize,
    pub name: String,
    pub current: bool,
    pub current_sheet: usize,
    pub sheets: Vec<SheetSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetSummary {
    pub name: String,
    pub rows: usize,
    pub cols: usize,
}
