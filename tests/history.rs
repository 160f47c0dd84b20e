mod common;

use std::sync::Arc;

use proptest::prelude::*;
use tabstep::{
    frame::{DEFAULT_SHEET_NAME, DataFrame},
    history::{DEFAULT_STEP_NAME, History, HistoryAction, HistoryState, SheetId, reduce},
};

fn sheet(name: &str) -> DataFrame {
    DataFrame::empty(name)
}

fn base_state() -> HistoryState {
    reduce(
        &HistoryState::default(),
        HistoryAction::reset("Load base", [sheet("base")]),
    )
}

#[test]
fn reset_add_step_undo_restores_loaded_sheet() {
    let df1 = common::counts();
    let df2 = df1.set_name("filtered");
    let mut history = History::new();
    history.dispatch(HistoryAction::reset("Load x", [df1.clone()]));
    history.dispatch(HistoryAction::add_step("Filter", [df2]));
    history.dispatch(HistoryAction::Undo);
    assert_eq!(history.state().current_step().sheets(), [Arc::new(df1)]);
    assert!(history.can_redo());
}

#[test]
fn clear_returns_to_default_step() {
    let mut history = History::new();
    history.dispatch(HistoryAction::reset("Load x", [common::counts()]));
    history.dispatch(HistoryAction::Clear);
    let state = history.state();
    assert_eq!(state.steps().len(), 1);
    assert_eq!(state.current_step().name(), DEFAULT_STEP_NAME);
    assert_eq!(history.current_sheet().name(), DEFAULT_SHEET_NAME);
    assert!(!history.can_undo());
    assert!(!history.can_redo());
}

#[test]
fn goto_out_of_range_is_a_no_op() {
    let state = base_state();
    assert_eq!(
        reduce(&state, HistoryAction::Goto { step: SheetId::Index(1) }),
        state
    );
}

#[test]
fn remove_out_of_range_is_a_no_op() {
    let state = reduce(&base_state(), HistoryAction::add_step("Next", [sheet("n")]));
    assert_eq!(
        reduce(&state, HistoryAction::Remove { step: SheetId::Index(5) }),
        state
    );
    assert_eq!(
        reduce(
            &state,
            HistoryAction::Remove {
                step: SheetId::Name("absent".to_string())
            }
        ),
        state
    );
}

#[test]
fn change_sheet_to_unknown_sheet_is_a_no_op() {
    let state = reduce(&base_state(), HistoryAction::add_sheets([sheet("second")]));
    assert_eq!(state.current_sheet().name(), "second");
    assert_eq!(
        reduce(&state, HistoryAction::ChangeSheet { sheet: SheetId::Index(2) }),
        state
    );
    let state = reduce(
        &state,
        HistoryAction::ChangeSheet {
            sheet: SheetId::Name("BASE".to_string()),
        },
    );
    assert_eq!(state.current_step().current_sheet_index(), 0);
    assert_eq!(state.steps().len(), 1);
}

#[test]
fn add_step_can_preselect_a_sheet() {
    let state = reduce(
        &base_state(),
        HistoryAction::AddStep {
            name: "Split".to_string(),
            sheets: vec![Arc::new(sheet("left")), Arc::new(sheet("right"))],
            sheet: Some(SheetId::Name("righ".to_string())),
        },
    );
    assert_eq!(state.current_sheet().name(), "right");
}

#[test]
fn summary_serializes_to_json() {
    let mut history = History::new();
    history.dispatch(HistoryAction::reset("Load counts", [common::counts()]));
    let json = serde_json::to_value(history.summary()).unwrap();
    assert_eq!(json["current_step"], 0);
    assert_eq!(json["steps"][0]["name"], "Load counts");
    assert_eq!(json["steps"][0]["sheets"][0]["rows"], 4);
    assert_eq!(json["can_undo"], false);
}

proptest! {
    #[test]
    fn undo_redo_is_linear(n in 0usize..8, m_seed in 0usize..8) {
        let m = m_seed % (n + 1);
        let mut state = base_state();
        for step in 0..n {
            state = reduce(&state, HistoryAction::add_step(format!("Step {step}"), [sheet("s")]));
        }
        for _ in 0..m {
            state = reduce(&state, HistoryAction::Undo);
        }
        prop_assert_eq!(state.current_step_index(), n - m);

        state = reduce(&state, HistoryAction::add_step("Branch", [sheet("b")]));
        prop_assert_eq!(state.steps().len() - 1, (n - m) + 1);
        prop_assert_eq!(state.current_step().name(), "Branch");
    }

    #[test]
    fn undo_at_start_and_redo_at_end_change_nothing(n in 0usize..6) {
        let mut state = base_state();
        for step in 0..n {
            state = reduce(&state, HistoryAction::add_step(format!("Step {step}"), [sheet("s")]));
        }
        prop_assert_eq!(reduce(&state, HistoryAction::Redo), state.clone());
        let mut start = state.clone();
        for _ in 0..n {
            start = reduce(&start, HistoryAction::Undo);
        }
        prop_assert_eq!(start.current_step_index(), 0);
        prop_assert_eq!(reduce(&start, HistoryAction::Undo), start.clone());
    }

    #[test]
    fn state_invariants_hold_under_any_action_sequence(ops in proptest::collection::vec(0u8..8, 0..40)) {
        let mut state = HistoryState::default();
        for (i, op) in ops.into_iter().enumerate() {
            let action = match op {
                0 => HistoryAction::add_step(format!("s{i}"), [sheet("x")]),
                1 => HistoryAction::Undo,
                2 => HistoryAction::Redo,
                3 => HistoryAction::Goto { step: SheetId::Index(i % 5) },
                4 => HistoryAction::Remove { step: SheetId::Index(i % 4) },
                5 => HistoryAction::add_sheets([sheet("extra")]),
                6 => HistoryAction::ChangeSheet { sheet: SheetId::Index(i % 3) },
                _ => HistoryAction::reset("r", Vec::<DataFrame>::new()),
            };
            state = reduce(&state, action);
            prop_assert!(!state.steps().is_empty());
            prop_assert!(state.current_step_index() < state.steps().len());
            for step in state.steps() {
                prop_assert!(!step.sheets().is_empty());
                prop_assert!(step.current_sheet_index() < step.sheets().len());
            }
        }
    }
}
