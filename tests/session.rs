mod common;

use common::TestWorkspace;
use tabstep::session::{self, Operation, SessionScript};

#[test]
fn replays_fixture_session() {
    let history = session::replay(&common::fixture_path("session.yml")).expect("replay session");
    let state = history.state();
    let names: Vec<&str> = state.steps().iter().map(|step| step.name()).collect();
    assert_eq!(
        names,
        ["Load counts", "Filter rows", "Filter rows using mean, top 1"]
    );
    assert_eq!(state.current_step_index(), 2);

    let step = state.current_step();
    assert_eq!(step.sheets().len(), 2);
    assert_eq!(step.sheets()[1].name(), "extra");
    assert_eq!(step.current_sheet_index(), 0);
    assert_eq!(history.current_sheet().name(), "best");
    assert_eq!(history.current_sheet().row_names(), ["BRCA1"]);
}

#[test]
fn json_script_with_relative_paths() {
    let workspace = TestWorkspace::new();
    workspace.write("table.tsv", common::COUNTS_TSV);
    let script = workspace.write(
        "steps.json",
        r#"{"operations": [
            {"op": "load", "path": "table.tsv", "index_cols": 1},
            {"op": "filter_cols", "ids": ["S1", "S3"], "entire_cell": true},
            {"op": "transform", "kind": "zscore_rows"},
            {"op": "goto", "step": "load"},
            {"op": "remove", "step": 1}
        ]}"#,
    );
    let history = session::replay(&script).expect("replay json session");
    let state = history.state();
    assert_eq!(state.steps().len(), 2);
    assert_eq!(state.current_step_index(), 0);
    assert_eq!(state.steps()[1].name(), "Row z-score");
    assert_eq!(state.steps()[1].current_sheet().col_names(), ["S1", "S3"]);
}

#[test]
fn second_load_adds_a_step_and_clear_starts_over() {
    let workspace = TestWorkspace::new();
    workspace.write("a.tsv", common::COUNTS_TSV);
    let script = workspace.write(
        "steps.yaml",
        "operations:\n  - op: load\n    path: a.tsv\n  - op: load\n    path: a.tsv\n    name: again\n  - op: clear\n  - op: load\n    path: a.tsv\n",
    );
    let history = session::replay(&script).unwrap();
    assert_eq!(history.state().steps().len(), 1);
    assert_eq!(history.state().current_step().name(), "Load a");
}

#[test]
fn missing_input_reports_operation_number() {
    let workspace = TestWorkspace::new();
    let script = workspace.write(
        "broken.json",
        r#"{"operations": [{"op": "undo"}, {"op": "load", "path": "nope.tsv"}]}"#,
    );
    let err = session::replay(&script).unwrap_err();
    assert!(format!("{err:#}").contains("Replaying operation 2"));
}

#[test]
fn scripts_can_be_built_in_code() {
    let script: SessionScript =
        session::parse_script(r#"{"operations": [{"op": "redo"}]}"#, false).unwrap();
    assert!(matches!(script.operations[0], Operation::Redo));
    let history = session::replay_script(&script, std::path::Path::new(".")).unwrap();
    assert_eq!(history.state().steps().len(), 1);
}
