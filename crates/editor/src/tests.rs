use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

use super::*;

const SCRIPT: &str = "import x\n  y = 1  \n\nprint(y)\n";

#[test]
fn script_returns_whole_text() {
	let model = EditorModel::new(SCRIPT);
	assert_eq!(model.script(), SCRIPT);
	assert_eq!(model.line_count(), 5);
	assert_eq!(model.selected_lines(), None);
}

#[rstest]
#[case::single_line(0, 0, "import x")]
#[case::trailing_whitespace_trimmed(0, 1, "import x\n  y = 1")]
#[case::leading_whitespace_kept(1, 1, "  y = 1")]
#[case::blank_last_line(0, 2, "import x\n  y = 1  \n")]
#[case::reversed(3, 1, "  y = 1  \n\nprint(y)")]
#[case::past_the_end(3, 99, "print(y)\n")]
fn selected_lines_span_whole_lines(#[case] start: usize, #[case] end: usize, #[case] expected: &str) {
	let mut model = EditorModel::new(SCRIPT);
	model.select(start, end);
	assert_eq!(model.selected_lines().as_deref(), Some(expected));
}

#[test]
fn blank_single_line_selects_nothing() {
	let mut model = EditorModel::new(SCRIPT);
	model.select(2, 2);
	assert_eq!(model.selected_lines().as_deref(), Some(""));
}

#[test]
fn selection_survives_shrinking_text() {
	let mut model = EditorModel::new(SCRIPT);
	model.select(1, 3);
	model.set_text("only");
	assert_eq!(
		model.selection(),
		Some(Selection {
			start_line: 0,
			end_line: 0
		})
	);
	assert_eq!(model.selected_lines().as_deref(), Some("only"));

	model.clear_selection();
	assert_eq!(model.selection(), None);
}

#[test]
fn set_text_is_undoable() {
	let mut model = EditorModel::new("a");
	model.set_text("b");
	model.set_text("c");

	assert!(model.undo());
	assert_eq!(model.script(), "b");
	assert!(model.undo());
	assert_eq!(model.script(), "a");
	assert!(!model.undo());

	assert!(model.redo());
	assert_eq!(model.script(), "b");
}

#[test]
fn edit_after_undo_drops_redo() {
	let mut model = EditorModel::new("a");
	model.set_text("b");
	model.undo();
	model.set_text("c");
	assert!(!model.can_redo());
	assert!(model.undo());
	assert_eq!(model.script(), "a");
}

#[test]
fn unchanged_text_records_nothing() {
	let mut model = EditorModel::new("a");
	let version = model.version();
	model.set_text("a");
	assert!(!model.can_undo());
	assert_eq!(model.version(), version);
}

#[test]
fn initial_text_clears_history() {
	let mut model = EditorModel::new("a");
	model.set_text("b");
	model.set_initial_text("loaded");
	assert!(!model.can_undo());
	assert!(!model.undo());
	assert_eq!(model.script(), "loaded");
}

#[test]
fn history_is_bounded() {
	let mut model = EditorModel::new("0");
	for i in 1..=(MAX_UNDO + 10) {
		model.set_text(&i.to_string());
	}
	let mut undone = 0;
	while model.undo() {
		undone += 1;
	}
	assert_eq!(undone, MAX_UNDO);
	assert_eq!(model.script(), "10");
}

proptest! {
	#[test]
	fn undoing_everything_restores_the_start(edits in proptest::collection::vec("[a-c\n ]{0,6}", 0..20)) {
		let mut model = EditorModel::new("start");
		for edit in &edits {
			model.set_text(edit);
		}
		while model.undo() {}
		prop_assert_eq!(model.script(), "start");
	}
}
