use ropey::Rope;
use tracing::debug;

use crate::history::History;

/// Inclusive range of 0-based line numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
	/// First selected line.
	pub start_line: usize,
	/// Last selected line, possibly only partly selected.
	pub end_line: usize,
}

/// The script being edited.
#[derive(Debug, Default)]
pub struct EditorModel {
	text: Rope,
	selection: Option<Selection>,
	history: History,
	version: u64,
}

impl EditorModel {
	/// Creates a model holding `text` with an empty history.
	pub fn new(text: &str) -> Self {
		Self {
			text: Rope::from_str(text),
			..Self::default()
		}
	}

	/// The entire script.
	pub fn script(&self) -> String {
		self.text.to_string()
	}

	/// Number of lines; a trailing newline starts an empty last line.
	pub fn line_count(&self) -> usize {
		self.text.len_lines()
	}

	/// Bumped on every text change, undo and redo included.
	pub fn version(&self) -> u64 {
		self.version
	}

	/// Replaces the text without recording history, e.g. when loading a script.
	pub fn set_initial_text(&mut self, text: &str) {
		self.text = Rope::from_str(text);
		self.history.clear();
		self.selection = None;
		self.version += 1;
	}

	/// Replaces the whole text as one undoable edit.
	///
	/// Setting the current text again records nothing.
	pub fn set_text(&mut self, text: &str) {
		if self.text == text {
			return;
		}
		let before = std::mem::replace(&mut self.text, Rope::from_str(text));
		self.history.record(before);
		self.clamp_selection();
		self.version += 1;
	}

	/// Reverts the last [`Self::set_text`]. Returns false if there is nothing to undo.
	pub fn undo(&mut self) -> bool {
		let Some(previous) = self.history.undo(self.text.clone()) else {
			return false;
		};
		self.text = previous;
		self.clamp_selection();
		self.version += 1;
		debug!(version = self.version, "undo");
		true
	}

	/// Re-applies the last undone edit. Returns false if there is nothing to redo.
	pub fn redo(&mut self) -> bool {
		let Some(next) = self.history.redo(self.text.clone()) else {
			return false;
		};
		self.text = next;
		self.clamp_selection();
		self.version += 1;
		debug!(version = self.version, "redo");
		true
	}

	pub fn can_undo(&self) -> bool {
		self.history.can_undo()
	}

	pub fn can_redo(&self) -> bool {
		self.history.can_redo()
	}

	/// Selects the lines `start_line..=end_line`, in either order.
	///
	/// Lines past the end are clamped to the last line.
	pub fn select(&mut self, start_line: usize, end_line: usize) {
		let (start_line, end_line) = if start_line <= end_line {
			(start_line, end_line)
		} else {
			(end_line, start_line)
		};
		self.selection = Some(Selection { start_line, end_line });
		self.clamp_selection();
	}

	/// Drops the selection.
	pub fn clear_selection(&mut self) {
		self.selection = None;
	}

	/// Current selection, if any.
	pub fn selection(&self) -> Option<Selection> {
		self.selection
	}

	/// Text of every line touched by the selection.
	///
	/// Starts at column 0 of the first line and ends after the last
	/// non-whitespace character of the last line. A blank last line
	/// contributes nothing. `None` without a selection.
	pub fn selected_lines(&self) -> Option<String> {
		let Selection { start_line, end_line } = self.selection?;
		let start = self.text.line_to_char(start_line);
		let end_start = self.text.line_to_char(end_line);
		let end = self
			.text
			.line(end_line)
			.chars()
			.enumerate()
			.filter(|(_, c)| !c.is_whitespace())
			.last()
			.map_or(end_start, |(idx, _)| end_start + idx + 1);
		Some(self.text.slice(start..end.max(start)).to_string())
	}

	fn clamp_selection(&mut self) {
		let last = self.text.len_lines().saturating_sub(1);
		if let Some(sel) = &mut self.selection {
			sel.start_line = sel.start_line.min(last);
			sel.end_line = sel.end_line.min(last);
		}
	}
}
