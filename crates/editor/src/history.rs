use ropey::Rope;

/// Maximum undo history size.
pub const MAX_UNDO: usize = 100;

/// Snapshot-based undo history.
///
/// Ropes share structure, so a snapshot per step stays cheap for the small
/// edits a script editor sees.
#[derive(Debug, Default)]
pub(crate) struct History {
	undo_stack: Vec<Rope>,
	redo_stack: Vec<Rope>,
}

impl History {
	/// Records the text as it was before an edit and drops the redo branch.
	pub(crate) fn record(&mut self, before: Rope) {
		self.undo_stack.push(before);
		self.redo_stack.clear();
		if self.undo_stack.len() > MAX_UNDO {
			self.undo_stack.remove(0);
		}
	}

	/// Swaps `current` for the previous snapshot.
	pub(crate) fn undo(&mut self, current: Rope) -> Option<Rope> {
		let previous = self.undo_stack.pop()?;
		self.redo_stack.push(current);
		Some(previous)
	}

	/// Swaps `current` for the next snapshot.
	pub(crate) fn redo(&mut self, current: Rope) -> Option<Rope> {
		let next = self.redo_stack.pop()?;
		self.undo_stack.push(current);
		Some(next)
	}

	pub(crate) fn clear(&mut self) {
		self.undo_stack.clear();
		self.redo_stack.clear();
	}

	pub(crate) fn can_undo(&self) -> bool {
		!self.undo_stack.is_empty()
	}

	pub(crate) fn can_redo(&self) -> bool {
		!self.redo_stack.is_empty()
	}
}
