//! Script text model: the full script, the user's line selection and an
//! undo history of whole-text replacements.

mod history;
mod model;

pub use history::MAX_UNDO;
pub use model::{EditorModel, Selection};

#[cfg(test)]
mod tests;
