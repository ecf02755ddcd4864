//! AI code assistant state shared by the editor's consumers.
//!
//! [`AiAssist`] is an explicitly constructed context: it owns the assistant
//! status, the single prompt/response slot and the in-flight suggestion
//! request. Build one per dialog with [`AiAssist::init`].

mod assist;
mod error;
mod status;
mod suggestion;

pub use assist::{AiAssist, HUB_LOGIN_EVENT};
pub use error::{Error, Result};
pub use status::{Affordance, AiCodeAssistantStatus};
pub use suggestion::{Message, PromptResponse, Role, SuggestionOutcome};

#[cfg(test)]
mod tests;
