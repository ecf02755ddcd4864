//! Shared task primitives for the quill crates.
//!
//! * [`TaskClass`]: classification used for spawn tracing.
//! * [`spawn`]: spawns a classified task onto the current tokio runtime.
//! * [`StopHandle`]: cancellable stop signal for long-running loops.
//! * [`GenerationClock`]: monotonic generations for discarding stale results.

mod class;
mod spawn;
mod token;

pub use class::TaskClass;
pub use spawn::spawn;
pub use token::{GenerationClock, StopHandle};
