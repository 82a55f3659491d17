//! Per-session serialization: one actor per session id.

pub mod registry;
pub mod session_actor;

pub use registry::SessionRegistry;
pub use session_actor::{PLACEHOLDER_SUMMARY, SubmitOutcome, SummaryPolicy};
