//! Handlers coordinating the asynchronous boundaries: language execution
//! and inline completion requests.

pub mod executor;
pub mod suggest;

pub use executor::{ExecutionDispatcher, ExecutionResult, RunStatus, UNSUPPORTED_FILE_TYPE};
pub use suggest::{SuggestionCoordinator, SuggestionOutcome, prefix_at};
