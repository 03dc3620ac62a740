//! The search pipeline: pluggable backends producing capped, ordered path
//! listings, run on a background worker and cancelled by generation token.

pub mod backend;
pub mod cancel;
mod walk;
pub(crate) mod worker;

pub use backend::{CommandBackend, SearchBackend};
pub use cancel::{CancelToken, Generations};
pub use walk::WalkBackend;
