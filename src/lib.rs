//! fzpeek: a terminal overlay component for live fuzzy file search with a
//! syntax-highlighted preview pane.
//!
//! The crate is host-agnostic: an embedding surface feeds key events into a
//! [`FinderOverlay`], pumps [`FinderOverlay::tick`] from its event loop, and
//! pulls a rendered character grid at whatever width it currently has. The
//! overlay never touches the terminal itself. Search runs through an
//! external `fd | fzf --filter` pipeline by default, with an in-process
//! walk-and-match backend as an alternative; both are debounced, capped, and
//! cancelled by generation token when superseded.

pub mod config;
pub mod error;
mod preview;
pub mod search;
pub mod types;
pub mod ui;

pub use config::{BackendKind, OverlayConfig};
pub use error::{PreviewError, SearchError};
pub use preview::{PreviewPane, PreviewPhase};
pub use search::{CancelToken, CommandBackend, Generations, SearchBackend, WalkBackend};
pub use types::FileEntry;
pub use ui::{FinderOverlay, ListPhase, OverlayOutcome};
