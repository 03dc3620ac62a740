use thiserror::Error;

/// Failure modes of the search pipeline.
///
/// Cancellation is deliberately absent: a superseded run is discarded before
/// its outcome is ever inspected, so it never needs an error variant.
#[derive(Debug, Error)]
pub enum SearchError {
    /// A required external tool was not found on the execution path.
    ///
    /// Rendered as a persistent message in the list pane; a generic backend
    /// failure must never be collapsed into this variant.
    #[error("{tool} is not installed")]
    ToolMissing { tool: &'static str },

    /// The pipeline started but exited abnormally.
    #[error("search failed: {0}")]
    Backend(String),
}

impl SearchError {
    pub(crate) fn missing(tool: &'static str) -> Self {
        Self::ToolMissing { tool }
    }

    /// Whether the error should persist across subsequent keystrokes.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self, Self::ToolMissing { .. })
    }
}

/// Failure modes of a preview load, each mapped to a short in-pane
/// placeholder rather than an error banner.
#[derive(Debug, Error)]
pub enum PreviewError {
    /// The file exceeds the preview read cap. The file is never partially
    /// read; the cap is checked against metadata before any content I/O.
    #[error("file exceeds the preview size cap")]
    TooLarge,

    /// The selected path turned out to be a directory by the time the loader
    /// ran. Possible because the listing and the load race the filesystem.
    #[error("path is a directory")]
    IsDirectory,

    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
}
