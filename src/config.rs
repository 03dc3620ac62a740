use serde::Deserialize;

/// Default cap on the number of entries kept from one search run.
pub const DEFAULT_MAX_RESULTS: usize = 200;
/// Default debounce interval between a query keystroke and the search run.
pub const DEFAULT_DEBOUNCE_MS: u64 = 30;
/// Default number of result rows in the list pane.
pub const DEFAULT_LIST_ROWS: usize = 15;
/// Default cap on how many bytes a preview load may read.
pub const DEFAULT_MAX_PREVIEW_BYTES: u64 = 256 * 1024;

/// Which search backend the overlay drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// External `fd` listing piped into `fzf --filter`.
    Command,
    /// In-process directory walk matched with frizbee.
    Walk,
}

/// Host-supplied tuning knobs for one overlay instance.
///
/// Every field has a default, so hosts that deserialize a partial table (or
/// use [`OverlayConfig::default`]) get the stock behaviour.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Authoritative result cap, enforced at the consumer. Any cap passed to
    /// a backend tool is a best-effort optimization on top of this one.
    pub max_results: usize,
    /// Milliseconds of keystroke silence before a search run starts.
    pub debounce_ms: u64,
    /// Result rows in the list pane; also the preview content row count.
    pub list_rows: usize,
    /// Preview read cap in bytes. A file exactly at the cap still loads.
    pub max_preview_bytes: u64,
    pub backend: BackendKind,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            list_rows: DEFAULT_LIST_ROWS,
            max_preview_bytes: DEFAULT_MAX_PREVIEW_BYTES,
            backend: BackendKind::Command,
        }
    }
}
