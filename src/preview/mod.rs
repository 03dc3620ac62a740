//! Asynchronous preview loading for the right-hand pane.
//!
//! One worker thread per load; the result comes back over a channel and is
//! applied only if its cancellation token is still current *and* its target
//! path still equals the tracked preview path. Content for path A must never
//! render while path B is selected.

mod highlight;
mod loader;

use std::path::Path;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use ratatui::text::Line;
use tracing::debug;

use crate::error::PreviewError;
use crate::search::cancel::{CancelToken, Generations};
use crate::types::FileEntry;
use crate::ui::selection;
use loader::RawPreview;

pub(crate) const DIRECTORY_NOTICE: &str = "(directory)";
pub(crate) const BINARY_NOTICE: &str = "(binary file)";
pub(crate) const TOO_LARGE_NOTICE: &str = "(file too large)";
pub(crate) const UNREADABLE_NOTICE: &str = "(unable to read file)";
pub(crate) const LOADING_NOTICE: &str = "Loading...";

/// Preview sub-state, keyed by path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewPhase {
    Idle,
    Loading,
    Loaded,
    Error,
}

enum LoadedPreview {
    Text(Vec<Line<'static>>),
    Binary,
}

struct PendingLoad {
    token: CancelToken,
    path: String,
    rx: Receiver<Result<LoadedPreview, PreviewError>>,
}

/// State of the preview pane: the tracked path, its displayable lines, and
/// at most one in-flight load.
pub struct PreviewPane {
    path: Option<String>,
    lines: Vec<Line<'static>>,
    notice: Option<&'static str>,
    phase: PreviewPhase,
    scroll: usize,
    pending: Option<PendingLoad>,
    generations: Generations,
    max_bytes: u64,
}

impl PreviewPane {
    #[must_use]
    pub(crate) fn new(max_bytes: u64) -> Self {
        Self {
            path: None,
            lines: Vec::new(),
            notice: None,
            phase: PreviewPhase::Idle,
            scroll: 0,
            pending: None,
            generations: Generations::new(),
            max_bytes,
        }
    }

    /// Point the pane at `entry`, starting an asynchronous load if needed.
    ///
    /// Directories resolve synchronously to a placeholder with zero I/O.
    /// Re-selecting the already-tracked path is a no-op so a mere re-render
    /// never re-reads the file.
    pub(crate) fn show_entry(&mut self, entry: &FileEntry, root: &Path) {
        if self.path.as_deref() == Some(entry.path.as_str()) {
            return;
        }

        // Supersede whatever load is still in flight.
        let _ = self.generations.issue();
        self.pending = None;
        self.path = Some(entry.path.clone());
        self.lines.clear();
        self.scroll = 0;

        if entry.is_dir {
            self.notice = Some(DIRECTORY_NOTICE);
            self.phase = PreviewPhase::Loaded;
            return;
        }

        self.notice = Some(LOADING_NOTICE);
        self.phase = PreviewPhase::Loading;

        let token = self.generations.issue();
        let absolute = root.join(entry.fs_path());
        let max_bytes = self.max_bytes;
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let result = loader::load_raw(&absolute, max_bytes).map(|raw| match raw {
                RawPreview::Text(content) => {
                    LoadedPreview::Text(highlight::highlight(&absolute, &content))
                }
                RawPreview::Binary => LoadedPreview::Binary,
            });
            let _ = tx.send(result);
        });
        self.pending = Some(PendingLoad {
            token,
            path: entry.path.clone(),
            rx,
        });
    }

    /// Reset the pane to its initial empty state, cancelling in-flight work.
    pub(crate) fn clear(&mut self) {
        let _ = self.generations.issue();
        self.pending = None;
        self.path = None;
        self.lines.clear();
        self.notice = None;
        self.phase = PreviewPhase::Idle;
        self.scroll = 0;
    }

    /// Invalidate every outstanding load; called on overlay teardown.
    pub(crate) fn abort(&mut self) {
        self.generations.invalidate_all();
        self.pending = None;
    }

    /// Poll the in-flight load, applying it only if still fresh. Returns
    /// whether the pane changed.
    pub(crate) fn poll(&mut self) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };
        match pending.rx.try_recv() {
            Ok(result) => {
                let fresh = !pending.token.is_cancelled()
                    && self.path.as_deref() == Some(pending.path.as_str());
                if !fresh {
                    debug!(path = %pending.path, "discarding stale preview result");
                    return false;
                }
                self.apply(result);
                true
            }
            Err(TryRecvError::Empty) => {
                self.pending = Some(pending);
                false
            }
            // The loader died without reporting (a panic inside the
            // highlighter, say). Leaving the pane in Loading would wedge it
            // on "Loading..." with nothing left to poll.
            Err(TryRecvError::Disconnected) => {
                let fresh = !pending.token.is_cancelled()
                    && self.path.as_deref() == Some(pending.path.as_str());
                if !fresh {
                    return false;
                }
                self.notice = Some(UNREADABLE_NOTICE);
                self.phase = PreviewPhase::Error;
                true
            }
        }
    }

    fn apply(&mut self, result: Result<LoadedPreview, PreviewError>) {
        match result {
            Ok(LoadedPreview::Text(lines)) => {
                self.lines = lines;
                self.notice = None;
                self.phase = PreviewPhase::Loaded;
            }
            Ok(LoadedPreview::Binary) => {
                self.notice = Some(BINARY_NOTICE);
                self.phase = PreviewPhase::Loaded;
            }
            Err(err) => {
                self.notice = Some(match err {
                    PreviewError::TooLarge => TOO_LARGE_NOTICE,
                    PreviewError::IsDirectory => DIRECTORY_NOTICE,
                    PreviewError::Io(_) => UNREADABLE_NOTICE,
                });
                self.phase = PreviewPhase::Error;
            }
        }
    }

    /// Scroll by `delta` lines, clamped to the loaded content.
    pub(crate) fn scroll_by(&mut self, delta: isize, visible_rows: usize) {
        self.scroll = selection::step_scroll(self.scroll, delta, self.lines.len(), visible_rows);
    }

    /// Scroll by half of the visible content height, minimum one line.
    pub(crate) fn scroll_half_page(&mut self, down: bool, visible_rows: usize) {
        let step = selection::half_page(visible_rows) as isize;
        self.scroll_by(if down { step } else { -step }, visible_rows);
    }

    #[must_use]
    pub fn phase(&self) -> PreviewPhase {
        self.phase
    }

    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    #[must_use]
    pub fn lines(&self) -> &[Line<'static>] {
        &self.lines
    }

    #[must_use]
    pub fn notice(&self) -> Option<&'static str> {
        self.notice
    }

    #[must_use]
    pub fn scroll(&self) -> usize {
        self.scroll
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.phase == PreviewPhase::Loading
    }
}
