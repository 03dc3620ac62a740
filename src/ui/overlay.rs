//! The overlay: aggregate state machine tying the search pipeline, preview
//! loader, and renderer together behind a host-facing API.
//!
//! The host feeds key events into [`FinderOverlay::handle_key`], pumps
//! [`FinderOverlay::tick`] from its event loop, and pulls a fresh grid from
//! [`FinderOverlay::render`] whenever it repaints. All state mutation happens
//! on those calls; background work only ever communicates over channels.

use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::time::{Duration, Instant};

use ratatui::crossterm::event::KeyEvent;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use tracing::debug;

use crate::config::{BackendKind, OverlayConfig};
use crate::error::SearchError;
use crate::preview::PreviewPane;
use crate::search::cancel::Generations;
use crate::search::worker::{self, SearchCommand, SearchResult};
use crate::search::{CommandBackend, SearchBackend, WalkBackend};
use crate::types::FileEntry;

use super::input::{self, InputAction};
use super::layout::{Layout, layout};
use super::render::{PaneRow, merge};
use super::selection;
use super::text::{truncate_end, truncate_start};

const SEARCHING_MESSAGE: &str = "Searching...";
const NO_RESULTS_MESSAGE: &str = "No results";
const PROMPT: &str = "> ";

/// List-pane state machine. `Idle` is terminal: only teardown reaches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPhase {
    Idle,
    Searching,
    Loaded,
    Error,
}

/// How the overlay session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayOutcome {
    /// The user confirmed this entry; the raw backend path is handed back.
    Confirmed(String),
    Cancelled,
}

/// One fuzzy-find session. Construct per invocation; the host keeps a single
/// instance live at a time and drops it after the outcome arrives.
pub struct FinderOverlay {
    root: PathBuf,
    config: OverlayConfig,
    query: String,
    results: Vec<FileEntry>,
    selected: usize,
    phase: ListPhase,
    error: Option<SearchError>,
    preview: PreviewPane,
    generations: Generations,
    search_tx: Sender<SearchCommand>,
    search_rx: Receiver<SearchResult>,
    current_search: Option<u64>,
    debounce_deadline: Option<Instant>,
    closed: bool,
}

impl Drop for FinderOverlay {
    fn drop(&mut self) {
        self.abort_background();
    }
}

impl FinderOverlay {
    /// Open an overlay rooted at `root` with the backend named in `config`,
    /// issuing the initial unfiltered listing immediately.
    #[must_use]
    pub fn open(root: impl Into<PathBuf>, config: OverlayConfig) -> Self {
        let root = root.into();
        let backend: Box<dyn SearchBackend> = match config.backend {
            BackendKind::Command => Box::new(CommandBackend::new(&root)),
            BackendKind::Walk => Box::new(WalkBackend::new(&root)),
        };
        Self::with_backend(root, config, backend)
    }

    /// Open with an explicit backend. This is the seam scenario tests use to
    /// substitute a scripted pipeline.
    #[must_use]
    pub fn with_backend(
        root: impl Into<PathBuf>,
        config: OverlayConfig,
        backend: Box<dyn SearchBackend>,
    ) -> Self {
        let (search_tx, search_rx) = worker::spawn(backend);
        let preview = PreviewPane::new(config.max_preview_bytes);
        let mut overlay = Self {
            root: root.into(),
            config,
            query: String::new(),
            results: Vec::new(),
            selected: 0,
            phase: ListPhase::Idle,
            error: None,
            preview,
            generations: Generations::new(),
            search_tx,
            search_rx,
            current_search: None,
            debounce_deadline: None,
            closed: false,
        };
        // The just-opened case skips the debounce: there is nothing to
        // coalesce yet and the user is waiting on the first listing.
        overlay.issue_search();
        overlay
    }

    /// Route one keystroke. Returns the session outcome when the keystroke
    /// ends it; the overlay is torn down before the outcome is returned.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<OverlayOutcome> {
        if self.closed {
            return None;
        }
        match input::dispatch(key) {
            InputAction::Insert(ch) => {
                self.query.push(ch);
                self.schedule_search();
            }
            InputAction::DeleteBack => {
                if self.query.pop().is_some() {
                    self.schedule_search();
                }
            }
            InputAction::MoveUp => self.move_selection(-1),
            InputAction::MoveDown => self.move_selection(1),
            InputAction::ScrollDown => self.scroll_preview(1),
            InputAction::ScrollUp => self.scroll_preview(-1),
            InputAction::HalfPageDown => self.half_page_preview(true),
            InputAction::HalfPageUp => self.half_page_preview(false),
            InputAction::Confirm => {
                if let Some(entry) = self.results.get(self.selected) {
                    let path = entry.path.clone();
                    self.teardown();
                    return Some(OverlayOutcome::Confirmed(path));
                }
            }
            InputAction::Cancel => {
                self.teardown();
                return Some(OverlayOutcome::Cancelled);
            }
            InputAction::Ignored => {}
        }
        None
    }

    /// Advance timers and apply completed background work. Hosts call this
    /// from their event loop; returns whether visible state changed.
    pub fn tick(&mut self) -> bool {
        if self.closed {
            return false;
        }
        let mut changed = false;

        if self
            .debounce_deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
        {
            self.debounce_deadline = None;
            self.issue_search();
            changed = true;
        }

        loop {
            match self.search_rx.try_recv() {
                Ok(result) => changed |= self.apply_search_result(result),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        changed |= self.preview.poll();
        changed
    }

    /// Build the full display grid for the given overlay width.
    #[must_use]
    pub fn render(&self, width: u16) -> Vec<Line<'static>> {
        let geometry = layout(width, self.config.list_rows);
        let list = self.list_rows(&geometry);
        let preview = self.preview_rows(&geometry);
        merge(list, preview, &geometry)
    }

    /// The entry the selection currently rests on.
    #[must_use]
    pub fn selected_entry(&self) -> Option<&FileEntry> {
        self.results.get(self.selected)
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn results(&self) -> &[FileEntry] {
        &self.results
    }

    #[must_use]
    pub fn selected_index(&self) -> usize {
        self.selected
    }

    #[must_use]
    pub fn phase(&self) -> ListPhase {
        self.phase
    }

    #[must_use]
    pub fn error(&self) -> Option<&SearchError> {
        self.error.as_ref()
    }

    #[must_use]
    pub fn preview(&self) -> &PreviewPane {
        &self.preview
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn move_selection(&mut self, delta: isize) {
        if self.results.is_empty() {
            return;
        }
        self.selected = selection::move_wrapping(self.selected, self.results.len(), delta);
        if let Some(entry) = self.results.get(self.selected) {
            self.preview.show_entry(entry, &self.root);
        }
    }

    fn scroll_preview(&mut self, delta: isize) {
        // Preview content rows equal the list row count at every width.
        self.preview.scroll_by(delta, self.config.list_rows);
    }

    fn half_page_preview(&mut self, down: bool) {
        self.preview.scroll_half_page(down, self.config.list_rows);
    }

    /// Restart the debounce timer and invalidate whatever run is still
    /// outstanding; its results would answer a query that no longer exists.
    fn schedule_search(&mut self) {
        let _ = self.generations.issue();
        self.current_search = None;
        self.debounce_deadline =
            Some(Instant::now() + Duration::from_millis(self.config.debounce_ms));
    }

    fn issue_search(&mut self) {
        let token = self.generations.issue();
        self.current_search = Some(token.id());
        self.phase = ListPhase::Searching;
        // Transient failures give way to the searching message; a missing
        // tool stays on screen because retyping cannot fix it.
        if self.error.as_ref().is_some_and(|err| !err.is_persistent()) {
            self.error = None;
        }
        debug!(id = token.id(), query = %self.query, "issuing search");
        let _ = self.search_tx.send(SearchCommand::Query {
            query: self.query.clone(),
            limit: self.config.max_results,
            token,
        });
    }

    /// Apply a completed run if it is still the current one. Stale results
    /// are dropped here, at the identity check, never by racing completions.
    fn apply_search_result(&mut self, result: SearchResult) -> bool {
        let current = self.current_search == Some(result.id) && self.generations.is_current(result.id);
        if !current {
            debug!(id = result.id, "dropping stale search result");
            return false;
        }
        self.current_search = None;

        match result.outcome {
            Ok(lines) => {
                self.phase = ListPhase::Loaded;
                self.error = None;
                self.results = lines
                    .into_iter()
                    .map(FileEntry::from_backend_line)
                    .collect();
                self.selected = 0;
                match self.results.first() {
                    Some(first) => {
                        let first = first.clone();
                        self.preview.show_entry(&first, &self.root);
                    }
                    None => self.preview.clear(),
                }
            }
            Err(err) => {
                self.phase = ListPhase::Error;
                self.error = Some(err);
                self.results.clear();
                self.selected = 0;
                self.preview.clear();
            }
        }
        true
    }

    /// Flush timers and invalidate all in-flight work before control returns
    /// to the host. Terminal: the overlay accepts no further input.
    fn teardown(&mut self) {
        self.debounce_deadline = None;
        self.abort_background();
        self.phase = ListPhase::Idle;
        self.closed = true;
    }

    fn abort_background(&mut self) {
        self.generations.invalidate_all();
        self.preview.abort();
        let _ = self.search_tx.send(SearchCommand::Shutdown);
    }

    fn list_rows(&self, geometry: &Layout) -> Vec<PaneRow> {
        let pane_width = usize::from(geometry.left_width);
        let mut rows = Vec::with_capacity(geometry.list_rows + 2);
        rows.push(PaneRow::Text(Line::from(vec![
            Span::styled(PROMPT, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(self.query.clone()),
        ])));
        rows.push(PaneRow::Divider);

        if let Some(err) = &self.error {
            rows.push(PaneRow::Text(Line::from(Span::styled(
                truncate_end(&err.to_string(), pane_width),
                Style::default().fg(Color::Red),
            ))));
            return rows;
        }
        if self.results.is_empty() {
            let message = match self.phase {
                ListPhase::Searching => SEARCHING_MESSAGE,
                _ => NO_RESULTS_MESSAGE,
            };
            rows.push(PaneRow::Text(Line::from(Span::styled(
                message,
                Style::default().add_modifier(Modifier::DIM),
            ))));
            return rows;
        }

        let marker_width = PROMPT.len();
        let start = selection::window_start(self.selected, self.results.len(), geometry.list_rows);
        let window = self
            .results
            .iter()
            .enumerate()
            .skip(start)
            .take(geometry.list_rows.min(self.results.len()));
        for (index, entry) in window {
            let selected = index == self.selected;
            let marker = if selected { PROMPT } else { "  " };
            let path = truncate_start(&entry.path, pane_width.saturating_sub(marker_width));
            let style = if selected {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            rows.push(PaneRow::Text(Line::from(vec![
                Span::styled(marker.to_string(), style),
                Span::styled(path, style),
            ])));
        }
        rows
    }

    fn preview_rows(&self, geometry: &Layout) -> Vec<Line<'static>> {
        let pane_width = usize::from(geometry.right_width);
        let mut rows = Vec::with_capacity(geometry.preview_rows + 2);

        let header = self
            .selected_entry()
            .map(|entry| truncate_start(&entry.path, pane_width))
            .unwrap_or_default();
        rows.push(Line::from(Span::styled(
            header,
            Style::default().add_modifier(Modifier::BOLD),
        )));
        // Placeholder for the shared divider row; the merge overdraws it.
        rows.push(Line::default());

        if let Some(notice) = self.preview.notice() {
            rows.push(Line::from(Span::styled(
                notice,
                Style::default().add_modifier(Modifier::DIM),
            )));
            return rows;
        }
        rows.extend(
            self.preview
                .lines()
                .iter()
                .skip(self.preview.scroll())
                .take(geometry.preview_rows)
                .cloned(),
        );
        rows
    }
}
