use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tracing::debug;

use super::cancel::CancelToken;
use crate::error::SearchError;

/// Produces an ordered, capped sequence of candidate paths for a query.
///
/// Implementations must honour two contracts: stop producing as soon as
/// `limit` lines are collected or `cancel` trips, and never report early
/// termination of an upstream stage (broken pipe) as an error.
pub trait SearchBackend: Send + 'static {
    fn search(
        &self,
        query: &str,
        limit: usize,
        cancel: &CancelToken,
    ) -> Result<Vec<String>, SearchError>;
}

/// Default listing tool.
const LIST_TOOL: &str = "fd";
/// Default filter tool.
const FILTER_TOOL: &str = "fzf";

/// Interval at which the kill watcher re-checks the cancellation token.
const KILL_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Two-stage external pipeline: a listing tool enumerating files and
/// directories, piped into a fuzzy filter driven by the query.
///
/// The empty-query case skips the filter entirely and asks the listing tool
/// to cap its own output; the filtered case streams an uncapped listing
/// through the filter and kills both children once enough lines arrived.
pub struct CommandBackend {
    root: PathBuf,
    list_tool: &'static str,
    filter_tool: &'static str,
}

impl CommandBackend {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            list_tool: LIST_TOOL,
            filter_tool: FILTER_TOOL,
        }
    }

    /// Override the tool names, e.g. `fdfind` on Debian-packaged systems.
    #[must_use]
    pub fn with_tools(mut self, list_tool: &'static str, filter_tool: &'static str) -> Self {
        self.list_tool = list_tool;
        self.filter_tool = filter_tool;
        self
    }

    fn list_command(&self, cap: Option<usize>) -> Command {
        let mut command = Command::new(self.list_tool);
        command
            .args(["--type", "f", "--type", "d", "--hidden", "--exclude", ".git"])
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        if let Some(cap) = cap {
            command.args(["--max-results", &cap.to_string()]);
        }
        command
    }

    fn spawn(command: &mut Command, tool: &'static str) -> Result<Child, SearchError> {
        command.spawn().map_err(|err| match err.kind() {
            ErrorKind::NotFound => SearchError::missing(tool),
            _ => SearchError::Backend(format!("failed to spawn {tool}: {err}")),
        })
    }

    /// Listing stage only; the tool-side cap mirrors `limit` but the
    /// consumer-side collection below stays authoritative.
    fn list_only(&self, limit: usize, cancel: &CancelToken) -> Result<Vec<String>, SearchError> {
        let mut child = Self::spawn(&mut self.list_command(Some(limit)), self.list_tool)?;
        let Some(stdout) = child.stdout.take() else {
            let _ = child.kill();
            return Err(SearchError::Backend("listing stage has no stdout".into()));
        };
        let child = Arc::new(Mutex::new(child));
        let _kill = KillSwitch::arm(vec![Arc::clone(&child)], cancel.clone());

        let lines = collect_lines(stdout, limit, cancel);
        finish_child(
            &child,
            self.list_tool,
            lines.len() == limit || cancel.is_cancelled(),
        )?;
        Ok(lines)
    }

    fn list_and_filter(
        &self,
        query: &str,
        limit: usize,
        cancel: &CancelToken,
    ) -> Result<Vec<String>, SearchError> {
        let mut lister = Self::spawn(&mut self.list_command(None), self.list_tool)?;
        let Some(listing) = lister.stdout.take() else {
            let _ = lister.kill();
            return Err(SearchError::Backend("listing stage has no stdout".into()));
        };

        let mut filter_command = Command::new(self.filter_tool);
        filter_command
            .args(["--filter", query])
            .current_dir(&self.root)
            .stdin(Stdio::from(listing))
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        let mut filter = match Self::spawn(&mut filter_command, self.filter_tool) {
            Ok(child) => child,
            Err(err) => {
                let _ = lister.kill();
                let _ = lister.wait();
                return Err(err);
            }
        };
        let Some(filtered) = filter.stdout.take() else {
            let _ = filter.kill();
            let _ = filter.wait();
            let _ = lister.kill();
            let _ = lister.wait();
            return Err(SearchError::Backend("filter stage has no stdout".into()));
        };

        let lister = Arc::new(Mutex::new(lister));
        let filter = Arc::new(Mutex::new(filter));
        let _kill = KillSwitch::arm(
            vec![Arc::clone(&lister), Arc::clone(&filter)],
            cancel.clone(),
        );

        let lines = collect_lines(filtered, limit, cancel);
        let early_exit = lines.len() == limit || cancel.is_cancelled();

        // Killing the lister closes the filter's stdin; the lister dying on a
        // broken pipe when the filter stops early is expected, not
        // exceptional.
        reap(&lister);
        finish_filter(&filter, self.filter_tool, early_exit)?;
        Ok(lines)
    }
}

impl SearchBackend for CommandBackend {
    fn search(
        &self,
        query: &str,
        limit: usize,
        cancel: &CancelToken,
    ) -> Result<Vec<String>, SearchError> {
        if query.is_empty() {
            self.list_only(limit, cancel)
        } else {
            self.list_and_filter(query, limit, cancel)
        }
    }
}

/// Watches a run's cancellation token and kills the pipeline's children the
/// moment the run is superseded. Killing closes their output pipes, which
/// unblocks a reader stuck in a blocking read on a silent stage.
///
/// Dropping the switch (normal completion) stops the watcher.
struct KillSwitch {
    finished: Arc<AtomicBool>,
}

impl KillSwitch {
    fn arm(children: Vec<Arc<Mutex<Child>>>, cancel: CancelToken) -> Self {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);
        thread::spawn(move || {
            while !flag.load(Ordering::Acquire) {
                if cancel.is_cancelled() {
                    debug!(id = cancel.id(), "killing superseded pipeline children");
                    for child in &children {
                        if let Ok(mut child) = child.lock() {
                            let _ = child.kill();
                        }
                    }
                    return;
                }
                thread::sleep(KILL_POLL_INTERVAL);
            }
        });
        Self { finished }
    }
}

impl Drop for KillSwitch {
    fn drop(&mut self) {
        self.finished.store(true, Ordering::Release);
    }
}

/// Stream stdout line by line until the cap is reached, the request is
/// superseded, or the stage dies underneath us (whatever was collected
/// stands).
fn collect_lines(stdout: ChildStdout, limit: usize, cancel: &CancelToken) -> Vec<String> {
    let mut lines = Vec::new();
    for line in BufReader::new(stdout).lines() {
        if cancel.is_cancelled() {
            debug!(collected = lines.len(), "search run superseded mid-stream");
            break;
        }
        match line {
            Ok(line) if line.is_empty() => {}
            Ok(line) => {
                lines.push(line);
                if lines.len() == limit {
                    break;
                }
            }
            Err(_) => break,
        }
    }
    lines
}

/// Kill and reap a stage unconditionally.
fn reap(child: &Mutex<Child>) {
    if let Ok(mut child) = child.lock() {
        let _ = child.kill();
        let _ = child.wait();
    }
}

/// Reap a stage we may have abandoned early. Exit status only matters when
/// the stage ran to completion on its own.
fn finish_child(
    child: &Mutex<Child>,
    tool: &'static str,
    early_exit: bool,
) -> Result<(), SearchError> {
    let Ok(mut child) = child.lock() else {
        return Err(SearchError::Backend(format!("lost track of {tool}")));
    };
    if early_exit {
        let _ = child.kill();
        let _ = child.wait();
        return Ok(());
    }
    match child.wait() {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => Err(SearchError::Backend(format!("{tool} exited with {status}"))),
        Err(err) => Err(SearchError::Backend(format!("failed to reap {tool}: {err}"))),
    }
}

/// Same as [`finish_child`], except a "no matches" exit (status 1 for fzf)
/// is a normal empty result.
fn finish_filter(
    child: &Mutex<Child>,
    tool: &'static str,
    early_exit: bool,
) -> Result<(), SearchError> {
    let Ok(mut child) = child.lock() else {
        return Err(SearchError::Backend(format!("lost track of {tool}")));
    };
    if early_exit {
        let _ = child.kill();
        let _ = child.wait();
        return Ok(());
    }
    match child.wait() {
        Ok(status) if status.success() => Ok(()),
        Ok(status) if status.code() == Some(1) => Ok(()),
        Ok(status) => Err(SearchError::Backend(format!("{tool} exited with {status}"))),
        Err(err) => Err(SearchError::Backend(format!("failed to reap {tool}: {err}"))),
    }
}

/// Relative display path with forward slashes, regardless of platform.
pub(crate) fn relative_display(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::search::cancel::Generations;

    #[test]
    fn missing_listing_tool_is_distinguishable() {
        let backend = CommandBackend::new(".").with_tools("fzpeek-no-such-lister", "fzf");
        let token = Generations::new().issue();
        let err = backend
            .search("", 10, &token)
            .expect_err("spawning a nonexistent tool must fail");
        assert!(matches!(
            err,
            SearchError::ToolMissing {
                tool: "fzpeek-no-such-lister"
            }
        ));
    }

    #[test]
    fn missing_filter_tool_is_distinguishable() {
        // `sh` stands in for the listing stage so only the filter is absent.
        let backend = CommandBackend::new(".").with_tools("sh", "fzpeek-no-such-filter");
        let token = Generations::new().issue();
        let err = backend
            .search("query", 10, &token)
            .expect_err("spawning a nonexistent filter must fail");
        assert!(matches!(
            err,
            SearchError::ToolMissing {
                tool: "fzpeek-no-such-filter"
            }
        ));
    }

    #[test]
    fn superseding_a_silent_pipeline_unblocks_the_reader() {
        // A stage that never writes a line: without the kill switch the
        // reader would sit in a blocking read until the child exits on its
        // own, five seconds from now.
        let mut command = Command::new("sleep");
        command
            .arg("5")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        let mut child = command.spawn().expect("spawn sleep");
        let stdout = child.stdout.take().expect("piped stdout");
        let child = Arc::new(Mutex::new(child));

        let mut generations = Generations::new();
        let token = generations.issue();
        let _kill = KillSwitch::arm(vec![Arc::clone(&child)], token.clone());

        let supersede = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            let _ = generations.issue();
        });

        let start = Instant::now();
        let lines = collect_lines(stdout, 10, &token);
        supersede.join().expect("supersede thread");

        assert!(lines.is_empty());
        assert!(
            start.elapsed() < Duration::from_secs(4),
            "blocked read was not interrupted by supersession"
        );
        reap(&child);
    }
}
