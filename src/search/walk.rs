use std::ffi::OsStr;
use std::path::PathBuf;

use frizbee::{Config, match_list};
use ignore::WalkBuilder;
use tracing::debug;

use super::backend::{SearchBackend, relative_display};
use super::cancel::CancelToken;
use crate::error::SearchError;

/// Haystack chunk size for one fuzzy matching pass; also the granularity of
/// cancellation checks while filtering.
const MATCH_CHUNK_SIZE: usize = 2048;
/// Dataset size at which frizbee's prefilter starts paying for itself.
const PREFILTER_ENABLE_THRESHOLD: usize = 10_000;

/// In-process replacement for the external pipeline: an `ignore` walk
/// (hidden entries included, `.git` excluded) fuzzy-matched with frizbee.
///
/// Honours the same contracts as [`CommandBackend`](super::CommandBackend):
/// output order is walk order, collection stops at the cap, and every
/// chunk boundary re-checks the cancellation token.
pub struct WalkBackend {
    root: PathBuf,
}

impl WalkBackend {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Enumerate candidate lines in walk order. `cap` bounds the walk for
    /// the empty-query case; the filtered case needs the full listing.
    fn walk(&self, cap: Option<usize>, cancel: &CancelToken) -> Vec<String> {
        let mut lines = Vec::new();
        for entry in WalkBuilder::new(&self.root)
            .hidden(false)
            .git_ignore(true)
            .parents(false)
            .build()
        {
            if cancel.is_cancelled() {
                debug!(collected = lines.len(), "walk superseded mid-traversal");
                break;
            }
            let Ok(entry) = entry else { continue };
            let path = entry.path();
            if path == self.root {
                continue;
            }
            if path.components().any(|comp| comp.as_os_str() == OsStr::new(".git")) {
                continue;
            }
            let is_dir = entry.file_type().is_some_and(|kind| kind.is_dir());
            let mut line = relative_display(&self.root, path);
            if is_dir {
                line.push('/');
            }
            lines.push(line);
            if cap.is_some_and(|cap| lines.len() == cap) {
                break;
            }
        }
        lines
    }
}

impl SearchBackend for WalkBackend {
    fn search(
        &self,
        query: &str,
        limit: usize,
        cancel: &CancelToken,
    ) -> Result<Vec<String>, SearchError> {
        if query.is_empty() {
            return Ok(self.walk(Some(limit), cancel));
        }

        let candidates = self.walk(None, cancel);
        if cancel.is_cancelled() {
            return Ok(Vec::new());
        }

        let config = match_config(query, candidates.len());
        let mut matched = Vec::new();
        let mut offset = 0;
        while offset < candidates.len() && matched.len() < limit {
            if cancel.is_cancelled() {
                return Ok(matched);
            }
            let end = (offset + MATCH_CHUNK_SIZE).min(candidates.len());
            let haystacks: Vec<&str> =
                candidates[offset..end].iter().map(String::as_str).collect();
            let mut hits: Vec<_> = match_list(query, &haystacks, &config)
                .into_iter()
                .filter(|hit| hit.score > 0)
                .collect();
            // Walk order, not score order: the consumer contract says
            // insertion order equals backend output order.
            hits.sort_by_key(|hit| hit.index);
            for hit in hits {
                matched.push(candidates[offset + hit.index as usize].clone());
                if matched.len() == limit {
                    break;
                }
            }
            offset = end;
        }
        Ok(matched)
    }
}

/// Frizbee tuning: a typo budget scaled to query length, with the prefilter
/// reserved for large candidate sets.
///
/// The budget is always bounded. Unbounded typos would let a candidate
/// sharing a single character score above zero, and because output keeps
/// walk order rather than score order, such noise would be fully visible.
fn match_config(query: &str, dataset_len: usize) -> Config {
    let length = query.chars().count();
    let allowed_typos: u16 = match length {
        0..=1 => 0,
        2..=4 => 1,
        5..=7 => 2,
        8..=12 => 3,
        _ => 4,
    };

    let mut config = Config {
        prefilter: dataset_len >= PREFILTER_ENABLE_THRESHOLD,
        max_typos: Some(allowed_typos),
        ..Config::default()
    };
    config.sort = false;
    config
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::search::cancel::Generations;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("create fixture dir");
        fs::create_dir(dir.path().join("src")).expect("mkdir src");
        fs::create_dir(dir.path().join(".git")).expect("mkdir .git");
        fs::write(dir.path().join("src/main.rs"), "fn main() {}").expect("write main.rs");
        fs::write(dir.path().join("src/lib.rs"), "").expect("write lib.rs");
        fs::write(dir.path().join(".git/config"), "").expect("write git config");
        fs::write(dir.path().join(".hidden"), "").expect("write hidden file");
        fs::write(dir.path().join("README.md"), "# readme").expect("write readme");
        dir
    }

    #[test]
    fn empty_query_lists_hidden_but_not_git() {
        let dir = fixture();
        let backend = WalkBackend::new(dir.path());
        let token = Generations::new().issue();
        let lines = backend.search("", 100, &token).expect("walk");

        assert!(lines.contains(&".hidden".to_string()));
        assert!(lines.contains(&"src/".to_string()));
        assert!(lines.contains(&"src/main.rs".to_string()));
        assert!(!lines.iter().any(|line| line.contains(".git")));
    }

    #[test]
    fn empty_query_respects_cap() {
        let dir = fixture();
        let backend = WalkBackend::new(dir.path());
        let token = Generations::new().issue();
        let lines = backend.search("", 2, &token).expect("walk");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn filtered_query_narrows_candidates() {
        let dir = fixture();
        let backend = WalkBackend::new(dir.path());
        let token = Generations::new().issue();
        let lines = backend.search("mainrs", 100, &token).expect("walk");
        assert_eq!(lines, vec!["src/main.rs".to_string()]);
    }

    #[test]
    fn match_config_bounds_typos_and_gates_the_prefilter() {
        let small = match_config("example", PREFILTER_ENABLE_THRESHOLD - 1);
        assert!(!small.prefilter);
        assert_eq!(small.max_typos, Some(2));
        assert!(!small.sort);

        let large = match_config("example", PREFILTER_ENABLE_THRESHOLD);
        assert!(large.prefilter);
        assert_eq!(large.max_typos, Some(2));
    }

    #[test]
    fn cancelled_token_stops_the_walk() {
        let dir = fixture();
        let backend = WalkBackend::new(dir.path());
        let mut generations = Generations::new();
        let stale = generations.issue();
        let _fresh = generations.issue();
        let lines = backend.search("", 100, &stale).expect("walk");
        assert!(lines.is_empty());
    }
}
