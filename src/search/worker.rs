use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use tracing::debug;

use super::backend::SearchBackend;
use super::cancel::CancelToken;
use crate::error::SearchError;

/// Commands accepted by the background search worker.
pub(crate) enum SearchCommand {
    Query {
        query: String,
        limit: usize,
        token: CancelToken,
    },
    Shutdown,
}

/// One completed pipeline run, tagged with the generation that issued it.
pub(crate) struct SearchResult {
    pub id: u64,
    pub outcome: Result<Vec<String>, SearchError>,
}

/// Launch the background search worker and return its channels.
pub(crate) fn spawn(
    backend: Box<dyn SearchBackend>,
) -> (Sender<SearchCommand>, Receiver<SearchResult>) {
    let (command_tx, command_rx) = mpsc::channel();
    let (result_tx, result_rx) = mpsc::channel();

    thread::spawn(move || worker_loop(backend.as_ref(), &command_rx, &result_tx));

    (command_tx, result_rx)
}

fn worker_loop(
    backend: &dyn SearchBackend,
    command_rx: &Receiver<SearchCommand>,
    result_tx: &Sender<SearchResult>,
) {
    while let Ok(command) = command_rx.recv() {
        match command {
            SearchCommand::Query {
                query,
                limit,
                token,
            } => {
                // Skip runs that were superseded while queued behind us.
                if token.is_cancelled() {
                    debug!(id = token.id(), "dropping superseded search before it ran");
                    continue;
                }
                let outcome = backend.search(&query, limit, &token);
                if token.is_cancelled() {
                    debug!(id = token.id(), "discarding superseded search result");
                    continue;
                }
                if result_tx
                    .send(SearchResult {
                        id: token.id(),
                        outcome,
                    })
                    .is_err()
                {
                    break;
                }
            }
            SearchCommand::Shutdown => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::search::cancel::Generations;

    struct StaticBackend(Vec<String>);

    impl SearchBackend for StaticBackend {
        fn search(
            &self,
            _query: &str,
            limit: usize,
            _cancel: &CancelToken,
        ) -> Result<Vec<String>, SearchError> {
            Ok(self.0.iter().take(limit).cloned().collect())
        }
    }

    #[test]
    fn results_carry_the_issuing_generation() {
        let backend = StaticBackend(vec!["a.rs".into(), "b.rs".into()]);
        let (tx, rx) = spawn(Box::new(backend));
        let mut generations = Generations::new();
        let token = generations.issue();
        let id = token.id();

        tx.send(SearchCommand::Query {
            query: String::new(),
            limit: 1,
            token,
        })
        .expect("send query");

        let result = rx
            .recv_timeout(Duration::from_secs(1))
            .expect("receive result");
        assert_eq!(result.id, id);
        assert_eq!(result.outcome.expect("search succeeds"), vec!["a.rs"]);

        tx.send(SearchCommand::Shutdown).expect("send shutdown");
    }

    #[test]
    fn superseded_queued_run_is_never_executed() {
        let backend = StaticBackend(vec!["a.rs".into()]);
        let (tx, rx) = spawn(Box::new(backend));
        let mut generations = Generations::new();

        let stale = generations.issue();
        let fresh = generations.issue();
        let fresh_id = fresh.id();

        tx.send(SearchCommand::Query {
            query: "old".into(),
            limit: 10,
            token: stale,
        })
        .expect("send stale query");
        tx.send(SearchCommand::Query {
            query: "new".into(),
            limit: 10,
            token: fresh,
        })
        .expect("send fresh query");

        let result = rx
            .recv_timeout(Duration::from_secs(1))
            .expect("receive result");
        assert_eq!(result.id, fresh_id, "stale run must be dropped unexecuted");

        tx.send(SearchCommand::Shutdown).expect("send shutdown");
    }
}
