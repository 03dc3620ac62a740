use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Issues one [`CancelToken`] per logical request.
///
/// The issuer and every outstanding token share one atomic cell holding the
/// id of the most recently issued request. Issuing a new token therefore
/// cancels every older one in a single store, which is what enforces the
/// "results apply in issue order" guarantee: a stale completion fails the
/// token check before it can touch state, regardless of when it finishes.
#[derive(Debug)]
pub struct Generations {
    latest: Arc<AtomicU64>,
    next: u64,
}

impl Default for Generations {
    fn default() -> Self {
        Self::new()
    }
}

impl Generations {
    #[must_use]
    pub fn new() -> Self {
        Self {
            latest: Arc::new(AtomicU64::new(0)),
            next: 0,
        }
    }

    /// Issue a token for a new request, superseding all earlier ones.
    pub fn issue(&mut self) -> CancelToken {
        self.next = self.next.saturating_add(1);
        self.latest.store(self.next, Ordering::Release);
        CancelToken {
            id: self.next,
            latest: Arc::clone(&self.latest),
        }
    }

    /// Whether `id` belongs to the most recently issued request.
    #[must_use]
    pub fn is_current(&self, id: u64) -> bool {
        !self.poisoned() && self.latest.load(Ordering::Acquire) == id
    }

    /// Invalidate every token ever issued, including future stragglers.
    /// Called on overlay teardown so no background completion can outlive
    /// the UI it would have updated.
    pub fn invalidate_all(&mut self) {
        self.latest.store(u64::MAX, Ordering::Release);
    }

    fn poisoned(&self) -> bool {
        self.latest.load(Ordering::Acquire) == u64::MAX
    }
}

/// Validity handle for one logical request.
///
/// Cheap to clone into a worker; checked at every streaming step and once
/// more before any completion is applied.
#[derive(Debug, Clone)]
pub struct CancelToken {
    id: u64,
    latest: Arc<AtomicU64>,
}

impl CancelToken {
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// True once a newer request has been issued or the issuer was torn down.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.latest.load(Ordering::Acquire) != self.id
    }
}
