//! Load state and stale-response tracking

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Result of the latest fetch.
///
/// `Ready` with an empty vector is a successful fetch of an empty sheet and
/// is distinct from `Loading` and `Failed`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "lowercase")]
pub enum LoadState<T> {
    Loading,
    Failed(String),
    Ready(T),
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        LoadState::Loading
    }
}

impl<T> LoadState<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            LoadState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn ready_mut(&mut self) -> Option<&mut T> {
        match self {
            LoadState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }
}

/// Ticket handed out when a fetch starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Monotonic request counter; only the most recent ticket may apply its result
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: AtomicU64,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request, superseding every earlier one
    pub fn begin(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}
