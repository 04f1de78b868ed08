//! Debouncing for search-as-you-type

use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// Holds the latest query until it has been quiet for `delay`.
///
/// Each [`push`](SearchDebouncer::push) replaces the pending query and restarts
/// the timer, so only the last keystroke of a burst is ever searched.
#[derive(Debug)]
pub struct SearchDebouncer {
    delay: Duration,
    pending: Option<(String, Instant)>,
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn push(&mut self, query: impl Into<String>) {
        self.pending = Some((query.into(), Instant::now() + self.delay));
    }

    /// When the pending query becomes ready, if there is one
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    /// Take the pending query if its quiet period has elapsed
    pub fn take_ready(&mut self) -> Option<String> {
        match &self.pending {
            Some((_, deadline)) if *deadline <= Instant::now() => {
                self.pending.take().map(|(query, _)| query)
            }
            _ => None,
        }
    }

    /// Wait out the quiet period and take the query
    pub async fn wait(&mut self) -> Option<String> {
        sleep_until(self.deadline()?).await;
        self.take_ready()
    }
}
