//! Single-slot debounce timer.
//!
//! Scheduling replaces (aborts) whatever was pending. Each schedule gets a ticket so a
//! notification that raced past an abort can be recognized as stale by the owner.

use std::time::Duration;

use tokio::task::JoinHandle;

pub struct Debouncer {
    delay: Duration,
    ticket: u64,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, ticket: 0, pending: None }
    }

    /// Run `fire` with this schedule's ticket once `delay` passes without another
    /// `schedule` or `cancel`. Must be called inside a tokio runtime.
    pub fn schedule<F>(&mut self, fire: F) -> u64
    where
        F: FnOnce(u64) + Send + 'static,
    {
        self.cancel();
        self.ticket += 1;
        let ticket = self.ticket;
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            fire(ticket);
        }));
        ticket
    }

    /// Drop the pending timer, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Acknowledge a fired ticket. Returns false for tickets that were superseded.
    pub fn complete(&mut self, ticket: u64) -> bool {
        if self.pending.is_some() && ticket == self.ticket {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
