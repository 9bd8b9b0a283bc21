// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Periodic feed polling with at most one fetch in flight.
//!
//! The poller owns the pending fetch future. `completed()` is cancel safe: if
//! the `select!` branch awaiting it loses, the fetch stays pending and is
//! picked up again on the next loop iteration.

use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::time::Instant;
use tracing::debug;

use crate::feed::{FeedSource, FetchError};

/// Fixed-interval schedule driven by explicit clock readings
#[derive(Debug, Clone)]
pub struct PollSchedule {
    interval: Duration,
    /// `None` means due immediately
    next_due: Option<Instant>,
}

impl PollSchedule {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    /// Returns true if a poll is due at `now`, and if so schedules the next one
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now < due => false,
            _ => {
                self.next_due = Some(now + self.interval);
                true
            }
        }
    }

    /// Make the next tick fire regardless of the interval
    pub fn trigger_now(&mut self) {
        self.next_due = None;
    }
}

type PendingFetch = BoxFuture<'static, Result<String, FetchError>>;

pub struct Poller {
    source: Box<dyn FeedSource>,
    schedule: PollSchedule,
    timeout: Duration,
    in_flight: Option<PendingFetch>,
}

impl Poller {
    pub fn new(source: Box<dyn FeedSource>, interval: Duration, timeout: Duration) -> Self {
        Self {
            source,
            schedule: PollSchedule::new(interval),
            timeout,
            in_flight: None,
        }
    }

    pub fn describe(&self) -> String {
        self.source.describe()
    }

    /// Poll on the next tick (manual refresh)
    pub fn trigger_now(&mut self) {
        self.schedule.trigger_now();
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Start a fetch if one is due and none is pending. Returns true if started.
    pub fn start_if_due(&mut self, now: Instant) -> bool {
        if self.in_flight.is_some() || !self.schedule.tick(now) {
            return false;
        }

        debug!(source = %self.source.describe(), "Fetching feed");
        let fetch = self.source.fetch();
        let timeout = self.timeout;
        self.in_flight = Some(
            async move {
                match tokio::time::timeout(timeout, fetch).await {
                    Ok(result) => result,
                    Err(_) => Err(FetchError::Timeout(timeout)),
                }
            }
            .boxed(),
        );
        true
    }

    /// Wait for the pending fetch. Never resolves if nothing is in flight.
    pub async fn completed(&mut self) -> Result<String, FetchError> {
        match self.in_flight.as_mut() {
            Some(fetch) => {
                let result = fetch.await;
                self.in_flight = None;
                result
            }
            None => std::future::pending().await,
        }
    }

    /// Drop the pending fetch, if any. Returns true if one was cancelled.
    pub fn cancel(&mut self) -> bool {
        let cancelled = self.in_flight.take().is_some();
        if cancelled {
            debug!("Cancelled in-flight fetch");
        }
        cancelled
    }
}
