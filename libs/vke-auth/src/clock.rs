// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Clock synchronization against the provider's time endpoint
//!
//! Signed requests carry a timestamp that the server checks against its own
//! clock. [`ClockSync`] measures `local - server` once and memoizes it.
//!
//! The first caller starts a fetch and parks it as a shared future; any
//! caller arriving while it is in flight awaits the same future, so only one
//! round trip happens no matter how many tasks race. The fetch itself runs
//! on a spawned task, so it completes even when every waiter has gone. A
//! failed fetch hands its error to every waiter and leaves nothing cached.

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Source of the provider's current time
#[async_trait]
pub trait TimeSource: Send + Sync + 'static {
    /// Error returned by a failed fetch; cloned to every waiter
    type Error: Clone + Send + Sync + 'static;

    async fn server_time(&self) -> Result<DateTime<Utc>, Self::Error>;
}

type OffsetFuture<E> = Shared<BoxFuture<'static, Result<TimeDelta, E>>>;

enum OffsetState<E> {
    Unknown,
    Fetching {
        generation: u64,
        fetch: OffsetFuture<E>,
    },
    Known(TimeDelta),
}

/// Memoized offset between the local clock and the server clock
pub struct ClockSync<S: TimeSource> {
    source: Arc<S>,
    now: fn() -> DateTime<Utc>,
    state: Arc<Mutex<OffsetState<S::Error>>>,
    generation: AtomicU64,
}

impl<S: TimeSource> ClockSync<S> {
    pub fn new(source: S) -> Self {
        Self::with_local_clock(source, Utc::now)
    }

    /// Create a synchronizer reading local time from `now`
    pub fn with_local_clock(source: S, now: fn() -> DateTime<Utc>) -> Self {
        Self {
            source: Arc::new(source),
            now,
            state: Arc::new(Mutex::new(OffsetState::Unknown)),
            generation: AtomicU64::new(0),
        }
    }

    /// Current local time according to the injected clock
    pub fn local_now(&self) -> DateTime<Utc> {
        (self.now)()
    }

    /// Local time corrected to the server's clock
    pub fn corrected_now(&self, offset: TimeDelta) -> DateTime<Utc> {
        self.local_now() - offset
    }

    /// Memoized offset, if one has been measured
    pub fn cached(&self) -> Option<TimeDelta> {
        match &*lock(&self.state) {
            OffsetState::Known(offset) => Some(*offset),
            _ => None,
        }
    }

    /// Drop the memoized offset so the next call measures again
    ///
    /// A fetch already in flight is left alone; its waiters still receive
    /// its result.
    pub fn invalidate(&self) {
        let mut state = lock(&self.state);
        if matches!(*state, OffsetState::Known(_)) {
            *state = OffsetState::Unknown;
        }
    }

    /// Return the offset, measuring it if this is the first call
    ///
    /// The measurement runs on its own task, so a waiter that gives up does
    /// not stall it. Whatever it produces is recorded even if nobody is
    /// waiting any more, and a failure leaves the state ready for a fresh
    /// fetch.
    ///
    /// # Errors
    /// Returns the time source's error. Every caller sharing the failed
    /// fetch receives a clone of the same error.
    pub async fn offset(&self) -> Result<TimeDelta, S::Error> {
        let (generation, fetch) = {
            let mut state = lock(&self.state);
            match &*state {
                OffsetState::Known(offset) => return Ok(*offset),
                OffsetState::Fetching { generation, fetch } => (*generation, fetch.clone()),
                OffsetState::Unknown => {
                    let generation = self.generation.fetch_add(1, Ordering::Relaxed);
                    let fetch = self.start_fetch(generation);
                    *state = OffsetState::Fetching {
                        generation,
                        fetch: fetch.clone(),
                    };
                    (generation, fetch)
                }
            }
        };

        let result = fetch.await;
        record(&self.state, generation, &result);
        result
    }

    fn start_fetch(&self, generation: u64) -> OffsetFuture<S::Error> {
        let now = self.now;
        let measure = {
            let source = Arc::clone(&self.source);
            let state = Arc::clone(&self.state);
            async move {
                let result = source.server_time().await.map(|server| now() - server);
                record(&state, generation, &result);
                result
            }
        };
        let task = tokio::spawn(measure);

        let source = Arc::clone(&self.source);
        async move {
            match task.await {
                Ok(result) => result,
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(_) => {
                    // Runtime shutting down; measure on the waiter instead
                    let server = source.server_time().await?;
                    Ok(now() - server)
                }
            }
        }
        .boxed()
        .shared()
    }
}

/// Settle the state left by fetch `generation`, unless a newer one replaced it
fn record<E>(
    state: &Mutex<OffsetState<E>>,
    generation: u64,
    result: &Result<TimeDelta, E>,
) {
    let mut state = lock(state);
    if let OffsetState::Fetching { generation: current, .. } = &*state
        && *current == generation
    {
        *state = match result {
            Ok(offset) => {
                tracing::debug!(offset_ms = offset.num_milliseconds(), "clock offset measured");
                OffsetState::Known(*offset)
            }
            Err(_) => {
                tracing::debug!("clock offset fetch failed");
                OffsetState::Unknown
            }
        };
    }
}

fn lock<E>(state: &Mutex<OffsetState<E>>) -> MutexGuard<'_, OffsetState<E>> {
    state.lock().unwrap_or_else(|poisoned| {
        tracing::error!("clock offset mutex was poisoned, recovering");
        poisoned.into_inner()
    })
}
