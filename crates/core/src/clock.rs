// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction so retry backoff and timestamps are deterministic in
//! tests without sleeping real wall-clock time.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

/// Source of time for the engine. Production code uses [`SystemClock`];
/// tests use [`FakeClock`] to advance time explicitly.
pub trait Clock: Clone + Send + Sync + 'static {
    /// Monotonic instant, used for timers and backoff deadlines.
    fn now(&self) -> Instant;
    /// Wall-clock time, used for `Item::start_time` / `end_time`.
    fn wall_now(&self) -> SystemTime;
}

/// Real wall-clock/monotonic time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall_now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Deterministic clock for tests: `now()` only advances when `advance()`
/// is called.
#[derive(Clone)]
pub struct FakeClock {
    inner: Arc<Mutex<FakeClockState>>,
}

struct FakeClockState {
    now: Instant,
    wall: SystemTime,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeClockState {
                now: Instant::now(),
                wall: SystemTime::now(),
            })),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut state = self.inner.lock();
        state.now += by;
        state.wall += by;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.inner.lock().now
    }

    fn wall_now(&self) -> SystemTime {
        self.inner.lock().wall
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
