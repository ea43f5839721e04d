//! Clock abstraction. The engine takes an explicit `now`, so the clock only
//! matters to whoever drives it: the runner loop in production, tests otherwise.

use crate::types::TimestampMs;
use std::sync::atomic::{AtomicI64, Ordering};

pub trait Clock: Send + Sync {
    /// Current time as epoch milliseconds (UTC).
    fn now_ms(&self) -> TimestampMs;
}

/// Wall-clock time. The production implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> TimestampMs {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Hand-driven clock for deterministic tests. Never ticks on its own.
#[derive(Debug)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start: TimestampMs) -> Self {
        Self {
            now: AtomicI64::new(start),
        }
    }

    pub fn set(&self, now: TimestampMs) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Move time forward by `delta` ms. Returns the new time.
    pub fn advance(&self, delta: TimestampMs) -> TimestampMs {
        self.now.fetch_add(delta, Ordering::SeqCst) + delta
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> TimestampMs {
        self.now.load(Ordering::SeqCst)
    }
}
