//! Minimum-interval gate for outbound provider calls.
//!
//! `MinIntervalGate` guarantees that no two calls made through it start less
//! than `min_delay` after the previous call *finished*. The permit returned by
//! [`MinIntervalGate::acquire`] holds the gate for the duration of the call, so
//! concurrent callers sharing one gate (via `Arc`) are serialised. Callers that
//! need isolated quotas construct separate gates.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, MutexGuard};

#[derive(Debug)]
pub struct MinIntervalGate {
    min_delay: Duration,
    last_call_end: Mutex<Option<Instant>>,
}

/// Held while a provider call is in flight. Dropping it records the call's end.
pub struct GatePermit<'a> {
    last_call_end: MutexGuard<'a, Option<Instant>>,
}

impl Drop for GatePermit<'_> {
    fn drop(&mut self) {
        *self.last_call_end = Some(Instant::now());
    }
}

impl MinIntervalGate {
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            last_call_end: Mutex::new(None),
        }
    }

    pub fn shared(min_delay: Duration) -> Arc<Self> {
        Arc::new(Self::new(min_delay))
    }

    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    /// Block until the next call may start.
    pub fn acquire(&self) -> GatePermit<'_> {
        let last_call_end = self.last_call_end.lock();
        if let Some(end) = *last_call_end {
            let elapsed = end.elapsed();
            if elapsed < self.min_delay {
                let wait = self.min_delay - elapsed;
                tracing::debug!(wait_ms = wait.as_millis() as u64, "rate limit: waiting");
                std::thread::sleep(wait);
            }
        }
        GatePermit { last_call_end }
    }
}

impl Default for MinIntervalGate {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000))
    }
}
