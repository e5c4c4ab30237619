//! Outbound request budget.

use std::time::Duration;

use tokio::{
    sync::Mutex,
    time::{Instant, sleep_until},
};
use tracing::debug;

use crate::config::RateLimitConfig;

struct GateState {
    tokens: u32,
    refilled_at: Instant,
}

/// Token bucket shared by every outbound call to the account/match API.
///
/// The bucket holds `capacity` permits and is reset to full once `interval` has elapsed
/// since the last refill (no trickle). A caller that finds it empty keeps the lock and
/// sleeps until the next refill boundary, so later callers queue behind it in arrival
/// order instead of polling.
pub struct RateGate {
    capacity: u32,
    interval: Duration,
    state: Mutex<GateState>,
}

impl RateGate {
    /// Full bucket of `capacity` permits per `interval`. A zero capacity is raised to one.
    pub fn new(capacity: u32, interval: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            interval,
            state: Mutex::new(GateState {
                tokens: capacity,
                refilled_at: Instant::now(),
            }),
        }
    }

    /// Gate sized from the `rateLimit` config section.
    pub fn from_config(config: RateLimitConfig) -> Self {
        Self::new(config.capacity, config.interval)
    }

    /// Wait for a permit and consume it. Never fails.
    pub async fn acquire(&self) {
        let mut state = self.state.lock().await;

        let now = Instant::now();
        if now.duration_since(state.refilled_at) >= self.interval {
            state.tokens = self.capacity;
            state.refilled_at = now;
        }

        if state.tokens == 0 {
            let boundary = state.refilled_at + self.interval;
            debug!(
                wait_ms = boundary.saturating_duration_since(now).as_millis() as u64,
                "rate gate exhausted; waiting for refill"
            );
            sleep_until(boundary).await;
            state.tokens = self.capacity;
            state.refilled_at = Instant::now();
        }

        state.tokens -= 1;
    }

    /// Permits left in the current interval, counting a pending refill.
    pub async fn available(&self) -> u32 {
        let state = self.state.lock().await;
        if state.refilled_at.elapsed() >= self.interval {
            self.capacity
        } else {
            state.tokens
        }
    }
}
