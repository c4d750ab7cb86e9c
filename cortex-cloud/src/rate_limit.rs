//! Per-minute token-bucket rate limiter. The CVS contract requires callers
//! to coalesce bursts; this enforces it from the client side so a runaway
//! caller gets a local, synchronous backpressure signal instead of a string
//! of 429s from the remote.

use std::sync::Mutex;
use std::time::{Duration, Instant};

pub struct RateLimiter {
    max_per_minute: u32,
    state: Mutex<(u32, Instant)>,
}

impl RateLimiter {
    pub fn new(max_per_minute: u32) -> Self {
        Self { max_per_minute, state: Mutex::new((0, Instant::now())) }
    }

    /// `true` if a request may proceed now; otherwise the caller should
    /// back off (treated as `CloudError::RateLimited` by the caller). A
    /// poisoned lock degrades to "deny" — safer than letting a runaway
    /// caller through with an un-trackable counter.
    pub fn try_acquire(&self) -> bool {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(_) => return false,
        };
        let (count, window_start) = *state;
        if window_start.elapsed() >= Duration::from_secs(60) {
            *state = (1, Instant::now());
            return true;
        }
        if count >= self.max_per_minute {
            return false;
        }
        state.0 += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_limit_then_blocks() {
        let limiter = RateLimiter::new(2);
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }
}
