//! Fixed-window rate limiting.
//!
//! One global window; this gateway serves a single stdio peer, so there is
//! no per-caller partitioning. The window is the only shared mutable state
//! in the process and lives behind one mutex.

use parking_lot::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window counter: up to `limit` admissions per `window`, reset
/// lazily on the first call after the window elapses. A boundary tie
/// (`elapsed == window`) counts as expired.
#[derive(Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    state: Mutex<Window>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            state: Mutex::new(Window {
                started: Instant::now(),
                count: 0,
            }),
        }
    }

    /// Count this call against the current window; `false` means the call
    /// must be rejected without touching the upstream.
    pub fn admit(&self) -> bool {
        self.admit_at(Instant::now())
    }

    fn admit_at(&self, now: Instant) -> bool {
        let mut window = self.state.lock();
        if now.saturating_duration_since(window.started) >= self.window {
            window.started = now;
            window.count = 0;
        }
        window.count = window.count.saturating_add(1);
        window.count <= self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_up_to_limit_then_denies() {
        let limiter = RateLimiter::new(60, Duration::from_secs(60));
        let now = Instant::now();
        for i in 0..60 {
            assert!(limiter.admit_at(now), "call {} should be admitted", i + 1);
        }
        assert!(!limiter.admit_at(now), "call 61 must be denied");
        assert!(!limiter.admit_at(now), "denial is sticky within the window");
    }

    #[test]
    fn window_elapse_resets_the_counter() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let start = Instant::now();
        assert!(limiter.admit_at(start));
        assert!(!limiter.admit_at(start));
        assert!(limiter.admit_at(start + Duration::from_secs(61)));
    }

    #[test]
    fn boundary_tie_counts_as_expired() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let start = Instant::now();
        assert!(limiter.admit_at(start));
        assert!(!limiter.admit_at(start));
        // elapsed == window: exactly at the boundary the window is fresh.
        assert!(limiter.admit_at(start + Duration::from_secs(60)));
    }

    #[test]
    fn zero_limit_denies_everything() {
        let limiter = RateLimiter::new(0, Duration::from_secs(1));
        assert!(!limiter.admit_at(Instant::now()));
    }
}
