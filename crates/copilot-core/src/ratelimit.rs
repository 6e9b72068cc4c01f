//! Per-client fixed-window rate limiting.
//!
//! A deliberately approximate fixed-window counter: the first request from a
//! client opens a 60-second window, requests inside the window count against
//! a quota of 10, and the window resets once it expires.  Not a sliding
//! window and not shared across processes; acceptable at demo-scale traffic.
//!
//! Stale entries are evicted lazily: whenever the table grows past a
//! high-water mark, expired windows are swept during the next check, so
//! unique addresses cannot grow the table without bound.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Requests allowed per window, process-wide.
pub const QUOTA: u32 = 10;
/// Window length, process-wide.
pub const WINDOW: Duration = Duration::from_secs(60);

/// Sweep expired entries once the table grows past this many clients.
const SWEEP_HIGH_WATER: usize = 1024;

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Limited,
}

impl Decision {
    pub fn is_limited(self) -> bool {
        matches!(self, Self::Limited)
    }
}

#[derive(Debug)]
struct Window {
    count: u32,
    started: Instant,
}

/// Fixed-window request counter keyed by client address.
///
/// Owned by the composition root and shared behind an `Arc`; the interior
/// mutex makes the read-modify-write on a client's counter atomic across
/// concurrently in-flight requests.
#[derive(Debug, Default)]
pub struct FixedWindowLimiter {
    windows: Mutex<HashMap<String, Window>>,
}

impl FixedWindowLimiter {
    pub fn new() -> Self {
        Self { windows: Mutex::new(HashMap::new()) }
    }

    /// Check and record a request from `client` at the current time.
    pub fn check(&self, client: &str) -> Decision {
        self.check_at(client, Instant::now())
    }

    /// Check and record a request from `client` at an explicit instant.
    ///
    /// Tests drive this directly to control time.
    pub fn check_at(&self, client: &str, now: Instant) -> Decision {
        let mut windows = match self.windows.lock() {
            Ok(guard) => guard,
            // A poisoned table only ever holds throttling counters; failing
            // open keeps the endpoint serving.
            Err(poisoned) => poisoned.into_inner(),
        };

        if windows.len() > SWEEP_HIGH_WATER {
            windows.retain(|_, w| now.duration_since(w.started) <= WINDOW);
        }

        match windows.get_mut(client) {
            Some(w) if now.duration_since(w.started) <= WINDOW => {
                if w.count >= QUOTA {
                    return Decision::Limited;
                }
                w.count += 1;
                Decision::Allowed
            }
            _ => {
                windows.insert(client.to_owned(), Window { count: 1, started: now });
                Decision::Allowed
            }
        }
    }

    /// Number of tracked clients; exposed for eviction tests.
    pub fn tracked_clients(&self) -> usize {
        self.windows.lock().map(|w| w.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn eleventh_request_in_window_is_rejected() {
        let limiter = FixedWindowLimiter::new();
        let start = Instant::now();
        for i in 0..QUOTA {
            let t = start + Duration::from_secs(u64::from(i));
            assert_eq!(limiter.check_at("10.0.0.1", t), Decision::Allowed, "request {}", i + 1);
        }
        assert_eq!(
            limiter.check_at("10.0.0.1", start + Duration::from_secs(30)),
            Decision::Limited
        );
    }

    #[test]
    fn window_resets_after_sixty_seconds() {
        let limiter = FixedWindowLimiter::new();
        let start = Instant::now();
        for _ in 0..QUOTA {
            limiter.check_at("10.0.0.1", start);
        }
        assert_eq!(limiter.check_at("10.0.0.1", start), Decision::Limited);
        assert_eq!(
            limiter.check_at("10.0.0.1", start + WINDOW + Duration::from_secs(1)),
            Decision::Allowed
        );
    }

    #[test]
    fn clients_are_counted_independently() {
        let limiter = FixedWindowLimiter::new();
        let now = Instant::now();
        for _ in 0..QUOTA {
            limiter.check_at("10.0.0.1", now);
        }
        assert_eq!(limiter.check_at("10.0.0.1", now), Decision::Limited);
        assert_eq!(limiter.check_at("10.0.0.2", now), Decision::Allowed);
    }

    #[test]
    fn stale_entries_are_swept_past_high_water() {
        let limiter = FixedWindowLimiter::new();
        let start = Instant::now();
        for i in 0..=SWEEP_HIGH_WATER {
            limiter.check_at(&format!("10.0.{}.{}", i / 256, i % 256), start);
        }
        assert!(limiter.tracked_clients() > SWEEP_HIGH_WATER);

        // Far past every window; the next check triggers the sweep.
        limiter.check_at("fresh-client", start + WINDOW * 3);
        assert_eq!(limiter.tracked_clients(), 1);
    }
}
