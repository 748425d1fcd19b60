//! Fixed-window attempt counter, usable from both the server and the browser
//! (time is taken from `chrono` so it works on wasm as well).
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub max_attempts: u32,
    pub window_ms: i64,
}

impl RateLimit {
    pub const LOGIN_ATTEMPTS: RateLimit = RateLimit { max_attempts: 5, window_ms: 300_000 };
    pub const FORM_SUBMISSIONS: RateLimit = RateLimit { max_attempts: 10, window_ms: 300_000 };
    pub const API_CALLS: RateLimit = RateLimit { max_attempts: 100, window_ms: 60_000 };
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: i64,
}

#[derive(Debug)]
pub struct RateLimiter {
    limit: RateLimit,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(limit: RateLimit) -> Self {
        Self {
            limit,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn limit(&self) -> RateLimit {
        self.limit
    }

    /// Records an attempt for `identifier`; false once the window is exhausted.
    pub fn check(&self, identifier: &str) -> bool {
        self.check_at(identifier, Utc::now().timestamp_millis())
    }

    pub fn check_at(&self, identifier: &str, now_ms: i64) -> bool {
        let mut windows = match self.windows.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        match windows.get_mut(identifier) {
            Some(window) if now_ms <= window.reset_at => {
                if window.count >= self.limit.max_attempts {
                    return false;
                }
                window.count += 1;
                true
            }
            _ => {
                windows.insert(
                    identifier.to_string(),
                    Window {
                        count: 1,
                        reset_at: now_ms + self.limit.window_ms,
                    },
                );
                true
            }
        }
    }

    /// Drops windows that have already expired.
    pub fn prune_at(&self, now_ms: i64) {
        if let Ok(mut windows) = self.windows.lock() {
            windows.retain(|_, w| w.reset_at >= now_ms);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_after_max_attempts_in_window() {
        let limiter = RateLimiter::new(RateLimit { max_attempts: 3, window_ms: 1_000 });
        assert!(limiter.check_at("u1", 0));
        assert!(limiter.check_at("u1", 10));
        assert!(limiter.check_at("u1", 20));
        assert!(!limiter.check_at("u1", 30));
        assert!(!limiter.check_at("u1", 1_000));
    }

    #[test]
    fn window_resets_after_expiry() {
        let limiter = RateLimiter::new(RateLimit { max_attempts: 1, window_ms: 100 });
        assert!(limiter.check_at("u1", 0));
        assert!(!limiter.check_at("u1", 50));
        assert!(limiter.check_at("u1", 101));
    }

    #[test]
    fn identifiers_are_independent() {
        let limiter = RateLimiter::new(RateLimit { max_attempts: 1, window_ms: 100 });
        assert!(limiter.check_at("a", 0));
        assert!(limiter.check_at("b", 0));
        assert!(!limiter.check_at("a", 1));
    }

    #[test]
    fn prune_forgets_expired_windows() {
        let limiter = RateLimiter::new(RateLimit::LOGIN_ATTEMPTS);
        assert!(limiter.check_at("a", 0));
        limiter.prune_at(RateLimit::LOGIN_ATTEMPTS.window_ms + 1);
        assert!(limiter.windows.lock().unwrap().is_empty());
    }
}
