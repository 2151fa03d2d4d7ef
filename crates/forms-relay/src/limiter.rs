use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

struct Window {
    started: Instant,
    count: u32,
}

/// Outcome of [`RateLimiter::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Time until the caller's window resets.
    pub reset_after: Duration,
}

/// Fixed-window request counter keyed by client.
pub struct RateLimiter {
    max: u32,
    window: Duration,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(max: u32, window: Duration) -> Self {
        Self {
            max,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Count one request for `key`.
    pub fn check(&self, key: &str) -> Decision {
        let now = Instant::now();
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        // Expired windows are dropped lazily so the map cannot grow without bound.
        windows.retain(|_, w| now.duration_since(w.started) < self.window);

        let w = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        let reset_after = self.window.saturating_sub(now.duration_since(w.started));
        if w.count >= self.max {
            return Decision {
                allowed: false,
                limit: self.max,
                remaining: 0,
                reset_after,
            };
        }
        w.count += 1;
        Decision {
            allowed: true,
            limit: self.max,
            remaining: self.max - w.count,
            reset_after,
        }
    }
}
