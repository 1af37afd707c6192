use std::time::{Duration, Instant};

use log::warn;

/// Per-connection inbound frame counter over one-second windows.
pub struct RateLimiter {
    max_per_second: u32,
    // Start of the current one-second window
    window_start: Instant,
    requests_this_window: u32,
}

impl RateLimiter {
    pub fn new(max_per_second: u32) -> Self {
        Self {
            max_per_second,
            window_start: Instant::now(),
            requests_this_window: 0,
        }
    }

    /// Call for every inbound frame.
    /// Returns true once the connection exceeds its per-second allowance.
    pub fn record_request(&mut self, connection: &str) -> bool {
        self.record_request_at(Instant::now(), connection)
    }

    fn record_request_at(&mut self, now: Instant, connection: &str) -> bool {
        if now.duration_since(self.window_start) >= Duration::from_secs(1) {
            self.window_start = now;
            self.requests_this_window = 0;
        }
        self.requests_this_window += 1;
        if self.requests_this_window > self.max_per_second {
            warn!(
                "[AntiSpam] Connection {} sent {} frames within one second",
                connection, self.requests_this_window
            );
            return true;
        }
        false
    }
}
