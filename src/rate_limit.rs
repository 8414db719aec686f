//! Client-side request throttle for the search loop.
//!
//! Keeps the instants of recent requests. Before each request, instants older
//! than the window are dropped; once the ceiling is reached the caller waits
//! until the oldest retained request leaves the window. Bursts up to the
//! ceiling go through immediately.

use std::{collections::VecDeque, time::Duration};
use tokio::time::{Instant, sleep};
use tracing::{debug, info};

pub const DEFAULT_REQUESTS_PER_MINUTE: usize = 30;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    requests: VecDeque<Instant>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        RateLimiter::new(DEFAULT_REQUESTS_PER_MINUTE, DEFAULT_WINDOW)
    }
}

impl RateLimiter {
    /// A ceiling of zero is treated as one request per window.
    pub fn new(max_requests: usize, window: Duration) -> Self {
        RateLimiter {
            max_requests: max_requests.max(1),
            window,
            requests: VecDeque::new(),
        }
    }

    pub fn per_minute(max_requests: usize) -> Self {
        RateLimiter::new(max_requests, DEFAULT_WINDOW)
    }

    /// Requests currently counted against the window (as of the last prune).
    pub fn in_window(&self) -> usize {
        self.requests.len()
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    /// Record a request at `at` without waiting.
    pub fn record(&mut self, at: Instant) {
        self.requests.push_back(at);
    }

    fn prune(&mut self, now: Instant) {
        while let Some(&oldest) = self.requests.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                self.requests.pop_front();
            } else {
                break;
            }
        }
    }

    /// How long a request made at `now` has to wait. Prunes expired instants.
    pub fn wait_needed(&mut self, now: Instant) -> Option<Duration> {
        self.prune(now);
        if self.requests.len() < self.max_requests {
            return None;
        }
        let oldest = *self.requests.front()?;
        let wait = (oldest + self.window).saturating_duration_since(now);
        (!wait.is_zero()).then_some(wait)
    }

    /// Wait for a free slot, then record the request.
    pub async fn acquire(&mut self) {
        let mut now = Instant::now();
        if let Some(wait) = self.wait_needed(now) {
            info!("Rate limit reached. Waiting {:.1}s...", wait.as_secs_f64());
            sleep(wait).await;
            now = Instant::now();
            self.prune(now);
        }
        self.record(now);
        debug!(
            "Requests in last window: {}/{}",
            self.requests.len(),
            self.max_requests
        );
    }
}
