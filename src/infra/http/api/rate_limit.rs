use dashmap::DashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Buckets beyond this count make idle keys eligible for a sweep.
const PRUNE_THRESHOLD: usize = 4096;

/// Sliding-window limiter keyed by `key:route`.
#[derive(Debug, Clone)]
pub struct ApiRateLimiter {
    window: Duration,
    max_requests: u32,
    buckets: Arc<DashMap<String, Vec<Instant>>>,
    last_prune: Arc<Mutex<Instant>>,
}

impl ApiRateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            buckets: Arc::new(DashMap::new()),
            last_prune: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Record an attempt. Returns whether it is allowed and how many remain.
    pub fn allow(&self, key: &str, route: &str) -> (bool, u32) {
        let bucket_key = format!("{key}:{route}");
        let now = Instant::now();
        let window = self.window;
        self.maybe_prune(now);

        let mut entry = self.buckets.entry(bucket_key).or_default();
        entry.retain(|instant| now.duration_since(*instant) < window);

        let remaining = self.max_requests.saturating_sub(entry.len() as u32);
        if remaining == 0 {
            return (false, 0);
        }

        entry.push(now);
        (true, remaining.saturating_sub(1))
    }

    /// Sweep idle buckets, at most once per window. Returns whether a sweep ran.
    fn maybe_prune(&self, now: Instant) -> bool {
        if self.buckets.len() <= PRUNE_THRESHOLD {
            return false;
        }
        {
            let Ok(mut last) = self.last_prune.lock() else {
                return false;
            };
            if now.duration_since(*last) < self.window {
                return false;
            }
            *last = now;
        }

        let window = self.window;
        self.buckets.retain(|_, hits| {
            hits.last()
                .is_some_and(|last| now.duration_since(*last) < window)
        });
        true
    }

    pub fn retry_after_secs(&self) -> u64 {
        self.window.as_secs().max(1)
    }

    pub fn limit(&self) -> u32 {
        self.max_requests
    }
}
