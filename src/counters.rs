//! Source of the synthetic request counters shown on `/metrics`.
//!
//! The service does not count requests. The two `http_requests_total` samples
//! are drawn fresh on every scrape, which is enough to make dashboards and
//! HPA custom-metric pipelines move. The source is a trait so tests can pin
//! the values.

use rand::Rng;

pub trait CounterSource: Send + Sync {
    /// Uniform sample in `[0, upper)`. `upper` is always non-zero.
    fn sample(&self, upper: u64) -> u64;
}

/// Production source: the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngSource;

impl CounterSource for ThreadRngSource {
    fn sample(&self, upper: u64) -> u64 {
        rand::thread_rng().gen_range(0..upper)
    }
}

/// Replays a fixed sequence, cycling when exhausted.
#[cfg(test)]
#[derive(Debug)]
pub struct FixedSource {
    values: Vec<u64>,
    next: std::sync::Mutex<usize>,
}

#[cfg(test)]
impl FixedSource {
    pub fn new(values: Vec<u64>) -> Self {
        Self {
            values,
            next: std::sync::Mutex::new(0),
        }
    }
}

#[cfg(test)]
impl CounterSource for FixedSource {
    fn sample(&self, upper: u64) -> u64 {
        if self.values.is_empty() {
            return 0;
        }
        let mut next = self.next.lock().unwrap_or_else(|e| e.into_inner());
        let value = self.values[*next % self.values.len()];
        *next += 1;
        value % upper
    }
}
