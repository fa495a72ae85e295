use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Process-wide counters, shared by every request.
#[derive(Debug)]
pub struct Metrics {
    started: Instant,
    requests_total: AtomicU64,
    captures_ok: AtomicU64,
    capture_failures: AtomicU64,
    capture_timeouts: AtomicU64,
    render_errors: AtomicU64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub uptime_s: u64,
    pub requests_total: u64,
    pub captures_ok: u64,
    pub capture_failures: u64,
    pub capture_timeouts: u64,
    pub render_errors: u64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            requests_total: AtomicU64::new(0),
            captures_ok: AtomicU64::new(0),
            capture_failures: AtomicU64::new(0),
            capture_timeouts: AtomicU64::new(0),
            render_errors: AtomicU64::new(0),
        }
    }

    pub fn inc_requests(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_captures_ok(&self) {
        self.captures_ok.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_capture_failures(&self) {
        self.capture_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_capture_timeouts(&self) {
        self.capture_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_render_errors(&self) {
        self.render_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn requests_total(&self) -> u64 {
        self.requests_total.load(Ordering::Relaxed)
    }

    pub fn captures_ok(&self) -> u64 {
        self.captures_ok.load(Ordering::Relaxed)
    }

    pub fn capture_failures(&self) -> u64 {
        self.capture_failures.load(Ordering::Relaxed)
    }

    pub fn capture_timeouts(&self) -> u64 {
        self.capture_timeouts.load(Ordering::Relaxed)
    }

    pub fn render_errors(&self) -> u64 {
        self.render_errors.load(Ordering::Relaxed)
    }

    pub fn uptime_s(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime_s: self.uptime_s(),
            requests_total: self.requests_total(),
            captures_ok: self.captures_ok(),
            capture_failures: self.capture_failures(),
            capture_timeouts: self.capture_timeouts(),
            render_errors: self.render_errors(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero() {
        let metrics = Metrics::new();
        let snap = metrics.snapshot();
        assert_eq!(snap.requests_total, 0);
        assert_eq!(snap.capture_failures, 0);
        assert_eq!(snap.render_errors, 0);
    }

    #[test]
    fn counters_are_independent() {
        let metrics = Metrics::new();
        metrics.inc_requests();
        metrics.inc_requests();
        metrics.inc_capture_timeouts();
        metrics.inc_render_errors();

        assert_eq!(metrics.requests_total(), 2);
        assert_eq!(metrics.capture_timeouts(), 1);
        assert_eq!(metrics.capture_failures(), 0);
        assert_eq!(metrics.render_errors(), 1);
    }
}
