//! Process-wide counters and their plain-text rendering.
//!
//! Injectable (handed around behind an `Arc`) rather than global, so test
//! suites can run independent instances side by side.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

/// Counters fed by the request handlers and the orchestration façade.
#[derive(Debug, Default)]
pub struct Metrics {
    requests_total: AtomicU64,
    errors_total: AtomicU64,
    exports_total: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_http_requests(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_http_errors(&self) {
        self.errors_total.fetch_add(1, Ordering::Relaxed);
    }

    /// One export job accepted (admission granted, record created).
    pub fn inc_exports(&self) {
        self.exports_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn exports_total(&self) -> u64 {
        self.exports_total.load(Ordering::Relaxed)
    }

    /// Render the counters in Prometheus text exposition format.
    pub fn render_prometheus(&self) -> String {
        let lines = [
            "# HELP requests_total Total HTTP requests".to_string(),
            "# TYPE requests_total counter".to_string(),
            format!("requests_total {}", self.requests_total.load(Ordering::Relaxed)),
            "# HELP errors_total Total HTTP errors".to_string(),
            "# TYPE errors_total counter".to_string(),
            format!("errors_total {}", self.errors_total.load(Ordering::Relaxed)),
            "# HELP exports_total Total export jobs accepted".to_string(),
            "# TYPE exports_total counter".to_string(),
            format!("exports_total {}", self.exports_total.load(Ordering::Relaxed)),
            format!("# scraped_at_ms {}", Utc::now().timestamp_millis()),
        ];
        let mut body = lines.join("\n");
        body.push('\n');
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let metrics = Metrics::new();
        let body = metrics.render_prometheus();
        assert!(body.contains("requests_total 0"));
        assert!(body.contains("errors_total 0"));
        assert!(body.contains("exports_total 0"));
    }

    #[test]
    fn test_counters_advance() {
        let metrics = Metrics::new();
        metrics.inc_http_requests();
        metrics.inc_http_requests();
        metrics.inc_http_errors();
        metrics.inc_exports();

        let body = metrics.render_prometheus();
        assert!(body.contains("requests_total 2"));
        assert!(body.contains("errors_total 1"));
        assert!(body.contains("exports_total 1"));
        assert_eq!(metrics.exports_total(), 1);
    }

    #[test]
    fn test_render_has_help_and_type_lines() {
        let body = Metrics::new().render_prometheus();
        assert!(body.contains("# HELP exports_total"));
        assert!(body.contains("# TYPE exports_total counter"));
        assert!(body.ends_with('\n'));
    }
}
