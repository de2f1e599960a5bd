//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define proxy metrics (requests, latency, errors)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `proxy_requests_total` (counter): total requests by method, status
//! - `proxy_request_duration_seconds` (histogram): time to response headers
//! - `proxy_errors_total` (counter): failed requests by error kind, whether or
//!   not the upstream was reached
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Labels stay low-cardinality; target hosts are never used as labels

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed request.
pub fn record_request(method: &str, status: u16, start_time: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("proxy_requests_total", &labels).increment(1);
    metrics::histogram!("proxy_request_duration_seconds", &labels)
        .record(start_time.elapsed().as_secs_f64());
}

/// Record a request that ended in a proxy error.
pub fn record_error(kind: &'static str) {
    metrics::counter!("proxy_errors_total", "kind" => kind).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use metrics::{Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit};

    /// Remembers every key registered through it.
    #[derive(Default)]
    struct KeyLog(Mutex<Vec<String>>);

    impl KeyLog {
        fn push(&self, key: &Key) {
            let labels: Vec<_> = key.labels().map(|l| format!("{}={}", l.key(), l.value())).collect();
            self.0.lock().unwrap().push(format!("{}{{{}}}", key.name(), labels.join(",")));
        }
    }

    impl Recorder for KeyLog {
        fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

        fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
            self.push(key);
            Counter::noop()
        }

        fn register_gauge(&self, key: &Key, _: &Metadata<'_>) -> Gauge {
            self.push(key);
            Gauge::noop()
        }

        fn register_histogram(&self, key: &Key, _: &Metadata<'_>) -> Histogram {
            self.push(key);
            Histogram::noop()
        }
    }

    #[test]
    fn test_recording_without_exporter_is_harmless() {
        record_request("GET", 200, Instant::now());
        record_error("decode");
    }

    #[test]
    fn test_error_counter_covers_every_kind() {
        let log = KeyLog::default();
        metrics::with_local_recorder(&log, || {
            record_error("decode");
            record_error("upstream_timeout");
        });

        assert_eq!(
            *log.0.lock().unwrap(),
            vec![
                "proxy_errors_total{kind=decode}".to_string(),
                "proxy_errors_total{kind=upstream_timeout}".to_string(),
            ]
        );
    }
}
