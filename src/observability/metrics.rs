//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Own the process metrics registry (built once at startup)
//! - Count each Protected request when it is decided
//! - Observe its duration once forwarding completes
//! - Render the registry in the Prometheus text format
//!
//! # Metrics
//! - `authrp_proxy_http_requests_total` (counter)
//! - `authrp_proxy_http_requests_duration` (histogram, seconds)
//!
//! Both are labelled by `request_method`, `request_path` and `authenticated`.
//!
//! # Design Decisions
//! - The recorder is an explicit value held in the app state, never installed
//!   as the global recorder; samples go through it with `with_local_recorder`
//! - Updates are atomic inside the exporter, so concurrent requests never
//!   lose samples and need no extra locking

use std::time::Duration;

use metrics::{
    counter, describe_counter, describe_histogram, histogram, with_local_recorder, Label, Unit,
};
use metrics_exporter_prometheus::{
    BuildError, Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder,
};

pub const REQUESTS_TOTAL: &str = "authrp_proxy_http_requests_total";
pub const REQUESTS_DURATION: &str = "authrp_proxy_http_requests_duration";

/// Content type of the exposition body.
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Prometheus default buckets.
const DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Label set shared by both instruments.
#[derive(Debug, Clone)]
pub struct RequestLabels {
    pub method: String,
    pub path: String,
    pub authenticated: bool,
}

impl RequestLabels {
    fn to_labels(&self) -> Vec<Label> {
        let authenticated = if self.authenticated { "true" } else { "false" };
        vec![
            Label::new("request_method", self.method.clone()),
            Label::new("request_path", self.path.clone()),
            Label::new("authenticated", authenticated),
        ]
    }
}

/// One observation of a Protected request.
#[derive(Debug, Clone)]
pub struct MetricsSample {
    pub labels: RequestLabels,
    pub duration: Duration,
}

/// Registry holding the request counter and duration histogram.
pub struct MetricsRecorder {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
}

impl MetricsRecorder {
    /// Build the registry and register metric descriptions.
    pub fn new() -> Result<Self, BuildError> {
        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Full(REQUESTS_DURATION.to_string()),
                DURATION_BUCKETS,
            )?
            .build_recorder();
        let handle = recorder.handle();

        with_local_recorder(&recorder, || {
            describe_counter!(REQUESTS_TOTAL, "The total number of handled http request");
            describe_histogram!(
                REQUESTS_DURATION,
                Unit::Seconds,
                "The duration of handled http request"
            );
        });

        Ok(Self { recorder, handle })
    }

    /// Count one request.
    pub fn increment(&self, labels: &RequestLabels) {
        with_local_recorder(&self.recorder, || {
            counter!(REQUESTS_TOTAL, labels.to_labels()).increment(1);
        });
    }

    /// Observe how long one request took.
    pub fn observe(&self, sample: &MetricsSample) {
        with_local_recorder(&self.recorder, || {
            histogram!(REQUESTS_DURATION, sample.labels.to_labels())
                .record(sample.duration.as_secs_f64());
        });
    }

    /// Render the registry in the Prometheus text exposition format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

impl std::fmt::Debug for MetricsRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsRecorder").finish_non_exhaustive()
    }
}

/// Read a counter value for one label set out of rendered exposition text.
pub fn counter_value(exposition: &str, method: &str, path: &str, authenticated: bool) -> u64 {
    series_value(exposition, REQUESTS_TOTAL, method, path, authenticated)
        .map(|value| value as u64)
        .unwrap_or(0)
}

/// Read the summed duration in seconds for one label set, if observed.
pub fn duration_sum(exposition: &str, method: &str, path: &str, authenticated: bool) -> Option<f64> {
    let series = format!("{}_sum", REQUESTS_DURATION);
    series_value(exposition, &series, method, path, authenticated)
}

fn series_value(
    exposition: &str,
    series: &str,
    method: &str,
    path: &str,
    authenticated: bool,
) -> Option<f64> {
    let prefix = format!("{}{{", series);
    let labels = [
        format!("request_method=\"{}\"", method),
        format!("request_path=\"{}\"", path),
        format!("authenticated=\"{}\"", authenticated),
    ];

    exposition
        .lines()
        .filter(|line| line.starts_with(&prefix))
        .find(|line| labels.iter().all(|label| line.contains(label.as_str())))
        .and_then(|line| line.rsplit(' ').next())
        .and_then(|value| value.parse::<f64>().ok())
}
