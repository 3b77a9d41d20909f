use prometheus_client::{
    metrics::{counter::Counter, histogram::Histogram},
    registry::Registry,
};

/// Metrics for the poll → transform loop.
#[derive(Clone, Debug)]
pub struct PollerMetrics {
    pub(crate) polls: Counter,
    pub(crate) poll_errors: Counter,
    pub(crate) empty_results: Counter,
    pub(crate) superseded: Counter,
    pub(crate) transform_seconds: Histogram,
}

// === impl PollerMetrics ===

impl PollerMetrics {
    pub fn register(reg: &mut Registry) -> Self {
        let polls = Counter::default();
        reg.register("polls", "Total number of search polls started", polls.clone());

        let poll_errors = Counter::default();
        reg.register(
            "poll_errors",
            "Total number of search polls that failed",
            poll_errors.clone(),
        );

        let empty_results = Counter::default();
        reg.register(
            "empty_results",
            "Total number of polls that returned an empty result set",
            empty_results.clone(),
        );

        let superseded = Counter::default();
        reg.register(
            "superseded_transforms",
            "Total number of aggregation passes discarded because a newer poll superseded them",
            superseded.clone(),
        );

        let transform_seconds = Histogram::new([0.005, 0.05, 0.5, 5.0]);
        reg.register_with_unit(
            "transform",
            "Histogram of aggregation transform latency",
            prometheus_client::registry::Unit::Seconds,
            transform_seconds.clone(),
        );

        Self {
            polls,
            poll_errors,
            empty_results,
            superseded,
            transform_seconds,
        }
    }
}
