use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

// ============================================================================
// Metrics Module - Prometheus metrics for the order card
// ============================================================================
//
// Tracks the toggle workflow:
// - Confirmations and cancellations of the dialog
// - Update request outcomes (persisted / reverted by reason)
// - Requests cancelled because a newer confirmation superseded them
// - Requests abandoned because the parent switched the card to another order
// - Update request latency
//
// ============================================================================

pub struct Metrics {
    registry: Registry,

    pub toggles_confirmed: IntCounter,
    pub toggles_cancelled: IntCounter,
    pub updates_persisted: IntCounter,
    pub updates_reverted: IntCounterVec,
    pub updates_superseded: IntCounter,
    pub updates_discarded: IntCounter,
    pub update_duration: Histogram,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let toggles_confirmed = IntCounter::new(
            "order_card_toggles_confirmed_total",
            "Completion toggles confirmed in the dialog",
        )?;
        registry.register(Box::new(toggles_confirmed.clone()))?;

        let toggles_cancelled = IntCounter::new(
            "order_card_toggles_cancelled_total",
            "Confirmation dialogs dismissed without changes",
        )?;
        registry.register(Box::new(toggles_cancelled.clone()))?;

        let updates_persisted = IntCounter::new(
            "order_card_updates_persisted_total",
            "Update requests accepted by the order service",
        )?;
        registry.register(Box::new(updates_persisted.clone()))?;

        let updates_reverted = IntCounterVec::new(
            Opts::new("order_card_updates_reverted_total", "Optimistic updates rolled back"),
            &["reason"],
        )?;
        registry.register(Box::new(updates_reverted.clone()))?;

        let updates_superseded = IntCounter::new(
            "order_card_updates_superseded_total",
            "In-flight update requests cancelled by a newer confirmation",
        )?;
        registry.register(Box::new(updates_superseded.clone()))?;

        let updates_discarded = IntCounter::new(
            "order_card_updates_discarded_total",
            "In-flight update requests abandoned when the card switched orders",
        )?;
        registry.register(Box::new(updates_discarded.clone()))?;

        let update_duration = Histogram::with_opts(
            HistogramOpts::new(
                "order_card_update_duration_seconds",
                "Latency of order update requests",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        )?;
        registry.register(Box::new(update_duration.clone()))?;

        Ok(Self {
            registry,
            toggles_confirmed,
            toggles_cancelled,
            updates_persisted,
            updates_reverted,
            updates_superseded,
            updates_discarded,
            update_duration,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Helper to record a reverted update; `reason` is `rejected` or `transport`
    pub fn record_revert(&self, reason: &str) {
        self.updates_reverted.with_label_values(&[reason]).inc();
    }

    /// Text exposition of every registered metric
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert!(!metrics.registry().gather().is_empty());
    }

    #[test]
    fn test_record_revert_by_reason() {
        let metrics = Metrics::new().unwrap();
        metrics.record_revert("rejected");
        metrics.record_revert("rejected");
        metrics.record_revert("transport");

        assert_eq!(metrics.updates_reverted.with_label_values(&["rejected"]).get(), 2);
        assert_eq!(metrics.updates_reverted.with_label_values(&["transport"]).get(), 1);
    }

    #[test]
    fn test_render_contains_counters() {
        let metrics = Metrics::new().unwrap();
        metrics.toggles_confirmed.inc();

        let text = metrics.render().unwrap();
        assert!(text.contains("order_card_toggles_confirmed_total 1"));
    }
}
