// Prometheus counters for poll cycles, served at GET /metrics

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;

use crate::inventory::{SkipReason, SkippedVm};

const NAMESPACE: &str = "vsphere_inventory";
const SKIP_REASONS: [SkipReason; 3] = [
    SkipReason::HostNotFound,
    SkipReason::NoDatastoreReference,
    SkipReason::DatastoreNotFound,
];

/// Cycle outcome label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
        }
    }
}

/// Metrics shared by every collector; one registry per process (or per test app).
pub struct Metrics {
    registry: Registry,
    cycles: IntCounterVec,
    cycle_duration: HistogramVec,
    skipped_vms: IntCounterVec,
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let cycles = IntCounterVec::new(
            Opts::new("poll_cycles_total", "Poll cycles run, by outcome").namespace(NAMESPACE),
            &["endpoint", "outcome"],
        )?;
        let cycle_duration = HistogramVec::new(
            HistogramOpts::new(
                "poll_cycle_duration_seconds",
                "Wall time of one poll cycle",
            )
            .namespace(NAMESPACE)
            .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
            &["endpoint"],
        )?;
        let skipped_vms = IntCounterVec::new(
            Opts::new("skipped_vms_total", "VMs excluded from the payload, by reason")
                .namespace(NAMESPACE),
            &["endpoint", "reason"],
        )?;

        registry.register(Box::new(cycles.clone()))?;
        registry.register(Box::new(cycle_duration.clone()))?;
        registry.register(Box::new(skipped_vms.clone()))?;

        Ok(Self {
            registry,
            cycles,
            cycle_duration,
            skipped_vms,
        })
    }

    /// Records one finished cycle. `skipped` is empty for failed cycles.
    pub fn record_cycle(
        &self,
        endpoint: &str,
        outcome: Outcome,
        elapsed: Duration,
        skipped: &[SkippedVm],
    ) {
        self.cycles
            .with_label_values(&[endpoint, outcome.as_str()])
            .inc();
        self.cycle_duration
            .with_label_values(&[endpoint])
            .observe(elapsed.as_secs_f64());
        for reason in SKIP_REASONS {
            let n = skipped.iter().filter(|s| s.reason == reason).count() as u64;
            self.skipped_vms
                .with_label_values(&[endpoint, reason.as_str()])
                .inc_by(n);
        }
    }

    /// Prometheus text exposition format.
    pub fn render(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skipped(reason: SkipReason) -> SkippedVm {
        SkippedVm {
            id: "vm-1".into(),
            name: "vm".into(),
            datacenter: "dc1".into(),
            reason,
            reference: None,
        }
    }

    #[test]
    fn record_cycle_counts_outcomes_and_skip_reasons() {
        let metrics = Metrics::new().unwrap();
        metrics.record_cycle(
            "pvc",
            Outcome::Success,
            Duration::from_millis(250),
            &[
                skipped(SkipReason::HostNotFound),
                skipped(SkipReason::HostNotFound),
                skipped(SkipReason::DatastoreNotFound),
            ],
        );
        metrics.record_cycle("pvc", Outcome::Failure, Duration::from_millis(10), &[]);

        let text = metrics.render().unwrap();
        assert!(text.contains(
            r#"vsphere_inventory_poll_cycles_total{endpoint="pvc",outcome="success"} 1"#
        ));
        assert!(text.contains(
            r#"vsphere_inventory_poll_cycles_total{endpoint="pvc",outcome="failure"} 1"#
        ));
        assert!(text.contains(
            r#"vsphere_inventory_skipped_vms_total{endpoint="pvc",reason="host_not_found"} 2"#
        ));
        assert!(text.contains(
            r#"vsphere_inventory_skipped_vms_total{endpoint="pvc",reason="no_datastore_reference"} 0"#
        ));
        assert!(text.contains(
            r#"vsphere_inventory_poll_cycle_duration_seconds_count{endpoint="pvc"} 2"#
        ));
    }

    #[test]
    fn fresh_registry_renders_without_samples() {
        let metrics = Metrics::new().unwrap();
        assert!(!metrics.render().unwrap().contains("endpoint="));
    }
}
