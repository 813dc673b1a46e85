use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use tracing::info;
use std::sync::{Arc, OnceLock};

pub const REASON_REJECTED: &str = "rejected";
pub const REASON_TRANSPORT: &str = "transport";

pub const OUTCOME_OK: &str = "ok";
pub const OUTCOME_ERROR: &str = "error";

// Declare the static OnceLock to hold the Metrics.
static METRICS_INSTANCE: OnceLock<Arc<Metrics>> = OnceLock::new();

/// Initializes on first use and gets a reference to the process-wide `Metrics`.
/// Synchronous so constructors outside an async context can record too.
pub fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| {
        info!("Initializing Metrics ...");
        Metrics::new()
    })
}


#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Probe metrics
    pub probe_sends: IntCounter,
    pub probe_send_failures: IntCounterVec,
    pub probe_send_duration: HistogramVec,
    pub probe_sequence: IntGauge,

    // Credential metrics
    pub credential_refreshes: IntCounter,
    pub credential_expiry_unix: IntGauge,

    // Runtime
    pub up: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("hubcanary".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Probe
            probe_sends: IntCounter::new("probe_sends_total", "Total publish attempts").unwrap(),
            probe_send_failures: IntCounterVec::new(Opts::new("probe_send_failures_total", "Publish failures by reason"),&["reason"],).unwrap(),
            probe_send_duration: HistogramVec::new(HistogramOpts::new("probe_send_duration_seconds", "Publish duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),&["outcome"],).unwrap(),
            probe_sequence: IntGauge::new("probe_sequence", "Sequence number of the last probe tick").unwrap(),

            // Credential
            credential_refreshes: IntCounter::new("credential_refreshes_total", "SAS credentials regenerated after a failed publish").unwrap(),
            credential_expiry_unix: IntGauge::new("credential_expiry_unix_seconds", "Expiry timestamp of the current SAS token").unwrap(),

            // Runtime
            up: IntGauge::new("up", "1 while the probe loop is running").unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.probe_sends.clone())).unwrap();
        reg.register(Box::new(metrics.probe_send_failures.clone())).unwrap();
        reg.register(Box::new(metrics.probe_send_duration.clone())).unwrap();
        reg.register(Box::new(metrics.probe_sequence.clone())).unwrap();
        reg.register(Box::new(metrics.credential_refreshes.clone())).unwrap();
        reg.register(Box::new(metrics.credential_expiry_unix.clone())).unwrap();
        reg.register(Box::new(metrics.up.clone())).unwrap();

        metrics
    }
}
