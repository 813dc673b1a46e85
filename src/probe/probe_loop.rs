use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::helpers::time::get_instant;
use crate::observability::metrics::{get_metrics, OUTCOME_ERROR, OUTCOME_OK};
use crate::publisher::Publish;

pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(1);
const PARTITION_COUNT: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    Idle,
    Running,
    Stopped,
}

/// Counters returned once the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeReport {
    pub ticks: u64,
    pub failures: u64,
}

/// Drives one publish per interval until cancelled. Failed sends are logged and
/// counted; they never stop the loop and are never retried within the tick.
pub struct ProbeLoop<P> {
    publisher: P,
    interval: Duration,
    state: ProbeState,
    sequence: u64,
}

impl<P: Publish> ProbeLoop<P> {
    pub fn new(publisher: P) -> Self {
        Self::with_interval(publisher, DEFAULT_PROBE_INTERVAL)
    }

    pub fn with_interval(publisher: P, interval: Duration) -> Self {
        Self {
            publisher,
            interval,
            state: ProbeState::Idle,
            sequence: 0,
        }
    }

    pub fn state(&self) -> ProbeState {
        self.state
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Runs until `cancel` fires. Only an `Idle` loop starts; `Stopped` is terminal.
    pub async fn begin(&mut self, cancel: CancellationToken) -> ProbeReport {
        if self.state != ProbeState::Idle {
            warn!(state = ?self.state, "Probe already started, ignoring begin.");
            return ProbeReport::default();
        }
        info!(interval_ms = self.interval.as_millis() as u64, "Starting probe.");
        self.state = ProbeState::Running;
        let metrics = get_metrics();
        metrics.up.set(1);

        let mut report = ProbeReport::default();
        while !cancel.is_cancelled() {
            self.sequence += 1;
            let n = self.sequence;
            let (payload, partition_key) = probe_message(n);

            let start = get_instant();
            let result = self.publisher.send(&payload, Some(partition_key.as_str())).await;
            let elapsed = start.elapsed();

            report.ticks += 1;
            metrics.probe_sends.inc();
            metrics.probe_sequence.set(n as i64);
            match result {
                Ok(()) => {
                    metrics.probe_send_duration.with_label_values(&[OUTCOME_OK]).observe(elapsed.as_secs_f64());
                    debug!("Sent message {} in {}ms", n, elapsed.as_millis());
                }
                Err(err) => {
                    report.failures += 1;
                    metrics.probe_send_duration.with_label_values(&[OUTCOME_ERROR]).observe(elapsed.as_secs_f64());
                    metrics.probe_send_failures.with_label_values(&[err.reason()]).inc();
                    error!(error = %err, "Failed to send message {} to hub after {}ms.", n, elapsed.as_millis());
                }
            }

            if let Some(remaining) = self.interval.checked_sub(elapsed).filter(|d| !d.is_zero()) {
                if sleep_or_cancel(&cancel, remaining).await {
                    debug!("sleep interrupted by cancellation");
                }
            }
        }

        self.state = ProbeState::Stopped;
        metrics.up.set(0);
        info!(ticks = report.ticks, failures = report.failures, "Probe stopped.");
        report
    }
}

/// Payload is the decimal sequence number, partition key is `n % 100`.
pub fn probe_message(n: u64) -> (Vec<u8>, String) {
    (n.to_string().into_bytes(), (n % PARTITION_COUNT).to_string())
}

/// Returns `true` when woken by cancellation rather than the timer.
async fn sleep_or_cancel(cancel: &CancellationToken, dur: Duration) -> bool {
    tokio::select! {
        () = cancel.cancelled() => true,
        () = sleep(dur) => false,
    }
}
