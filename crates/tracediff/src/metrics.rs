//! Metrics collection and reporting using metrics-rs.
//!
//! Comparison runs record counters through the `metrics` facade; without an
//! installed recorder they are no-ops. The CLI installs [`CliRecorder`] when
//! `--metrics` is given and prints a summary at exit.

use std::collections::HashMap;
use std::sync::Arc;

use metrics::{
    Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit, counter,
    describe_counter, describe_gauge, describe_histogram, gauge, histogram,
};
use parking_lot::RwLock;

use crate::report::{CompareReport, CycleMismatch, StreamLengths};

// ============================================================================
// Metric descriptions
// ============================================================================

/// Initialize metric descriptions.
///
/// Call this once at startup to register metric descriptions.
pub fn init() {
    describe_counter!(
        "tracediff_lines_compared_total",
        Unit::Count,
        "Trace line pairs that matched on address and registers"
    );
    describe_counter!(
        "tracediff_cycle_mismatches_total",
        Unit::Count,
        "Instructions whose cycle deltas disagreed"
    );
    describe_counter!(
        "tracediff_divergences_total",
        Unit::Count,
        "Fatal divergences, labelled by kind"
    );
    describe_counter!(
        "tracediff_length_mismatches_total",
        Unit::Count,
        "Runs whose streams had different lengths"
    );
    describe_gauge!(
        "tracediff_compare_seconds",
        Unit::Seconds,
        "Wall-clock time of the last comparison"
    );
    describe_histogram!(
        "tracediff_cycle_difference",
        Unit::Count,
        "Signed reference-minus-candidate cycle delta per mismatch"
    );
}

// ============================================================================
// Metric recording functions
// ============================================================================

/// Record one cycle mismatch.
pub fn record_cycle_mismatch(mismatch: &CycleMismatch) {
    let op = mismatch.previous_opcode.clone().unwrap_or_default();
    counter!("tracediff_cycle_mismatches_total", "op" => op).increment(1);
    #[allow(clippy::cast_precision_loss)]
    let difference = mismatch.difference() as f64;
    histogram!("tracediff_cycle_difference").record(difference);
}

/// Record the outcome of a finished run.
pub fn record_report(report: &CompareReport) {
    counter!("tracediff_lines_compared_total").increment(report.summary.lines_compared as u64);
    if let Some(divergence) = &report.divergence {
        counter!("tracediff_divergences_total", "kind" => divergence.kind.name()).increment(1);
    }
    if matches!(report.summary.lengths, StreamLengths::Mismatch { .. }) {
        counter!("tracediff_length_mismatches_total").increment(1);
    }
}

/// Record the wall-clock time of a run.
pub fn record_duration(secs: f64) {
    gauge!("tracediff_compare_seconds").set(secs);
}

// ============================================================================
// CLI Recorder for terminal output
// ============================================================================

/// Storage for counter values.
#[derive(Default)]
struct CounterStorage {
    values: RwLock<HashMap<String, u64>>,
}

/// Storage for gauge values.
#[derive(Default)]
struct GaugeStorage {
    values: RwLock<HashMap<String, f64>>,
}

/// Storage for histogram values.
#[derive(Default)]
struct HistogramStorage {
    values: RwLock<HashMap<String, Vec<f64>>>,
}

struct CliCounter {
    key: String,
    storage: Arc<CounterStorage>,
}

impl metrics::CounterFn for CliCounter {
    fn increment(&self, value: u64) {
        let mut values = self.storage.values.write();
        *values.entry(self.key.clone()).or_insert(0) += value;
    }

    fn absolute(&self, value: u64) {
        let mut values = self.storage.values.write();
        values.insert(self.key.clone(), value);
    }
}

struct CliGauge {
    key: String,
    storage: Arc<GaugeStorage>,
}

impl metrics::GaugeFn for CliGauge {
    fn increment(&self, value: f64) {
        let mut values = self.storage.values.write();
        *values.entry(self.key.clone()).or_insert(0.0) += value;
    }

    fn decrement(&self, value: f64) {
        let mut values = self.storage.values.write();
        *values.entry(self.key.clone()).or_insert(0.0) -= value;
    }

    fn set(&self, value: f64) {
        let mut values = self.storage.values.write();
        values.insert(self.key.clone(), value);
    }
}

struct CliHistogram {
    key: String,
    storage: Arc<HistogramStorage>,
}

impl metrics::HistogramFn for CliHistogram {
    fn record(&self, value: f64) {
        let mut values = self.storage.values.write();
        values.entry(self.key.clone()).or_default().push(value);
    }
}

/// CLI recorder that keeps metrics in memory for a terminal summary.
pub struct CliRecorder {
    counters: Arc<CounterStorage>,
    gauges: Arc<GaugeStorage>,
    histograms: Arc<HistogramStorage>,
}

impl CliRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            counters: Arc::new(CounterStorage::default()),
            gauges: Arc::new(GaugeStorage::default()),
            histograms: Arc::new(HistogramStorage::default()),
        }
    }

    /// Install this recorder as the global metrics recorder.
    ///
    /// Returns `None` if a recorder is already installed.
    #[must_use]
    pub fn install(self) -> Option<CliRecorderHandle> {
        let handle = self.handle();
        metrics::set_global_recorder(self).ok()?;
        Some(handle)
    }

    fn handle(&self) -> CliRecorderHandle {
        CliRecorderHandle {
            counters: Arc::clone(&self.counters),
            gauges: Arc::clone(&self.gauges),
            histograms: Arc::clone(&self.histograms),
        }
    }
}

impl Default for CliRecorder {
    fn default() -> Self {
        Self::new()
    }
}

fn key_to_string(key: &Key) -> String {
    let name = key.name();
    let labels = key.labels();
    if labels.len() == 0 {
        name.to_string()
    } else {
        let label_str: Vec<String> = labels
            .map(|l| format!("{}={}", l.key(), l.value()))
            .collect();
        format!("{}{{{}}}", name, label_str.join(","))
    }
}

impl Recorder for CliRecorder {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
        Counter::from_arc(Arc::new(CliCounter {
            key: key_to_string(key),
            storage: Arc::clone(&self.counters),
        }))
    }

    fn register_gauge(&self, key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        Gauge::from_arc(Arc::new(CliGauge {
            key: key_to_string(key),
            storage: Arc::clone(&self.gauges),
        }))
    }

    fn register_histogram(&self, key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        Histogram::from_arc(Arc::new(CliHistogram {
            key: key_to_string(key),
            storage: Arc::clone(&self.histograms),
        }))
    }
}

/// Handle for reading metrics after the recorder is installed.
pub struct CliRecorderHandle {
    counters: Arc<CounterStorage>,
    gauges: Arc<GaugeStorage>,
    histograms: Arc<HistogramStorage>,
}

impl CliRecorderHandle {
    #[must_use]
    pub fn get_counter(&self, key: &str) -> Option<u64> {
        self.counters.values.read().get(key).copied()
    }

    /// Print all collected metrics to stderr.
    pub fn print_summary(&self) {
        let counters = self.counters.values.read();
        let gauges = self.gauges.values.read();
        let histograms = self.histograms.values.read();

        if counters.is_empty() && gauges.is_empty() && histograms.is_empty() {
            eprintln!("No metrics collected.");
            return;
        }

        eprintln!();
        eprintln!("## Metrics Summary");

        if !counters.is_empty() {
            eprintln!("### Counters");
            let mut entries: Vec<_> = counters.iter().collect();
            entries.sort();
            for (key, value) in entries {
                eprintln!("  {key}: {value}");
            }
        }

        if !gauges.is_empty() {
            eprintln!("### Gauges");
            let mut keys: Vec<_> = gauges.keys().collect();
            keys.sort();
            for key in keys {
                eprintln!("  {key}: {:.6}", gauges[key]);
            }
        }

        if !histograms.is_empty() {
            eprintln!("### Histograms");
            let mut keys: Vec<_> = histograms.keys().collect();
            keys.sort();
            for key in keys {
                let values = &histograms[key];
                if values.is_empty() {
                    continue;
                }
                let min = values.iter().copied().fold(f64::INFINITY, f64::min);
                let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                #[allow(clippy::cast_precision_loss)]
                let avg = values.iter().sum::<f64>() / values.len() as f64;
                eprintln!(
                    "  {key}: count={}, min={min:.0}, max={max:.0}, avg={avg:.3}",
                    values.len()
                );
            }
        }
    }
}
