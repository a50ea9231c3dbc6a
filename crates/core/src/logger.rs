//! Metrics sink consumed by the search engine.

use std::collections::BTreeMap;
use tracing::info;

/// Receives search diagnostics.
pub trait MetricsLogger: Send + Sync {
    /// Logs a set of named scalar metrics.
    fn log(&self, metrics: &BTreeMap<String, f64>);

    /// Logs a named 2D array, row-major.
    fn log_array(&self, name: &str, values: &[Vec<f32>]);
}

/// Discards everything. The default logger.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopLogger;

impl MetricsLogger for NoopLogger {
    fn log(&self, _metrics: &BTreeMap<String, f64>) {}

    fn log_array(&self, _name: &str, _values: &[Vec<f32>]) {}
}

/// Forwards metrics to `tracing` at info level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl MetricsLogger for TracingLogger {
    fn log(&self, metrics: &BTreeMap<String, f64>) {
        for (name, value) in metrics {
            info!(metric = name.as_str(), value, "search metric");
        }
    }

    fn log_array(&self, name: &str, values: &[Vec<f32>]) {
        for (row, cells) in values.iter().enumerate() {
            let rendered: Vec<String> = cells.iter().map(|v| format!("{v:+.2}")).collect();
            info!(array = name, row, "{}", rendered.join(" "));
        }
    }
}
