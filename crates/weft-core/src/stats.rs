//! Per-run execution statistics.
//!
//! The collector is an explicit value owned by the caller: there is no
//! process-wide singleton and no background reporter thread. Callers pass a
//! collector into the operations they care about and render the report when
//! it suits them.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

/// Aggregated figures for one named operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpStats {
    /// Number of invocations recorded.
    pub count: u64,
    /// Cumulative elapsed time across all invocations.
    pub elapsed: Duration,
}

impl OpStats {
    /// Invocations per second over the recorded elapsed time.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn throughput(&self) -> f64 {
        if self.elapsed.is_zero() {
            return 0.0;
        }
        self.count as f64 / self.elapsed.as_secs_f64()
    }

    /// Mean latency per invocation, in milliseconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_latency_ms(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.elapsed.as_secs_f64() * 1_000.0 / self.count as f64
    }
}

/// Per-operation counters and elapsed time for one sequence of runs.
#[derive(Debug, Clone, Default)]
pub struct ExecutionStats {
    ops: BTreeMap<String, OpStats>,
}

impl ExecutionStats {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one invocation of `name` that took `elapsed`.
    pub fn record(&mut self, name: &str, elapsed: Duration) {
        let entry = self.ops.entry(name.to_string()).or_default();
        entry.count += 1;
        entry.elapsed += elapsed;
    }

    /// Execute `f`, recording its duration under `name`.
    pub fn measure<R>(&mut self, name: &str, f: impl FnOnce() -> R) -> R {
        let started = Instant::now();
        let result = f();
        self.record(name, started.elapsed());
        result
    }

    /// Figures for one operation, if it was ever recorded.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&OpStats> {
        self.ops.get(name)
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Render the per-operation figures and totals as a plain-text report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut out = String::from("-----------\n");
        let mut total_ops = 0u64;
        let mut total_elapsed = Duration::ZERO;

        for (name, stats) in &self.ops {
            out.push_str(&format!(
                "{name}: {{n_ops={}, elapsed_ms={}, ops/s={:.1}, ms/op={:.3}}}\n",
                stats.count,
                stats.elapsed.as_millis(),
                stats.throughput(),
                stats.mean_latency_ms(),
            ));
            total_ops += stats.count;
            total_elapsed += stats.elapsed;
        }

        out.push_str("-----------\n");
        out.push_str(&format!(
            "total ops: {total_ops}, total ms: {}\n",
            total_elapsed.as_millis()
        ));
        out
    }
}

impl fmt::Display for ExecutionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.report())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
