//! Routing diagnostics: timing and counts for each stage of one query.
//!
//! Every call to
//! [`compute_route_with_diagnostics`](crate::RouteOptimizer::compute_route_with_diagnostics)
//! collects these alongside the route. Time is read through the [`Clock`]
//! trait so the engine stays free of platform clocks.
//!
//! Durations are serialized as integer microseconds.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{Algorithm, OrderMode};

/// Time source used to measure stage durations.
pub trait Clock {
    /// Opaque point in time.
    type Instant;

    /// The current instant.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// A clock that never advances. Every duration it reports is zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrozenClock;

impl Clock for FrozenClock {
    type Instant = ();

    fn now(&self) {}

    fn elapsed(&self, _since: &()) -> Duration {
        Duration::ZERO
    }
}

/// `Duration` stored as whole microseconds.
mod micros {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(duration.as_micros()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_micros)
    }
}

/// Diagnostics collected from a single routing query.
///
/// Stages that did not run for the chosen mode and strategy are `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteDiagnostics {
    /// Input validation and connectivity pre-check.
    pub validate: StageDiagnostics,
    /// Distance matrix construction (flexible order only).
    pub matrix: Option<StageDiagnostics>,
    /// Exact solver.
    pub exact: Option<StageDiagnostics>,
    /// MST + 2-opt or nearest-neighbor approximation.
    pub approximation: Option<StageDiagnostics>,
    /// Expansion of stops into road legs.
    pub legs: Option<StageDiagnostics>,
    /// Total wall-clock duration.
    #[serde(with = "micros")]
    pub total_duration: Duration,
    /// Summary of the produced route.
    pub summary: RouteSummary,
}

/// Diagnostics for a single stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage.
    #[serde(with = "micros")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Input validation metrics.
    Validate {
        /// Number of requested locations.
        requested: usize,
        /// Order mode of the query.
        mode: OrderMode,
    },
    /// Distance matrix metrics.
    Matrix {
        /// Matrix dimension.
        size: usize,
        /// Whether the matrix is symmetric.
        symmetric: bool,
        /// Off-diagonal pairs with finite cost.
        finite_pairs: usize,
    },
    /// Exact solver metrics.
    Exact {
        /// Number of DP states (`2^n * n`).
        states: usize,
        /// Optimal cost, infinite if infeasible.
        cost: f64,
    },
    /// Approximation metrics.
    Approximation {
        /// Which approximation ran.
        algorithm: Algorithm,
        /// Cost of the initial tour.
        initial_cost: f64,
        /// Cost after local improvement.
        cost: f64,
        /// Number of 2-opt reversals applied.
        reversals: usize,
    },
    /// Leg expansion metrics.
    Legs {
        /// Number of legs between stops.
        legs: usize,
        /// Nodes in the joined road path.
        path_nodes: usize,
    },
}

/// Summary of the route a query produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteSummary {
    /// Algorithm that produced the order.
    pub algorithm: Algorithm,
    /// Number of stops.
    pub stop_count: usize,
    /// Total travel cost.
    pub total_cost: f64,
    /// Nodes in the road path.
    pub path_nodes: usize,
}

impl RouteDiagnostics {
    /// Names of the stages that ran, in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages().into_iter().map(|(name, _)| name).collect()
    }

    fn stages(&self) -> Vec<(&'static str, &StageDiagnostics)> {
        let mut stages = vec![("Validate", &self.validate)];
        if let Some(ref m) = self.matrix {
            stages.push(("Distance Matrix", m));
        }
        if let Some(ref e) = self.exact {
            stages.push(("Exact DP", e));
        }
        if let Some(ref a) = self.approximation {
            stages.push(("Approximation", a));
        }
        if let Some(ref l) = self.legs {
            stages.push(("Legs", l));
        }
        stages
    }

    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Route Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Algorithm: {}  |  Stops: {}  |  Cost: {:.2}",
            self.summary.algorithm, self.summary.stop_count, self.summary.total_cost,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<18} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);
        for (name, diag) in self.stages() {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<18} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!("Road path nodes: {}", self.summary.path_nodes));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Validate { requested, mode } => format!("{requested} locations, {mode:?}"),
        StageMetrics::Matrix {
            size,
            symmetric,
            finite_pairs,
        } => {
            let kind = if *symmetric { "symmetric" } else { "asymmetric" };
            format!("{size}x{size} {kind}, {finite_pairs} finite pairs")
        }
        StageMetrics::Exact { states, cost } => format!("{states} states, cost={cost:.2}"),
        StageMetrics::Approximation {
            algorithm,
            initial_cost,
            cost,
            reversals,
        } => {
            format!("{algorithm}: {initial_cost:.2} -> {cost:.2} ({reversals} reversals)")
        }
        StageMetrics::Legs { legs, path_nodes } => format!("{legs} legs, {path_nodes} nodes"),
    }
}

/// Run `f`, returning its output and the elapsed time on `clock`.
pub(crate) fn timed<C: Clock, T>(clock: &C, f: impl FnOnce() -> T) -> (T, Duration) {
    let start = clock.now();
    let out = f();
    (out, clock.elapsed(&start))
}
