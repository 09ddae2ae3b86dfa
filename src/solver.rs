//! Single-vehicle route optimiser: nearest-neighbour seed + 2-opt.

use chrono::{Local, NaiveDateTime};
use rayon::prelude::*;
use tokio_util::sync::CancellationToken;

use crate::error::{InputShapeError, PlannerError};
use crate::matrix::{CostMatrix, MatrixPair};
use crate::model::{Stop, Violation, MIN_STOPS};
use crate::schedule::evaluate_schedule;

/// Deltas above this are treated as float noise, not improvements.
const IMPROVEMENT_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct OptimizeOptions {
    /// Close the tour by returning to index 0.
    pub return_to_start: bool,
    /// Maximum number of full 2-opt passes.
    pub max_iterations: usize,
    /// Departure instant for window evaluation; local now when `None`.
    pub departure: Option<NaiveDateTime>,
    /// Checked at every 2-opt pass boundary.
    pub cancel: Option<CancellationToken>,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            return_to_start: true,
            max_iterations: 100,
            departure: None,
            cancel: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Visiting order as indices into the stop list; ends with 0 when the tour is closed.
    pub route: Vec<usize>,
    pub total_distance_meters: f64,
    pub total_duration_sec: f64,
    pub violations: Vec<Violation>,
    /// Number of 2-opt passes executed.
    pub passes: usize,
}

#[derive(Debug, Clone)]
pub struct TwoOptOutcome {
    pub route: Vec<usize>,
    pub passes: usize,
    /// Number of reversals applied.
    pub improvements: usize,
    pub cancelled: bool,
}

/// One independent optimisation job for [`optimize_batch`].
#[derive(Debug, Clone)]
pub struct OptimizeRequest {
    pub stops: Vec<Stop>,
    pub matrices: MatrixPair,
    pub options: OptimizeOptions,
}

/// Greedy tour from index 0: always move to the nearest unvisited index.
///
/// Ties go to the lowest index. When every remaining hop is unreachable the
/// lowest unvisited index is taken anyway, so the result is always a
/// permutation of `0..n`.
pub fn nearest_neighbor(distances: &CostMatrix) -> Vec<usize> {
    let n = distances.size();
    if n == 0 {
        return Vec::new();
    }

    let mut visited = vec![false; n];
    let mut route = Vec::with_capacity(n);
    route.push(0);
    visited[0] = true;

    while route.len() < n {
        let last = route[route.len() - 1];
        let mut best: Option<(usize, f64)> = None;
        for (candidate, _) in visited.iter().enumerate().filter(|(_, seen)| !**seen) {
            let d = distances.get(last, candidate);
            match best {
                Some((_, best_d)) if d >= best_d => {}
                _ => best = Some((candidate, d)),
            }
        }

        let Some((next, _)) = best else { break };
        visited[next] = true;
        route.push(next);
    }

    route
}

/// First-improvement 2-opt with both endpoints fixed.
///
/// Each pass scans every `(i, j)` with `1 <= i < j < len - 1` and reverses
/// `route[i..=j]` as soon as it shortens the path. Passes repeat until one
/// finds nothing, `max_iterations` passes have run, or `cancel` fires.
pub fn two_opt(
    mut route: Vec<usize>,
    distances: &CostMatrix,
    max_iterations: usize,
    cancel: Option<&CancellationToken>,
) -> Result<TwoOptOutcome, InputShapeError> {
    distances.check_route(&route)?;
    let len = route.len();
    let mut passes = 0;
    let mut improvements = 0;
    let mut cancelled = false;

    if len < 4 {
        return Ok(TwoOptOutcome {
            route,
            passes,
            improvements,
            cancelled,
        });
    }

    while passes < max_iterations {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            tracing::warn!(passes, "2-opt cancelled; keeping best route so far");
            cancelled = true;
            break;
        }

        passes += 1;
        let mut improved = false;

        for i in 1..len - 2 {
            for j in i + 1..len - 1 {
                if reversal_delta(&route, distances, i, j) < -IMPROVEMENT_EPSILON {
                    route[i..=j].reverse();
                    improvements += 1;
                    improved = true;
                }
            }
        }

        tracing::debug!(pass = passes, improved, "2-opt pass complete");
        if !improved {
            break;
        }
    }

    Ok(TwoOptOutcome {
        route,
        passes,
        improvements,
        cancelled,
    })
}

/// Change in path length from reversing `route[i..=j]`.
fn reversal_delta(route: &[usize], distances: &CostMatrix, i: usize, j: usize) -> f64 {
    let (a, b, c, d) = (route[i - 1], route[i], route[j], route[j + 1]);
    distances.get(a, c) + distances.get(b, d) - distances.get(a, b) - distances.get(c, d)
}

/// Sum of distance and duration over consecutive route legs.
pub fn route_totals(route: &[usize], matrices: &MatrixPair) -> Result<(f64, f64), InputShapeError> {
    matrices.distances.check_route(route)?;
    matrices.durations.check_route(route)?;

    Ok(route.windows(2).fold((0.0, 0.0), |(distance, duration), leg| {
        (
            distance + matrices.distances.get(leg[0], leg[1]),
            duration + matrices.durations.get(leg[0], leg[1]),
        )
    }))
}

/// Optimise the visiting order of `stops` (index 0 is the start).
///
/// Fails only on shape errors: fewer than two stops, or matrices not sized to
/// the stop list. Window violations are reported, never fatal.
pub fn optimize_route(
    stops: &[Stop],
    matrices: &MatrixPair,
    options: &OptimizeOptions,
) -> Result<OptimizationResult, PlannerError> {
    if stops.len() < MIN_STOPS {
        return Err(InputShapeError::TooFewStops {
            min: MIN_STOPS,
            found: stops.len(),
        }
        .into());
    }
    if matrices.distances.size() != stops.len() {
        return Err(InputShapeError::DimensionMismatch {
            what: "distance matrix",
            expected: stops.len(),
            found: matrices.distances.size(),
        }
        .into());
    }
    if matrices.durations.size() != stops.len() {
        return Err(InputShapeError::DimensionMismatch {
            what: "duration matrix",
            expected: stops.len(),
            found: matrices.durations.size(),
        }
        .into());
    }

    let seed = nearest_neighbor(&matrices.distances);
    let outcome = two_opt(
        seed,
        &matrices.distances,
        options.max_iterations,
        options.cancel.as_ref(),
    )?;

    let mut route = outcome.route;
    if options.return_to_start {
        route.push(0);
    }

    let (total_distance_meters, total_duration_sec) = route_totals(&route, matrices)?;
    let departure = options
        .departure
        .unwrap_or_else(|| Local::now().naive_local());
    let violations = evaluate_schedule(&route, stops, &matrices.durations, departure)?;

    tracing::info!(
        stops = stops.len(),
        passes = outcome.passes,
        improvements = outcome.improvements,
        total_distance_meters,
        total_duration_sec,
        violations = violations.len(),
        "route optimised"
    );

    Ok(OptimizationResult {
        route,
        total_distance_meters,
        total_duration_sec,
        violations,
        passes: outcome.passes,
    })
}

/// Optimise independent requests in parallel.
pub fn optimize_batch(requests: &[OptimizeRequest]) -> Vec<Result<OptimizationResult, PlannerError>> {
    requests
        .par_iter()
        .map(|request| optimize_route(&request.stops, &request.matrices, &request.options))
        .collect()
}
