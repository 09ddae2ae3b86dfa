//! Cost matrices and the batched, rate-limited matrix builder.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::{InputShapeError, PlannerError, ProviderError};
use crate::model::Stop;
use crate::rate_limiter::MinIntervalGate;
use crate::traits::{CostMatrixProvider, LatLng, MatrixCell};

/// Sentinel for "no known route between these two points".
pub const UNREACHABLE: f64 = f64::INFINITY;

/// Square matrix indexed by position in the combined stop list.
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    rows: Vec<Vec<f64>>,
}

impl CostMatrix {
    /// n×n matrix of zeros.
    pub fn zeros(n: usize) -> Self {
        Self {
            rows: vec![vec![0.0; n]; n],
        }
    }

    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, InputShapeError> {
        let n = rows.len();
        if let Some((row, found)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != n)
            .map(|(i, r)| (i, r.len()))
        {
            return Err(InputShapeError::NonSquareMatrix {
                row,
                expected: n,
                found,
            });
        }
        Ok(Self { rows })
    }

    #[inline]
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.rows[from][to]
    }

    pub fn set(&mut self, from: usize, to: usize, value: f64) {
        self.rows[from][to] = value;
    }

    pub fn size(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn is_reachable(&self, from: usize, to: usize) -> bool {
        self.get(from, to).is_finite()
    }

    /// Reject a route that indexes past this matrix.
    pub fn check_route(&self, route: &[usize]) -> Result<(), InputShapeError> {
        let size = self.size();
        match route.iter().find(|&&index| index >= size) {
            Some(&index) => Err(InputShapeError::RouteIndexOutOfRange { index, size }),
            None => Ok(()),
        }
    }
}

/// Distance (metres) and duration (seconds) matrices of equal size.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixPair {
    pub distances: CostMatrix,
    pub durations: CostMatrix,
}

impl MatrixPair {
    pub fn new(distances: CostMatrix, durations: CostMatrix) -> Result<Self, InputShapeError> {
        if distances.size() != durations.size() {
            return Err(InputShapeError::DimensionMismatch {
                what: "duration matrix",
                expected: distances.size(),
                found: durations.size(),
            });
        }
        Ok(Self {
            distances,
            durations,
        })
    }

    pub fn size(&self) -> usize {
        self.distances.size()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixConfig {
    /// Maximum origins (and destinations) per provider call.
    pub batch_size: usize,
    /// Minimum gap between the end of one provider call and the start of the next.
    #[serde(with = "millis")]
    pub min_delay: Duration,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            min_delay: Duration::from_millis(1000),
        }
    }
}

/// Builds full cost matrices from a batch-limited provider.
pub struct MatrixBuilder<P> {
    provider: P,
    batch_size: usize,
    gate: Arc<MinIntervalGate>,
}

impl<P: CostMatrixProvider> MatrixBuilder<P> {
    /// Builder with its own rate-limit gate.
    pub fn new(provider: P, config: MatrixConfig) -> Self {
        let gate = MinIntervalGate::shared(config.min_delay);
        Self::with_gate(provider, config, gate)
    }

    /// Builder sharing `gate` with other builders drawing on the same quota.
    ///
    /// The gate's own delay applies; `config.min_delay` is ignored.
    pub fn with_gate(provider: P, config: MatrixConfig, gate: Arc<MinIntervalGate>) -> Self {
        let batch_size = config.batch_size.min(provider.max_batch()).max(1);
        Self {
            provider,
            batch_size,
            gate,
        }
    }

    pub fn gate(&self) -> &Arc<MinIntervalGate> {
        &self.gate
    }

    pub fn build(&self, stops: &[Stop], origin: Option<&Stop>) -> Result<MatrixPair, PlannerError> {
        self.build_with_cancel(stops, origin, &CancellationToken::new())
    }

    /// Build the matrices for `origin` (index 0, when given) followed by `stops`.
    ///
    /// Any provider failure aborts the whole build; no partial matrix is
    /// returned. Cancellation is checked before each batch.
    pub fn build_with_cancel(
        &self,
        stops: &[Stop],
        origin: Option<&Stop>,
        cancel: &CancellationToken,
    ) -> Result<MatrixPair, PlannerError> {
        if stops.is_empty() {
            return Err(InputShapeError::TooFewStops { min: 1, found: 0 }.into());
        }

        let points: Vec<LatLng> = origin
            .into_iter()
            .chain(stops)
            .map(Stop::location)
            .collect();
        let n = points.len();
        let mut distances = CostMatrix::zeros(n);
        let mut durations = CostMatrix::zeros(n);
        let mut batch = 0;
        let mut unreachable = 0usize;

        for row_start in (0..n).step_by(self.batch_size) {
            let origins = &points[row_start..(row_start + self.batch_size).min(n)];

            for col_start in (0..n).step_by(self.batch_size) {
                let destinations = &points[col_start..(col_start + self.batch_size).min(n)];

                if cancel.is_cancelled() {
                    tracing::warn!(batch, "matrix build cancelled");
                    return Err(PlannerError::Cancelled);
                }

                let table = {
                    let _permit = self.gate.acquire();
                    tracing::debug!(
                        provider = self.provider.name(),
                        batch,
                        row_start,
                        col_start,
                        origins = origins.len(),
                        destinations = destinations.len(),
                        "requesting matrix batch"
                    );
                    self.provider.table(origins, destinations)
                }
                .map_err(|source| PlannerError::ProviderTransport { batch, source })?;

                if table.len() != origins.len() || table.iter().any(|row| row.len() != destinations.len()) {
                    return Err(PlannerError::ProviderTransport {
                        batch,
                        source: ProviderError::MalformedResponse(format!(
                            "expected a {}x{} table",
                            origins.len(),
                            destinations.len()
                        )),
                    });
                }

                for (dr, row) in table.into_iter().enumerate() {
                    for (dc, cell) in row.into_iter().enumerate() {
                        let (i, j) = (row_start + dr, col_start + dc);
                        let cell = match cell {
                            MatrixCell::Ok {
                                distance_m,
                                duration_s,
                            } if !is_cost(distance_m) || !is_cost(duration_s) => MatrixCell::Unreachable,
                            other => other,
                        };
                        let (distance, duration) = match cell {
                            MatrixCell::Ok {
                                distance_m,
                                duration_s,
                            } => (distance_m, duration_s),
                            MatrixCell::Unreachable if i == j => (0.0, 0.0),
                            MatrixCell::Unreachable => {
                                unreachable += 1;
                                (UNREACHABLE, UNREACHABLE)
                            }
                        };
                        distances.set(i, j, distance);
                        durations.set(i, j, duration);
                    }
                }

                batch += 1;
            }
        }

        if unreachable > 0 {
            tracing::warn!(unreachable, "provider reported unreachable pairs");
        }
        tracing::info!(points = n, batches = batch, "cost matrix built");

        Ok(MatrixPair {
            distances,
            durations,
        })
    }
}

/// Negative, NaN and infinite provider values count as "no route".
fn is_cost(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
