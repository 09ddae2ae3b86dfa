//! Error taxonomy for the planner.
//!
//! Provider-call failures and caller shape errors are distinct variants so
//! callers can branch on kind. Per-cell unreachability is not an error; it is
//! folded into the matrix as the `UNREACHABLE` sentinel.

use thiserror::Error;

/// Failure of a single cost-matrix provider call.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network, timeout or HTTP-status failure.
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    /// The provider answered but reported a non-OK status for the whole call.
    #[error("provider returned {code}: {message}")]
    Service { code: String, message: String },
    /// The response could not be interpreted.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

/// Caller supplied input that violates the planner's contract.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputShapeError {
    #[error("at least {min} points are required, got {found}")]
    TooFewStops { min: usize, found: usize },
    #[error("at most {max} stops are allowed, got {found}")]
    TooManyStops { max: usize, found: usize },
    #[error("matrix row {row} has {found} columns, expected {expected}")]
    NonSquareMatrix {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("{what} has size {found}, expected {expected}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("route index {index} is out of range for {size} points")]
    RouteIndexOutOfRange { index: usize, size: usize },
    #[error("stop {stop_id}: {reason}")]
    InvalidStop { stop_id: String, reason: String },
    #[error("invalid time of day {0:?}, expected HH:MM")]
    InvalidTime(String),
}

/// Top-level error returned by matrix building and optimisation.
#[derive(Debug, Error)]
pub enum PlannerError {
    /// A provider call failed; the whole build fails closed.
    #[error("cost-matrix provider failed on batch {batch}: {source}")]
    ProviderTransport {
        batch: usize,
        #[source]
        source: ProviderError,
    },
    #[error(transparent)]
    InputShape(#[from] InputShapeError),
    #[error("operation cancelled")]
    Cancelled,
}

impl PlannerError {
    pub fn is_transport(&self) -> bool {
        matches!(self, PlannerError::ProviderTransport { .. })
    }

    pub fn is_input_shape(&self) -> bool {
        matches!(self, PlannerError::InputShape(_))
    }
}
