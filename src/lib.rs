//! route-planner core
//!
//! Single-vehicle route optimisation: cost matrix construction, a
//! nearest-neighbour + 2-opt tour heuristic, delivery window evaluation and
//! delivery pricing.

pub mod config;
pub mod error;
pub mod format;
pub mod haversine;
pub mod matrix;
pub mod model;
pub mod osrm;
pub mod plan;
pub mod pricing;
pub mod rate_limiter;
pub mod schedule;
pub mod solver;
pub mod traits;

pub use error::{InputShapeError, PlannerError, ProviderError};
pub use matrix::{CostMatrix, MatrixBuilder, MatrixConfig, MatrixPair, UNREACHABLE};
pub use model::{Stop, Violation};
pub use pricing::{calculate_delivery_price, PriceBreakdown, PricingConfig};
pub use solver::{optimize_route, OptimizationResult, OptimizeOptions};
