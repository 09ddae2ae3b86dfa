//! Test fixtures for route-planner.
//!
//! Provides realistic test data:
//! - Real Campinas (SP) delivery locations
//! - Builders for stops and small hand-written matrices

#![allow(dead_code)]

pub mod campinas_locations;

pub use campinas_locations::*;

use route_planner::matrix::{CostMatrix, MatrixPair};
use route_planner::model::Stop;

/// Stops named `s0..s{n}` with no windows; coordinates are irrelevant when a
/// hand-written matrix is used.
pub fn plain_stops(n: usize) -> Vec<Stop> {
    (0..n)
        .map(|i| Stop::new(format!("s{}", i), format!("Stop {}", i), 0.0, 0.0))
        .collect()
}

/// Distance and duration matrices from points on a line: distance is
/// |a - b| metres and duration is the same number of seconds.
pub fn line_matrices(xs: &[f64]) -> MatrixPair {
    let rows: Vec<Vec<f64>> = xs
        .iter()
        .map(|a| xs.iter().map(|b| (a - b).abs()).collect())
        .collect();
    let distances = CostMatrix::from_rows(rows.clone()).expect("square");
    let durations = CostMatrix::from_rows(rows).expect("square");
    MatrixPair::new(distances, durations).expect("same size")
}

/// Euclidean matrices from planar points; durations equal distances.
pub fn planar_matrices(points: &[(f64, f64)]) -> MatrixPair {
    let rows: Vec<Vec<f64>> = points
        .iter()
        .map(|(ax, ay)| {
            points
                .iter()
                .map(|(bx, by)| ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt())
                .collect()
        })
        .collect();
    MatrixPair::new(
        CostMatrix::from_rows(rows.clone()).expect("square"),
        CostMatrix::from_rows(rows).expect("square"),
    )
    .expect("same size")
}
