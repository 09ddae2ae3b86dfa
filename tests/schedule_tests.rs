//! Delivery window evaluation tests.

mod fixtures;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use route_planner::error::InputShapeError;
use route_planner::matrix::CostMatrix;
use route_planner::model::Stop;
use route_planner::schedule::evaluate_schedule;
use route_planner::solver::{optimize_route, OptimizeOptions};

use fixtures::line_matrices;

fn at(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 4)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn stop(id: &str) -> Stop {
    Stop::new(id, id.to_uppercase(), 0.0, 0.0)
}

fn durations(rows: Vec<Vec<f64>>) -> CostMatrix {
    CostMatrix::from_rows(rows).unwrap()
}

#[test]
fn test_early_arrival_waits_for_window() {
    // Depart 08:00, reach A at 08:30 (window opens 09:00), B ten minutes later.
    let stops = vec![
        stop("origin"),
        stop("a").with_window(Some(hm(9, 0)), Some(hm(10, 0))),
        stop("b").with_window(None, Some(hm(9, 5))),
    ];
    let d = durations(vec![
        vec![0.0, 1800.0, 0.0],
        vec![1800.0, 0.0, 600.0],
        vec![0.0, 600.0, 0.0],
    ]);

    let violations = evaluate_schedule(&[0, 1, 2], &stops, &d, at(8, 0)).unwrap();

    // A is fine; the wait pushes B to 09:10, five minutes late.
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].stop_id, "b");
    assert_eq!(violations[0].arrival_time, "09:10");
    assert_eq!(violations[0].minutes_late, 5);
}

#[test]
fn test_late_arrival_is_reported() {
    let stops = vec![
        stop("origin"),
        stop("a").with_window(Some(hm(9, 0)), Some(hm(10, 0))),
    ];
    // 08:00 + 2h15m = 10:15
    let d = durations(vec![vec![0.0, 8100.0], vec![8100.0, 0.0]]);

    let violations = evaluate_schedule(&[0, 1], &stops, &d, at(8, 0)).unwrap();

    assert_eq!(violations.len(), 1);
    let v = &violations[0];
    assert_eq!(v.stop_id, "a");
    assert_eq!(v.arrival_time, "10:15");
    assert_eq!(v.window_start, Some(hm(9, 0)));
    assert_eq!(v.window_end, hm(10, 0));
    assert_eq!(v.minutes_late, 15);
}

#[test]
fn test_arrival_exactly_at_close_is_on_time() {
    let stops = vec![stop("origin"), stop("a").with_window(None, Some(hm(9, 0)))];
    let d = durations(vec![vec![0.0, 3600.0], vec![3600.0, 0.0]]);
    assert!(evaluate_schedule(&[0, 1], &stops, &d, at(8, 0)).unwrap().is_empty());
}

#[test]
fn test_stops_without_window_are_not_evaluated() {
    let stops = vec![stop("origin"), stop("a"), stop("b")];
    let d = durations(vec![
        vec![0.0, 50_000.0, 0.0],
        vec![50_000.0, 0.0, 50_000.0],
        vec![0.0, 50_000.0, 0.0],
    ]);
    assert!(evaluate_schedule(&[0, 1, 2], &stops, &d, at(20, 0)).unwrap().is_empty());
}

#[test]
fn test_open_only_window_never_violates() {
    let stops = vec![stop("origin"), stop("a").with_window(Some(hm(9, 0)), None)];
    let d = durations(vec![vec![0.0, 36_000.0], vec![36_000.0, 0.0]]);
    assert!(evaluate_schedule(&[0, 1], &stops, &d, at(8, 0)).unwrap().is_empty());
}

#[test]
fn test_legs_use_stop_list_indices() {
    // Visiting order 0 -> 2 -> 1; the matrix is asymmetric so a positional
    // lookup (0->1, 1->2) would give different times.
    let stops = vec![
        stop("origin"),
        stop("a").with_window(None, Some(hm(8, 30))),
        stop("b").with_window(None, Some(hm(8, 10))),
    ];
    let d = durations(vec![
        vec![0.0, 60.0, 300.0],
        vec![60.0, 0.0, 60.0],
        vec![300.0, 1800.0, 0.0],
    ]);

    let violations = evaluate_schedule(&[0, 2, 1], &stops, &d, at(8, 0)).unwrap();

    // B at 08:05 (on time), A at 08:35 (five minutes late).
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].stop_id, "a");
    assert_eq!(violations[0].minutes_late, 5);
}

#[test]
fn test_violations_follow_visiting_order() {
    let stops = vec![
        stop("origin"),
        stop("a").with_window(None, Some(hm(8, 0))),
        stop("b").with_window(None, Some(hm(8, 0))),
    ];
    let d = durations(vec![
        vec![0.0, 600.0, 600.0],
        vec![600.0, 0.0, 600.0],
        vec![600.0, 600.0, 0.0],
    ]);

    let ids: Vec<String> = evaluate_schedule(&[0, 2, 1], &stops, &d, at(8, 0)).unwrap()
        .into_iter()
        .map(|v| v.stop_id)
        .collect();
    assert_eq!(ids, vec!["b", "a"]);
}

#[test]
fn test_unreachable_leg_stops_evaluation() {
    let stops = vec![
        stop("origin"),
        stop("a").with_window(None, Some(hm(8, 0))),
        stop("b").with_window(None, Some(hm(8, 0))),
    ];
    let d = durations(vec![
        vec![0.0, 600.0, f64::INFINITY],
        vec![600.0, 0.0, f64::INFINITY],
        vec![f64::INFINITY, f64::INFINITY, 0.0],
    ]);

    let violations = evaluate_schedule(&[0, 1, 2], &stops, &d, at(8, 0)).unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].stop_id, "a");
}

#[test]
fn test_stop_list_shorter_than_matrix_is_rejected() {
    let stops = vec![stop("origin"), stop("a")];
    let d = durations(vec![
        vec![0.0, 60.0, 60.0],
        vec![60.0, 0.0, 60.0],
        vec![60.0, 60.0, 0.0],
    ]);

    let err = evaluate_schedule(&[0, 1, 2], &stops, &d, at(8, 0)).unwrap_err();
    assert!(matches!(
        err,
        InputShapeError::DimensionMismatch { expected: 2, found: 3, .. }
    ));
}

#[test]
fn test_route_index_outside_stop_list_is_rejected() {
    let stops = vec![stop("origin"), stop("a")];
    let d = durations(vec![vec![0.0, 60.0], vec![60.0, 0.0]]);

    let err = evaluate_schedule(&[0, 1, 2], &stops, &d, at(8, 0)).unwrap_err();
    assert_eq!(err, InputShapeError::RouteIndexOutOfRange { index: 2, size: 2 });
}

#[test]
fn test_closed_tour_never_checks_origin_window() {
    // The depot closes at 08:15; the van is back at 08:20.
    let stops = vec![stop("origin").with_window(None, Some(hm(8, 15))), stop("a")];
    let m = line_matrices(&[0.0, 600.0]);
    let options = OptimizeOptions {
        return_to_start: true,
        departure: Some(at(8, 0)),
        ..OptimizeOptions::default()
    };

    let result = optimize_route(&stops, &m, &options).unwrap();
    assert_eq!(result.route, vec![0, 1, 0]);
    assert!(result.violations.is_empty());
}

#[test]
fn test_optimizer_reports_violations_without_failing() {
    let stops = vec![
        stop("origin"),
        stop("a").with_window(None, Some(hm(8, 0))),
        stop("b"),
    ];
    let m = line_matrices(&[0.0, 600.0, 1200.0]);
    let options = OptimizeOptions {
        return_to_start: false,
        departure: Some(at(8, 0)),
        ..OptimizeOptions::default()
    };

    let result = optimize_route(&stops, &m, &options).unwrap();
    assert_eq!(result.route, vec![0, 1, 2]);
    assert_eq!(result.violations.len(), 1);
    assert_eq!(result.violations[0].minutes_late, 10);
}
