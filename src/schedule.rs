//! Delivery window evaluation for a visiting order.
//!
//! The clock starts at the departure instant at `route[0]` and advances by the
//! travel duration of each leg. Arriving before a window opens waits for it;
//! arriving after it closes is recorded as a [`Violation`]. Violations are
//! advisory: they never make an optimisation fail.

use chrono::{NaiveDateTime, TimeDelta};

use crate::error::InputShapeError;
use crate::matrix::CostMatrix;
use crate::model::{format_time_of_day, Stop, Violation};

/// Walk `route` (indices into `stops` and `durations`) and report every stop
/// reached after its window's closing bound, in visiting order.
///
/// `route[0]` is the departure point and is never checked, including when a
/// closed tour returns to it. Window bounds are read on the running clock's
/// calendar date. A leg with no known duration makes every later arrival
/// unknowable, so evaluation stops there.
///
/// Fails when `durations` is not sized to `stops` or the route indexes past it.
pub fn evaluate_schedule(
    route: &[usize],
    stops: &[Stop],
    durations: &CostMatrix,
    departure: NaiveDateTime,
) -> Result<Vec<Violation>, InputShapeError> {
    if durations.size() != stops.len() {
        return Err(InputShapeError::DimensionMismatch {
            what: "duration matrix",
            expected: stops.len(),
            found: durations.size(),
        });
    }
    durations.check_route(route)?;

    let mut violations = Vec::new();
    let mut clock = departure;
    let departure_point = route.first().copied();

    for (position, leg) in route.windows(2).enumerate() {
        let (from, to) = (leg[0], leg[1]);
        let Some(arrival) = advance(clock, durations.get(from, to)) else {
            tracing::warn!(
                position = position + 1,
                from,
                to,
                "no travel time for leg; remaining windows not evaluated"
            );
            break;
        };
        clock = arrival;
        if Some(to) == departure_point {
            continue;
        }

        let stop = &stops[to];
        if let Some(start) = stop.window_start {
            let opens = clock.date().and_time(start);
            if clock < opens {
                clock = opens;
            }
        }

        if let Some(end) = stop.window_end {
            let closes = clock.date().and_time(end);
            if clock > closes {
                let minutes_late = minutes_between(closes, clock);
                tracing::debug!(stop_id = %stop.id, minutes_late, "delivery window missed");
                violations.push(Violation {
                    stop_id: stop.id.clone(),
                    arrival_time: format_time_of_day(arrival.time()),
                    window_start: stop.window_start,
                    window_end: end,
                    minutes_late,
                });
            }
        }
    }

    Ok(violations)
}

fn advance(clock: NaiveDateTime, seconds: f64) -> Option<NaiveDateTime> {
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    let delta = TimeDelta::try_milliseconds((seconds * 1000.0).round() as i64)?;
    clock.checked_add_signed(delta)
}

/// Whole minutes, rounded, never below one for a strictly later instant.
fn minutes_between(earlier: NaiveDateTime, later: NaiveDateTime) -> u32 {
    let seconds = (later - earlier).num_seconds() as f64;
    (seconds / 60.0).round().max(1.0) as u32
}
