//! Core data model: stops, delivery windows and window violations.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::InputShapeError;

/// Minimum number of points an optimisation needs.
pub const MIN_STOPS: usize = 2;

/// Maximum number of stops accepted in a single plan.
pub const MAX_STOPS: usize = 50;

/// A delivery stop.
///
/// Stops are never mutated by the planner; the optimiser only reorders
/// indices into the caller's stop list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    pub id: String,
    pub label: String,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    /// Earliest acceptable arrival (wall clock, minute precision).
    #[serde(default, with = "hhmm", skip_serializing_if = "Option::is_none")]
    pub window_start: Option<NaiveTime>,
    /// Latest acceptable arrival (wall clock, minute precision).
    #[serde(default, with = "hhmm", skip_serializing_if = "Option::is_none")]
    pub window_end: Option<NaiveTime>,
}

impl Stop {
    pub fn new(id: impl Into<String>, label: impl Into<String>, lat: f64, lng: f64) -> Self {
        let label = label.into();
        Self {
            id: id.into(),
            address: label.clone(),
            label,
            lat,
            lng,
            window_start: None,
            window_end: None,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn with_window(mut self, start: Option<NaiveTime>, end: Option<NaiveTime>) -> Self {
        self.window_start = start;
        self.window_end = end;
        self
    }

    /// Location as (lat, lng).
    pub fn location(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }

    pub fn has_window(&self) -> bool {
        self.window_start.is_some() || self.window_end.is_some()
    }

    pub fn validate(&self) -> Result<(), InputShapeError> {
        let invalid = |reason: &str| InputShapeError::InvalidStop {
            stop_id: self.id.clone(),
            reason: reason.to_string(),
        };

        if self.label.trim().is_empty() {
            return Err(invalid("label is required"));
        }
        if self.address.trim().is_empty() {
            return Err(invalid("address is required"));
        }
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(invalid("latitude out of range"));
        }
        if !self.lng.is_finite() || !(-180.0..=180.0).contains(&self.lng) {
            return Err(invalid("longitude out of range"));
        }
        if let (Some(start), Some(end)) = (self.window_start, self.window_end) {
            if start > end {
                return Err(invalid("window start is after window end"));
            }
        }
        Ok(())
    }
}

/// Validate a caller-assembled stop list before building a matrix for it.
pub fn validate_stop_list(stops: &[Stop]) -> Result<(), InputShapeError> {
    if stops.len() < MIN_STOPS {
        return Err(InputShapeError::TooFewStops {
            min: MIN_STOPS,
            found: stops.len(),
        });
    }
    if stops.len() > MAX_STOPS {
        return Err(InputShapeError::TooManyStops {
            max: MAX_STOPS,
            found: stops.len(),
        });
    }
    stops.iter().try_for_each(Stop::validate)
}

/// A stop whose arrival breached its window's closing bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub stop_id: String,
    /// Arrival as `HH:MM`.
    pub arrival_time: String,
    #[serde(default, with = "hhmm", skip_serializing_if = "Option::is_none")]
    pub window_start: Option<NaiveTime>,
    #[serde(with = "hhmm_required")]
    pub window_end: NaiveTime,
    pub minutes_late: u32,
}

/// Parse a wall-clock `H:MM` / `HH:MM` string.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, InputShapeError> {
    let invalid = || InputShapeError::InvalidTime(value.to_string());

    let (hours, minutes) = value.split_once(':').ok_or_else(invalid)?;
    if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
        return Err(invalid());
    }
    if !hours.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let hours: u32 = hours.parse().map_err(|_| invalid())?;
    let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
    NaiveTime::from_hms_opt(hours, minutes, 0).ok_or_else(invalid)
}

pub fn format_time_of_day(time: NaiveTime) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(time) => serializer.serialize_str(&super::format_time_of_day(*time)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref() {
            None | Some("") => Ok(None),
            Some(text) => super::parse_time_of_day(text)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}

mod hhmm_required {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_time_of_day(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time_of_day(&raw).map_err(serde::de::Error::custom)
    }
}
