//! Chronological checks on a specialist's weekly availability.
//!
//! Everything here is pure: callers run it before any write and turn the
//! returned error into a response. Times are compared as minutes since
//! midnight, and a range never crosses midnight.

use thiserror::Error;
use tracing::debug;

use shared_models::error::ErrorDetail;

use crate::models::{error_codes, range_path, DaySchedule, TimeOfDay, TimeRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("Start time {start} must be earlier than end time {end}")]
    InvalidOrder { start: TimeOfDay, end: TimeOfDay },
}

/// Two ranges of the same day that overlap, in start-time order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Time ranges for day '{day}' overlap ({first} and {second})")]
pub struct OverlapError {
    pub day: String,
    pub first: TimeRange,
    pub second: TimeRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("Invalid range {range_index} on day {day_index}: {source}")]
    InvalidRangeOrder {
        day_index: usize,
        range_index: usize,
        #[source]
        source: RangeError,
    },

    #[error(transparent)]
    Overlap(#[from] OverlapError),
}

impl ScheduleError {
    pub fn code(&self) -> &'static str {
        match self {
            ScheduleError::InvalidRangeOrder { .. } => error_codes::INVALID_RANGE_ORDER,
            ScheduleError::Overlap(_) => error_codes::OVERLAPPING_SCHEDULES,
        }
    }

    /// Path of the offending range. Overlaps are reported for the whole day.
    pub fn field(&self) -> Option<String> {
        match self {
            ScheduleError::InvalidRangeOrder { day_index, range_index, .. } => {
                Some(range_path(*day_index, *range_index))
            }
            ScheduleError::Overlap(_) => None,
        }
    }

    pub fn to_error_detail(&self) -> ErrorDetail {
        let message = match self {
            ScheduleError::InvalidRangeOrder { source, .. } => source.to_string(),
            ScheduleError::Overlap(overlap) => overlap.to_string(),
        };

        let detail = ErrorDetail::new(self.code(), message);
        match self.field() {
            Some(field) => detail.with_field(field),
            None => detail,
        }
    }
}

pub fn validate_range(range: &TimeRange) -> Result<(), RangeError> {
    if range.start.minutes_since_midnight() >= range.end.minutes_since_midnight() {
        return Err(RangeError::InvalidOrder {
            start: range.start,
            end: range.end,
        });
    }
    Ok(())
}

/// Reports the first overlapping pair among one day's ranges.
///
/// Ranges are sorted by start time (stable), after which only neighbours
/// need comparing: if no adjacent pair overlaps, no pair does. Ranges that
/// merely touch (`09:00-10:00`, `10:00-11:00`) do not overlap.
pub fn check_overlaps(ranges: &[TimeRange], day: &str) -> Option<OverlapError> {
    if ranges.len() < 2 {
        return None;
    }

    let mut sorted: Vec<&TimeRange> = ranges.iter().collect();
    sorted.sort_by_key(|range| range.start.minutes_since_midnight());

    sorted
        .windows(2)
        .find(|pair| pair[0].end.minutes_since_midnight() > pair[1].start.minutes_since_midnight())
        .map(|pair| OverlapError {
            day: day.to_string(),
            first: *pair[0],
            second: *pair[1],
        })
}

/// Validates every day in order and stops at the first problem.
///
/// Each day's ranges are checked for ordering before that day is checked
/// for overlaps. Days sharing a label are validated independently.
pub fn validate_weekly_schedule(schedule: Option<&[DaySchedule]>) -> Result<(), ScheduleError> {
    let Some(days) = schedule else {
        return Ok(());
    };

    for (day_index, day) in days.iter().enumerate() {
        for (range_index, range) in day.ranges.iter().enumerate() {
            validate_range(range).map_err(|source| ScheduleError::InvalidRangeOrder {
                day_index,
                range_index,
                source,
            })?;
        }

        if let Some(overlap) = check_overlaps(&day.ranges, &day.day) {
            debug!("Overlapping ranges on '{}': {} and {}", overlap.day, overlap.first, overlap.second);
            return Err(overlap.into());
        }
    }

    Ok(())
}
