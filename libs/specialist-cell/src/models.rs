use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveTime, Timelike, Utc};
use regex::Regex;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use shared_models::error::{AppError, ErrorDetail};
use shared_utils::serde_helpers::double_option;

/// Wire names of the specialist fields, also used as error paths.
pub mod fields {
    pub const FULL_NAME: &str = "nombre_completo";
    pub const SPECIALTY: &str = "especialidad";
    pub const REGISTRATION_NUMBER: &str = "registro_profesional";
    pub const SCHEDULE: &str = "dias_y_horas_atencion";
    pub const DAY: &str = "dia";
    pub const RANGES: &str = "rangos";
    pub const START: &str = "inicio";
    pub const END: &str = "fin";
}

pub mod error_codes {
    pub const REQUIRED: &str = "E_REQUIRED";
    pub const MIN_LENGTH: &str = "E_MIN_LENGTH";
    pub const INVALID_TIME_FORMAT: &str = "E_INVALID_TIME_FORMAT";
    pub const INVALID_PAYLOAD: &str = "E_INVALID_PAYLOAD";
    pub const INVALID_RANGE_ORDER: &str = "E_INVALID_RANGE_ORDER";
    pub const OVERLAPPING_SCHEDULES: &str = "E_OVERLAPPING_SCHEDULES";
    pub const UNIQUE: &str = "E_UNIQUE";
}

/// `dias_y_horas_atencion.<day>.rangos.<range>`
pub fn range_path(day_index: usize, range_index: usize) -> String {
    format!("{}.{}.{}.{}", fields::SCHEDULE, day_index, fields::RANGES, range_index)
}

fn time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]{2}:[0-9]{2}$").unwrap())
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeParseError {
    #[error("'{0}' does not match the HH:MM format")]
    InvalidFormat(String),

    #[error("'{0}' is not a valid time of day (hour 00-23, minute 00-59)")]
    OutOfRange(String),
}

/// Wall-clock time of day with minute resolution, written as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn parse(value: &str) -> Result<Self, TimeParseError> {
        if !time_pattern().is_match(value) {
            return Err(TimeParseError::InvalidFormat(value.to_string()));
        }

        // The pattern guarantees two ASCII digits on each side of the colon.
        let hour: u32 = value[0..2].parse().map_err(|_| TimeParseError::InvalidFormat(value.to_string()))?;
        let minute: u32 = value[3..5].parse().map_err(|_| TimeParseError::InvalidFormat(value.to_string()))?;

        Self::from_hm(hour, minute).ok_or_else(|| TimeParseError::OutOfRange(value.to_string()))
    }

    pub fn minutes_since_midnight(&self) -> u32 {
        self.0.hour() * 60 + self.0.minute()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0.hour(), self.0.minute())
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        TimeOfDay::parse(&raw).map_err(de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    #[serde(rename = "inicio", alias = "start")]
    pub start: TimeOfDay,
    #[serde(rename = "fin", alias = "end")]
    pub end: TimeOfDay,
}

impl TimeRange {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// One day's label and its availability ranges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    #[serde(rename = "dia", alias = "day")]
    pub day: String,
    #[serde(rename = "rangos", alias = "ranges")]
    pub ranges: Vec<TimeRange>,
}

pub type WeeklySchedule = Vec<DaySchedule>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specialist {
    pub id: i64,
    #[serde(rename = "nombre_completo", alias = "full_name")]
    pub full_name: String,
    #[serde(rename = "especialidad", alias = "specialty")]
    pub specialty: String,
    #[serde(rename = "registro_profesional", alias = "registration_number")]
    pub registration_number: String,
    #[serde(rename = "dias_y_horas_atencion", alias = "schedule", default)]
    pub schedule: Option<WeeklySchedule>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Raw request bodies. Every field is optional here so that missing values
// surface as field-level validation errors instead of a parse failure.

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeRangeInput {
    #[serde(rename = "inicio", alias = "start", default)]
    pub start: Option<String>,
    #[serde(rename = "fin", alias = "end", default)]
    pub end: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DayScheduleInput {
    #[serde(rename = "dia", alias = "day", default)]
    pub day: Option<String>,
    #[serde(rename = "rangos", alias = "ranges", default)]
    pub ranges: Option<Vec<TimeRangeInput>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateSpecialistRequest {
    #[serde(rename = "nombre_completo", alias = "full_name", default)]
    pub full_name: Option<String>,
    #[serde(rename = "especialidad", alias = "specialty", default)]
    pub specialty: Option<String>,
    #[serde(rename = "registro_profesional", alias = "registration_number", default)]
    pub registration_number: Option<String>,
    #[serde(rename = "dias_y_horas_atencion", alias = "schedule", default)]
    pub schedule: Option<Vec<DayScheduleInput>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSpecialistRequest {
    #[serde(rename = "nombre_completo", alias = "full_name", default)]
    pub full_name: Option<String>,
    #[serde(rename = "especialidad", alias = "specialty", default)]
    pub specialty: Option<String>,
    #[serde(rename = "registro_profesional", alias = "registration_number", default)]
    pub registration_number: Option<String>,
    /// `None` leaves the schedule untouched, `Some(None)` clears it.
    #[serde(
        rename = "dias_y_horas_atencion",
        alias = "schedule",
        default,
        deserialize_with = "double_option"
    )]
    pub schedule: Option<Option<Vec<DayScheduleInput>>>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// A create request that passed payload validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSpecialist {
    pub full_name: String,
    pub specialty: String,
    pub registration_number: String,
    pub schedule: Option<WeeklySchedule>,
}

/// Validated partial update; only `Some` fields change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecialistChanges {
    pub full_name: Option<String>,
    pub specialty: Option<String>,
    pub registration_number: Option<String>,
    pub schedule: Option<Option<WeeklySchedule>>,
    pub is_active: Option<bool>,
}

impl SpecialistChanges {
    pub fn activation(is_active: bool) -> Self {
        Self {
            is_active: Some(is_active),
            ..Self::default()
        }
    }

    /// Merges the supplied fields into `specialist` and bumps `updated_at`.
    pub fn apply_to(&self, specialist: &mut Specialist, now: DateTime<Utc>) {
        if let Some(full_name) = &self.full_name {
            specialist.full_name = full_name.clone();
        }
        if let Some(specialty) = &self.specialty {
            specialist.specialty = specialty.clone();
        }
        if let Some(registration_number) = &self.registration_number {
            specialist.registration_number = registration_number.clone();
        }
        if let Some(schedule) = &self.schedule {
            specialist.schedule = schedule.clone();
        }
        if let Some(is_active) = self.is_active {
            specialist.is_active = is_active;
        }
        specialist.updated_at = now;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct SpecialistFilter {
    pub is_active: Option<bool>,
}

impl SpecialistFilter {
    pub fn matches(&self, specialist: &Specialist) -> bool {
        self.is_active.map_or(true, |active| specialist.is_active == active)
    }
}

#[derive(Debug, Error)]
pub enum SpecialistError {
    #[error("Specialist {0} not found")]
    NotFound(i64),

    #[error("Validation failed with {} error(s)", .0.len())]
    Validation(Vec<ErrorDetail>),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl SpecialistError {
    pub fn duplicate_registration(registration_number: &str) -> Self {
        SpecialistError::Validation(vec![ErrorDetail::new(
            error_codes::UNIQUE,
            format!("Registration number '{}' is already in use", registration_number),
        )
        .with_field(fields::REGISTRATION_NUMBER)])
    }
}

impl From<SpecialistError> for AppError {
    fn from(err: SpecialistError) -> Self {
        match err {
            SpecialistError::NotFound(_) => AppError::NotFound(err.to_string()),
            SpecialistError::Validation(details) => AppError::Validation(details),
            SpecialistError::Storage(msg) => AppError::Database(msg),
        }
    }
}
