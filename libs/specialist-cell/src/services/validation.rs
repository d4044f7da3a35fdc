// Structural checks on create/update bodies. Every problem is collected so a
// client sees all of them at once; chronological checks live in `schedule`.

use shared_models::error::ErrorDetail;

use crate::models::{
    error_codes, fields, range_path, CreateSpecialistRequest, DaySchedule, DayScheduleInput,
    NewSpecialist, SpecialistChanges, TimeOfDay, TimeRange, TimeRangeInput,
    UpdateSpecialistRequest, WeeklySchedule,
};

const FULL_NAME_MIN_LENGTH: usize = 3;

pub fn validate_create_request(request: CreateSpecialistRequest) -> Result<NewSpecialist, Vec<ErrorDetail>> {
    let mut validator = PayloadValidator::default();

    let full_name = validator.required_text(request.full_name, fields::FULL_NAME, FULL_NAME_MIN_LENGTH);
    let specialty = validator.required_text(request.specialty, fields::SPECIALTY, 1);
    let registration_number = validator.required_text(request.registration_number, fields::REGISTRATION_NUMBER, 1);
    let schedule = request.schedule.map(|days| validator.schedule(days));

    // A missing required value always records an issue, so past this point
    // every required field is present.
    validator.finish()?;

    Ok(NewSpecialist {
        full_name: full_name.unwrap_or_default(),
        specialty: specialty.unwrap_or_default(),
        registration_number: registration_number.unwrap_or_default(),
        schedule,
    })
}

pub fn validate_update_request(request: UpdateSpecialistRequest) -> Result<SpecialistChanges, Vec<ErrorDetail>> {
    let mut validator = PayloadValidator::default();

    let changes = SpecialistChanges {
        full_name: request
            .full_name
            .and_then(|value| validator.text(value, fields::FULL_NAME, FULL_NAME_MIN_LENGTH)),
        specialty: request
            .specialty
            .and_then(|value| validator.text(value, fields::SPECIALTY, 1)),
        registration_number: request
            .registration_number
            .and_then(|value| validator.text(value, fields::REGISTRATION_NUMBER, 1)),
        schedule: request
            .schedule
            .map(|schedule| schedule.map(|days| validator.schedule(days))),
        is_active: request.is_active,
    };

    validator.finish().map(|()| changes)
}

#[derive(Default)]
struct PayloadValidator {
    issues: Vec<ErrorDetail>,
}

impl PayloadValidator {
    fn finish(self) -> Result<(), Vec<ErrorDetail>> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(self.issues)
        }
    }

    fn report(&mut self, code: &str, field: &str, message: String) {
        self.issues.push(ErrorDetail::new(code, message).with_field(field));
    }

    fn required_text(&mut self, value: Option<String>, field: &str, min_length: usize) -> Option<String> {
        match value {
            Some(value) => self.text(value, field, min_length),
            None => {
                self.report(error_codes::REQUIRED, field, format!("The {} field is required", field));
                None
            }
        }
    }

    fn text(&mut self, value: String, field: &str, min_length: usize) -> Option<String> {
        let trimmed = value.trim();

        if trimmed.is_empty() {
            self.report(error_codes::REQUIRED, field, format!("The {} field must not be empty", field));
            return None;
        }

        if trimmed.chars().count() < min_length {
            self.report(
                error_codes::MIN_LENGTH,
                field,
                format!("The {} field must have at least {} characters", field, min_length),
            );
            return None;
        }

        Some(trimmed.to_string())
    }

    fn schedule(&mut self, days: Vec<DayScheduleInput>) -> WeeklySchedule {
        days.into_iter()
            .enumerate()
            .filter_map(|(day_index, day)| self.day(day_index, day))
            .collect()
    }

    fn day(&mut self, day_index: usize, input: DayScheduleInput) -> Option<DaySchedule> {
        let day_field = format!("{}.{}.{}", fields::SCHEDULE, day_index, fields::DAY);
        let ranges_field = format!("{}.{}.{}", fields::SCHEDULE, day_index, fields::RANGES);

        let day = self.required_text(input.day, &day_field, 1);

        let ranges = match input.ranges {
            None => {
                self.report(error_codes::REQUIRED, &ranges_field, format!("The {} field is required", ranges_field));
                None
            }
            Some(ranges) if ranges.is_empty() => {
                self.report(
                    error_codes::MIN_LENGTH,
                    &ranges_field,
                    format!("The {} field must have at least 1 range", ranges_field),
                );
                None
            }
            Some(ranges) => {
                let parsed: Vec<Option<TimeRange>> = ranges
                    .into_iter()
                    .enumerate()
                    .map(|(range_index, range)| self.range(day_index, range_index, range))
                    .collect();
                parsed.into_iter().collect::<Option<Vec<_>>>()
            }
        };

        Some(DaySchedule { day: day?, ranges: ranges? })
    }

    fn range(&mut self, day_index: usize, range_index: usize, input: TimeRangeInput) -> Option<TimeRange> {
        let path = range_path(day_index, range_index);
        let start = self.time(input.start, &format!("{}.{}", path, fields::START));
        let end = self.time(input.end, &format!("{}.{}", path, fields::END));

        Some(TimeRange::new(start?, end?))
    }

    fn time(&mut self, value: Option<String>, field: &str) -> Option<TimeOfDay> {
        let Some(value) = value else {
            self.report(error_codes::REQUIRED, field, format!("The {} field is required", field));
            return None;
        };

        match TimeOfDay::parse(&value) {
            Ok(time) => Some(time),
            Err(e) => {
                self.report(error_codes::INVALID_TIME_FORMAT, field, format!("The {} field is invalid: {}", field, e));
                None
            }
        }
    }
}
