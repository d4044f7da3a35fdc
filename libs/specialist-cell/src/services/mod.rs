pub mod schedule;
pub mod specialist;
pub mod validation;

pub use schedule::{check_overlaps, validate_range, validate_weekly_schedule};
pub use specialist::SpecialistService;
