use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidateLength;

use crate::api::job::Column;

lazy_static! {
    static ref DIGITS: Regex = Regex::new(r"^[0-9]+$").unwrap();
    static ref DATE: Regex = Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap();
    static ref HOUR: Regex = Regex::new(r"^[0-9]{2}:[0-9]{2}:[0-9]{2}$").unwrap();
}

/// Check a candidate value against the rule for the named column
///
/// Unknown column names are rejected. Dates and hours are checked for shape
/// only, so `2024-99-99` and `99:99:99` pass.
pub fn validate(field: &str, value: &str) -> bool {
    match field.parse::<Column>() {
        Ok(column) => validate_column(column, value),
        Err(_) => false,
    }
}

pub fn validate_column(column: Column, value: &str) -> bool {
    match column {
        Column::JobId => DIGITS.is_match(value),
        Column::StartDate => DATE.is_match(value),
        Column::StartHour => HOUR.is_match(value),
        // Description shares the Name rule, so an empty description is rejected here
        Column::Name | Column::Description => value.validate_length(Some(1), Some(100), None),
        Column::IsActive => value == "1" || value == "0",
    }
}
