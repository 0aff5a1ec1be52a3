//! Field validation rules for ship records.
//!
//! Every rule accepts an optional value so that a missing required field is
//! reported the same way as an out-of-range one.

use chrono::{DateTime, Datelike, Utc};

use crate::domain::ShipType;
use crate::error::{Result, ShipyardError};

/// Maximum length of name and planet values, in characters.
pub const MAX_TEXT_LENGTH: usize = 50;
/// Earliest accepted production year.
pub const MIN_PROD_YEAR: i32 = 2800;
/// Latest accepted production year; also the rating reference year.
pub const MAX_PROD_YEAR: i32 = 3019;
/// Lowest accepted speed.
pub const MIN_SPEED: f64 = 0.01;
/// Highest accepted speed.
pub const MAX_SPEED: f64 = 0.99;
/// Smallest accepted crew.
pub const MIN_CREW_SIZE: i32 = 1;
/// Largest accepted crew.
pub const MAX_CREW_SIZE: i32 = 9999;

/// Validate a ship name.
pub fn validate_name(name: Option<&str>) -> Result<&str> {
    validate_text(name, "name")
}

/// Validate a planet name.
pub fn validate_planet(planet: Option<&str>) -> Result<&str> {
    validate_text(planet, "planet")
}

fn validate_text<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str> {
    match value {
        Some(text) if !text.is_empty() && text.chars().count() <= MAX_TEXT_LENGTH => Ok(text),
        Some(_) => Err(ShipyardError::validation(format!(
            "{field} must be between 1 and {MAX_TEXT_LENGTH} characters"
        ))),
        None => Err(ShipyardError::validation(format!("{field} is required"))),
    }
}

/// Validate that a ship type was supplied.
pub fn validate_ship_type(ship_type: Option<ShipType>) -> Result<ShipType> {
    ship_type.ok_or_else(|| ShipyardError::validation("shipType is required"))
}

/// Validate a production date by its UTC calendar year.
pub fn validate_prod_date(prod_date: Option<DateTime<Utc>>) -> Result<DateTime<Utc>> {
    let prod_date =
        prod_date.ok_or_else(|| ShipyardError::validation("prodDate is required"))?;
    let year = prod_date.year();
    if !(MIN_PROD_YEAR..=MAX_PROD_YEAR).contains(&year) {
        return Err(ShipyardError::validation(format!(
            "prodDate year {year} must be between {MIN_PROD_YEAR} and {MAX_PROD_YEAR}"
        )));
    }
    Ok(prod_date)
}

/// Validate a ship speed.
pub fn validate_speed(speed: Option<f64>) -> Result<f64> {
    match speed {
        Some(speed) if (MIN_SPEED..=MAX_SPEED).contains(&speed) => Ok(speed),
        Some(speed) => Err(ShipyardError::validation(format!(
            "speed {speed} must be between {MIN_SPEED} and {MAX_SPEED}"
        ))),
        None => Err(ShipyardError::validation("speed is required")),
    }
}

/// Validate a crew size.
pub fn validate_crew_size(crew_size: Option<i32>) -> Result<i32> {
    match crew_size {
        Some(crew_size) if (MIN_CREW_SIZE..=MAX_CREW_SIZE).contains(&crew_size) => Ok(crew_size),
        Some(crew_size) => Err(ShipyardError::validation(format!(
            "crewSize {crew_size} must be between {MIN_CREW_SIZE} and {MAX_CREW_SIZE}"
        ))),
        None => Err(ShipyardError::validation("crewSize is required")),
    }
}

/// Validate a ship identifier used for lookups.
pub fn validate_id(id: i64) -> Result<i64> {
    if id <= 0 {
        return Err(ShipyardError::validation(format!(
            "ship id must be a positive integer, got {id}"
        )));
    }
    Ok(id)
}

/// Parse and validate a ship identifier taken from a URL path segment.
pub fn parse_id(raw: &str) -> Result<i64> {
    let id = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| ShipyardError::validation(format!("ship id is not an integer: {raw}")))?;
    validate_id(id)
}
