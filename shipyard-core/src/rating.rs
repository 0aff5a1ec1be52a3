//! Ship rating calculation.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{Result, ShipyardError};
use crate::validation::MAX_PROD_YEAR;

/// Compute the rating of a ship.
///
/// `80 * speed * k / (3019 - year + 1)` where `k` is 0.5 for used ships and 1
/// otherwise, rounded half-up to two decimal places. Years after 3019 would make
/// the denominator non-positive and are rejected.
pub fn calculate_rating(year: i32, speed: f64, is_used: bool) -> Result<f64> {
    if year > MAX_PROD_YEAR {
        return Err(ShipyardError::validation(format!(
            "cannot rate a ship produced after {MAX_PROD_YEAR}"
        )));
    }
    let wear = if is_used { 0.5 } else { 1.0 };
    let raw = 80.0 * speed * wear / f64::from(MAX_PROD_YEAR - year + 1);
    round_half_up(raw, 2)
}

/// Round using the shortest decimal representation of `value`, so that
/// `0.125` becomes `0.13` rather than drifting on its binary expansion.
fn round_half_up(value: f64, scale: u32) -> Result<f64> {
    let decimal = Decimal::from_str(&value.to_string())
        .map_err(|err| ShipyardError::validation(format!("rating out of range: {err}")))?;
    decimal
        .round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .ok_or_else(|| ShipyardError::validation("rating out of range"))
}
