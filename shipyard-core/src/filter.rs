//! Composable filter predicates over ship records.
//!
//! A [`Predicate`] is a small expression tree. Stores either evaluate it in
//! memory with [`Predicate::matches`] or translate it into their own query
//! language. [`Predicate::All`] is the identity under [`Predicate::and`], so a
//! missing query parameter simply contributes `All`.

use chrono::{DateTime, Utc};

use crate::domain::{Ship, ShipType};

/// Inclusive bounds, either of which may be open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds<T> {
    /// Lower bound, inclusive.
    pub min: Option<T>,
    /// Upper bound, inclusive.
    pub max: Option<T>,
}

impl<T: PartialOrd + Copy> Bounds<T> {
    /// Build bounds from optional endpoints.
    pub fn new(min: Option<T>, max: Option<T>) -> Self {
        Self { min, max }
    }

    /// True when neither endpoint is set.
    pub fn is_open(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Whether `value` lies within the bounds.
    pub fn contains(&self, value: T) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// A filter condition over ship fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches every ship.
    All,
    /// Matches when every inner predicate matches.
    And(Vec<Predicate>),
    /// Case-sensitive substring match on the name.
    NameContains(String),
    /// Case-sensitive substring match on the planet.
    PlanetContains(String),
    /// Exact ship type match.
    ShipTypeIs(ShipType),
    /// Production date within bounds.
    ProdDateWithin(Bounds<DateTime<Utc>>),
    /// Exact usage flag match.
    IsUsed(bool),
    /// Speed within bounds.
    SpeedWithin(Bounds<f64>),
    /// Crew size within bounds.
    CrewSizeWithin(Bounds<i32>),
    /// Rating within bounds.
    RatingWithin(Bounds<f64>),
}

impl Predicate {
    /// Conjoin two predicates, dropping `All` operands and flattening nested
    /// conjunctions.
    pub fn and(self, other: Predicate) -> Predicate {
        match (self, other) {
            (Predicate::All, other) => other,
            (this, Predicate::All) => this,
            (Predicate::And(mut left), Predicate::And(right)) => {
                left.extend(right);
                Predicate::And(left)
            }
            (Predicate::And(mut left), other) => {
                left.push(other);
                Predicate::And(left)
            }
            (this, Predicate::And(mut right)) => {
                right.insert(0, this);
                Predicate::And(right)
            }
            (this, other) => Predicate::And(vec![this, other]),
        }
    }

    /// Evaluate the predicate against a ship.
    pub fn matches(&self, ship: &Ship) -> bool {
        match self {
            Predicate::All => true,
            Predicate::And(parts) => parts.iter().all(|part| part.matches(ship)),
            Predicate::NameContains(needle) => ship.name.contains(needle.as_str()),
            Predicate::PlanetContains(needle) => ship.planet.contains(needle.as_str()),
            Predicate::ShipTypeIs(ship_type) => ship.ship_type == *ship_type,
            Predicate::ProdDateWithin(bounds) => bounds.contains(ship.prod_date),
            Predicate::IsUsed(flag) => ship.is_used == *flag,
            Predicate::SpeedWithin(bounds) => bounds.contains(ship.speed),
            Predicate::CrewSizeWithin(bounds) => bounds.contains(ship.crew_size),
            Predicate::RatingWithin(bounds) => bounds.contains(ship.rating),
        }
    }
}

/// Substring filter on the name.
pub fn by_name(name: Option<&str>) -> Predicate {
    name.map_or(Predicate::All, |name| Predicate::NameContains(name.to_string()))
}

/// Substring filter on the planet.
pub fn by_planet(planet: Option<&str>) -> Predicate {
    planet.map_or(Predicate::All, |planet| {
        Predicate::PlanetContains(planet.to_string())
    })
}

/// Exact ship type filter.
pub fn by_ship_type(ship_type: Option<ShipType>) -> Predicate {
    ship_type.map_or(Predicate::All, Predicate::ShipTypeIs)
}

/// Production date range filter.
pub fn by_prod_date(after: Option<DateTime<Utc>>, before: Option<DateTime<Utc>>) -> Predicate {
    within(Bounds::new(after, before), Predicate::ProdDateWithin)
}

/// Usage flag filter.
pub fn by_usage(is_used: Option<bool>) -> Predicate {
    is_used.map_or(Predicate::All, Predicate::IsUsed)
}

/// Speed range filter.
pub fn by_speed(min: Option<f64>, max: Option<f64>) -> Predicate {
    within(Bounds::new(min, max), Predicate::SpeedWithin)
}

/// Crew size range filter.
pub fn by_crew_size(min: Option<i32>, max: Option<i32>) -> Predicate {
    within(Bounds::new(min, max), Predicate::CrewSizeWithin)
}

/// Rating range filter.
pub fn by_rating(min: Option<f64>, max: Option<f64>) -> Predicate {
    within(Bounds::new(min, max), Predicate::RatingWithin)
}

fn within<T: PartialOrd + Copy>(
    bounds: Bounds<T>,
    wrap: impl FnOnce(Bounds<T>) -> Predicate,
) -> Predicate {
    if bounds.is_open() {
        Predicate::All
    } else {
        wrap(bounds)
    }
}

/// Decoded filter parameters shared by list and count requests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShipFilter {
    /// Name substring.
    pub name: Option<String>,
    /// Planet substring.
    pub planet: Option<String>,
    /// Ship type.
    pub ship_type: Option<ShipType>,
    /// Earliest production date.
    pub after: Option<DateTime<Utc>>,
    /// Latest production date.
    pub before: Option<DateTime<Utc>>,
    /// Usage flag.
    pub is_used: Option<bool>,
    /// Minimum speed.
    pub min_speed: Option<f64>,
    /// Maximum speed.
    pub max_speed: Option<f64>,
    /// Minimum crew size.
    pub min_crew_size: Option<i32>,
    /// Maximum crew size.
    pub max_crew_size: Option<i32>,
    /// Minimum rating.
    pub min_rating: Option<f64>,
    /// Maximum rating.
    pub max_rating: Option<f64>,
}

impl ShipFilter {
    /// Compose every parameter into one conjunctive predicate.
    pub fn predicate(&self) -> Predicate {
        by_name(self.name.as_deref())
            .and(by_planet(self.planet.as_deref()))
            .and(by_ship_type(self.ship_type))
            .and(by_prod_date(self.after, self.before))
            .and(by_usage(self.is_used))
            .and(by_speed(self.min_speed, self.max_speed))
            .and(by_crew_size(self.min_crew_size, self.max_crew_size))
            .and(by_rating(self.min_rating, self.max_rating))
    }
}
