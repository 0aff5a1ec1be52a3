//! List/count query parameters, ordering and paging.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Ship, ShipType};
use crate::error::{Result, ShipyardError};
use crate::filter::ShipFilter;

/// Default number of ships per page.
pub const DEFAULT_PAGE_SIZE: u32 = 3;

/// Field used to order list results. Ties are broken by identifier.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipOrder {
    /// Identifier.
    #[default]
    Id,
    /// Name.
    Name,
    /// Planet.
    Planet,
    /// Ship type.
    ShipType,
    /// Production date.
    Date,
    /// Usage flag.
    IsUsed,
    /// Speed.
    Speed,
    /// Crew size.
    CrewSize,
    /// Rating.
    Rating,
}

impl ShipOrder {
    /// All orderings in declaration order.
    pub const ALL: [ShipOrder; 9] = [
        ShipOrder::Id,
        ShipOrder::Name,
        ShipOrder::Planet,
        ShipOrder::ShipType,
        ShipOrder::Date,
        ShipOrder::IsUsed,
        ShipOrder::Speed,
        ShipOrder::CrewSize,
        ShipOrder::Rating,
    ];

    /// Query parameter label.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipOrder::Id => "ID",
            ShipOrder::Name => "NAME",
            ShipOrder::Planet => "PLANET",
            ShipOrder::ShipType => "SHIP_TYPE",
            ShipOrder::Date => "DATE",
            ShipOrder::IsUsed => "IS_USED",
            ShipOrder::Speed => "SPEED",
            ShipOrder::CrewSize => "CREW_SIZE",
            ShipOrder::Rating => "RATING",
        }
    }

    /// Compare two ships by this field, then by identifier.
    pub fn compare(&self, left: &Ship, right: &Ship) -> Ordering {
        let by_field = match self {
            ShipOrder::Id => Ordering::Equal,
            ShipOrder::Name => left.name.cmp(&right.name),
            ShipOrder::Planet => left.planet.cmp(&right.planet),
            ShipOrder::ShipType => left.ship_type.as_str().cmp(right.ship_type.as_str()),
            ShipOrder::Date => left.prod_date.cmp(&right.prod_date),
            ShipOrder::IsUsed => left.is_used.cmp(&right.is_used),
            ShipOrder::Speed => left.speed.total_cmp(&right.speed),
            ShipOrder::CrewSize => left.crew_size.cmp(&right.crew_size),
            ShipOrder::Rating => left.rating.total_cmp(&right.rating),
        };
        by_field.then_with(|| left.id.cmp(&right.id))
    }
}

impl fmt::Display for ShipOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShipOrder {
    type Err = ShipyardError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = value.trim().replace('-', "_");
        ShipOrder::ALL
            .into_iter()
            .find(|order| order.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| ShipyardError::validation(format!("unknown order: {value}")))
    }
}

/// A zero-based page window.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PageRequest {
    number: u32,
    size: u32,
}

impl PageRequest {
    /// Build a page window; the size must be at least one.
    pub fn new(number: u32, size: u32) -> Result<Self> {
        if size == 0 {
            return Err(ShipyardError::validation("pageSize must be at least 1"));
        }
        Ok(Self { number, size })
    }

    /// Zero-based page number.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Page size.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Number of records preceding this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.number) * u64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            number: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Query string accepted by the list and count endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ShipQuery {
    /// Name substring, case-sensitive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Planet substring, case-sensitive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planet: Option<String>,
    /// Exact ship type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ship_type: Option<ShipType>,
    /// Earliest production date, epoch milliseconds, inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<i64>,
    /// Latest production date, epoch milliseconds, inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<i64>,
    /// Usage flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_used: Option<bool>,
    /// Minimum speed, inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_speed: Option<f64>,
    /// Maximum speed, inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_speed: Option<f64>,
    /// Minimum crew size, inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_crew_size: Option<i32>,
    /// Maximum crew size, inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_crew_size: Option<i32>,
    /// Minimum rating, inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<f64>,
    /// Maximum rating, inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rating: Option<f64>,
    /// Sort field, defaults to `ID`. Ignored by count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<ShipOrder>,
    /// Zero-based page number, defaults to 0. Ignored by count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    /// Page size, defaults to 3. Ignored by count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl ShipQuery {
    /// Decode the filter parameters.
    pub fn filter(&self) -> Result<ShipFilter> {
        Ok(ShipFilter {
            name: self.name.clone(),
            planet: self.planet.clone(),
            ship_type: self.ship_type,
            after: self.after.map(|millis| instant("after", millis)).transpose()?,
            before: self.before.map(|millis| instant("before", millis)).transpose()?,
            is_used: self.is_used,
            min_speed: self.min_speed,
            max_speed: self.max_speed,
            min_crew_size: self.min_crew_size,
            max_crew_size: self.max_crew_size,
            min_rating: self.min_rating,
            max_rating: self.max_rating,
        })
    }

    /// Requested ordering.
    pub fn order(&self) -> ShipOrder {
        self.order.unwrap_or_default()
    }

    /// Requested page window.
    pub fn page(&self) -> Result<PageRequest> {
        PageRequest::new(
            self.page_number.unwrap_or(0),
            self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }
}

fn instant(param: &str, millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| ShipyardError::validation(format!("{param} is out of range: {millis}")))
}
