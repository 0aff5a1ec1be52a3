//! Database models for Shipyard server.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use shipyard_core::{NewShip, Ship, ShipType, ShipyardError};

use crate::schema::ships;

#[derive(Debug, Clone, Queryable, Identifiable, Selectable, AsChangeset)]
#[diesel(table_name = ships)]
#[diesel(check_for_backend(diesel::pg::Pg))]
/// Ship database record.
pub struct ShipRow {
    /// Ship identifier.
    pub id: i64,
    /// Ship name.
    pub name: String,
    /// Home planet.
    pub planet: String,
    /// Ship type label.
    pub ship_type: String,
    /// Production timestamp (UTC).
    pub prod_date: NaiveDateTime,
    /// Usage flag.
    pub is_used: bool,
    /// Top speed.
    pub speed: f64,
    /// Crew size.
    pub crew_size: i32,
    /// Derived rating.
    pub rating: f64,
}

impl ShipRow {
    /// Convert a stored row into a domain ship.
    pub fn into_ship(self) -> Result<Ship, ShipyardError> {
        let ship_type = self.ship_type.parse::<ShipType>().map_err(|_| {
            ShipyardError::Storage(format!(
                "ship {} has unknown type {:?}",
                self.id, self.ship_type
            ))
        })?;
        Ok(Ship {
            id: self.id,
            name: self.name,
            planet: self.planet,
            ship_type,
            prod_date: self.prod_date.and_utc(),
            is_used: self.is_used,
            speed: self.speed,
            crew_size: self.crew_size,
            rating: self.rating,
        })
    }
}

impl From<&Ship> for ShipRow {
    fn from(ship: &Ship) -> Self {
        Self {
            id: ship.id,
            name: ship.name.clone(),
            planet: ship.planet.clone(),
            ship_type: ship.ship_type.as_str().to_string(),
            prod_date: ship.prod_date.naive_utc(),
            is_used: ship.is_used,
            speed: ship.speed,
            crew_size: ship.crew_size,
            rating: ship.rating,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = ships)]
/// Insertable ship record.
pub struct NewShipRow {
    /// Ship name.
    pub name: String,
    /// Home planet.
    pub planet: String,
    /// Ship type label.
    pub ship_type: String,
    /// Production timestamp (UTC).
    pub prod_date: NaiveDateTime,
    /// Usage flag.
    pub is_used: bool,
    /// Top speed.
    pub speed: f64,
    /// Crew size.
    pub crew_size: i32,
    /// Derived rating.
    pub rating: f64,
}

impl From<&NewShip> for NewShipRow {
    fn from(ship: &NewShip) -> Self {
        Self {
            name: ship.name.clone(),
            planet: ship.planet.clone(),
            ship_type: ship.ship_type.as_str().to_string(),
            prod_date: ship.prod_date.naive_utc(),
            is_used: ship.is_used,
            speed: ship.speed,
            crew_size: ship.crew_size,
            rating: ship.rating,
        }
    }
}
