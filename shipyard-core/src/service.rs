//! Ship record service: validation, rating and persistence orchestration.

use std::sync::Arc;

use chrono::Datelike;
use log::{debug, info};

use crate::domain::{NewShip, Ship, ShipPatch};
use crate::error::{Result, ShipyardError};
use crate::filter::ShipFilter;
use crate::query::{PageRequest, ShipOrder};
use crate::rating::calculate_rating;
use crate::store::ShipStore;
use crate::validation::{
    validate_crew_size, validate_id, validate_name, validate_planet, validate_prod_date,
    validate_ship_type, validate_speed,
};

/// Ship operations backed by an injected store.
#[derive(Clone)]
pub struct ShipService {
    store: Arc<dyn ShipStore>,
}

impl ShipService {
    /// Create a service over the given store.
    pub fn new(store: Arc<dyn ShipStore>) -> Self {
        Self { store }
    }

    /// Fetch a ship by identifier.
    pub fn get(&self, id: i64) -> Result<Ship> {
        let id = validate_id(id)?;
        debug!("looking up ship {id}");
        self.store.find(id)?.ok_or(ShipyardError::NotFound(id))
    }

    /// Validate a draft, rate it and store it.
    pub fn create(&self, draft: ShipPatch) -> Result<Ship> {
        let name = validate_name(draft.name.as_deref())?.to_string();
        let planet = validate_planet(draft.planet.as_deref())?.to_string();
        let ship_type = validate_ship_type(draft.ship_type)?;
        let prod_date = validate_prod_date(draft.prod_date)?;
        let speed = validate_speed(draft.speed)?;
        let crew_size = validate_crew_size(draft.crew_size)?;
        let is_used = draft.is_used.unwrap_or(false);
        let rating = calculate_rating(prod_date.year(), speed, is_used)?;

        let ship = self.store.insert(&NewShip {
            name,
            planet,
            ship_type,
            prod_date,
            is_used,
            speed,
            crew_size,
            rating,
        })?;
        info!("created ship {} ({})", ship.id, ship.name);
        Ok(ship)
    }

    /// Apply the supplied fields to an existing ship and re-rate it.
    pub fn update(&self, id: i64, patch: ShipPatch) -> Result<Ship> {
        let mut ship = self.get(id)?;
        if let Some(name) = patch.name.as_deref() {
            ship.name = validate_name(Some(name))?.to_string();
        }
        if let Some(planet) = patch.planet.as_deref() {
            ship.planet = validate_planet(Some(planet))?.to_string();
        }
        if let Some(ship_type) = patch.ship_type {
            ship.ship_type = validate_ship_type(Some(ship_type))?;
        }
        if let Some(prod_date) = patch.prod_date {
            ship.prod_date = validate_prod_date(Some(prod_date))?;
        }
        if let Some(is_used) = patch.is_used {
            ship.is_used = is_used;
        }
        if let Some(speed) = patch.speed {
            ship.speed = validate_speed(Some(speed))?;
        }
        if let Some(crew_size) = patch.crew_size {
            ship.crew_size = validate_crew_size(Some(crew_size))?;
        }
        ship.rating = calculate_rating(ship.prod_date.year(), ship.speed, ship.is_used)?;

        let ship = self.store.update(&ship)?;
        info!("updated ship {}", ship.id);
        Ok(ship)
    }

    /// Remove a ship.
    pub fn delete(&self, id: i64) -> Result<()> {
        let ship = self.get(id)?;
        if !self.store.delete(ship.id)? {
            return Err(ShipyardError::NotFound(ship.id));
        }
        info!("deleted ship {}", ship.id);
        Ok(())
    }

    /// Return one page of ships matching the filter.
    pub fn list(
        &self,
        filter: &ShipFilter,
        order: ShipOrder,
        page: PageRequest,
    ) -> Result<Vec<Ship>> {
        debug!(
            "listing ships by {order}, page {} of size {}",
            page.number(),
            page.size()
        );
        self.store.query(&filter.predicate(), order, page)
    }

    /// Count ships matching the filter.
    pub fn count(&self, filter: &ShipFilter) -> Result<u64> {
        self.store.count(&filter.predicate())
    }
}
