//! Record store abstraction and the in-memory implementation.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::{NewShip, Ship};
use crate::error::{Result, ShipyardError};
use crate::filter::Predicate;
use crate::query::{PageRequest, ShipOrder};

/// Persistence operations required by the ship service.
#[cfg_attr(test, mockall::automock)]
pub trait ShipStore: Send + Sync {
    /// Fetch a ship by identifier.
    fn find(&self, id: i64) -> Result<Option<Ship>>;
    /// Insert a ship and return it with its assigned identifier.
    fn insert(&self, ship: &NewShip) -> Result<Ship>;
    /// Overwrite an existing ship.
    fn update(&self, ship: &Ship) -> Result<Ship>;
    /// Remove a ship, returning whether it existed.
    fn delete(&self, id: i64) -> Result<bool>;
    /// Return one ordered page of ships matching the predicate.
    fn query(
        &self,
        predicate: &Predicate,
        order: ShipOrder,
        page: PageRequest,
    ) -> Result<Vec<Ship>>;
    /// Count ships matching the predicate.
    fn count(&self, predicate: &Predicate) -> Result<u64>;
}

#[derive(Debug, Default)]
struct Shelf {
    last_id: i64,
    ships: BTreeMap<i64, Ship>,
}

/// Ship store kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryShipStore {
    shelf: RwLock<Shelf>,
}

impl InMemoryShipStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Shelf>> {
        self.shelf.read().map_err(ShipyardError::storage)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Shelf>> {
        self.shelf.write().map_err(ShipyardError::storage)
    }
}

impl ShipStore for InMemoryShipStore {
    fn find(&self, id: i64) -> Result<Option<Ship>> {
        Ok(self.read()?.ships.get(&id).cloned())
    }

    fn insert(&self, ship: &NewShip) -> Result<Ship> {
        let mut shelf = self.write()?;
        shelf.last_id += 1;
        let stored = ship.clone().with_id(shelf.last_id);
        shelf.ships.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn update(&self, ship: &Ship) -> Result<Ship> {
        let mut shelf = self.write()?;
        match shelf.ships.get_mut(&ship.id) {
            Some(slot) => {
                *slot = ship.clone();
                Ok(ship.clone())
            }
            None => Err(ShipyardError::NotFound(ship.id)),
        }
    }

    fn delete(&self, id: i64) -> Result<bool> {
        Ok(self.write()?.ships.remove(&id).is_some())
    }

    fn query(
        &self,
        predicate: &Predicate,
        order: ShipOrder,
        page: PageRequest,
    ) -> Result<Vec<Ship>> {
        let shelf = self.read()?;
        let mut matching: Vec<&Ship> = shelf
            .ships
            .values()
            .filter(|ship| predicate.matches(ship))
            .collect();
        matching.sort_by(|left, right| order.compare(left, right));
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        Ok(matching
            .into_iter()
            .skip(offset)
            .take(page.size() as usize)
            .cloned()
            .collect())
    }

    fn count(&self, predicate: &Predicate) -> Result<u64> {
        let shelf = self.read()?;
        Ok(shelf
            .ships
            .values()
            .filter(|ship| predicate.matches(ship))
            .count() as u64)
    }
}
