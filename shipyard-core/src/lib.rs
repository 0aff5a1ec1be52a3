#![deny(missing_docs)]
//! Shipyard core library.
//!
//! Domain types, validation rules, the rating formula, filter predicates and
//! the ship service that the Shipyard server and CLI are built on.

pub mod domain;
pub mod error;
pub mod filter;
pub mod query;
pub mod rating;
pub mod service;
pub mod store;
pub mod validation;

pub use domain::{NewShip, Ship, ShipPatch, ShipType};
pub use error::{Result, ShipyardError};
pub use filter::{Bounds, Predicate, ShipFilter};
pub use query::{DEFAULT_PAGE_SIZE, PageRequest, ShipOrder, ShipQuery};
pub use rating::calculate_rating;
pub use service::ShipService;
pub use store::{InMemoryShipStore, ShipStore};
