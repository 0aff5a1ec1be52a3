//! Exercises the ship service end to end over the in-memory store.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use shipyard_core::{
    InMemoryShipStore, PageRequest, ShipFilter, ShipOrder, ShipPatch, ShipService, ShipType,
    ShipyardError,
};

fn service() -> ShipService {
    ShipService::new(Arc::new(InMemoryShipStore::new()))
}

fn draft(name: &str, year: i32, speed: f64, crew_size: i32) -> ShipPatch {
    ShipPatch {
        name: Some(name.to_string()),
        planet: Some("Earth".to_string()),
        ship_type: Some(ShipType::Transport),
        prod_date: Some(Utc.with_ymd_and_hms(year, 3, 15, 12, 0, 0).unwrap()),
        is_used: None,
        speed: Some(speed),
        crew_size: Some(crew_size),
    }
}

#[test]
fn create_computes_rating_and_defaults_usage() {
    let service = service();
    let ship = service.create(draft("Vega", 3000, 0.5, 100)).expect("create");

    assert_eq!(ship.id, 1);
    assert!(!ship.is_used);
    assert_eq!(ship.rating, 2.0);
    assert_eq!(service.get(ship.id).expect("get"), ship);
}

#[test]
fn speed_only_update_keeps_other_fields_and_rerates() {
    let service = service();
    let original = service.create(draft("Vega", 3000, 0.5, 100)).expect("create");

    let patch = ShipPatch {
        speed: Some(0.8),
        ..ShipPatch::default()
    };
    let updated = service.update(original.id, patch).expect("update");

    assert_eq!(updated.name, original.name);
    assert_eq!(updated.planet, original.planet);
    assert_eq!(updated.ship_type, original.ship_type);
    assert_eq!(updated.prod_date, original.prod_date);
    assert_eq!(updated.crew_size, original.crew_size);
    assert_eq!(updated.is_used, original.is_used);
    assert_eq!(updated.speed, 0.8);
    assert_eq!(updated.rating, 3.2);
    assert_eq!(service.get(original.id).expect("get"), updated);
}

#[test]
fn update_of_missing_ship_is_not_found() {
    let service = service();
    let result = service.update(99, ShipPatch::default());
    assert_eq!(result, Err(ShipyardError::NotFound(99)));
}

#[test]
fn list_defaults_to_id_order_and_page_size() {
    let service = service();
    for index in 0..10 {
        service
            .create(draft(
                &format!("Ship {index}"),
                2900 + index,
                0.5 - 0.01 * f64::from(index),
                10,
            ))
            .expect("create");
    }

    let page = service
        .list(&ShipFilter::default(), ShipOrder::default(), PageRequest::default())
        .expect("list");
    let ids: Vec<i64> = page.iter().map(|ship| ship.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    let last = service
        .list(
            &ShipFilter::default(),
            ShipOrder::Id,
            PageRequest::new(3, 3).expect("page"),
        )
        .expect("list");
    assert_eq!(last.len(), 1);
    assert_eq!(last[0].id, 10);

    let past_end = service
        .list(
            &ShipFilter::default(),
            ShipOrder::Id,
            PageRequest::new(4, 3).expect("page"),
        )
        .expect("list");
    assert!(past_end.is_empty());

    let slowest = service
        .list(
            &ShipFilter::default(),
            ShipOrder::Speed,
            PageRequest::default(),
        )
        .expect("list");
    assert_eq!(slowest[0].id, 10);
}

#[test]
fn count_ignores_paging_and_applies_filters() {
    let service = service();
    service.create(draft("Vega", 3000, 0.5, 100)).expect("create");
    service.create(draft("Vela", 2950, 0.2, 40)).expect("create");
    let mut used = draft("Deneb", 3010, 0.9, 5);
    used.is_used = Some(true);
    service.create(used).expect("create");

    assert_eq!(service.count(&ShipFilter::default()).expect("count"), 3);

    let ve = ShipFilter {
        name: Some("Ve".to_string()),
        ..ShipFilter::default()
    };
    assert_eq!(service.count(&ve).expect("count"), 2);

    let used_heavy = ShipFilter {
        is_used: Some(true),
        min_crew_size: Some(50),
        ..ShipFilter::default()
    };
    assert_eq!(service.count(&used_heavy).expect("count"), 0);

    let nothing = ShipFilter {
        planet: Some("Pluto".to_string()),
        ..ShipFilter::default()
    };
    assert_eq!(service.count(&nothing).expect("count"), 0);
}

#[test]
fn delete_removes_ship() {
    let service = service();
    let ship = service.create(draft("Vega", 3000, 0.5, 100)).expect("create");

    assert_eq!(service.delete(42), Err(ShipyardError::NotFound(42)));
    service.delete(ship.id).expect("delete");
    assert_eq!(service.get(ship.id), Err(ShipyardError::NotFound(ship.id)));
    assert_eq!(service.delete(ship.id), Err(ShipyardError::NotFound(ship.id)));
}

#[test]
fn invalid_production_year_is_rejected() {
    let service = service();
    let result = service.create(draft("Vega", 3020, 0.5, 100));
    assert!(matches!(result, Err(ShipyardError::Validation(_))));
    assert_eq!(service.count(&ShipFilter::default()).expect("count"), 0);
}
