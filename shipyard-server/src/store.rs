//! PostgreSQL ship store built on Diesel.
//!
//! Filter predicates are translated into boxed Diesel expressions so that one
//! query shape serves every combination of optional parameters.

use diesel::dsl::count_star;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::sql_types::Bool;
use shipyard_core::{NewShip, PageRequest, Predicate, Ship, ShipOrder, ShipStore, ShipyardError};

use crate::db::DbPool;
use crate::models::{NewShipRow, ShipRow};
use crate::schema::ships;

type ShipCondition = Box<dyn BoxableExpression<ships::table, Pg, SqlType = Bool>>;

/// Ship store backed by a PostgreSQL connection pool.
#[derive(Clone)]
pub struct PgShipStore {
    pool: DbPool,
}

impl PgShipStore {
    /// Create a store over an initialized pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn connection(
        &self,
    ) -> Result<PooledConnection<ConnectionManager<PgConnection>>, ShipyardError> {
        self.pool.get().map_err(ShipyardError::storage)
    }
}

/// Translate a predicate into a SQL condition; `None` means no restriction.
fn condition(predicate: &Predicate) -> Option<ShipCondition> {
    match predicate {
        Predicate::All => None,
        Predicate::And(parts) => parts.iter().filter_map(condition).reduce(conjoin),
        Predicate::NameContains(needle) => {
            Some(Box::new(ships::name.like(contains_pattern(needle))))
        }
        Predicate::PlanetContains(needle) => {
            Some(Box::new(ships::planet.like(contains_pattern(needle))))
        }
        Predicate::ShipTypeIs(ship_type) => {
            Some(Box::new(ships::ship_type.eq(ship_type.as_str())))
        }
        Predicate::ProdDateWithin(bounds) => both(
            bounds
                .min
                .map(|min| -> ShipCondition { Box::new(ships::prod_date.ge(min.naive_utc())) }),
            bounds
                .max
                .map(|max| -> ShipCondition { Box::new(ships::prod_date.le(max.naive_utc())) }),
        ),
        Predicate::IsUsed(flag) => Some(Box::new(ships::is_used.eq(*flag))),
        Predicate::SpeedWithin(bounds) => both(
            bounds
                .min
                .map(|min| -> ShipCondition { Box::new(ships::speed.ge(min)) }),
            bounds
                .max
                .map(|max| -> ShipCondition { Box::new(ships::speed.le(max)) }),
        ),
        Predicate::CrewSizeWithin(bounds) => both(
            bounds
                .min
                .map(|min| -> ShipCondition { Box::new(ships::crew_size.ge(min)) }),
            bounds
                .max
                .map(|max| -> ShipCondition { Box::new(ships::crew_size.le(max)) }),
        ),
        Predicate::RatingWithin(bounds) => both(
            bounds
                .min
                .map(|min| -> ShipCondition { Box::new(ships::rating.ge(min)) }),
            bounds
                .max
                .map(|max| -> ShipCondition { Box::new(ships::rating.le(max)) }),
        ),
    }
}

fn conjoin(left: ShipCondition, right: ShipCondition) -> ShipCondition {
    Box::new(left.and(right))
}

fn both(lower: Option<ShipCondition>, upper: Option<ShipCondition>) -> Option<ShipCondition> {
    match (lower, upper) {
        (Some(lower), Some(upper)) => Some(conjoin(lower, upper)),
        (lower, upper) => lower.or(upper),
    }
}

/// LIKE pattern matching `needle` literally anywhere in the column.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn filtered(predicate: &Predicate) -> ships::BoxedQuery<'static, Pg> {
    let query = ships::table.into_boxed();
    match condition(predicate) {
        Some(condition) => query.filter(condition),
        None => query,
    }
}

fn page_query(
    predicate: &Predicate,
    order: ShipOrder,
    page: PageRequest,
) -> ships::BoxedQuery<'static, Pg> {
    // An offset past i64::MAX is still just an empty page.
    let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
    let query = filtered(predicate);
    let query = match order {
        ShipOrder::Id => query.order(ships::id.asc()),
        ShipOrder::Name => query.order((ships::name.asc(), ships::id.asc())),
        ShipOrder::Planet => query.order((ships::planet.asc(), ships::id.asc())),
        ShipOrder::ShipType => query.order((ships::ship_type.asc(), ships::id.asc())),
        ShipOrder::Date => query.order((ships::prod_date.asc(), ships::id.asc())),
        ShipOrder::IsUsed => query.order((ships::is_used.asc(), ships::id.asc())),
        ShipOrder::Speed => query.order((ships::speed.asc(), ships::id.asc())),
        ShipOrder::CrewSize => query.order((ships::crew_size.asc(), ships::id.asc())),
        ShipOrder::Rating => query.order((ships::rating.asc(), ships::id.asc())),
    };
    query.limit(i64::from(page.size())).offset(offset)
}

impl ShipStore for PgShipStore {
    fn find(&self, id: i64) -> Result<Option<Ship>, ShipyardError> {
        let mut conn = self.connection()?;
        let row = ships::table
            .find(id)
            .first::<ShipRow>(&mut conn)
            .optional()
            .map_err(ShipyardError::storage)?;
        row.map(ShipRow::into_ship).transpose()
    }

    fn insert(&self, ship: &NewShip) -> Result<Ship, ShipyardError> {
        let mut conn = self.connection()?;
        let row = diesel::insert_into(ships::table)
            .values(&NewShipRow::from(ship))
            .get_result::<ShipRow>(&mut conn)
            .map_err(ShipyardError::storage)?;
        row.into_ship()
    }

    fn update(&self, ship: &Ship) -> Result<Ship, ShipyardError> {
        let mut conn = self.connection()?;
        let row = diesel::update(ships::table.find(ship.id))
            .set(&ShipRow::from(ship))
            .get_result::<ShipRow>(&mut conn)
            .optional()
            .map_err(ShipyardError::storage)?
            .ok_or(ShipyardError::NotFound(ship.id))?;
        row.into_ship()
    }

    fn delete(&self, id: i64) -> Result<bool, ShipyardError> {
        let mut conn = self.connection()?;
        let removed = diesel::delete(ships::table.find(id))
            .execute(&mut conn)
            .map_err(ShipyardError::storage)?;
        Ok(removed > 0)
    }

    fn query(
        &self,
        predicate: &Predicate,
        order: ShipOrder,
        page: PageRequest,
    ) -> Result<Vec<Ship>, ShipyardError> {
        let query = page_query(predicate, order, page);
        let mut conn = self.connection()?;
        let rows = query
            .load::<ShipRow>(&mut conn)
            .map_err(ShipyardError::storage)?;
        rows.into_iter().map(ShipRow::into_ship).collect()
    }

    fn count(&self, predicate: &Predicate) -> Result<u64, ShipyardError> {
        let mut conn = self.connection()?;
        let count = filtered(predicate)
            .select(count_star())
            .get_result::<i64>(&mut conn)
            .map_err(ShipyardError::storage)?;
        u64::try_from(count).map_err(ShipyardError::storage)
    }
}

#[cfg(test)]
mod tests {
    use super::{PgShipStore, contains_pattern, filtered, page_query};
    use crate::db::TestDatabase;
    use chrono::{TimeZone, Utc};
    use diesel::debug_query;
    use diesel::pg::Pg;
    use shipyard_core::{
        NewShip, PageRequest, Predicate, ShipFilter, ShipOrder, ShipStore, ShipType,
    };

    fn new_ship(name: &str, planet: &str, speed: f64, crew_size: i32) -> NewShip {
        NewShip {
            name: name.to_string(),
            planet: planet.to_string(),
            ship_type: ShipType::Military,
            prod_date: Utc.with_ymd_and_hms(3005, 7, 1, 0, 0, 0).unwrap(),
            is_used: false,
            speed,
            crew_size,
            rating: 1.0,
        }
    }

    #[test]
    fn contains_pattern_escapes_like_metacharacters() {
        assert_eq!(contains_pattern("Vega"), "%Vega%");
        assert_eq!(contains_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn match_all_has_no_where_clause() {
        let sql = debug_query::<Pg, _>(&filtered(&Predicate::All)).to_string();
        assert!(!sql.contains("WHERE"), "{sql}");
    }

    #[test]
    fn filters_become_bound_conditions() {
        let filter = ShipFilter {
            name: Some("Ve".to_string()),
            is_used: Some(true),
            min_crew_size: Some(10),
            ..ShipFilter::default()
        };
        let sql = debug_query::<Pg, _>(&filtered(&filter.predicate())).to_string();
        assert!(sql.contains("WHERE"), "{sql}");
        assert!(sql.contains("\"ships\".\"name\" LIKE $1"), "{sql}");
        assert!(sql.contains("\"ships\".\"is_used\" = $2"), "{sql}");
        assert!(sql.contains("\"ships\".\"crew_size\" >= $3"), "{sql}");
        assert!(sql.contains("%Ve%"), "{sql}");
    }

    #[test]
    fn page_query_orders_with_id_tiebreak() {
        let page = PageRequest::new(2, 5).expect("page");
        let query = page_query(&Predicate::All, ShipOrder::Speed, page);
        let sql = debug_query::<Pg, _>(&query).to_string();
        assert!(sql.contains("ORDER BY \"ships\".\"speed\" ASC, \"ships\".\"id\" ASC"), "{sql}");
        assert!(sql.contains("LIMIT"), "{sql}");
        assert!(sql.contains("OFFSET"), "{sql}");
    }

    #[test]
    fn page_query_clamps_offsets_beyond_bigint() {
        // u32::MAX * u32::MAX does not fit in an i64 OFFSET.
        let page = PageRequest::new(u32::MAX, u32::MAX).expect("page");
        let query = page_query(&Predicate::All, ShipOrder::Id, page);
        let sql = debug_query::<Pg, _>(&query).to_string();
        assert!(sql.contains("OFFSET"), "{sql}");
        assert!(sql.contains(&i64::MAX.to_string()), "{sql}");
    }

    #[test]
    fn range_and_type_filters_use_inclusive_operators() {
        let filter = ShipFilter {
            ship_type: Some(ShipType::Merchant),
            after: Some(Utc.with_ymd_and_hms(2990, 1, 1, 0, 0, 0).unwrap()),
            before: Some(Utc.with_ymd_and_hms(3000, 12, 31, 0, 0, 0).unwrap()),
            min_speed: Some(0.2),
            max_rating: Some(3.5),
            ..ShipFilter::default()
        };
        let sql = debug_query::<Pg, _>(&filtered(&filter.predicate())).to_string();
        assert!(sql.contains("\"ships\".\"ship_type\" = $1"), "{sql}");
        assert!(sql.contains("\"ships\".\"prod_date\" >= $2"), "{sql}");
        assert!(sql.contains("\"ships\".\"prod_date\" <= $3"), "{sql}");
        assert!(sql.contains("\"ships\".\"speed\" >= $4"), "{sql}");
        assert!(sql.contains("\"ships\".\"rating\" <= $5"), "{sql}");
        assert!(!sql.contains("$6"), "{sql}");
        assert!(!sql.contains("\"speed\" <="), "{sql}");
        assert!(!sql.contains("\"rating\" >="), "{sql}");
        assert!(sql.contains("MERCHANT"), "{sql}");
    }

    #[test]
    fn single_bounds_translate_alone() {
        let upper_only = ShipFilter {
            max_speed: Some(0.8),
            ..ShipFilter::default()
        };
        let sql = debug_query::<Pg, _>(&filtered(&upper_only.predicate())).to_string();
        assert!(sql.contains("\"ships\".\"speed\" <= $1"), "{sql}");
        assert!(!sql.contains("$2"), "{sql}");

        let lower_only = ShipFilter {
            min_rating: Some(1.0),
            ..ShipFilter::default()
        };
        let sql = debug_query::<Pg, _>(&filtered(&lower_only.predicate())).to_string();
        assert!(sql.contains("\"ships\".\"rating\" >= $1"), "{sql}");
        assert!(!sql.contains("$2"), "{sql}");
    }

    #[test]
    #[ignore = "requires PostgreSQL via TEST_DATABASE_URL"]
    fn pg_store_round_trips_and_filters() {
        let mut test_db = TestDatabase::new();
        let store = PgShipStore::new(test_db.pool());

        let vega = store
            .insert(&new_ship("Vega", "Earth", 0.5, 100))
            .expect("insert");
        store
            .insert(&new_ship("Vela", "Mars", 0.2, 40))
            .expect("insert");
        store
            .insert(&new_ship("Deneb_1", "Mars", 0.9, 5))
            .expect("insert");

        assert_eq!(store.find(vega.id).expect("find"), Some(vega.clone()));
        assert_eq!(store.find(9_999).expect("find"), None);

        let mars = ShipFilter {
            planet: Some("Mars".to_string()),
            ..ShipFilter::default()
        };
        assert_eq!(store.count(&mars.predicate()).expect("count"), 2);

        let literal_underscore = ShipFilter {
            name: Some("b_".to_string()),
            ..ShipFilter::default()
        };
        assert_eq!(store.count(&literal_underscore.predicate()).expect("count"), 1);

        let page = PageRequest::new(0, 2).expect("page");
        let slowest = store
            .query(&Predicate::All, ShipOrder::Speed, page)
            .expect("query");
        let names: Vec<_> = slowest.iter().map(|ship| ship.name.as_str()).collect();
        assert_eq!(names, vec!["Vela", "Vega"]);

        let mut renamed = vega.clone();
        renamed.name = "Vega II".to_string();
        assert_eq!(store.update(&renamed).expect("update"), renamed);

        assert!(store.delete(vega.id).expect("delete"));
        assert!(!store.delete(vega.id).expect("delete"));
        assert_eq!(store.count(&Predicate::All).expect("count"), 2);
    }
}
