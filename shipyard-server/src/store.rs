//! PostgreSQL-backed ship store.

use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use shipyard_core::{NewShip, PageRequest, Ship, ShipFilter, ShipOrder, ShipStore, ShipyardError};

use crate::db::DbPool;
use crate::models::{ShipRecord, ShipValues};
use crate::schema::ships;

type PgPooled = PooledConnection<ConnectionManager<PgConnection>>;

/// Ship store backed by the `ships` table.
#[derive(Clone)]
pub struct PgShipStore {
    pool: DbPool,
}

impl PgShipStore {
    /// Wrap a connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> shipyard_core::Result<PgPooled> {
        self.pool.get().map_err(|err| {
            log::error!("database pool unavailable: {err}");
            ShipyardError::store(err)
        })
    }
}

fn query_failed(err: diesel::result::Error) -> ShipyardError {
    log::error!("ship query failed: {err}");
    ShipyardError::store(err)
}

/// `LIKE` pattern matching `needle` anywhere, with wildcards escaped.
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

/// Fold every present predicate onto the base `ships` query.
fn filtered(filter: &ShipFilter) -> ships::BoxedQuery<'static, Pg> {
    let mut query = ships::table.into_boxed();
    if let Some(name) = &filter.name {
        query = query.filter(ships::name.like(contains_pattern(name)).escape('\\'));
    }
    if let Some(planet) = &filter.planet {
        query = query.filter(ships::planet.like(contains_pattern(planet)).escape('\\'));
    }
    if let Some(ship_type) = filter.ship_type {
        query = query.filter(ships::ship_type.eq(ship_type.as_str()));
    }
    if let Some(after) = filter.after {
        query = query.filter(ships::prod_date.ge(after.naive_utc()));
    }
    if let Some(before) = filter.before {
        query = query.filter(ships::prod_date.le(before.naive_utc()));
    }
    if let Some(is_used) = filter.is_used {
        query = query.filter(ships::is_used.eq(is_used));
    }
    if let Some(min) = filter.min_speed {
        query = query.filter(ships::speed.ge(min));
    }
    if let Some(max) = filter.max_speed {
        query = query.filter(ships::speed.le(max));
    }
    if let Some(min) = filter.min_crew_size {
        query = query.filter(ships::crew_size.ge(min));
    }
    if let Some(max) = filter.max_crew_size {
        query = query.filter(ships::crew_size.le(max));
    }
    if let Some(min) = filter.min_rating {
        query = query.filter(ships::rating.ge(min));
    }
    if let Some(max) = filter.max_rating {
        query = query.filter(ships::rating.le(max));
    }
    query
}

impl ShipStore for PgShipStore {
    fn find_page(
        &self,
        filter: &ShipFilter,
        order: ShipOrder,
        page: PageRequest,
    ) -> shipyard_core::Result<Vec<Ship>> {
        let offset = i64::try_from(page.offset())
            .map_err(|_| ShipyardError::bad_request("page offset is too large"))?;
        let query = filtered(filter);
        let query = match order {
            ShipOrder::Id => query.order(ships::id.asc()),
            ShipOrder::Name => query.order((ships::name.asc(), ships::id.asc())),
            ShipOrder::Speed => query.order((ships::speed.asc(), ships::id.asc())),
            ShipOrder::Date => query.order((ships::prod_date.asc(), ships::id.asc())),
            ShipOrder::Rating => query.order((ships::rating.asc(), ships::id.asc())),
        };
        let mut conn = self.conn()?;
        let records = query
            .limit(i64::from(page.size()))
            .offset(offset)
            .select(ShipRecord::as_select())
            .load::<ShipRecord>(&mut conn)
            .map_err(query_failed)?;
        records.into_iter().map(Ship::try_from).collect()
    }

    fn count(&self, filter: &ShipFilter) -> shipyard_core::Result<u64> {
        let mut conn = self.conn()?;
        let total: i64 = filtered(filter)
            .count()
            .get_result(&mut conn)
            .map_err(query_failed)?;
        u64::try_from(total).map_err(ShipyardError::store)
    }

    fn find_by_id(&self, id: i64) -> shipyard_core::Result<Option<Ship>> {
        let mut conn = self.conn()?;
        ships::table
            .find(id)
            .select(ShipRecord::as_select())
            .first::<ShipRecord>(&mut conn)
            .optional()
            .map_err(query_failed)?
            .map(Ship::try_from)
            .transpose()
    }

    fn insert(&self, ship: NewShip) -> shipyard_core::Result<Ship> {
        let mut conn = self.conn()?;
        let record = diesel::insert_into(ships::table)
            .values(ShipValues::from(&ship))
            .returning(ShipRecord::as_returning())
            .get_result::<ShipRecord>(&mut conn)
            .map_err(query_failed)?;
        Ship::try_from(record)
    }

    fn update(&self, ship: &Ship) -> shipyard_core::Result<Ship> {
        let mut conn = self.conn()?;
        let record = diesel::update(ships::table.find(ship.id))
            .set(ShipValues::from(ship))
            .returning(ShipRecord::as_returning())
            .get_result::<ShipRecord>(&mut conn)
            .optional()
            .map_err(query_failed)?
            .ok_or_else(|| ShipyardError::ship_not_found(ship.id))?;
        Ship::try_from(record)
    }

    fn delete(&self, id: i64) -> shipyard_core::Result<bool> {
        let mut conn = self.conn()?;
        let removed = diesel::delete(ships::table.find(id))
            .execute(&mut conn)
            .map_err(query_failed)?;
        Ok(removed > 0)
    }
}
