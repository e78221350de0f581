//! Ship record operations: validation, derived fields and store access.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::{NewShip, PageRequest, Ship, ShipOrder, ShipRequest};
use crate::error::{Result, ShipyardError};
use crate::filter::ShipFilter;
use crate::rating::{
    MAX_PRODUCTION_YEAR, MIN_PRODUCTION_YEAR, compute_rating, is_within_production_window,
    round_to_hundredths,
};
use crate::store::ShipStore;

/// Maximum length of ship names and planets, in characters.
pub const MAX_TEXT_LEN: usize = 50;
/// Smallest accepted crew.
pub const MIN_CREW_SIZE: i32 = 1;
/// Largest accepted crew.
pub const MAX_CREW_SIZE: i32 = 9999;

/// Ship registry service over a pluggable store.
#[derive(Clone)]
pub struct ShipService {
    store: Arc<dyn ShipStore + Send + Sync>,
}

impl ShipService {
    /// Build a service over the given store.
    pub fn new(store: Arc<dyn ShipStore + Send + Sync>) -> Self {
        Self { store }
    }

    /// List one page of ships matching the filter.
    pub fn list(
        &self,
        filter: &ShipFilter,
        order: ShipOrder,
        page: PageRequest,
    ) -> Result<Vec<Ship>> {
        log::debug!(
            "listing ships by {} (page {}, size {}, filtered: {})",
            order.field_name(),
            page.number(),
            page.size(),
            !filter.is_empty()
        );
        self.store.find_page(filter, order, page)
    }

    /// Count ships matching the filter.
    pub fn count(&self, filter: &ShipFilter) -> Result<u64> {
        self.store.count(filter)
    }

    /// Fetch a ship by id. Zero is malformed; negative ids never resolve.
    pub fn get(&self, id: i64) -> Result<Ship> {
        if id == 0 {
            return Err(ShipyardError::bad_request("id must not be 0"));
        }
        if id < 0 {
            return Err(ShipyardError::ship_not_found(id));
        }
        self.store
            .find_by_id(id)?
            .ok_or_else(|| ShipyardError::ship_not_found(id))
    }

    /// Validate and persist a new ship.
    pub fn create(&self, request: ShipRequest) -> Result<Ship> {
        let name = checked_text("name", require("name", request.name)?)?;
        let planet = checked_text("planet", require("planet", request.planet)?)?;
        let ship_type = require("shipType", request.ship_type)?;
        let prod_date = checked_prod_date(require("prodDate", request.prod_date)?)?;
        let speed = checked_speed(require("speed", request.speed)?)?;
        let crew_size = checked_crew_size(require("crewSize", request.crew_size)?)?;
        let is_used = request.is_used.unwrap_or(false);

        let ship = NewShip {
            name,
            planet,
            ship_type,
            prod_date,
            is_used,
            speed,
            crew_size,
            rating: checked_rating(speed, is_used, prod_date)?,
        };
        let created = self.store.insert(ship)?;
        log::debug!("created ship {}", created.id);
        Ok(created)
    }

    /// Merge the fields present in `request` into an existing ship.
    ///
    /// Planet values that fail validation are ignored rather than rejected.
    pub fn update(&self, id: i64, request: ShipRequest) -> Result<Ship> {
        if id <= 0 {
            return Err(ShipyardError::bad_request(format!("invalid ship id {id}")));
        }
        log::debug!("update request for ship {id}");
        let mut ship = self.store.find_by_id(id)?.ok_or_else(|| {
            log::warn!("ship {id} not found for update");
            ShipyardError::ship_not_found(id)
        })?;

        if let Some(name) = request.name {
            ship.name = checked_text("name", name)?;
        }
        if let Some(planet) = request.planet.filter(|planet| is_valid_text(planet)) {
            ship.planet = planet;
        }
        if let Some(ship_type) = request.ship_type {
            ship.ship_type = ship_type;
        }
        if let Some(prod_date) = request.prod_date {
            ship.prod_date = checked_prod_date(prod_date)?;
        }
        if let Some(is_used) = request.is_used {
            ship.is_used = is_used;
        }
        if let Some(speed) = request.speed {
            ship.speed = checked_speed(speed)?;
        }
        if let Some(crew_size) = request.crew_size {
            ship.crew_size = checked_crew_size(crew_size)?;
        }
        ship.rating = checked_rating(ship.speed, ship.is_used, ship.prod_date)?;

        self.store.update(&ship)
    }

    /// Remove a ship by id.
    pub fn delete(&self, id: i64) -> Result<()> {
        if id <= 0 {
            return Err(ShipyardError::bad_request(format!("invalid ship id {id}")));
        }
        log::debug!("delete request for ship {id}");
        if self.store.delete(id)? {
            log::debug!("ship {id} deleted");
            Ok(())
        } else {
            log::warn!("ship {id} not found for delete");
            Err(ShipyardError::ship_not_found(id))
        }
    }
}

fn require<T>(field: &str, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| ShipyardError::bad_request(format!("{field} is required")))
}

fn is_valid_text(value: &str) -> bool {
    !value.is_empty() && value.chars().count() <= MAX_TEXT_LEN
}

fn checked_text(field: &str, value: String) -> Result<String> {
    if is_valid_text(&value) {
        Ok(value)
    } else {
        Err(ShipyardError::bad_request(format!(
            "{field} must be 1-{MAX_TEXT_LEN} characters"
        )))
    }
}

fn checked_prod_date(value: DateTime<Utc>) -> Result<DateTime<Utc>> {
    if is_within_production_window(value) {
        Ok(value)
    } else {
        Err(ShipyardError::bad_request(format!(
            "prodDate must fall within {MIN_PRODUCTION_YEAR}-{MAX_PRODUCTION_YEAR}"
        )))
    }
}

fn checked_speed(value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(round_to_hundredths(value))
    } else {
        Err(ShipyardError::bad_request("speed must be a finite number"))
    }
}

fn checked_rating(speed: f64, is_used: bool, prod_date: DateTime<Utc>) -> Result<f64> {
    let rating = compute_rating(speed, is_used, prod_date);
    if rating.is_finite() {
        Ok(rating)
    } else {
        Err(ShipyardError::bad_request(format!(
            "speed {speed} is too large to rate"
        )))
    }
}

fn checked_crew_size(value: i32) -> Result<i32> {
    if (MIN_CREW_SIZE..=MAX_CREW_SIZE).contains(&value) {
        Ok(value)
    } else {
        Err(ShipyardError::bad_request(format!(
            "crewSize must be within {MIN_CREW_SIZE}-{MAX_CREW_SIZE}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ShipType;
    use crate::store::{MemoryShipStore, MockShipStore};
    use chrono::TimeZone;
    use mockall::predicate::eq;

    fn date(year: i32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap()
    }

    fn valid_request() -> ShipRequest {
        ShipRequest {
            name: Some("Enterprise".to_string()),
            planet: Some("Earth".to_string()),
            ship_type: Some(ShipType::Military),
            prod_date: Some(date(3010)),
            is_used: None,
            speed: Some(0.756),
            crew_size: Some(430),
        }
    }

    fn memory_service() -> ShipService {
        ShipService::new(Arc::new(MemoryShipStore::new()))
    }

    fn assert_bad_request<T: std::fmt::Debug>(result: Result<T>) {
        match result {
            Err(ShipyardError::BadRequest(_)) => {}
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }

    fn assert_not_found<T: std::fmt::Debug>(result: Result<T>) {
        match result {
            Err(ShipyardError::NotFound(_)) => {}
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn create_rounds_speed_defaults_used_and_rates() {
        let service = memory_service();
        let ship = service.create(valid_request()).expect("create");

        assert_eq!(ship.id, 1);
        assert_eq!(ship.speed, 0.76);
        assert!(!ship.is_used);
        assert_eq!(ship.rating, compute_rating(0.76, false, date(3010)));
        assert_eq!(service.get(ship.id).expect("get"), ship);
    }

    #[test]
    fn create_rejects_long_name() {
        let service = memory_service();
        let request = ShipRequest {
            name: Some("x".repeat(51)),
            ..valid_request()
        };
        assert_bad_request(service.create(request));
    }

    #[test]
    fn create_accepts_fifty_character_name() {
        let service = memory_service();
        let request = ShipRequest {
            name: Some("x".repeat(50)),
            ..valid_request()
        };
        assert!(service.create(request).is_ok());
    }

    #[test]
    fn create_rejects_empty_name_and_planet() {
        let service = memory_service();
        assert_bad_request(service.create(ShipRequest {
            name: Some(String::new()),
            ..valid_request()
        }));
        assert_bad_request(service.create(ShipRequest {
            planet: Some(String::new()),
            ..valid_request()
        }));
    }

    #[test]
    fn create_rejects_crew_out_of_range() {
        let service = memory_service();
        assert_bad_request(service.create(ShipRequest {
            crew_size: Some(10000),
            ..valid_request()
        }));
        assert_bad_request(service.create(ShipRequest {
            crew_size: Some(0),
            ..valid_request()
        }));
    }

    #[test]
    fn create_rejects_dates_outside_window() {
        let service = memory_service();
        let early = Utc.with_ymd_and_hms(2799, 12, 31, 23, 59, 59).unwrap();
        assert_bad_request(service.create(ShipRequest {
            prod_date: Some(early),
            ..valid_request()
        }));
        assert_bad_request(service.create(ShipRequest {
            prod_date: Some(date(3020)),
            ..valid_request()
        }));
    }

    #[test]
    fn create_rejects_missing_fields() {
        let service = memory_service();
        assert_bad_request(service.create(ShipRequest {
            speed: None,
            ..valid_request()
        }));
        assert_bad_request(service.create(ShipRequest {
            ship_type: None,
            ..valid_request()
        }));
        assert_bad_request(service.create(ShipRequest::default()));
    }

    #[test]
    fn create_rejects_non_finite_speed() {
        let service = memory_service();
        assert_bad_request(service.create(ShipRequest {
            speed: Some(f64::NAN),
            ..valid_request()
        }));
    }

    #[test]
    fn create_rejects_speed_whose_rating_overflows() {
        let service = memory_service();
        assert_bad_request(service.create(ShipRequest {
            speed: Some(1e308),
            ..valid_request()
        }));
        assert_eq!(service.count(&ShipFilter::default()).expect("count"), 0);
    }

    #[test]
    fn create_keeps_huge_but_finite_speed_and_rating() {
        let service = memory_service();
        let ship = service
            .create(ShipRequest {
                speed: Some(1e306),
                ..valid_request()
            })
            .expect("create");

        assert_eq!(ship.speed, 1e306);
        assert!(ship.rating.is_finite());
        assert_eq!(ship.rating, compute_rating(1e306, false, date(3010)));
    }

    #[test]
    fn get_distinguishes_zero_from_negative_ids() {
        let service = memory_service();
        assert_bad_request(service.get(0));
        assert_not_found(service.get(-4));
        assert_not_found(service.get(999_999));
    }

    #[test]
    fn update_crew_size_only_changes_crew_and_rating() {
        let service = memory_service();
        let original = service
            .create(ShipRequest {
                is_used: Some(true),
                ..valid_request()
            })
            .expect("create");

        let updated = service
            .update(
                original.id,
                ShipRequest {
                    crew_size: Some(500),
                    ..ShipRequest::default()
                },
            )
            .expect("update");

        assert_eq!(updated.crew_size, 500);
        assert_eq!(
            Ship {
                crew_size: original.crew_size,
                rating: original.rating,
                ..updated.clone()
            },
            original
        );
        assert_eq!(
            updated.rating,
            compute_rating(updated.speed, updated.is_used, updated.prod_date)
        );
    }

    #[test]
    fn update_recomputes_rating_from_merged_fields() {
        let service = memory_service();
        let original = service.create(valid_request()).expect("create");

        let updated = service
            .update(
                original.id,
                ShipRequest {
                    is_used: Some(true),
                    speed: Some(0.333),
                    prod_date: Some(date(2900)),
                    ..ShipRequest::default()
                },
            )
            .expect("update");

        assert_eq!(updated.speed, 0.33);
        assert_eq!(updated.rating, compute_rating(0.33, true, date(2900)));
    }

    #[test]
    fn update_ignores_invalid_planet() {
        let service = memory_service();
        let original = service.create(valid_request()).expect("create");

        let updated = service
            .update(
                original.id,
                ShipRequest {
                    planet: Some("p".repeat(51)),
                    name: Some("Voyager".to_string()),
                    ..ShipRequest::default()
                },
            )
            .expect("update");

        assert_eq!(updated.planet, original.planet);
        assert_eq!(updated.name, "Voyager");

        let unchanged = service
            .update(
                original.id,
                ShipRequest {
                    planet: Some(String::new()),
                    ..ShipRequest::default()
                },
            )
            .expect("update");
        assert_eq!(unchanged.planet, original.planet);
    }

    #[test]
    fn update_rejects_invalid_fields_without_writing() {
        let service = memory_service();
        let original = service.create(valid_request()).expect("create");

        assert_bad_request(service.update(
            original.id,
            ShipRequest {
                name: Some(String::new()),
                ..ShipRequest::default()
            },
        ));
        assert_bad_request(service.update(
            original.id,
            ShipRequest {
                name: Some("x".repeat(51)),
                ..ShipRequest::default()
            },
        ));
        assert_bad_request(service.update(
            original.id,
            ShipRequest {
                speed: Some(1e308),
                ..ShipRequest::default()
            },
        ));
        assert_bad_request(service.update(
            original.id,
            ShipRequest {
                crew_size: Some(0),
                ..ShipRequest::default()
            },
        ));
        assert_bad_request(service.update(
            original.id,
            ShipRequest {
                speed: Some(0.5),
                prod_date: Some(date(3100)),
                ..ShipRequest::default()
            },
        ));
        assert_eq!(service.get(original.id).expect("get"), original);
    }

    #[test]
    fn update_rejects_bad_and_unknown_ids() {
        let service = memory_service();
        assert_bad_request(service.update(0, ShipRequest::default()));
        assert_bad_request(service.update(-1, ShipRequest::default()));
        assert_not_found(service.update(12, ShipRequest::default()));
    }

    #[test]
    fn delete_then_get_is_not_found() {
        let service = memory_service();
        let ship = service.create(valid_request()).expect("create");

        service.delete(ship.id).expect("delete");

        assert_not_found(service.get(ship.id));
        assert_not_found(service.delete(ship.id));
        assert_bad_request(service.delete(0));
    }

    #[test]
    fn count_matches_unpaginated_list() {
        let service = memory_service();
        for (name, used) in [("Alpha", true), ("Beta", false), ("Gamma", true), ("Delta", true)]
        {
            service
                .create(ShipRequest {
                    name: Some(name.to_string()),
                    is_used: Some(used),
                    ..valid_request()
                })
                .expect("create");
        }
        let filter = ShipFilter {
            is_used: Some(true),
            ..ShipFilter::default()
        };

        let all = service
            .list(&filter, ShipOrder::Id, PageRequest::new(0, 100).unwrap())
            .expect("list");
        let count = service.count(&filter).expect("count");

        assert_eq!(count, all.len() as u64);
        assert_eq!(count, 3);
    }

    #[test]
    fn default_listing_returns_first_three_by_id() {
        let service = memory_service();
        for name in ["One", "Two", "Three", "Four", "Five"] {
            service
                .create(ShipRequest {
                    name: Some(name.to_string()),
                    ..valid_request()
                })
                .expect("create");
        }

        let page = service
            .list(
                &ShipFilter::default(),
                ShipOrder::default(),
                PageRequest::default(),
            )
            .expect("list");

        let ids: Vec<i64> = page.iter().map(|ship| ship.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn store_errors_propagate() {
        let mut store = MockShipStore::new();
        store
            .expect_find_by_id()
            .with(eq(3))
            .returning(|_| Err(ShipyardError::store("connection reset")));
        let service = ShipService::new(Arc::new(store));

        assert_eq!(
            service.get(3),
            Err(ShipyardError::Store("connection reset".to_string()))
        );
    }

    #[test]
    fn create_does_not_touch_store_when_invalid() {
        let mut store = MockShipStore::new();
        store.expect_insert().never();
        let service = ShipService::new(Arc::new(store));

        assert_bad_request(service.create(ShipRequest {
            crew_size: Some(10000),
            ..valid_request()
        }));
    }

    #[test]
    fn list_forwards_order_and_page_to_store() {
        let mut store = MockShipStore::new();
        let page = PageRequest::new(2, 4).unwrap();
        store
            .expect_find_page()
            .withf(move |filter, order, requested| {
                filter.is_empty() && *order == ShipOrder::Rating && *requested == page
            })
            .times(1)
            .returning(|_, _, _| Ok(Vec::new()));
        let service = ShipService::new(Arc::new(store));

        let ships = service
            .list(&ShipFilter::default(), ShipOrder::Rating, page)
            .expect("list");

        assert!(ships.is_empty());
    }
}
