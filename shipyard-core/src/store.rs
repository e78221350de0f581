//! Persistence abstractions for ship records.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::domain::{NewShip, PageRequest, Ship, ShipOrder};
use crate::error::{Result, ShipyardError};
use crate::filter::ShipFilter;

/// Abstraction over ship persistence for testability.
#[cfg_attr(test, mockall::automock)]
pub trait ShipStore {
    /// Load one sorted page of ships matching the filter.
    fn find_page(
        &self,
        filter: &ShipFilter,
        order: ShipOrder,
        page: PageRequest,
    ) -> Result<Vec<Ship>>;
    /// Count ships matching the filter.
    fn count(&self, filter: &ShipFilter) -> Result<u64>;
    /// Load a ship by id.
    fn find_by_id(&self, id: i64) -> Result<Option<Ship>>;
    /// Persist a new ship and return it with its assigned id.
    fn insert(&self, ship: NewShip) -> Result<Ship>;
    /// Overwrite an existing ship, failing with `NotFound` if it vanished.
    fn update(&self, ship: &Ship) -> Result<Ship>;
    /// Remove a ship, returning whether it existed.
    fn delete(&self, id: i64) -> Result<bool>;
}

#[derive(Debug, Default)]
struct MemoryState {
    last_id: i64,
    ships: BTreeMap<i64, Ship>,
}

/// In-process ship store backed by a sorted map.
#[derive(Debug, Default, Clone)]
pub struct MemoryShipStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryShipStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, f: impl FnOnce(&MemoryState) -> T) -> Result<T> {
        let state = self.state.read().map_err(|_| poisoned())?;
        Ok(f(&state))
    }

    fn write<T>(&self, f: impl FnOnce(&mut MemoryState) -> T) -> Result<T> {
        let mut state = self.state.write().map_err(|_| poisoned())?;
        Ok(f(&mut state))
    }
}

fn poisoned() -> ShipyardError {
    ShipyardError::store("ship store lock poisoned")
}

impl ShipStore for MemoryShipStore {
    fn find_page(
        &self,
        filter: &ShipFilter,
        order: ShipOrder,
        page: PageRequest,
    ) -> Result<Vec<Ship>> {
        self.read(|state| {
            let mut matching: Vec<&Ship> = state
                .ships
                .values()
                .filter(|ship| filter.matches(ship))
                .collect();
            matching.sort_by(|left, right| order.compare(left, right));
            let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
            matching
                .into_iter()
                .skip(offset)
                .take(page.size() as usize)
                .cloned()
                .collect()
        })
    }

    fn count(&self, filter: &ShipFilter) -> Result<u64> {
        self.read(|state| {
            state
                .ships
                .values()
                .filter(|ship| filter.matches(ship))
                .count() as u64
        })
    }

    fn find_by_id(&self, id: i64) -> Result<Option<Ship>> {
        self.read(|state| state.ships.get(&id).cloned())
    }

    fn insert(&self, ship: NewShip) -> Result<Ship> {
        self.write(|state| {
            state.last_id += 1;
            let ship = ship.with_id(state.last_id);
            state.ships.insert(ship.id, ship.clone());
            ship
        })
    }

    fn update(&self, ship: &Ship) -> Result<Ship> {
        self.write(|state| match state.ships.get_mut(&ship.id) {
            Some(existing) => {
                *existing = ship.clone();
                Ok(ship.clone())
            }
            None => Err(ShipyardError::ship_not_found(ship.id)),
        })?
    }

    fn delete(&self, id: i64) -> Result<bool> {
        self.write(|state| state.ships.remove(&id).is_some())
    }
}
