#![deny(missing_docs)]
//! Shipyard core library.
//!
//! This crate contains the ship registry domain: record types, validation and
//! rating rules, filter composition and the storage seam used by the server.

pub mod domain;
pub mod error;
pub mod filter;
pub mod rating;
pub mod service;
pub mod store;

pub use domain::{DEFAULT_PAGE_SIZE, NewShip, PageRequest, Ship, ShipOrder, ShipRequest, ShipType};
pub use error::{Result, ShipyardError};
pub use filter::{ShipFilter, timestamp_from_millis};
pub use rating::{compute_rating, is_within_production_window, round_to_hundredths};
pub use service::{MAX_CREW_SIZE, MAX_TEXT_LEN, MIN_CREW_SIZE, ShipService};
pub use store::{MemoryShipStore, ShipStore};
