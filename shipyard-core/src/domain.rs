//! Domain entities for Shipyard.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{Result, ShipyardError};

/// Default number of ships returned per page.
pub const DEFAULT_PAGE_SIZE: u32 = 3;

/// Ship classification.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShipType {
    /// Cargo and passenger transport.
    Transport,
    /// Armed vessel.
    Military,
    /// Trading vessel.
    Merchant,
}

impl ShipType {
    /// Stable storage label.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipType::Transport => "TRANSPORT",
            ShipType::Military => "MILITARY",
            ShipType::Merchant => "MERCHANT",
        }
    }
}

impl fmt::Display for ShipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShipType {
    type Err = ShipyardError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "TRANSPORT" => Ok(ShipType::Transport),
            "MILITARY" => Ok(ShipType::Military),
            "MERCHANT" => Ok(ShipType::Merchant),
            other => Err(ShipyardError::bad_request(format!(
                "unknown ship type: {other}"
            ))),
        }
    }
}

/// A persisted ship record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Ship {
    /// Store-assigned identifier.
    pub id: i64,
    /// Ship name, 1-50 characters.
    pub name: String,
    /// Home planet, 1-50 characters.
    pub planet: String,
    /// Ship classification.
    pub ship_type: ShipType,
    /// Production date, serialized as epoch milliseconds.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[schema(value_type = i64)]
    pub prod_date: DateTime<Utc>,
    /// Whether the ship has had a previous owner.
    pub is_used: bool,
    /// Speed rounded to two decimal places.
    pub speed: f64,
    /// Crew size, 1-9999.
    pub crew_size: i32,
    /// Derived rating.
    pub rating: f64,
}

/// A validated ship awaiting an identifier from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewShip {
    /// Ship name.
    pub name: String,
    /// Home planet.
    pub planet: String,
    /// Ship classification.
    pub ship_type: ShipType,
    /// Production date.
    pub prod_date: DateTime<Utc>,
    /// Previous-owner flag.
    pub is_used: bool,
    /// Rounded speed.
    pub speed: f64,
    /// Crew size.
    pub crew_size: i32,
    /// Derived rating.
    pub rating: f64,
}

impl NewShip {
    /// Attach a store-assigned identifier.
    pub fn with_id(self, id: i64) -> Ship {
        Ship {
            id,
            name: self.name,
            planet: self.planet,
            ship_type: self.ship_type,
            prod_date: self.prod_date,
            is_used: self.is_used,
            speed: self.speed,
            crew_size: self.crew_size,
            rating: self.rating,
        }
    }
}

/// Request payload for creating or partially updating a ship.
///
/// Every field is optional so that missing values can be reported as
/// validation errors on create and treated as "unchanged" on update.
/// Client-supplied `id` and `rating` values are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShipRequest {
    /// Ship name.
    pub name: Option<String>,
    /// Home planet.
    pub planet: Option<String>,
    /// Ship classification.
    pub ship_type: Option<ShipType>,
    /// Production date as epoch milliseconds.
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<i64>)]
    pub prod_date: Option<DateTime<Utc>>,
    /// Previous-owner flag, defaults to `false` on create.
    pub is_used: Option<bool>,
    /// Speed, rounded to two decimals on write.
    pub speed: Option<f64>,
    /// Crew size.
    pub crew_size: Option<i32>,
}

/// Sort key for ship listings. Sorting is always ascending.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShipOrder {
    /// Sort by identifier.
    #[default]
    #[serde(alias = "id")]
    Id,
    /// Sort by name.
    #[serde(alias = "name")]
    Name,
    /// Sort by speed.
    #[serde(alias = "speed")]
    Speed,
    /// Sort by production date.
    #[serde(alias = "prodDate", alias = "date")]
    Date,
    /// Sort by rating.
    #[serde(alias = "rating")]
    Rating,
}

impl ShipOrder {
    /// Name of the ship field this order sorts on.
    pub fn field_name(&self) -> &'static str {
        match self {
            ShipOrder::Id => "id",
            ShipOrder::Name => "name",
            ShipOrder::Speed => "speed",
            ShipOrder::Date => "prodDate",
            ShipOrder::Rating => "rating",
        }
    }

    /// Compare two ships by this key, breaking ties by id.
    pub fn compare(&self, left: &Ship, right: &Ship) -> Ordering {
        let primary = match self {
            ShipOrder::Id => Ordering::Equal,
            ShipOrder::Name => left.name.cmp(&right.name),
            ShipOrder::Speed => left.speed.total_cmp(&right.speed),
            ShipOrder::Date => left.prod_date.cmp(&right.prod_date),
            ShipOrder::Rating => left.rating.total_cmp(&right.rating),
        };
        primary.then_with(|| left.id.cmp(&right.id))
    }
}

/// Zero-based page selection.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PageRequest {
    number: u32,
    size: u32,
}

impl PageRequest {
    /// Build a page request; the page size must be positive.
    pub fn new(number: u32, size: u32) -> Result<Self> {
        if size == 0 {
            return Err(ShipyardError::bad_request("pageSize must be at least 1"));
        }
        Ok(Self { number, size })
    }

    /// Zero-based page number.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Maximum number of ships on the page.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Number of ships skipped before this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.number) * u64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            number: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}
