//! Optional ship predicates shared by listing and counting.

use chrono::{DateTime, Utc};

use crate::domain::{Ship, ShipType};
use crate::error::{Result, ShipyardError};

/// Conjunction of optional predicates; an unset field matches every ship.
///
/// Ranges are inclusive on both ends. Name and planet match by substring.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShipFilter {
    /// Substring of the ship name.
    pub name: Option<String>,
    /// Substring of the planet.
    pub planet: Option<String>,
    /// Exact ship type.
    pub ship_type: Option<ShipType>,
    /// Earliest production date.
    pub after: Option<DateTime<Utc>>,
    /// Latest production date.
    pub before: Option<DateTime<Utc>>,
    /// Previous-owner flag.
    pub is_used: Option<bool>,
    /// Minimum speed.
    pub min_speed: Option<f64>,
    /// Maximum speed.
    pub max_speed: Option<f64>,
    /// Minimum crew size.
    pub min_crew_size: Option<i32>,
    /// Maximum crew size.
    pub max_crew_size: Option<i32>,
    /// Minimum rating.
    pub min_rating: Option<f64>,
    /// Maximum rating.
    pub max_rating: Option<f64>,
}

impl ShipFilter {
    /// Whether no predicate is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Evaluate every present predicate against a ship.
    pub fn matches(&self, ship: &Ship) -> bool {
        let text = |needle: &Option<String>, haystack: &str| {
            needle.as_deref().is_none_or(|needle| haystack.contains(needle))
        };
        text(&self.name, &ship.name)
            && text(&self.planet, &ship.planet)
            && self.ship_type.is_none_or(|kind| kind == ship.ship_type)
            && self.after.is_none_or(|after| ship.prod_date >= after)
            && self.before.is_none_or(|before| ship.prod_date <= before)
            && self.is_used.is_none_or(|used| used == ship.is_used)
            && self.min_speed.is_none_or(|min| ship.speed >= min)
            && self.max_speed.is_none_or(|max| ship.speed <= max)
            && self.min_crew_size.is_none_or(|min| ship.crew_size >= min)
            && self.max_crew_size.is_none_or(|max| ship.crew_size <= max)
            && self.min_rating.is_none_or(|min| ship.rating >= min)
            && self.max_rating.is_none_or(|max| ship.rating <= max)
    }
}

/// Convert an optional epoch-millisecond value into a timestamp.
pub fn timestamp_from_millis(field: &str, millis: Option<i64>) -> Result<Option<DateTime<Utc>>> {
    millis
        .map(|value| {
            DateTime::from_timestamp_millis(value).ok_or_else(|| {
                ShipyardError::bad_request(format!("{field} is not a valid timestamp: {value}"))
            })
        })
        .transpose()
}
