//! Production window, speed rounding and rating rules.

use chrono::{DateTime, Datelike, Utc};

/// Earliest accepted production year.
pub const MIN_PRODUCTION_YEAR: i32 = 2800;
/// Latest accepted production year.
pub const MAX_PRODUCTION_YEAR: i32 = 3019;
/// Year the rating formula measures ship age against.
pub const CURRENT_YEAR: i32 = 3019;

const RATING_FACTOR: f64 = 80.0;
const USED_COEFFICIENT: f64 = 0.5;
const NEW_COEFFICIENT: f64 = 1.0;

/// Round to two decimal places, halves away from zero.
///
/// Magnitudes too large to scale are returned as-is; they carry no fraction.
pub fn round_to_hundredths(value: f64) -> f64 {
    let scaled = value * 100.0;
    if scaled.is_finite() {
        scaled.round() / 100.0
    } else {
        value
    }
}

/// Whether the date's UTC year lies inside the production window.
pub fn is_within_production_window(prod_date: DateTime<Utc>) -> bool {
    (MIN_PRODUCTION_YEAR..=MAX_PRODUCTION_YEAR).contains(&prod_date.year())
}

/// Compute a ship rating from its persisted fields.
///
/// `80 * speed * k / (CURRENT_YEAR - year + 1)` where `k` halves the score of
/// used ships, rounded to two decimals.
pub fn compute_rating(speed: f64, is_used: bool, prod_date: DateTime<Utc>) -> f64 {
    let coefficient = if is_used {
        USED_COEFFICIENT
    } else {
        NEW_COEFFICIENT
    };
    let age = f64::from(CURRENT_YEAR - prod_date.year() + 1);
    round_to_hundredths(RATING_FACTOR * speed * coefficient / age)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn year(year: i32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(round_to_hundredths(0.126), 0.13);
        assert_eq!(round_to_hundredths(0.124), 0.12);
        assert_eq!(round_to_hundredths(12.0), 12.0);
    }

    #[test]
    fn rounding_keeps_huge_values_finite() {
        assert_eq!(round_to_hundredths(1e308), 1e308);
        assert_eq!(round_to_hundredths(-1e308), -1e308);
        assert!(compute_rating(1e306, false, year(3010)).is_finite());
        assert!(compute_rating(1e308, false, year(3010)).is_infinite());
    }

    #[test]
    fn rating_for_new_ship_in_current_year() {
        assert_eq!(compute_rating(0.5, false, year(CURRENT_YEAR)), 40.0);
    }

    #[test]
    fn rating_halves_for_used_ships() {
        // 80 * 0.82 * 0.5 / 25 = 1.312
        assert_eq!(compute_rating(0.82, true, year(2995)), 1.31);
        assert_eq!(compute_rating(0.82, false, year(2995)), 2.62);
    }

    #[test]
    fn production_window_is_inclusive() {
        let first = Utc.with_ymd_and_hms(2800, 1, 1, 0, 0, 0).unwrap();
        let last = Utc.with_ymd_and_hms(3019, 12, 31, 23, 59, 59).unwrap();
        assert!(is_within_production_window(first));
        assert!(is_within_production_window(last));
        assert!(!is_within_production_window(year(2799)));
        assert!(!is_within_production_window(year(3020)));
    }
}
