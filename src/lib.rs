//! # Astro Clock Core Library
//!
//! This library is the computation engine behind the astro clock display. It turns a
//! UTC instant and a geographic position into solar, lunar and planetary ephemeris
//! data, rise/set times, yearly events, and the same day expressed in five calendars.
//!
//! ## Design Philosophy
//!
//! ### Pure Functions
//! - **Explicit inputs**: every engine function takes an [`Instant`] and, where the
//!   observer matters, a [`GeoPosition`]. There is no ambient location or clock state.
//! - **Bounded work**: the Kepler solver stops after 20 steps, the lunar rise/set scan
//!   visits exactly 24 hours, the eclipse search exactly 14 half-lunations.
//! - **Typed outcomes**: degenerate geometry ("the sun never sets today") and
//!   non-convergence are variants of the return type, never panics.
//!
//! ### Precision
//! All models are low-order analytic approximations sized for a microcontroller clock:
//! minutes for rise/set and equinoxes, a fraction of a degree for positions.
//!
//! ### Time Scales
//! - **Instant**: UTC seconds since the Unix epoch
//! - **Julian Day**: `unix / 86400 + 2440587.5`
//! - **AbsoluteDay**: day 1 = Gregorian 0001-01-01 (see [`calendar`])
//!
//! ## Core Types
//!
//! - [`Instant`]: a UTC moment
//! - [`GeoPosition`]: an observer on the Earth's surface
//! - [`RiseSetResult`]: the outcome of a rise/set search, shared by the sun and the moon

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Module declarations
pub mod calendar;
pub mod config;
pub mod coords;
pub mod eclipse;
pub mod events;
pub mod location;
pub mod lunar;
pub mod planets;
pub mod renderer;
pub mod sky;
pub mod solar;

use calendar::AbsoluteDay;

/// Seconds in one civil day.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Julian Day of the Unix epoch, 1970-01-01T00:00Z.
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;

/// Julian Day of the J2000.0 epoch, 2000-01-01T12:00 TT (treated as UTC here).
pub const J2000_JD: f64 = 2_451_545.0;

/// AbsoluteDay of 1970-01-01.
pub const UNIX_EPOCH_ABSOLUTE_DAY: i64 = 719_163;

/// A UTC moment, stored as whole seconds since the Unix epoch.
///
/// Sub-second precision is irrelevant at the accuracy of the engine's models.
///
/// # Example
/// ```
/// use astro_clock_lib::Instant;
///
/// let t = Instant::from_unix_seconds(946_728_000); // 2000-01-01T12:00:00Z
/// assert!((t.days_since_j2000()).abs() < 1e-9);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Instant(i64);

impl Instant {
    pub const fn from_unix_seconds(seconds: i64) -> Self {
        Instant(seconds)
    }

    pub const fn unix_seconds(self) -> i64 {
        self.0
    }

    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    pub fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Instant(datetime.timestamp())
    }

    /// `None` only for instants outside chrono's representable range.
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.0, 0)
    }

    /// Nearest whole second to the given Julian Day.
    pub fn from_julian_day(jd: f64) -> Self {
        Instant(((jd - UNIX_EPOCH_JD) * SECONDS_PER_DAY as f64).round() as i64)
    }

    pub fn julian_day(self) -> f64 {
        self.0 as f64 / SECONDS_PER_DAY as f64 + UNIX_EPOCH_JD
    }

    /// Fractional days since J2000.0.
    pub fn days_since_j2000(self) -> f64 {
        self.julian_day() - J2000_JD
    }

    /// Julian centuries since J2000.0, the time argument of the secular polynomials.
    pub fn julian_centuries(self) -> f64 {
        self.days_since_j2000() / 36_525.0
    }

    /// The UTC calendar day containing this instant.
    pub fn absolute_day(self) -> AbsoluteDay {
        AbsoluteDay::new(self.0.div_euclid(SECONDS_PER_DAY) + UNIX_EPOCH_ABSOLUTE_DAY)
    }

    /// UTC midnight at the start of `day`.
    pub fn start_of_day(day: AbsoluteDay) -> Self {
        Instant((day.value() - UNIX_EPOCH_ABSOLUTE_DAY) * SECONDS_PER_DAY)
    }

    pub fn plus_seconds(self, seconds: i64) -> Self {
        Instant(self.0 + seconds)
    }

    /// Offset by fractional hours, rounded to the nearest second.
    pub fn plus_hours(self, hours: f64) -> Self {
        Instant(self.0 + (hours * 3600.0).round() as i64)
    }

    pub fn plus_days(self, days: i64) -> Self {
        Instant(self.0 + days * SECONDS_PER_DAY)
    }

    /// Signed fractional hours from `origin` to `self`.
    pub fn hours_since(self, origin: Instant) -> f64 {
        (self.0 - origin.0) as f64 / 3600.0
    }
}

/// Errors raised when building a [`GeoPosition`] or decoding a grid locator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocationError {
    #[error("latitude {0} is outside -90..=90 degrees")]
    Latitude(f64),

    #[error("longitude {0} is outside -180..=180 degrees")]
    Longitude(f64),

    #[error("invalid Maidenhead locator {0:?}")]
    Locator(String),
}

/// Observer position in degrees, south and west negative. Elevation is taken as sea level.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPosition {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, LocationError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(LocationError::Latitude(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(LocationError::Longitude(longitude));
        }
        Ok(GeoPosition {
            latitude,
            longitude,
        })
    }

    /// True when both coordinates are inside their valid ranges.
    pub fn is_valid(&self) -> bool {
        Self::new(self.latitude, self.longitude).is_ok()
    }
}

/// Which of the two horizon crossings comes first inside the search window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventOrder {
    RiseFirst,
    SetFirst,
}

/// A single horizon crossing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HorizonCrossing {
    pub at: Instant,
    /// Degrees clockwise from true north.
    pub azimuth: f64,
}

/// Outcome of a rise/set search over one day-long window.
///
/// Near the poles the sun or moon can stay above or below the horizon for the whole
/// window, and the moon's ~24.8 hour day regularly leaves one event outside the window.
/// Each case is its own variant so callers match on it rather than on magic numbers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RiseSetResult {
    Normal {
        rise: HorizonCrossing,
        set: HorizonCrossing,
        order: EventOrder,
    },
    RiseOnly {
        rise: HorizonCrossing,
    },
    SetOnly {
        set: HorizonCrossing,
    },
    /// Below the horizon for the whole window.
    NeverRises,
    /// Above the horizon for the whole window.
    NeverSets,
}

impl RiseSetResult {
    /// Builds the result from whichever crossings were found. `body_up` decides between
    /// `NeverSets` and `NeverRises` when neither was.
    pub fn from_crossings(
        rise: Option<HorizonCrossing>,
        set: Option<HorizonCrossing>,
        body_up: bool,
    ) -> Self {
        match (rise, set) {
            (Some(rise), Some(set)) => RiseSetResult::Normal {
                rise,
                set,
                order: if rise.at <= set.at {
                    EventOrder::RiseFirst
                } else {
                    EventOrder::SetFirst
                },
            },
            (Some(rise), None) => RiseSetResult::RiseOnly { rise },
            (None, Some(set)) => RiseSetResult::SetOnly { set },
            (None, None) if body_up => RiseSetResult::NeverSets,
            (None, None) => RiseSetResult::NeverRises,
        }
    }

    pub fn rise(&self) -> Option<HorizonCrossing> {
        match *self {
            RiseSetResult::Normal { rise, .. } | RiseSetResult::RiseOnly { rise } => Some(rise),
            _ => None,
        }
    }

    pub fn set(&self) -> Option<HorizonCrossing> {
        match *self {
            RiseSetResult::Normal { set, .. } | RiseSetResult::SetOnly { set } => Some(set),
            _ => None,
        }
    }

    pub fn order(&self) -> Option<EventOrder> {
        match *self {
            RiseSetResult::Normal { order, .. } => Some(order),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn instant_julian_day_matches_unix_epoch() {
        let epoch = Instant::from_unix_seconds(0);
        assert_eq!(epoch.julian_day(), UNIX_EPOCH_JD);
        assert_eq!(epoch.absolute_day().value(), UNIX_EPOCH_ABSOLUTE_DAY);
        assert_eq!(Instant::from_julian_day(UNIX_EPOCH_JD), epoch);
    }

    #[test]
    fn instant_absolute_day_floors_before_epoch() {
        let before = Instant::from_unix_seconds(-1);
        assert_eq!(before.absolute_day().value(), UNIX_EPOCH_ABSOLUTE_DAY - 1);
        assert_eq!(
            Instant::start_of_day(before.absolute_day()),
            Instant::from_unix_seconds(-SECONDS_PER_DAY)
        );
    }

    #[test]
    fn instant_round_trips_through_chrono() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 20, 3, 6, 0).unwrap();
        let instant = Instant::from_datetime(dt);
        assert_eq!(instant.to_datetime(), Some(dt));
        assert_eq!(instant.plus_hours(1.5).hours_since(instant), 1.5);
    }

    #[test]
    fn geo_position_rejects_out_of_range() {
        assert_eq!(
            GeoPosition::new(91.0, 0.0),
            Err(LocationError::Latitude(91.0))
        );
        assert_eq!(
            GeoPosition::new(0.0, -180.5),
            Err(LocationError::Longitude(-180.5))
        );
        assert!(GeoPosition::new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn rise_set_order_follows_instants() {
        let early = HorizonCrossing {
            at: Instant::from_unix_seconds(100),
            azimuth: 90.0,
        };
        let late = HorizonCrossing {
            at: Instant::from_unix_seconds(200),
            azimuth: 270.0,
        };
        let result = RiseSetResult::from_crossings(Some(late), Some(early), true);
        assert_eq!(result.order(), Some(EventOrder::SetFirst));
        assert_eq!(
            RiseSetResult::from_crossings(None, None, false),
            RiseSetResult::NeverRises
        );
        assert_eq!(
            RiseSetResult::from_crossings(None, None, true),
            RiseSetResult::NeverSets
        );
    }
}
