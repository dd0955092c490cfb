//! # Solar Position and Day Events
//!
//! Sun coordinates follow the usual low-precision chain: mean longitude and mean
//! anomaly, equation of centre, apparent ecliptic longitude, then equatorial and
//! horizontal coordinates through local sidereal time. Good to about 0.01°.
//!
//! ## Rise, Set and Transit
//! Transit is local mean noon shifted by the equation of time (Milne's two-term
//! formula). Rise and set are the hour angles at which the sun's centre reaches the
//! horizon altitude, refined once with the declination re-evaluated at each event.
//!
//! | Horizon      | Sun centre altitude |
//! |--------------|---------------------|
//! | Actual       | -0.833°  (refraction and semi-diameter) |
//! | Civil        | -6°                 |
//! | Nautical     | -12°                |
//! | Astronomical | -18°                |
//!
//! When the altitude is never reached the result is `NeverRises` or `NeverSets`,
//! never an error: at high latitudes astronomical twilight can last all night.

use crate::calendar::{CalendarDate, GregorianDate};
use crate::coords::{local_sidereal_degrees, normalize_degrees, Equatorial, Horizontal};
use crate::{GeoPosition, HorizonCrossing, Instant, RiseSetResult};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Which altitude counts as "the horizon" for rise and set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Horizon {
    #[default]
    Actual,
    Civil,
    Nautical,
    Astronomical,
}

impl Horizon {
    pub const ALL: [Horizon; 4] = [
        Horizon::Actual,
        Horizon::Civil,
        Horizon::Nautical,
        Horizon::Astronomical,
    ];

    /// Altitude of the sun's centre at the event, degrees.
    pub fn altitude(self) -> f64 {
        match self {
            Horizon::Actual => -0.833,
            Horizon::Civil => -6.0,
            Horizon::Nautical => -12.0,
            Horizon::Astronomical => -18.0,
        }
    }
}

/// Where the sun is at one instant.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolarPosition {
    pub equatorial: Equatorial,
    pub horizontal: Horizontal,
}

/// Apparent right ascension and declination of the sun.
pub fn solar_equatorial(instant: Instant) -> Equatorial {
    let t = instant.julian_centuries();

    let mean_longitude = normalize_degrees(280.466_46 + t * (36_000.769_83 + 0.000_303_2 * t));
    let mean_anomaly = (357.529_11 + t * (35_999.050_29 - 0.000_153_7 * t)).to_radians();
    let centre = mean_anomaly.sin() * (1.914_602 - t * (0.004_817 + 0.000_014 * t))
        + (2.0 * mean_anomaly).sin() * (0.019_993 - 0.000_101 * t)
        + (3.0 * mean_anomaly).sin() * 0.000_289;

    let node = (125.04 - 1_934.136 * t).to_radians();
    let apparent_longitude = (mean_longitude + centre - 0.005_69 - 0.004_78 * node.sin()).to_radians();

    let mean_obliquity =
        23.0 + (26.0 + (21.448 - t * (46.815 + t * (0.000_59 - 0.001_813 * t))) / 60.0) / 60.0;
    let obliquity = (mean_obliquity + 0.002_56 * node.cos()).to_radians();

    let declination = (obliquity.sin() * apparent_longitude.sin()).asin();
    let right_ascension =
        (obliquity.cos() * apparent_longitude.sin()).atan2(apparent_longitude.cos());

    Equatorial {
        right_ascension: normalize_degrees(right_ascension.to_degrees()),
        declination: declination.to_degrees(),
    }
}

/// Sun azimuth and elevation for an observer. Elevation is geometric (no refraction).
pub fn solar_position(instant: Instant, observer: &GeoPosition) -> SolarPosition {
    let equatorial = solar_equatorial(instant);
    let lst = local_sidereal_degrees(instant, observer.longitude);
    SolarPosition {
        equatorial,
        horizontal: equatorial.to_horizontal(lst, observer),
    }
}

/// Equation of time in minutes (apparent minus mean solar time) for a 1-based day of
/// the year, after Milne (1921).
pub fn equation_of_time(day_of_year: u32) -> f64 {
    let m = 6.240_040_77 + 0.017_201_97 * f64::from(day_of_year);
    -7.659 * m.sin() + 9.863 * (2.0 * m + 3.5932).sin()
}

/// Sun events for one UTC date under one horizon.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolarDay {
    /// UTC midnight starting the date.
    pub day_start: Instant,
    pub horizon: Horizon,
    pub transit: Instant,
    /// Sun elevation at transit, degrees.
    pub transit_elevation: f64,
    /// Equation of time applied to the transit, minutes.
    pub equation_of_time: f64,
    pub events: RiseSetResult,
}

impl SolarDay {
    /// Transit in fractional UTC hours from the start of the date.
    pub fn transit_hours(&self) -> f64 {
        self.transit.hours_since(self.day_start)
    }

    /// Sunrise in fractional UTC hours, `None` when there is none to show.
    pub fn rise_hours(&self) -> Option<f64> {
        self.events.rise().map(|c| c.at.hours_since(self.day_start))
    }

    /// Sunset in fractional UTC hours, `None` when there is none to show.
    pub fn set_hours(&self) -> Option<f64> {
        self.events.set().map(|c| c.at.hours_since(self.day_start))
    }

    /// Hours between rise and set, zero or 24 for the degenerate cases.
    pub fn day_length_hours(&self) -> f64 {
        match self.events {
            RiseSetResult::NeverSets => 24.0,
            RiseSetResult::NeverRises => 0.0,
            _ => match (self.events.rise(), self.events.set()) {
                (Some(rise), Some(set)) => set.at.hours_since(rise.at),
                _ => 0.0,
            },
        }
    }
}

/// Cosine of the hour angle at which the sun reaches `altitude`, unclamped.
fn hour_angle_cosine(altitude: f64, latitude: f64, declination: f64) -> f64 {
    let (alt, lat, dec) = (
        altitude.to_radians(),
        latitude.to_radians(),
        declination.to_radians(),
    );
    (alt.sin() - lat.sin() * dec.sin()) / (lat.cos() * dec.cos())
}

/// Half the time between rise and set in minutes, or `Err(sun_up)` when the
/// altitude is never crossed.
fn semi_arc_minutes(altitude: f64, latitude: f64, declination: f64) -> Result<f64, bool> {
    let cos_h = hour_angle_cosine(altitude, latitude, declination);
    if cos_h < -1.0 {
        Err(true)
    } else if cos_h > 1.0 {
        Err(false)
    } else {
        // 4 minutes of time per degree of hour angle
        Ok(4.0 * cos_h.acos().to_degrees())
    }
}

/// Sunrise, transit and sunset for the UTC date `date` at `observer`.
pub fn rise_set_transit(date: GregorianDate, observer: &GeoPosition, horizon: Horizon) -> SolarDay {
    let day_start = Instant::start_of_day(date.to_absolute());
    let eot = equation_of_time(date.day_of_year());
    let transit_minutes = 720.0 - 4.0 * observer.longitude - eot;
    let at_minutes = |minutes: f64| day_start.plus_hours(minutes / 60.0);

    let transit = at_minutes(transit_minutes);
    let transit_sun = solar_position(transit, observer);
    let altitude = horizon.altitude();

    let events = match semi_arc_minutes(
        altitude,
        observer.latitude,
        transit_sun.equatorial.declination,
    ) {
        Err(sun_up) => RiseSetResult::from_crossings(None, None, sun_up),
        Ok(semi_arc) => {
            // Second pass: declination at the estimated event instants.
            let refine = |estimate: f64, sign: f64| -> HorizonCrossing {
                let dec = solar_equatorial(at_minutes(estimate)).declination;
                let minutes = match semi_arc_minutes(altitude, observer.latitude, dec) {
                    Ok(refined) => transit_minutes + sign * refined,
                    Err(_) => estimate,
                };
                let at = at_minutes(minutes);
                HorizonCrossing {
                    at,
                    azimuth: solar_position(at, observer).horizontal.azimuth,
                }
            };
            let rise = refine(transit_minutes - semi_arc, -1.0);
            let set = refine(transit_minutes + semi_arc, 1.0);
            RiseSetResult::from_crossings(Some(rise), Some(set), true)
        }
    };

    trace!(
        ?horizon,
        transit_minutes,
        eot,
        ?events,
        "solar day computed"
    );

    SolarDay {
        day_start,
        horizon,
        transit,
        transit_elevation: transit_sun.horizontal.elevation,
        equation_of_time: eot,
        events,
    }
}

/// Solar day for the UTC date containing `instant`.
pub fn solar_day_at(instant: Instant, observer: &GeoPosition, horizon: Horizon) -> Option<SolarDay> {
    let date = GregorianDate::from_absolute(instant.absolute_day()).ok()?;
    Some(rise_set_transit(date, observer, horizon))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oslo() -> GeoPosition {
        GeoPosition::new(59.945556, 10.75).unwrap()
    }

    #[test]
    fn milne_equation_of_time_extremes() {
        // Early November the sundial runs ~16 minutes fast, mid February ~14 slow
        assert!((equation_of_time(307) - 16.4).abs() < 0.6);
        assert!((equation_of_time(42) + 14.2).abs() < 0.6);
    }

    #[test]
    fn sun_declination_near_zero_at_equinox() {
        let t = Instant::from_unix_seconds(1_710_903_960); // 2024-03-20T03:06Z
        assert!(solar_equatorial(t).declination.abs() < 0.05);
    }

    #[test]
    fn civil_twilight_brackets_actual_horizon() {
        let date = GregorianDate::new(2024, 3, 20).unwrap();
        let actual = rise_set_transit(date, &oslo(), Horizon::Actual);
        let civil = rise_set_transit(date, &oslo(), Horizon::Civil);
        assert!(civil.rise_hours().unwrap() < actual.rise_hours().unwrap());
        assert!(civil.set_hours().unwrap() > actual.set_hours().unwrap());
    }

    #[test]
    fn polar_night_never_rises() {
        let svalbard = GeoPosition::new(78.2, 15.6).unwrap();
        let date = GregorianDate::new(2024, 12, 21).unwrap();
        let day = rise_set_transit(date, &svalbard, Horizon::Actual);
        assert_eq!(day.events, RiseSetResult::NeverRises);
        assert_eq!(day.rise_hours(), None);
        assert_eq!(day.day_length_hours(), 0.0);
    }

    #[test]
    fn astronomical_twilight_persists_in_oslo_summer() {
        let date = GregorianDate::new(2024, 6, 21).unwrap();
        let day = rise_set_transit(date, &oslo(), Horizon::Astronomical);
        assert_eq!(day.events, RiseSetResult::NeverSets);
    }

    #[test]
    fn western_sunset_can_spill_past_utc_midnight() {
        let new_york = GeoPosition::new(40.7, -74.0).unwrap();
        let date = GregorianDate::new(2024, 6, 21).unwrap();
        let day = rise_set_transit(date, &new_york, Horizon::Actual);
        let set = day.set_hours().unwrap();
        assert!((24.3..24.7).contains(&set), "sunset at {} h UTC", set);
    }
}
