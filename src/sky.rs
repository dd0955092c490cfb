//! # Sky Snapshot
//!
//! One call that runs every engine for a single instant and observer and collects the
//! results in a serializable structure. The display (and the `--json` output of the
//! binary) reads from this.

use crate::calendar::{CalendarError, DateSet};
use crate::config::EngineSettings;
use crate::events::YearEvents;
use crate::lunar::{moon_position, next_rise_set, MoonState};
use crate::planets::{Ephemeris, PlanetPosition, SunPosition};
use crate::solar::{rise_set_transit, solar_position, Horizon, SolarDay, SolarPosition};
use crate::{GeoPosition, Instant, RiseSetResult};
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SkySnapshot {
    pub instant: Instant,
    pub position: GeoPosition,
    pub settings: EngineSettings,
    /// The UTC date in every calendar.
    pub dates: DateSet,
    pub sun: SolarPosition,
    /// Sun events for the UTC date, one entry per horizon in [`Horizon::ALL`] order.
    pub sun_days: Vec<SolarDay>,
    pub moon: MoonState,
    /// Next moon rise and set, looking forward from `instant`.
    pub moon_events: RiseSetResult,
    /// The Sun from the planetary orbit model, for comparison with `sun`.
    pub orbital_sun: SunPosition,
    pub planets: Vec<PlanetPosition>,
    /// Number of planets whose Kepler iteration did not converge.
    pub kepler_failures: usize,
    pub year: YearEvents,
}

impl SkySnapshot {
    pub fn compute(
        instant: Instant,
        position: GeoPosition,
        settings: EngineSettings,
    ) -> Result<Self, CalendarError> {
        let today = instant.absolute_day();
        let dates = DateSet::from_absolute(today)?;
        let midnight = Instant::start_of_day(today);

        let sun_days = Horizon::ALL
            .iter()
            .map(|&horizon| rise_set_transit(dates.gregorian, &position, horizon))
            .collect();

        let ephemeris = Ephemeris::at(instant, &position);
        let planets = ephemeris.all();
        let kepler_failures = ephemeris.kepler_failures(&planets);
        if kepler_failures > 0 {
            warn!(kepler_failures, "planet positions degraded");
        }

        let snapshot = SkySnapshot {
            instant,
            position,
            settings,
            dates,
            sun: solar_position(instant, &position),
            sun_days,
            moon: moon_position(instant, &position, settings.phase_model),
            moon_events: next_rise_set(instant, midnight, &position),
            orbital_sun: ephemeris.sun(),
            planets,
            kepler_failures,
            year: YearEvents::compute(dates.gregorian.year(), settings.easter_reckoning),
        };
        debug!(
            unix = instant.unix_seconds(),
            latitude = position.latitude,
            longitude = position.longitude,
            "sky snapshot computed"
        );
        Ok(snapshot)
    }

    /// Sun events under the configured horizon.
    pub fn sun_day(&self) -> Option<&SolarDay> {
        self.sun_days
            .iter()
            .find(|day| day.horizon == self.settings.horizon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planets::Body;

    fn oslo() -> GeoPosition {
        GeoPosition::new(59.945556, 10.75).unwrap()
    }

    #[test]
    fn snapshot_covers_every_engine() {
        // 2024-03-20T12:00Z
        let snapshot =
            SkySnapshot::compute(Instant::from_unix_seconds(1_710_936_000), oslo(), EngineSettings::default())
                .unwrap();

        assert_eq!(snapshot.dates.gregorian.day_of_year(), 80);
        assert_eq!(snapshot.sun_days.len(), 4);
        assert_eq!(snapshot.sun_day().map(|d| d.horizon), Some(Horizon::Actual));
        assert_eq!(snapshot.planets.len(), Body::VISIBLE.len());
        assert_eq!(snapshot.kepler_failures, 0);
        assert_eq!(snapshot.year.year, 2024);
        assert!(snapshot.year.easter.is_some());
        // Near the equinox the sun sits close to the celestial equator
        assert!(snapshot.sun.equatorial.declination.abs() < 1.0);
        assert!(
            (snapshot.sun.equatorial.declination - snapshot.orbital_sun.equatorial.declination).abs()
                < 1.0
        );
    }

    #[test]
    fn kepler_failures_match_reported_planets() {
        let now = Instant::from_unix_seconds(1_710_936_000);
        let snapshot = SkySnapshot::compute(now, oslo(), EngineSettings::default()).unwrap();
        let ephemeris = Ephemeris::at(now, &oslo());
        assert_eq!(snapshot.planets, ephemeris.all());
        assert_eq!(
            snapshot.kepler_failures,
            ephemeris.kepler_failures(&snapshot.planets)
        );
    }

    #[test]
    fn configured_horizon_selects_sun_day() {
        let settings = EngineSettings {
            horizon: Horizon::Nautical,
            ..EngineSettings::default()
        };
        let snapshot =
            SkySnapshot::compute(Instant::from_unix_seconds(1_710_936_000), oslo(), settings)
                .unwrap();
        let day = snapshot.sun_day().unwrap();
        assert_eq!(day.horizon, Horizon::Nautical);
        // Nautical dawn is earlier than sunrise
        let actual = &snapshot.sun_days[0];
        assert!(day.rise_hours().unwrap() < actual.rise_hours().unwrap());
    }

    #[test]
    fn upcoming_moon_events_are_in_the_future() {
        let now = Instant::from_unix_seconds(1_710_936_000);
        let snapshot = SkySnapshot::compute(now, oslo(), EngineSettings::default()).unwrap();
        for crossing in [snapshot.moon_events.rise(), snapshot.moon_events.set()]
            .into_iter()
            .flatten()
        {
            assert!(crossing.at > now);
            assert!(crossing.at.hours_since(now) < 48.0);
        }
    }

    #[test]
    fn instants_before_year_one_are_rejected() {
        let ancient = Instant::from_unix_seconds(-62_200_000_000);
        assert!(SkySnapshot::compute(ancient, oslo(), EngineSettings::default()).is_err());
    }
}
