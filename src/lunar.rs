//! Moon phase, position and rise/set (low-precision analytic series).
//!
//! Phase: mean synodic month counted from the new moon of 1970-01-07 20:35 UTC,
//! optionally nudged by four small periodic terms.
//! Position: Van Flandern & Pulkkinen (1979) fundamental-argument series, good to a
//! few arc-minutes, with a topocentric parallax correction for the observer.
//! Rise/set: hourly altitude scan with three-point interpolation of RA and Dec and a
//! quadratic root solve inside the hour that changes sign.

use crate::coords::{local_sidereal_degrees, normalize_degrees, Equatorial, Horizontal};
use crate::{GeoPosition, HorizonCrossing, Instant, RiseSetResult, SECONDS_PER_DAY};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};
use tracing::{debug, trace};

/// Unix time of the reference new moon.
const REFERENCE_NEW_MOON: i64 = 583_084;
/// Mean synodic month, seconds (29.530588 days).
const SYNODIC_SECONDS: i64 = 2_551_443;
/// Days on either side of new and full moon shown without a trend.
const TREND_DEAD_BAND_DAYS: f64 = 1.0;
/// Equatorial Earth radius, km.
const EARTH_RADIUS_KM: f64 = 6378.14;

/// Which phase formula to use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PhaseModel {
    Fast,
    #[default]
    Accurate,
}

/// Coarse phase for display arrows and symbols.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseTrend {
    New,
    Waxing,
    Full,
    Waning,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoonPhase {
    /// Age of the moon in days since new, `0..~29.53`.
    pub age_days: f64,
    /// Illuminated part of the disc, 0 to 100.
    pub illumination_percent: f64,
    pub trend: PhaseTrend,
}

/// Moon phase at `instant`.
pub fn moon_phase(instant: Instant, model: PhaseModel) -> MoonPhase {
    let now = instant.unix_seconds();
    let since_reference = now - REFERENCE_NEW_MOON;
    let mut seconds = since_reference.rem_euclid(SYNODIC_SECONDS) as f64;

    if model == PhaseModel::Accurate {
        // Periodic terms; all four together move the phase by well under a second.
        let t = now as f64;
        seconds += -0.228_535
            + 0.005_919_97 * (t / 5_023_359.0 + 3.170_509_4).sin()
            + 0.017_672_776 * (t / 378_924.0 - 1.538_814_4).sin()
            - 0.003_884_442_9 * (t / 437_436.0 + 2.001_723_5).sin()
            - 0.000_414_88 * (t / 138_540.0 - 1.236_334).sin();
    }

    let age_days = seconds.abs() / SECONDS_PER_DAY as f64;
    let month_days = SYNODIC_SECONDS as f64 / SECONDS_PER_DAY as f64;
    MoonPhase {
        age_days,
        illumination_percent: 50.0 * (1.0 - (TAU * age_days / month_days).cos()),
        trend: phase_trend(age_days),
    }
}

fn phase_trend(age_days: f64) -> PhaseTrend {
    let half = SYNODIC_SECONDS as f64 / SECONDS_PER_DAY as f64 / 2.0;
    let delta = TREND_DEAD_BAND_DAYS;
    if age_days <= delta || age_days >= 2.0 * half - delta {
        PhaseTrend::New
    } else if age_days < half - delta {
        PhaseTrend::Waxing
    } else if age_days <= half + delta {
        PhaseTrend::Full
    } else {
        PhaseTrend::Waning
    }
}

/// Geocentric moon coordinates from the fundamental-argument series.
#[derive(Clone, Copy, Debug, PartialEq)]
struct SeriesPosition {
    /// Radians, not normalized.
    right_ascension: f64,
    /// Radians.
    declination: f64,
    /// Earth radii.
    distance: f64,
}

fn turns(base: f64, rate: f64, days: f64) -> f64 {
    let v = base + rate * days;
    (v - v.floor()) * TAU
}

/// `days` is measured from J2000.0.
fn series_position(days: f64) -> SeriesPosition {
    let h = turns(0.606_434, 0.036_601_101_29, days); // mean longitude
    let m = turns(0.374_897, 0.036_291_647_09, days); // mean anomaly
    let f = turns(0.259_091, 0.036_748_195_20, days); // argument of latitude
    let d = turns(0.827_362, 0.033_863_191_98, days); // mean elongation
    let n = turns(0.347_343, -0.000_147_093_91, days); // ascending node
    let g = turns(0.993_126, 0.002_737_778_50, days); // sun's mean anomaly

    let v = 0.39558 * (f + n).sin() + 0.08200 * f.sin() + 0.03257 * (m - f - n).sin()
        + 0.01092 * (m + f + n).sin()
        + 0.00666 * (m - f).sin()
        - 0.00644 * (m + f - 2.0 * d + n).sin()
        - 0.00331 * (f - 2.0 * d + n).sin()
        - 0.00304 * (f - 2.0 * d).sin()
        - 0.00240 * (m - f - 2.0 * d - n).sin()
        + 0.00226 * (m + f).sin()
        - 0.00108 * (m + f - 2.0 * d).sin()
        - 0.00079 * (f - n).sin()
        + 0.00078 * (f + 2.0 * d + n).sin();

    let u = 1.0 - 0.10828 * m.cos() - 0.01880 * (m - 2.0 * d).cos() - 0.01479 * (2.0 * d).cos()
        + 0.00181 * (2.0 * m - 2.0 * d).cos()
        - 0.00147 * (2.0 * m).cos()
        - 0.00105 * (2.0 * d - g).cos()
        - 0.00075 * (m - 2.0 * d + g).cos();

    let w = 0.10478 * m.sin() - 0.04105 * (2.0 * f + 2.0 * n).sin() - 0.02130 * (m - 2.0 * d).sin()
        - 0.01779 * (2.0 * f + n).sin()
        + 0.01774 * n.sin()
        + 0.00987 * (2.0 * d).sin()
        - 0.00338 * (m - 2.0 * f - 2.0 * n).sin()
        - 0.00309 * g.sin()
        - 0.00190 * (2.0 * f).sin()
        - 0.00144 * (m + n).sin()
        - 0.00144 * (m - 2.0 * f - n).sin()
        - 0.00113 * (m + 2.0 * f + 2.0 * n).sin()
        - 0.00094 * (m - 2.0 * d + g).sin()
        - 0.00092 * (2.0 * m - 2.0 * d).sin();

    let s = w / (u - v * v).sqrt();
    let right_ascension = h + (s / (1.0 - s * s).sqrt()).atan();
    let s = v / u.sqrt();
    let declination = (s / (1.0 - s * s).sqrt()).atan();

    SeriesPosition {
        right_ascension,
        declination,
        distance: 60.409_74 * u.sqrt(),
    }
}

/// Everything known about the moon at one instant for one observer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoonState {
    pub phase: MoonPhase,
    pub geocentric: Equatorial,
    pub topocentric: Equatorial,
    /// From the topocentric coordinates.
    pub horizontal: Horizontal,
    /// Centre-to-centre distance, km.
    pub distance_km: f64,
}

/// Moon position and phase for an observer at `instant`.
pub fn moon_position(instant: Instant, observer: &GeoPosition, model: PhaseModel) -> MoonState {
    let series = series_position(instant.days_since_j2000());
    let geocentric = Equatorial {
        right_ascension: normalize_degrees(series.right_ascension.to_degrees()),
        declination: series.declination.to_degrees(),
    };

    let lst = local_sidereal_degrees(instant, observer.longitude);
    let topocentric = topocentric(geocentric, lst, observer, series.distance);

    MoonState {
        phase: moon_phase(instant, model),
        geocentric,
        topocentric,
        horizontal: topocentric.to_horizontal(lst, observer),
        distance_km: series.distance * EARTH_RADIUS_KM,
    }
}

/// Parallax shift for an observer at sea level; `distance` in Earth radii.
fn topocentric(
    geo: Equatorial,
    lst: f64,
    observer: &GeoPosition,
    distance: f64,
) -> Equatorial {
    let sin_parallax = 1.0 / distance;
    let lat = observer.latitude.to_radians();
    let dec = geo.declination.to_radians();
    let h = geo.hour_angle(lst).to_radians();

    let rho_cos = lat.cos() * sin_parallax;
    let rho_sin = lat.sin() * sin_parallax;

    let denominator = dec.cos() - rho_cos * h.cos();
    let delta_ra = (-rho_cos * h.sin()).atan2(denominator);
    let declination = ((dec.sin() - rho_sin) * delta_ra.cos()).atan2(denominator);

    Equatorial {
        right_ascension: normalize_degrees(geo.right_ascension + delta_ra.to_degrees()),
        declination: declination.to_degrees(),
    }
}

/// Three-point interpolation through `f0`, `f1`, `f2` at `p` = 0, 0.5, 1.
fn interpolate(f0: f64, f1: f64, f2: f64, p: f64) -> f64 {
    let a = f1 - f0;
    let b = f2 - f1 - a;
    f0 + p * (2.0 * a + b * (2.0 * p - 1.0))
}

/// Sidereal rate: radians of hour angle per solar hour.
const HOUR_RATE: f64 = 15.0 * 1.002_737_9 * PI / 180.0;

/// Altitude threshold of the moon's centre, as a sine, for a given distance in
/// Earth radii: refraction and semi-diameter (0.567°) less the horizontal parallax.
fn horizon_sine(distance: f64) -> f64 {
    (90.567 - 41.685 / distance).to_radians().cos()
}

struct HourScan {
    sin_lat: f64,
    cos_lat: f64,
    threshold: f64,
}

impl HourScan {
    fn altitude(&self, hour_angle: f64, declination: f64) -> f64 {
        self.sin_lat * declination.sin()
            + self.cos_lat * declination.cos() * hour_angle.cos()
            - self.threshold
    }

    fn azimuth(&self, hour_angle: f64, declination: f64) -> f64 {
        let n = -declination.cos() * hour_angle.sin();
        let d = self.cos_lat * declination.sin() - self.sin_lat * declination.cos() * hour_angle.cos();
        normalize_degrees(n.atan2(d).to_degrees())
    }
}

/// Moon rise and set inside the 24 hours starting at `window_start`.
///
/// Pass the observer's local midnight (as a UTC instant) to get the local day.
pub fn rise_set(window_start: Instant, observer: &GeoPosition) -> RiseSetResult {
    let days = window_start.days_since_j2000();
    let samples = [
        series_position(days),
        series_position(days + 0.5),
        series_position(days + 1.0),
    ];

    // Unwrap RA so it increases through the window.
    let mut ra = samples.map(|s| s.right_ascension);
    if ra[1] <= ra[0] {
        ra[1] += TAU;
    }
    if ra[2] <= ra[1] {
        ra[2] += TAU;
    }
    let dec = samples.map(|s| s.declination);

    let scan = HourScan {
        sin_lat: observer.latitude.to_radians().sin(),
        cos_lat: observer.latitude.to_radians().cos(),
        threshold: horizon_sine(samples[1].distance),
    };
    let lst = local_sidereal_degrees(window_start, observer.longitude).to_radians();

    let mut rise = None;
    let mut set = None;
    let (mut ra0, mut dec0) = (ra[0], dec[0]);
    let mut v0 = scan.altitude(lst - ra0, dec0);

    for k in 0..24 {
        let p = f64::from(k + 1) / 24.0;
        let mut ra2 = interpolate(ra[0], ra[1], ra[2], p);
        let dec2 = interpolate(dec[0], dec[1], dec[2], p);
        if ra2 < ra0 {
            ra2 += TAU;
        }

        let hour = f64::from(k);
        let ha0 = lst - ra0 + hour * HOUR_RATE;
        let ha2 = lst - ra2 + hour * HOUR_RATE + HOUR_RATE;
        let v2 = scan.altitude(ha2, dec2);

        if (v0 > 0.0) != (v2 > 0.0) {
            let ha1 = (ha0 + ha2) / 2.0;
            let dec1 = (dec0 + dec2) / 2.0;
            let v1 = scan.altitude(ha1, dec1);

            let a = 2.0 * v2 - 4.0 * v1 + 2.0 * v0;
            let b = 4.0 * v1 - 3.0 * v0 - v2;
            let discriminant = b * b - 4.0 * a * v0;

            if discriminant >= 0.0 {
                let root = discriminant.sqrt();
                let e = if a.abs() < 1e-12 {
                    -v0 / b
                } else {
                    let first = (-b + root) / (2.0 * a);
                    if (0.0..=1.0).contains(&first) {
                        first
                    } else {
                        (-b - root) / (2.0 * a)
                    }
                };

                let crossing = HorizonCrossing {
                    at: window_start.plus_hours(hour + e),
                    azimuth: scan.azimuth(ha0 + e * (ha2 - ha0), dec1),
                };
                trace!(hour = k, fraction = e, ?crossing, "moon horizon crossing");
                if v0 < 0.0 && v2 > 0.0 {
                    rise = rise.or(Some(crossing));
                } else if v0 > 0.0 && v2 < 0.0 {
                    set = set.or(Some(crossing));
                }
            }
        }

        ra0 = ra2;
        dec0 = dec2;
        v0 = v2;
    }

    // With no crossing the sign at the end of the window holds for all of it.
    RiseSetResult::from_crossings(rise, set, v0 > 0.0)
}

/// The coming rise and set as seen at `now`.
///
/// Today's window starts at `window_start`; any event of today that `now` has already
/// passed is replaced by tomorrow's. `order` then tells which comes next.
pub fn next_rise_set(now: Instant, window_start: Instant, observer: &GeoPosition) -> RiseSetResult {
    let today = rise_set(window_start, observer);
    let tomorrow = rise_set(window_start.plus_days(1), observer);

    let pick = |today: Option<HorizonCrossing>, tomorrow: Option<HorizonCrossing>| match today {
        Some(event) if event.at > now => Some(event),
        _ => tomorrow,
    };
    let rise = pick(today.rise(), tomorrow.rise());
    let set = pick(today.set(), tomorrow.set());

    debug!(?today, ?tomorrow, "next moon rise/set");

    match (rise, set) {
        (None, None) => match today {
            RiseSetResult::NeverRises | RiseSetResult::NeverSets => today,
            _ => tomorrow,
        },
        _ => RiseSetResult::from_crossings(rise, set, false),
    }
}
