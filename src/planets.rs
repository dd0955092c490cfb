//! # Planetary Ephemeris
//!
//! Keplerian propagation of the JPL "approximate positions of the planets" mean
//! elements (valid 1800–2050), then a geocentric projection:
//!
//! 1. Evaluate the elements at T (Julian centuries since J2000) with linear drift
//! 2. Solve Kepler's equation for the eccentric anomaly (Newton, at most 20 steps)
//! 3. Rotate the orbital-plane position by ϖ − Ω, i and Ω into ecliptic coordinates
//! 4. Subtract the Earth's heliocentric vector, rotate by the obliquity to equatorial
//! 5. Project onto the observer's horizon with local sidereal time
//!
//! Brightness uses the Sun–planet–Earth triangle and an empirical magnitude law.
//!
//! [`Ephemeris`] computes the Earth and local sidereal time once per instant and
//! reuses them for every body.

use crate::coords::{local_sidereal_degrees, Equatorial, Horizontal, Vector3};
use crate::{GeoPosition, Instant};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Mean obliquity of the ecliptic at J2000, degrees.
const OBLIQUITY_J2000: f64 = 23.439_28;
/// Newton iteration stops below this step, radians.
const KEPLER_TOLERANCE: f64 = 1e-6;
const KEPLER_MAX_ITERATIONS: u32 = 20;
/// Guard against acos of a degenerate triangle.
const TRIANGLE_EPSILON: f64 = 1e-12;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Body {
    Mercury,
    Venus,
    Earth,
    Mars,
    Jupiter,
    Saturn,
}

impl Body {
    /// Bodies that can be observed from Earth.
    pub const VISIBLE: [Body; 5] = [Body::Mercury, Body::Venus, Body::Mars, Body::Jupiter, Body::Saturn];

    pub fn name(self) -> &'static str {
        match self {
            Body::Mercury => "Mercury",
            Body::Venus => "Venus",
            Body::Earth => "Earth",
            Body::Mars => "Mars",
            Body::Jupiter => "Jupiter",
            Body::Saturn => "Saturn",
        }
    }

    pub fn elements(self) -> &'static OrbitalElements {
        &ELEMENTS[self as usize]
    }

    /// Magnitude at 1 AU from Sun and Earth, and its phase-angle coefficient per degree.
    fn magnitude_law(self) -> (f64, f64) {
        match self {
            Body::Mercury => (-0.36, 0.027),
            Body::Venus => (-4.34, 0.013),
            Body::Earth => (0.0, 0.0),
            Body::Mars => (-1.51, 0.016),
            Body::Jupiter => (-9.25, 0.014),
            Body::Saturn => (-9.00, 0.044),
        }
    }
}

/// A slowly drifting orbital element: value at J2000 plus a rate per Julian century.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Element {
    pub value: f64,
    pub rate: f64,
}

impl Element {
    const fn new(value: f64, rate: f64) -> Self {
        Element { value, rate }
    }

    pub fn at(&self, centuries: f64) -> f64 {
        self.value + self.rate * centuries
    }
}

/// Mean orbital elements; AU and degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitalElements {
    pub semi_major_axis: Element,
    pub eccentricity: Element,
    pub inclination: Element,
    pub mean_longitude: Element,
    pub longitude_perihelion: Element,
    pub longitude_ascending_node: Element,
}

const fn elements(rows: [(f64, f64); 6]) -> OrbitalElements {
    OrbitalElements {
        semi_major_axis: Element::new(rows[0].0, rows[0].1),
        eccentricity: Element::new(rows[1].0, rows[1].1),
        inclination: Element::new(rows[2].0, rows[2].1),
        mean_longitude: Element::new(rows[3].0, rows[3].1),
        longitude_perihelion: Element::new(rows[4].0, rows[4].1),
        longitude_ascending_node: Element::new(rows[5].0, rows[5].1),
    }
}

/// Indexed by `Body as usize`.
static ELEMENTS: [OrbitalElements; 6] = [
    // Mercury
    elements([
        (0.387_099_27, 0.000_000_37),
        (0.205_635_93, 0.000_019_06),
        (7.004_979_02, -0.005_947_49),
        (252.250_323_50, 149_472.674_111_75),
        (77.457_796_28, 0.160_476_89),
        (48.330_765_93, -0.125_340_81),
    ]),
    // Venus
    elements([
        (0.723_335_66, 0.000_003_90),
        (0.006_776_72, -0.000_041_07),
        (3.394_676_05, -0.000_788_90),
        (181.979_099_50, 58_517.815_387_29),
        (131.602_467_18, 0.002_683_29),
        (76.679_842_55, -0.277_694_18),
    ]),
    // Earth-Moon barycentre
    elements([
        (1.000_002_61, 0.000_005_62),
        (0.016_711_23, -0.000_043_92),
        (-0.000_015_31, -0.012_946_68),
        (100.464_571_66, 35_999.372_449_81),
        (102.937_681_93, 0.323_273_64),
        (0.0, 0.0),
    ]),
    // Mars
    elements([
        (1.523_710_34, 0.000_018_47),
        (0.093_394_10, 0.000_078_82),
        (1.849_691_42, -0.008_131_31),
        (-4.553_432_05, 19_140.302_684_99),
        (-23.943_629_59, 0.444_410_88),
        (49.559_538_91, -0.292_573_43),
    ]),
    // Jupiter
    elements([
        (5.202_887_00, -0.000_116_07),
        (0.048_386_24, -0.000_132_53),
        (1.304_396_95, -0.001_837_14),
        (34.396_440_51, 3_034.746_127_75),
        (14.728_479_83, 0.212_526_68),
        (100.473_909_09, 0.204_691_06),
    ]),
    // Saturn
    elements([
        (9.536_675_94, -0.001_250_60),
        (0.053_861_79, -0.000_509_91),
        (2.485_991_87, 0.001_936_09),
        (49.954_244_23, 1_222.493_622_01),
        (92.598_878_31, -0.418_972_16),
        (113.662_424_48, -0.288_677_94),
    ]),
];

/// Result of solving Kepler's equation `E = M + e·sin(E)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum KeplerOutcome {
    Converged { eccentric_anomaly: f64, iterations: u32 },
    /// Newton's method did not settle within the iteration limit.
    Diverged,
}

impl KeplerOutcome {
    /// The solved anomaly, or 0 for a diverged solve.
    pub fn eccentric_anomaly(&self) -> f64 {
        match *self {
            KeplerOutcome::Converged {
                eccentric_anomaly, ..
            } => eccentric_anomaly,
            KeplerOutcome::Diverged => 0.0,
        }
    }

    pub fn converged(&self) -> bool {
        matches!(self, KeplerOutcome::Converged { .. })
    }
}

/// Newton iteration for the eccentric anomaly; angles in radians.
pub fn solve_kepler(mean_anomaly: f64, eccentricity: f64) -> KeplerOutcome {
    let mut e_anomaly = mean_anomaly + eccentricity * mean_anomaly.sin();
    for iteration in 1..=KEPLER_MAX_ITERATIONS {
        let delta = (mean_anomaly - e_anomaly + eccentricity * e_anomaly.sin())
            / (1.0 - eccentricity * e_anomaly.cos());
        e_anomaly += delta;
        if delta.abs() <= KEPLER_TOLERANCE {
            return KeplerOutcome::Converged {
                eccentric_anomaly: e_anomaly,
                iterations: iteration,
            };
        }
    }
    KeplerOutcome::Diverged
}

/// Heliocentric ecliptic position of a body.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Heliocentric {
    position: Vector3,
    kepler: KeplerOutcome,
}

fn heliocentric(body: Body, centuries: f64) -> Heliocentric {
    let el = body.elements();
    let a = el.semi_major_axis.at(centuries);
    let e = el.eccentricity.at(centuries);
    let inclination = el.inclination.at(centuries).to_radians();
    let mean_longitude = el.mean_longitude.at(centuries);
    let perihelion = el.longitude_perihelion.at(centuries);
    let node = el.longitude_ascending_node.at(centuries);

    let mean_anomaly = (mean_longitude - perihelion).rem_euclid(360.0).to_radians();
    let kepler = solve_kepler(mean_anomaly, e);
    if !kepler.converged() {
        warn!(
            body = body.name(),
            mean_anomaly,
            eccentricity = e,
            "Kepler solver did not converge, using E = 0"
        );
    }
    let ecc_anomaly = kepler.eccentric_anomaly();

    let true_anomaly = 2.0 * (((1.0 + e) / (1.0 - e)).sqrt() * (ecc_anomaly / 2.0).tan()).atan();
    let radius = a * (1.0 - e * ecc_anomaly.cos());

    let position = Vector3::new(radius * true_anomaly.cos(), radius * true_anomaly.sin(), 0.0)
        .rotate_z((perihelion - node).to_radians())
        .rotate_x(inclination)
        .rotate_z(node.to_radians());

    Heliocentric { position, kepler }
}

/// Geocentric ecliptic vector to equatorial RA/Dec.
fn ecliptic_to_equatorial(vector: Vector3) -> Equatorial {
    let (right_ascension, declination) = vector
        .rotate_x(OBLIQUITY_J2000.to_radians())
        .to_spherical_degrees();
    Equatorial {
        right_ascension,
        declination,
    }
}

/// Angle at `vertex` of the triangle with sides `adjacent1`, `adjacent2` and `opposite`,
/// degrees. Collinear and zero-length cases are clamped instead of producing NaN.
fn triangle_angle(adjacent1: f64, adjacent2: f64, opposite: f64) -> f64 {
    let denominator = 2.0 * adjacent1 * adjacent2;
    if denominator.abs() < TRIANGLE_EPSILON {
        return 0.0;
    }
    let cosine = (adjacent1 * adjacent1 + adjacent2 * adjacent2 - opposite * opposite) / denominator;
    cosine.clamp(-1.0, 1.0).acos().to_degrees()
}

/// Visual magnitude; 0 for the Earth and when the planet sits on the observer.
fn apparent_magnitude(body: Body, sun_distance: f64, earth_distance: f64, phase_angle: f64) -> f64 {
    if body == Body::Earth || earth_distance < TRIANGLE_EPSILON {
        return 0.0;
    }
    let (offset, coefficient) = body.magnitude_law();
    // Saturn's rings add 0.74 at average tilt
    let rings = if body == Body::Saturn { -0.74 } else { 0.0 };
    offset + 5.0 * (sun_distance * earth_distance).log10() + coefficient * phase_angle + rings
}

/// Everything reported for one planet.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanetPosition {
    pub body: Body,
    pub equatorial: Equatorial,
    pub horizontal: Horizontal,
    /// Distance from Earth, AU.
    pub distance_au: f64,
    /// Distance from the Sun, AU.
    pub sun_distance_au: f64,
    /// Sun–Earth–planet angle, degrees.
    pub elongation: f64,
    /// Sun–planet–Earth angle, degrees.
    pub phase_angle: f64,
    /// Illuminated fraction of the disc, 0 to 1.
    pub phase: f64,
    pub magnitude: f64,
    pub kepler: KeplerOutcome,
}

/// The Sun as seen from the Earth, from the same orbit model.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SunPosition {
    pub equatorial: Equatorial,
    pub horizontal: Horizontal,
    pub distance_au: f64,
}

/// Planet positions for one instant and observer.
///
/// The Earth's heliocentric position and the local sidereal time are computed once in
/// [`Ephemeris::at`] and shared by every query.
#[derive(Clone, Debug)]
pub struct Ephemeris {
    centuries: f64,
    earth: Heliocentric,
    local_sidereal: f64,
    observer: GeoPosition,
}

impl Ephemeris {
    pub fn at(instant: Instant, observer: &GeoPosition) -> Self {
        let centuries = instant.julian_centuries();
        Ephemeris {
            centuries,
            earth: heliocentric(Body::Earth, centuries),
            local_sidereal: local_sidereal_degrees(instant, observer.longitude),
            observer: *observer,
        }
    }

    /// Position of the Sun: the reverse of the Earth's heliocentric vector.
    pub fn sun(&self) -> SunPosition {
        let geocentric = -self.earth.position;
        let equatorial = ecliptic_to_equatorial(geocentric);
        SunPosition {
            equatorial,
            horizontal: equatorial.to_horizontal(self.local_sidereal, &self.observer),
            distance_au: geocentric.length(),
        }
    }

    /// Position of `body`. Asking for the Earth returns the anti-solar point with zero
    /// brightness, which callers normally skip via [`Body::VISIBLE`].
    pub fn position(&self, body: Body) -> PlanetPosition {
        let planet = if body == Body::Earth {
            self.earth
        } else {
            heliocentric(body, self.centuries)
        };
        let geocentric = planet.position - self.earth.position;
        let equatorial = ecliptic_to_equatorial(geocentric);

        let sun_distance = planet.position.length();
        let earth_distance = geocentric.length();
        let earth_sun = self.earth.position.length();

        let phase_angle = triangle_angle(sun_distance, earth_distance, earth_sun);
        let elongation = triangle_angle(earth_sun, earth_distance, sun_distance);

        PlanetPosition {
            body,
            equatorial,
            horizontal: equatorial.to_horizontal(self.local_sidereal, &self.observer),
            distance_au: earth_distance,
            sun_distance_au: sun_distance,
            elongation,
            phase_angle,
            phase: (1.0 + phase_angle.to_radians().cos()) / 2.0,
            magnitude: apparent_magnitude(body, sun_distance, earth_distance, phase_angle),
            kepler: planet.kepler,
        }
    }

    /// All observable planets, Mercury to Saturn.
    pub fn all(&self) -> Vec<PlanetPosition> {
        Body::VISIBLE.iter().map(|&b| self.position(b)).collect()
    }

    /// How many Kepler solves fell back to E = 0: the Earth's plus those of `planets`,
    /// which should come from this ephemeris (usually [`Ephemeris::all`]).
    pub fn kepler_failures(&self, planets: &[PlanetPosition]) -> usize {
        let earth = usize::from(!self.earth.kepler.converged());
        earth + planets.iter().filter(|p| !p.kepler.converged()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jd(jd: f64) -> Instant {
        Instant::from_julian_day(jd)
    }

    fn greenwich() -> GeoPosition {
        GeoPosition::new(51.4779, 0.0).unwrap()
    }

    #[test]
    fn kepler_circular_orbit_converges_immediately() {
        assert_eq!(
            solve_kepler(0.0, 0.0),
            KeplerOutcome::Converged {
                eccentric_anomaly: 0.0,
                iterations: 1
            }
        );
    }

    #[test]
    fn kepler_satisfies_equation() {
        let (m, e) = (1.2, 0.2);
        let outcome = solve_kepler(m, e);
        let big_e = outcome.eccentric_anomaly();
        assert!(outcome.converged());
        assert!((big_e - e * big_e.sin() - m).abs() < 1e-6);
    }

    #[test]
    fn kepler_failure_falls_back_to_zero() {
        // A NaN step never drops below the tolerance
        let outcome = solve_kepler(1.0, f64::NAN);
        assert_eq!(outcome, KeplerOutcome::Diverged);
        assert_eq!(outcome.eccentric_anomaly(), 0.0);
    }

    #[test]
    fn jupiter_at_opposition_december_2024() {
        let eph = Ephemeris::at(jd(2_460_651.5), &greenwich());
        let jupiter = eph.position(Body::Jupiter);
        assert!((jupiter.distance_au - 4.09).abs() < 0.05);
        assert!((jupiter.magnitude + 2.66).abs() < 0.2);
        assert!(jupiter.phase > 0.999);
        assert!(jupiter.elongation > 175.0);
        assert!((jupiter.equatorial.right_ascension / 15.0 - 4.99).abs() < 0.1);
    }

    #[test]
    fn venus_near_greatest_elongation_is_half_lit() {
        let eph = Ephemeris::at(jd(2_460_685.5), &greenwich());
        let venus = eph.position(Body::Venus);
        assert!((venus.phase - 0.51).abs() < 0.05);
        assert!((venus.elongation - 47.0).abs() < 1.5);
        assert!(venus.magnitude < -4.5);
    }

    #[test]
    fn sun_from_orbit_matches_solar_engine() {
        let t = jd(2_460_389.5); // 2024-03-20
        let eph = Ephemeris::at(t, &greenwich());
        let sun = eph.sun();
        let solar = crate::solar::solar_equatorial(t);
        assert!((sun.equatorial.declination - solar.declination).abs() < 0.1);
        assert!((sun.distance_au - 0.996).abs() < 0.005);
    }

    #[test]
    fn all_planets_converge() {
        let eph = Ephemeris::at(jd(2_460_651.5), &greenwich());
        let planets = eph.all();
        assert_eq!(planets.len(), 5);
        assert_eq!(eph.kepler_failures(&planets), 0);
    }

    #[test]
    fn kepler_failures_counted_once_per_body() {
        let eph = Ephemeris::at(jd(2_460_651.5), &greenwich());
        let mut planets = eph.all();
        planets[4].kepler = KeplerOutcome::Diverged;
        assert_eq!(eph.kepler_failures(&planets), 1);
        assert_eq!(eph.kepler_failures(&planets[..4]), 0);
    }

    #[test]
    fn degenerate_distance_gives_zero_magnitude() {
        assert_eq!(apparent_magnitude(Body::Saturn, 9.5, 0.0, 0.0), 0.0);
        assert_eq!(apparent_magnitude(Body::Earth, 1.0, 1.0, 90.0), 0.0);
        // The ring term still applies in the ordinary case
        let (offset, _) = Body::Saturn.magnitude_law();
        let saturn = apparent_magnitude(Body::Saturn, 1.0, 1.0, 0.0);
        assert!((saturn - (offset - 0.74)).abs() < 1e-12);
    }

    #[test]
    fn degenerate_triangle_is_guarded() {
        assert_eq!(triangle_angle(0.0, 1.0, 1.0), 0.0);
        assert!((triangle_angle(1.0, 1.0, 2.0 + 1e-9) - 180.0).abs() < 1e-9);
        assert!(!triangle_angle(1.0, 1.0, 0.0).is_nan());
    }
}
