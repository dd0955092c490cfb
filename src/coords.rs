//! Shared spherical-astronomy primitives: sidereal time, equatorial to horizontal
//! transforms, and 3-vectors with the axis rotations used by the orbit code.
//!
//! Angles are degrees at every public boundary and radians inside the trigonometry.

use crate::{GeoPosition, Instant};
use serde::{Deserialize, Serialize};

/// Wraps an angle into `[0, 360)`.
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Greenwich mean sidereal time in degrees (Meeus 12.4).
pub fn greenwich_sidereal_degrees(instant: Instant) -> f64 {
    let d = instant.days_since_j2000();
    let t = d / 36_525.0;
    normalize_degrees(
        280.460_618_37 + 360.985_647_366_29 * d + 0.000_387_933 * t * t
            - t * t * t / 38_710_000.0,
    )
}

/// Local sidereal time in degrees for an observer at `longitude` (east positive).
pub fn local_sidereal_degrees(instant: Instant, longitude: f64) -> f64 {
    normalize_degrees(greenwich_sidereal_degrees(instant) + longitude)
}

/// Right ascension and declination in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Equatorial {
    pub right_ascension: f64,
    pub declination: f64,
}

/// Azimuth (clockwise from north) and elevation in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Horizontal {
    pub azimuth: f64,
    pub elevation: f64,
}

impl Equatorial {
    /// Local hour angle in degrees, normalized to `[0, 360)`.
    pub fn hour_angle(&self, local_sidereal: f64) -> f64 {
        normalize_degrees(local_sidereal - self.right_ascension)
    }

    /// Projects onto the observer's horizon given the local sidereal time in degrees.
    pub fn to_horizontal(&self, local_sidereal: f64, observer: &GeoPosition) -> Horizontal {
        let h = self.hour_angle(local_sidereal).to_radians();
        let dec = self.declination.to_radians();
        let lat = observer.latitude.to_radians();

        let sin_el = lat.sin() * dec.sin() + lat.cos() * dec.cos() * h.cos();
        let elevation = sin_el.clamp(-1.0, 1.0).asin();
        let azimuth = (-dec.cos() * h.sin()).atan2(lat.cos() * dec.sin() - lat.sin() * dec.cos() * h.cos());

        Horizontal {
            azimuth: normalize_degrees(azimuth.to_degrees()),
            elevation: elevation.to_degrees(),
        }
    }
}

/// Rectangular coordinates, AU for the planetary code.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Vector3 { x, y, z }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Rotation about the x axis by `angle` radians.
    pub fn rotate_x(self, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Vector3::new(self.x, c * self.y - s * self.z, s * self.y + c * self.z)
    }

    /// Rotation about the z axis by `angle` radians.
    pub fn rotate_z(self, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Vector3::new(c * self.x - s * self.y, s * self.x + c * self.y, self.z)
    }

    /// Spherical angles of the vector: (longitude-like angle in `[0, 360)`, latitude-like angle).
    pub fn to_spherical_degrees(&self) -> (f64, f64) {
        let lon = self.y.atan2(self.x).to_degrees();
        let lat = self.z.atan2(self.x.hypot(self.y)).to_degrees();
        (normalize_degrees(lon), lat)
    }
}

impl std::ops::Sub for Vector3 {
    type Output = Vector3;

    fn sub(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl std::ops::Neg for Vector3 {
    type Output = Vector3;

    fn neg(self) -> Vector3 {
        Vector3::new(-self.x, -self.y, -self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_wraps_negative_and_large_angles() {
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(720.0), 0.0);
        assert!(normalize_degrees(-1e-15) < 360.0);
    }

    #[test]
    fn sidereal_time_at_j2000() {
        // GMST at 2000-01-01T12:00Z is 280.46°
        let j2000 = Instant::from_unix_seconds(946_728_000);
        assert!((greenwich_sidereal_degrees(j2000) - 280.460_618).abs() < 1e-5);
        assert!((local_sidereal_degrees(j2000, 100.0) - 20.460_618).abs() < 1e-5);
    }

    #[test]
    fn object_on_meridian_faces_south() {
        let observer = GeoPosition::new(60.0, 0.0).unwrap();
        let eq = Equatorial {
            right_ascension: 45.0,
            declination: 0.0,
        };
        let hz = eq.to_horizontal(45.0, &observer);
        assert!((hz.azimuth - 180.0).abs() < 1e-9);
        assert!((hz.elevation - 30.0).abs() < 1e-9);
    }

    #[test]
    fn rotations_preserve_length() {
        let v = Vector3::new(1.0, 2.0, 3.0);
        let r = v.rotate_x(0.7).rotate_z(-1.3);
        assert!((r.length() - v.length()).abs() < 1e-12);
        let q = Vector3::new(1.0, 0.0, 0.0).rotate_z(std::f64::consts::FRAC_PI_2);
        assert!(q.x.abs() < 1e-12 && (q.y - 1.0).abs() < 1e-12);
    }
}
