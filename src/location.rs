//! Maidenhead grid locators and great-circle distance.
//!
//! A six character locator such as `JO59jw` names a cell of 2° × 1° (square) split
//! into 24 × 24 subsquares. Encoding truncates to the containing cell; decoding
//! returns the cell centre, so a round trip moves a position by at most half a cell.

use crate::{GeoPosition, LocationError};

/// Mean Earth radius used for distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

impl GeoPosition {
    /// Six character Maidenhead locator of the subsquare containing this position.
    pub fn to_maidenhead(&self) -> String {
        // Shift to positive ranges; clamp the far edges into the last cell.
        let lon = (self.longitude + 180.0).clamp(0.0, 359.999_999);
        let lat = (self.latitude + 90.0).clamp(0.0, 179.999_999);

        let field_lon = (lon / 20.0).floor();
        let field_lat = (lat / 10.0).floor();
        let square_lon = ((lon % 20.0) / 2.0).floor();
        let square_lat = (lat % 10.0).floor();
        let sub_lon = ((lon % 2.0) * 12.0).floor();
        let sub_lat = ((lat % 1.0) * 24.0).floor();

        let mut locator = String::with_capacity(6);
        locator.push(char::from(b'A' + field_lon as u8));
        locator.push(char::from(b'A' + field_lat as u8));
        locator.push(char::from(b'0' + square_lon as u8));
        locator.push(char::from(b'0' + square_lat as u8));
        locator.push(char::from(b'a' + sub_lon as u8));
        locator.push(char::from(b'a' + sub_lat as u8));
        locator
    }

    /// Centre of a four or six character locator. Letters are case-insensitive.
    pub fn from_maidenhead(locator: &str) -> Result<GeoPosition, LocationError> {
        let invalid = || LocationError::Locator(locator.to_string());
        let bytes = locator.trim().as_bytes();
        if bytes.len() != 4 && bytes.len() != 6 {
            return Err(invalid());
        }

        let letter = |b: u8, last: u8| -> Result<f64, LocationError> {
            let upper = b.to_ascii_uppercase();
            if (b'A'..=last).contains(&upper) {
                Ok(f64::from(upper - b'A'))
            } else {
                Err(invalid())
            }
        };
        let digit = |b: u8| -> Result<f64, LocationError> {
            if b.is_ascii_digit() {
                Ok(f64::from(b - b'0'))
            } else {
                Err(invalid())
            }
        };

        let mut lon = letter(bytes[0], b'R')? * 20.0 + digit(bytes[2])? * 2.0;
        let mut lat = letter(bytes[1], b'R')? * 10.0 + digit(bytes[3])?;

        if bytes.len() == 6 {
            lon += letter(bytes[4], b'X')? / 12.0 + 1.0 / 24.0;
            lat += letter(bytes[5], b'X')? / 24.0 + 0.5 / 24.0;
        } else {
            lon += 1.0;
            lat += 0.5;
        }

        GeoPosition::new(lat - 90.0, lon - 180.0)
    }

    /// Great-circle distance in kilometres (haversine).
    pub fn distance_km(&self, other: &GeoPosition) -> f64 {
        let phi1 = self.latitude.to_radians();
        let phi2 = other.latitude.to_radians();
        let d_phi = phi2 - phi1;
        let d_lambda = (other.longitude - self.longitude).to_radians();

        let a = (d_phi / 2.0).sin().powi(2)
            + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
    }
}
