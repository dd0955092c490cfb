//! # Yearly Events
//!
//! Easter Sunday, the equinoxes and solstices, and the year's lunar eclipses.
//!
//! ## Easter
//! Closed form after Bergmann: the *concurrent* (weekday offset of the year) and the
//! *epact* (age of the moon at the start of the year) give the paschal full moon;
//! Easter is the first Sunday strictly after it. Two constants, K and E, select the
//! reckoning. The Julian reckoning uses one pair for every year; the Gregorian
//! reckoning shifts them per century as the solar and lunar corrections accumulate.
//!
//! ## Equinoxes and Solstices
//! Low-order polynomials in millennia from 2000, accurate to a few minutes over
//! 1000–3000. The results are treated as UTC.

use crate::calendar::{CalendarDate, CalendarError, GregorianDate, JulianDate};
use crate::eclipse::{eclipse_search, EclipseEvent};
use crate::{Instant, SECONDS_PER_DAY};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which church calendar Easter is computed for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Reckoning {
    #[default]
    Gregorian,
    /// Orthodox Easter; the date is in the Julian calendar.
    Julian,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    #[error("no {reckoning:?} Easter table for year {year}")]
    UnsupportedYear { reckoning: Reckoning, year: i32 },

    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

/// Easter Sunday as a month and day in the reckoning's own calendar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct EasterDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub reckoning: Reckoning,
}

impl EasterDate {
    /// The same Sunday in the Gregorian calendar.
    pub fn to_gregorian(&self) -> Result<GregorianDate, CalendarError> {
        match self.reckoning {
            Reckoning::Gregorian => GregorianDate::new(self.year, self.month, self.day),
            Reckoning::Julian => {
                let julian = JulianDate::new(self.year, self.month, self.day)?;
                GregorianDate::from_absolute(julian.to_absolute())
            }
        }
    }
}

/// (K, E) correction constants for the concurrent and the epact.
fn reckoning_constants(year: i32, reckoning: Reckoning) -> Option<(i32, i32)> {
    match reckoning {
        Reckoning::Julian if year >= 1 => Some((-3, -1)),
        Reckoning::Julian => None,
        Reckoning::Gregorian => match year {
            1583..=1699 => Some((1, -8)),
            1700..=1799 => Some((0, -9)),
            1800..=1899 => Some((-1, -9)),
            1900..=2099 => Some((-2, -10)),
            2100..=2199 => Some((-3, -10)),
            _ => None,
        },
    }
}

/// Easter Sunday of `year`.
///
/// Gregorian years 1583–2199 and Julian years from 1 are supported.
pub fn easter_sunday(year: i32, reckoning: Reckoning) -> Result<EasterDate, EventError> {
    let (k, e) = reckoning_constants(year, reckoning)
        .ok_or(EventError::UnsupportedYear { reckoning, year })?;

    let x = year - 8;
    let concurrent = (x + x.div_euclid(4) + k).rem_euclid(7);
    let golden = year.rem_euclid(19);
    let epact = (golden * 11 + e).rem_euclid(30);

    // Paschal full moon, counted in days from the end of February (32 = April 1).
    let mut full_moon = if epact <= 14 { 35 - epact } else { 65 - epact };
    if reckoning == Reckoning::Gregorian {
        // The full moon may not fall after April 18, nor on April 18 in the later
        // half of the Metonic cycle.
        if full_moon == 50 {
            full_moon = 49;
        } else if full_moon == 49 && golden > 10 {
            full_moon = 48;
        }
    }

    // Sundays of the year fall on 29 - concurrent + 7n in this count.
    let first_sunday = 29 - concurrent;
    let weeks = (full_moon - first_sunday).div_euclid(7) + 1;
    let sunday = (first_sunday + 7 * weeks) as u32;

    let (month, day) = match sunday {
        0..=31 => (3, sunday),
        32..=61 => (4, sunday - 31),
        _ => (5, sunday - 61),
    };

    Ok(EasterDate {
        year,
        month,
        day,
        reckoning,
    })
}

/// The four astronomical seasons' start instants (UTC).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Seasons {
    pub march_equinox: Instant,
    pub june_solstice: Instant,
    pub september_equinox: Instant,
    pub december_solstice: Instant,
}

/// Equinox and solstice instants of `year`.
pub fn equinox_solstice(year: i32) -> Seasons {
    let y = (f64::from(year) - 2000.0) / 1000.0;
    let (y2, y3, y4) = (y * y, y * y * y, y * y * y * y);

    // Days since 1970-01-01
    let march = 11_036.309_84 + 365_242.374_04 * y + 0.051_69 * y2 - 0.004_11 * y3 - 0.000_57 * y4;
    let june = 11_129.067_67 + 365_241.626_03 * y + 0.003_25 * y2 + 0.008_88 * y3 - 0.000_30 * y4;
    let september =
        11_222.717_15 + 365_242.017_67 * y - 0.115_75 * y2 + 0.003_37 * y3 + 0.000_78 * y4;
    let december =
        11_312.559_52 + 365_242.740_49 * y - 0.062_23 * y2 - 0.008_23 * y3 + 0.000_32 * y4;

    let instant = |days: f64| Instant::from_unix_seconds((days * SECONDS_PER_DAY as f64).round() as i64);
    Seasons {
        march_equinox: instant(march),
        june_solstice: instant(june),
        september_equinox: instant(september),
        december_solstice: instant(december),
    }
}

/// Everything the display shows for a year.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct YearEvents {
    pub year: i32,
    /// `None` when the year is outside the reckoning's table.
    pub easter: Option<EasterDate>,
    pub seasons: Seasons,
    pub eclipses: Vec<EclipseEvent>,
}

impl YearEvents {
    pub fn compute(year: i32, reckoning: Reckoning) -> Self {
        let easter = match easter_sunday(year, reckoning) {
            Ok(date) => Some(date),
            Err(error) => {
                tracing::debug!(%error, "no Easter date");
                None
            }
        };
        YearEvents {
            year,
            easter,
            seasons: equinox_solstice(year),
            eclipses: eclipse_search(year),
        }
    }
}
