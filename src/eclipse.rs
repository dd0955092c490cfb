//! # Lunar Eclipse Search
//!
//! Predicts the lunar eclipses of a calendar year by stepping through full moons
//! (Sky & Telescope, 1988). For each full moon the Moon's argument of latitude decides
//! whether an eclipse is possible at all (`|sin F| <= 0.36`); if so the distance of the
//! Moon from the shadow axis, compared with the penumbral and umbral cone radii, gives
//! the magnitudes and semi-durations.
//!
//! The search is bounded: 14 half-lunation steps from the first new moon of the year.
//! Full moons with a negative penumbral magnitude are skipped, not reported.

use crate::calendar::{CalendarDate, GregorianDate};
use crate::Instant;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How deep into the shadow the Moon goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EclipseKind {
    Penumbral,
    Partial,
    Total,
}

/// One predicted lunar eclipse.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct EclipseEvent {
    /// UTC date of maximum eclipse.
    pub date: GregorianDate,
    pub maximum: Instant,
    pub kind: EclipseKind,
    pub penumbral_magnitude: f64,
    /// `None` when the Moon misses the umbra.
    pub umbral_magnitude: Option<f64>,
    /// Half the duration of each phase, minutes.
    pub penumbral_semi_duration: f64,
    pub partial_semi_duration: Option<f64>,
    pub total_semi_duration: Option<f64>,
}

fn fraction(x: f64) -> f64 {
    x - x.floor()
}

/// Full-moon candidates near `year`, unfiltered by calendar year.
fn scan(year: i32) -> Vec<(f64, EclipseEvent)> {
    let y = f64::from(year);
    let k0 = ((y - 1900.0) * 12.3685).floor();
    let t = (y - 1899.5) / 100.0;
    let t2 = t * t;
    let t3 = t2 * t;

    let mut j0 = 2_415_020.0 + 29.0 * k0;
    let mut f0 = 0.000_117_8 * t2 - 0.000_000_155 * t3 + 0.759_33 + 0.530_588_68 * k0
        - 0.000_837 * t
        - 0.000_335 * t2;
    j0 += f0.floor();
    f0 = fraction(f0);

    let m0 = 360.0 * fraction(k0 * 0.080_848_211_33) + 359.2242 - 0.000_033_3 * t2
        - 0.000_003_47 * t3;
    let m1 = 360.0 * fraction(k0 * 0.071_713_661_28) + 306.0253 + 0.010_730_6 * t2
        + 0.000_012_36 * t3;
    let b1 = 360.0 * fraction(k0 * 0.085_195_851_28) + 21.2964 - 0.001_652_8 * t2
        - 0.000_002_39 * t3;

    let mut found = Vec::new();
    for k9 in (1..=27).step_by(2) {
        let k9 = f64::from(k9);
        let mut j = j0 + 14.0 * k9;
        let mut f = f0 + 0.765_294 * k9;
        let k = k9 / 2.0;

        // Sun's and Moon's mean anomalies, Moon's argument of latitude
        let m5 = (m0 + k * 29.105_356_08).to_radians();
        let m6 = (m1 + k * 385.816_918_06).to_radians();
        let b6 = (b1 + k * 390.670_506_46).to_radians();

        f += -0.4068 * m6.sin() + (0.1734 - 0.000_393 * t) * m5.sin() + 0.0161 * (2.0 * m6).sin()
            - 0.0104 * (2.0 * b6).sin()
            - 0.0074 * (m5 - m6).sin()
            - 0.0051 * (m5 + m6).sin()
            + 0.0021 * (2.0 * m5).sin()
            + 0.5 / 1440.0;
        j += f.floor();
        f = fraction(f);

        if b6.sin().abs() > 0.36 {
            continue;
        }

        let s = 5.19595 - 0.0048 * m5.cos() + 0.0020 * (2.0 * m5).cos() - 0.3283 * m6.cos()
            - 0.0060 * (m5 + m6).cos()
            + 0.0041 * (m5 - m6).cos();
        let c = 0.2070 * m5.sin() + 0.0024 * (2.0 * m5).sin() - 0.0390 * m6.sin()
            + 0.0115 * (2.0 * m6).sin()
            - 0.0073 * (m5 + m6).sin()
            - 0.0067 * (m5 - m6).sin()
            + 0.0117 * (2.0 * b6).sin();
        let separation = (s * b6.sin() + c * b6.cos()).abs();
        let u = 0.0059 + 0.0046 * m5.cos() - 0.0182 * m6.cos() + 0.0004 * (2.0 * m6).cos()
            - 0.0005 * (m5 + m6).cos();

        let penumbral = (1.5572 + u - separation) / 0.545;
        if penumbral < 0.0 {
            continue;
        }
        let umbral = (1.0129 - u - separation) / 0.545;

        // Moon's hourly motion relative to the shadow, per minute
        let rate = (0.5458 + 0.04 * m6.cos()) / 60.0;
        let semi = |radius: f64| ((radius * radius - separation * separation).max(0.0)).sqrt() / rate;

        let jd = j + f;
        let maximum = Instant::from_julian_day(jd);
        let Ok(date) = GregorianDate::from_absolute(maximum.absolute_day()) else {
            continue;
        };
        let kind = if umbral > 1.0 {
            EclipseKind::Total
        } else if umbral > 0.0 {
            EclipseKind::Partial
        } else {
            EclipseKind::Penumbral
        };

        found.push((
            jd,
            EclipseEvent {
                date,
                maximum,
                kind,
                penumbral_magnitude: penumbral,
                umbral_magnitude: (umbral > 0.0).then_some(umbral),
                penumbral_semi_duration: semi(1.5572 + u),
                partial_semi_duration: (umbral > 0.0).then(|| semi(1.0129 - u)),
                total_semi_duration: (umbral > 1.0).then(|| semi(0.4679 - u)),
            },
        ));
    }
    found
}

/// Lunar eclipses whose maximum falls in the UTC calendar year `year`, in time order.
///
/// The scan for `year` starts at the first new moon of January, so early-January
/// eclipses are taken from the previous year's scan as well.
pub fn eclipse_search(year: i32) -> Vec<EclipseEvent> {
    let mut events: Vec<(f64, EclipseEvent)> = scan(year - 1)
        .into_iter()
        .chain(scan(year))
        .filter(|(_, e)| e.date.year() == year)
        .collect();
    events.sort_by(|a, b| a.0.total_cmp(&b.0));
    events.dedup_by(|a, b| (a.0 - b.0).abs() < 1.0);

    debug!(year, count = events.len(), "eclipse search complete");
    events.into_iter().map(|(_, e)| e).collect()
}
