//! # Text Rendering
//!
//! Plain-text presentation of a [`SkySnapshot`] for terminals and log files. The engine
//! itself never formats anything; every string the clock shows is produced here.
//!
//! The daylight bar covers the UTC date in half-hour cells:
//!
//! ```text
//! #  sun above the horizon
//! =  civil twilight
//! -  nautical twilight
//! .  astronomical twilight
//!    night
//! ```

use crate::calendar::{GregorianDate, HebrewDate, IslamicDate};
use crate::lunar::PhaseTrend;
use crate::sky::SkySnapshot;
use crate::solar::{Horizon, SolarDay};
use crate::{EventOrder, HorizonCrossing, Instant, RiseSetResult};
use std::fmt::Write;

/// Cells per hour in the daylight bar.
const BAR_CELLS_PER_HOUR: usize = 2;

const ISLAMIC_MONTHS: [&str; 12] = [
    "Muharram",
    "Safar",
    "Rabi I",
    "Rabi II",
    "Jumada I",
    "Jumada II",
    "Rajab",
    "Sha'ban",
    "Ramadan",
    "Shawwal",
    "Dhu al-Qa'da",
    "Dhu al-Hijja",
];

/// Hebrew month names, Nisan = 1. Adar is "Adar I" in leap years.
const HEBREW_MONTHS: [&str; 13] = [
    "Nisan", "Iyyar", "Sivan", "Tammuz", "Av", "Elul", "Tishri", "Heshvan", "Kislev",
    "Tevet", "Shevat", "Adar", "Adar II",
];

const COMPASS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
    "NW", "NNW",
];

/// Fractional hours as `HH:MM`, rounded to the minute.
fn format_hours(hours: f64) -> String {
    let minutes = (hours * 60.0).round() as i64;
    format!("{:02}:{:02}", minutes.div_euclid(60), minutes.rem_euclid(60))
}

/// Time of day of an instant, UTC.
fn format_time(at: Instant) -> String {
    match at.to_datetime() {
        Some(datetime) => datetime.format("%H:%M").to_string(),
        None => "--:--".to_string(),
    }
}

/// Sixteen-point compass direction for an azimuth measured from north.
fn compass_point(azimuth: f64) -> &'static str {
    let index = ((azimuth.rem_euclid(360.0) + 11.25) / 22.5) as usize % 16;
    COMPASS[index]
}

fn format_crossing(label: &str, crossing: HorizonCrossing) -> String {
    format!(
        "{} {} {}",
        label,
        format_time(crossing.at),
        compass_point(crossing.azimuth)
    )
}

fn format_events(events: &RiseSetResult) -> String {
    match *events {
        RiseSetResult::Normal { rise, set, order } => {
            let rise = format_crossing("rise", rise);
            let set = format_crossing("set", set);
            match order {
                EventOrder::RiseFirst => format!("{}, {}", rise, set),
                EventOrder::SetFirst => format!("{}, {}", set, rise),
            }
        }
        RiseSetResult::RiseOnly { rise } => format_crossing("rise", rise),
        RiseSetResult::SetOnly { set } => format_crossing("set", set),
        RiseSetResult::NeverRises => "below the horizon all day".to_string(),
        RiseSetResult::NeverSets => "above the horizon all day".to_string(),
    }
}

fn format_islamic(date: &IslamicDate) -> String {
    let name = ISLAMIC_MONTHS
        .get(date.month() as usize - 1)
        .copied()
        .unwrap_or("?");
    format!("{} {} {} AH", date.day(), name, date.year())
}

fn format_hebrew(date: &HebrewDate) -> String {
    let name = if date.month() == HebrewDate::ADAR && HebrewDate::is_leap_year(date.year()) {
        "Adar I"
    } else {
        HEBREW_MONTHS
            .get(date.month() as usize - 1)
            .copied()
            .unwrap_or("?")
    };
    format!("{} {} {} AM", date.day(), name, date.year())
}

fn format_gregorian(date: &GregorianDate) -> String {
    format!(
        "{:04}-{:02}-{:02} {}",
        date.year(),
        date.month(),
        date.day(),
        date.weekday()
    )
}

fn trend_label(trend: PhaseTrend) -> &'static str {
    match trend {
        PhaseTrend::New => "new",
        PhaseTrend::Waxing => "waxing",
        PhaseTrend::Full => "full",
        PhaseTrend::Waning => "waning",
    }
}

/// Whether the sun is above the day's horizon at `hours` into the date.
fn sun_above(day: &SolarDay, hours: f64) -> bool {
    match day.events {
        RiseSetResult::NeverSets => true,
        RiseSetResult::NeverRises => false,
        _ => match (day.rise_hours(), day.set_hours()) {
            (Some(rise), Some(set)) if rise <= set => hours >= rise && hours < set,
            (Some(rise), Some(set)) => hours >= rise || hours < set,
            (Some(rise), None) => hours >= rise,
            (None, Some(set)) => hours < set,
            (None, None) => false,
        },
    }
}

/// The daylight bar for the snapshot's date, one character per cell.
fn daylight_bar(sun_days: &[SolarDay]) -> String {
    let glyph = |horizon: Horizon| match horizon {
        Horizon::Actual => '#',
        Horizon::Civil => '=',
        Horizon::Nautical => '-',
        Horizon::Astronomical => '.',
    };
    (0..24 * BAR_CELLS_PER_HOUR)
        .map(|cell| {
            let hours = (cell as f64 + 0.5) / BAR_CELLS_PER_HOUR as f64;
            // Horizons are ordered highest first, so the first hit is the brightest
            sun_days
                .iter()
                .find(|day| sun_above(day, hours))
                .map(|day| glyph(day.horizon))
                .unwrap_or(' ')
        })
        .collect()
}

/// Render the snapshot as plain text.
pub fn render_text(snapshot: &SkySnapshot) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = write_text(&mut out, snapshot);
    out
}

fn write_text(out: &mut String, snapshot: &SkySnapshot) -> std::fmt::Result {
    let dates = &snapshot.dates;
    let time = format_time(snapshot.instant);
    writeln!(
        out,
        "{} {} UTC  ({:.4}, {:.4}) {}",
        format_gregorian(&dates.gregorian),
        time,
        snapshot.position.latitude,
        snapshot.position.longitude,
        snapshot.position.to_maidenhead()
    )?;
    writeln!(
        out,
        "Julian {:04}-{:02}-{:02}  ISO {}-W{:02}-{}  day {}",
        dates.julian.year(),
        dates.julian.month(),
        dates.julian.day(),
        dates.iso.year(),
        dates.iso.week(),
        dates.iso.weekday(),
        dates.gregorian.day_of_year()
    )?;
    writeln!(
        out,
        "{}  /  {}",
        format_islamic(&dates.islamic),
        format_hebrew(&dates.hebrew)
    )?;
    writeln!(out)?;

    // Sun
    writeln!(
        out,
        "Sun   az {:5.1} el {:5.1}  dec {:+.2}",
        snapshot.sun.horizontal.azimuth,
        snapshot.sun.horizontal.elevation,
        snapshot.sun.equatorial.declination
    )?;
    if let Some(day) = snapshot.sun_day() {
        writeln!(
            out,
            "      {}  noon {} at {:.1}  day {}  eot {:+.1} min",
            format_events(&day.events),
            format_hours(day.transit_hours()),
            day.transit_elevation,
            format_hours(day.day_length_hours()),
            day.equation_of_time
        )?;
    }
    writeln!(out, "      |{}|", daylight_bar(&snapshot.sun_days))?;
    writeln!(out, "       0     3     6     9     12    15    18    21")?;
    writeln!(out)?;

    // Moon
    let moon = &snapshot.moon;
    writeln!(
        out,
        "Moon  az {:5.1} el {:5.1}  {:.0}% lit, {} (age {:.1} d)  {:.0} km",
        moon.horizontal.azimuth,
        moon.horizontal.elevation,
        moon.phase.illumination_percent,
        trend_label(moon.phase.trend),
        moon.phase.age_days,
        moon.distance_km
    )?;
    writeln!(out, "      next {}", format_events(&snapshot.moon_events))?;
    writeln!(out)?;

    // Planets
    for planet in &snapshot.planets {
        writeln!(
            out,
            "{:<8} az {:5.1} el {:5.1}  mag {:+.1}  elong {:5.1}  {:.2} AU",
            planet.body.name(),
            planet.horizontal.azimuth,
            planet.horizontal.elevation,
            planet.magnitude,
            planet.elongation,
            planet.distance_au
        )?;
    }
    if snapshot.kepler_failures > 0 {
        writeln!(out, "(!) {} orbit solutions approximate", snapshot.kepler_failures)?;
    }
    writeln!(out)?;

    // Year
    let year = &snapshot.year;
    match &year.easter {
        Some(easter) => writeln!(
            out,
            "Easter {} ({:?}): {:02}-{:02}",
            year.year, easter.reckoning, easter.month, easter.day
        )?,
        None => writeln!(out, "Easter {}: outside table", year.year)?,
    }
    let seasons = &year.seasons;
    for (label, at) in [
        ("March equinox", seasons.march_equinox),
        ("June solstice", seasons.june_solstice),
        ("September equinox", seasons.september_equinox),
        ("December solstice", seasons.december_solstice),
    ] {
        let date = at
            .to_datetime()
            .map(|d| d.format("%m-%d %H:%M").to_string())
            .unwrap_or_default();
        writeln!(out, "{:<18} {}", label, date)?;
    }
    for eclipse in &year.eclipses {
        writeln!(
            out,
            "Lunar eclipse {:02}-{:02} {} {:?}, magnitude {:.2}",
            eclipse.date.month(),
            eclipse.date.day(),
            format_time(eclipse.maximum),
            eclipse.kind,
            eclipse.umbral_magnitude.unwrap_or(eclipse.penumbral_magnitude)
        )?;
    }
    Ok(())
}

/// Render the snapshot to the terminal.
pub fn draw_ascii(snapshot: &SkySnapshot) {
    print!("{}", render_text(snapshot));
}
