//! # Calendar Conversion Tests
//!
//! Cross-checks all five calendars against each other through the absolute day count.
//! Every conversion goes day -> calendar -> day, so a bug in any one calendar shows up
//! as a broken round trip or a wrong anchor date.

use astro_clock_lib::calendar::{
    AbsoluteDay, CalendarDate, DateSet, GregorianDate, HebrewDate, IslamicDate, IsoWeekDate,
    JulianDate,
};

fn round_trip<C: CalendarDate>(day: AbsoluteDay) {
    let date = C::from_absolute(day)
        .unwrap_or_else(|e| panic!("{} conversion of {:?} failed: {}", C::NAME, day, e));
    assert_eq!(
        date.to_absolute(),
        day,
        "{} round trip changed {:?}",
        C::NAME,
        day
    );
}

/// Every calendar reproduces the day it was built from, across several centuries.
///
/// The step is prime so the sample hits every weekday and month position.
#[test]
fn all_calendars_round_trip() {
    let start = GregorianDate::new(1800, 1, 1).unwrap().to_absolute();
    let end = GregorianDate::new(2200, 12, 31).unwrap().to_absolute();
    let mut day = start;
    while day <= end {
        round_trip::<GregorianDate>(day);
        round_trip::<JulianDate>(day);
        round_trip::<IsoWeekDate>(day);
        round_trip::<IslamicDate>(day);
        round_trip::<HebrewDate>(day);
        day = day.offset(37);
    }
}

/// 2000-01-01 in every calendar.
#[test]
fn millennium_in_all_calendars() {
    let set = DateSet::from_absolute(AbsoluteDay::new(730_120)).unwrap();

    assert_eq!(set.gregorian, GregorianDate::new(2000, 1, 1).unwrap());
    assert_eq!(set.julian, JulianDate::new(1999, 12, 19).unwrap());
    assert_eq!(set.iso, IsoWeekDate::new(1999, 52, 6).unwrap());
    assert_eq!(set.islamic, IslamicDate::new(1420, 9, 24).unwrap());
    assert_eq!(set.hebrew, HebrewDate::new(5760, 10, 23).unwrap());
}

/// The March 2024 equinox, which falls in Adar II of a Hebrew leap year.
#[test]
fn equinox_2024_in_all_calendars() {
    let day = GregorianDate::new(2024, 3, 20).unwrap().to_absolute();
    assert_eq!(day.value(), 738_965);

    let set = DateSet::from_absolute(day).unwrap();
    assert_eq!(set.hebrew, HebrewDate::new(5784, HebrewDate::ADAR_II, 10).unwrap());
    assert_eq!(set.islamic, IslamicDate::new(1445, 9, 10).unwrap());
    assert_eq!(set.iso, IsoWeekDate::new(2024, 12, 3).unwrap());
}

/// Consecutive days map to non-decreasing dates in each calendar.
#[test]
fn conversions_are_monotonic() {
    let start = GregorianDate::new(2023, 1, 1).unwrap().to_absolute();
    let mut previous = DateSet::from_absolute(start).unwrap();
    for offset in 1..=800 {
        let current = DateSet::from_absolute(start.offset(offset)).unwrap();
        assert!(current.gregorian > previous.gregorian);
        assert!(current.julian > previous.julian);
        assert!(current.iso > previous.iso);
        // Hebrew months are numbered from Nisan while the year starts in Tishri, so
        // compare through the day count instead of the fields.
        assert_eq!(
            current.hebrew.to_absolute().days_since(previous.hebrew.to_absolute()),
            1,
            "Hebrew dates skipped at offset {}",
            offset
        );
        assert!(current.islamic > previous.islamic);
        previous = current;
    }
}

/// Walking Hebrew year 5784 day by day visits 383 distinct dates and lands on Rosh
/// Hashanah 5785.
#[test]
fn hebrew_leap_year_5784_day_by_day() {
    let rosh_hashanah = HebrewDate::new(5784, HebrewDate::TISHRI, 1)
        .unwrap()
        .to_absolute();
    assert_eq!(rosh_hashanah.value(), 738_779);
    assert_eq!(HebrewDate::days_in_year(5784), 383);

    for offset in 0..383 {
        let day = rosh_hashanah.offset(offset);
        let date = HebrewDate::from_absolute(day).unwrap();
        assert_eq!(date.year(), 5784, "day {} left the year", offset);
        assert_eq!(date.to_absolute(), day);
    }
    let next = HebrewDate::from_absolute(rosh_hashanah.offset(383)).unwrap();
    assert_eq!(next, HebrewDate::new(5785, HebrewDate::TISHRI, 1).unwrap());
}

/// Invalid field combinations are rejected rather than normalised.
#[test]
fn invalid_dates_are_rejected() {
    assert!(JulianDate::new(1900, 2, 29).is_ok(), "Julian 1900 is a leap year");
    assert!(GregorianDate::new(1900, 2, 29).is_err());
    assert!(IsoWeekDate::new(2021, 53, 1).is_err());
    assert!(IsoWeekDate::new(2020, 53, 1).is_ok());
    assert!(IslamicDate::new(1445, 13, 1).is_err());
    assert!(HebrewDate::new(5785, HebrewDate::ADAR_II, 1).is_err());
    assert!(GregorianDate::new(0, 1, 1).is_err());
}
