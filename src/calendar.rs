//! # Calendar Conversion
//!
//! Every calendar converts to and from an [`AbsoluteDay`]: a plain day count where
//! day 1 is Monday, January 1 of year 1 in the proleptic Gregorian calendar. Going
//! through the absolute day makes any calendar-to-calendar conversion two steps.
//!
//! ## Supported Calendars
//! - **Gregorian**: leap years divisible by 4, except centuries not divisible by 400
//! - **Julian**: leap years divisible by 4; Julian 0001-01-01 is absolute day -1
//! - **ISO week-date**: weeks start on Monday; week 1 holds the year's first Thursday
//! - **Islamic**: arithmetic calendar, 30-year cycle with 11 leap years
//! - **Hebrew**: arithmetic lunisolar calendar, 19-year Metonic cycle with molad
//!   arithmetic and the four postponements of Rosh HaShanah
//!
//! ## Conversion Strategy
//! `to_absolute` is closed form. `from_absolute` estimates a year that can only be too
//! small, walks forward to the right year, then walks the months. The walks are short
//! and bounded (at most a couple of years and 13 months).
//!
//! Round trips are lossless: `from_absolute(d.to_absolute()) == d` for every valid date.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Day count shared by every calendar. Day 1 is Gregorian 0001-01-01.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbsoluteDay(i64);

impl AbsoluteDay {
    pub const fn new(value: i64) -> Self {
        AbsoluteDay(value)
    }

    pub const fn value(self) -> i64 {
        self.0
    }

    /// Day 1 was a Monday, so `value mod 7` is the weekday with Sunday as 0.
    pub fn weekday(self) -> Weekday {
        match self.0.rem_euclid(7) {
            0 => Weekday::Sun,
            1 => Weekday::Mon,
            2 => Weekday::Tue,
            3 => Weekday::Wed,
            4 => Weekday::Thu,
            5 => Weekday::Fri,
            _ => Weekday::Sat,
        }
    }

    /// The latest `weekday` falling on or before this day.
    pub fn weekday_on_or_before(self, weekday: Weekday) -> AbsoluteDay {
        let k = i64::from(weekday.num_days_from_sunday());
        AbsoluteDay(self.0 - (self.0 - k).rem_euclid(7))
    }

    pub fn offset(self, days: i64) -> AbsoluteDay {
        AbsoluteDay(self.0 + days)
    }

    /// Signed number of days from `earlier` to `self`.
    pub fn days_since(self, earlier: AbsoluteDay) -> i64 {
        self.0 - earlier.0
    }

    pub fn from_naive_date(date: NaiveDate) -> Self {
        AbsoluteDay(i64::from(date.num_days_from_ce()))
    }

    /// `None` outside chrono's supported range.
    pub fn to_naive_date(self) -> Option<NaiveDate> {
        i32::try_from(self.0)
            .ok()
            .and_then(NaiveDate::from_num_days_from_ce_opt)
    }
}

/// Why a date could not be built or converted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("{calendar} year {year} is before the calendar's first year")]
    InvalidYear { calendar: &'static str, year: i32 },

    #[error("{calendar} month {month} does not exist in year {year}")]
    InvalidMonth {
        calendar: &'static str,
        year: i32,
        month: u32,
    },

    #[error("{calendar} day {day} does not exist in {year}-{month:02}")]
    InvalidDay {
        calendar: &'static str,
        year: i32,
        month: u32,
        day: u32,
    },

    #[error("ISO week {week} does not exist in year {year}")]
    InvalidWeek { year: i32, week: u32 },

    #[error("ISO weekday {0} is outside 1 (Monday) ..= 7 (Sunday)")]
    InvalidWeekday(u32),

    #[error("absolute day {day} precedes the {calendar} epoch")]
    BeforeEpoch { calendar: &'static str, day: i64 },

    #[error("absolute day {day} is beyond the supported {calendar} range")]
    OutOfRange { calendar: &'static str, day: i64 },
}

/// A date in one calendar system, convertible through [`AbsoluteDay`].
pub trait CalendarDate: Sized + Copy {
    /// Short calendar name used in error messages.
    const NAME: &'static str;

    fn to_absolute(&self) -> AbsoluteDay;

    fn from_absolute(day: AbsoluteDay) -> Result<Self, CalendarError>;
}

fn to_year(calendar: &'static str, day: i64, year: i64) -> Result<i32, CalendarError> {
    i32::try_from(year).map_err(|_| CalendarError::OutOfRange { calendar, day })
}

fn check_year(calendar: &'static str, year: i32) -> Result<(), CalendarError> {
    if year < 1 {
        Err(CalendarError::InvalidYear { calendar, year })
    } else {
        Ok(())
    }
}

fn check_day(
    calendar: &'static str,
    year: i32,
    month: u32,
    day: u32,
    month_length: u32,
) -> Result<(), CalendarError> {
    if day == 0 || day > month_length {
        Err(CalendarError::InvalidDay {
            calendar,
            year,
            month,
            day,
        })
    } else {
        Ok(())
    }
}

fn solar_month_length(month: u32, leap: bool) -> u32 {
    match month {
        2 if leap => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

// ---------------------------------------------------------------------------
// Gregorian
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GregorianDate {
    year: i32,
    month: u32,
    day: u32,
}

impl GregorianDate {
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, CalendarError> {
        check_year(Self::NAME, year)?;
        if !(1..=12).contains(&month) {
            return Err(CalendarError::InvalidMonth {
                calendar: Self::NAME,
                year,
                month,
            });
        }
        check_day(Self::NAME, year, month, day, Self::month_length(year, month))?;
        Ok(GregorianDate { year, month, day })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn is_leap_year(year: i32) -> bool {
        (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
    }

    pub fn month_length(year: i32, month: u32) -> u32 {
        solar_month_length(month, Self::is_leap_year(year))
    }

    /// 1-based ordinal day within the year.
    pub fn day_of_year(&self) -> u32 {
        (1..self.month)
            .map(|m| Self::month_length(self.year, m))
            .sum::<u32>()
            + self.day
    }

    /// The `n`th `weekday` of a month: `n = 1` is the first, `n = -1` the last.
    /// Returns `None` when `n` is zero or the month has no such occurrence.
    pub fn nth_weekday(year: i32, month: u32, n: i32, weekday: Weekday) -> Option<GregorianDate> {
        let first = GregorianDate::new(year, month, 1).ok()?;
        let last = GregorianDate::new(year, month, Self::month_length(year, month)).ok()?;
        let day = match n {
            0 => return None,
            n if n > 0 => first
                .to_absolute()
                .offset(6)
                .weekday_on_or_before(weekday)
                .offset(7 * i64::from(n - 1)),
            n => last
                .to_absolute()
                .weekday_on_or_before(weekday)
                .offset(7 * i64::from(n + 1)),
        };
        if day < first.to_absolute() || day > last.to_absolute() {
            return None;
        }
        GregorianDate::from_absolute(day).ok()
    }

    pub fn weekday(&self) -> Weekday {
        self.to_absolute().weekday()
    }

    pub fn from_naive_date(date: NaiveDate) -> Result<Self, CalendarError> {
        GregorianDate::new(date.year(), date.month(), date.day())
    }

    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }

    fn new_year(year: i64) -> i64 {
        let prior = year - 1;
        1 + 365 * prior + prior.div_euclid(4) - prior.div_euclid(100) + prior.div_euclid(400)
    }
}

impl CalendarDate for GregorianDate {
    const NAME: &'static str = "Gregorian";

    fn to_absolute(&self) -> AbsoluteDay {
        AbsoluteDay(Self::new_year(i64::from(self.year)) + i64::from(self.day_of_year()) - 1)
    }

    fn from_absolute(day: AbsoluteDay) -> Result<Self, CalendarError> {
        let d = day.value();
        if d < 1 {
            return Err(CalendarError::BeforeEpoch {
                calendar: Self::NAME,
                day: d,
            });
        }
        let mut year = d / 366;
        while d >= Self::new_year(year + 1) {
            year += 1;
        }
        let year = to_year(Self::NAME, d, year)?;
        let mut remaining = d - Self::new_year(i64::from(year));
        let mut month = 1;
        loop {
            let length = i64::from(Self::month_length(year, month));
            if remaining < length || month == 12 {
                break;
            }
            remaining -= length;
            month += 1;
        }
        Ok(GregorianDate {
            year,
            month,
            day: remaining as u32 + 1,
        })
    }
}

// ---------------------------------------------------------------------------
// Julian
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct JulianDate {
    year: i32,
    month: u32,
    day: u32,
}

impl JulianDate {
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, CalendarError> {
        check_year(Self::NAME, year)?;
        if !(1..=12).contains(&month) {
            return Err(CalendarError::InvalidMonth {
                calendar: Self::NAME,
                year,
                month,
            });
        }
        check_day(Self::NAME, year, month, day, Self::month_length(year, month))?;
        Ok(JulianDate { year, month, day })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn is_leap_year(year: i32) -> bool {
        year % 4 == 0
    }

    pub fn month_length(year: i32, month: u32) -> u32 {
        solar_month_length(month, Self::is_leap_year(year))
    }

    fn day_of_year(&self) -> u32 {
        (1..self.month)
            .map(|m| Self::month_length(self.year, m))
            .sum::<u32>()
            + self.day
    }

    /// Julian 0001-01-01 fell two days before Gregorian 0001-01-01.
    fn new_year(year: i64) -> i64 {
        let prior = year - 1;
        1 + 365 * prior + prior.div_euclid(4) - 2
    }
}

impl CalendarDate for JulianDate {
    const NAME: &'static str = "Julian";

    fn to_absolute(&self) -> AbsoluteDay {
        AbsoluteDay(Self::new_year(i64::from(self.year)) + i64::from(self.day_of_year()) - 1)
    }

    fn from_absolute(day: AbsoluteDay) -> Result<Self, CalendarError> {
        let d = day.value();
        if d < Self::new_year(1) {
            return Err(CalendarError::BeforeEpoch {
                calendar: Self::NAME,
                day: d,
            });
        }
        let mut year = (d + 2) / 366;
        while d >= Self::new_year(year + 1) {
            year += 1;
        }
        let year = to_year(Self::NAME, d, year)?;
        let mut remaining = d - Self::new_year(i64::from(year));
        let mut month = 1;
        loop {
            let length = i64::from(Self::month_length(year, month));
            if remaining < length || month == 12 {
                break;
            }
            remaining -= length;
            month += 1;
        }
        Ok(JulianDate {
            year,
            month,
            day: remaining as u32 + 1,
        })
    }
}

// ---------------------------------------------------------------------------
// ISO week-date
// ---------------------------------------------------------------------------

/// ISO 8601 week-date. `weekday` runs 1 (Monday) to 7 (Sunday).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct IsoWeekDate {
    year: i32,
    week: u32,
    weekday: u32,
}

impl IsoWeekDate {
    pub fn new(year: i32, week: u32, weekday: u32) -> Result<Self, CalendarError> {
        check_year(Self::NAME, year)?;
        if week == 0 || week > Self::weeks_in_year(year) {
            return Err(CalendarError::InvalidWeek { year, week });
        }
        if !(1..=7).contains(&weekday) {
            return Err(CalendarError::InvalidWeekday(weekday));
        }
        Ok(IsoWeekDate {
            year,
            week,
            weekday,
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn week(&self) -> u32 {
        self.week
    }

    pub fn weekday(&self) -> u32 {
        self.weekday
    }

    /// 52 or 53.
    pub fn weeks_in_year(year: i32) -> u32 {
        let start = Self::week_one_monday(i64::from(year));
        let next = Self::week_one_monday(i64::from(year) + 1);
        ((next - start) / 7) as u32
    }

    /// Monday of week 1: the Monday on or before January 4.
    fn week_one_monday(year: i64) -> i64 {
        let jan4 = AbsoluteDay(GregorianDate::new_year(year) + 3);
        jan4.weekday_on_or_before(Weekday::Mon).value()
    }
}

impl CalendarDate for IsoWeekDate {
    const NAME: &'static str = "ISO";

    fn to_absolute(&self) -> AbsoluteDay {
        AbsoluteDay(
            Self::week_one_monday(i64::from(self.year))
                + 7 * i64::from(self.week - 1)
                + i64::from(self.weekday - 1),
        )
    }

    fn from_absolute(day: AbsoluteDay) -> Result<Self, CalendarError> {
        let d = day.value();
        if d < Self::week_one_monday(1) {
            return Err(CalendarError::BeforeEpoch {
                calendar: Self::NAME,
                day: d,
            });
        }
        // The Gregorian year of the Thursday three days back is never later than the ISO year.
        let mut year = if d - 3 >= 1 {
            i64::from(GregorianDate::from_absolute(AbsoluteDay(d - 3))?.year)
        } else {
            1
        };
        if d >= Self::week_one_monday(year + 1) {
            year += 1;
        }
        let week = 1 + (d - Self::week_one_monday(year)) / 7;
        let weekday = match d.rem_euclid(7) {
            0 => 7,
            n => n as u32,
        };
        Ok(IsoWeekDate {
            year: to_year(Self::NAME, d, year)?,
            week: week as u32,
            weekday,
        })
    }
}

// ---------------------------------------------------------------------------
// Islamic
// ---------------------------------------------------------------------------

/// Absolute day before Islamic 0001-01-01 (Julian 622-07-16).
const ISLAMIC_EPOCH: i64 = 227_014;

/// Arithmetic Islamic date. Months 1 (Muharram) to 12 (Dhu al-Hijja).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct IslamicDate {
    year: i32,
    month: u32,
    day: u32,
}

impl IslamicDate {
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, CalendarError> {
        check_year(Self::NAME, year)?;
        if !(1..=12).contains(&month) {
            return Err(CalendarError::InvalidMonth {
                calendar: Self::NAME,
                year,
                month,
            });
        }
        check_day(Self::NAME, year, month, day, Self::month_length(year, month))?;
        Ok(IslamicDate { year, month, day })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn is_leap_year(year: i32) -> bool {
        (11 * i64::from(year) + 14).rem_euclid(30) < 11
    }

    /// Odd months have 30 days, even months 29, except Dhu al-Hijja in a leap year.
    pub fn month_length(year: i32, month: u32) -> u32 {
        if month % 2 == 1 || (month == 12 && Self::is_leap_year(year)) {
            30
        } else {
            29
        }
    }

    fn absolute(year: i64, month: i64, day: i64) -> i64 {
        day + 29 * (month - 1)
            + month / 2
            + 354 * (year - 1)
            + (3 + 11 * year).div_euclid(30)
            + ISLAMIC_EPOCH
    }
}

impl CalendarDate for IslamicDate {
    const NAME: &'static str = "Islamic";

    fn to_absolute(&self) -> AbsoluteDay {
        AbsoluteDay(Self::absolute(
            i64::from(self.year),
            i64::from(self.month),
            i64::from(self.day),
        ))
    }

    fn from_absolute(day: AbsoluteDay) -> Result<Self, CalendarError> {
        let d = day.value();
        if d <= ISLAMIC_EPOCH {
            return Err(CalendarError::BeforeEpoch {
                calendar: Self::NAME,
                day: d,
            });
        }
        let mut year = (d - ISLAMIC_EPOCH) / 355;
        while d >= Self::absolute(year + 1, 1, 1) {
            year += 1;
        }
        let year = to_year(Self::NAME, d, year)?;
        let y = i64::from(year);
        let mut month = 1;
        while month < 12
            && d > Self::absolute(y, i64::from(month), i64::from(Self::month_length(year, month)))
        {
            month += 1;
        }
        let start = Self::absolute(y, i64::from(month), 1);
        Ok(IslamicDate {
            year,
            month,
            day: (d - start + 1) as u32,
        })
    }
}

// ---------------------------------------------------------------------------
// Hebrew
// ---------------------------------------------------------------------------

/// Absolute day before the Hebrew calendar's day 1 (Tishri 1 of year 1 is Julian -3761-10-07).
const HEBREW_EPOCH: i64 = -1_373_429;

/// Parts (1/1080 hour) thresholds for the molad postponements.
const MOLAD_NOON_PARTS: i64 = 19_440;
const GATARAD_PARTS: i64 = 9_924;
const BETUTAKPAT_PARTS: i64 = 16_789;

/// Hebrew date. Months are numbered from Nisan (1) so that Adar II is 13;
/// the civil year starts on Tishri (7).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct HebrewDate {
    year: i32,
    month: u32,
    day: u32,
}

impl HebrewDate {
    pub const NISAN: u32 = 1;
    pub const TISHRI: u32 = 7;
    pub const HESHVAN: u32 = 8;
    pub const KISLEV: u32 = 9;
    pub const ADAR: u32 = 12;
    pub const ADAR_II: u32 = 13;

    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, CalendarError> {
        check_year(Self::NAME, year)?;
        if month == 0 || month > Self::months_in_year(year) {
            return Err(CalendarError::InvalidMonth {
                calendar: Self::NAME,
                year,
                month,
            });
        }
        check_day(Self::NAME, year, month, day, Self::month_length(year, month))?;
        Ok(HebrewDate { year, month, day })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// Seven leap years (with Adar II) in every 19-year cycle.
    pub fn is_leap_year(year: i32) -> bool {
        (7 * i64::from(year) + 1).rem_euclid(19) < 7
    }

    pub fn months_in_year(year: i32) -> u32 {
        if Self::is_leap_year(year) {
            13
        } else {
            12
        }
    }

    /// Days from the epoch to Tishri 1 of `year`, after postponements.
    fn elapsed_days(year: i64) -> i64 {
        let prior = year - 1;
        let cycle_year = prior.rem_euclid(19);
        let months_elapsed =
            235 * prior.div_euclid(19) + 12 * cycle_year + (7 * cycle_year + 1) / 19;
        let parts_elapsed = 204 + 793 * months_elapsed.rem_euclid(1080);
        let hours_elapsed = 5
            + 12 * months_elapsed
            + 793 * months_elapsed.div_euclid(1080)
            + parts_elapsed.div_euclid(1080);
        let conjunction_day = 1 + 29 * months_elapsed + hours_elapsed.div_euclid(24);
        let conjunction_parts =
            1080 * hours_elapsed.rem_euclid(24) + parts_elapsed.rem_euclid(1080);

        let leap = |y: i64| (7 * y + 1).rem_euclid(19) < 7;
        let weekday = conjunction_day.rem_euclid(7);

        let postponed = conjunction_parts >= MOLAD_NOON_PARTS
            || (weekday == 2 && conjunction_parts >= GATARAD_PARTS && !leap(year))
            || (weekday == 1 && conjunction_parts >= BETUTAKPAT_PARTS && leap(year - 1));
        let alternative = if postponed {
            conjunction_day + 1
        } else {
            conjunction_day
        };

        // Rosh HaShanah never falls on Sunday, Wednesday or Friday.
        if matches!(alternative.rem_euclid(7), 0 | 3 | 5) {
            alternative + 1
        } else {
            alternative
        }
    }

    /// 353, 354 or 355 days in a common year; 383, 384 or 385 in a leap year.
    pub fn days_in_year(year: i32) -> u32 {
        let y = i64::from(year);
        (Self::elapsed_days(y + 1) - Self::elapsed_days(y)) as u32
    }

    fn long_heshvan(year: i32) -> bool {
        Self::days_in_year(year) % 10 == 5
    }

    fn short_kislev(year: i32) -> bool {
        Self::days_in_year(year) % 10 == 3
    }

    pub fn month_length(year: i32, month: u32) -> u32 {
        match month {
            2 | 4 | 6 | 10 | 13 => 29,
            Self::HESHVAN if !Self::long_heshvan(year) => 29,
            Self::KISLEV if Self::short_kislev(year) => 29,
            Self::ADAR if !Self::is_leap_year(year) => 29,
            _ => 30,
        }
    }

    fn absolute(year: i32, month: u32, day: u32) -> i64 {
        let mut days = i64::from(day);
        let sum = |range: std::ops::Range<u32>| -> i64 {
            range.map(|m| i64::from(Self::month_length(year, m))).sum()
        };
        if month < Self::TISHRI {
            days += sum(Self::TISHRI..Self::months_in_year(year) + 1);
            days += sum(Self::NISAN..month);
        } else {
            days += sum(Self::TISHRI..month);
        }
        days + Self::elapsed_days(i64::from(year)) + HEBREW_EPOCH
    }
}

impl CalendarDate for HebrewDate {
    const NAME: &'static str = "Hebrew";

    fn to_absolute(&self) -> AbsoluteDay {
        AbsoluteDay(Self::absolute(self.year, self.month, self.day))
    }

    fn from_absolute(day: AbsoluteDay) -> Result<Self, CalendarError> {
        let d = day.value();
        if d < Self::absolute(1, Self::TISHRI, 1) {
            return Err(CalendarError::BeforeEpoch {
                calendar: Self::NAME,
                day: d,
            });
        }
        let mut year = to_year(Self::NAME, d, ((d - HEBREW_EPOCH) / 366).max(1))?;
        while d >= Self::absolute(year + 1, Self::TISHRI, 1) {
            year += 1;
        }
        let mut month = if d < Self::absolute(year, Self::NISAN, 1) {
            Self::TISHRI
        } else {
            Self::NISAN
        };
        while d > Self::absolute(year, month, Self::month_length(year, month)) {
            month += 1;
        }
        let start = Self::absolute(year, month, 1);
        Ok(HebrewDate {
            year,
            month,
            day: (d - start + 1) as u32,
        })
    }
}

// ---------------------------------------------------------------------------
// All calendars at once
// ---------------------------------------------------------------------------

/// One absolute day expressed in every supported calendar.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DateSet {
    pub absolute: AbsoluteDay,
    pub gregorian: GregorianDate,
    pub julian: JulianDate,
    pub iso: IsoWeekDate,
    pub islamic: IslamicDate,
    pub hebrew: HebrewDate,
}

impl DateSet {
    pub fn from_absolute(day: AbsoluteDay) -> Result<Self, CalendarError> {
        Ok(DateSet {
            absolute: day,
            gregorian: GregorianDate::from_absolute(day)?,
            julian: JulianDate::from_absolute(day)?,
            iso: IsoWeekDate::from_absolute(day)?,
            islamic: IslamicDate::from_absolute(day)?,
            hebrew: HebrewDate::from_absolute(day)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn greg(y: i32, m: u32, d: u32) -> AbsoluteDay {
        GregorianDate::new(y, m, d).unwrap().to_absolute()
    }

    #[test]
    fn gregorian_anchor_days() {
        assert_eq!(greg(1, 1, 1).value(), 1);
        assert_eq!(greg(1970, 1, 1).value(), 719_163);
        assert_eq!(greg(2000, 1, 1).value(), 730_120);
        assert_eq!(greg(1, 1, 1).weekday(), Weekday::Mon);
        assert_eq!(greg(2024, 3, 20).weekday(), Weekday::Wed);
    }

    #[test]
    fn gregorian_validation() {
        assert!(GregorianDate::new(2023, 2, 29).is_err());
        assert!(GregorianDate::new(2024, 2, 29).is_ok());
        assert!(GregorianDate::new(1900, 2, 29).is_err());
        assert!(GregorianDate::new(2000, 2, 29).is_ok());
        assert!(matches!(
            GregorianDate::new(2024, 13, 1),
            Err(CalendarError::InvalidMonth { month: 13, .. })
        ));
        assert!(matches!(
            GregorianDate::new(0, 1, 1),
            Err(CalendarError::InvalidYear { year: 0, .. })
        ));
        assert!(matches!(
            GregorianDate::from_absolute(AbsoluteDay::new(0)),
            Err(CalendarError::BeforeEpoch { day: 0, .. })
        ));
    }

    #[test]
    fn day_of_year_counts_leap_day() {
        assert_eq!(GregorianDate::new(2024, 3, 1).unwrap().day_of_year(), 61);
        assert_eq!(GregorianDate::new(2023, 12, 31).unwrap().day_of_year(), 365);
    }

    #[test]
    fn weekday_on_or_before_is_idempotent_on_match() {
        let wed = greg(2024, 3, 20);
        assert_eq!(wed.weekday_on_or_before(Weekday::Wed), wed);
        assert_eq!(wed.weekday_on_or_before(Weekday::Mon), greg(2024, 3, 18));
        assert_eq!(wed.weekday_on_or_before(Weekday::Thu), greg(2024, 3, 14));
    }

    #[test]
    fn nth_weekday_from_both_ends() {
        // Last Sunday of March 2024 (European DST change)
        let last = GregorianDate::nth_weekday(2024, 3, -1, Weekday::Sun).unwrap();
        assert_eq!((last.month(), last.day()), (3, 31));
        // Second Sunday of March 2024 (US DST change)
        let second = GregorianDate::nth_weekday(2024, 3, 2, Weekday::Sun).unwrap();
        assert_eq!(second.day(), 10);
        assert!(GregorianDate::nth_weekday(2024, 2, 5, Weekday::Fri).is_none());
        assert!(GregorianDate::nth_weekday(2024, 2, 0, Weekday::Fri).is_none());
    }

    #[test]
    fn julian_calendar_reform() {
        // Thursday 4 October 1582 (Julian) was followed by Friday 15 October 1582 (Gregorian)
        let last_julian = JulianDate::new(1582, 10, 4).unwrap().to_absolute();
        assert_eq!(last_julian.value(), 577_735);
        let first_gregorian = GregorianDate::from_absolute(last_julian.offset(1)).unwrap();
        assert_eq!(
            (first_gregorian.year(), first_gregorian.month(), first_gregorian.day()),
            (1582, 10, 15)
        );
        assert_eq!(JulianDate::new(1, 1, 1).unwrap().to_absolute().value(), -1);
        assert!(JulianDate::new(1900, 2, 29).is_ok());
    }

    #[test]
    fn iso_year_boundaries() {
        let d = IsoWeekDate::from_absolute(greg(2021, 1, 3)).unwrap();
        assert_eq!((d.year(), d.week(), d.weekday()), (2020, 53, 7));
        let d = IsoWeekDate::from_absolute(greg(2026, 12, 31)).unwrap();
        assert_eq!((d.year(), d.week(), d.weekday()), (2026, 53, 4));
        let d = IsoWeekDate::from_absolute(greg(2024, 12, 30)).unwrap();
        assert_eq!((d.year(), d.week(), d.weekday()), (2025, 1, 1));
        assert_eq!(IsoWeekDate::weeks_in_year(2020), 53);
        assert_eq!(IsoWeekDate::weeks_in_year(2024), 52);
        assert!(IsoWeekDate::new(2024, 53, 1).is_err());
        assert!(IsoWeekDate::new(2024, 10, 8).is_err());
    }

    #[test]
    fn iso_agrees_with_chrono() {
        let mut day = greg(2015, 12, 20);
        for _ in 0..800 {
            let ours = IsoWeekDate::from_absolute(day).unwrap();
            let theirs = day.to_naive_date().unwrap().iso_week();
            assert_eq!(ours.year(), theirs.year());
            assert_eq!(ours.week(), theirs.week());
            day = day.offset(1);
        }
    }

    #[test]
    fn islamic_epoch_and_lengths() {
        let first = IslamicDate::new(1, 1, 1).unwrap().to_absolute();
        let julian = JulianDate::from_absolute(first).unwrap();
        assert_eq!((julian.year(), julian.month(), julian.day()), (622, 7, 16));
        assert!(IslamicDate::from_absolute(AbsoluteDay::new(ISLAMIC_EPOCH)).is_err());
        assert!(IslamicDate::is_leap_year(2));
        assert!(!IslamicDate::is_leap_year(1));
        assert_eq!(IslamicDate::month_length(2, 12), 30);
        assert_eq!(IslamicDate::month_length(1, 12), 29);
    }

    #[test]
    fn hebrew_year_5784_is_a_long_leap_year() {
        assert!(HebrewDate::is_leap_year(5784));
        assert_eq!(HebrewDate::days_in_year(5784), 383);
        assert_eq!(HebrewDate::days_in_year(5783), 355);
        let lengths: Vec<u32> = (1..=13).map(|m| HebrewDate::month_length(5784, m)).collect();
        assert_eq!(
            lengths,
            vec![30, 29, 30, 29, 30, 29, 30, 29, 29, 29, 30, 30, 29]
        );
        let rosh_hashanah = HebrewDate::new(5784, HebrewDate::TISHRI, 1).unwrap();
        let greg = GregorianDate::from_absolute(rosh_hashanah.to_absolute()).unwrap();
        assert_eq!((greg.year(), greg.month(), greg.day()), (2023, 9, 16));
    }

    #[test]
    fn hebrew_rejects_missing_months() {
        assert!(HebrewDate::new(5783, HebrewDate::ADAR_II, 1).is_err());
        assert!(HebrewDate::new(5784, HebrewDate::ADAR_II, 29).is_ok());
        assert!(HebrewDate::new(5784, HebrewDate::KISLEV, 30).is_err());
    }
}
