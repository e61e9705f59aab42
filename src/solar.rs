//! Solar Position Calculation Module
//!
//! Sunrise, solar noon and sunset from the NOAA solar calculator equations
//! (the spreadsheet version of Meeus' low-precision solar coordinates).
//! Everything here is a pure function of a local moment and a location.

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use std::fmt;

use crate::error::{Error, PolarCondition, Result};

// ===================== CONSTANTS =====================

/// Bridges proleptic-Gregorian day numbers to the 1900-based day serials of
/// the NOAA spreadsheet: 18 Dec 2010 is ordinal 734124 and serial 40529.
pub const REFERENCE_OFFSET: i64 = 734_124 - 40_529;

/// Added to a day serial to land on the Julian day scale. With
/// `REFERENCE_OFFSET` the result runs one day behind the astronomical Julian
/// day; the NOAA chain below is calibrated against that scale.
const SERIAL_EPOCH_JD: f64 = 2_415_018.5;

/// Julian day of J2000.0
const J2000_JD: f64 = 2_451_545.0;

const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;

/// Zenith angle of the sun's centre at apparent sunrise/sunset in degrees:
/// 90° plus 34' of standard refraction plus the 16' solar semi-diameter.
pub const SUNRISE_ZENITH_DEG: f64 = 90.833;

const MINUTES_PER_DAY: f64 = 1440.0;

// ===================== TYPES =====================

/// Observer location in decimal degrees, north and east positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// The local civil instant a calculation is made for.
///
/// `utc_offset_hours` is a fixed offset, east positive. Daylight saving and
/// time zone rules are resolved by the caller before construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalMoment {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub utc_offset_hours: f64,
}

impl LocalMoment {
    pub fn new(date: NaiveDate, time: NaiveTime, utc_offset_hours: f64) -> Self {
        Self { date, time, utc_offset_hours }
    }

    /// Position of the moment within its local day, whole seconds only.
    pub fn day_fraction(&self) -> DayFraction {
        let t = &self.time;
        DayFraction(
            f64::from(t.hour()) / 24.0
                + f64::from(t.minute()) / MINUTES_PER_DAY
                + f64::from(t.second()) / 86_400.0,
        )
    }

    /// Julian day of the moment on the calculator's scale, shifted from local
    /// time to UTC. One day behind the astronomical Julian day.
    pub fn julian_day(&self) -> f64 {
        let serial = i64::from(self.date.num_days_from_ce()) - REFERENCE_OFFSET;
        let t = &self.time;
        let time_of_day = (f64::from(t.hour())
            + f64::from(t.minute()) / 60.0
            + f64::from(t.second()) / 3600.0)
            / 24.0;
        serial as f64 + SERIAL_EPOCH_JD + time_of_day - self.utc_offset_hours / 24.0
    }
}

/// A time of day as a fraction of a day: 0 is midnight, 0.5 is noon.
///
/// Values slightly outside [0, 1) occur when an event falls on the previous
/// or next local day; they compare as-is and wrap only when displayed.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct DayFraction(pub f64);

impl DayFraction {
    /// Hours, minutes and seconds, each truncated rather than rounded.
    pub fn hms(self) -> (u32, u32, u32) {
        let hours = 24.0 * self.0.rem_euclid(1.0);
        let h = hours.floor();
        let minutes = (hours - h) * 60.0;
        let m = minutes.floor();
        let seconds = (minutes - m) * 60.0;
        let s = seconds.floor();
        ((h as u32) % 24, m as u32, s as u32)
    }

    /// Length in whole seconds, for durations such as day length.
    pub fn as_seconds(self) -> i64 {
        (self.0 * 86_400.0) as i64
    }
}

impl fmt::Display for DayFraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (h, m, s) = self.hms();
        write!(f, "{:02}:{:02}:{:02}", h, m, s)
    }
}

/// Sun events of one local day, as fractions of that day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarResult {
    pub sunrise: DayFraction,
    pub solar_noon: DayFraction,
    pub sunset: DayFraction,
}

impl SolarResult {
    pub fn day_length(&self) -> DayFraction {
        DayFraction(self.sunset.0 - self.sunrise.0)
    }
}

// ===================== CALCULATION =====================

/// Compute sunrise, solar noon and sunset for the day containing `moment`.
///
/// # Errors
/// Returns [`Error::HourAngleUndefined`] when the sun does not cross the
/// horizon that day (inside the polar circles around the solstices).
pub fn compute(moment: LocalMoment, coords: Coordinates) -> Result<SolarResult> {
    let tz = moment.utc_offset_hours;
    let jc = (moment.julian_day() - J2000_JD) / DAYS_PER_JULIAN_CENTURY;

    let mean_anomaly = 357.52911 + jc * (35999.05029 - 0.0001537 * jc);
    // Floored modulo on the whole drift term, then the epoch value on top
    let mean_longitude = 280.46646 + (jc * (36000.76983 + jc * 0.0003032)).rem_euclid(360.0);
    let eccentricity = 0.016708634 - jc * (0.000042037 + 0.0001537 * jc);

    let mean_obliquity =
        23.0 + (26.0 + (21.448 - jc * (46.815 + jc * (0.00059 - jc * 0.001813))) / 60.0) / 60.0;
    let omega = (125.04 - 1934.136 * jc).to_radians();
    let obliquity = mean_obliquity + 0.00256 * omega.cos();
    let half_tan = (obliquity / 2.0).to_radians().tan();
    let y = half_tan * half_tan;

    let m = mean_anomaly.to_radians();
    let equation_of_center = m.sin() * (1.914602 - jc * (0.004817 + 0.000014 * jc))
        + (2.0 * m).sin() * (0.019993 - 0.000101 * jc)
        + (3.0 * m).sin() * 0.000289;
    let true_longitude = mean_longitude + equation_of_center;
    let apparent_longitude = true_longitude - 0.00569 - 0.00478 * omega.sin();
    let declination =
        (obliquity.to_radians().sin() * apparent_longitude.to_radians().sin()).asin().to_degrees();

    let l0 = mean_longitude.to_radians();
    let eq_time_minutes = 4.0
        * (y * (2.0 * l0).sin() - 2.0 * eccentricity * m.sin()
            + 4.0 * eccentricity * y * m.sin() * (2.0 * l0).cos()
            - 0.5 * y * y * (4.0 * l0).sin()
            - 1.25 * eccentricity * eccentricity * (2.0 * m).sin())
        .to_degrees();

    let solar_noon = DayFraction(
        (720.0 - 4.0 * coords.longitude - eq_time_minutes + tz * 60.0) / MINUTES_PER_DAY,
    );

    let lat = coords.latitude.to_radians();
    let decl = declination.to_radians();
    let cos_hour_angle =
        SUNRISE_ZENITH_DEG.to_radians().cos() / (lat.cos() * decl.cos()) - lat.tan() * decl.tan();

    // NaN only comes from non-finite input; report it as the sun never rising
    if cos_hour_angle > 1.0 || cos_hour_angle.is_nan() {
        return Err(Error::HourAngleUndefined {
            condition: PolarCondition::PolarNight,
            solar_noon,
        });
    }
    if cos_hour_angle < -1.0 {
        return Err(Error::HourAngleUndefined { condition: PolarCondition::PolarDay, solar_noon });
    }

    let hour_angle_deg = cos_hour_angle.acos().to_degrees();
    let half_day = hour_angle_deg * 4.0 / MINUTES_PER_DAY;

    Ok(SolarResult {
        sunrise: DayFraction(solar_noon.0 - half_day),
        solar_noon,
        sunset: DayFraction(solar_noon.0 + half_day),
    })
}

/// True when `moment` lies strictly between sunrise and sunset.
///
/// The interval is open: the exact sunrise and sunset instants count as night.
pub fn is_daytime(moment: &LocalMoment, result: &SolarResult) -> bool {
    let t = moment.day_fraction();
    t > result.sunrise && t < result.sunset
}

// ===================== TESTS =====================
