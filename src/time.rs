//! Time and Timezone Utilities Module
//!
//! Resolves the UTC offset for the run once, at the program boundary. The
//! calculator itself only ever sees a fixed offset in hours.

use chrono::{DateTime, FixedOffset, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use iana_time_zone::get_timezone;
use std::sync::OnceLock;
use tzf_rs::DefaultFinder;

use crate::error::{Error, Result};
use crate::solar::{Coordinates, DayFraction, LocalMoment};

// tzf-rs DefaultFinder is pre-compiled and very fast
static TZF_FINDER: OnceLock<DefaultFinder> = OnceLock::new();

// ===================== ZONE SELECTION =====================

/// Where the offset for "local time" comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Zone {
    /// IANA zone; the offset follows its DST rules for the chosen instant
    Named(Tz),
    /// Fixed offset given on the command line
    Fixed(FixedOffset),
}

impl Zone {
    /// Resolve a `--timezone` value.
    ///
    /// Accepts `system`, `location` (zone containing `coords`), an IANA name
    /// or a fixed `±HH[:MM]` offset.
    pub fn resolve(spec: &str, coords: Coordinates) -> Result<Self> {
        match spec {
            "system" => Ok(Zone::system()),
            "location" => Ok(Zone::at_location(coords)),
            other => {
                if let Some(offset) = parse_fixed_offset(other) {
                    return Ok(Zone::Fixed(offset));
                }
                other
                    .parse::<Tz>()
                    .map(Zone::Named)
                    .map_err(|_| Error::UnknownTimezone(other.to_string()))
            }
        }
    }

    /// The instant `utc` as local wall time with its offset.
    pub fn localize(&self, utc: DateTime<Utc>) -> DateTime<FixedOffset> {
        match self {
            Zone::Named(tz) => utc.with_timezone(tz).fixed_offset(),
            Zone::Fixed(offset) => utc.with_timezone(offset),
        }
    }

    /// Attach this zone to a wall-clock time.
    ///
    /// # Errors
    /// Fails for times skipped by a DST transition. Ambiguous times resolve
    /// to the earlier instant.
    pub fn from_local(&self, naive: NaiveDateTime) -> Result<DateTime<FixedOffset>> {
        let resolved = match self {
            Zone::Named(tz) => tz.from_local_datetime(&naive).earliest().map(|t| t.fixed_offset()),
            Zone::Fixed(offset) => offset.from_local_datetime(&naive).earliest(),
        };
        resolved.ok_or_else(|| Error::NonexistentLocalTime(naive.to_string()))
    }

    /// Zone configured on this machine, UTC when it cannot be determined.
    pub fn system() -> Self {
        let tz = get_timezone().ok().and_then(|name| name.parse().ok());
        Zone::Named(tz.unwrap_or(Tz::UTC))
    }

    /// Zone whose boundary contains `coords`, UTC if its name is unknown.
    pub fn at_location(coords: Coordinates) -> Self {
        let finder = TZF_FINDER.get_or_init(DefaultFinder::new);
        let name = finder.get_tz_name(coords.longitude, coords.latitude);
        Zone::Named(name.parse().unwrap_or(Tz::UTC))
    }
}

/// Parse `+HH`, `+HHMM` or `+HH:MM` (or with `-`) into a fixed offset.
pub fn parse_fixed_offset(s: &str) -> Option<FixedOffset> {
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    let (hh, mm) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None if rest.len() == 4 => rest.split_at(2),
        None => (rest, "0"),
    };
    if hh.is_empty() || hh.len() > 2 || !hh.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = hh.parse().ok()?;
    let minutes: i32 = mm.parse().ok()?;
    if hours > 14 || !(0..60).contains(&minutes) {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

// ===================== TIME PARSING =====================

/// Parse a time string in HH:MM or HH:MM:SS format.
///
/// # Errors
/// Returns an error if the time format is invalid
pub fn parse_time(s: &str) -> Result<NaiveTime> {
    ["%H:%M:%S", "%H:%M"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| Error::InvalidTime(s.to_string()))
}

// ===================== LOCAL MOMENT =====================

/// Split a zoned instant into the calculator's inputs.
pub fn local_moment(dt: &DateTime<FixedOffset>) -> LocalMoment {
    let offset_secs = dt.offset().local_minus_utc();
    LocalMoment::new(dt.date_naive(), dt.time(), f64::from(offset_secs) / 3600.0)
}

// ===================== FORMATTING =====================

/// Day length as "Xh Ym Zs", dropping zero parts.
pub fn format_day_length(length: DayFraction) -> String {
    let total = TimeDelta::seconds(length.as_seconds().abs());
    let parts: Vec<String> = [
        (total.num_hours(), 'h'),
        (total.num_minutes() % 60, 'm'),
        (total.num_seconds() % 60, 's'),
    ]
    .into_iter()
    .filter(|(value, _)| *value > 0)
    .map(|(value, unit)| format!("{}{}", value, unit))
    .collect();

    if parts.is_empty() { "0s".to_string() } else { parts.join(" ") }
}

// ===================== TESTS =====================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    #[test]
    fn test_time_parsing_invalid() {
        assert!(parse_time("a").is_err());
        assert!(parse_time("21").is_err());
        assert!(parse_time("25:00").is_err());
        assert!(parse_time("12:60").is_err());
        assert!(parse_time("12:30:99").is_err());
    }

    #[test]
    fn test_time_parsing_valid() {
        assert_eq!(parse_time("12:30").unwrap(), NaiveTime::from_hms_opt(12, 30, 0).unwrap());
        assert_eq!(parse_time("00:00").unwrap(), NaiveTime::MIN);
        assert_eq!(parse_time("23:59:59").unwrap(), NaiveTime::from_hms_opt(23, 59, 59).unwrap());
    }

    #[test]
    fn test_parse_fixed_offset() {
        assert_eq!(parse_fixed_offset("+02:00"), FixedOffset::east_opt(7200));
        assert_eq!(parse_fixed_offset("+0530"), FixedOffset::east_opt(19_800));
        assert_eq!(parse_fixed_offset("-05"), FixedOffset::west_opt(18_000));
        assert_eq!(parse_fixed_offset("-03:30"), FixedOffset::west_opt(12_600));
        assert_eq!(parse_fixed_offset("02:00"), None);
        assert_eq!(parse_fixed_offset("+25:00"), None);
        assert_eq!(parse_fixed_offset("+02:75"), None);
        assert_eq!(parse_fixed_offset("+"), None);
    }

    #[test]
    fn test_zone_resolve() {
        let origin = Coordinates::new(0.0, 0.0);
        assert_eq!(
            Zone::resolve("Europe/Amsterdam", origin).unwrap(),
            Zone::Named(chrono_tz::Europe::Amsterdam)
        );
        assert_eq!(
            Zone::resolve("+01:00", origin).unwrap(),
            Zone::Fixed(FixedOffset::east_opt(3600).unwrap())
        );
        assert!(matches!(
            Zone::resolve("Mars/Olympus_Mons", origin),
            Err(Error::UnknownTimezone(_))
        ));
    }

    #[test]
    fn test_zone_at_location() {
        let washington = Zone::at_location(Coordinates::new(38.8977, -77.0365));
        assert_eq!(washington, Zone::Named(chrono_tz::America::New_York));
        assert_eq!(
            Zone::resolve("location", Coordinates::new(52.3676, 4.9041)).unwrap(),
            Zone::Named(chrono_tz::Europe::Amsterdam)
        );
    }

    #[test]
    fn test_named_zone_follows_dst() {
        let zone = Zone::Named(chrono_tz::Europe::Amsterdam);

        let summer = zone.localize(Utc.with_ymd_and_hms(2024, 6, 21, 10, 0, 0).unwrap());
        assert_eq!(summer.hour(), 12);
        assert_eq!(local_moment(&summer).utc_offset_hours, 2.0);

        let winter = zone.localize(Utc.with_ymd_and_hms(2024, 12, 21, 10, 0, 0).unwrap());
        assert_eq!(local_moment(&winter).utc_offset_hours, 1.0);
    }

    #[test]
    fn test_negative_and_half_hour_offsets() {
        let ny = Zone::Named(chrono_tz::America::New_York)
            .localize(Utc.with_ymd_and_hms(2024, 11, 5, 17, 0, 0).unwrap());
        assert_eq!(local_moment(&ny).utc_offset_hours, -5.0);

        let kolkata = Zone::Named(chrono_tz::Asia::Kolkata)
            .localize(Utc.with_ymd_and_hms(2025, 12, 25, 6, 30, 0).unwrap());
        let m = local_moment(&kolkata);
        assert_eq!(m.utc_offset_hours, 5.5);
        assert_eq!(m.time, NaiveTime::from_hms_opt(12, 0, 0).unwrap());
    }

    #[test]
    fn test_from_local_rejects_dst_gap() {
        let zone = Zone::Named(chrono_tz::Europe::Amsterdam);
        let gap = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap().and_hms_opt(2, 30, 0).unwrap();
        assert!(matches!(zone.from_local(gap), Err(Error::NonexistentLocalTime(_))));

        let noon = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap().and_hms_opt(12, 0, 0).unwrap();
        let dt = zone.from_local(noon).unwrap();
        assert_eq!(local_moment(&dt).utc_offset_hours, 2.0);
    }

    #[test]
    fn test_format_day_length() {
        assert_eq!(format_day_length(DayFraction(0.5)), "12h");
        assert_eq!(format_day_length(DayFraction(0.0625)), "1h 30m");
        assert_eq!(format_day_length(DayFraction(1.0 / 1024.0)), "1m 24s");
        assert_eq!(format_day_length(DayFraction(0.0)), "0s");
        assert_eq!(format_day_length(DayFraction(-0.25)), "6h");
    }
}
