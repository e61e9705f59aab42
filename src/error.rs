//! Error Types Module
//!
//! Errors raised by the solar calculation, the time boundary and the theme
//! controller. Location detection never fails; it degrades to 0,0 instead.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::solar::DayFraction;

/// Why the sunrise hour angle has no solution on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolarCondition {
    /// Sun stays above the horizon all day (arccosine argument below -1)
    PolarDay,
    /// Sun stays below the horizon all day (arccosine argument above 1)
    PolarNight,
}

impl fmt::Display for PolarCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolarCondition::PolarDay => f.write_str("permanent day"),
            PolarCondition::PolarNight => f.write_str("permanent night"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("hour angle undefined ({condition}), solar noon at {solar_noon}")]
    HourAngleUndefined { condition: PolarCondition, solar_noon: DayFraction },

    #[error("invalid time '{0}', use HH:MM, HH:MM:SS or \"now\"")]
    InvalidTime(String),

    #[error("unknown time zone '{0}'")]
    UnknownTimezone(String),

    #[error("local time {0} does not exist (DST gap)")]
    NonexistentLocalTime(String),

    #[error("theme switch to '{theme}' failed: {reason}")]
    ThemeSwitch { theme: String, reason: String },

    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
