//! Command-Line Interface Module
//!
//! Handles argument parsing and validation for daynight-theme. Themes, paths,
//! coordinates and the time zone can also come from `DAYNIGHT_*` variables.

use clap::Parser;
use std::path::PathBuf;

use crate::location::{CACHE_FILE_NAME, DEFAULT_WHERE_AM_I};
use crate::solar::Coordinates;

// ===================== CLI =====================

/// Automatically switches day and night themes based on the current time of day.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Look-and-feel package to use during the day
    #[arg(short, long, env = "DAYNIGHT_DAY_THEME")]
    pub day_theme: Option<String>,

    /// Look-and-feel package to use during the night
    #[arg(short, long, env = "DAYNIGHT_NIGHT_THEME")]
    pub night_theme: Option<String>,

    /// Discard the saved location and run detection again
    #[arg(short = 'l', long)]
    pub location_redetect: bool,

    /// Print location and sun event times
    #[arg(short, long, env = "DAYNIGHT_VERBOSE")]
    pub verbose: bool,

    /// Where the detected location is cached
    #[arg(short = 'f', long, value_name = "PATH", default_value_os_t = default_cache_file(), env = "DAYNIGHT_LOCATION_CACHE_FILE")]
    pub location_cache_file: PathBuf,

    /// Path of the geoclue where-am-i helper
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_WHERE_AM_I, env = "DAYNIGHT_WHERE_AM_I")]
    pub where_am_i: PathBuf,

    /// Seconds the where-am-i helper may spend on detection (1 to 300)
    #[arg(short, long, default_value_t = 5, value_parser = parse_timeout, env = "DAYNIGHT_TIMEOUT")]
    pub timeout: u32,

    /// Observer latitude in decimal degrees (-90 to 90); skips location detection
    #[arg(long, allow_hyphen_values = true, value_parser = parse_latitude, requires = "longitude", env = "DAYNIGHT_LATITUDE")]
    pub latitude: Option<f64>,

    /// Observer longitude in decimal degrees (-180 to 180); skips location detection
    #[arg(long, allow_hyphen_values = true, value_parser = parse_longitude, requires = "latitude", env = "DAYNIGHT_LONGITUDE")]
    pub longitude: Option<f64>,

    /// Time zone to use ("system", "location", an IANA name, or a fixed offset like "+02:00")
    #[arg(long, default_value = "system", allow_hyphen_values = true, env = "DAYNIGHT_TIMEZONE")]
    pub timezone: String,

    /// Evaluate another date (e.g. "2024-12-25" or "tomorrow") instead of today
    #[arg(long)]
    pub date: Option<String>,

    /// Evaluate a specific local time (HH:MM[:SS] or "now")
    #[arg(long)]
    pub at: Option<String>,

    /// Decide and report, but never switch the theme
    #[arg(long)]
    pub dry_run: bool,
}

impl Args {
    /// Coordinates given on the command line, if any.
    pub fn coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.latitude?, self.longitude?))
    }
}

/// `<user cache dir>/kde-auto-day-night-mode`
pub fn default_cache_file() -> PathBuf {
    dirs::cache_dir().unwrap_or_else(std::env::temp_dir).join(CACHE_FILE_NAME)
}

// ===================== CLI VALUE PARSERS =====================

fn parse_latitude(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|_| format!("Invalid number: {}", s))?;
    if !(-90.0..=90.0).contains(&v) {
        return Err(format!("Latitude must be between -90 and 90, got {}", v));
    }
    Ok(v)
}

fn parse_longitude(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|_| format!("Invalid number: {}", s))?;
    if !(-180.0..=180.0).contains(&v) {
        return Err(format!("Longitude must be between -180 and 180, got {}", v));
    }
    Ok(v)
}

fn parse_timeout(s: &str) -> Result<u32, String> {
    let v: u32 = s.parse().map_err(|_| format!("Invalid integer: {}", s))?;
    if !(1..=300).contains(&v) {
        return Err(format!("Timeout must be between 1 and 300 seconds, got {}", v));
    }
    Ok(v)
}

// ===================== TESTS =====================
