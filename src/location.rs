//! Location Detection Module
//!
//! Observer coordinates come from a [`LocationProvider`]. The geoclue
//! `where-am-i` demo is run at most once per cache lifetime; its raw output is
//! kept in a cache file and parsed on every run.

use log::{debug, warn};
use std::fs;
use std::path::PathBuf;
use std::process::Command;

use crate::error::{Error, Result};
use crate::solar::Coordinates;

// ===================== CONSTANTS =====================

/// Default location of the geoclue demo agent
pub const DEFAULT_WHERE_AM_I: &str = "/usr/lib/geoclue-2.0/demos/where-am-i";

/// File name of the cache under the user cache directory
pub const CACHE_FILE_NAME: &str = "kde-auto-day-night-mode";

/// Accuracy level passed to where-am-i (4 = street level)
const ACCURACY_LEVEL: &str = "4";

// ===================== PROVIDERS =====================

pub trait LocationProvider {
    /// Best known coordinates. Failures degrade to 0,0 and are logged.
    fn detect(&self) -> Coordinates;
}

/// Coordinates given on the command line.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

impl LocationProvider for FixedLocation {
    fn detect(&self) -> Coordinates {
        self.0
    }
}

/// Location from the geoclue `where-am-i` helper, cached on disk.
#[derive(Debug, Clone)]
pub struct WhereAmI {
    pub executable: PathBuf,
    pub cache_file: PathBuf,
    /// Passed to the helper as `-t`; it gives up on its own after that long
    pub timeout_secs: u32,
    /// Re-run the helper even when the cache file exists
    pub force_detect: bool,
}

impl WhereAmI {
    pub fn needs_detection(&self) -> bool {
        self.force_detect || !self.cache_file.exists()
    }

    /// Run the helper and store its output in the cache file.
    ///
    /// The cache is only overwritten on success, so a failed run keeps the
    /// previous location.
    fn refresh_cache(&self) -> Result<()> {
        let timeout = self.timeout_secs.to_string();
        debug!(
            "running {} -t {} -a {}",
            self.executable.display(),
            timeout,
            ACCURACY_LEVEL
        );

        let output = Command::new(&self.executable)
            .args(["-t", timeout.as_str(), "-a", ACCURACY_LEVEL])
            .output()
            .map_err(|source| Error::Io { path: self.executable.clone(), source })?;

        if !output.status.success() {
            warn!(
                "{} exited with {}, keeping cached location",
                self.executable.display(),
                output.status
            );
            return Ok(());
        }

        if let Some(dir) = self.cache_file.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)
                .map_err(|source| Error::Io { path: dir.to_path_buf(), source })?;
        }
        fs::write(&self.cache_file, &output.stdout)
            .map_err(|source| Error::Io { path: self.cache_file.clone(), source })
    }
}

impl LocationProvider for WhereAmI {
    fn detect(&self) -> Coordinates {
        if self.needs_detection()
            && let Err(e) = self.refresh_cache()
        {
            warn!("location detection failed: {}", e);
        }

        match fs::read_to_string(&self.cache_file) {
            Ok(text) => parse_coordinates(&text),
            Err(e) => {
                warn!(
                    "cannot read location cache {}: {}, using 0,0",
                    self.cache_file.display(),
                    e
                );
                Coordinates::new(0.0, 0.0)
            }
        }
    }
}

// ===================== PARSING =====================

/// Extract coordinates from where-am-i output.
///
/// Every line mentioning `Latitude` or `Longitude` is reduced to its number;
/// later lines win. A coordinate with no parseable line stays at 0.0, which
/// is the equator or the prime meridian rather than an error.
pub fn parse_coordinates(text: &str) -> Coordinates {
    let mut coords = Coordinates::new(0.0, 0.0);
    let mut seen = (false, false);

    for line in text.lines() {
        if line.contains("Latitude") {
            match parse_coordinate_value(line) {
                Some(v) => {
                    coords.latitude = v;
                    seen.0 = true;
                }
                None => warn!("unparseable latitude line: {:?}", line),
            }
        }
        if line.contains("Longitude") {
            match parse_coordinate_value(line) {
                Some(v) => {
                    coords.longitude = v;
                    seen.1 = true;
                }
                None => warn!("unparseable longitude line: {:?}", line),
            }
        }
    }

    if !seen.0 {
        warn!("no latitude in location data, assuming 0.0");
    }
    if !seen.1 {
        warn!("no longitude in location data, assuming 0.0");
    }
    coords
}

/// Strip letters, spaces, colons, line ends and the degree sign, accept a
/// comma as decimal separator, then parse what is left.
fn parse_coordinate_value(line: &str) -> Option<f64> {
    let number: String = line
        .chars()
        .filter(|c| !(c.is_ascii_alphabetic() || matches!(c, ' ' | ':' | '°' | '\n' | '\r')))
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    number.trim().parse().ok()
}

// ===================== TESTS =====================
