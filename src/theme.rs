//! Theme Control Module
//!
//! Reads and switches the Plasma global theme (look-and-feel package).

use log::{debug, info};
use std::fs;
use std::path::PathBuf;
use std::process::Command;

use crate::error::{Error, Result};

const LOOK_AND_FEEL_KEY: &str = "LookAndFeelPackage=";

/// Query and switch the active desktop theme.
pub trait ThemeController {
    /// Id of the active theme, if it can be determined.
    fn current(&self) -> Option<String>;

    /// Make `theme` the active theme.
    fn apply(&self, theme: &str) -> Result<()>;
}

impl<T: ThemeController + ?Sized> ThemeController for Box<T> {
    fn current(&self) -> Option<String> {
        (**self).current()
    }

    fn apply(&self, theme: &str) -> Result<()> {
        (**self).apply(theme)
    }
}

// ===================== KDE PLASMA =====================

/// Plasma: the current theme lives in `kdeglobals`, `lookandfeeltool` applies one.
#[derive(Debug, Clone)]
pub struct KdeThemeController {
    pub kdeglobals: PathBuf,
    pub tool: PathBuf,
}

impl KdeThemeController {
    pub fn new(kdeglobals: PathBuf, tool: PathBuf) -> Self {
        Self { kdeglobals, tool }
    }

    /// `~/.config/kdeglobals` and `lookandfeeltool` from `PATH`.
    pub fn for_current_user() -> Self {
        let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from(".config"));
        Self::new(config.join("kdeglobals"), PathBuf::from("lookandfeeltool"))
    }
}

impl ThemeController for KdeThemeController {
    fn current(&self) -> Option<String> {
        match fs::read_to_string(&self.kdeglobals) {
            Ok(text) => parse_look_and_feel(&text),
            Err(e) => {
                debug!("cannot read {}: {}", self.kdeglobals.display(), e);
                None
            }
        }
    }

    fn apply(&self, theme: &str) -> Result<()> {
        let output = Command::new(&self.tool).args(["-a", theme]).output().map_err(|e| {
            Error::ThemeSwitch { theme: theme.to_string(), reason: e.to_string() }
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            debug!("{}: {}", self.tool.display(), stdout.trim());
        }

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = match stderr.trim() {
                "" => output.status.to_string(),
                msg => msg.to_string(),
            };
            Err(Error::ThemeSwitch { theme: theme.to_string(), reason })
        }
    }
}

/// Value of the first `LookAndFeelPackage=` entry, spaces removed.
pub fn parse_look_and_feel(kdeglobals: &str) -> Option<String> {
    kdeglobals
        .lines()
        .find_map(|line| line.trim_start().strip_prefix(LOOK_AND_FEEL_KEY))
        .map(|value| value.replace(' ', ""))
        .filter(|value| !value.is_empty())
}

// ===================== DRY RUN =====================

/// Reports what would be switched without touching the desktop.
#[derive(Debug, Clone)]
pub struct DryRun<C>(pub C);

impl<C: ThemeController> ThemeController for DryRun<C> {
    fn current(&self) -> Option<String> {
        self.0.current()
    }

    fn apply(&self, theme: &str) -> Result<()> {
        info!("dry run: would switch theme to \"{}\"", theme);
        Ok(())
    }
}

// ===================== TESTS =====================
