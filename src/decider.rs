//! Day/Night Decision Module
//!
//! Ties the solar calculation to the theme controller: pick the day or night
//! theme for a moment and switch only when it is not already active.

use log::{debug, info, warn};

use crate::error::{Error, PolarCondition, Result};
use crate::solar::{self, Coordinates, DayFraction, LocalMoment, SolarResult};
use crate::theme::ThemeController;

// ===================== TYPES =====================

/// Sun events for the day, or why there are none.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SunState {
    Regular(SolarResult),
    Polar { condition: PolarCondition, solar_noon: DayFraction },
}

impl SunState {
    /// Run the calculator, turning an undefined hour angle into polar state.
    pub fn compute(moment: LocalMoment, coords: Coordinates) -> Result<Self> {
        match solar::compute(moment, coords) {
            Ok(res) => Ok(SunState::Regular(res)),
            Err(Error::HourAngleUndefined { condition, solar_noon }) => {
                Ok(SunState::Polar { condition, solar_noon })
            }
            Err(e) => Err(e),
        }
    }

    /// Polar day counts as day all day long, polar night as night.
    pub fn is_day(&self, moment: &LocalMoment) -> bool {
        match self {
            SunState::Regular(res) => solar::is_daytime(moment, res),
            SunState::Polar { condition, .. } => *condition == PolarCondition::PolarDay,
        }
    }
}

/// What happened to the desktop theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeAction {
    NoThemeGiven,
    AlreadyActive,
    Switched,
    SwitchFailed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub sun: SunState,
    pub is_day: bool,
    pub selected_theme: Option<String>,
    pub action: ThemeAction,
}

// ===================== DECISION =====================

/// Select the day or night theme for `moment` and apply it if needed.
///
/// Empty theme ids are treated as unset. A failing switch is recorded in the
/// returned [`Decision`] and is not an error.
pub fn decide<C>(
    coords: Coordinates,
    moment: LocalMoment,
    day_theme: Option<&str>,
    night_theme: Option<&str>,
    controller: &C,
) -> Result<Decision>
where
    C: ThemeController + ?Sized,
{
    let sun = SunState::compute(moment, coords)?;
    let is_day = sun.is_day(&moment);
    debug!("{} at {}", if is_day { "day" } else { "night" }, moment.time);

    let selected_theme = (if is_day { day_theme } else { night_theme })
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    let action = match selected_theme.as_deref() {
        None => {
            debug!("No theme given. Nothing to do.");
            ThemeAction::NoThemeGiven
        }
        Some(theme) if controller.current().as_deref() == Some(theme) => {
            debug!("Current theme is already \"{}\". Nothing to do.", theme);
            ThemeAction::AlreadyActive
        }
        Some(theme) => {
            info!("Switching theme to: \"{}\"", theme);
            match controller.apply(theme) {
                Ok(()) => ThemeAction::Switched,
                Err(e) => {
                    warn!("{}", e);
                    ThemeAction::SwitchFailed(e.to_string())
                }
            }
        }
    };

    Ok(Decision { sun, is_day, selected_theme, action })
}

// ===================== TESTS =====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::{LocationProvider, WhereAmI};
    use chrono::{NaiveDate, NaiveTime};
    use std::cell::{Cell, RefCell};
    use std::path::PathBuf;

    #[derive(Default)]
    struct Recorder {
        active: Option<String>,
        fail: bool,
        queries: Cell<usize>,
        applied: RefCell<Vec<String>>,
    }

    impl Recorder {
        fn with_active(theme: &str) -> Self {
            Self { active: Some(theme.to_string()), ..Default::default() }
        }
    }

    impl ThemeController for Recorder {
        fn current(&self) -> Option<String> {
            self.queries.set(self.queries.get() + 1);
            self.active.clone()
        }

        fn apply(&self, theme: &str) -> Result<()> {
            self.applied.borrow_mut().push(theme.to_string());
            if self.fail {
                Err(Error::ThemeSwitch { theme: theme.to_string(), reason: "exit status: 1".into() })
            } else {
                Ok(())
            }
        }
    }

    const AMSTERDAM: Coordinates = Coordinates { latitude: 52.3676, longitude: 4.9041 };

    fn summer(h: u32, m: u32) -> LocalMoment {
        LocalMoment::new(
            NaiveDate::from_ymd_opt(2024, 6, 21).unwrap(),
            NaiveTime::from_hms_opt(h, m, 0).unwrap(),
            2.0,
        )
    }

    #[test]
    fn test_day_selects_day_theme_and_skips_active() {
        let ctl = Recorder::with_active("light");
        let d = decide(AMSTERDAM, summer(12, 0), Some("light"), Some("dark"), &ctl).unwrap();

        assert!(d.is_day);
        assert_eq!(d.selected_theme.as_deref(), Some("light"));
        assert_eq!(d.action, ThemeAction::AlreadyActive);
        assert!(ctl.applied.borrow().is_empty());
    }

    #[test]
    fn test_switches_when_other_theme_active() {
        let ctl = Recorder::with_active("dark");
        let d = decide(AMSTERDAM, summer(12, 0), Some("light"), Some("dark"), &ctl).unwrap();

        assert_eq!(d.action, ThemeAction::Switched);
        assert_eq!(*ctl.applied.borrow(), vec!["light".to_string()]);
    }

    #[test]
    fn test_night_selects_night_theme() {
        let ctl = Recorder::default();
        let d = decide(AMSTERDAM, summer(23, 30), Some("light"), Some("dark"), &ctl).unwrap();

        assert!(!d.is_day);
        assert_eq!(d.selected_theme.as_deref(), Some("dark"));
        assert_eq!(d.action, ThemeAction::Switched);
        assert_eq!(*ctl.applied.borrow(), vec!["dark".to_string()]);
    }

    #[test]
    fn test_missing_or_empty_theme_is_noop() {
        let ctl = Recorder::with_active("dark");

        let d = decide(AMSTERDAM, summer(12, 0), None, Some("dark"), &ctl).unwrap();
        assert_eq!(d.action, ThemeAction::NoThemeGiven);
        assert_eq!(d.selected_theme, None);

        let d = decide(AMSTERDAM, summer(12, 0), Some(""), Some("dark"), &ctl).unwrap();
        assert_eq!(d.action, ThemeAction::NoThemeGiven);

        assert_eq!(ctl.queries.get(), 0);
        assert!(ctl.applied.borrow().is_empty());
    }

    #[test]
    fn test_switch_failure_does_not_fail_decision() {
        let ctl = Recorder { fail: true, ..Default::default() };
        let d = decide(AMSTERDAM, summer(12, 0), Some("light"), Some("dark"), &ctl).unwrap();

        match d.action {
            ThemeAction::SwitchFailed(msg) => assert!(msg.contains("light"), "{}", msg),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_polar_day_and_night_pick_fixed_theme() {
        let tromso = Coordinates::new(69.6492, 18.9553);

        // Midnight sun: day theme even at midnight
        let ctl = Recorder::default();
        let d = decide(tromso, summer(0, 30), Some("light"), Some("dark"), &ctl).unwrap();
        assert!(matches!(d.sun, SunState::Polar { condition: PolarCondition::PolarDay, .. }));
        assert!(d.is_day);
        assert_eq!(d.selected_theme.as_deref(), Some("light"));

        let winter_noon = LocalMoment::new(
            NaiveDate::from_ymd_opt(2024, 12, 21).unwrap(),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            1.0,
        );
        let d = decide(tromso, winter_noon, Some("light"), Some("dark"), &ctl).unwrap();
        assert!(matches!(d.sun, SunState::Polar { condition: PolarCondition::PolarNight, .. }));
        assert!(!d.is_day);
        assert_eq!(d.selected_theme.as_deref(), Some("dark"));
    }

    #[test]
    fn test_amsterdam_from_cache_file() {
        let dir = std::env::temp_dir().join(format!("daynight-theme-decider-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let cache = dir.join("location");
        std::fs::write(&cache, "Latitude: 52.3676°\nLongitude: 4.9041°\n").unwrap();

        let provider = WhereAmI {
            executable: PathBuf::from("/nonexistent/where-am-i"),
            cache_file: cache,
            timeout_secs: 5,
            force_detect: false,
        };
        let coords = provider.detect();

        let ctl = Recorder::with_active("light");
        let d = decide(coords, summer(12, 0), Some("light"), Some("dark"), &ctl).unwrap();
        assert!(d.is_day);
        assert_eq!(d.action, ThemeAction::AlreadyActive);

        let SunState::Regular(res) = d.sun else { panic!("expected regular day") };
        assert!(res.sunrise.0 < 6.0 / 24.0, "sunrise {}", res.sunrise);
        assert!(res.sunset.0 > 21.0 / 24.0, "sunset {}", res.sunset);
    }
}
