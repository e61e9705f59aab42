//! Output Formatting Module
//!
//! The verbose report: location, evaluated time, sun events and what
//! happened to the theme.

use chrono::{DateTime, FixedOffset};

use crate::decider::{Decision, SunState, ThemeAction};
use crate::error::PolarCondition;
use crate::solar::Coordinates;
use crate::time::format_day_length;

/// Render the report as lines of text.
pub fn render_report(coords: &Coordinates, at: &DateTime<FixedOffset>, decision: &Decision) -> String {
    let mut lines = vec![
        format!("Location    : {}", coords),
        format!("Current time: {}", at.format("%Y-%m-%d %H:%M:%S %:z")),
    ];

    match &decision.sun {
        SunState::Regular(res) => {
            lines.push(format!("Sunrise     : {}", res.sunrise));
            lines.push(format!("Solar noon  : {}", res.solar_noon));
            lines.push(format!("Sunset      : {}", res.sunset));
            lines.push(format!("Daylight    : {}", format_day_length(res.day_length())));
        }
        SunState::Polar { condition, solar_noon } => {
            lines.push(
                match condition {
                    PolarCondition::PolarDay => "Polar Day (Midnight Sun).",
                    PolarCondition::PolarNight => "Polar Night.",
                }
                .to_string(),
            );
            lines.push(format!("Solar noon  : {}", solar_noon));
        }
    }

    lines.push(format!("Daytime     : {}", if decision.is_day { "yes" } else { "no" }));

    let theme = decision.selected_theme.as_deref().unwrap_or_default();
    lines.push(match &decision.action {
        ThemeAction::NoThemeGiven => "No theme given. Nothing to do.".to_string(),
        ThemeAction::AlreadyActive => format!("Current theme is already \"{}\". Nothing to do.", theme),
        ThemeAction::Switched => format!("Switched theme to \"{}\".", theme),
        ThemeAction::SwitchFailed(reason) => format!("Theme switch failed: {}", reason),
    });

    lines.join("\n")
}

pub fn print_report(coords: &Coordinates, at: &DateTime<FixedOffset>, decision: &Decision) {
    println!("{}", render_report(coords, at, decision));
}

// ===================== TESTS =====================
