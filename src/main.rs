use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, FixedOffset, Utc};
use chrono_english::{Dialect, parse_date_string};
use clap::Parser;
use log::debug;

mod cli;
mod decider;
mod error;
mod location;
mod output;
mod solar;
mod theme;
mod time;

use cli::Args;
use location::{FixedLocation, LocationProvider, WhereAmI};
use theme::{DryRun, KdeThemeController, ThemeController};
use time::{Zone, local_moment, parse_time};

// ===================== MAIN =====================

fn main() -> Result<()> {
    let args = Args::parse();

    // -v raises the default level; RUST_LOG still wins
    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    let provider: Box<dyn LocationProvider> = match args.coordinates() {
        Some(coords) => Box::new(FixedLocation(coords)),
        None => Box::new(WhereAmI {
            executable: args.where_am_i.clone(),
            cache_file: args.location_cache_file.clone(),
            timeout_secs: args.timeout,
            force_detect: args.location_redetect,
        }),
    };
    let coords = provider.detect();
    debug!("location: {}", coords);

    let zone = Zone::resolve(&args.timezone, coords).context("invalid --timezone")?;
    let at = evaluation_time(&args, zone)?;
    let moment = local_moment(&at);

    let kde = KdeThemeController::for_current_user();
    let controller: Box<dyn ThemeController> =
        if args.dry_run { Box::new(DryRun(kde)) } else { Box::new(kde) };

    let decision = decider::decide(
        coords,
        moment,
        args.day_theme.as_deref(),
        args.night_theme.as_deref(),
        &controller,
    )?;

    if args.verbose {
        output::print_report(&coords, &at, &decision);
    }

    Ok(())
}

/// The local instant to evaluate: now, unless `--date` or `--at` move it.
fn evaluation_time(args: &Args, zone: Zone) -> Result<DateTime<FixedOffset>> {
    let now = zone.localize(Utc::now());
    if args.date.is_none() && args.at.is_none() {
        return Ok(now);
    }

    let date = match &args.date {
        Some(s) => parse_date_string(s, now, Dialect::Us)
            .map_err(|e| anyhow!("invalid --date '{}': {}", s, e))?
            .date_naive(),
        None => now.date_naive(),
    };
    let time = match args.at.as_deref() {
        None | Some("now") => now.time(),
        Some(s) => parse_time(s).context("invalid --at")?,
    };

    Ok(zone.from_local(date.and_time(time))?)
}
