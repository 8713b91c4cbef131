//! Shared helpers for command handlers.

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};

use billdeck_core::{BookingStatus, DateWindow, FilterState, PriceRange};

use crate::cli::SiteFilterArgs;
use crate::error::CliError;

/// Local calendar date, the reference point for availability and expiry.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Parse a `YYYY-MM-DD` flag value.
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| CliError::validation(field, format!("expected YYYY-MM-DD, got '{value}'")))
}

pub fn parse_optional_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>, CliError> {
    value.map(|v| parse_date(field, v)).transpose()
}

/// Parse a status flag; accepts any case and `-`/space separators.
pub fn parse_status(value: &str) -> Result<BookingStatus, CliError> {
    let normalized = value.trim().replace(['-', ' '], "_");
    normalized.parse().map_err(|_| {
        CliError::validation(
            "status",
            format!("'{value}' is not one of new, renewal, queueing, ongoing, ended, cancelled"),
        )
    })
}

/// Parse a flag through a domain `FromStr`, attributing failures to `field`.
pub fn parse_with<T>(field: &str, value: &str) -> Result<T, CliError>
where
    T: std::str::FromStr<Err = billdeck_core::CoreError>,
{
    value
        .parse()
        .map_err(|e: billdeck_core::CoreError| CliError::validation(field, e.to_string()))
}

fn value_set(values: &[String]) -> BTreeSet<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Compile the filter flags into a `FilterState`.
pub fn filter_state(args: &SiteFilterArgs) -> Result<FilterState, CliError> {
    let price = match args.price.as_deref() {
        Some(range) => parse_with::<PriceRange>("price", range)?,
        None => PriceRange::default(),
    };
    let availability = DateWindow {
        from: parse_optional_date("available-from", args.available_from.as_deref())?,
        until: parse_optional_date("available-until", args.available_until.as_deref())?,
    };
    if let (Some(from), Some(until)) = (availability.from, availability.until) {
        if from > until {
            return Err(CliError::validation(
                "available-until",
                format!("{until} is before {from}"),
            ));
        }
    }

    Ok(FilterState {
        areas: value_set(&args.areas),
        landmarks: value_set(&args.landmarks),
        owners: value_set(&args.owners),
        price,
        availability,
        search: args
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned),
    })
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

/// Stderr spinner, hidden under `--quiet` or when stderr isn't a terminal.
pub fn spinner(message: &str, quiet: bool) -> ProgressBar {
    if quiet || !std::io::IsTerminal::is_terminal(&std::io::stderr()) {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_owned());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// `-` for empty optional values in tables.
pub fn or_dash(value: Option<&str>) -> String {
    value.filter(|v| !v.is_empty()).unwrap_or("-").to_owned()
}
