// ── Booking domain types ──

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::CoreError;

/// Contract lifecycle state as tracked by sales.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[non_exhaustive]
pub enum BookingStatus {
    New,
    Renewal,
    Queueing,
    Ongoing,
    Ended,
    Cancelled,
    Unknown,
}

impl BookingStatus {
    /// Statuses that count toward revenue and occupancy.
    pub fn is_active(self) -> bool {
        matches!(self, Self::New | Self::Renewal | Self::Ongoing)
    }
}

/// The canonical Booking type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub site_code: String,
    pub client: String,
    pub account_executives: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub monthly_rate: f64,
    pub status: BookingStatus,
    pub remarks: Option<String>,
}

impl Booking {
    /// Whether `date` falls inside the contract period (inclusive).
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Days remaining until the contract ends, negative once it has.
    pub fn days_until_end(&self, today: NaiveDate) -> i64 {
        (self.end_date - today).num_days()
    }
}

/// Payload for creating or editing a booking.
#[derive(Debug, Clone)]
pub struct BookingDraft {
    pub site_code: String,
    pub client: String,
    pub account_executives: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub monthly_rate: f64,
    pub status: BookingStatus,
    pub remarks: Option<String>,
}

impl BookingDraft {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.site_code.trim().is_empty() {
            return Err(CoreError::validation("site code is required"));
        }
        if self.client.trim().is_empty() {
            return Err(CoreError::validation("client is required"));
        }
        if self.account_executives.iter().all(|ae| ae.trim().is_empty()) {
            return Err(CoreError::validation(
                "at least one account executive is required",
            ));
        }
        if self.end_date <= self.start_date {
            return Err(CoreError::validation(format!(
                "end date {} must be after start date {}",
                self.end_date, self.start_date
            )));
        }
        if !self.monthly_rate.is_finite() || self.monthly_rate < 0.0 {
            return Err(CoreError::validation(
                "monthly rate must be a non-negative number",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn draft() -> BookingDraft {
        BookingDraft {
            site_code: "EDSA-001".into(),
            client: "Globe".into(),
            account_executives: vec!["jdoe".into()],
            start_date: NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2027, 1, 31).unwrap(),
            monthly_rate: 120_000.0,
            status: BookingStatus::New,
            remarks: None,
        }
    }

    #[test]
    fn valid_draft_passes() {
        assert!(draft().validate().is_ok());
    }

    #[test]
    fn same_day_range_is_rejected() {
        let mut d = draft();
        d.end_date = d.start_date;
        assert!(matches!(
            d.validate(),
            Err(CoreError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn negative_rate_is_rejected() {
        let mut d = draft();
        d.monthly_rate = -1.0;
        assert!(d.validate().is_err());
    }

    #[test]
    fn blank_account_executives_are_rejected() {
        let mut d = draft();
        d.account_executives = vec!["  ".into()];
        assert!(d.validate().is_err());
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("renewal".parse::<BookingStatus>().unwrap(), BookingStatus::Renewal);
        assert_eq!(BookingStatus::Queueing.to_string(), "QUEUEING");
        assert!(BookingStatus::Ongoing.is_active());
        assert!(!BookingStatus::Queueing.is_active());
    }
}
