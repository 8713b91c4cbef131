// ── Weekly activity report types ──

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// One AE activity entry for a given week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub account_executive: String,
    /// Monday of the reported week.
    pub week_start: NaiveDate,
    pub client: Option<String>,
    pub activity: String,
    pub remarks: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - chrono::Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

#[derive(Debug, Clone)]
pub struct ReportDraft {
    pub account_executive: String,
    pub week_start: NaiveDate,
    pub client: Option<String>,
    pub activity: String,
    pub remarks: Option<String>,
}

impl ReportDraft {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.account_executive.trim().is_empty() {
            return Err(CoreError::validation("account executive is required"));
        }
        if self.week_start.weekday() != Weekday::Mon {
            return Err(CoreError::validation(format!(
                "week start {} is a {}, expected a Monday",
                self.week_start,
                self.week_start.weekday()
            )));
        }
        if self.activity.trim().is_empty() {
            return Err(CoreError::validation("activity cannot be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn week_start_snaps_to_monday() {
        let wed = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        assert_eq!(week_start(wed), NaiveDate::from_ymd_opt(2026, 10, 12).unwrap());
        let mon = NaiveDate::from_ymd_opt(2026, 10, 12).unwrap();
        assert_eq!(week_start(mon), mon);
    }

    #[test]
    fn draft_requires_monday() {
        let draft = ReportDraft {
            account_executive: "jdoe".into(),
            week_start: NaiveDate::from_ymd_opt(2026, 10, 14).unwrap(),
            client: None,
            activity: "Site visit".into(),
            remarks: None,
        };
        assert!(draft.validate().is_err());
    }
}
