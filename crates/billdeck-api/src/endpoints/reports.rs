use chrono::NaiveDate;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::types::{ReportRequest, ReportResponse};

impl ApiClient {
    /// Weekly activity reports, optionally narrowed to one week.
    ///
    /// `GET reports?week=YYYY-MM-DD`
    pub async fn list_reports(&self, week: Option<NaiveDate>) -> Result<Vec<ReportResponse>, Error> {
        match week {
            Some(week) => {
                self.get_with_params("reports", &[("week", week.format("%Y-%m-%d").to_string())])
                    .await
            }
            None => self.get("reports").await,
        }
    }

    /// `POST reports`
    pub async fn create_report(&self, body: &ReportRequest) -> Result<ReportResponse, Error> {
        debug!(ae = %body.account_executive, week = %body.week_start, "submitting report");
        self.post("reports", body).await
    }
}
