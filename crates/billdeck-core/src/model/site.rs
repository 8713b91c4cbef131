// ── Site domain type ──

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A billboard site from the inventory. Read-only reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    /// Unique site code (e.g., "EDSA-001"). Primary key everywhere.
    pub code: String,
    pub name: Option<String>,
    /// City or district the site sits in.
    pub area: Option<String>,
    /// Nearby landmarks used for filtering and deck copy.
    pub landmarks: Vec<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Monthly SRP in the company's base currency.
    pub price: f64,
    pub facing: Option<String>,
    pub size: Option<String>,
    pub owner: Option<String>,
    /// Date the site frees up. `None` means available now.
    pub available_from: Option<NaiveDate>,
    pub image_url: Option<String>,
}

impl Site {
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}
