// Wire types for the CRM REST backend.
//
// These mirror the JSON the backend sends. `billdeck-core` converts them
// into canonical domain types; nothing outside the two crates should
// depend on field spellings here.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Accept both numeric and string identifiers (the backend mixes them).
pub(crate) fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Str(String),
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Int(n) => n.to_string(),
        Raw::Str(s) => s,
    })
}

/// Prices arrive as numbers on newer endpoints and as strings on older ones.
pub(crate) fn lenient_f64<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<f64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Str(String),
    }
    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Num(n)) => Ok(Some(n)),
        Some(Raw::Str(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Str(s)) => s
            .replace(',', "")
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

// ── Auth ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "access_token")]
    pub token: String,
    #[serde(default)]
    pub user: Option<UserResponse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserResponse {
    #[serde(deserialize_with = "id")]
    pub id: String,
    pub username: String,
    #[serde(default, alias = "name")]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "role")]
    pub role_id: Option<i64>,
}

// ── Clients ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ClientResponse {
    #[serde(deserialize_with = "id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "contact_number")]
    pub phone: Option<String>,
    #[serde(default, alias = "ae")]
    pub account_executive: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_executive: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

// ── Sites ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct SiteResponse {
    #[serde(alias = "code", alias = "site")]
    pub site_code: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "city")]
    pub area: Option<String>,
    #[serde(default)]
    pub landmarks: Vec<String>,
    #[serde(default, alias = "lat")]
    pub latitude: Option<f64>,
    #[serde(default, alias = "lng", alias = "long")]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", alias = "srp")]
    pub price: Option<f64>,
    #[serde(default)]
    pub facing: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default, alias = "site_owner")]
    pub owner: Option<String>,
    #[serde(default, alias = "availability", alias = "available_date")]
    pub available_from: Option<NaiveDate>,
    #[serde(default, alias = "image")]
    pub image_url: Option<String>,
}

// ── Bookings ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct BookingResponse {
    #[serde(deserialize_with = "id")]
    pub id: String,
    #[serde(alias = "site")]
    pub site_code: String,
    pub client: String,
    #[serde(default, alias = "aes")]
    pub account_executives: Vec<String>,
    #[serde(alias = "date_from")]
    pub start_date: NaiveDate,
    #[serde(alias = "date_to")]
    pub end_date: NaiveDate,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub monthly_rate: Option<f64>,
    pub status: String,
    #[serde(default)]
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingRequest {
    pub site_code: String,
    pub client: String,
    pub account_executives: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub monthly_rate: f64,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CancelBookingRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'a str>,
}

// ── Reports ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ReportResponse {
    #[serde(deserialize_with = "id")]
    pub id: String,
    #[serde(alias = "ae", alias = "user")]
    pub account_executive: String,
    #[serde(alias = "week")]
    pub week_start: NaiveDate,
    #[serde(default)]
    pub client: Option<String>,
    pub activity: String,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportRequest {
    pub account_executive: String,
    pub week_start: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    pub activity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

// ── Reference data ───────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct CompanyResponse {
    #[serde(deserialize_with = "id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediumResponse {
    #[serde(deserialize_with = "id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SettingResponse {
    pub key: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn site_accepts_string_price_and_aliases() {
        let site: SiteResponse = serde_json::from_value(json!({
            "code": "EDSA-001",
            "city": "Makati",
            "lat": 14.55,
            "lng": 121.02,
            "srp": "150,000.50",
            "site_owner": "Acme Outdoor",
            "availability": "2026-11-01"
        }))
        .unwrap();

        assert_eq!(site.site_code, "EDSA-001");
        assert_eq!(site.area.as_deref(), Some("Makati"));
        assert_eq!(site.price, Some(150_000.50));
        assert_eq!(site.owner.as_deref(), Some("Acme Outdoor"));
        assert_eq!(
            site.available_from,
            NaiveDate::from_ymd_opt(2026, 11, 1)
        );
        assert!(site.landmarks.is_empty());
    }

    #[test]
    fn numeric_ids_become_strings() {
        let client: ClientResponse =
            serde_json::from_value(json!({ "id": 42, "name": "Globe" })).unwrap();
        assert_eq!(client.id, "42");
    }

    #[test]
    fn empty_price_string_is_none() {
        let site: SiteResponse =
            serde_json::from_value(json!({ "site_code": "X", "price": "" })).unwrap();
        assert_eq!(site.price, None);
    }
}
