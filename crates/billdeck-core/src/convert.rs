// ── API-to-domain type conversions ──
//
// Bridges raw `billdeck_api::types` into canonical `billdeck_core::model`
// types, and drafts back into request bodies. Missing prices become zero
// and unrecognised booking statuses become `Unknown`.

use billdeck_api::types::{
    BookingRequest, BookingResponse, ClientRequest, ClientResponse, CompanyResponse,
    MediumResponse, ReportRequest, ReportResponse, SettingResponse, SiteResponse, UserResponse,
};
use tracing::trace;

use crate::model::{
    Booking, BookingDraft, BookingStatus, Client, ClientDraft, Company, Medium, Report,
    ReportDraft, Setting, Site, User,
};

// ── Helpers ────────────────────────────────────────────────────────

/// Trim and drop empty strings.
fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
}

fn parse_status(raw: &str) -> BookingStatus {
    raw.trim().replace([' ', '-'], "_").parse().unwrap_or_else(|_| {
        trace!(status = raw, "unrecognised booking status");
        BookingStatus::Unknown
    })
}

// ── Responses → model ──────────────────────────────────────────────

impl From<SiteResponse> for Site {
    fn from(s: SiteResponse) -> Self {
        Self {
            code: s.site_code.trim().to_owned(),
            name: non_empty(s.name),
            area: non_empty(s.area),
            landmarks: s
                .landmarks
                .into_iter()
                .map(|l| l.trim().to_owned())
                .filter(|l| !l.is_empty())
                .collect(),
            latitude: s.latitude,
            longitude: s.longitude,
            price: s.price.unwrap_or(0.0),
            facing: non_empty(s.facing),
            size: non_empty(s.size),
            owner: non_empty(s.owner),
            available_from: s.available_from,
            image_url: non_empty(s.image_url),
        }
    }
}

impl From<BookingResponse> for Booking {
    fn from(b: BookingResponse) -> Self {
        Self {
            status: parse_status(&b.status),
            id: b.id,
            site_code: b.site_code,
            client: b.client,
            account_executives: b.account_executives,
            start_date: b.start_date,
            end_date: b.end_date,
            monthly_rate: b.monthly_rate.unwrap_or(0.0),
            remarks: non_empty(b.remarks),
        }
    }
}

impl From<ClientResponse> for Client {
    fn from(c: ClientResponse) -> Self {
        Self {
            id: c.id,
            name: c.name,
            company: non_empty(c.company),
            industry: non_empty(c.industry),
            contact_person: non_empty(c.contact_person),
            email: non_empty(c.email),
            phone: non_empty(c.phone),
            account_executive: non_empty(c.account_executive),
            status: non_empty(c.status),
        }
    }
}

impl From<UserResponse> for User {
    fn from(u: UserResponse) -> Self {
        Self {
            id: u.id,
            username: u.username,
            full_name: non_empty(u.full_name),
            email: non_empty(u.email),
            role_id: u.role_id,
        }
    }
}

impl From<CompanyResponse> for Company {
    fn from(c: CompanyResponse) -> Self {
        Self {
            id: c.id,
            name: c.name,
            code: non_empty(c.code),
        }
    }
}

impl From<MediumResponse> for Medium {
    fn from(m: MediumResponse) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: non_empty(m.description),
        }
    }
}

impl From<SettingResponse> for Setting {
    fn from(s: SettingResponse) -> Self {
        Self {
            key: s.key,
            value: s.value,
        }
    }
}

impl From<ReportResponse> for Report {
    fn from(r: ReportResponse) -> Self {
        Self {
            id: r.id,
            account_executive: r.account_executive,
            week_start: r.week_start,
            client: non_empty(r.client),
            activity: r.activity,
            remarks: non_empty(r.remarks),
            created_at: r.created_at,
        }
    }
}

// ── Drafts → requests ──────────────────────────────────────────────

impl From<&BookingDraft> for BookingRequest {
    fn from(d: &BookingDraft) -> Self {
        Self {
            site_code: d.site_code.trim().to_owned(),
            client: d.client.trim().to_owned(),
            account_executives: d
                .account_executives
                .iter()
                .map(|ae| ae.trim().to_owned())
                .filter(|ae| !ae.is_empty())
                .collect(),
            start_date: d.start_date,
            end_date: d.end_date,
            monthly_rate: d.monthly_rate,
            status: d.status.to_string(),
            remarks: non_empty(d.remarks.clone()),
        }
    }
}

impl From<&ClientDraft> for ClientRequest {
    fn from(d: &ClientDraft) -> Self {
        Self {
            name: d.name.trim().to_owned(),
            company: non_empty(d.company.clone()),
            industry: non_empty(d.industry.clone()),
            contact_person: non_empty(d.contact_person.clone()),
            email: non_empty(d.email.clone()),
            phone: non_empty(d.phone.clone()),
            account_executive: non_empty(d.account_executive.clone()),
            status: non_empty(d.status.clone()),
        }
    }
}

impl From<&ReportDraft> for ReportRequest {
    fn from(d: &ReportDraft) -> Self {
        Self {
            account_executive: d.account_executive.trim().to_owned(),
            week_start: d.week_start,
            client: non_empty(d.client.clone()),
            activity: d.activity.trim().to_owned(),
            remarks: non_empty(d.remarks.clone()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn site_defaults_missing_price_to_zero() {
        let raw: SiteResponse = serde_json::from_value(json!({
            "site_code": " EDSA-001 ",
            "name": "",
            "landmarks": ["Ayala", "  "]
        }))
        .unwrap();
        let site = Site::from(raw);
        assert_eq!(site.code, "EDSA-001");
        assert_eq!(site.price, 0.0);
        assert!(site.name.is_none());
        assert_eq!(site.landmarks, vec!["Ayala"]);
    }

    #[test]
    fn booking_status_is_lenient() {
        assert_eq!(parse_status("ongoing"), BookingStatus::Ongoing);
        assert_eq!(parse_status(" Renewal "), BookingStatus::Renewal);
        assert_eq!(parse_status("on hold"), BookingStatus::Unknown);
    }
}
