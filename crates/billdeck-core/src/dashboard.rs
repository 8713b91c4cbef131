// ── Dashboard aggregation ──

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::{Booking, BookingStatus, Report, Site};

/// Bookings ending within this many days count as expiring.
pub const EXPIRY_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AeStats {
    pub bookings: usize,
    /// Monthly revenue from the AE's active bookings.
    pub revenue: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BookingSummary {
    pub total: usize,
    pub by_status: BTreeMap<BookingStatus, usize>,
    /// Sum of monthly rates over active bookings.
    pub active_revenue: f64,
    pub by_account_executive: BTreeMap<String, AeStats>,
    /// Active bookings ending within the expiry window, soonest first.
    pub expiring: Vec<Booking>,
}

impl BookingSummary {
    pub fn from_bookings(bookings: &[Booking], today: NaiveDate) -> Self {
        let mut summary = Self {
            total: bookings.len(),
            ..Self::default()
        };

        for booking in bookings {
            *summary.by_status.entry(booking.status).or_default() += 1;
            let active = booking.status.is_active();
            if active {
                summary.active_revenue += booking.monthly_rate;
            }

            for ae in booking.account_executives.iter().map(|ae| ae.trim()).filter(|ae| !ae.is_empty()) {
                let stats = summary.by_account_executive.entry(ae.to_owned()).or_default();
                stats.bookings += 1;
                if active {
                    stats.revenue += booking.monthly_rate;
                }
            }

            let days_left = booking.days_until_end(today);
            if active && (0..=EXPIRY_WINDOW_DAYS).contains(&days_left) {
                summary.expiring.push(booking.clone());
            }
        }

        summary
            .expiring
            .sort_by(|a, b| a.end_date.cmp(&b.end_date).then_with(|| a.id.cmp(&b.id)));
        summary
    }

    pub fn count(&self, status: BookingStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Occupancy {
    pub occupied: usize,
    pub total: usize,
}

impl Occupancy {
    /// Occupied share in percent. Zero for an empty inventory.
    pub fn rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        // Counts stay far below 2^32.
        let occupied = u32::try_from(self.occupied).unwrap_or(u32::MAX);
        let total = u32::try_from(self.total).unwrap_or(u32::MAX);
        f64::from(occupied) / f64::from(total) * 100.0
    }
}

/// Sites with an active booking covering `today`, against all sites.
pub fn occupancy(sites: &[Site], bookings: &[Booking], today: NaiveDate) -> Occupancy {
    let booked: HashSet<&str> = bookings
        .iter()
        .filter(|b| b.status.is_active() && b.covers(today))
        .map(|b| b.site_code.as_str())
        .collect();

    Occupancy {
        occupied: sites.iter().filter(|s| booked.contains(s.code.as_str())).count(),
        total: sites.len(),
    }
}

/// Weekly activity counts per AE.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub weeks: BTreeMap<NaiveDate, BTreeMap<String, usize>>,
}

impl ReportSummary {
    pub fn by_week(reports: &[Report]) -> Self {
        let mut weeks: BTreeMap<NaiveDate, BTreeMap<String, usize>> = BTreeMap::new();
        for report in reports {
            *weeks
                .entry(report.week_start)
                .or_default()
                .entry(report.account_executive.clone())
                .or_default() += 1;
        }
        Self { weeks }
    }

    pub fn total(&self) -> usize {
        self.weeks.values().flat_map(BTreeMap::values).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn booking(id: &str, site: &str, status: BookingStatus, end: NaiveDate, aes: &[&str]) -> Booking {
        Booking {
            id: id.into(),
            site_code: site.into(),
            client: "Globe".into(),
            account_executives: aes.iter().map(|s| (*s).to_string()).collect(),
            start_date: date(2026, 1, 1),
            end_date: end,
            monthly_rate: 100_000.0,
            status,
            remarks: None,
        }
    }

    fn today() -> NaiveDate {
        date(2026, 10, 14)
    }

    fn sample() -> Vec<Booking> {
        vec![
            booking("1", "A", BookingStatus::Ongoing, date(2026, 11, 1), &["jdoe"]),
            booking("2", "B", BookingStatus::New, date(2027, 6, 30), &["jdoe", "asmith"]),
            booking("3", "C", BookingStatus::Cancelled, date(2026, 10, 20), &["asmith"]),
            booking("4", "A", BookingStatus::Renewal, date(2026, 10, 14), &["asmith"]),
            booking("5", "D", BookingStatus::Ended, date(2026, 9, 30), &["jdoe"]),
        ]
    }

    #[test]
    fn summary_counts_and_revenue() {
        let summary = BookingSummary::from_bookings(&sample(), today());

        assert_eq!(summary.total, 5);
        assert_eq!(summary.count(BookingStatus::Ongoing), 1);
        assert_eq!(summary.count(BookingStatus::Queueing), 0);
        assert_eq!(summary.active_revenue, 300_000.0);

        let jdoe = &summary.by_account_executive["jdoe"];
        assert_eq!(jdoe.bookings, 3);
        assert_eq!(jdoe.revenue, 200_000.0);
        let asmith = &summary.by_account_executive["asmith"];
        assert_eq!(asmith.bookings, 3);
        assert_eq!(asmith.revenue, 200_000.0);
    }

    #[test]
    fn expiring_skips_inactive_and_sorts_by_end() {
        let summary = BookingSummary::from_bookings(&sample(), today());
        let ids: Vec<&str> = summary.expiring.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["4", "1"]);
    }

    #[test]
    fn occupancy_counts_sites_once() {
        let site = |code: &str| Site {
            code: code.into(),
            name: None,
            area: None,
            landmarks: Vec::new(),
            latitude: None,
            longitude: None,
            price: 0.0,
            facing: None,
            size: None,
            owner: None,
            available_from: None,
            image_url: None,
        };
        let sites = vec![site("A"), site("B"), site("C"), site("D")];
        let occ = occupancy(&sites, &sample(), today());
        assert_eq!(occ, Occupancy { occupied: 2, total: 4 });
        assert_eq!(occ.rate(), 50.0);
        assert_eq!(Occupancy::default().rate(), 0.0);
    }

    #[test]
    fn reports_group_by_week_and_ae() {
        let report = |id: &str, ae: &str, week: NaiveDate| Report {
            id: id.into(),
            account_executive: ae.into(),
            week_start: week,
            client: None,
            activity: "call".into(),
            remarks: None,
            created_at: None,
        };
        let reports = vec![
            report("1", "jdoe", date(2026, 10, 5)),
            report("2", "jdoe", date(2026, 10, 12)),
            report("3", "jdoe", date(2026, 10, 12)),
            report("4", "asmith", date(2026, 10, 12)),
        ];
        let summary = ReportSummary::by_week(&reports);
        assert_eq!(summary.total(), 4);
        assert_eq!(summary.weeks[&date(2026, 10, 12)]["jdoe"], 2);
        assert_eq!(summary.weeks.len(), 2);
    }
}
