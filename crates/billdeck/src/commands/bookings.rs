//! Booking command handlers.

use tabled::Tabled;

use billdeck_core::dashboard::EXPIRY_WINDOW_DAYS;
use billdeck_core::pricing::format_amount;
use billdeck_core::{Booking, BookingDraft, BookingStatus, BookingSummary, DataSource, Workspace};

use crate::cli::{BookingFields, BookingsArgs, BookingsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct BookingRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Site")]
    site: String,
    #[tabled(rename = "Client")]
    client: String,
    #[tabled(rename = "AEs")]
    aes: String,
    #[tabled(rename = "Start")]
    start: String,
    #[tabled(rename = "End")]
    end: String,
    #[tabled(rename = "Monthly")]
    rate: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn booking_row(b: &Booking, color: bool) -> BookingRow {
    BookingRow {
        id: b.id.clone(),
        site: b.site_code.clone(),
        client: b.client.clone(),
        aes: b.account_executives.join(", "),
        start: b.start_date.to_string(),
        end: b.end_date.to_string(),
        rate: format_amount(b.monthly_rate),
        status: output::status_label(b.status, color),
    }
}

fn detail(b: &Booking) -> String {
    [
        format!("ID:       {}", b.id),
        format!("Site:     {}", b.site_code),
        format!("Client:   {}", b.client),
        format!("AEs:      {}", b.account_executives.join(", ")),
        format!("Period:   {} .. {}", b.start_date, b.end_date),
        format!("Monthly:  {}", format_amount(b.monthly_rate)),
        format!("Status:   {}", b.status),
        format!("Remarks:  {}", util::or_dash(b.remarks.as_deref())),
    ]
    .join("\n")
}

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Bookings")]
    count: usize,
}

#[derive(Tabled)]
struct AeRow {
    #[tabled(rename = "AE")]
    ae: String,
    #[tabled(rename = "Bookings")]
    bookings: usize,
    #[tabled(rename = "Active revenue")]
    revenue: String,
}

pub(super) fn summary_detail(s: &BookingSummary, currency: &str) -> String {
    let statuses: Vec<StatusRow> = s
        .by_status
        .iter()
        .map(|(status, count)| StatusRow {
            status: status.to_string(),
            count: *count,
        })
        .collect();
    let aes: Vec<AeRow> = s
        .by_account_executive
        .iter()
        .map(|(ae, stats)| AeRow {
            ae: ae.clone(),
            bookings: stats.bookings,
            revenue: format_amount(stats.revenue),
        })
        .collect();

    let mut out = vec![
        format!("Bookings:        {}", s.total),
        format!("Active revenue:  {currency} {}/month", format_amount(s.active_revenue)),
        String::new(),
        output::render_table(&statuses),
    ];
    if !aes.is_empty() {
        out.push(output::render_table(&aes));
    }
    if !s.expiring.is_empty() {
        out.push(format!("Expiring within {EXPIRY_WINDOW_DAYS} days:"));
        let rows: Vec<BookingRow> = s.expiring.iter().map(|b| booking_row(b, false)).collect();
        out.push(output::render_table(&rows));
    }
    out.join("\n")
}

/// One-line note when a list came from the offline copy.
pub(super) fn source_notice(source: DataSource, quiet: bool) {
    if let DataSource::Cache { fetched_at } = source {
        output::notice(
            &format!(
                "⚠ CRM unreachable, showing offline copy from {}",
                fetched_at.format("%Y-%m-%d %H:%M UTC")
            ),
            quiet,
        );
    }
}

// ── Drafts ──────────────────────────────────────────────────────────

fn new_draft(fields: BookingFields) -> Result<BookingDraft, CliError> {
    let missing = |field: &str| CliError::validation(field, format!("--{field} is required"));
    Ok(BookingDraft {
        site_code: fields.site.ok_or_else(|| missing("site"))?,
        client: fields.client.ok_or_else(|| missing("client"))?,
        account_executives: fields.account_executives,
        start_date: util::parse_date("start", fields.start.as_deref().ok_or_else(|| missing("start"))?)?,
        end_date: util::parse_date("end", fields.end.as_deref().ok_or_else(|| missing("end"))?)?,
        monthly_rate: fields.rate.ok_or_else(|| missing("rate"))?,
        status: fields
            .status
            .as_deref()
            .map_or(Ok(BookingStatus::New), util::parse_status)?,
        remarks: fields.remarks,
    })
}

/// Overlay the given flags on an existing booking.
fn updated_draft(current: &Booking, fields: BookingFields) -> Result<BookingDraft, CliError> {
    Ok(BookingDraft {
        site_code: fields.site.unwrap_or_else(|| current.site_code.clone()),
        client: fields.client.unwrap_or_else(|| current.client.clone()),
        account_executives: if fields.account_executives.is_empty() {
            current.account_executives.clone()
        } else {
            fields.account_executives
        },
        start_date: util::parse_optional_date("start", fields.start.as_deref())?
            .unwrap_or(current.start_date),
        end_date: util::parse_optional_date("end", fields.end.as_deref())?.unwrap_or(current.end_date),
        monthly_rate: fields.rate.unwrap_or(current.monthly_rate),
        status: match fields.status.as_deref() {
            Some(s) => util::parse_status(s)?,
            None => current.status,
        },
        remarks: fields.remarks.or_else(|| current.remarks.clone()),
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ws: &Workspace, args: BookingsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    match args.command {
        BookingsCommand::List {
            status,
            account_executive,
            site,
            expiring,
        } => {
            let status = status.as_deref().map(util::parse_status).transpose()?;
            let list = ws.bookings().await?;
            source_notice(list.source, global.quiet);

            let today = util::today();
            let shown: Vec<Booking> = if expiring {
                BookingSummary::from_bookings(&list.bookings, today).expiring
            } else {
                list.bookings
            }
            .into_iter()
            .filter(|b| status.is_none_or(|s| b.status == s))
            .filter(|b| {
                account_executive.as_deref().is_none_or(|ae| {
                    b.account_executives.iter().any(|x| x.eq_ignore_ascii_case(ae))
                })
            })
            .filter(|b| site.as_deref().is_none_or(|code| b.site_code.eq_ignore_ascii_case(code)))
            .collect();

            let out = output::render_list(
                &global.output,
                &shown,
                |b| booking_row(b, color),
                |b| b.id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        BookingsCommand::Create(fields) => {
            let booking = ws.create_booking(&new_draft(fields)?).await?;
            let out = output::render_single(&global.output, &booking, detail, |b| b.id.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        BookingsCommand::Update { id, fields } => {
            let list = ws.bookings().await?;
            let current = list.bookings.iter().find(|b| b.id == id).ok_or_else(|| {
                CliError::NotFound {
                    resource_type: "Booking".into(),
                    identifier: id.clone(),
                    list_command: "bookings list".into(),
                }
            })?;
            let draft = updated_draft(current, fields)?;
            let booking = ws.update_booking(&id, &draft).await?;
            let out = output::render_single(&global.output, &booking, detail, |b| b.id.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        BookingsCommand::Cancel { id, reason } => {
            if !util::confirm(&format!("Cancel booking {id}?"), global.yes)? {
                return Ok(());
            }
            ws.cancel_booking(&id, reason.as_deref()).await?;
            output::notice(&format!("✓ Booking {id} cancelled"), global.quiet);
            Ok(())
        }

        BookingsCommand::Summary => {
            let list = ws.bookings().await?;
            source_notice(list.source, global.quiet);
            let summary = BookingSummary::from_bookings(&list.bookings, util::today());
            let currency = ws.config().currency.clone();
            let out = output::render_single(
                &global.output,
                &summary,
                |s| summary_detail(s, &currency),
                |s| s.total.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn fields() -> BookingFields {
        BookingFields {
            site: None,
            client: None,
            account_executives: Vec::new(),
            start: None,
            end: None,
            rate: None,
            status: None,
            remarks: None,
        }
    }

    fn booking() -> Booking {
        Booking {
            id: "7".into(),
            site_code: "EDSA-001".into(),
            client: "Globe".into(),
            account_executives: vec!["jdoe".into()],
            start_date: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2027, 3, 31).unwrap(),
            monthly_rate: 200_000.0,
            status: BookingStatus::Ongoing,
            remarks: Some("prime slot".into()),
        }
    }

    #[test]
    fn create_requires_core_fields() {
        match new_draft(fields()) {
            Err(CliError::Validation { field, .. }) => assert_eq!(field, "site"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn create_defaults_status_to_new() {
        let draft = new_draft(BookingFields {
            site: Some("EDSA-001".into()),
            client: Some("Globe".into()),
            start: Some("2026-11-01".into()),
            end: Some("2027-04-30".into()),
            rate: Some(150_000.0),
            ..fields()
        })
        .unwrap();
        assert_eq!(draft.status, BookingStatus::New);
        assert_eq!(draft.monthly_rate, 150_000.0);
    }

    #[test]
    fn update_keeps_unspecified_fields() {
        let draft = updated_draft(
            &booking(),
            BookingFields {
                end: Some("2027-06-30".into()),
                status: Some("renewal".into()),
                ..fields()
            },
        )
        .unwrap();

        assert_eq!(draft.site_code, "EDSA-001");
        assert_eq!(draft.account_executives, vec!["jdoe".to_string()]);
        assert_eq!(draft.end_date, NaiveDate::from_ymd_opt(2027, 6, 30).unwrap());
        assert_eq!(draft.status, BookingStatus::Renewal);
        assert_eq!(draft.remarks.as_deref(), Some("prime slot"));
    }
}
