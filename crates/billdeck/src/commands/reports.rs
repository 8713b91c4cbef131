//! Weekly activity report command handlers.

use tabled::Tabled;

use billdeck_core::model::week_start;
use billdeck_core::{Report, ReportDraft, ReportSummary, Workspace};

use crate::cli::{GlobalOpts, ReportsArgs, ReportsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Week")]
    week: String,
    #[tabled(rename = "AE")]
    ae: String,
    #[tabled(rename = "Client")]
    client: String,
    #[tabled(rename = "Activity")]
    activity: String,
}

impl From<&Report> for ReportRow {
    fn from(r: &Report) -> Self {
        Self {
            id: r.id.clone(),
            week: r.week_start.to_string(),
            ae: r.account_executive.clone(),
            client: util::or_dash(r.client.as_deref()),
            activity: r.activity.clone(),
        }
    }
}

#[derive(Tabled)]
struct TallyRow {
    #[tabled(rename = "Week")]
    week: String,
    #[tabled(rename = "AE")]
    ae: String,
    #[tabled(rename = "Reports")]
    count: usize,
}

fn summary_detail(s: &ReportSummary) -> String {
    let rows: Vec<TallyRow> = s
        .weeks
        .iter()
        .flat_map(|(week, by_ae)| {
            by_ae.iter().map(move |(ae, count)| TallyRow {
                week: week.to_string(),
                ae: ae.clone(),
                count: *count,
            })
        })
        .collect();
    format!("{}\nTotal: {}", output::render_table(&rows), s.total())
}

pub async fn handle(ws: &Workspace, args: ReportsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ReportsCommand::List { week } => {
            let week = util::parse_optional_date("week", week.as_deref())?;
            let reports = ws.reports(week).await?;
            let out = output::render_list(&global.output, &reports, |r| ReportRow::from(r), |r| r.id.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ReportsCommand::Submit {
            account_executive,
            week,
            activity,
            client,
            remarks,
        } => {
            let date = util::parse_optional_date("week", week.as_deref())?.unwrap_or_else(util::today);
            let draft = ReportDraft {
                account_executive,
                week_start: week_start(date),
                client,
                activity,
                remarks,
            };
            let report = ws.submit_report(&draft).await?;
            output::notice(
                &format!("✓ Report {} filed for week of {}", report.id, report.week_start),
                global.quiet,
            );
            Ok(())
        }

        ReportsCommand::Summary { week } => {
            let week = util::parse_optional_date("week", week.as_deref())?;
            let summary = ReportSummary::by_week(&ws.reports(week).await?);
            let out = output::render_single(&global.output, &summary, summary_detail, |s| {
                s.total().to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
