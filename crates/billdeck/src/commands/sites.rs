//! Site inventory command handlers.

use tabled::Tabled;

use billdeck_core::pricing::format_amount;
use billdeck_core::{FilterOptions, Site, Workspace};

use crate::cli::{GlobalOpts, SitesArgs, SitesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct SiteRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Area")]
    area: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Owner")]
    owner: String,
    #[tabled(rename = "Available")]
    available: String,
}

impl From<&Site> for SiteRow {
    fn from(s: &Site) -> Self {
        Self {
            code: s.code.clone(),
            name: util::or_dash(s.name.as_deref()),
            area: util::or_dash(s.area.as_deref()),
            price: format_amount(s.price),
            owner: util::or_dash(s.owner.as_deref()),
            available: s
                .available_from
                .map_or_else(|| "now".into(), |d| d.to_string()),
        }
    }
}

fn detail(s: &Site) -> String {
    let mut lines = vec![
        format!("Code:       {}", s.code),
        format!("Name:       {}", util::or_dash(s.name.as_deref())),
        format!("Area:       {}", util::or_dash(s.area.as_deref())),
        format!("Price:      {}", format_amount(s.price)),
        format!("Owner:      {}", util::or_dash(s.owner.as_deref())),
        format!("Facing:     {}", util::or_dash(s.facing.as_deref())),
        format!("Size:       {}", util::or_dash(s.size.as_deref())),
        format!(
            "Available:  {}",
            s.available_from.map_or_else(|| "now".into(), |d| d.to_string())
        ),
    ];
    if !s.landmarks.is_empty() {
        lines.push(format!("Landmarks:  {}", s.landmarks.join(", ")));
    }
    if let Some((lat, lng)) = s.coordinates() {
        lines.push(format!("Location:   {lat:.5}, {lng:.5}"));
    }
    if let Some(ref url) = s.image_url {
        lines.push(format!("Photo:      {url}"));
    }
    lines.join("\n")
}

fn options_detail(o: &FilterOptions) -> String {
    let join = |set: &std::collections::BTreeSet<String>| {
        if set.is_empty() {
            "-".to_owned()
        } else {
            set.iter().cloned().collect::<Vec<_>>().join(", ")
        }
    };
    let price = match (o.price.min, o.price.max) {
        (Some(min), Some(max)) => format!("{} .. {}", format_amount(min), format_amount(max)),
        _ => "-".into(),
    };
    [
        format!("Areas:      {}", join(&o.areas)),
        format!("Landmarks:  {}", join(&o.landmarks)),
        format!("Owners:     {}", join(&o.owners)),
        format!("Price:      {price}"),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ws: &Workspace, args: SitesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        SitesCommand::List { filter, refresh } => {
            let state = util::filter_state(&filter)?;
            let sites = if refresh {
                ws.refresh_sites().await?
            } else {
                ws.sites().await?
            };
            let visible: Vec<&Site> = state.apply(&sites, util::today());
            tracing::debug!(total = sites.len(), shown = visible.len(), "filtered sites");

            let out = output::render_list(
                &global.output,
                &visible,
                |s| SiteRow::from(*s),
                |s| s.code.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SitesCommand::Get { code } => {
            let site = ws.site(&code).await?;
            let out = output::render_single(&global.output, &site, detail, |s| s.code.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SitesCommand::Filters => {
            let sites = ws.sites().await?;
            let options = billdeck_core::FilterState::options(&sites);
            let out = output::render_single(&global.output, &options, options_detail, |o| {
                o.areas.iter().cloned().collect::<Vec<_>>().join("\n")
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
