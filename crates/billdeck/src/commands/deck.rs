//! Deck builder command handler.

use tabled::Tabled;
use tokio_util::sync::CancellationToken;

use billdeck_core::pricing::format_amount;
use billdeck_core::{
    CurrencyConversion, Deck, DeckRequest, MediaReport, PriceAdjustment, RateDuration,
    SiteSelection, Workspace,
};

use crate::cli::{DeckArgs, DeckBuildArgs, DeckCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct SlideRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Area")]
    area: String,
    #[tabled(rename = "Base")]
    base: String,
    #[tabled(rename = "Adjusted")]
    adjusted: String,
    #[tabled(rename = "Quote")]
    quote: String,
    #[tabled(rename = "Media")]
    media: String,
}

#[derive(Tabled)]
struct RateRowView {
    #[tabled(rename = "Site")]
    site: String,
    #[tabled(rename = "Months")]
    months: u32,
    #[tabled(rename = "Monthly")]
    monthly: String,
    #[tabled(rename = "Total")]
    total: String,
}

fn media_marker(image: bool, map: bool) -> String {
    match (image, map) {
        (true, true) => "photo+map".into(),
        (true, false) => "photo".into(),
        (false, true) => "map".into(),
        (false, false) => "-".into(),
    }
}

fn detail(deck: &Deck) -> String {
    let slides: Vec<SlideRow> = deck
        .slides
        .iter()
        .enumerate()
        .map(|(i, s)| SlideRow {
            index: i + 1,
            code: s.site.code.clone(),
            name: util::or_dash(s.site.name.as_deref()),
            area: util::or_dash(s.site.area.as_deref()),
            base: format_amount(s.base_price),
            adjusted: format_amount(s.adjusted_price),
            quote: format!("{} {}", s.currency, format_amount(s.display_price)),
            media: media_marker(s.image.is_some(), s.map.is_some()),
        })
        .collect();

    let mut out = vec![deck.title.clone()];
    if let Some(ref client) = deck.client {
        out.push(format!("Prepared for {client}"));
    }
    out.push(format!("Generated {}", deck.generated_on));
    if let Some(rate) = deck.exchange_rate {
        out.push(format!("Quoted in {} at {rate} per unit", deck.currency));
    }
    out.push(output::render_table(&slides));
    out.push(format!(
        "{} sites, total {} {}/month",
        deck.totals.sites,
        deck.currency,
        format_amount(deck.totals.display)
    ));

    let rates: Vec<RateRowView> = deck
        .slides
        .iter()
        .flat_map(|s| {
            s.rates.iter().map(|r| RateRowView {
                site: s.site.code.clone(),
                months: r.months,
                monthly: format_amount(r.monthly_rate),
                total: format_amount(r.total),
            })
        })
        .collect();
    if !rates.is_empty() {
        out.push(String::new());
        out.push(output::render_table(&rates));
    }
    out.join("\n")
}

/// Translate flags into a priced deck request.
fn request(args: &DeckBuildArgs) -> Result<DeckRequest, CliError> {
    let selection = if args.sites.is_empty() {
        SiteSelection::Filter(util::filter_state(&args.filter)?)
    } else {
        SiteSelection::Codes(args.sites.clone())
    };

    let adjustments = args
        .adjustments
        .iter()
        .map(|rule| util::parse_with::<PriceAdjustment>("adjust", rule))
        .collect::<Result<Vec<_>, _>>()?;
    let durations = args
        .durations
        .iter()
        .map(|d| util::parse_with::<RateDuration>("duration", d))
        .collect::<Result<Vec<_>, _>>()?;
    let currency = args
        .currency
        .as_deref()
        .map(|c| util::parse_with::<CurrencyConversion>("currency", c))
        .transpose()?;

    Ok(DeckRequest {
        title: args.title.clone(),
        client: args.client.clone(),
        selection,
        adjustments,
        currency,
        durations,
        include_media: args.media,
    })
}

fn media_notice(report: MediaReport, quiet: bool) {
    let mut line = format!("Media: {} loaded", report.loaded);
    if report.unavailable > 0 {
        line.push_str(&format!(", {} unavailable", report.unavailable));
    }
    if report.failed > 0 {
        line.push_str(&format!(", {} failed (see -v)", report.failed));
    }
    output::notice(&line, quiet);
}

pub async fn handle(
    ws: &Workspace,
    args: DeckArgs,
    global: &GlobalOpts,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    match args.command {
        DeckCommand::Build(build) => {
            let req = request(&build)?;
            let progress = util::spinner("Building deck", global.quiet || !req.include_media);
            let result = ws.deck(&req, util::today(), cancel).await;
            progress.finish_and_clear();
            let (deck, report) = result?;

            if req.include_media {
                media_notice(report, global.quiet);
            }
            if let Some(ref path) = build.save {
                std::fs::write(path, serde_json::to_string_pretty(&deck)?)?;
                output::notice(&format!("✓ Deck written to {}", path.display()), global.quiet);
            }

            let out = output::render_single(&global.output, &deck, detail, |d| {
                d.slides
                    .iter()
                    .map(|s| s.site.code.clone())
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::cli::SiteFilterArgs;

    use super::*;

    fn args() -> DeckBuildArgs {
        DeckBuildArgs {
            title: "Q1".into(),
            client: None,
            sites: Vec::new(),
            filter: SiteFilterArgs::default(),
            adjustments: vec!["+10%".into(), "-5000@EDSA-001".into()],
            currency: Some("usd:56".into()),
            durations: vec!["3".into(), "12:15%".into()],
            media: false,
            save: None,
        }
    }

    #[test]
    fn flags_become_a_request() {
        let req = request(&args()).unwrap();
        assert_eq!(req.adjustments.len(), 2);
        assert_eq!(req.durations.len(), 2);
        assert_eq!(req.currency.unwrap().code(), "USD");
        assert!(matches!(req.selection, SiteSelection::Filter(ref f) if f.is_empty()));
    }

    #[test]
    fn explicit_sites_win_over_filters() {
        let mut a = args();
        a.sites = vec!["EDSA-001".into()];
        a.filter.areas = vec!["Makati".into()];
        let req = request(&a).unwrap();
        assert!(matches!(req.selection, SiteSelection::Codes(ref codes) if codes.len() == 1));
    }

    #[test]
    fn bad_rules_name_the_flag() {
        let mut a = args();
        a.adjustments.push("ten percent".into());
        match request(&a) {
            Err(CliError::Validation { field, .. }) => assert_eq!(field, "adjust"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
