//! Dashboard summary handler.

use billdeck_core::{Dashboard, Workspace};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::{bookings, util};

fn detail(d: &Dashboard, currency: &str) -> String {
    format!(
        "Occupancy:       {}/{} sites ({:.1}%)\n{}",
        d.occupancy.occupied,
        d.occupancy.total,
        d.occupancy.rate(),
        bookings::summary_detail(&d.bookings, currency)
    )
}

pub async fn handle(ws: &Workspace, global: &GlobalOpts) -> Result<(), CliError> {
    let progress = util::spinner("Loading dashboard", global.quiet);
    let result = ws.dashboard(util::today()).await;
    progress.finish_and_clear();
    let dashboard = result?;

    bookings::source_notice(dashboard.source, global.quiet);
    let currency = ws.config().currency.clone();
    let out = output::render_single(
        &global.output,
        &dashboard,
        |d| detail(d, &currency),
        |d| format!("{:.1}", d.occupancy.rate()),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
