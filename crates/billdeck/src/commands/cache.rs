//! Offline cache command handlers.

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use billdeck_core::{CacheStats, SyncReport, Workspace};

use crate::cli::{CacheArgs, CacheCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

fn kib(bytes: usize) -> String {
    format!("{:.1} KiB", f64::from(u32::try_from(bytes).unwrap_or(u32::MAX)) / 1024.0)
}

fn cached_list(count: Option<usize>, fetched_at: Option<DateTime<Utc>>) -> String {
    match (count, fetched_at) {
        (Some(n), Some(at)) => format!("{n} (fetched {})", at.format("%Y-%m-%d %H:%M UTC")),
        _ => "none".into(),
    }
}

fn stats_detail(s: &CacheStats, ttl_hours: i64, location: &str) -> String {
    [
        format!("Location:  {location}"),
        format!("Photos:    {}", s.images),
        format!("Maps:      {}", s.maps),
        format!("Stale:     {} (older than {ttl_hours}h)", s.stale),
        format!("Size:      {}", kib(s.bytes)),
        format!("Sites:     {}", cached_list(s.sites, s.sites_fetched_at)),
        format!("Bookings:  {}", cached_list(s.bookings, s.bookings_fetched_at)),
    ]
    .join("\n")
}

fn sync_detail(r: &SyncReport) -> String {
    [
        format!("Sites:        {}", r.sites),
        format!("Bookings:     {}", r.bookings),
        format!("Media cached: {}", r.media.loaded),
        format!("Unavailable:  {}", r.media.unavailable),
        format!("Failed:       {}", r.media.failed),
    ]
    .join("\n")
}

pub async fn handle(
    ws: &Workspace,
    args: CacheArgs,
    global: &GlobalOpts,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let cache = ws.cache();

    match args.command {
        CacheCommand::Sync => {
            let progress = util::spinner("Syncing offline cache", global.quiet);
            let result = ws.sync_cache(cancel).await;
            progress.finish_and_clear();
            let report = result?;
            let out = output::render_single(&global.output, &report, sync_detail, |r| {
                r.media.loaded.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CacheCommand::Status => {
            let stats = cache.stats(Utc::now())?;
            let location = ws
                .config()
                .cache_path
                .as_ref()
                .map_or_else(|| "(in memory)".into(), |p| p.display().to_string());
            let ttl_hours = cache.media_ttl().num_hours();
            let out = output::render_single(
                &global.output,
                &stats,
                |s| stats_detail(s, ttl_hours, &location),
                |s| (s.images + s.maps).to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CacheCommand::Purge => {
            let purged = cache.purge_stale(Utc::now())?;
            output::notice(&format!("✓ Purged {purged} stale media entries"), global.quiet);
            Ok(())
        }

        CacheCommand::Clear => {
            if !util::confirm("Drop every cached photo, map and booking list?", global.yes)? {
                return Ok(());
            }
            let cleared = cache.clear()?;
            output::notice(&format!("✓ Cleared {cleared} cache entries"), global.quiet);
            Ok(())
        }
    }
}
