//! `edgesync sync`: one reconciliation run.

use edgesync_core::{SyncJob, SyncReport};

use crate::cli::{GlobalOpts, SyncArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

fn detail(report: &SyncReport, color: bool) -> String {
    let badge = if report.dry_run {
        output::dry_run_badge(color)
    } else {
        String::new()
    };
    [
        format!("Object:   {} ({}){badge}", report.object_name, report.object_id),
        format!("Desired:  {}", report.desired),
        format!("Observed: {}", report.observed),
        format!(
            "Changes:  {} {}",
            output::added(report.added, color),
            output::removed(report.removed, color)
        ),
    ]
    .join("\n")
}

pub async fn handle(args: SyncArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = config::load(global)?;
    if args.dry_run {
        cfg.sync.dry_run = true;
    }
    if args.include_ipv6 {
        cfg.sync.include_ipv6 = true;
    }
    if let Some(batch_size) = args.batch_size {
        cfg.sync.batch_size = batch_size;
    }
    if let Some(object) = args.object {
        cfg.sync.object_name = object;
    }

    let job = SyncJob::new(config::build_sync_config(global, cfg)?)?;
    let report = job.run().await?;

    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &report,
        |r| detail(r, color),
        |r| format!("{} +{} -{}", r.object_id, r.added, r.removed),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
