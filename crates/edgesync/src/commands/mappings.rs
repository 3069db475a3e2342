//! `edgesync mappings`: inspect or hand-edit one object's addresses.

use tabled::Tabled;

use edgesync_core::{CanonicalAddress, CoreError, ReconcileOutcome, SyncJob, canonicalize};

use crate::cli::{EditMappingsArgs, GlobalOpts, MappingsArgs, MappingsCommand};
use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct MappingRow {
    #[tabled(rename = "Address")]
    address: String,
}

/// Validate every argument before touching the network.
fn parse_addresses(raw: &[String]) -> Result<Vec<CanonicalAddress>, CliError> {
    raw.iter()
        .map(|token| canonicalize(token).map_err(|e| CliError::from(CoreError::from(e))))
        .collect()
}

pub async fn handle(args: MappingsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        MappingsCommand::Show { object } => {
            let cfg = config::load(global)?;
            let object = object.unwrap_or_else(|| cfg.sync.object_name.clone());
            let job = SyncJob::new(config::build_sync_config(global, cfg)?)?;
            job.connect().await?;

            let target = job.resolve_object(&object).await?;
            let mappings: Vec<CanonicalAddress> =
                job.store().current_mappings(&target.id).await?.into_iter().collect();

            let out = output::render_list(
                &global.output,
                &mappings,
                |a| MappingRow {
                    address: a.to_string(),
                },
                ToString::to_string,
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        MappingsCommand::Add(edit) => apply_edit(edit, global, true).await,
        MappingsCommand::Remove(edit) => apply_edit(edit, global, false).await,
    }
}

async fn apply_edit(
    edit: EditMappingsArgs,
    global: &GlobalOpts,
    adding: bool,
) -> Result<(), CliError> {
    let addresses = parse_addresses(&edit.addresses)?;

    let mut cfg = config::load(global)?;
    if edit.dry_run {
        cfg.sync.dry_run = true;
    }
    let object = edit.object;

    let job = SyncJob::new(config::build_sync_config(global, cfg)?)?;
    job.connect().await?;

    let (additions, removals): (&[CanonicalAddress], &[CanonicalAddress]) = if adding {
        (&addresses, &[])
    } else {
        (&[], &addresses)
    };
    let outcome = job.edit_mappings(&object, additions, removals).await?;

    let color = output::should_color(&global.color);
    let dry_run = job.config().dry_run;
    let out = output::render_single(
        &global.output,
        &outcome,
        |o: &ReconcileOutcome| {
            let badge = if dry_run {
                output::dry_run_badge(color)
            } else {
                String::new()
            };
            format!(
                "{object}: {} {}{badge}",
                output::added(o.added, color),
                output::removed(o.removed, color)
            )
        },
        |o| format!("+{} -{}", o.added, o.removed),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
