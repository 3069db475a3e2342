//! `edgesync objects`: read-only view of the FMC's dynamic objects.

use tabled::Tabled;

use edgesync_core::{DynamicObject, SyncJob};

use crate::cli::{GlobalOpts, ObjectsArgs, ObjectsCommand};
use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct ObjectRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    object_type: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&DynamicObject> for ObjectRow {
    fn from(o: &DynamicObject) -> Self {
        Self {
            id: o.id.clone(),
            name: o.name.clone(),
            object_type: o.object_type.clone().unwrap_or_default(),
            description: o.description.clone().unwrap_or_default(),
        }
    }
}

pub async fn handle(args: ObjectsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ObjectsCommand::List => {
            let cfg = config::load(global)?;
            let job = SyncJob::new(config::build_sync_config(global, cfg)?)?;
            job.connect().await?;

            let objects = job.store().list_objects().await?;
            let out = output::render_list(
                &global.output,
                &objects,
                |o| ObjectRow::from(o),
                |o| format!("{}\t{}", o.id, o.name),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
