//! `edgesync sources`: the desired set, without an FMC.

use tabled::Tabled;

use edgesync_core::{CanonicalAddress, CoreError, SourceListFetcher};

use crate::cli::{GlobalOpts, SourcesArgs, SourcesCommand};
use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct AddressRow {
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Family")]
    family: &'static str,
}

impl From<&CanonicalAddress> for AddressRow {
    fn from(a: &CanonicalAddress) -> Self {
        Self {
            address: a.to_string(),
            family: if a.is_ipv6() { "IPv6" } else { "IPv4" },
        }
    }
}

pub async fn handle(args: SourcesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        SourcesCommand::Fetch { include_ipv6 } => {
            let mut cfg = config::load(global)?;
            if include_ipv6 {
                cfg.sync.include_ipv6 = true;
            }
            let sources = edgesync_config::to_source_config(&cfg)?;

            let fetcher = SourceListFetcher::from_config(&sources).map_err(CoreError::from)?;
            let desired: Vec<CanonicalAddress> = fetcher
                .fetch(&sources)
                .await
                .map_err(CoreError::from)?
                .into_iter()
                .collect();

            let out = output::render_list(
                &global.output,
                &desired,
                |a| AddressRow::from(a),
                ToString::to_string,
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
