// ── Sync job ──
//
// One end-to-end run: build the desired set, log in, resolve the object,
// read its mappings, reconcile. Each step awaits the previous one; there is
// no concurrency inside a run.

use edgesync_api::{Credentials, DynamicObject, EdgeListClient, FmcClient, TransportConfig};
use serde::Serialize;
use tracing::info;

use crate::address::{AddressSet, CanonicalAddress};
use crate::config::SyncConfig;
use crate::engine::{ReconcileOutcome, reconcile};
use crate::error::CoreError;
use crate::source::SourceListFetcher;
use crate::store::ObjectStore;

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub object_name: String,
    pub object_id: String,
    pub dry_run: bool,
    pub desired: usize,
    pub observed: usize,
    pub added: usize,
    pub removed: usize,
}

/// Owns the HTTP clients for one run against one dynamic object.
pub struct SyncJob {
    config: SyncConfig,
    fmc: FmcClient,
    fetcher: SourceListFetcher,
}

impl SyncJob {
    /// Validate `config` and build both HTTP clients. No network I/O.
    pub fn new(config: SyncConfig) -> Result<Self, CoreError> {
        config.validate()?;

        let fmc_transport = TransportConfig {
            tls: config.connection.tls.mode(),
            timeout: config.connection.timeout,
        };
        let fmc = FmcClient::new(config.connection.url.clone(), &fmc_transport)?;
        let fetcher = SourceListFetcher::from_config(&config.sources)?;

        Ok(Self::assemble(config, fmc, fetcher))
    }

    /// Assemble a job from pre-built clients.
    pub fn with_clients(config: SyncConfig, fmc: FmcClient, edge: EdgeListClient) -> Self {
        Self::assemble(config, fmc, SourceListFetcher::new(edge))
    }

    fn assemble(config: SyncConfig, fmc: FmcClient, fetcher: SourceListFetcher) -> Self {
        if let Some(domain) = &config.connection.domain_uuid {
            fmc.set_domain_uuid(domain.clone());
        }
        Self {
            config,
            fmc,
            fetcher,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Object store bound to this job's client and dry-run setting.
    pub fn store(&self) -> ObjectStore<'_> {
        ObjectStore::new(&self.fmc, self.config.dry_run)
    }

    /// Authenticate against the FMC.
    pub async fn connect(&self) -> Result<(), CoreError> {
        let credentials = Credentials {
            username: self.config.connection.username.clone(),
            password: self.config.connection.password.clone(),
        };
        let token = self.fmc.login(&credentials).await?;
        info!(
            url = %self.fmc.base_url(),
            domain = %self.fmc.domain_uuid().unwrap_or(token.domain_uuid),
            "connected to FMC"
        );
        Ok(())
    }

    /// Fetch the desired set without touching the FMC.
    pub async fn fetch_desired(&self) -> Result<AddressSet, CoreError> {
        Ok(self.fetcher.fetch(&self.config.sources).await?)
    }

    /// Run the full pipeline once.
    pub async fn run(&self) -> Result<SyncReport, CoreError> {
        if self.config.dry_run {
            info!("dry-run: no changes will be sent to the FMC");
        }

        let desired = self.fetch_desired().await?;
        self.connect().await?;

        let store = self.store();
        let object = store
            .find_or_create(&self.config.object_name, &self.config.description)
            .await?;
        let observed = store.current_mappings(&object.id).await?;

        let outcome = reconcile(
            &store,
            &desired,
            &observed,
            &object.id,
            self.config.batch_size,
        )
        .await?;

        info!(
            object = %object.name,
            added = outcome.added,
            removed = outcome.removed,
            "sync complete"
        );

        Ok(SyncReport {
            object_name: object.name,
            object_id: object.id,
            dry_run: self.config.dry_run,
            desired: desired.len(),
            observed: observed.len(),
            added: outcome.added,
            removed: outcome.removed,
        })
    }

    /// Look up an existing object by exact name or by id.
    pub async fn resolve_object(&self, name_or_id: &str) -> Result<DynamicObject, CoreError> {
        self.store()
            .list_objects()
            .await?
            .into_iter()
            .find(|object| object.name == name_or_id || object.id == name_or_id)
            .ok_or_else(|| CoreError::ObjectNotFound {
                name: name_or_id.to_owned(),
            })
    }

    /// Add and remove individual addresses on an existing object.
    ///
    /// Additions already present and removals already absent are no-ops.
    /// Requires a prior [`connect`](Self::connect).
    pub async fn edit_mappings(
        &self,
        name_or_id: &str,
        additions: &[CanonicalAddress],
        removals: &[CanonicalAddress],
    ) -> Result<ReconcileOutcome, CoreError> {
        let store = self.store();
        let object = self.resolve_object(name_or_id).await?;

        let observed = store.current_mappings(&object.id).await?;
        let mut desired = observed.clone();
        desired.extend(additions.iter().cloned());
        for addr in removals {
            desired.remove(addr);
        }

        Ok(reconcile(
            &store,
            &desired,
            &observed,
            &object.id,
            self.config.batch_size,
        )
        .await?)
    }
}
