//! Reconciliation engine between CDN edge-server lists and an FMC dynamic
//! object.
//!
//! - **[`canonicalize`]** turns bare addresses and CIDR blocks into one
//!   comparable form ([`CanonicalAddress`]). Bad tokens are skipped with a
//!   warning, never fatal.
//!
//! - **[`SourceListFetcher`]** fetches the configured list endpoints, probes
//!   each body as XML, JSON or plain lines, and unions the results into the
//!   desired set.
//!
//! - **[`ObjectStore`]** finds or creates the dynamic object, decodes its
//!   current mappings, and applies add/remove batches. Dry-run mode keeps
//!   the reads and logs the writes.
//!
//! - **[`reconcile`]** diffs desired against observed and applies only the
//!   delta.
//!
//! - **[`SyncJob`]** wires the above together for a single run.

pub mod address;
pub mod config;
pub mod engine;
pub mod error;
pub mod job;
pub mod source;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use address::{AddressParseError, AddressSet, CanonicalAddress, canonicalize};
pub use config::{ConnectionConfig, SourceConfig, SyncConfig, TlsVerification};
pub use engine::{Delta, ReconcileOutcome, reconcile};
pub use error::CoreError;
pub use job::{SyncJob, SyncReport};
pub use source::{FetchError, ListFormat, SourceListFetcher};
pub use store::{
    AppliedBatches, ApplyError, BatchDirection, BatchProgress, DRY_RUN_OBJECT_ID, MappingsShape,
    ObjectStore,
};

// ── Wire types surfaced to callers ──────────────────────────────────
pub use edgesync_api::DynamicObject;
