// ── Dynamic object store ──
//
// Find-or-create of the managed object, decoding its current mappings, and
// the batched add/remove protocol. The remote side only offers coarse
// add/remove calls, so a failed batch leaves earlier batches applied; the
// error reports exactly how far the apply got. Re-running converges.
//
// Concurrent runs against the same object are last-writer-wins. FMC has no
// lock or version field for mappings.

use edgesync_api::models::{DYNAMIC_OBJECT_TYPE, OBJECT_TYPE_IP};
use edgesync_api::{DynamicObject, DynamicObjectCreate, FmcClient, MappingsUpdate};
use serde::Serialize;
use serde_json::Value;
use strum::Display;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::address::{AddressSet, CanonicalAddress, canonicalize_lenient};
use crate::error::CoreError;

/// Id of the placeholder object returned by a dry-run create.
pub const DRY_RUN_OBJECT_ID: &str = "DRYRUN-ID";

/// Fallback description for objects created without one.
pub const DEFAULT_DESCRIPTION: &str = "Managed automatically from BunnyCDN edge server list.";

// ── Mappings decoding ────────────────────────────────────────────────

/// The response shapes `GET .../dynamicobjects/{id}/mappings` is known to
/// take across FMC releases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingsShape {
    /// `["10.0.0.1", ...]`
    List(Vec<String>),
    /// `{"mappings": ["10.0.0.1", ...]}`
    Wrapped(Vec<String>),
    /// `{"items": [{"value": "10.0.0.1"}, ...], "paging": {...}}`
    Records(Vec<String>),
    Unrecognized,
}

impl MappingsShape {
    pub fn decode(raw: &Value) -> Self {
        Self::as_list(raw)
            .or_else(|| Self::as_wrapped(raw))
            .or_else(|| Self::as_records(raw))
            .unwrap_or(Self::Unrecognized)
    }

    fn as_list(raw: &Value) -> Option<Self> {
        raw.as_array().map(|items| Self::List(scalar_values(items)))
    }

    fn as_wrapped(raw: &Value) -> Option<Self> {
        raw.get("mappings")?
            .as_array()
            .map(|items| Self::Wrapped(scalar_values(items)))
    }

    // FMC leaves `items` out of an empty page, so a bare paging envelope
    // is an empty record list rather than an unknown shape.
    fn as_records(raw: &Value) -> Option<Self> {
        let Some(items) = raw.get("items") else {
            return raw
                .get("paging")
                .is_some()
                .then(|| Self::Records(Vec::new()));
        };

        let values = items
            .as_array()?
            .iter()
            .filter_map(|item| match item {
                Value::Object(record) => record.get("value").map(scalar_text),
                Value::String(s) => Some(s.trim().to_owned()),
                _ => None,
            })
            .filter(|value| !value.is_empty())
            .collect();
        Some(Self::Records(values))
    }

    pub fn into_values(self) -> Vec<String> {
        match self {
            Self::List(values) | Self::Wrapped(values) | Self::Records(values) => values,
            Self::Unrecognized => Vec::new(),
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_owned(),
        other => other.to_string(),
    }
}

fn scalar_values(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .map(scalar_text)
        .filter(|value| !value.is_empty())
        .collect()
}

// ── Batch accounting ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BatchDirection {
    Add,
    Remove,
}

/// How many batches of one direction went through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchProgress {
    pub succeeded: usize,
    pub total: usize,
}

impl BatchProgress {
    fn planned(total: usize) -> Self {
        Self {
            succeeded: 0,
            total,
        }
    }

    pub fn remaining(&self) -> usize {
        self.total - self.succeeded
    }
}

/// Batch counts of a completed apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AppliedBatches {
    pub add: BatchProgress,
    pub remove: BatchProgress,
}

impl AppliedBatches {
    fn progress_mut(&mut self, direction: BatchDirection) -> &mut BatchProgress {
        match direction {
            BatchDirection::Add => &mut self.add,
            BatchDirection::Remove => &mut self.remove,
        }
    }
}

/// A mappings batch was rejected partway through an apply.
///
/// Batches before the failing one stay applied; nothing after it was sent.
#[derive(Debug, Error)]
#[error(
    "{direction} batch {batch_index} ({batch_size} mappings) failed for dynamic object {object_id}; \
     add batches applied {}/{}, remove batches applied {}/{}: {source}",
    .progress.add.succeeded, .progress.add.total,
    .progress.remove.succeeded, .progress.remove.total
)]
pub struct ApplyError {
    pub object_id: String,
    pub direction: BatchDirection,
    /// 1-based index within `direction`.
    pub batch_index: usize,
    pub batch_size: usize,
    pub progress: AppliedBatches,
    #[source]
    pub source: edgesync_api::Error,
}

impl ApplyError {
    /// Batches of either direction that were never applied.
    pub fn remaining_batches(&self) -> usize {
        self.progress.add.remaining() + self.progress.remove.remaining()
    }
}

// ── Store ────────────────────────────────────────────────────────────

/// The managed dynamic object's view of FMC.
///
/// In dry-run mode reads still go to the FMC while create, add and remove
/// are only logged.
pub struct ObjectStore<'a> {
    client: &'a FmcClient,
    dry_run: bool,
}

impl<'a> ObjectStore<'a> {
    pub fn new(client: &'a FmcClient, dry_run: bool) -> Self {
        Self { client, dry_run }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub async fn list_objects(&self) -> Result<Vec<DynamicObject>, CoreError> {
        self.client
            .list_all_dynamic_objects()
            .await
            .map_err(CoreError::from)
    }

    /// Exact-name lookup across every page of dynamic objects.
    pub async fn find(&self, name: &str) -> Result<Option<DynamicObject>, CoreError> {
        let objects = self
            .client
            .list_all_dynamic_objects()
            .await
            .map_err(|e| CoreError::object_store("look up", name, e))?;
        Ok(objects.into_iter().find(|object| object.name == name))
    }

    pub async fn find_or_create(
        &self,
        name: &str,
        description: &str,
    ) -> Result<DynamicObject, CoreError> {
        if let Some(existing) = self.find(name).await? {
            info!(name, id = %existing.id, "found existing dynamic object");
            return Ok(existing);
        }

        let description = if description.trim().is_empty() {
            DEFAULT_DESCRIPTION
        } else {
            description
        };

        if self.dry_run {
            info!(name, "[dry-run] would create dynamic object");
            return Ok(DynamicObject {
                id: DRY_RUN_OBJECT_ID.to_owned(),
                name: name.to_owned(),
                kind: Some(DYNAMIC_OBJECT_TYPE.to_owned()),
                object_type: Some(OBJECT_TYPE_IP.to_owned()),
                description: Some(description.to_owned()),
            });
        }

        let created = self
            .client
            .create_dynamic_object(&DynamicObjectCreate::ip(name, description))
            .await
            .map_err(|e| CoreError::object_store("create", name, e))?;
        info!(name, id = %created.id, "created dynamic object");
        Ok(created)
    }

    /// The object's mappings as a canonical set.
    pub async fn current_mappings(&self, object_id: &str) -> Result<AddressSet, CoreError> {
        if self.dry_run && object_id == DRY_RUN_OBJECT_ID {
            debug!("dry-run placeholder object has no mappings");
            return Ok(AddressSet::new());
        }

        let raw = self
            .client
            .get_dynamic_object_mappings(object_id)
            .await
            .map_err(|e| CoreError::object_store("read mappings of", object_id, e))?;

        let shape = MappingsShape::decode(&raw);
        if shape == MappingsShape::Unrecognized {
            warn!(object_id, "unrecognized mappings response; treating as empty");
        }

        let values = shape.into_values();
        Ok(canonicalize_lenient(
            values.iter().map(String::as_str),
            object_id,
        ))
    }

    /// Send `to_add` then `to_remove` in chunks of at most `batch_size`.
    ///
    /// Stops at the first rejected batch; no removes are sent after a failed
    /// add.
    pub async fn apply_delta(
        &self,
        object_id: &str,
        to_add: &[CanonicalAddress],
        to_remove: &[CanonicalAddress],
        batch_size: usize,
    ) -> Result<AppliedBatches, ApplyError> {
        let batch_size = batch_size.max(1);
        let mut progress = AppliedBatches {
            add: BatchProgress::planned(to_add.len().div_ceil(batch_size)),
            remove: BatchProgress::planned(to_remove.len().div_ceil(batch_size)),
        };

        for (direction, addresses) in [
            (BatchDirection::Add, to_add),
            (BatchDirection::Remove, to_remove),
        ] {
            for (index, batch) in addresses.chunks(batch_size).enumerate() {
                let batch_index = index + 1;
                if let Err(source) = self.submit_batch(object_id, direction, batch).await {
                    error!(
                        object_id,
                        %direction,
                        batch = batch_index,
                        size = batch.len(),
                        "mappings batch failed: {source}"
                    );
                    return Err(ApplyError {
                        object_id: object_id.to_owned(),
                        direction,
                        batch_index,
                        batch_size: batch.len(),
                        progress,
                        source,
                    });
                }

                let done = progress.progress_mut(direction);
                done.succeeded += 1;
                info!(
                    object_id,
                    %direction,
                    batch = batch_index,
                    of = done.total,
                    size = batch.len(),
                    "mappings batch applied"
                );
            }
        }

        Ok(progress)
    }

    async fn submit_batch(
        &self,
        object_id: &str,
        direction: BatchDirection,
        batch: &[CanonicalAddress],
    ) -> Result<(), edgesync_api::Error> {
        if self.dry_run {
            info!(
                object_id,
                %direction,
                size = batch.len(),
                "[dry-run] would {direction} mappings"
            );
            return Ok(());
        }

        let mappings = batch.iter().map(|addr| addr.as_str().to_owned()).collect();
        let body = match direction {
            BatchDirection::Add => MappingsUpdate::add(object_id, mappings),
            BatchDirection::Remove => MappingsUpdate::remove(object_id, mappings),
        };
        self.client.update_dynamic_object_mappings(&body).await
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_bare_list() {
        let shape = MappingsShape::decode(&json!(["10.0.0.1", " 10.0.0.2 ", ""]));
        assert_eq!(
            shape,
            MappingsShape::List(vec!["10.0.0.1".into(), "10.0.0.2".into()])
        );
    }

    #[test]
    fn decodes_mappings_wrapper() {
        let shape = MappingsShape::decode(&json!({"mappings": ["10.0.0.0/24"]}));
        assert_eq!(shape, MappingsShape::Wrapped(vec!["10.0.0.0/24".into()]));
    }

    #[test]
    fn decodes_item_records() {
        let shape = MappingsShape::decode(&json!({
            "items": [{"value": "10.0.0.1"}, "10.0.0.2", {"other": 1}],
            "paging": {"count": 3}
        }));
        assert_eq!(
            shape,
            MappingsShape::Records(vec!["10.0.0.1".into(), "10.0.0.2".into()])
        );
    }

    #[test]
    fn empty_page_envelope_is_empty_records() {
        let shape = MappingsShape::decode(&json!({"paging": {"count": 0}}));
        assert_eq!(shape, MappingsShape::Records(Vec::new()));
    }

    #[test]
    fn unknown_shape_is_unrecognized() {
        assert_eq!(MappingsShape::decode(&json!({"foo": 1})), MappingsShape::Unrecognized);
        assert_eq!(MappingsShape::decode(&json!("10.0.0.1")), MappingsShape::Unrecognized);
        assert!(MappingsShape::Unrecognized.into_values().is_empty());
    }

    #[test]
    fn batch_progress_counts_remaining() {
        let progress = BatchProgress {
            succeeded: 1,
            total: 3,
        };
        assert_eq!(progress.remaining(), 2);
    }
}
