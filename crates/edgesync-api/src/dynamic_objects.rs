// Dynamic object endpoints
//
// List/create dynamic objects, read their current mappings, and post
// add/remove batches. Mappings reads are returned as raw JSON because the
// response shape differs between FMC releases; decoding lives in core.

use tracing::debug;

use crate::client::FmcClient;
use crate::error::Error;
use crate::models::{DynamicObject, DynamicObjectCreate, MappingsUpdate, Page};

const DYNAMIC_OBJECTS_PATH: &str = "object/dynamicobjects";
const MAPPINGS_UPDATE_PATH: &str = "object/dynamicobjectmappings";

/// Page size for dynamic-object listing (the FMC maximum).
pub const LIST_PAGE_LIMIT: usize = 1000;

impl FmcClient {
    pub async fn list_dynamic_objects(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Page<DynamicObject>, Error> {
        self.get_with_params(
            DYNAMIC_OBJECTS_PATH,
            &[
                ("offset", offset.to_string()),
                ("limit", limit.to_string()),
                ("expanded", "false".to_owned()),
            ],
        )
        .await
    }

    /// Every dynamic object in the domain, across all pages.
    pub async fn list_all_dynamic_objects(&self) -> Result<Vec<DynamicObject>, Error> {
        let all = self
            .paginate_all(LIST_PAGE_LIMIT, |offset, limit| {
                self.list_dynamic_objects(offset, limit)
            })
            .await?;
        debug!(count = all.len(), "listed dynamic objects");
        Ok(all)
    }

    pub async fn create_dynamic_object(
        &self,
        body: &DynamicObjectCreate<'_>,
    ) -> Result<DynamicObject, Error> {
        self.post(DYNAMIC_OBJECTS_PATH, body).await
    }

    /// Raw `GET object/dynamicobjects/{id}/mappings` response.
    pub async fn get_dynamic_object_mappings(
        &self,
        object_id: &str,
    ) -> Result<serde_json::Value, Error> {
        self.get(&format!("{DYNAMIC_OBJECTS_PATH}/{object_id}/mappings"))
            .await
    }

    pub async fn update_dynamic_object_mappings(&self, body: &MappingsUpdate) -> Result<(), Error> {
        self.post_no_response(MAPPINGS_UPDATE_PATH, body).await
    }
}
