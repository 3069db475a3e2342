// Wire types for the FMC dynamic-object endpoints.

use serde::{Deserialize, Serialize};

/// The `type` marker FMC expects on dynamic objects.
pub const DYNAMIC_OBJECT_TYPE: &str = "DynamicObject";

/// The `objectType` for dynamic objects holding IP/CIDR mappings.
pub const OBJECT_TYPE_IP: &str = "IP";

/// A page of a list endpoint: `{ items: [...], paging: {...} }`.
///
/// FMC omits `items` entirely on an empty page.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub paging: Option<Paging>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Paging {
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub pages: Option<u64>,
}

/// A dynamic object as returned by list and create.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicObject {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub object_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body for `POST object/dynamicobjects`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicObjectCreate<'a> {
    #[serde(rename = "type")]
    pub kind: &'a str,
    pub name: &'a str,
    pub object_type: &'a str,
    pub description: &'a str,
}

impl<'a> DynamicObjectCreate<'a> {
    /// An IP-typed dynamic object.
    pub fn ip(name: &'a str, description: &'a str) -> Self {
        Self {
            kind: DYNAMIC_OBJECT_TYPE,
            name,
            object_type: OBJECT_TYPE_IP,
            description,
        }
    }
}

/// Reference to the dynamic object a mappings batch targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectRef {
    pub id: String,
}

/// One batch of mappings for one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingsEntry {
    pub mappings: Vec<String>,
    pub dynamic_object: ObjectRef,
}

/// Body for `POST object/dynamicobjectmappings`.
///
/// `{"add": [{"mappings": [...], "dynamicObject": {"id": ...}}]}`, or the
/// `remove` equivalent. Empty directions are omitted from the payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MappingsUpdate {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub add: Vec<MappingsEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub remove: Vec<MappingsEntry>,
}

impl MappingsUpdate {
    pub fn add(object_id: &str, mappings: Vec<String>) -> Self {
        Self {
            add: vec![MappingsEntry::new(object_id, mappings)],
            remove: Vec::new(),
        }
    }

    pub fn remove(object_id: &str, mappings: Vec<String>) -> Self {
        Self {
            add: Vec::new(),
            remove: vec![MappingsEntry::new(object_id, mappings)],
        }
    }
}

impl MappingsEntry {
    fn new(object_id: &str, mappings: Vec<String>) -> Self {
        Self {
            mappings,
            dynamic_object: ObjectRef {
                id: object_id.to_owned(),
            },
        }
    }
}
