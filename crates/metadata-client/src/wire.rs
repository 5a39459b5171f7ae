//! Request and response bodies of the metadata service.
//!
//! Changeset payloads that go out unchanged (model, property and record
//! values) live in `metadata_types`; this module holds the bodies that are
//! only known once service ids have been resolved.

use serde::{Deserialize, Serialize};

use metadata_types::{DatasetId, InstanceId, SchemaId};

/// Name and relationship type of the package proxy relationship.
pub const PROXY_RELATIONSHIP_SCHEMA_NAME: &str = "belongs_to";
pub const PROXY_RELATIONSHIP_DISPLAY_NAME: &str = "Belongs To";
/// Proxies point from the package to the target record.
pub const PROXY_DIRECTION: &str = "FromTarget";

/// Minimal view of a create/update response. Creates that hand back a new
/// object reject an empty `id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Integration {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub application_id: i64,
    pub dataset_node_id: DatasetId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkSchemaBody {
    pub name: String,
    pub display_name: String,
    pub to: SchemaId,
    pub position: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkInstanceBody {
    pub schema_linked_property_id: SchemaId,
    pub to: InstanceId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProxyRelationshipSchemaBody {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub schema: Vec<String>,
}

impl Default for CreateProxyRelationshipSchemaBody {
    fn default() -> Self {
        Self {
            name: PROXY_RELATIONSHIP_SCHEMA_NAME.to_string(),
            display_name: PROXY_RELATIONSHIP_DISPLAY_NAME.to_string(),
            description: String::new(),
            schema: Vec::new(),
        }
    }
}

/// Attaches one package to one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProxyInstanceBody {
    /// The package node id.
    pub external_id: String,
    pub targets: Vec<CreateProxyInstanceTarget>,
}

impl CreateProxyInstanceBody {
    pub fn new(record_id: InstanceId, package_node_id: impl Into<String>) -> Self {
        Self {
            external_id: package_node_id.into(),
            targets: vec![CreateProxyInstanceTarget {
                direction: PROXY_DIRECTION.to_string(),
                link_target: LinkTarget {
                    concept_instance: ConceptInstance { id: record_id },
                },
                relationship_type: PROXY_RELATIONSHIP_SCHEMA_NAME.to_string(),
                relationship_data: Vec::new(),
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProxyInstanceTarget {
    pub direction: String,
    pub link_target: LinkTarget,
    pub relationship_type: String,
    pub relationship_data: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkTarget {
    #[serde(rename = "ConceptInstance")]
    pub concept_instance: ConceptInstance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptInstance {
    pub id: InstanceId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteProxyInstancesBody {
    pub source_record_id: InstanceId,
    pub proxy_instance_ids: Vec<InstanceId>,
}

impl DeleteProxyInstancesBody {
    pub fn new(record_id: InstanceId, proxy_instance_ids: Vec<InstanceId>) -> Self {
        Self {
            source_record_id: record_id,
            proxy_instance_ids,
        }
    }
}

/// Result of a bulk record delete. The service deletes what it can and
/// reports the rest as `[id, message]` pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkDeleteResponse {
    #[serde(default)]
    pub success: Vec<InstanceId>,
    #[serde(default)]
    pub errors: Vec<(InstanceId, String)>,
}

impl BulkDeleteResponse {
    pub fn has_failures(&self) -> bool {
        !self.errors.is_empty()
    }
}
