//! The top-level changeset for one dataset.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ids::{ExternalId, InstanceId, SchemaId};
use crate::links::LinkedPropertyChanges;
use crate::models::ModelChanges;
use crate::proxies::ProxyChanges;

/// Everything to apply to one dataset's metadata in a single run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub models: ModelChanges,
    #[serde(default)]
    pub linked_properties: Vec<LinkedPropertyChanges>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxies: Option<ProxyChanges>,
    /// Model name to schema id for models that existed before this run.
    #[serde(default)]
    pub existing_model_id_map: BTreeMap<String, SchemaId>,
    /// Instance ids of records that existed before this run, keyed by the
    /// name of their model.
    #[serde(default)]
    pub record_id_maps: Vec<RecordIdMap>,
}

impl Dataset {
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
            && self.linked_properties.is_empty()
            && self
                .proxies
                .as_ref()
                .map_or(true, |p| !p.create_proxy_relationship_schema && p.record_changes.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordIdMap {
    pub model_name: String,
    #[serde(default)]
    pub external_to_pennsieve: BTreeMap<ExternalId, InstanceId>,
}

impl RecordIdMap {
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            external_to_pennsieve: BTreeMap::new(),
        }
    }

    pub fn with_record(mut self, external_id: ExternalId, instance_id: InstanceId) -> Self {
        self.external_to_pennsieve.insert(external_id, instance_id);
        self
    }
}
