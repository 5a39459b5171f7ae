//! Model and record changes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{ExternalId, InstanceId, SchemaId};

/// All model-level changes in a changeset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelChanges {
    /// Models that do not exist yet, with the records to create in them.
    #[serde(default)]
    pub creates: Vec<ModelCreate>,
    /// Existing models whose records change.
    #[serde(default)]
    pub updates: Vec<ModelUpdate>,
    /// Existing models to remove, together with all their records.
    #[serde(default)]
    pub deletes: Vec<ModelDelete>,
}

impl ModelChanges {
    pub fn is_empty(&self) -> bool {
        self.creates.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCreate {
    pub create: ModelPropsCreate,
    #[serde(default)]
    pub records: Vec<RecordCreate>,
}

impl ModelCreate {
    pub fn name(&self) -> &str {
        &self.create.model.name
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelUpdate {
    pub id: SchemaId,
    #[serde(default)]
    pub records: RecordChanges,
}

/// A model delete. `records` must list every record still in the model;
/// the service refuses to delete a model that has records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDelete {
    pub id: SchemaId,
    #[serde(default)]
    pub records: Vec<InstanceId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPropsCreate {
    pub model: ModelCreateParams,
    #[serde(default)]
    pub properties: Vec<PropertyCreateParams>,
}

/// Payload of `POST /models/datasets/{dataset}/concepts`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelCreateParams {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub locked: bool,
}

/// One element of the `PUT .../concepts/{model}/properties` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyCreateParams {
    pub display_name: String,
    pub name: String,
    /// Passed through untouched: either a simple type name such as
    /// `"String"` or a structured type such as
    /// `{"type": "array", "items": {"type": "String"}}`.
    pub data_type: Value,
    pub concept_title: bool,
    pub default: bool,
    pub required: bool,
    pub is_enum: bool,
    pub is_multi_value: bool,
    pub value: String,
    pub locked: bool,
    pub description: String,
}

impl PropertyCreateParams {
    pub fn new(name: impl Into<String>, display_name: impl Into<String>, data_type: Value) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            data_type,
            ..Default::default()
        }
    }

    /// Replaces the data type with the serialized form of `data_type`.
    pub fn set_data_type<T: Serialize>(&mut self, data_type: &T) -> serde_json::Result<()> {
        self.data_type = serde_json::to_value(data_type)?;
        Ok(())
    }
}

/// Record changes for a single model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordChanges {
    #[serde(default)]
    pub delete: Vec<InstanceId>,
    #[serde(default)]
    pub create: Vec<RecordCreate>,
    #[serde(default)]
    pub update: Vec<RecordUpdate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordValue {
    pub name: String,
    pub value: Value,
}

impl RecordValue {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Payload of the record create and record update calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordValues {
    pub values: Vec<RecordValue>,
}

impl FromIterator<RecordValue> for RecordValues {
    fn from_iter<I: IntoIterator<Item = RecordValue>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// A record to create. The external id is not sent; it is the key under
/// which the new instance id is stored for links and proxies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordCreate {
    pub external_id: ExternalId,
    #[serde(flatten)]
    pub values: RecordValues,
}

/// A record to update. Carries both changed and unchanged values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordUpdate {
    #[serde(rename = "pennsieve_id")]
    pub instance_id: InstanceId,
    #[serde(flatten)]
    pub values: RecordValues,
}
