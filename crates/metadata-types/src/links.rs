//! Linked-property changes.
//!
//! A linked property connects records of a *from* model to records of a
//! *to* model. Both the schema entry and its instances may refer to models
//! and records that do not exist when the changeset is produced, so they are
//! expressed in model names and external ids and resolved at apply time.

use serde::{Deserialize, Serialize};

use crate::ids::{ExternalId, InstanceId, SchemaId};

/// Changes for one linked property between two models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedPropertyChanges {
    pub from_model_name: String,
    pub to_model_name: String,
    /// Schema id of the linked property when it already exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SchemaId>,
    /// Present when the linked property must be added to the from model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<SchemaLinkedPropertyCreate>,
    #[serde(default)]
    pub instances: InstanceChanges,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaLinkedPropertyCreate {
    pub name: String,
    pub display_name: String,
    pub position: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceChanges {
    #[serde(default)]
    pub create: Vec<InstanceLinkedPropertyCreate>,
    #[serde(default)]
    pub delete: Vec<InstanceLinkedPropertyDelete>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceLinkedPropertyCreate {
    pub from_external_id: ExternalId,
    pub to_external_id: ExternalId,
}

/// Identifies an existing link instance. Both ids are already known, so no
/// record lookup is needed to delete it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceLinkedPropertyDelete {
    pub from_record_id: InstanceId,
    pub instance_linked_property_id: InstanceId,
}
