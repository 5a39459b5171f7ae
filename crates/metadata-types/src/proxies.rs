//! Package proxy changes.

use serde::{Deserialize, Serialize};

use crate::ids::{ExternalId, InstanceId};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProxyChanges {
    /// Set only for datasets that do not have the `belongs_to` proxy
    /// relationship schema yet.
    #[serde(default)]
    pub create_proxy_relationship_schema: bool,
    #[serde(default)]
    pub record_changes: Vec<ProxyRecordChanges>,
}

/// Proxy changes targeting one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyRecordChanges {
    pub model_name: String,
    pub record_external_id: ExternalId,
    /// Package node ids to attach to the record.
    #[serde(default)]
    pub node_id_creates: Vec<String>,
    /// Proxy instances to detach from the record.
    #[serde(default)]
    pub instance_id_deletes: Vec<InstanceId>,
}
