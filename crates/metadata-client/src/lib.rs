//! Client for the remote metadata service.
//!
//! The post-processor only talks to [`MetadataClient`]. [`HttpClient`] is the
//! production implementation; `RecordingClient` (feature `recording`) keeps
//! everything in memory and records each call for tests.

pub mod error;
pub mod http;
#[cfg(feature = "recording")]
pub mod recording;
pub mod wire;

use std::fmt;

use async_trait::async_trait;
use metadata_types::{
    DatasetId, InstanceId, ModelCreateParams, PropertyCreateParams, RecordValues, SchemaId,
};

pub use error::ClientError;
pub use http::{HttpClient, HttpClientConfig};
#[cfg(feature = "recording")]
pub use recording::{Call, RecordingClient};
pub use wire::{
    BulkDeleteResponse, CreateLinkInstanceBody, CreateLinkSchemaBody, CreateProxyInstanceBody,
    CreateProxyRelationshipSchemaBody, DeleteProxyInstancesBody, Integration,
};

pub type Result<T> = std::result::Result<T, ClientError>;

#[async_trait]
pub trait MetadataClient: Send + Sync {
    /// Look up the integration that started this run.
    async fn get_integration(&self, integration_id: &str) -> Result<Integration>;

    // ── Models and records ─────────────────────────────────────────

    async fn create_model(&self, dataset_id: &DatasetId, model: &ModelCreateParams)
        -> Result<SchemaId>;

    /// Returns the ids of the new properties.
    async fn create_properties(
        &self,
        dataset_id: &DatasetId,
        model_id: &SchemaId,
        properties: &[PropertyCreateParams],
    ) -> Result<Vec<String>>;

    async fn create_record(
        &self,
        dataset_id: &DatasetId,
        model_id: &SchemaId,
        values: &RecordValues,
    ) -> Result<InstanceId>;

    async fn update_record(
        &self,
        dataset_id: &DatasetId,
        model_id: &SchemaId,
        record_id: &InstanceId,
        values: &RecordValues,
    ) -> Result<InstanceId>;

    /// Bulk delete. A response with failures is still `Ok`; the caller
    /// decides what a partial delete means.
    async fn delete_records(
        &self,
        dataset_id: &DatasetId,
        model_id: &SchemaId,
        record_ids: &[InstanceId],
    ) -> Result<BulkDeleteResponse>;

    async fn delete_model(&self, dataset_id: &DatasetId, model_id: &SchemaId) -> Result<()>;

    // ── Linked properties ──────────────────────────────────────────

    async fn create_link_schema(
        &self,
        dataset_id: &DatasetId,
        from_model_id: &SchemaId,
        body: &CreateLinkSchemaBody,
    ) -> Result<SchemaId>;

    async fn create_link_instance(
        &self,
        dataset_id: &DatasetId,
        from_model_id: &SchemaId,
        from_record_id: &InstanceId,
        body: &CreateLinkInstanceBody,
    ) -> Result<InstanceId>;

    async fn delete_link_instance(
        &self,
        dataset_id: &DatasetId,
        model_id: &SchemaId,
        from_record_id: &InstanceId,
        link_instance_id: &InstanceId,
    ) -> Result<()>;

    // ── Package proxies ────────────────────────────────────────────

    async fn create_proxy_relationship_schema(&self, dataset_id: &DatasetId) -> Result<SchemaId>;

    async fn create_proxy_instance(
        &self,
        dataset_id: &DatasetId,
        body: &CreateProxyInstanceBody,
    ) -> Result<()>;

    async fn delete_proxy_instances(
        &self,
        dataset_id: &DatasetId,
        body: &DeleteProxyInstancesBody,
    ) -> Result<()>;
}

/// One kind of remote call. Used in errors and by the recording client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetIntegration,
    CreateModel,
    CreateProperties,
    CreateRecord,
    UpdateRecord,
    DeleteRecords,
    DeleteModel,
    CreateLinkSchema,
    CreateLinkInstance,
    DeleteLinkInstance,
    CreateProxyRelationshipSchema,
    CreateProxyInstance,
    DeleteProxyInstances,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GetIntegration => "get integration",
            Self::CreateModel => "create model",
            Self::CreateProperties => "create properties",
            Self::CreateRecord => "create record",
            Self::UpdateRecord => "update record",
            Self::DeleteRecords => "delete records",
            Self::DeleteModel => "delete model",
            Self::CreateLinkSchema => "create link schema",
            Self::CreateLinkInstance => "create link instance",
            Self::DeleteLinkInstance => "delete link instance",
            Self::CreateProxyRelationshipSchema => "create proxy relationship schema",
            Self::CreateProxyInstance => "create proxy instance",
            Self::DeleteProxyInstances => "delete proxy instances",
        }
    }

    pub fn is_delete(self) -> bool {
        matches!(
            self,
            Self::DeleteRecords
                | Self::DeleteModel
                | Self::DeleteLinkInstance
                | Self::DeleteProxyInstances
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
