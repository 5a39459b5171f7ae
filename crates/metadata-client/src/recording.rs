//! In-memory [`MetadataClient`] that records every call.
//!
//! Ids are generated deterministically (`schema-1`, `instance-1`, ...) in
//! call order, so tests can predict them. Individual operations can be
//! scripted to fail, and bulk record deletes can report per-id failures.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use metadata_types::{
    DatasetId, InstanceId, ModelCreateParams, PropertyCreateParams, RecordValues, SchemaId,
};

use crate::wire::{
    BulkDeleteResponse, CreateLinkInstanceBody, CreateLinkSchemaBody, CreateProxyInstanceBody,
    DeleteProxyInstancesBody, Integration,
};
use crate::{ClientError, MetadataClient, Operation, Result};

/// One recorded call, with its inputs and the id handed back (if any).
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetIntegration {
        integration_id: String,
    },
    CreateModel {
        dataset_id: DatasetId,
        name: String,
        returned: SchemaId,
    },
    CreateProperties {
        model_id: SchemaId,
        names: Vec<String>,
    },
    CreateRecord {
        model_id: SchemaId,
        values: RecordValues,
        returned: InstanceId,
    },
    UpdateRecord {
        model_id: SchemaId,
        record_id: InstanceId,
        values: RecordValues,
    },
    DeleteRecords {
        model_id: SchemaId,
        record_ids: Vec<InstanceId>,
    },
    DeleteModel {
        model_id: SchemaId,
    },
    CreateLinkSchema {
        from_model_id: SchemaId,
        body: CreateLinkSchemaBody,
        returned: SchemaId,
    },
    CreateLinkInstance {
        from_model_id: SchemaId,
        from_record_id: InstanceId,
        body: CreateLinkInstanceBody,
        returned: InstanceId,
    },
    DeleteLinkInstance {
        model_id: SchemaId,
        from_record_id: InstanceId,
        link_instance_id: InstanceId,
    },
    CreateProxyRelationshipSchema {
        returned: SchemaId,
    },
    CreateProxyInstance {
        body: CreateProxyInstanceBody,
    },
    DeleteProxyInstances {
        body: DeleteProxyInstancesBody,
    },
}

impl Call {
    pub fn operation(&self) -> Operation {
        match self {
            Self::GetIntegration { .. } => Operation::GetIntegration,
            Self::CreateModel { .. } => Operation::CreateModel,
            Self::CreateProperties { .. } => Operation::CreateProperties,
            Self::CreateRecord { .. } => Operation::CreateRecord,
            Self::UpdateRecord { .. } => Operation::UpdateRecord,
            Self::DeleteRecords { .. } => Operation::DeleteRecords,
            Self::DeleteModel { .. } => Operation::DeleteModel,
            Self::CreateLinkSchema { .. } => Operation::CreateLinkSchema,
            Self::CreateLinkInstance { .. } => Operation::CreateLinkInstance,
            Self::DeleteLinkInstance { .. } => Operation::DeleteLinkInstance,
            Self::CreateProxyRelationshipSchema { .. } => Operation::CreateProxyRelationshipSchema,
            Self::CreateProxyInstance { .. } => Operation::CreateProxyInstance,
            Self::DeleteProxyInstances { .. } => Operation::DeleteProxyInstances,
        }
    }
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    next_schema: u64,
    next_instance: u64,
    failures: HashMap<Operation, String>,
    record_delete_failures: HashMap<InstanceId, String>,
}

impl State {
    fn schema_id(&mut self) -> SchemaId {
        self.next_schema += 1;
        SchemaId::new(format!("schema-{}", self.next_schema))
    }

    fn instance_id(&mut self) -> InstanceId {
        self.next_instance += 1;
        InstanceId::new(format!("instance-{}", self.next_instance))
    }

    fn check(&self, operation: Operation) -> Result<()> {
        match self.failures.get(&operation) {
            Some(message) => Err(ClientError::Rejected {
                operation,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

pub struct RecordingClient {
    dataset_id: DatasetId,
    state: Mutex<State>,
}

impl Default for RecordingClient {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::with_dataset(DatasetId::from("N:dataset:recording"))
    }

    /// The dataset returned by `get_integration`.
    pub fn with_dataset(dataset_id: DatasetId) -> Self {
        Self {
            dataset_id,
            state: Mutex::new(State::default()),
        }
    }

    /// Every later call of `operation` is recorded and then rejected.
    pub fn fail(&self, operation: Operation, message: impl Into<String>) {
        self.lock().failures.insert(operation, message.into());
    }

    /// Bulk record deletes report `record_id` as failed with `message`.
    pub fn fail_record_delete(&self, record_id: InstanceId, message: impl Into<String>) {
        self.lock()
            .record_delete_failures
            .insert(record_id, message.into());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn operations(&self) -> Vec<Operation> {
        self.lock().calls.iter().map(Call::operation).collect()
    }

    pub fn calls_of(&self, operation: Operation) -> Vec<Call> {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.operation() == operation)
            .cloned()
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl MetadataClient for RecordingClient {
    async fn get_integration(&self, integration_id: &str) -> Result<Integration> {
        let mut state = self.lock();
        state.calls.push(Call::GetIntegration {
            integration_id: integration_id.to_string(),
        });
        state.check(Operation::GetIntegration)?;
        Ok(Integration {
            uuid: integration_id.to_string(),
            application_id: 0,
            dataset_node_id: self.dataset_id.clone(),
        })
    }

    async fn create_model(
        &self,
        dataset_id: &DatasetId,
        model: &ModelCreateParams,
    ) -> Result<SchemaId> {
        let mut state = self.lock();
        let returned = state.schema_id();
        state.calls.push(Call::CreateModel {
            dataset_id: dataset_id.clone(),
            name: model.name.clone(),
            returned: returned.clone(),
        });
        state.check(Operation::CreateModel)?;
        Ok(returned)
    }

    async fn create_properties(
        &self,
        _dataset_id: &DatasetId,
        model_id: &SchemaId,
        properties: &[PropertyCreateParams],
    ) -> Result<Vec<String>> {
        let mut state = self.lock();
        let names: Vec<String> = properties.iter().map(|p| p.name.clone()).collect();
        state.calls.push(Call::CreateProperties {
            model_id: model_id.clone(),
            names: names.clone(),
        });
        state.check(Operation::CreateProperties)?;
        Ok(names.iter().map(|name| format!("{model_id}.{name}")).collect())
    }

    async fn create_record(
        &self,
        _dataset_id: &DatasetId,
        model_id: &SchemaId,
        values: &RecordValues,
    ) -> Result<InstanceId> {
        let mut state = self.lock();
        let returned = state.instance_id();
        state.calls.push(Call::CreateRecord {
            model_id: model_id.clone(),
            values: values.clone(),
            returned: returned.clone(),
        });
        state.check(Operation::CreateRecord)?;
        Ok(returned)
    }

    async fn update_record(
        &self,
        _dataset_id: &DatasetId,
        model_id: &SchemaId,
        record_id: &InstanceId,
        values: &RecordValues,
    ) -> Result<InstanceId> {
        let mut state = self.lock();
        state.calls.push(Call::UpdateRecord {
            model_id: model_id.clone(),
            record_id: record_id.clone(),
            values: values.clone(),
        });
        state.check(Operation::UpdateRecord)?;
        Ok(record_id.clone())
    }

    async fn delete_records(
        &self,
        _dataset_id: &DatasetId,
        model_id: &SchemaId,
        record_ids: &[InstanceId],
    ) -> Result<BulkDeleteResponse> {
        let mut state = self.lock();
        state.calls.push(Call::DeleteRecords {
            model_id: model_id.clone(),
            record_ids: record_ids.to_vec(),
        });
        state.check(Operation::DeleteRecords)?;

        let failed: HashSet<&InstanceId> = record_ids
            .iter()
            .filter(|id| state.record_delete_failures.contains_key(*id))
            .collect();
        let response = BulkDeleteResponse {
            success: record_ids
                .iter()
                .filter(|id| !failed.contains(id))
                .cloned()
                .collect(),
            errors: record_ids
                .iter()
                .filter_map(|id| {
                    state
                        .record_delete_failures
                        .get(id)
                        .map(|message| (id.clone(), message.clone()))
                })
                .collect(),
        };
        Ok(response)
    }

    async fn delete_model(&self, _dataset_id: &DatasetId, model_id: &SchemaId) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(Call::DeleteModel {
            model_id: model_id.clone(),
        });
        state.check(Operation::DeleteModel)
    }

    async fn create_link_schema(
        &self,
        _dataset_id: &DatasetId,
        from_model_id: &SchemaId,
        body: &CreateLinkSchemaBody,
    ) -> Result<SchemaId> {
        let mut state = self.lock();
        let returned = state.schema_id();
        state.calls.push(Call::CreateLinkSchema {
            from_model_id: from_model_id.clone(),
            body: body.clone(),
            returned: returned.clone(),
        });
        state.check(Operation::CreateLinkSchema)?;
        Ok(returned)
    }

    async fn create_link_instance(
        &self,
        _dataset_id: &DatasetId,
        from_model_id: &SchemaId,
        from_record_id: &InstanceId,
        body: &CreateLinkInstanceBody,
    ) -> Result<InstanceId> {
        let mut state = self.lock();
        let returned = state.instance_id();
        state.calls.push(Call::CreateLinkInstance {
            from_model_id: from_model_id.clone(),
            from_record_id: from_record_id.clone(),
            body: body.clone(),
            returned: returned.clone(),
        });
        state.check(Operation::CreateLinkInstance)?;
        Ok(returned)
    }

    async fn delete_link_instance(
        &self,
        _dataset_id: &DatasetId,
        model_id: &SchemaId,
        from_record_id: &InstanceId,
        link_instance_id: &InstanceId,
    ) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(Call::DeleteLinkInstance {
            model_id: model_id.clone(),
            from_record_id: from_record_id.clone(),
            link_instance_id: link_instance_id.clone(),
        });
        state.check(Operation::DeleteLinkInstance)
    }

    async fn create_proxy_relationship_schema(&self, _dataset_id: &DatasetId) -> Result<SchemaId> {
        let mut state = self.lock();
        let returned = state.schema_id();
        state.calls.push(Call::CreateProxyRelationshipSchema {
            returned: returned.clone(),
        });
        state.check(Operation::CreateProxyRelationshipSchema)?;
        Ok(returned)
    }

    async fn create_proxy_instance(
        &self,
        _dataset_id: &DatasetId,
        body: &CreateProxyInstanceBody,
    ) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(Call::CreateProxyInstance { body: body.clone() });
        state.check(Operation::CreateProxyInstance)
    }

    async fn delete_proxy_instances(
        &self,
        _dataset_id: &DatasetId,
        body: &DeleteProxyInstancesBody,
    ) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(Call::DeleteProxyInstances { body: body.clone() });
        state.check(Operation::DeleteProxyInstances)
    }
}
