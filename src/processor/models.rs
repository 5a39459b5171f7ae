//! Model and record operations.

use metadata_client::MetadataClient;
use metadata_types::{
    DatasetId, InstanceId, ModelChanges, ModelCreate, ModelDelete, ModelUpdate, RecordCreate,
    SchemaId,
};

use super::ApplySummary;
use crate::error::{ProcessorError, Result};
use crate::id_store::IdStore;

// ── Deletes ────────────────────────────────────────────────────────

/// Record deletes of every model update, then of every model delete.
pub(super) async fn delete_records(
    client: &dyn MetadataClient,
    dataset_id: &DatasetId,
    models: &ModelChanges,
    summary: &mut ApplySummary,
) -> Result<()> {
    let batches = models
        .updates
        .iter()
        .map(|update| (&update.id, &update.records.delete))
        .chain(models.deletes.iter().map(|delete| (&delete.id, &delete.records)));

    for (model_id, record_ids) in batches {
        bulk_delete_records(client, dataset_id, model_id, record_ids, summary).await?;
    }
    Ok(())
}

/// One bulk call per model. A response listing any failed id fails the run
/// with every failure attached.
async fn bulk_delete_records(
    client: &dyn MetadataClient,
    dataset_id: &DatasetId,
    model_id: &SchemaId,
    record_ids: &[InstanceId],
    summary: &mut ApplySummary,
) -> Result<()> {
    if record_ids.is_empty() {
        return Ok(());
    }

    let response = client
        .delete_records(dataset_id, model_id, record_ids)
        .await
        .map_err(|e| {
            ProcessorError::remote(
                format!(
                    "failed to delete {} records of model {model_id}",
                    record_ids.len()
                ),
                e,
            )
        })?;

    if response.has_failures() {
        tracing::error!(
            model_id = %model_id,
            attempted = record_ids.len(),
            failed = response.errors.len(),
            "bulk record delete partially failed"
        );
        return Err(ProcessorError::PartialBulkFailure {
            model_id: model_id.clone(),
            attempted: record_ids.len(),
            failures: response.errors,
        });
    }

    summary.records_deleted += record_ids.len();
    tracing::info!(model_id = %model_id, count = record_ids.len(), "deleted records");
    Ok(())
}

pub(super) async fn delete_models(
    client: &dyn MetadataClient,
    dataset_id: &DatasetId,
    deletes: &[ModelDelete],
    summary: &mut ApplySummary,
) -> Result<()> {
    for delete in deletes {
        client
            .delete_model(dataset_id, &delete.id)
            .await
            .map_err(|e| {
                ProcessorError::remote(format!("failed to delete model {}", delete.id), e)
            })?;
        summary.models_deleted += 1;
        tracing::info!(model_id = %delete.id, "deleted model");
    }
    Ok(())
}

// ── Creates and updates ────────────────────────────────────────────

pub(super) async fn create_models(
    client: &dyn MetadataClient,
    dataset_id: &DatasetId,
    creates: &[ModelCreate],
    store: &mut IdStore,
    summary: &mut ApplySummary,
) -> Result<()> {
    for create in creates {
        let name = create.name();
        store.ensure_model_unmapped(name)?;
        let model_id = client
            .create_model(dataset_id, &create.create.model)
            .await
            .map_err(|e| {
                ProcessorError::remote(format!("failed to create model '{name}'"), e)
            })?;
        summary.models_created += 1;
        tracing::info!(model_name = %name, model_id = %model_id, "created model");

        let properties = &create.create.properties;
        if !properties.is_empty() {
            client
                .create_properties(dataset_id, &model_id, properties)
                .await
                .map_err(|e| {
                    ProcessorError::remote(
                        format!(
                            "model '{name}' was created as {model_id} but its properties were not"
                        ),
                        e,
                    )
                })?;
            tracing::debug!(model_id = %model_id, count = properties.len(), "created properties");
        }

        store.add_model(name, model_id.clone())?;

        for record in &create.records {
            create_record(client, dataset_id, &model_id, record, store, summary).await?;
        }
    }
    Ok(())
}

/// Record creates and updates in models that already exist. Record deletes
/// of these models ran in the delete phase.
pub(super) async fn update_models(
    client: &dyn MetadataClient,
    dataset_id: &DatasetId,
    updates: &[ModelUpdate],
    store: &mut IdStore,
    summary: &mut ApplySummary,
) -> Result<()> {
    for update in updates {
        for record in &update.records.create {
            create_record(client, dataset_id, &update.id, record, store, summary).await?;
        }

        for record in &update.records.update {
            client
                .update_record(dataset_id, &update.id, &record.instance_id, &record.values)
                .await
                .map_err(|e| {
                    ProcessorError::remote(
                        format!(
                            "failed to update record {} of model {}",
                            record.instance_id, update.id
                        ),
                        e,
                    )
                })?;
            summary.records_updated += 1;
        }

        tracing::info!(
            model_id = %update.id,
            created = update.records.create.len(),
            updated = update.records.update.len(),
            "updated model records"
        );
    }
    Ok(())
}

async fn create_record(
    client: &dyn MetadataClient,
    dataset_id: &DatasetId,
    model_id: &SchemaId,
    record: &RecordCreate,
    store: &mut IdStore,
    summary: &mut ApplySummary,
) -> Result<()> {
    store.ensure_record_unmapped(model_id, &record.external_id)?;
    let instance_id = client
        .create_record(dataset_id, model_id, &record.values)
        .await
        .map_err(|e| {
            ProcessorError::remote(
                format!(
                    "failed to create record '{}' in model {model_id}",
                    record.external_id
                ),
                e,
            )
        })?;
    summary.records_created += 1;
    store.add_record(model_id.clone(), record.external_id.clone(), instance_id)?;
    Ok(())
}
