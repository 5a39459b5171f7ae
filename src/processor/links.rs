//! Linked property operations.

use metadata_client::{CreateLinkInstanceBody, CreateLinkSchemaBody, MetadataClient};
use metadata_types::{DatasetId, LinkedPropertyChanges, SchemaId};

use super::ApplySummary;
use crate::error::{ProcessorError, Result};
use crate::id_store::IdStore;

/// Link instance deletes. Both instance ids are carried on the change; only
/// the from model needs resolving.
pub(super) async fn delete_link_instances(
    client: &dyn MetadataClient,
    dataset_id: &DatasetId,
    changes: &[LinkedPropertyChanges],
    store: &IdStore,
    summary: &mut ApplySummary,
) -> Result<()> {
    for change in changes.iter().filter(|c| !c.instances.delete.is_empty()) {
        let model_id = store.model_id(&change.from_model_name)?;
        for delete in &change.instances.delete {
            client
                .delete_link_instance(
                    dataset_id,
                    &model_id,
                    &delete.from_record_id,
                    &delete.instance_linked_property_id,
                )
                .await
                .map_err(|e| {
                    ProcessorError::remote(
                        format!(
                            "failed to delete link instance {} from record {} of model '{}'",
                            delete.instance_linked_property_id,
                            delete.from_record_id,
                            change.from_model_name
                        ),
                        e,
                    )
                })?;
            summary.link_instances_deleted += 1;
        }
        tracing::info!(
            from_model = %change.from_model_name,
            to_model = %change.to_model_name,
            count = change.instances.delete.len(),
            "deleted link instances"
        );
    }
    Ok(())
}

/// Per change: create the link schema when requested, then its instances.
pub(super) async fn apply_link_changes(
    client: &dyn MetadataClient,
    dataset_id: &DatasetId,
    changes: &[LinkedPropertyChanges],
    store: &IdStore,
    summary: &mut ApplySummary,
) -> Result<()> {
    for change in changes {
        if change.create.is_none() && change.instances.create.is_empty() {
            continue;
        }

        let from_model_id = store.model_id(&change.from_model_name)?;
        let to_model_id = store.model_id(&change.to_model_name)?;
        let link_schema_id =
            link_schema_id(client, dataset_id, change, &from_model_id, &to_model_id, summary)
                .await?;

        for create in &change.instances.create {
            let from_record_id = store.record_id(&from_model_id, &create.from_external_id)?;
            let to_record_id = store.record_id(&to_model_id, &create.to_external_id)?;

            let body = CreateLinkInstanceBody {
                schema_linked_property_id: link_schema_id.clone(),
                to: to_record_id,
            };
            client
                .create_link_instance(dataset_id, &from_model_id, &from_record_id, &body)
                .await
                .map_err(|e| {
                    ProcessorError::remote(
                        format!(
                            "failed to link record '{}' of '{}' to record '{}' of '{}'",
                            create.from_external_id,
                            change.from_model_name,
                            create.to_external_id,
                            change.to_model_name
                        ),
                        e,
                    )
                })?;
            summary.link_instances_created += 1;
        }

        if !change.instances.create.is_empty() {
            tracing::info!(
                from_model = %change.from_model_name,
                to_model = %change.to_model_name,
                link_schema_id = %link_schema_id,
                count = change.instances.create.len(),
                "created link instances"
            );
        }
    }
    Ok(())
}

async fn link_schema_id(
    client: &dyn MetadataClient,
    dataset_id: &DatasetId,
    change: &LinkedPropertyChanges,
    from_model_id: &SchemaId,
    to_model_id: &SchemaId,
    summary: &mut ApplySummary,
) -> Result<SchemaId> {
    let Some(create) = &change.create else {
        return change.id.clone().ok_or_else(|| {
            ProcessorError::InvalidChangeset(format!(
                "linked property from '{}' to '{}' has neither an id nor a create",
                change.from_model_name, change.to_model_name
            ))
        });
    };

    let body = CreateLinkSchemaBody {
        name: create.name.clone(),
        display_name: create.display_name.clone(),
        to: to_model_id.clone(),
        position: create.position,
    };
    let id = client
        .create_link_schema(dataset_id, from_model_id, &body)
        .await
        .map_err(|e| {
            ProcessorError::remote(
                format!(
                    "failed to create linked property '{}' from '{}' to '{}'",
                    create.name, change.from_model_name, change.to_model_name
                ),
                e,
            )
        })?;
    summary.link_schemas_created += 1;
    tracing::info!(
        link_name = %create.name,
        from_model = %change.from_model_name,
        link_schema_id = %id,
        "created linked property"
    );
    Ok(id)
}
