//! Package proxy operations.

use metadata_client::{CreateProxyInstanceBody, DeleteProxyInstancesBody, MetadataClient};
use metadata_types::{DatasetId, ProxyChanges};

use super::ApplySummary;
use crate::error::{ProcessorError, Result};
use crate::id_store::IdStore;

pub(super) async fn delete_proxy_instances(
    client: &dyn MetadataClient,
    dataset_id: &DatasetId,
    proxies: &ProxyChanges,
    store: &IdStore,
    summary: &mut ApplySummary,
) -> Result<()> {
    for change in proxies
        .record_changes
        .iter()
        .filter(|c| !c.instance_id_deletes.is_empty())
    {
        let record_id =
            store.record_id_by_model_name(&change.model_name, &change.record_external_id)?;
        let count = change.instance_id_deletes.len();

        let body = DeleteProxyInstancesBody::new(record_id, change.instance_id_deletes.clone());
        client
            .delete_proxy_instances(dataset_id, &body)
            .await
            .map_err(|e| {
                ProcessorError::remote(
                    format!(
                        "failed to delete {count} proxy instances of record '{}' in model '{}'",
                        change.record_external_id, change.model_name
                    ),
                    e,
                )
            })?;
        summary.proxy_instances_deleted += count;
        tracing::info!(
            model_name = %change.model_name,
            record_id = %body.source_record_id,
            count,
            "deleted proxy instances"
        );
    }
    Ok(())
}

/// The relationship schema when requested, then one proxy instance per
/// package node id.
pub(super) async fn create_proxies(
    client: &dyn MetadataClient,
    dataset_id: &DatasetId,
    proxies: &ProxyChanges,
    store: &IdStore,
    summary: &mut ApplySummary,
) -> Result<()> {
    if proxies.create_proxy_relationship_schema {
        let schema_id = client
            .create_proxy_relationship_schema(dataset_id)
            .await
            .map_err(|e| {
                ProcessorError::remote("failed to create proxy relationship schema", e)
            })?;
        summary.proxy_schema_created = true;
        tracing::info!(schema_id = %schema_id, "created proxy relationship schema");
    }

    for change in proxies
        .record_changes
        .iter()
        .filter(|c| !c.node_id_creates.is_empty())
    {
        let record_id =
            store.record_id_by_model_name(&change.model_name, &change.record_external_id)?;

        for node_id in &change.node_id_creates {
            let body = CreateProxyInstanceBody::new(record_id.clone(), node_id.as_str());
            client
                .create_proxy_instance(dataset_id, &body)
                .await
                .map_err(|e| {
                    ProcessorError::remote(
                        format!(
                            "failed to attach package {node_id} to record '{}' in model '{}'",
                            change.record_external_id, change.model_name
                        ),
                        e,
                    )
                })?;
            summary.proxy_instances_created += 1;
        }
        tracing::info!(
            model_name = %change.model_name,
            record_id = %record_id,
            count = change.node_id_creates.len(),
            "created proxy instances"
        );
    }
    Ok(())
}
