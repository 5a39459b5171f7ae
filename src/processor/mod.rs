//! Changeset application.
//!
//! [`MetadataPostProcessor`] walks [`Phase::ORDER`] against one dataset,
//! resolving every name and external id through the [`IdStore`] before the
//! remote call that needs it. The first error aborts the run; whatever was
//! applied before it stays applied.

mod links;
mod models;
mod proxies;

use std::sync::Arc;

use metadata_client::MetadataClient;
use metadata_types::{Dataset, DatasetId};

use crate::changeset;
use crate::config::ProcessorConfig;
use crate::error::{ProcessorError, Result};
use crate::id_store::IdStore;
use crate::phase::Phase;

/// Counts of the remote operations a run performed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplySummary {
    pub models_created: usize,
    pub models_deleted: usize,
    pub records_created: usize,
    pub records_updated: usize,
    pub records_deleted: usize,
    pub link_schemas_created: usize,
    pub link_instances_created: usize,
    pub link_instances_deleted: usize,
    pub proxy_schema_created: bool,
    pub proxy_instances_created: usize,
    pub proxy_instances_deleted: usize,
}

impl ApplySummary {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

pub struct MetadataPostProcessor {
    client: Arc<dyn MetadataClient>,
}

impl MetadataPostProcessor {
    pub fn new(client: Arc<dyn MetadataClient>) -> Self {
        Self { client }
    }

    /// Full run: look up the integration's dataset, read the changeset from
    /// the output directory and apply it.
    pub async fn run(&self, config: &ProcessorConfig) -> Result<ApplySummary> {
        let integration = self
            .client
            .get_integration(&config.integration_id)
            .await
            .map_err(|e| {
                ProcessorError::remote(
                    format!("failed to look up integration {}", config.integration_id),
                    e,
                )
            })?;
        let dataset_id = integration.dataset_node_id;
        tracing::info!(
            integration_id = %config.integration_id,
            dataset_id = %dataset_id,
            "resolved integration"
        );

        let path = config.changeset_path();
        let changeset = changeset::read_changeset(&path)?;
        if changeset.is_empty() {
            tracing::info!(path = %path.display(), "changeset has no changes");
        }

        self.apply_changeset(&dataset_id, &changeset).await
    }

    /// Seeds a fresh store from the changeset and applies it.
    pub async fn apply_changeset(
        &self,
        dataset_id: &DatasetId,
        changeset: &Dataset,
    ) -> Result<ApplySummary> {
        let mut store = Self::seed_store(changeset)?;
        self.apply(dataset_id, changeset, &mut store).await
    }

    /// Store seeded with everything resolvable before the delete phase: all
    /// pre-existing models and the record maps of those models. Record maps
    /// of models created in this run are loaded later by
    /// [`Phase::RecordIdSeeding`].
    pub fn seed_store(changeset: &Dataset) -> Result<IdStore> {
        let mut store = IdStore::new();
        store.add_models(&changeset.existing_model_id_map)?;
        let loaded = store.add_resolvable_record_id_maps(&changeset.record_id_maps)?;
        tracing::debug!(
            models = store.model_count(),
            record_maps = loaded,
            "seeded identifier store"
        );
        Ok(store)
    }

    /// Runs every phase in order against `store`, which must already hold
    /// the pre-existing models (see [`Self::seed_store`]).
    pub async fn apply(
        &self,
        dataset_id: &DatasetId,
        changeset: &Dataset,
        store: &mut IdStore,
    ) -> Result<ApplySummary> {
        let mut summary = ApplySummary::default();
        for phase in Phase::ORDER {
            tracing::info!(phase = %phase, "starting phase");
            self.run_phase(phase, dataset_id, changeset, store, &mut summary)
                .await?;
        }
        tracing::info!(dataset_id = %dataset_id, "changeset applied");
        Ok(summary)
    }

    /// Runs a single phase.
    pub async fn run_phase(
        &self,
        phase: Phase,
        dataset_id: &DatasetId,
        changeset: &Dataset,
        store: &mut IdStore,
        summary: &mut ApplySummary,
    ) -> Result<()> {
        let client = self.client.as_ref();
        match phase {
            Phase::LinkInstanceDeletes => {
                links::delete_link_instances(
                    client,
                    dataset_id,
                    &changeset.linked_properties,
                    store,
                    summary,
                )
                .await
            }
            Phase::ProxyInstanceDeletes => match &changeset.proxies {
                Some(proxies) => {
                    proxies::delete_proxy_instances(client, dataset_id, proxies, store, summary)
                        .await
                }
                None => Ok(()),
            },
            Phase::RecordDeletes => {
                models::delete_records(client, dataset_id, &changeset.models, summary).await
            }
            Phase::ModelDeletes => {
                models::delete_models(client, dataset_id, &changeset.models.deletes, summary).await
            }
            Phase::ModelCreates => {
                models::create_models(
                    client,
                    dataset_id,
                    &changeset.models.creates,
                    store,
                    summary,
                )
                .await
            }
            Phase::ModelUpdates => {
                models::update_models(
                    client,
                    dataset_id,
                    &changeset.models.updates,
                    store,
                    summary,
                )
                .await
            }
            Phase::RecordIdSeeding => {
                store.add_record_id_maps(&changeset.record_id_maps)?;
                Ok(())
            }
            Phase::LinkChanges => {
                links::apply_link_changes(
                    client,
                    dataset_id,
                    &changeset.linked_properties,
                    store,
                    summary,
                )
                .await
            }
            Phase::ProxyChanges => match &changeset.proxies {
                Some(proxies) => {
                    proxies::create_proxies(client, dataset_id, proxies, store, summary).await
                }
                None => Ok(()),
            },
        }
    }
}
