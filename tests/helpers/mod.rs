//! Changeset builders shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use metadata_client::RecordingClient;
use metadata_types::{
    Dataset, DatasetId, ExternalId, InstanceChanges, InstanceId, InstanceLinkedPropertyCreate,
    InstanceLinkedPropertyDelete, LinkedPropertyChanges, ModelCreate, ModelCreateParams,
    ModelPropsCreate, PropertyCreateParams, ProxyRecordChanges, RecordCreate, RecordValue,
    RecordValues, SchemaId, SchemaLinkedPropertyCreate,
};
use post_metadata::MetadataPostProcessor;
use serde_json::json;

pub fn new_dataset_id() -> DatasetId {
    DatasetId::new(format!("N:dataset:{}", uuid::Uuid::new_v4()))
}

pub fn processor() -> (Arc<RecordingClient>, MetadataPostProcessor) {
    let client = Arc::new(RecordingClient::new());
    let processor = MetadataPostProcessor::new(client.clone());
    (client, processor)
}

pub fn record(external_id: &str, name: &str) -> RecordCreate {
    RecordCreate {
        external_id: ExternalId::from(external_id),
        values: RecordValues::from_iter([RecordValue::new("name", name)]),
    }
}

pub fn model_create(name: &str, records: Vec<RecordCreate>) -> ModelCreate {
    ModelCreate {
        create: ModelPropsCreate {
            model: ModelCreateParams {
                name: name.to_string(),
                display_name: name.to_string(),
                ..Default::default()
            },
            properties: vec![PropertyCreateParams::new("name", "Name", json!("String"))],
        },
        records,
    }
}

pub fn link_create(from: &str, to: &str, name: &str, position: i32) -> LinkedPropertyChanges {
    LinkedPropertyChanges {
        from_model_name: from.to_string(),
        to_model_name: to.to_string(),
        id: None,
        create: Some(SchemaLinkedPropertyCreate {
            name: name.to_string(),
            display_name: name.to_string(),
            position,
        }),
        instances: InstanceChanges::default(),
    }
}

pub fn existing_link(from: &str, to: &str, id: &str) -> LinkedPropertyChanges {
    LinkedPropertyChanges {
        from_model_name: from.to_string(),
        to_model_name: to.to_string(),
        id: Some(SchemaId::from(id)),
        create: None,
        instances: InstanceChanges::default(),
    }
}

pub fn link_instance(from_external_id: &str, to_external_id: &str) -> InstanceLinkedPropertyCreate {
    InstanceLinkedPropertyCreate {
        from_external_id: ExternalId::from(from_external_id),
        to_external_id: ExternalId::from(to_external_id),
    }
}

pub fn link_instance_delete(from_record_id: &str, link_id: &str) -> InstanceLinkedPropertyDelete {
    InstanceLinkedPropertyDelete {
        from_record_id: InstanceId::from(from_record_id),
        instance_linked_property_id: InstanceId::from(link_id),
    }
}

pub fn proxy_changes(
    model_name: &str,
    record_external_id: &str,
    node_id_creates: &[&str],
    instance_id_deletes: &[&str],
) -> ProxyRecordChanges {
    ProxyRecordChanges {
        model_name: model_name.to_string(),
        record_external_id: ExternalId::from(record_external_id),
        node_id_creates: node_id_creates.iter().map(|s| s.to_string()).collect(),
        instance_id_deletes: instance_id_deletes
            .iter()
            .map(|s| InstanceId::from(*s))
            .collect(),
    }
}

/// A changeset whose pre-existing maps hold `model_name` and its records.
pub fn with_existing(
    mut dataset: Dataset,
    model_name: &str,
    model_id: &str,
    records: &[(&str, &str)],
) -> Dataset {
    dataset
        .existing_model_id_map
        .insert(model_name.to_string(), SchemaId::from(model_id));
    let map = records.iter().fold(
        metadata_types::RecordIdMap::new(model_name),
        |map, (external_id, instance_id)| {
            map.with_record(ExternalId::from(*external_id), InstanceId::from(*instance_id))
        },
    );
    dataset.record_id_maps.push(map);
    dataset
}
