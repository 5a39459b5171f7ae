//! Metadata changeset model.
//!
//! A changeset describes, for one dataset, the models, records, linked
//! properties and package proxies to create, update or delete. It is
//! produced upstream as JSON and applied by the post-processor.
//!
//! Records that do not exist yet are identified by [`ExternalId`]; anything
//! that already exists in the metadata service is identified by a
//! service-assigned [`SchemaId`] or [`InstanceId`].

pub mod dataset;
pub mod ids;
pub mod links;
pub mod models;
pub mod proxies;

pub use dataset::{Dataset, RecordIdMap};
pub use ids::{DatasetId, ExternalId, InstanceId, SchemaId};
pub use links::{
    InstanceChanges, InstanceLinkedPropertyCreate, InstanceLinkedPropertyDelete,
    LinkedPropertyChanges, SchemaLinkedPropertyCreate,
};
pub use models::{
    ModelChanges, ModelCreate, ModelCreateParams, ModelDelete, ModelPropsCreate, ModelUpdate,
    PropertyCreateParams, RecordChanges, RecordCreate, RecordUpdate, RecordValue, RecordValues,
};
pub use proxies::{ProxyChanges, ProxyRecordChanges};
