//! Metadata post-processor.
//!
//! Applies a metadata changeset to a dataset: models and their properties,
//! records, linked properties between records, and package proxies. Names
//! and external ids in the changeset are translated to service ids through
//! an [`IdStore`] that grows as objects are created.

pub mod changeset;
pub mod config;
pub mod error;
pub mod id_store;
pub mod phase;
pub mod processor;

pub use changeset::{read_changeset, ChangesetError, CHANGESET_FILE_NAME};
pub use config::{ConfigError, ProcessorConfig};
pub use error::{ErrorKind, ProcessorError, Result};
pub use id_store::{IdStore, IdStoreBuilder, IdStoreError};
pub use phase::{Phase, PhaseKind};
pub use processor::{ApplySummary, MetadataPostProcessor};
