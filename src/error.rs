//! Processor error types.

use std::fmt;

use metadata_client::ClientError;
use metadata_types::{InstanceId, SchemaId};
use thiserror::Error;

use crate::changeset::ChangesetError;
use crate::config::ConfigError;
use crate::id_store::IdStoreError;

pub type Result<T> = std::result::Result<T, ProcessorError>;

/// Coarse classification of a [`ProcessorError`]. Every kind aborts the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Duplicate,
    RemoteCallFailed,
    PartialBulkFailure,
    InvalidChangeset,
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotFound => "not found",
            Self::Duplicate => "duplicate",
            Self::RemoteCallFailed => "remote call failed",
            Self::PartialBulkFailure => "partial bulk failure",
            Self::InvalidChangeset => "invalid changeset",
            Self::Config => "config",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error(transparent)]
    IdStore(#[from] IdStoreError),

    /// A metadata service call failed. `context` names the object involved.
    #[error("{context}: {source}")]
    Remote {
        context: String,
        #[source]
        source: ClientError,
    },

    /// The service deleted some records of a bulk delete and refused others.
    #[error(
        "errors deleting {} of {attempted} records for model {model_id}: {}",
        .failures.len(),
        format_failures(.failures)
    )]
    PartialBulkFailure {
        model_id: SchemaId,
        attempted: usize,
        failures: Vec<(InstanceId, String)>,
    },

    #[error("invalid changeset: {0}")]
    InvalidChangeset(String),

    #[error(transparent)]
    Changeset(#[from] ChangesetError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ProcessorError {
    pub fn remote(context: impl Into<String>, source: ClientError) -> Self {
        Self::Remote {
            context: context.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::IdStore(err) if err.is_not_found() => ErrorKind::NotFound,
            Self::IdStore(_) => ErrorKind::Duplicate,
            Self::Remote { .. } => ErrorKind::RemoteCallFailed,
            Self::PartialBulkFailure { .. } => ErrorKind::PartialBulkFailure,
            Self::InvalidChangeset(_) | Self::Changeset(_) => ErrorKind::InvalidChangeset,
            Self::Config(_) => ErrorKind::Config,
        }
    }
}

fn format_failures(failures: &[(InstanceId, String)]) -> String {
    failures
        .iter()
        .map(|(id, message)| format!("record {id}: {message}"))
        .collect::<Vec<_>>()
        .join("; ")
}
