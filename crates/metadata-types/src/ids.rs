//! Identifier newtypes.
//!
//! Schema and instance ids are assigned by the metadata service and never
//! chosen locally. External ids come from the changeset producer and only
//! identify a record until the service has assigned it an instance id.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Service id of a model, linked-property schema or relationship schema.
    SchemaId
);

string_id!(
    /// Service id of a record, link instance or proxy instance.
    InstanceId
);

string_id!(
    /// Producer-assigned record id. Two records in the same model with the
    /// same external id are the same logical record.
    ExternalId
);

string_id!(
    /// Node id of the target dataset, e.g. `N:dataset:<uuid>`.
    DatasetId
);
