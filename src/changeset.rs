//! Changeset file loading.

use std::fs;
use std::path::{Path, PathBuf};

use metadata_types::Dataset;
use thiserror::Error;

/// Name of the changeset file in the output directory.
pub const CHANGESET_FILE_NAME: &str = "changeset.json";

#[derive(Debug, Error)]
pub enum ChangesetError {
    #[error("failed to read changeset {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode changeset {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub fn changeset_path(output_dir: &Path) -> PathBuf {
    output_dir.join(CHANGESET_FILE_NAME)
}

pub fn read_changeset(path: &Path) -> Result<Dataset, ChangesetError> {
    let bytes = fs::read(path).map_err(|source| ChangesetError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ChangesetError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_changeset_from_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = changeset_path(dir.path());
        fs::write(
            &path,
            r#"{"existing_model_id_map": {"subject": "m-1"}, "linked_properties": []}"#,
        )
        .unwrap();

        let dataset = read_changeset(&path).unwrap();
        assert_eq!(dataset.existing_model_id_map.len(), 1);
        assert!(dataset.is_empty());
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = changeset_path(dir.path());

        let err = read_changeset(&path).unwrap_err();
        assert!(matches!(err, ChangesetError::Read { .. }));
        assert!(err.to_string().contains("changeset.json"));
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = changeset_path(dir.path());
        fs::write(&path, r#"{"models": {"creates": "nope"}}"#).unwrap();

        assert!(matches!(
            read_changeset(&path).unwrap_err(),
            ChangesetError::Decode { .. }
        ));
    }
}
