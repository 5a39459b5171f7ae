//! Identifier store.
//!
//! Translates model names to schema ids and `(schema id, external id)` pairs
//! to instance ids. It is seeded from the changeset's maps of pre-existing
//! objects and grows as the model phase creates models and records. Later
//! phases only read it.
//!
//! Entries are never replaced: adding an identical mapping again is a no-op
//! and adding a conflicting one is an error.

use std::collections::{BTreeMap, HashMap};

use metadata_types::{ExternalId, InstanceId, RecordIdMap, SchemaId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdStoreError {
    #[error("no schema id known for model '{name}'")]
    ModelNotFound { name: String },

    #[error("no instance id known for record '{external_id}' of model {model_id}")]
    RecordNotFound {
        model_id: SchemaId,
        external_id: ExternalId,
    },

    #[error("model '{name}' is already mapped to {existing}, cannot map it to {new}")]
    DuplicateModel {
        name: String,
        existing: SchemaId,
        new: SchemaId,
    },

    #[error(
        "record '{external_id}' of model {model_id} is already mapped to {existing}, cannot map it to {new}"
    )]
    DuplicateRecord {
        model_id: SchemaId,
        external_id: ExternalId,
        existing: InstanceId,
        new: InstanceId,
    },

    #[error("model '{name}' is already mapped to {existing}")]
    ModelAlreadyMapped { name: String, existing: SchemaId },

    #[error("record '{external_id}' of model {model_id} is already mapped to {existing}")]
    RecordAlreadyMapped {
        model_id: SchemaId,
        external_id: ExternalId,
        existing: InstanceId,
    },
}

impl IdStoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ModelNotFound { .. } | Self::RecordNotFound { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, IdStoreError>;

#[derive(Debug, Clone, Default)]
pub struct IdStore {
    models: HashMap<String, SchemaId>,
    records: HashMap<(SchemaId, ExternalId), InstanceId>,
}

impl IdStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> IdStoreBuilder {
        IdStoreBuilder::default()
    }

    pub fn add_model(&mut self, name: impl Into<String>, model_id: SchemaId) -> Result<()> {
        let name = name.into();
        match self.models.get(&name) {
            Some(existing) if *existing == model_id => Ok(()),
            Some(existing) => Err(IdStoreError::DuplicateModel {
                existing: existing.clone(),
                name,
                new: model_id,
            }),
            None => {
                self.models.insert(name, model_id);
                Ok(())
            }
        }
    }

    pub fn add_record(
        &mut self,
        model_id: SchemaId,
        external_id: ExternalId,
        instance_id: InstanceId,
    ) -> Result<()> {
        let key = (model_id, external_id);
        match self.records.get(&key) {
            Some(existing) if *existing == instance_id => Ok(()),
            Some(existing) => {
                let (model_id, external_id) = key;
                Err(IdStoreError::DuplicateRecord {
                    existing: existing.clone(),
                    model_id,
                    external_id,
                    new: instance_id,
                })
            }
            None => {
                self.records.insert(key, instance_id);
                Ok(())
            }
        }
    }

    pub fn model_id(&self, name: &str) -> Result<SchemaId> {
        self.models
            .get(name)
            .cloned()
            .ok_or_else(|| IdStoreError::ModelNotFound {
                name: name.to_string(),
            })
    }

    pub fn record_id(&self, model_id: &SchemaId, external_id: &ExternalId) -> Result<InstanceId> {
        self.records
            .get(&(model_id.clone(), external_id.clone()))
            .cloned()
            .ok_or_else(|| IdStoreError::RecordNotFound {
                model_id: model_id.clone(),
                external_id: external_id.clone(),
            })
    }

    /// Resolves a record by the name of its model.
    pub fn record_id_by_model_name(
        &self,
        model_name: &str,
        external_id: &ExternalId,
    ) -> Result<InstanceId> {
        let model_id = self.model_id(model_name)?;
        self.record_id(&model_id, external_id)
    }

    /// Fails if `name` already has a schema id. Checked before a remote create
    /// so that a duplicate never leaves an unmapped object in the service.
    pub fn ensure_model_unmapped(&self, name: &str) -> Result<()> {
        match self.models.get(name) {
            Some(existing) => Err(IdStoreError::ModelAlreadyMapped {
                name: name.to_string(),
                existing: existing.clone(),
            }),
            None => Ok(()),
        }
    }

    pub fn ensure_record_unmapped(
        &self,
        model_id: &SchemaId,
        external_id: &ExternalId,
    ) -> Result<()> {
        match self.records.get(&(model_id.clone(), external_id.clone())) {
            Some(existing) => Err(IdStoreError::RecordAlreadyMapped {
                model_id: model_id.clone(),
                external_id: external_id.clone(),
                existing: existing.clone(),
            }),
            None => Ok(()),
        }
    }

    pub fn contains_model(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn add_models(&mut self, models: &BTreeMap<String, SchemaId>) -> Result<()> {
        for (name, model_id) in models {
            self.add_model(name.as_str(), model_id.clone())?;
        }
        Ok(())
    }

    /// Loads record maps. The model of every map must already resolve.
    pub fn add_record_id_maps(&mut self, maps: &[RecordIdMap]) -> Result<()> {
        for map in maps {
            self.add_record_id_map(map)?;
        }
        Ok(())
    }

    /// Loads the record maps whose model already resolves and skips the
    /// rest, returning how many maps were loaded. Used before the delete
    /// phase, when models created later in the run are still unknown.
    pub fn add_resolvable_record_id_maps(&mut self, maps: &[RecordIdMap]) -> Result<usize> {
        let mut loaded = 0;
        for map in maps {
            if self.contains_model(&map.model_name) {
                self.add_record_id_map(map)?;
                loaded += 1;
            }
        }
        Ok(loaded)
    }

    pub fn seed_from_existing(
        &mut self,
        models: &BTreeMap<String, SchemaId>,
        record_maps: &[RecordIdMap],
    ) -> Result<()> {
        self.add_models(models)?;
        self.add_record_id_maps(record_maps)
    }

    fn add_record_id_map(&mut self, map: &RecordIdMap) -> Result<()> {
        let model_id = self.model_id(&map.model_name)?;
        for (external_id, instance_id) in &map.external_to_pennsieve {
            self.add_record(model_id.clone(), external_id.clone(), instance_id.clone())?;
        }
        Ok(())
    }
}

/// Collects mappings and applies them to a fresh [`IdStore`] with the usual
/// duplicate policy.
#[derive(Debug, Clone, Default)]
pub struct IdStoreBuilder {
    models: Vec<(String, SchemaId)>,
    records: Vec<(SchemaId, ExternalId, InstanceId)>,
}

impl IdStoreBuilder {
    pub fn with_model(mut self, name: impl Into<String>, model_id: impl Into<SchemaId>) -> Self {
        self.models.push((name.into(), model_id.into()));
        self
    }

    pub fn with_models(mut self, models: &BTreeMap<String, SchemaId>) -> Self {
        self.models
            .extend(models.iter().map(|(name, id)| (name.clone(), id.clone())));
        self
    }

    pub fn with_record(
        mut self,
        model_id: impl Into<SchemaId>,
        external_id: impl Into<ExternalId>,
        instance_id: impl Into<InstanceId>,
    ) -> Self {
        self.records
            .push((model_id.into(), external_id.into(), instance_id.into()));
        self
    }

    pub fn build(self) -> Result<IdStore> {
        let mut store = IdStore::new();
        for (name, model_id) in self.models {
            store.add_model(name, model_id)?;
        }
        for (model_id, external_id, instance_id) in self.records {
            store.add_record(model_id, external_id, instance_id)?;
        }
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_resolve_after_adds() {
        let mut store = IdStore::new();
        store.add_model("subject", SchemaId::from("m-1")).unwrap();
        store
            .add_record(
                SchemaId::from("m-1"),
                ExternalId::from("ext-1"),
                InstanceId::from("r-1"),
            )
            .unwrap();

        assert_eq!(store.model_id("subject").unwrap(), SchemaId::from("m-1"));
        assert_eq!(
            store
                .record_id(&SchemaId::from("m-1"), &ExternalId::from("ext-1"))
                .unwrap(),
            InstanceId::from("r-1")
        );
        assert_eq!(
            store
                .record_id_by_model_name("subject", &ExternalId::from("ext-1"))
                .unwrap(),
            InstanceId::from("r-1")
        );
    }

    #[test]
    fn missing_entries_are_not_found() {
        let store = IdStore::builder()
            .with_model("subject", "m-1")
            .build()
            .unwrap();

        let err = store.model_id("sample").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "no schema id known for model 'sample'");

        let err = store
            .record_id(&SchemaId::from("m-1"), &ExternalId::from("ext-9"))
            .unwrap_err();
        assert_eq!(
            err,
            IdStoreError::RecordNotFound {
                model_id: SchemaId::from("m-1"),
                external_id: ExternalId::from("ext-9"),
            }
        );
    }

    #[test]
    fn records_are_scoped_by_model() {
        let store = IdStore::builder()
            .with_record("m-1", "ext-1", "r-1")
            .with_record("m-2", "ext-1", "r-2")
            .build()
            .unwrap();

        let ext = ExternalId::from("ext-1");
        assert_eq!(
            store.record_id(&SchemaId::from("m-1"), &ext).unwrap(),
            InstanceId::from("r-1")
        );
        assert_eq!(
            store.record_id(&SchemaId::from("m-2"), &ext).unwrap(),
            InstanceId::from("r-2")
        );
    }

    #[test]
    fn identical_re_add_is_a_no_op() {
        let mut store = IdStore::new();
        store.add_model("subject", SchemaId::from("m-1")).unwrap();
        store.add_model("subject", SchemaId::from("m-1")).unwrap();
        assert_eq!(store.model_count(), 1);
    }

    #[test]
    fn conflicting_re_add_is_rejected() {
        let mut store = IdStore::new();
        store.add_model("subject", SchemaId::from("m-1")).unwrap();
        let err = store
            .add_model("subject", SchemaId::from("m-2"))
            .unwrap_err();
        assert!(!err.is_not_found());
        assert_eq!(store.model_id("subject").unwrap(), SchemaId::from("m-1"));

        store
            .add_record(
                SchemaId::from("m-1"),
                ExternalId::from("ext-1"),
                InstanceId::from("r-1"),
            )
            .unwrap();
        let err = store
            .add_record(
                SchemaId::from("m-1"),
                ExternalId::from("ext-1"),
                InstanceId::from("r-9"),
            )
            .unwrap_err();
        assert!(matches!(err, IdStoreError::DuplicateRecord { .. }));
    }

    #[test]
    fn unmapped_checks_name_the_existing_id() {
        let models = BTreeMap::from([("sample".to_string(), SchemaId::from("m-sample"))]);
        let store = IdStore::builder()
            .with_models(&models)
            .with_record("m-sample", "sam-1", "r-1")
            .build()
            .unwrap();

        store.ensure_model_unmapped("subject").unwrap();
        let err = store.ensure_model_unmapped("sample").unwrap_err();
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "model 'sample' is already mapped to m-sample");

        let model_id = SchemaId::from("m-sample");
        store
            .ensure_record_unmapped(&model_id, &ExternalId::from("sam-2"))
            .unwrap();
        assert_eq!(
            store
                .ensure_record_unmapped(&model_id, &ExternalId::from("sam-1"))
                .unwrap_err(),
            IdStoreError::RecordAlreadyMapped {
                model_id,
                external_id: ExternalId::from("sam-1"),
                existing: InstanceId::from("r-1"),
            }
        );
    }

    #[test]
    fn record_maps_need_their_model() {
        let maps = vec![RecordIdMap::new("sample")
            .with_record(ExternalId::from("sam-1"), InstanceId::from("r-1"))];

        let mut store = IdStore::new();
        assert_eq!(
            store.add_record_id_maps(&maps).unwrap_err(),
            IdStoreError::ModelNotFound {
                name: "sample".into()
            }
        );

        let models = BTreeMap::from([("sample".to_string(), SchemaId::from("m-sample"))]);
        store.seed_from_existing(&models, &maps).unwrap();
        assert_eq!(
            store
                .record_id_by_model_name("sample", &ExternalId::from("sam-1"))
                .unwrap(),
            InstanceId::from("r-1")
        );
    }

    #[test]
    fn resolvable_maps_skip_unknown_models() {
        let maps = vec![
            RecordIdMap::new("sample")
                .with_record(ExternalId::from("sam-1"), InstanceId::from("r-1")),
            RecordIdMap::new("subject")
                .with_record(ExternalId::from("sub-1"), InstanceId::from("r-2")),
        ];
        let mut store = IdStore::builder()
            .with_model("sample", "m-sample")
            .build()
            .unwrap();

        assert_eq!(store.add_resolvable_record_id_maps(&maps).unwrap(), 1);
        assert_eq!(store.record_count(), 1);

        // Once the model exists the strict load picks up the rest, and the
        // already loaded map re-adds as a no-op.
        store.add_model("subject", SchemaId::from("m-subject")).unwrap();
        store.add_record_id_maps(&maps).unwrap();
        assert_eq!(store.record_count(), 2);
    }
}
