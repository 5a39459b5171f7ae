//! The ordered phases of a changeset run.
//!
//! Deletes run first, in reverse dependency order (link instances and
//! proxies before the records they hang off, records before their models).
//! Creates follow in dependency order: models and their records, then
//! links, then proxies. Record maps for pre-existing objects are loaded
//! strictly once every model is known.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    Delete,
    Create,
    Seed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    LinkInstanceDeletes,
    ProxyInstanceDeletes,
    /// Record deletes of model updates and model deletes.
    RecordDeletes,
    ModelDeletes,
    /// Models, their properties and their records.
    ModelCreates,
    /// Record creates and updates in existing models.
    ModelUpdates,
    RecordIdSeeding,
    /// Link schema creates, then link instance creates.
    LinkChanges,
    /// Proxy relationship schema, then proxy instance creates.
    ProxyChanges,
}

impl Phase {
    /// Execution order of a run.
    pub const ORDER: [Phase; 9] = [
        Phase::LinkInstanceDeletes,
        Phase::ProxyInstanceDeletes,
        Phase::RecordDeletes,
        Phase::ModelDeletes,
        Phase::ModelCreates,
        Phase::ModelUpdates,
        Phase::RecordIdSeeding,
        Phase::LinkChanges,
        Phase::ProxyChanges,
    ];

    pub fn kind(self) -> PhaseKind {
        match self {
            Self::LinkInstanceDeletes
            | Self::ProxyInstanceDeletes
            | Self::RecordDeletes
            | Self::ModelDeletes => PhaseKind::Delete,
            Self::ModelCreates | Self::ModelUpdates | Self::LinkChanges | Self::ProxyChanges => {
                PhaseKind::Create
            }
            Self::RecordIdSeeding => PhaseKind::Seed,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::LinkInstanceDeletes => "link instance deletes",
            Self::ProxyInstanceDeletes => "proxy instance deletes",
            Self::RecordDeletes => "record deletes",
            Self::ModelDeletes => "model deletes",
            Self::ModelCreates => "model creates",
            Self::ModelUpdates => "model updates",
            Self::RecordIdSeeding => "record id seeding",
            Self::LinkChanges => "link changes",
            Self::ProxyChanges => "proxy changes",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(phase: Phase) -> usize {
        Phase::ORDER.iter().position(|p| *p == phase).unwrap()
    }

    #[test]
    fn every_delete_precedes_every_create() {
        let last_delete = Phase::ORDER
            .iter()
            .rposition(|p| p.kind() == PhaseKind::Delete)
            .unwrap();
        let first_create = Phase::ORDER
            .iter()
            .position(|p| p.kind() == PhaseKind::Create)
            .unwrap();
        assert!(last_delete < first_create);
    }

    #[test]
    fn dependents_are_deleted_before_what_they_reference() {
        assert!(position(Phase::LinkInstanceDeletes) < position(Phase::RecordDeletes));
        assert!(position(Phase::ProxyInstanceDeletes) < position(Phase::RecordDeletes));
        assert!(position(Phase::RecordDeletes) < position(Phase::ModelDeletes));
    }

    #[test]
    fn seeding_sits_between_models_and_links() {
        assert!(position(Phase::ModelCreates) < position(Phase::RecordIdSeeding));
        assert!(position(Phase::ModelUpdates) < position(Phase::RecordIdSeeding));
        assert!(position(Phase::RecordIdSeeding) < position(Phase::LinkChanges));
        assert!(position(Phase::LinkChanges) < position(Phase::ProxyChanges));
    }

    #[test]
    fn each_phase_runs_once() {
        for phase in Phase::ORDER {
            assert_eq!(Phase::ORDER.iter().filter(|p| **p == phase).count(), 1);
        }
    }
}
