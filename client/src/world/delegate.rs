use std::rc::Rc;

use crate::error::ClientError;

use super::error::WorldError;

/// Receives an entity's commit request and carries it toward the
/// session boundary.
///
/// Parents and the session expose sinks; children hold them through
/// their delegates. `force` bypasses the session's autocommit gate.
pub trait CommitSink {
    fn commit(&self, force: bool) -> Result<(), ClientError>;
}

/// An entity's link to its commit sink.
///
/// Entities are constructed Unbound; the owning parent (or the session)
/// binds the delegate after construction and rebinds it after every
/// reconciliation pass. Invoking an unbound delegate is a wiring defect
/// and fails loudly.
#[derive(Clone, Default)]
pub enum CommitDelegate {
    #[default]
    Unbound,
    Bound(Rc<dyn CommitSink>),
}

impl CommitDelegate {
    pub fn bind(&mut self, sink: Rc<dyn CommitSink>) {
        *self = Self::Bound(sink);
    }

    pub fn commit(&self, entity: &'static str, force: bool) -> Result<(), ClientError> {
        match self {
            Self::Unbound => Err(WorldError::UnboundDelegate { entity }.into()),
            Self::Bound(sink) => sink.commit(force),
        }
    }
}

impl std::fmt::Debug for CommitDelegate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unbound => f.write_str("Unbound"),
            Self::Bound(_) => f.write_str("Bound"),
        }
    }
}
