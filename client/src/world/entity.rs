use std::rc::Rc;

use serde_json::{Map, Value};

use super::{delegate::CommitSink, error::WorldError};

/// Construction and refresh contract shared by every world entity.
pub trait Entity: Sized {
    /// The wire record this entity is decoded from.
    type Record;

    /// Constructs a fresh entity from a wire record, recursively
    /// parsing nested records. Composites bind their children's
    /// delegates to their own sink before returning.
    fn parse(record: Self::Record) -> Result<Self, WorldError>;

    /// Resets pending changes and overwrites every declared field from
    /// the record. Composites reconcile nested collections (and rebind
    /// their delegates) instead of replacing them.
    fn update_in_place(&self, record: Self::Record) -> Result<(), WorldError>;
}

/// Change-tracking contract shared by every entity that stages edits.
pub trait Tracked {
    /// Snapshot of the staged payload, keyed by wire field name.
    fn pending_changes(&self) -> Map<String, Value>;

    fn has_pending_changes(&self) -> bool;

    fn clear_pending_changes(&self);

    /// Points this entity's delegate at a new sink. Owners call this
    /// after every reconciliation pass.
    fn bind_delegate(&self, sink: Rc<dyn CommitSink>);
}
