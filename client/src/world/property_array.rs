use std::rc::Rc;

use serde::Deserialize;
use serde_json::{Map, Value};

use super::{
    delegate::CommitSink,
    entity::{Entity, Tracked},
    error::WorldError,
};

/// Wire shape of one property array inside an operator actor record.
///
/// Kept opaque: the client does not implement property arrays, so the
/// record is never interpreted beyond being counted.
#[derive(Clone, Debug, Deserialize)]
#[serde(transparent)]
pub struct PropertyArrayRecord(pub Map<String, Value>);

/// Placeholder for the server's property array collection.
///
/// Parsing one is fatal, so an unhandled server data shape surfaces at
/// decode time instead of being silently dropped. The type exists to
/// keep the collection seam on the owning actor.
#[derive(Clone, Debug)]
pub struct PropertyArray {
    _unconstructable: (),
}

impl Entity for PropertyArray {
    type Record = PropertyArrayRecord;

    fn parse(_record: PropertyArrayRecord) -> Result<Self, WorldError> {
        Err(WorldError::PropertyArraysUnsupported { count: 1 })
    }

    fn update_in_place(&self, _record: PropertyArrayRecord) -> Result<(), WorldError> {
        Err(WorldError::PropertyArraysUnsupported { count: 1 })
    }
}

impl Tracked for PropertyArray {
    fn pending_changes(&self) -> Map<String, Value> {
        Map::new()
    }

    fn has_pending_changes(&self) -> bool {
        false
    }

    fn clear_pending_changes(&self) {}

    fn bind_delegate(&self, _sink: Rc<dyn CommitSink>) {}
}
