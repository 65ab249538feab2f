use serde_json::{Map, Value};

use super::entity::Tracked;

/// Staged field edits keyed by wire field name.
///
/// Empty on construction, after reconciliation, and after a successful
/// commit. Mutated only by the owning entity's mutators and the
/// reconciler.
#[derive(Clone, Debug, Default)]
pub struct PendingChanges {
    fields: Map<String, Value>,
}

impl PendingChanges {
    pub fn new() -> Self {
        Self { fields: Map::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Stages one field edit, overwriting any value already staged
    /// under the same key.
    pub fn stage(&mut self, wire_key: &str, value: Value) {
        self.fields.insert(wire_key.to_string(), value);
    }

    /// Replaces the staged map wholesale. Used when a parent adopts a
    /// child's payload.
    pub fn replace(&mut self, fields: Map<String, Value>) {
        self.fields = fields;
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }

    pub fn to_map(&self) -> Map<String, Value> {
        self.fields.clone()
    }
}

/// Collects the pending payloads of every dirty child, in collection
/// order.
pub(crate) fn collect_pending<E: Tracked>(children: &[E]) -> Vec<Value> {
    children
        .iter()
        .filter(|child| child.has_pending_changes())
        .map(|child| Value::Object(child.pending_changes()))
        .collect()
}
