use std::{collections::HashMap, hash::Hash};

use super::{
    entity::{Entity, Tracked},
    error::WorldError,
};

/// Reconciles an existing collection against a fresh server snapshot.
///
/// For each record in snapshot order, the matching existing handle is
/// reused, or a new entity is parsed when no identity matches. Pending
/// changes are cleared on every returned entity either way. Existing
/// entities absent from the snapshot are dropped.
///
/// Reused entities keep their current field values; this pass matches
/// identities, it does not refresh fields.
pub fn reconcile<E, R, K, EK, RK>(
    existing: &[E],
    records: Vec<R>,
    entity_key: EK,
    record_key: RK,
) -> Result<Vec<E>, WorldError>
where
    E: Entity<Record = R> + Tracked + Clone,
    K: Eq + Hash,
    EK: Fn(&E) -> K,
    RK: Fn(&R) -> K,
{
    let mut by_key: HashMap<K, E> = HashMap::with_capacity(existing.len());
    for entity in existing {
        by_key.insert(entity_key(entity), entity.clone());
    }

    let mut next = Vec::with_capacity(records.len());
    for record in records {
        let key = record_key(&record);
        let entity = match by_key.get(&key) {
            Some(reused) => reused.clone(),
            None => E::parse(record)?,
        };
        entity.clear_pending_changes();
        next.push(entity);
    }

    Ok(next)
}
