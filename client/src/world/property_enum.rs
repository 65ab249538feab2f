use std::{cell::RefCell, collections::HashMap, rc::Rc};

use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::error::ClientError;

use super::{
    delegate::{CommitDelegate, CommitSink},
    entity::{Entity, Tracked},
    error::WorldError,
    pending::PendingChanges,
};

/// Wire shape of one enum member.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EnumFieldRecord {
    pub enum_field_id: i64,
    pub enum_field_value: String,
}

/// Wire shape of one enum property inside an operator actor record.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PropertyEnumRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub display_name: String,
    pub all_values: Vec<EnumFieldRecord>,
    pub current_value: EnumFieldRecord,
}

/// One member of an enum property's value set.
///
/// An immutable value object; identity is the `(id, value)` pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumField {
    enum_field_id: i64,
    enum_field_value: String,
}

impl EnumField {
    fn from_record(record: EnumFieldRecord) -> Self {
        Self {
            enum_field_id: record.enum_field_id,
            enum_field_value: record.enum_field_value,
        }
    }

    pub fn enum_field_id(&self) -> i64 {
        self.enum_field_id
    }

    pub fn enum_field_value(&self) -> &str {
        &self.enum_field_value
    }
}

#[derive(Debug)]
struct PropertyEnumState {
    name: String,
    type_name: String,
    display_name: String,
    all_values: Vec<EnumField>,
    current_value: EnumField,
    pending: PendingChanges,
    delegate: CommitDelegate,
}

/// An enum-valued property of an operator actor, identified by name.
///
/// Invariant: `current_value` is always a member of `all_values`.
#[derive(Clone, Debug)]
pub struct PropertyEnum {
    state: Rc<RefCell<PropertyEnumState>>,
}

impl PropertyEnum {
    pub fn name(&self) -> String {
        self.state.borrow().name.clone()
    }

    pub fn type_name(&self) -> String {
        self.state.borrow().type_name.clone()
    }

    pub fn display_name(&self) -> String {
        self.state.borrow().display_name.clone()
    }

    pub fn all_values(&self) -> Vec<EnumField> {
        self.state.borrow().all_values.clone()
    }

    pub fn current_value(&self) -> EnumField {
        self.state.borrow().current_value.clone()
    }

    /// Assigns the member whose value string matches `value`.
    ///
    /// A value outside the declared set fails before anything is
    /// staged. A successful assignment commits through the owning
    /// actor.
    pub fn set_current_value(&self, value: &str) -> Result<(), ClientError> {
        let delegate = {
            let mut state = self.state.borrow_mut();
            let Some(member) = state
                .all_values
                .iter()
                .find(|field| field.enum_field_value() == value)
                .cloned()
            else {
                return Err(WorldError::ValueNotInSet {
                    enum_name: state.name.clone(),
                    value: value.to_string(),
                }
                .into());
            };
            let staged = json!({
                "enumFieldId": member.enum_field_id(),
                "enumFieldValue": member.enum_field_value(),
            });
            let name = state.name.clone();
            state.current_value = member;
            state.pending.stage("currentValue", staged);
            state.pending.stage("name", Value::String(name));
            state.delegate.clone()
        };
        delegate.commit("PropertyEnum", false)
    }
}

/// Builds a value set from wire records: pair-matched against the
/// existing set so unchanged members are reused, collapsed by id with
/// the last record winning and first-occurrence order kept.
fn build_value_set(existing: &[EnumField], records: Vec<EnumFieldRecord>) -> Vec<EnumField> {
    let mut order: Vec<i64> = Vec::new();
    let mut by_id: HashMap<i64, EnumField> = HashMap::new();
    for record in records {
        let incoming = EnumField::from_record(record);
        let field = existing
            .iter()
            .find(|field| **field == incoming)
            .cloned()
            .unwrap_or(incoming);
        if !by_id.contains_key(&field.enum_field_id()) {
            order.push(field.enum_field_id());
        }
        by_id.insert(field.enum_field_id(), field);
    }
    order
        .into_iter()
        .filter_map(|id| by_id.remove(&id))
        .collect()
}

/// Resolves a current-value record against the reconciled set by id. A
/// missing id is an identity resolution failure, never recovered
/// silently.
fn resolve_current(
    enum_name: &str,
    values: &[EnumField],
    current: &EnumFieldRecord,
) -> Result<EnumField, WorldError> {
    values
        .iter()
        .find(|field| field.enum_field_id() == current.enum_field_id)
        .cloned()
        .ok_or_else(|| WorldError::UnknownCurrentValue {
            enum_name: enum_name.to_string(),
            enum_field_id: current.enum_field_id,
        })
}

impl Entity for PropertyEnum {
    type Record = PropertyEnumRecord;

    fn parse(record: PropertyEnumRecord) -> Result<Self, WorldError> {
        let all_values = build_value_set(&[], record.all_values);
        let current_value = resolve_current(&record.name, &all_values, &record.current_value)?;
        Ok(Self {
            state: Rc::new(RefCell::new(PropertyEnumState {
                name: record.name,
                type_name: record.type_name,
                display_name: record.display_name,
                all_values,
                current_value,
                pending: PendingChanges::new(),
                delegate: CommitDelegate::default(),
            })),
        })
    }

    fn update_in_place(&self, record: PropertyEnumRecord) -> Result<(), WorldError> {
        let mut state = self.state.borrow_mut();
        let all_values = build_value_set(&state.all_values, record.all_values);
        let current_value = resolve_current(&record.name, &all_values, &record.current_value)?;
        state.pending.clear();
        state.name = record.name;
        state.type_name = record.type_name;
        state.display_name = record.display_name;
        state.all_values = all_values;
        state.current_value = current_value;
        Ok(())
    }
}

impl Tracked for PropertyEnum {
    fn pending_changes(&self) -> Map<String, Value> {
        self.state.borrow().pending.to_map()
    }

    fn has_pending_changes(&self) -> bool {
        !self.state.borrow().pending.is_empty()
    }

    fn clear_pending_changes(&self) {
        self.state.borrow_mut().pending.clear();
    }

    fn bind_delegate(&self, sink: Rc<dyn CommitSink>) {
        self.state.borrow_mut().delegate.bind(sink);
    }
}
