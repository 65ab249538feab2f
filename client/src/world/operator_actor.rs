use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ClientError;

use super::{
    action::{Action, ActionRecord},
    delegate::{CommitDelegate, CommitSink},
    entity::{Entity, Tracked},
    entity_list::EntityList,
    error::WorldError,
    pending::{collect_pending, PendingChanges},
    property::{Property, PropertyRecord},
    property_array::{PropertyArray, PropertyArrayRecord},
    property_enum::{PropertyEnum, PropertyEnumRecord},
    reconcile::reconcile,
};

/// Wire shape of one operator actor, as returned inside the
/// `GET operatoractors` envelope.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OperatorActorRecord {
    pub name: String,
    pub id: i64,
    pub is_visible: bool,
    #[serde(rename = "type")]
    pub actor_type: String,
    pub properties: Vec<PropertyRecord>,
    pub property_arrays: Vec<PropertyArrayRecord>,
    pub property_enums: Vec<PropertyEnumRecord>,
    pub actions: Vec<ActionRecord>,
}

/// Wire envelope of `GET operatoractors`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OperatorActorsEnvelope {
    pub operator_actors: Vec<OperatorActorRecord>,
}

#[derive(Debug)]
struct OperatorActorState {
    name: String,
    id: i64,
    is_visible: bool,
    actor_type: String,
    properties: Vec<Property>,
    property_arrays: Vec<PropertyArray>,
    property_enums: Vec<PropertyEnum>,
    actions: Vec<Action>,
    pending: PendingChanges,
    delegate: CommitDelegate,
}

/// A controllable actor in the running scenario, identified by id.
///
/// Owns four child collections. Commit aggregates every dirty child's
/// payload by category, tags the actor's own id, and forwards to the
/// session.
#[derive(Clone, Debug)]
pub struct OperatorActor {
    state: Rc<RefCell<OperatorActorState>>,
}

/// Commit sink an actor exposes to its children.
struct ActorSink {
    actor: Weak<RefCell<OperatorActorState>>,
}

impl CommitSink for ActorSink {
    fn commit(&self, force: bool) -> Result<(), ClientError> {
        let Some(state) = self.actor.upgrade() else {
            return Err(WorldError::UnboundDelegate {
                entity: "OperatorActor",
            }
            .into());
        };
        OperatorActor { state }.commit(force)
    }
}

impl OperatorActor {
    /// Whether two handles share the same underlying actor.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.state, &b.state)
    }

    pub fn name(&self) -> String {
        self.state.borrow().name.clone()
    }

    pub fn id(&self) -> i64 {
        self.state.borrow().id
    }

    pub fn is_visible(&self) -> bool {
        self.state.borrow().is_visible
    }

    pub fn actor_type(&self) -> String {
        self.state.borrow().actor_type.clone()
    }

    pub fn properties(&self) -> EntityList<Property> {
        EntityList::new(self.state.borrow().properties.clone())
    }

    pub fn property_arrays(&self) -> EntityList<PropertyArray> {
        EntityList::new(self.state.borrow().property_arrays.clone())
    }

    pub fn property_enums(&self) -> EntityList<PropertyEnum> {
        EntityList::new(self.state.borrow().property_enums.clone())
    }

    pub fn actions(&self) -> EntityList<Action> {
        EntityList::new(self.state.borrow().actions.clone())
    }

    /// Stages a visibility change on the actor itself and commits.
    pub fn set_visible(&self, visible: bool) -> Result<(), ClientError> {
        {
            let mut state = self.state.borrow_mut();
            state.is_visible = visible;
            state.pending.stage("isVisible", Value::Bool(visible));
        }
        self.commit(false)
    }

    /// Aggregates dirty children into this actor's pending payload and
    /// forwards the commit to the session.
    ///
    /// Child payloads are collected per collection, in the fixed order
    /// properties, property arrays, property enums, actions; each
    /// non-empty sequence is staged under its collection's wire key.
    /// If the payload is non-empty after aggregation, the actor's id is
    /// staged so the server can address it.
    pub fn commit(&self, force: bool) -> Result<(), ClientError> {
        let delegate = {
            let mut state = self.state.borrow_mut();
            let properties = collect_pending(&state.properties);
            let property_arrays = collect_pending(&state.property_arrays);
            let property_enums = collect_pending(&state.property_enums);
            let actions = collect_pending(&state.actions);
            if !properties.is_empty() {
                state.pending.stage("properties", Value::Array(properties));
            }
            if !property_arrays.is_empty() {
                state
                    .pending
                    .stage("propertyArrays", Value::Array(property_arrays));
            }
            if !property_enums.is_empty() {
                state
                    .pending
                    .stage("propertyEnums", Value::Array(property_enums));
            }
            if !actions.is_empty() {
                state.pending.stage("actions", Value::Array(actions));
            }
            if !state.pending.is_empty() {
                let id = state.id;
                state.pending.stage("id", Value::from(id));
            }
            state.delegate.clone()
        };
        delegate.commit("OperatorActor", force)
    }

    /// Clears this actor's pending payload and every aggregated child's,
    /// so a later commit cannot re-deposit acknowledged changes.
    pub(crate) fn clear_committed_changes(&self) {
        let (properties, property_enums, actions) = {
            let mut state = self.state.borrow_mut();
            state.pending.clear();
            (
                state.properties.clone(),
                state.property_enums.clone(),
                state.actions.clone(),
            )
        };
        for property in &properties {
            property.clear_pending_changes();
        }
        for property_enum in &property_enums {
            property_enum.clear_pending_changes();
        }
        for action in &actions {
            action.clear_pending_changes();
        }
    }

    fn bind_children(&self) {
        let sink: Rc<dyn CommitSink> = Rc::new(ActorSink {
            actor: Rc::downgrade(&self.state),
        });
        let (properties, property_enums, actions) = {
            let state = self.state.borrow();
            (
                state.properties.clone(),
                state.property_enums.clone(),
                state.actions.clone(),
            )
        };
        for property in &properties {
            property.bind_delegate(sink.clone());
        }
        for property_enum in &property_enums {
            property_enum.bind_delegate(sink.clone());
        }
        for action in &actions {
            action.bind_delegate(sink.clone());
        }
    }
}

impl Entity for OperatorActor {
    type Record = OperatorActorRecord;

    fn parse(record: OperatorActorRecord) -> Result<Self, WorldError> {
        if !record.property_arrays.is_empty() {
            return Err(WorldError::PropertyArraysUnsupported {
                count: record.property_arrays.len(),
            });
        }
        let mut properties = Vec::with_capacity(record.properties.len());
        for property_record in record.properties {
            properties.push(Property::parse(property_record)?);
        }
        let mut property_enums = Vec::with_capacity(record.property_enums.len());
        for enum_record in record.property_enums {
            property_enums.push(PropertyEnum::parse(enum_record)?);
        }
        let mut actions = Vec::with_capacity(record.actions.len());
        for action_record in record.actions {
            actions.push(Action::parse(action_record)?);
        }
        let actor = Self {
            state: Rc::new(RefCell::new(OperatorActorState {
                name: record.name,
                id: record.id,
                is_visible: record.is_visible,
                actor_type: record.actor_type,
                properties,
                property_arrays: Vec::new(),
                property_enums,
                actions,
                pending: PendingChanges::new(),
                delegate: CommitDelegate::default(),
            })),
        };
        actor.bind_children();
        Ok(actor)
    }

    fn update_in_place(&self, record: OperatorActorRecord) -> Result<(), WorldError> {
        if !record.property_arrays.is_empty() {
            return Err(WorldError::PropertyArraysUnsupported {
                count: record.property_arrays.len(),
            });
        }
        let OperatorActorRecord {
            name,
            id,
            is_visible,
            actor_type,
            properties,
            property_arrays: _,
            property_enums,
            actions,
        } = record;
        let (next_properties, next_enums, next_actions) = {
            let state = self.state.borrow();
            (
                reconcile(
                    &state.properties,
                    properties,
                    |property| property.name(),
                    |property_record| property_record.name.clone(),
                )?,
                reconcile(
                    &state.property_enums,
                    property_enums,
                    |property_enum| property_enum.name(),
                    |enum_record| enum_record.name.clone(),
                )?,
                reconcile(
                    &state.actions,
                    actions,
                    |action| action.name(),
                    |action_record| action_record.name.clone(),
                )?,
            )
        };
        {
            let mut state = self.state.borrow_mut();
            state.pending.clear();
            state.name = name;
            state.id = id;
            state.is_visible = is_visible;
            state.actor_type = actor_type;
            state.properties = next_properties;
            state.property_enums = next_enums;
            state.actions = next_actions;
        }
        self.bind_children();
        Ok(())
    }
}

impl Tracked for OperatorActor {
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
