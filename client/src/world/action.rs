use std::{cell::RefCell, rc::Rc};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ClientError;

use super::{
    delegate::{CommitDelegate, CommitSink},
    entity::{Entity, Tracked},
    error::WorldError,
    pending::PendingChanges,
};

/// Wire shape of one action inside an operator actor record.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ActionRecord {
    pub name: String,
    pub display_name: String,
    pub button_name: String,
}

#[derive(Debug)]
struct ActionState {
    name: String,
    display_name: String,
    button_name: String,
    pending: PendingChanges,
    delegate: CommitDelegate,
}

/// A parameterless server-side action, identified by name.
#[derive(Clone, Debug)]
pub struct Action {
    state: Rc<RefCell<ActionState>>,
}

impl Action {
    pub fn name(&self) -> String {
        self.state.borrow().name.clone()
    }

    pub fn display_name(&self) -> String {
        self.state.borrow().display_name.clone()
    }

    pub fn button_name(&self) -> String {
        self.state.borrow().button_name.clone()
    }

    /// Stages an invocation of this action and commits through the
    /// owning actor.
    pub fn trigger(&self) -> Result<(), ClientError> {
        let delegate = {
            let mut state = self.state.borrow_mut();
            let name = state.name.clone();
            state.pending.stage("name", Value::String(name));
            state.delegate.clone()
        };
        delegate.commit("Action", false)
    }
}

impl Entity for Action {
    type Record = ActionRecord;

    fn parse(record: ActionRecord) -> Result<Self, WorldError> {
        Ok(Self {
            state: Rc::new(RefCell::new(ActionState {
                name: record.name,
                display_name: record.display_name,
                button_name: record.button_name,
                pending: PendingChanges::new(),
                delegate: CommitDelegate::default(),
            })),
        })
    }

    fn update_in_place(&self, record: ActionRecord) -> Result<(), WorldError> {
        let mut state = self.state.borrow_mut();
        state.pending.clear();
        state.name = record.name;
        state.display_name = record.display_name;
        state.button_name = record.button_name;
        Ok(())
    }
}

impl Tracked for Action {
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
