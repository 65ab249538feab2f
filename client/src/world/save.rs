use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ClientError;

use super::{
    delegate::{CommitDelegate, CommitSink},
    entity::{Entity, Tracked},
    entity_list::EntityList,
    error::WorldError,
    pending::PendingChanges,
    reconcile::reconcile,
};

/// Wire shape of one save file, as returned by `GET save-files`.
/// Sub-saves nest recursively.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SaveRecord {
    pub scenario_id: i64,
    pub scenario_name: String,
    pub category_name: String,
    pub absolute_path: String,
    pub sub_saves: Vec<SaveRecord>,
}

#[derive(Debug)]
struct SaveState {
    scenario_id: i64,
    scenario_name: String,
    category_name: String,
    absolute_path: String,
    sub_saves: Vec<Save>,
    pending: PendingChanges,
    delegate: CommitDelegate,
}

/// A save file on the server, identified by its absolute path.
///
/// Saves form a tree; each sub-save's delegate points at its parent,
/// never at the session directly, so a sub-save commit climbs the tree
/// to the top-level save before reaching the session.
#[derive(Clone, Debug)]
pub struct Save {
    state: Rc<RefCell<SaveState>>,
}

/// Commit sink a save exposes to its sub-saves.
struct SaveSink {
    save: Weak<RefCell<SaveState>>,
}

impl CommitSink for SaveSink {
    fn commit(&self, force: bool) -> Result<(), ClientError> {
        let Some(state) = self.save.upgrade() else {
            return Err(WorldError::UnboundDelegate { entity: "Save" }.into());
        };
        Save { state }.commit(force)
    }
}

impl Save {
    /// Whether two handles share the same underlying save.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.state, &b.state)
    }

    pub fn scenario_id(&self) -> i64 {
        self.state.borrow().scenario_id
    }

    pub fn scenario_name(&self) -> String {
        self.state.borrow().scenario_name.clone()
    }

    pub fn category_name(&self) -> String {
        self.state.borrow().category_name.clone()
    }

    pub fn absolute_path(&self) -> String {
        self.state.borrow().absolute_path.clone()
    }

    pub fn sub_saves(&self) -> EntityList<Save> {
        EntityList::new(self.state.borrow().sub_saves.clone())
    }

    /// Stages a load of this save and force-commits it, bypassing the
    /// session's autocommit gate.
    pub fn load(&self) -> Result<(), ClientError> {
        let delegate = {
            let mut state = self.state.borrow_mut();
            let path = state.absolute_path.clone();
            state.pending.stage("absolutePath", Value::String(path));
            state.delegate.clone()
        };
        delegate.commit("Save", true)
    }

    /// Adopts the payload of the first dirty sub-save, if any, and
    /// forwards the commit to this save's delegate.
    ///
    /// At most one sub-save's payload is adopted per commit; it
    /// replaces this save's own pending map wholesale, no merging.
    pub fn commit(&self, force: bool) -> Result<(), ClientError> {
        let delegate = {
            let mut state = self.state.borrow_mut();
            let adopted = state
                .sub_saves
                .iter()
                .find(|sub| sub.has_pending_changes())
                .map(|sub| sub.pending_changes());
            if let Some(fields) = adopted {
                state.pending.replace(fields);
            }
            state.delegate.clone()
        };
        delegate.commit("Save", force)
    }

    fn bind_sub_saves(&self) {
        let sink: Rc<dyn CommitSink> = Rc::new(SaveSink {
            save: Rc::downgrade(&self.state),
        });
        let sub_saves = self.state.borrow().sub_saves.clone();
        for sub in &sub_saves {
            sub.bind_delegate(sink.clone());
        }
    }
}

impl Entity for Save {
    type Record = SaveRecord;

    fn parse(record: SaveRecord) -> Result<Self, WorldError> {
        let mut sub_saves = Vec::with_capacity(record.sub_saves.len());
        for sub_record in record.sub_saves {
            sub_saves.push(Save::parse(sub_record)?);
        }
        let save = Self {
            state: Rc::new(RefCell::new(SaveState {
                scenario_id: record.scenario_id,
                scenario_name: record.scenario_name,
                category_name: record.category_name,
                absolute_path: record.absolute_path,
                sub_saves,
                pending: PendingChanges::new(),
                delegate: CommitDelegate::default(),
            })),
        };
        save.bind_sub_saves();
        Ok(save)
    }

    fn update_in_place(&self, record: SaveRecord) -> Result<(), WorldError> {
        let SaveRecord {
            scenario_id,
            scenario_name,
            category_name,
            absolute_path,
            sub_saves,
        } = record;
        let next_subs = reconcile(
            &self.state.borrow().sub_saves,
            sub_saves,
            |sub| sub.absolute_path(),
            |sub_record| sub_record.absolute_path.clone(),
        )?;
        {
            let mut state = self.state.borrow_mut();
            state.pending.clear();
            state.scenario_id = scenario_id;
            state.scenario_name = scenario_name;
            state.category_name = category_name;
            state.absolute_path = absolute_path;
            state.sub_saves = next_subs;
        }
        self.bind_sub_saves();
        Ok(())
    }
}

impl Tracked for Save {
    fn pending_changes(&self) -> Map<String, Value> {
        self.state.borrow().pending.to_map()
    }

    fn has_pending_changes(&self) -> bool {
        !self.state.borrow().pending.is_empty()
    }

    /// Clears this save's pending map and, recursively, every
    /// sub-save's. Public escape hatch: a driver may call this to
    /// suppress accidental double-deposit of staged changes across
    /// commit cycles.
    fn clear_pending_changes(&self) {
        let sub_saves = {
            let mut state = self.state.borrow_mut();
            state.pending.clear();
            state.sub_saves.clone()
        };
        for sub in &sub_saves {
            sub.clear_pending_changes();
        }
    }

    fn bind_delegate(&self, sink: Rc<dyn CommitSink>) {
        self.state.borrow_mut().delegate.bind(sink);
    }
}
