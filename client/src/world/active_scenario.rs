use std::{cell::RefCell, rc::Rc};

use serde::Deserialize;

use super::{entity::Entity, error::WorldError};

/// Wire shape of `GET save-files/active`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ActiveScenarioRecord {
    pub scenario_id: i64,
    pub scenario_name: String,
}

#[derive(Debug)]
struct ActiveScenarioState {
    scenario_id: i64,
    scenario_name: String,
}

/// The scenario the server is currently running.
///
/// Read-only: refreshed wholesale from the server, never mutated by the
/// caller, and it stages no changes.
#[derive(Clone, Debug)]
pub struct ActiveScenario {
    state: Rc<RefCell<ActiveScenarioState>>,
}

impl ActiveScenario {
    pub fn scenario_id(&self) -> i64 {
        self.state.borrow().scenario_id
    }

    pub fn scenario_name(&self) -> String {
        self.state.borrow().scenario_name.clone()
    }
}

impl Entity for ActiveScenario {
    type Record = ActiveScenarioRecord;

    fn parse(record: ActiveScenarioRecord) -> Result<Self, WorldError> {
        Ok(Self {
            state: Rc::new(RefCell::new(ActiveScenarioState {
                scenario_id: record.scenario_id,
                scenario_name: record.scenario_name,
            })),
        })
    }

    fn update_in_place(&self, record: ActiveScenarioRecord) -> Result<(), WorldError> {
        let mut state = self.state.borrow_mut();
        state.scenario_id = record.scenario_id;
        state.scenario_name = record.scenario_name;
        Ok(())
    }
}
