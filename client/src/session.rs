use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::{
    error::ClientError,
    session_config::SessionConfig,
    transport::{HttpTransport, Transport},
    world::{
        reconcile, ActiveScenario, ActiveScenarioRecord, CommitSink, Entity, EntityList,
        OperatorActor, OperatorActorsEnvelope, Save, SaveRecord, Tracked, WorldError,
    },
};

const SAVE_FILES_PATH: &str = "save-files";
const ACTIVE_SAVE_PATH: &str = "save-files/active";
const OPERATOR_ACTORS_PATH: &str = "operatoractors";

const SAVE_LOADED_ANSWER: &str = "save file has been loaded";
const ACTOR_UPDATED_ANSWER: &str = "actor has been updated";

struct SessionCore {
    transport: Box<dyn Transport>,
    autocommit: bool,
    save_files: Vec<Save>,
    active: Option<ActiveScenario>,
    operator_actors: Vec<OperatorActor>,
}

/// Commit sink the session exposes to top-level saves.
struct SaveCommitPoint {
    core: Weak<RefCell<SessionCore>>,
}

impl CommitSink for SaveCommitPoint {
    fn commit(&self, force: bool) -> Result<(), ClientError> {
        let Some(core) = self.core.upgrade() else {
            return Err(WorldError::UnboundDelegate { entity: "Save" }.into());
        };
        commit_saves(&core, force)
    }
}

/// Commit sink the session exposes to operator actors.
struct ActorCommitPoint {
    core: Weak<RefCell<SessionCore>>,
}

impl CommitSink for ActorCommitPoint {
    fn commit(&self, force: bool) -> Result<(), ClientError> {
        let Some(core) = self.core.upgrade() else {
            return Err(WorldError::UnboundDelegate {
                entity: "OperatorActor",
            }
            .into());
        };
        commit_actors(&core, force)
    }
}

fn decode<T: DeserializeOwned>(endpoint: &'static str, body: Value) -> Result<T, ClientError> {
    serde_json::from_value(body).map_err(|source| ClientError::Decode { endpoint, source })
}

fn expect_answer(
    endpoint: &'static str,
    expected: &str,
    answer: &Value,
) -> Result<(), ClientError> {
    if *answer == json!({ "answer": expected }) {
        return Ok(());
    }
    Err(ClientError::UnexpectedAnswer {
        endpoint,
        response: answer.to_string(),
    })
}

fn fetch_saves(core: &Rc<RefCell<SessionCore>>) -> Result<(), ClientError> {
    let body = core.borrow_mut().transport.get(SAVE_FILES_PATH)?;
    let records: Vec<SaveRecord> = decode(SAVE_FILES_PATH, body)?;
    debug!("fetched {} save file(s)", records.len());
    let next = reconcile(
        &core.borrow().save_files,
        records,
        |save| save.absolute_path(),
        |record| record.absolute_path.clone(),
    )?;
    let sink: Rc<dyn CommitSink> = Rc::new(SaveCommitPoint {
        core: Rc::downgrade(core),
    });
    for save in &next {
        save.bind_delegate(sink.clone());
    }
    core.borrow_mut().save_files = next;
    Ok(())
}

fn fetch_active(core: &Rc<RefCell<SessionCore>>) -> Result<(), ClientError> {
    let body = core.borrow_mut().transport.get(ACTIVE_SAVE_PATH)?;
    let record: ActiveScenarioRecord = decode(ACTIVE_SAVE_PATH, body)?;
    debug!(
        "active scenario is '{}' ({})",
        record.scenario_name, record.scenario_id
    );
    let existing = core.borrow().active.clone();
    match existing {
        Some(active) => active.update_in_place(record)?,
        None => {
            let active = ActiveScenario::parse(record)?;
            core.borrow_mut().active = Some(active);
        }
    }
    Ok(())
}

fn fetch_actors(core: &Rc<RefCell<SessionCore>>) -> Result<(), ClientError> {
    let body = core.borrow_mut().transport.get(OPERATOR_ACTORS_PATH)?;
    let envelope: OperatorActorsEnvelope = decode(OPERATOR_ACTORS_PATH, body)?;
    debug!("fetched {} operator actor(s)", envelope.operator_actors.len());
    let next = reconcile(
        &core.borrow().operator_actors,
        envelope.operator_actors,
        |actor| actor.id(),
        |record| record.id,
    )?;
    let sink: Rc<dyn CommitSink> = Rc::new(ActorCommitPoint {
        core: Rc::downgrade(core),
    });
    for actor in &next {
        actor.bind_delegate(sink.clone());
    }
    core.borrow_mut().operator_actors = next;
    Ok(())
}

/// Sends the first dirty save's payload, verifies the server's answer,
/// and refreshes the active scenario and save list.
///
/// Every walked save's pending map (and its sub-saves') ends cleared.
/// Dirty saves after the first are discarded, not merged.
fn commit_saves(core: &Rc<RefCell<SessionCore>>, force: bool) -> Result<(), ClientError> {
    if !(force || core.borrow().autocommit) {
        return Ok(());
    }
    let saves = core.borrow().save_files.clone();
    let mut committed = false;
    for save in &saves {
        if save.has_pending_changes() && !committed {
            let payload = Value::Object(save.pending_changes());
            debug!("PUT {} for save '{}'", SAVE_FILES_PATH, save.absolute_path());
            let answer = core.borrow_mut().transport.put(SAVE_FILES_PATH, &payload)?;
            expect_answer(SAVE_FILES_PATH, SAVE_LOADED_ANSWER, &answer)?;
            committed = true;
            fetch_active(core)?;
            fetch_saves(core)?;
        } else if save.has_pending_changes() {
            warn!(
                "discarding staged changes on save '{}', another save was already committed this pass",
                save.absolute_path()
            );
        }
        save.clear_pending_changes();
    }
    Ok(())
}

/// Sends every dirty actor's payload, verifying the server's answer
/// after each, then refreshes the actor list.
fn commit_actors(core: &Rc<RefCell<SessionCore>>, force: bool) -> Result<(), ClientError> {
    if !(force || core.borrow().autocommit) {
        return Ok(());
    }
    let actors = core.borrow().operator_actors.clone();
    for actor in &actors {
        if !actor.has_pending_changes() {
            continue;
        }
        let payload = Value::Object(actor.pending_changes());
        debug!("PUT {} for actor {}", OPERATOR_ACTORS_PATH, actor.id());
        let answer = core
            .borrow_mut()
            .transport
            .put(OPERATOR_ACTORS_PATH, &payload)?;
        expect_answer(OPERATOR_ACTORS_PATH, ACTOR_UPDATED_ANSWER, &answer)?;
        actor.clear_committed_changes();
    }
    fetch_actors(core)?;
    Ok(())
}

/// Stateful session with the simulation server.
///
/// Holds the local mirror of the server's save files, active scenario,
/// and operator actors, and is the only place real network calls
/// happen. Entity mutators commit through the session's sinks; the
/// autocommit flag gates whether those commits go out immediately.
pub struct RemoteSession {
    core: Rc<RefCell<SessionCore>>,
}

impl RemoteSession {
    /// Connects over HTTP and performs the initial fetch of all three
    /// collections.
    pub fn connect(config: SessionConfig) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(&config)?;
        Self::connect_with(config, Box::new(transport))
    }

    /// Connects over a caller-supplied transport.
    pub fn connect_with(
        config: SessionConfig,
        transport: Box<dyn Transport>,
    ) -> Result<Self, ClientError> {
        info!("connecting to {}:{}", config.host, config.port);
        let core = Rc::new(RefCell::new(SessionCore {
            transport,
            autocommit: config.autocommit,
            save_files: Vec::new(),
            active: None,
            operator_actors: Vec::new(),
        }));
        fetch_saves(&core)?;
        fetch_active(&core)?;
        fetch_actors(&core)?;
        Ok(Self { core })
    }

    pub fn save_files(&self) -> EntityList<Save> {
        EntityList::new(self.core.borrow().save_files.clone())
    }

    pub fn active_scenario(&self) -> Option<ActiveScenario> {
        self.core.borrow().active.clone()
    }

    pub fn operator_actors(&self) -> EntityList<OperatorActor> {
        EntityList::new(self.core.borrow().operator_actors.clone())
    }

    /// Refreshes the save list from the server, reusing entities whose
    /// absolute path persists.
    pub fn update_save_files(&self) -> Result<(), ClientError> {
        fetch_saves(&self.core)
    }

    /// Refreshes the active scenario from the server.
    pub fn update_active_scenario(&self) -> Result<(), ClientError> {
        fetch_active(&self.core)
    }

    /// Refreshes the actor list from the server, reusing entities whose
    /// id persists.
    pub fn update_operator_actors(&self) -> Result<(), ClientError> {
        fetch_actors(&self.core)
    }

    /// Commits staged save changes. With `force` the autocommit gate is
    /// bypassed.
    pub fn commit_save_files(&self, force: bool) -> Result<(), ClientError> {
        commit_saves(&self.core, force)
    }

    /// Commits staged actor changes. With `force` the autocommit gate
    /// is bypassed.
    pub fn commit_operator_actors(&self, force: bool) -> Result<(), ClientError> {
        commit_actors(&self.core, force)
    }

    pub fn autocommit(&self) -> bool {
        self.core.borrow().autocommit
    }

    pub fn set_autocommit(&self, autocommit: bool) {
        self.core.borrow_mut().autocommit = autocommit;
    }
}
