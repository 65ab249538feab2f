use std::{cell::RefCell, rc::Rc};

use esi_remote_client::{
    world::{OperatorActorRecord, SaveRecord},
    ClientError, CommitSink, Entity, OperatorActor, Save, Tracked,
};
use esi_remote_test::{action_json, actor_json, enum_field_json, property_enum_json, property_json, save_json};
use serde_json::{from_value, json, Value};

/// Sink that accepts every commit and records the force flags it saw.
#[derive(Default)]
struct RecordingSink {
    commits: RefCell<Vec<bool>>,
}

impl CommitSink for RecordingSink {
    fn commit(&self, force: bool) -> Result<(), ClientError> {
        self.commits.borrow_mut().push(force);
        Ok(())
    }
}

fn save_with_two_subs() -> Save {
    let record: SaveRecord = from_value(save_json(
        1,
        "parent",
        "/saves/parent.esi",
        vec![
            save_json(1, "parent", "/saves/parent/a.esi", vec![]),
            save_json(1, "parent", "/saves/parent/b.esi", vec![]),
        ],
    ))
    .expect("valid save record");
    Save::parse(record).expect("parses")
}

fn actor_with_children() -> OperatorActor {
    let record: OperatorActorRecord = from_value(actor_json(
        7,
        "Weather",
        vec![property_json("speed", "int", "3")],
        vec![property_enum_json(
            "quality",
            vec![enum_field_json(1, "low"), enum_field_json(2, "high")],
            enum_field_json(1, "low"),
        )],
        vec![action_json("reset")],
    ))
    .expect("valid actor record");
    OperatorActor::parse(record).expect("parses")
}

#[test]
fn save_commit_adopts_the_first_dirty_sub_save_only() {
    let save = save_with_two_subs();
    let sink = Rc::new(RecordingSink::default());
    save.bind_delegate(sink.clone());

    let subs = save.sub_saves();
    let a = subs[0].clone();
    let b = subs[1].clone();

    // Dirty the second sub first; its payload is adopted.
    b.load().unwrap();
    assert_eq!(
        Value::Object(save.pending_changes()),
        json!({ "absolutePath": "/saves/parent/b.esi" })
    );

    // With both dirty, the first sub in collection order wins.
    a.load().unwrap();
    assert_eq!(
        Value::Object(save.pending_changes()),
        json!({ "absolutePath": "/saves/parent/a.esi" })
    );

    // Both loads climbed the tree with the force flag set.
    assert_eq!(*sink.commits.borrow(), vec![true, true]);
}

#[test]
fn actor_commit_aggregates_only_dirty_collections() {
    let actor = actor_with_children();
    let sink = Rc::new(RecordingSink::default());
    actor.bind_delegate(sink.clone());

    actor.properties().first().unwrap().set_value(5).unwrap();
    actor.actions().first().unwrap().trigger().unwrap();

    // One dirty property and one dirty action: exactly their category
    // keys appear, plus the actor's id tag. The clean enum collection
    // contributes nothing.
    assert_eq!(
        Value::Object(actor.pending_changes()),
        json!({
            "properties": [ { "name": "speed", "value": "5" } ],
            "actions": [ { "name": "reset" } ],
            "id": 7,
        })
    );
    assert_eq!(*sink.commits.borrow(), vec![false, false]);
}

#[test]
fn enum_assignment_stages_the_selected_member() {
    let actor = actor_with_children();
    let sink = Rc::new(RecordingSink::default());
    actor.bind_delegate(sink.clone());

    let quality = actor.property_enums().first().unwrap();
    quality.set_current_value("high").unwrap();

    assert_eq!(quality.current_value().enum_field_value(), "high");
    assert_eq!(
        Value::Object(actor.pending_changes()),
        json!({
            "propertyEnums": [ {
                "currentValue": { "enumFieldId": 2, "enumFieldValue": "high" },
                "name": "quality",
            } ],
            "id": 7,
        })
    );
}

#[test]
fn visibility_is_staged_on_the_actor_itself() {
    let actor = actor_with_children();
    let sink = Rc::new(RecordingSink::default());
    actor.bind_delegate(sink.clone());

    actor.set_visible(false).unwrap();

    assert!(!actor.is_visible());
    assert_eq!(
        Value::Object(actor.pending_changes()),
        json!({ "isVisible": false, "id": 7 })
    );
}
