use esi_remote_client::{ClientError, OperatorActor, Save, Tracked};
use esi_remote_test::{
    active_json, actor_json, actor_updated_answer, actors_envelope, connect, property_json,
    save_json, save_loaded_answer, MockTransport,
};
use serde_json::{json, Value};

const SAVE_FILES: &str = "save-files";
const ACTIVE_SAVE: &str = "save-files/active";
const OPERATOR_ACTORS: &str = "operatoractors";

fn ten_save_snapshot() -> Value {
    let mut saves = vec![save_json(
        1,
        "alpha",
        "/saves/alpha.esi",
        vec![save_json(1, "alpha", "/saves/alpha/nested.esi", vec![])],
    )];
    for id in 2..=10 {
        saves.push(save_json(
            id,
            &format!("scenario-{id}"),
            &format!("/saves/{id}.esi"),
            vec![],
        ));
    }
    Value::Array(saves)
}

fn assert_tree_clean(save: &Save) {
    assert!(!save.has_pending_changes());
    for sub in &save.sub_saves() {
        assert_tree_clean(sub);
    }
}

#[test]
fn loading_a_sub_save_commits_and_refreshes_the_session() {
    let _ = env_logger::builder().is_test(true).try_init();

    let transport = MockTransport::new();
    transport.queue_get(SAVE_FILES, ten_save_snapshot());
    transport.queue_get(ACTIVE_SAVE, active_json(99, "previous"));
    transport.queue_get(OPERATOR_ACTORS, actors_envelope(vec![]));
    let session = connect(&transport);

    assert_eq!(session.save_files().len(), 10);
    assert_eq!(session.active_scenario().unwrap().scenario_id(), 99);

    transport.queue_put_answer(SAVE_FILES, save_loaded_answer());
    transport.queue_get(ACTIVE_SAVE, active_json(1, "alpha"));

    let nested = session.save_files()[0].sub_saves().first().unwrap();
    nested.load().unwrap();

    // Exactly one PUT went out, carrying the staged load.
    assert_eq!(
        transport.puts(),
        vec![(
            SAVE_FILES.to_string(),
            json!({ "absolutePath": "/saves/alpha/nested.esi" })
        )]
    );
    // The commit re-fetched the active scenario, then the save list.
    assert_eq!(
        transport.gets(),
        vec![
            SAVE_FILES.to_string(),
            ACTIVE_SAVE.to_string(),
            OPERATOR_ACTORS.to_string(),
            ACTIVE_SAVE.to_string(),
            SAVE_FILES.to_string(),
        ]
    );
    assert_eq!(session.active_scenario().unwrap().scenario_id(), 1);
    assert_eq!(session.active_scenario().unwrap().scenario_name(), "alpha");
    for save in &session.save_files() {
        assert_tree_clean(save);
    }
}

#[test]
fn an_unexpected_put_answer_is_a_protocol_violation() {
    let transport = MockTransport::new();
    transport.queue_get(SAVE_FILES, ten_save_snapshot());
    transport.queue_get(ACTIVE_SAVE, active_json(99, "previous"));
    transport.queue_get(OPERATOR_ACTORS, actors_envelope(vec![]));
    let session = connect(&transport);

    transport.queue_put_answer(SAVE_FILES, json!({ "answer": "something else entirely" }));

    let result = session.save_files()[0].load();

    assert!(matches!(
        result,
        Err(ClientError::UnexpectedAnswer {
            endpoint: "save-files",
            ..
        })
    ));
}

#[test]
fn a_property_edit_commits_through_the_actor_and_clears_on_ack() {
    let transport = MockTransport::new();
    transport.queue_get(SAVE_FILES, Value::Array(vec![]));
    transport.queue_get(ACTIVE_SAVE, active_json(1, "alpha"));
    transport.queue_get(
        OPERATOR_ACTORS,
        actors_envelope(vec![actor_json(
            7,
            "Weather",
            vec![property_json("speed", "int", "3")],
            vec![],
            vec![],
        )]),
    );
    let session = connect(&transport);
    transport.queue_put_answer(OPERATOR_ACTORS, actor_updated_answer());

    let actor = session.operator_actors().first().unwrap();
    let speed = actor.properties().first().unwrap();
    speed.set_value(5).unwrap();

    assert_eq!(
        transport.puts(),
        vec![(
            OPERATOR_ACTORS.to_string(),
            json!({
                "properties": [ { "name": "speed", "value": "5" } ],
                "id": 7,
            })
        )]
    );
    // Acknowledged payloads are cleared down to the children.
    assert!(!actor.has_pending_changes());
    assert!(!speed.has_pending_changes());
    // The refreshed actor list reuses the same entity.
    let refreshed = session.operator_actors().first().unwrap();
    assert!(OperatorActor::ptr_eq(&refreshed, &actor));
}

#[test]
fn autocommit_off_holds_changes_until_an_explicit_commit() {
    let transport = MockTransport::new();
    transport.queue_get(SAVE_FILES, Value::Array(vec![]));
    transport.queue_get(ACTIVE_SAVE, active_json(1, "alpha"));
    transport.queue_get(
        OPERATOR_ACTORS,
        actors_envelope(vec![actor_json(
            7,
            "Weather",
            vec![property_json("speed", "int", "3")],
            vec![],
            vec![],
        )]),
    );
    let session = connect(&transport);
    session.set_autocommit(false);

    let actor = session.operator_actors().first().unwrap();
    actor.properties().first().unwrap().set_value(5).unwrap();

    // The edit is staged and aggregated, but nothing went out.
    assert!(transport.puts().is_empty());
    assert!(actor.has_pending_changes());

    transport.queue_put_answer(OPERATOR_ACTORS, actor_updated_answer());
    session.commit_operator_actors(true).unwrap();

    assert_eq!(transport.puts().len(), 1);
    assert!(!actor.has_pending_changes());
}
