//! Integration tests for the core crate.

use pretty_assertions::assert_eq;
use robodash_core::api::{Command, NewTask};
use robodash_core::notify::Inbox;
use robodash_core::progress::step_for_status;
use robodash_core::stations::group_slot_records;
use robodash_core::wizard::{Effect, Step, TaskWizard, WizardError};
use robodash_core::{fallback_classify, Category, Priority, SlotRecord, Task, TaskId, User};

fn fixed_id() -> TaskId {
    TaskId::from_str("01HZX0000000000000000000AB")
}

fn availability() -> Vec<SlotRecord> {
    serde_json::from_str(
        r#"[
            {"station": "StationA", "slot": 1, "status": true},
            {"station": "StationA", "slot": 2, "status": true},
            {"station": "StationA", "slot": 3, "status": true},
            {"station": "StationB", "slot": 1, "status": false},
            {"station": "StationB", "slot": 2, "status": true},
            {"station": "StationB", "slot": 3, "status": true}
        ]"#,
    )
    .unwrap()
}

#[test]
fn test_delivery_request_end_to_end() {
    let (mut wizard, effects) = TaskWizard::new(Some("bob".into()), fixed_id);
    assert_eq!(effects, vec![Effect::LoadUsers]);
    wizard.set_users(vec![
        User {
            username: "alice".into(),
            email: "alice@hospital.test".into(),
        },
        User {
            username: "bob".into(),
            email: "bob@hospital.test".into(),
        },
    ]);

    wizard.select_receiver("alice");
    assert_eq!(wizard.next().unwrap(), vec![Effect::FetchStations]);

    wizard.set_stations(Ok(group_slot_records(availability())));
    wizard.select_pickup("StationA").unwrap();
    assert_eq!(wizard.dropoff_options(), vec!["StationB"]);
    assert_eq!(wizard.select_dropoff("StationB").unwrap(), vec![2, 3]);
    wizard.select_slot(2).unwrap();
    assert!(wizard.next().unwrap().is_empty());
    assert_eq!(wizard.step(), Step::ItemDetails);

    wizard.set_description("deliver prescription pills");
    let effects = wizard.next().unwrap();
    let Effect::Classify { description } = &effects[0] else {
        panic!("expected a classify effect, got {effects:?}");
    };
    // Classification service is down: keyword fallback.
    let result = fallback_classify(description);
    assert_eq!(result.category, Category::Medicine);
    assert_eq!(result.priority.get(), 1);
    assert!(result.is_adjustable());
    wizard.apply_classification(result);

    wizard.next().unwrap();
    assert_eq!(wizard.step(), Step::Review);

    let effects = wizard.next().unwrap();
    assert_eq!(wizard.step(), Step::Progress);
    assert_eq!(
        effects,
        vec![Effect::Dispatch(Command::AddTask(NewTask {
            task_id: fixed_id(),
            start: "StationA".into(),
            end: "StationB".into(),
            slot: 2,
            priority: Priority::HIGHEST,
            receiver: "alice".into(),
            sender: Some("bob".into()),
            description: "deliver prescription pills".into(),
        }))]
    );

    // Going back and confirming again never sends a second AddTask.
    assert!(wizard.back().is_empty());
    assert_eq!(wizard.step(), Step::Review);
    assert!(wizard.next().unwrap().is_empty());
    assert!(wizard.is_dispatched());
}

#[test]
fn test_blocked_steps_keep_position() {
    let (mut wizard, _) = TaskWizard::new(None, fixed_id);
    assert_eq!(wizard.next(), Err(WizardError::MissingRecipient));
    assert_eq!(wizard.step(), Step::Recipient);

    wizard.select_receiver("alice");
    wizard.next().unwrap();
    wizard.set_stations(Ok(group_slot_records(availability())));
    wizard.select_pickup("StationA").unwrap();
    let err = wizard.next().unwrap_err();
    assert_eq!(
        err.to_string(),
        "Please select pickup station, slot, and dropoff station before proceeding."
    );
    assert_eq!(wizard.step(), Step::Location);
}

#[test]
fn test_receive_queue_feeds_inbox() {
    let received: Vec<Task> = serde_json::from_str(
        r#"[
            {"taskID": 101, "sender": "bob", "receiver": "alice", "status": "WaitingCollection",
             "progress": "UnloadingDone", "start_station": "StationA", "end_station": "StationB",
             "slot": 2, "priority": 1, "description": "pills"},
            {"taskID": "102", "sender": "bob", "receiver": "alice", "status": "Ongoing",
             "progress": "MoveToEnd", "start_station": "StationA", "end_station": "StationB",
             "slot": 3, "priority": 4, "description": "linen", "timestamp": 1718000000000}
        ]"#,
    )
    .unwrap();

    let mut inbox = Inbox::default();
    let fresh = inbox.refresh(&received);
    assert_eq!(fresh.len(), 1);
    assert_eq!(fresh[0].task_id.as_str(), "101");

    let persisted = inbox.dismiss_all();
    let mut next_session = Inbox::new(persisted.into_iter().collect());
    assert!(next_session.refresh(&received).is_empty());
}

#[test]
fn test_status_steps_from_wire() {
    let report: robodash_core::StatusReport =
        serde_json::from_str(r#"{"status": "Moving to Dropoff", "timestamp": 1}"#).unwrap();
    assert_eq!(step_for_status(&report.status), 4);
    assert_eq!(step_for_status("Idle"), 0);
}
