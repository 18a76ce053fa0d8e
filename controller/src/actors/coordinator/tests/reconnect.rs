use serde_json::json;
use shared_types::{PlayerCommand, TaskIdentification};

use crate::actors::coordinator::{show_login_command, ControllerOptions};
use crate::actors::receiver::Dispatch;
use crate::transport::TargetRef;

use super::support::{
    reconnected, setup_test_controller, target, two_player_config, write_default_assessment,
    TestController,
};

fn count_to(t: &TestController, target: &TargetRef, event_type: &str) -> usize {
    t.transport
        .commands_to(target)
        .iter()
        .filter(|c| c.event_type() == event_type)
        .count()
}

#[tokio::test]
async fn test_reconnected_player_takes_over_its_endpoint() {
    let t = setup_test_controller(two_player_config(), ControllerOptions::default()).await;
    t.mount("p1", "1");
    t.mount("p2", "2");
    t.ready("p1");
    t.ready("p2");
    t.snapshot().await;
    assert_eq!(t.count("p2", "showLogin"), 1);

    t.detach(target("p1"));
    t.mount_on("p1", "1", reconnected("p1"));
    let dispatch = t.event_from(reconnected("p1"), json!({"eventType": "taskPlayerReady"}));
    assert_eq!(dispatch, Dispatch::Delivered("taskPlayerReady"));

    let snapshot = t.snapshot().await;
    assert_eq!(snapshot.pending_ready, 0);
    assert!(snapshot.all_ready);
    let p1 = snapshot
        .players
        .iter()
        .find(|p| p.player_id == "p1")
        .unwrap();
    assert_eq!(p1.target, reconnected("p1"));

    // the reconnected frame completed the roster again
    assert!(t
        .transport
        .commands_to(&reconnected("p1"))
        .contains(&show_login_command()));
    assert_eq!(t.surface.visible(), vec!["p1".to_string()]);

    write_default_assessment(t.dir.path());
    t.event_from(
        reconnected("p1"),
        json!({"eventType": "loginDialogClosed", "fieldValue": "nick"}),
    );
    assert!(
        t.eventually(|t| count_to(t, &reconnected("p1"), "startTask") == 1)
            .await
    );
    assert_eq!(count_to(&t, &reconnected("p1"), "addItem"), 1);
    assert_eq!(
        t.transport.commands_to(&reconnected("p1")).last(),
        Some(&PlayerCommand::start_task(&TaskIdentification::new(
            "i1", "t1", "A"
        )))
    );
    assert_eq!(t.count("p1", "startTask"), 0);

    // requests from the new connection are not from an unknown sender
    t.transport.clear();
    t.event_from(
        reconnected("p1"),
        json!({"eventType": "taskSwitchRequest", "request": "cancelTask"}),
    );
    assert!(
        t.eventually(|t| count_to(t, &reconnected("p1"), "showLogin") == 1)
            .await
    );
    assert_eq!(count_to(&t, &reconnected("p1"), "stopTask"), 1);
    t.stop();
}

#[tokio::test]
async fn test_reloaded_player_gets_items_again() {
    let t = setup_test_controller(two_player_config(), ControllerOptions::default()).await;
    t.start_running_session().await;

    // the old socket has not closed yet when the frame comes back
    t.mount_on("p1", "1", reconnected("p1"));
    t.event_from(reconnected("p1"), json!({"eventType": "taskPlayerReady"}));
    t.snapshot().await;

    let commands = t.transport.commands_to(&reconnected("p1"));
    let kinds: Vec<&str> = commands.iter().map(|c| c.event_type()).collect();
    assert_eq!(
        kinds,
        vec![
            "setTraceLogTransmissionChannel",
            "setTraceContextId",
            "addItem",
            "showLogin"
        ]
    );
    match &commands[2] {
        PlayerCommand::AddItem { item_config, .. } => assert_eq!(item_config["name"], "i1"),
        other => panic!("unexpected command {other:?}"),
    }
    assert!(t.commands("p1").is_empty());
    assert_eq!(t.count("p2", "addItem"), 0);

    let snapshot = t.snapshot().await;
    assert_eq!(snapshot.players.len(), 2);
    assert_eq!(snapshot.pending_ready, 0);

    // the stale socket closing later changes nothing
    t.detach(target("p1"));
    let snapshot = t.snapshot().await;
    assert!(snapshot.all_ready);
    t.stop();
}

#[tokio::test]
async fn test_detach_discards_buffered_readiness() {
    let t = setup_test_controller(two_player_config(), ControllerOptions::default()).await;
    let ghost = TargetRef::from("frame-ghost");

    t.event_from(ghost.clone(), json!({"eventType": "taskPlayerReady"}));
    assert_eq!(t.snapshot().await.pending_ready, 1);

    t.detach(ghost);
    assert_eq!(t.snapshot().await.pending_ready, 0);
    t.stop();
}
