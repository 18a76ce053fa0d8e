use serde_json::json;
use shared_types::{HostEvent, LibraryPaths, PlayerCommand, TaskIdentification};
use std::sync::Arc;
use tempfile::TempDir;

use crate::actors::coordinator::ControllerOptions;
use crate::actors::task_sequencer::Position;
use crate::fetch::{item_config_path, ASSESSMENT_CONFIG_PATH};

use super::support::{
    setup_test_controller, spawn_test_controller, two_player_config, write_default_assessment,
    write_json, GatedItemSource, TestController,
};

async fn ready_roster() -> TestController {
    let t = setup_test_controller(two_player_config(), ControllerOptions::default()).await;
    t.mount("p1", "1");
    t.mount("p2", "2");
    t.ready("p1");
    t.ready("p2");
    t.snapshot().await;
    t.transport.clear();
    t
}

fn close_login(t: &TestController, player_id: &str) {
    t.player_event(
        player_id,
        json!({"eventType": "loginDialogClosed", "fieldValue": "nick"}),
    );
}

#[tokio::test]
async fn test_login_installs_items_and_starts_first_task() {
    let t = ready_roster().await;
    write_default_assessment(t.dir.path());

    close_login(&t, "p2");
    assert!(t.eventually(|t| t.count("p1", "startTask") == 1).await);

    for player in ["p1", "p2"] {
        let commands = t.commands(player);
        assert_eq!(commands[0], PlayerCommand::SetUserId { id: "nick".to_string() });
        assert_eq!(
            commands[1],
            PlayerCommand::SetTaskSequencer {
                target_window_type: "parent".to_string(),
                target_origin: "http://localhost:8080".to_string(),
            }
        );
        assert_eq!(
            commands[2],
            PlayerCommand::SetScalingConfiguration {
                scaling_mode: "scale-up-down".to_string(),
                alignment_horizontal: "center".to_string(),
                alignment_vertical: "center".to_string(),
            }
        );
        assert_eq!(t.count(player, "addItem"), 1);
    }

    // each item only lands on the player running its version
    match t.commands("p1").iter().find(|c| c.event_type() == "addItem") {
        Some(PlayerCommand::AddItem {
            item_config,
            resource_path,
            external_resource_path,
            library_paths_map,
        }) => {
            assert_eq!(item_config["name"], "i1");
            assert_eq!(resource_path, "../items/i1/resources");
            assert_eq!(external_resource_path, "../items/i1/external-resources");
            assert_eq!(
                library_paths_map,
                &LibraryPaths {
                    math_jax: "math-jax unknown".to_string()
                }
            );
        }
        other => panic!("unexpected command {other:?}"),
    }

    assert_eq!(
        t.commands("p1").last(),
        Some(&PlayerCommand::start_task(&TaskIdentification::new("i1", "t1", "A")))
    );
    assert_eq!(t.count("p2", "startTask"), 0);
    assert_eq!(t.surface.visible(), vec!["p1".to_string()]);
    assert!(t
        .transport
        .host_events()
        .contains(&HostEvent::ItemsLoadedInPlayer { player_count: 2 }));

    let snapshot = t.snapshot().await;
    assert_eq!(snapshot.items.len(), 2);
    assert!(snapshot.installing.is_empty());
    assert_eq!(snapshot.sequencer.position, Position::Positioned(0));
    assert_eq!(snapshot.sequencer.task_count, 3);
    t.stop();
}

#[tokio::test]
async fn test_second_login_does_not_reinstall_items() {
    let t = ready_roster().await;
    write_default_assessment(t.dir.path());

    close_login(&t, "p1");
    assert!(t.eventually(|t| t.count("p1", "startTask") == 1).await);
    close_login(&t, "p1");
    assert!(t.eventually(|t| t.count("p1", "startTask") == 2).await);

    assert_eq!(t.count("p1", "addItem"), 1);
    assert_eq!(t.count("p2", "addItem"), 1);
    t.stop();
}

#[tokio::test]
async fn test_missing_assessment_aborts_quietly() {
    let t = ready_roster().await;

    close_login(&t, "p1");
    // give the background fetch time to fail
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    let snapshot = t.snapshot().await;

    assert_eq!(snapshot.sequencer.position, Position::Uninitialized);
    assert_eq!(t.count("p1", "setUserId"), 1);
    assert_eq!(t.count("p1", "startTask"), 0);
    assert_eq!(t.count("p1", "setScalingConfiguration"), 0);
    t.stop();
}

#[tokio::test]
async fn test_empty_assessment_aborts() {
    let t = ready_roster().await;
    write_json(t.dir.path(), ASSESSMENT_CONFIG_PATH, json!({"tasks": []}));

    close_login(&t, "p1");
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    let snapshot = t.snapshot().await;

    assert_eq!(snapshot.sequencer.position, Position::Uninitialized);
    assert_eq!(t.count("p1", "startTask"), 0);
    t.stop();
}

#[tokio::test]
async fn test_failed_item_fetch_aborts_before_start() {
    let t = ready_roster().await;
    write_default_assessment(t.dir.path());
    write_json(
        t.dir.path(),
        &item_config_path("i2"),
        json!({"name": "i2"}),
    );

    close_login(&t, "p1");
    assert!(t.eventually(|t| t.count("p1", "addItem") == 1).await);
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    let snapshot = t.snapshot().await;

    assert_eq!(t.count("p1", "startTask"), 0);
    assert_eq!(t.count("p2", "addItem"), 0);
    assert_eq!(snapshot.items.len(), 1);
    assert!(snapshot.installing.is_empty());
    assert!(t.transport.host_events().is_empty());
    t.stop();
}

#[tokio::test]
async fn test_math_jax_url_from_controller_config() {
    let mut config = two_player_config();
    config.math_jax_cdn_url = Some("https://cdn.example/mathjax".to_string());
    let t = setup_test_controller(config, ControllerOptions::default()).await;
    t.mount("p1", "1");
    t.mount("p2", "2");
    t.ready("p1");
    t.ready("p2");
    write_default_assessment(t.dir.path());

    close_login(&t, "p1");
    assert!(t.eventually(|t| t.count("p2", "addItem") == 1).await);
    match t.commands("p2").iter().find(|c| c.event_type() == "addItem") {
        Some(PlayerCommand::AddItem {
            library_paths_map, ..
        }) => assert_eq!(library_paths_map.math_jax, "https://cdn.example/mathjax"),
        other => panic!("unexpected command {other:?}"),
    }
    t.stop();
}

#[tokio::test]
async fn test_overlapping_logins_install_items_once() {
    let dir = TempDir::new().unwrap();
    write_default_assessment(dir.path());
    let (source, gate) = GatedItemSource::new(dir.path());
    let t = spawn_test_controller(
        dir,
        Arc::new(source),
        two_player_config(),
        ControllerOptions::default(),
    )
    .await;
    t.mount("p1", "1");
    t.mount("p2", "2");
    t.ready("p1");
    t.ready("p2");

    close_login(&t, "p1");
    close_login(&t, "p2");

    // both assessments are loaded while the item fetches wait at the gate
    assert!(t.eventually(|t| t.count("p1", "setScalingConfiguration") == 2).await);
    let snapshot = t.snapshot().await;
    assert_eq!(snapshot.installing, vec!["i1".to_string(), "i2".to_string()]);
    assert_eq!(t.count("p1", "startTask"), 0);

    gate.add_permits(2);
    assert!(t.eventually(|t| t.count("p1", "startTask") == 1).await);
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    let snapshot = t.snapshot().await;

    assert_eq!(t.count("p1", "addItem"), 1);
    assert_eq!(t.count("p2", "addItem"), 1);
    assert_eq!(t.count("p1", "startTask"), 1);
    assert_eq!(t.count("p2", "startTask"), 0);
    assert_eq!(snapshot.items.len(), 2);
    assert!(snapshot.installing.is_empty());
    t.stop();
}

#[tokio::test]
async fn test_item_is_registered_under_its_configured_name() {
    let t = ready_roster().await;
    write_default_assessment(t.dir.path());
    write_json(
        t.dir.path(),
        &item_config_path("i2"),
        json!({"name": "i2-renamed", "runtimeCompatibilityVersion": "2"}),
    );

    close_login(&t, "p1");
    assert!(t.eventually(|t| t.count("p1", "startTask") == 1).await);
    let snapshot = t.snapshot().await;

    let names: Vec<&str> = snapshot.items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["i1", "i2-renamed"]);
    assert!(snapshot.installing.is_empty());
    match t.commands("p2").iter().find(|c| c.event_type() == "addItem") {
        Some(PlayerCommand::AddItem { resource_path, .. }) => {
            assert_eq!(resource_path, "../items/i2/resources")
        }
        other => panic!("unexpected command {other:?}"),
    }
    t.stop();
}
