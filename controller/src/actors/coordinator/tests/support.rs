use ractor::{Actor, ActorRef};
use serde_json::json;
use shared_types::{ControllerConfiguration, PlayerCommand, PlayerConfiguration};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Semaphore;

use crate::actors::coordinator::{
    wire_receiver, ControllerActor, ControllerArguments, ControllerMsg, ControllerOptions,
    ControllerSnapshot,
};
use crate::actors::receiver::{Dispatch, InboundMessage, InboundPayload, MessageReceiver};
use crate::actors::sender::MessageSender;
use crate::actors::surface::RecordingSurface;
use crate::fetch::{
    item_config_path, ConfigSource, DirConfigSource, FetchError, ASSESSMENT_CONFIG_PATH,
};
use crate::launch::LaunchParameters;
use crate::transport::{MemoryTransport, TargetRef};

pub(crate) const ORIGIN: &str = "http://localhost:8080";

pub(crate) struct TestController {
    pub controller: ActorRef<ControllerMsg>,
    pub receiver: MessageReceiver,
    pub transport: MemoryTransport,
    pub surface: RecordingSurface,
    pub dir: TempDir,
}

pub(crate) fn two_player_config() -> ControllerConfiguration {
    ControllerConfiguration {
        trace_log_transmission: None,
        math_jax_cdn_url: None,
        item_size: None,
        players: vec![
            PlayerConfiguration {
                player_id: "p1".to_string(),
                runtime_version: "1".to_string(),
                frame_content_file: "index.html".to_string(),
            },
            PlayerConfiguration {
                player_id: "p2".to_string(),
                runtime_version: "2".to_string(),
                frame_content_file: "index.html".to_string(),
            },
        ],
        show_player_info: false,
    }
}

pub(crate) fn write_json(root: &Path, path: &str, value: serde_json::Value) {
    let file = root.join(path);
    std::fs::create_dir_all(file.parent().unwrap()).unwrap();
    std::fs::write(file, value.to_string()).unwrap();
}

/// i1 (runtime "1") holds t1 and t2, i2 (runtime "2") holds t3.
pub(crate) fn write_default_assessment(root: &Path) {
    write_json(
        root,
        ASSESSMENT_CONFIG_PATH,
        json!({"tasks": [
            {"item": "i1", "task": "t1", "scope": "A"},
            {"item": "i1", "task": "t2", "scope": "A"},
            {"item": "i2", "task": "t3", "scope": "A"}
        ]}),
    );
    write_json(
        root,
        &item_config_path("i1"),
        json!({"name": "i1", "runtimeCompatibilityVersion": "1"}),
    );
    write_json(
        root,
        &item_config_path("i2"),
        json!({"name": "i2", "runtimeCompatibilityVersion": "2"}),
    );
}

/// Directory source whose item fetches wait until `open` is called
pub(crate) struct GatedItemSource {
    inner: DirConfigSource,
    gate: Arc<Semaphore>,
}

impl GatedItemSource {
    pub fn new(root: impl Into<PathBuf>) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let source = Self {
            inner: DirConfigSource::new(root),
            gate: gate.clone(),
        };
        (source, gate)
    }
}

#[async_trait::async_trait]
impl ConfigSource for GatedItemSource {
    async fn fetch_document(&self, path: &str) -> Result<serde_json::Value, FetchError> {
        if path.starts_with("items/") {
            let _permit = self.gate.acquire().await.unwrap();
        }
        self.inner.fetch_document(path).await
    }
}

pub(crate) async fn setup_test_controller(
    controller_config: ControllerConfiguration,
    options: ControllerOptions,
) -> TestController {
    let dir = TempDir::new().unwrap();
    let source = Arc::new(DirConfigSource::new(dir.path()));
    spawn_test_controller(dir, source, controller_config, options).await
}

pub(crate) async fn spawn_test_controller(
    dir: TempDir,
    config_source: Arc<dyn ConfigSource>,
    controller_config: ControllerConfiguration,
    options: ControllerOptions,
) -> TestController {
    let transport = MemoryTransport::new();
    transport.set_host_attached(true);
    let surface = RecordingSurface::new();

    let args = ControllerArguments {
        controller_config,
        config_source,
        sender: MessageSender::new(Arc::new(transport.clone())),
        surface: Arc::new(surface.clone()),
        launch: LaunchParameters::from_query("session=launch-user-7", "session"),
        options: ControllerOptions {
            trusted_origin: ORIGIN.to_string(),
            ..options
        },
    };
    let (controller, _handle) = Actor::spawn(None, ControllerActor, args).await.unwrap();

    let mut receiver = MessageReceiver::new(ORIGIN);
    wire_receiver(&mut receiver, controller.clone());

    TestController {
        controller,
        receiver,
        transport,
        surface,
        dir,
    }
}

pub(crate) fn target(player_id: &str) -> TargetRef {
    TargetRef::from(format!("frame-{player_id}"))
}

/// Target of a frame's second connection
pub(crate) fn reconnected(player_id: &str) -> TargetRef {
    TargetRef::from(format!("frame-{player_id}-reconnected"))
}

impl TestController {
    pub fn mount(&self, player_id: &str, runtime_version: &str) {
        self.mount_on(player_id, runtime_version, target(player_id));
    }

    pub fn mount_on(&self, player_id: &str, runtime_version: &str, target: TargetRef) {
        self.controller
            .send_message(ControllerMsg::PlayerMounted {
                player_id: player_id.to_string(),
                runtime_version: runtime_version.to_string(),
                target,
            })
            .unwrap();
    }

    pub fn detach(&self, target: TargetRef) {
        self.controller
            .send_message(ControllerMsg::PlayerDetached { target })
            .unwrap();
    }

    pub fn player_event(&self, player_id: &str, event: serde_json::Value) -> Dispatch {
        self.event_from(target(player_id), event)
    }

    pub fn event_from(&self, source: TargetRef, event: serde_json::Value) -> Dispatch {
        self.receiver
            .process(InboundMessage::player(ORIGIN, source, event.to_string()))
    }

    pub fn ready(&self, player_id: &str) {
        let dispatch = self.player_event(player_id, json!({"eventType": "taskPlayerReady"}));
        assert_eq!(dispatch, Dispatch::Delivered("taskPlayerReady"));
    }

    pub fn host_message(&self, message: serde_json::Value) -> Dispatch {
        self.receiver
            .process(InboundMessage::host(ORIGIN, None, InboundPayload::Json(message)))
    }

    /// Round-trips through the mailbox, so every earlier message is handled.
    pub async fn snapshot(&self) -> ControllerSnapshot {
        ractor::call!(self.controller, |reply| ControllerMsg::GetSnapshot { reply }).unwrap()
    }

    pub fn commands(&self, player_id: &str) -> Vec<PlayerCommand> {
        self.transport.commands_to(&target(player_id))
    }

    pub fn count(&self, player_id: &str, event_type: &str) -> usize {
        self.commands(player_id)
            .iter()
            .filter(|c| c.event_type() == event_type)
            .count()
    }

    /// Poll until `check` holds; background fetches finish on their own time.
    pub async fn eventually(&self, check: impl Fn(&Self) -> bool) -> bool {
        for _ in 0..300 {
            self.snapshot().await;
            if check(self) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    /// Mount and ready both players, close the login on p2 and wait for the
    /// first task to start.
    pub async fn start_running_session(&self) {
        write_default_assessment(self.dir.path());
        self.mount("p1", "1");
        self.mount("p2", "2");
        self.ready("p1");
        self.ready("p2");
        self.player_event(
            "p2",
            json!({"eventType": "loginDialogClosed", "fieldValue": "nick"}),
        );
        assert!(
            self.eventually(|t| t.count("p1", "startTask") == 1).await,
            "first task never started"
        );
        self.transport.clear();
    }

    pub fn stop(self) {
        self.controller.stop(None);
    }
}
