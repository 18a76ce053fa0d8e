//! ControllerActor message protocol
//!
//! Every inbound wire event becomes one `ControllerMsg`. Results of
//! configuration fetches come back into the mailbox as messages too, so all
//! state changes happen in arrival order inside the actor.

use ractor::RpcReplyPort;
use serde::Serialize;
use shared_types::{AssessmentConfiguration, SwitchRequestKind, TaskIdentification, TaskRequestDetails};

use crate::actors::item_registry::ItemSnapshot;
use crate::actors::player_registry::PlayerSnapshot;
use crate::actors::task_sequencer::SequencerSnapshot;
use crate::fetch::{FetchError, FetchedItem};
use crate::transport::TargetRef;

/// Messages handled by ControllerActor
#[derive(Debug)]
pub enum ControllerMsg {
    /// A configured task player frame connected
    PlayerMounted {
        player_id: String,
        runtime_version: String,
        target: TargetRef,
    },
    /// The websocket behind `target` closed
    PlayerDetached { target: TargetRef },
    /// `taskPlayerReady` from a frame
    PlayerReady { source: TargetRef },
    /// `loginDialogClosed` from a frame
    LoginDialogClosed { source: TargetRef, user_id: String },
    /// `taskSwitchRequest` from a frame
    TaskSwitchRequested {
        source: TargetRef,
        request: SwitchRequestKind,
        details: Option<TaskRequestDetails>,
    },
    /// `navigate_to` from the hosting page
    NavigateTo { task: TaskIdentification },
    /// `preload_state` from the hosting page
    PreloadState { state: String },
    /// Relays to the hosting page
    ScoringResult { source: TargetRef, result: String },
    TraceLog {
        source: TargetRef,
        meta_data: String,
        entries: Vec<String>,
    },
    Recording {
        source: TargetRef,
        meta_data: String,
        entries: Vec<String>,
    },
    TasksState {
        source: TargetRef,
        user_id: String,
        state: String,
    },
    /// Assessment configuration fetch finished
    AssessmentFetched {
        result: Result<AssessmentConfiguration, FetchError>,
    },
    /// Item configuration fetches finished, one entry per requested name
    ItemsFetched {
        results: Vec<(String, Result<FetchedItem, FetchError>)>,
    },
    /// Read-only view of the session
    GetSnapshot {
        reply: RpcReplyPort<ControllerSnapshot>,
    },
}

/// How the session starts once every configured player is ready
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, strum::EnumString, strum::Display,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum SessionStartMode {
    /// Show the login dialog on the player that completed the roster
    #[default]
    Login,
    /// Skip the dialog and log in with the user id from the launch query
    LaunchUser,
}

/// What a `TaskSwitch` decision on a player request does
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, strum::EnumString, strum::Display,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TaskSwitchStrategy {
    /// Ask the requester for its scoring result and leave the switch to the
    /// hosting page, which answers with `navigate_to`
    #[default]
    ScoringHandoff,
    /// Stop the requester and start the next task on a resolved player
    Direct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Origin accepted by the receiver and announced in `setTaskSequencer`
    pub trusted_origin: String,
    pub start_mode: SessionStartMode,
    pub switch_strategy: TaskSwitchStrategy,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            trusted_origin: "http://localhost:8080".to_string(),
            start_mode: SessionStartMode::default(),
            switch_strategy: TaskSwitchStrategy::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ControllerSnapshot {
    pub expected_players: usize,
    pub players: Vec<PlayerSnapshot>,
    pub pending_ready: usize,
    pub all_ready: bool,
    pub items: Vec<ItemSnapshot>,
    pub installing: Vec<String>,
    pub sequencer: SequencerSnapshot,
    pub start_mode: SessionStartMode,
    pub switch_strategy: TaskSwitchStrategy,
}

/// Errors that end one phase of the session
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum ControllerError {
    #[error("assessment configuration unavailable: {0}")]
    AssessmentUnavailable(FetchError),

    #[error("assessment configuration declares no tasks")]
    NoTasks,

    #[error("item {name} could not be installed: {source}")]
    ItemUnavailable {
        name: String,
        #[source]
        source: FetchError,
    },

    #[error("item {0} is not installed")]
    UnknownItem(String),

    #[error("no task player can run item {item} (version {version})")]
    NoCompatiblePlayer { item: String, version: String },

    #[error("message from unregistered target {0}")]
    UnknownSender(TargetRef),
}
