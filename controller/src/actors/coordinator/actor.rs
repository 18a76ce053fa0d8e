//! ControllerActor - owns the registries and the sequencer
//!
//! The actor is the only place session state changes. Handlers for the
//! individual phases live in `session` (readiness, login, item install) and
//! `switching` (switch requests, navigation, relays).

use async_trait::async_trait;
use ractor::{Actor, ActorProcessingErr, ActorRef};
use shared_types::{ControllerConfiguration, PlayerCommand};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::actors::coordinator::protocol::{ControllerMsg, ControllerOptions, ControllerSnapshot};
use crate::actors::item_registry::ItemRegistry;
use crate::actors::player_registry::PlayerRegistry;
use crate::actors::sender::MessageSender;
use crate::actors::surface::SurfaceControl;
use crate::actors::task_sequencer::TaskSequencer;
use crate::fetch::ConfigSource;
use crate::launch::LaunchParameters;

#[derive(Debug, Default)]
pub struct ControllerActor;

/// Arguments for spawning ControllerActor
#[derive(Clone)]
pub struct ControllerArguments {
    /// Decoded `controller/config.json`; fixes the expected player count
    pub controller_config: ControllerConfiguration,
    /// Where assessment and item configuration come from
    pub config_source: Arc<dyn ConfigSource>,
    pub sender: MessageSender,
    /// Frame visibility, applied by the hosting page
    pub surface: Arc<dyn SurfaceControl>,
    pub launch: LaunchParameters,
    pub options: ControllerOptions,
}

/// `addItem` as it went out, kept for frames that reconnect
pub(crate) struct InstalledItem {
    pub(crate) version: String,
    pub(crate) add_item: PlayerCommand,
}

pub struct ControllerState {
    pub(crate) players: PlayerRegistry,
    pub(crate) items: ItemRegistry,
    pub(crate) installed: BTreeMap<String, InstalledItem>,
    /// Rebound players that get the installed items once they are ready
    pub(crate) awaiting_items: HashSet<String>,
    pub(crate) sequencer: TaskSequencer,
    pub(crate) sender: MessageSender,
    pub(crate) config_source: Arc<dyn ConfigSource>,
    pub(crate) controller_config: ControllerConfiguration,
    pub(crate) launch: LaunchParameters,
    pub(crate) options: ControllerOptions,
}

impl ControllerState {
    pub(crate) fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            expected_players: self.players.expected_count(),
            players: self.players.snapshot(),
            pending_ready: self.players.pending_ready_count(),
            all_ready: self.players.all_ready(),
            items: self.items.snapshot(),
            installing: self.items.installing(),
            sequencer: self.sequencer.snapshot(),
            start_mode: self.options.start_mode,
            switch_strategy: self.options.switch_strategy,
        }
    }
}

#[async_trait]
impl Actor for ControllerActor {
    type Msg = ControllerMsg;
    type State = ControllerState;
    type Arguments = ControllerArguments;

    async fn pre_start(
        &self,
        myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        tracing::info!(
            actor_id = %myself.get_id(),
            expected_players = args.controller_config.players.len(),
            start_mode = %args.options.start_mode,
            switch_strategy = %args.options.switch_strategy,
            "ControllerActor starting"
        );

        Ok(ControllerState {
            players: PlayerRegistry::new(args.controller_config.players.len(), args.surface),
            items: ItemRegistry::new(),
            installed: BTreeMap::new(),
            awaiting_items: HashSet::new(),
            sequencer: TaskSequencer::new(),
            sender: args.sender,
            config_source: args.config_source,
            controller_config: args.controller_config,
            launch: args.launch,
            options: args.options,
        })
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            ControllerMsg::PlayerMounted {
                player_id,
                runtime_version,
                target,
            } => {
                self.handle_player_mounted(&myself, state, player_id, runtime_version, target);
            }
            ControllerMsg::PlayerDetached { target } => {
                self.handle_player_detached(state, &target);
            }
            ControllerMsg::PlayerReady { source } => {
                self.handle_player_ready(&myself, state, source);
            }
            ControllerMsg::LoginDialogClosed { source, user_id } => {
                tracing::info!(target_ref = %source, user_id = %user_id, "Login dialog closed");
                self.begin_login(&myself, state, user_id);
            }
            ControllerMsg::AssessmentFetched { result } => {
                if let Err(e) = self.handle_assessment_fetched(&myself, state, result) {
                    tracing::warn!(error = %e, "Session initialization aborted");
                }
            }
            ControllerMsg::ItemsFetched { results } => {
                if let Err(e) = self.handle_items_fetched(state, results) {
                    tracing::warn!(error = %e, "Session initialization aborted");
                }
            }
            ControllerMsg::TaskSwitchRequested {
                source,
                request,
                details,
            } => {
                if let Err(e) = self.handle_task_switch_request(state, source, request, details) {
                    tracing::warn!(error = %e, request = %request, "Task switch request ignored");
                }
            }
            ControllerMsg::NavigateTo { task } => {
                if let Err(e) = self.handle_navigate_to(state, &task) {
                    tracing::warn!(error = %e, task = %task, "Navigation request ignored");
                }
            }
            ControllerMsg::PreloadState { state: tasks_state } => {
                self.handle_preload_state(state, tasks_state);
            }
            ControllerMsg::ScoringResult { source, result } => {
                self.relay_scoring_result(state, &source, result);
            }
            ControllerMsg::TraceLog {
                source,
                meta_data,
                entries,
            } => {
                self.relay_trace_log(state, &source, meta_data, entries);
            }
            ControllerMsg::Recording {
                source,
                meta_data,
                entries,
            } => {
                self.relay_recording(state, &source, meta_data, entries);
            }
            ControllerMsg::TasksState {
                source,
                user_id,
                state: tasks_state,
            } => {
                self.relay_tasks_state(state, &source, user_id, tasks_state);
            }
            ControllerMsg::GetSnapshot { reply } => {
                let _ = reply.send(state.snapshot());
            }
        }
        Ok(())
    }

    async fn post_stop(
        &self,
        myself: ActorRef<Self::Msg>,
        _state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        tracing::info!(actor_id = %myself.get_id(), "ControllerActor stopped");
        Ok(())
    }
}
