//! Readiness, login and item installation
//!
//! ```text
//! mount / taskPlayerReady ... all ready ──> showLogin (or launch user)
//! loginDialogClosed ──> setUserId + setTaskSequencer ──> fetch assessment
//! AssessmentFetched ──> initialize sequencer ──> fetch items (parallel)
//! ItemsFetched ──> addItem on compatible players ──> startTask (first task)
//! ```

use futures_util::future::join_all;
use ractor::ActorRef;
use shared_types::{
    AssessmentConfiguration, HostEvent, LibraryPaths, PlayerCommand, TaskIdentification,
};

use crate::actors::coordinator::actor::{ControllerActor, ControllerState, InstalledItem};
use crate::actors::coordinator::protocol::{ControllerError, ControllerMsg, SessionStartMode};
use crate::actors::coordinator::resolve::resolve_player;
use crate::actors::player_registry::{exact_version, Registration};
use crate::fetch::{FetchError, FetchedItem};
use crate::transport::TargetRef;

pub const LOGIN_TITLE: &str = "Placeholder for Login";
pub const LOGIN_FIELD: &str = "Please enter anything (nickname) ";
pub const LOGIN_BUTTON: &str = "Start";

/// Trace batching interval when the trace log goes to the parent frame
pub const POST_MESSAGE_TRACE_INTERVAL: u32 = 5000;
pub const MATH_JAX_UNKNOWN: &str = "math-jax unknown";

pub fn show_login_command() -> PlayerCommand {
    PlayerCommand::ShowLogin {
        title_label: LOGIN_TITLE.to_string(),
        field_label: LOGIN_FIELD.to_string(),
        button_label: LOGIN_BUTTON.to_string(),
    }
}

impl ControllerActor {
    pub(crate) fn handle_player_mounted(
        &self,
        myself: &ActorRef<ControllerMsg>,
        state: &mut ControllerState,
        player_id: String,
        runtime_version: String,
        target: TargetRef,
    ) {
        let was_ready = state.players.all_ready();
        let registration = match state.players.register(
            player_id.clone(),
            target.clone(),
            exact_version(runtime_version),
        ) {
            Ok(registration) => registration,
            Err(_) => return,
        };

        let rebound = matches!(registration, Registration::Rebound { .. });
        if rebound && !state.installed.is_empty() {
            let ready = state
                .players
                .by_id(&player_id)
                .map(|e| e.is_ready())
                .unwrap_or(false);
            if ready {
                self.reinstall_items(state, &player_id);
            } else {
                state.awaiting_items.insert(player_id);
            }
        }
        if (!was_ready || rebound) && state.players.all_ready() {
            self.start_session(myself, state, &target);
        }
    }

    pub(crate) fn handle_player_detached(&self, state: &mut ControllerState, target: &TargetRef) {
        match state.players.detach(target) {
            Some(player_id) => {
                tracing::info!(player_id = %player_id, target_ref = %target, "Task player detached");
            }
            None => {
                tracing::debug!(target_ref = %target, "Detached target was not registered");
            }
        }
    }

    /// Send every installed item the player can run again; its frame was
    /// reloaded and lost them.
    fn reinstall_items(&self, state: &ControllerState, player_id: &str) {
        let Some(endpoint) = state.players.by_id(player_id) else {
            return;
        };
        let mut resent = 0;
        for item in state.installed.values() {
            if endpoint.accepts(&item.version) {
                state.sender.send(endpoint.target(), &item.add_item);
                resent += 1;
            }
        }
        tracing::info!(player_id = %player_id, items = resent, "Reinstalled items on reconnected player");
    }

    pub(crate) fn handle_player_ready(
        &self,
        myself: &ActorRef<ControllerMsg>,
        state: &mut ControllerState,
        source: TargetRef,
    ) {
        let was_ready = state.players.all_ready();
        state.players.receive_ready(&source);

        let trace_channel = match &state.controller_config.trace_log_transmission {
            Some(upload) => PlayerCommand::http_trace_channel(
                upload.interval,
                upload.transmit_url.clone(),
                upload.http_timeout,
            ),
            None => PlayerCommand::post_message_trace_channel(POST_MESSAGE_TRACE_INTERVAL, "*"),
        };
        state.sender.send(&source, &trace_channel);
        state.sender.send(
            &source,
            &PlayerCommand::SetTraceContextId {
                context_id: uuid::Uuid::new_v4().to_string(),
            },
        );

        if let Some(player_id) = state.players.player_id(&source).map(str::to_string) {
            if state.awaiting_items.remove(&player_id) {
                self.reinstall_items(state, &player_id);
            }
        }

        if !was_ready && state.players.all_ready() {
            self.start_session(myself, state, &source);
        }
    }

    /// Every configured player is ready; `completing` is the one whose
    /// signal completed the roster.
    fn start_session(
        &self,
        myself: &ActorRef<ControllerMsg>,
        state: &mut ControllerState,
        completing: &TargetRef,
    ) {
        tracing::info!(
            players = state.players.len(),
            start_mode = %state.options.start_mode,
            "All task players ready"
        );
        match state.options.start_mode {
            SessionStartMode::Login => {
                let Some(player_id) = state.players.player_id(completing) else {
                    tracing::warn!(target_ref = %completing, "Completing player is not registered");
                    return;
                };
                state.players.show(player_id);
                state.sender.send(completing, &show_login_command());
            }
            SessionStartMode::LaunchUser => {
                let user_id = state.launch.user_id.clone();
                self.begin_login(myself, state, user_id);
            }
        }
    }

    /// Announce the user and this controller to every player, then load the
    /// assessment in the background.
    pub(crate) fn begin_login(
        &self,
        myself: &ActorRef<ControllerMsg>,
        state: &mut ControllerState,
        user_id: String,
    ) {
        let sequencer = PlayerCommand::SetTaskSequencer {
            target_window_type: "parent".to_string(),
            target_origin: state.options.trusted_origin.clone(),
        };
        let set_user = PlayerCommand::SetUserId { id: user_id };
        state.players.for_each(|endpoint| {
            state.sender.send(endpoint.target(), &set_user);
            state.sender.send(endpoint.target(), &sequencer);
        });

        let source = state.config_source.clone();
        let myself = myself.clone();
        tokio::spawn(async move {
            let result = source.assessment_config().await;
            let _ = myself.send_message(ControllerMsg::AssessmentFetched { result });
        });
    }

    pub(crate) fn handle_assessment_fetched(
        &self,
        myself: &ActorRef<ControllerMsg>,
        state: &mut ControllerState,
        result: Result<AssessmentConfiguration, FetchError>,
    ) -> Result<(), ControllerError> {
        let assessment = result.map_err(ControllerError::AssessmentUnavailable)?;
        if assessment.tasks.is_empty() {
            return Err(ControllerError::NoTasks);
        }
        tracing::info!(tasks = assessment.tasks.len(), "Assessment configuration loaded");

        let to_install: Vec<String> = assessment
            .item_names()
            .into_iter()
            .filter(|name| state.items.begin_install(name))
            .collect();
        state.sequencer.initialize(assessment.tasks);

        let scaling = PlayerCommand::from(&state.launch.scaling);
        state.players.for_each(|endpoint| {
            state.sender.send(endpoint.target(), &scaling);
        });

        if to_install.is_empty() {
            if !state.items.installing().is_empty() {
                // the install already under way starts the first task
                tracing::info!("Items still installing, not starting a task yet");
                return Ok(());
            }
            return self.start_first_task(state);
        }

        tracing::info!(items = ?to_install, "Installing items");
        let source = state.config_source.clone();
        let myself = myself.clone();
        tokio::spawn(async move {
            let fetches = to_install.into_iter().map(|name| {
                let source = source.clone();
                async move {
                    let result = source.item_config(&name).await;
                    (name, result)
                }
            });
            let results = join_all(fetches).await;
            let _ = myself.send_message(ControllerMsg::ItemsFetched { results });
        });
        Ok(())
    }

    pub(crate) fn handle_items_fetched(
        &self,
        state: &mut ControllerState,
        results: Vec<(String, Result<FetchedItem, FetchError>)>,
    ) -> Result<(), ControllerError> {
        let mut first_failure = None;
        for (name, result) in results {
            match result {
                Ok(item) => self.install_item(state, &name, item),
                Err(source) => {
                    tracing::warn!(item = %name, error = %source, "Item configuration unavailable");
                    state.items.abandon_install(&name);
                    first_failure.get_or_insert(ControllerError::ItemUnavailable { name, source });
                }
            }
        }
        match first_failure {
            Some(e) => Err(e),
            None => self.start_first_task(state),
        }
    }

    fn install_item(&self, state: &mut ControllerState, name: &str, item: FetchedItem) {
        let version = item.config.runtime_compatibility_version.clone();
        let math_jax = state
            .controller_config
            .math_jax_cdn_url
            .clone()
            .unwrap_or_else(|| MATH_JAX_UNKNOWN.to_string());
        let add_item = PlayerCommand::AddItem {
            item_config: item.document,
            resource_path: format!("../items/{name}/resources"),
            external_resource_path: format!("../items/{name}/external-resources"),
            library_paths_map: LibraryPaths { math_jax },
        };

        let mut installed_on = 0;
        state.players.for_each_compatible(&version, |endpoint| {
            state.sender.send(endpoint.target(), &add_item);
            installed_on += 1;
        });
        if installed_on == 0 {
            tracing::warn!(item = %name, version = %version, "No task player can run item");
        }
        tracing::info!(item = %name, version = %version, players = installed_on, "Item installed");

        // Players know the item by the name in its configuration
        let registered_name = item.config.name;
        if registered_name == name {
            state.items.finish_install(name, &version);
        } else {
            tracing::warn!(
                item = %name,
                configured_name = %registered_name,
                "Item configuration names a different item, registering the configured name"
            );
            state.items.abandon_install(name);
            state.items.register(registered_name.clone(), version.clone());
        }
        state
            .installed
            .insert(registered_name, InstalledItem { version, add_item });
    }

    fn start_first_task(&self, state: &mut ControllerState) -> Result<(), ControllerError> {
        let task = state.sequencer.first().ok_or(ControllerError::NoTasks)?;

        let player_count = u32::try_from(state.players.len()).unwrap_or(u32::MAX);
        if let Err(e) = state
            .sender
            .notify_host(&HostEvent::ItemsLoadedInPlayer { player_count })
        {
            tracing::debug!(error = %e, "Host not notified about loaded items");
        }

        self.start_task_on_resolved(state, &task, None, None)
    }

    /// Resolve a player for `task`, make it visible and start the task there.
    pub(crate) fn start_task_on_resolved(
        &self,
        state: &mut ControllerState,
        task: &TaskIdentification,
        advised: Option<&str>,
        requester: Option<&TargetRef>,
    ) -> Result<(), ControllerError> {
        let version = state
            .items
            .version(&task.item)
            .ok_or_else(|| ControllerError::UnknownItem(task.item.clone()))?;
        let player = resolve_player(&state.players, advised, requester, version).ok_or_else(
            || ControllerError::NoCompatiblePlayer {
                item: task.item.clone(),
                version: version.to_string(),
            },
        )?;

        tracing::info!(player_id = %player.player_id, task = %task, "Starting task");
        state.players.show(&player.player_id);
        state
            .sender
            .send(&player.target, &PlayerCommand::start_task(task));
        Ok(())
    }
}
