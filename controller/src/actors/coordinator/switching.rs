//! Switch requests, host navigation and relays to the hosting page

use shared_types::{
    HostEvent, PlayerCommand, SwitchRequestKind, TaskIdentification, TaskRequestDetails,
};

use crate::actors::coordinator::actor::{ControllerActor, ControllerState};
use crate::actors::coordinator::protocol::{ControllerError, TaskSwitchStrategy};
use crate::actors::coordinator::resolve::{login_target, resolve_player};
use crate::actors::coordinator::session::show_login_command;
use crate::actors::task_sequencer::Decision;
use crate::transport::TargetRef;

pub const GO_TO_TASK_MISSING: &str = "Task specification is missing in goToTask request.";

impl ControllerActor {
    pub(crate) fn handle_task_switch_request(
        &self,
        state: &mut ControllerState,
        source: TargetRef,
        request: SwitchRequestKind,
        details: Option<TaskRequestDetails>,
    ) -> Result<(), ControllerError> {
        if state.players.by_target(&source).is_none() {
            return Err(ControllerError::UnknownSender(source));
        }

        let decision = match request {
            SwitchRequestKind::NextTask => state.sequencer.advance(),
            SwitchRequestKind::PreviousTask => state.sequencer.retreat(),
            SwitchRequestKind::CancelTask => state.sequencer.cancel(),
            SwitchRequestKind::GoToTask => match details {
                Some(target) => state.sequencer.jump_to(&target),
                None => Decision::Blocked {
                    reason: GO_TO_TASK_MISSING.to_string(),
                },
            },
        };

        match decision {
            Decision::Blocked { reason } => {
                tracing::info!(target_ref = %source, request = %request, reason = %reason, "Task switch blocked");
                Ok(())
            }
            Decision::Login { player_id } => {
                self.return_to_login(state, &source, player_id.as_deref());
                Ok(())
            }
            Decision::TaskSwitch {
                next_task,
                player_id,
            } => match state.options.switch_strategy {
                TaskSwitchStrategy::ScoringHandoff => {
                    tracing::info!(
                        target_ref = %source,
                        next_task = %next_task,
                        "Requesting scoring result before task switch"
                    );
                    state.sender.send(&source, &PlayerCommand::GetScoringResult);
                    Ok(())
                }
                TaskSwitchStrategy::Direct => {
                    self.switch_directly(state, &source, &next_task, player_id.as_deref())
                }
            },
        }
    }

    fn return_to_login(&self, state: &ControllerState, source: &TargetRef, advised: Option<&str>) {
        let Some(target) = login_target(&state.players, advised, source) else {
            tracing::warn!(target_ref = %source, "No task player to show the login on");
            return;
        };
        state.sender.send(source, &PlayerCommand::StopTask);
        state.players.for_each(|endpoint| {
            state.sender.send(endpoint.target(), &PlayerCommand::Logout);
        });
        state.players.show(&target.player_id);
        state.sender.send(&target.target, &show_login_command());
    }

    fn switch_directly(
        &self,
        state: &mut ControllerState,
        source: &TargetRef,
        next_task: &TaskIdentification,
        advised: Option<&str>,
    ) -> Result<(), ControllerError> {
        let version = state
            .items
            .version(&next_task.item)
            .ok_or_else(|| ControllerError::UnknownItem(next_task.item.clone()))?;
        if resolve_player(&state.players, advised, Some(source), version).is_none() {
            return Err(ControllerError::NoCompatiblePlayer {
                item: next_task.item.clone(),
                version: version.to_string(),
            });
        }

        state.sender.send(source, &PlayerCommand::GetScoringResult);
        state.sender.send(source, &PlayerCommand::StopTask);
        self.start_task_on_resolved(state, next_task, advised, Some(source))
    }

    /// Host-driven navigation: any compatible player, all others stopped.
    pub(crate) fn handle_navigate_to(
        &self,
        state: &mut ControllerState,
        task: &TaskIdentification,
    ) -> Result<(), ControllerError> {
        let version = state
            .items
            .version(&task.item)
            .ok_or_else(|| ControllerError::UnknownItem(task.item.clone()))?;
        if state.players.find_compatible(version).is_none() {
            return Err(ControllerError::NoCompatiblePlayer {
                item: task.item.clone(),
                version: version.to_string(),
            });
        }

        state.players.for_each(|endpoint| {
            state.sender.send(endpoint.target(), &PlayerCommand::StopTask);
        });
        self.start_task_on_resolved(state, task, None, None)
    }

    pub(crate) fn handle_preload_state(&self, state: &ControllerState, tasks_state: String) {
        let command = PlayerCommand::PreloadTasksState { state: tasks_state };
        state.players.for_each(|endpoint| {
            state.sender.send(endpoint.target(), &command);
        });
    }

    // ========================================================================
    // Relays to the hosting page
    // ========================================================================

    pub(crate) fn relay_scoring_result(&self, state: &ControllerState, source: &TargetRef, result: String) {
        tracing::info!(target_ref = %source, "Scoring result received");
        relay(
            state,
            HostEvent::ScoringResult {
                player_id: sender_id(state, source),
                result,
            },
        );
    }

    pub(crate) fn relay_trace_log(
        &self,
        state: &ControllerState,
        source: &TargetRef,
        meta_data: String,
        entries: Vec<String>,
    ) {
        tracing::debug!(target_ref = %source, entries = entries.len(), "Trace log batch received");
        relay(
            state,
            HostEvent::TraceLog {
                player_id: sender_id(state, source),
                meta_data,
                log_entries_list: entries,
            },
        );
    }

    pub(crate) fn relay_recording(
        &self,
        state: &ControllerState,
        source: &TargetRef,
        meta_data: String,
        entries: Vec<String>,
    ) {
        tracing::debug!(target_ref = %source, entries = entries.len(), "Recording batch received");
        relay(
            state,
            HostEvent::Recording {
                player_id: sender_id(state, source),
                meta_data,
                recording_entries_list: entries,
            },
        );
    }

    pub(crate) fn relay_tasks_state(
        &self,
        state: &ControllerState,
        source: &TargetRef,
        user_id: String,
        tasks_state: String,
    ) {
        tracing::info!(target_ref = %source, user_id = %user_id, "Tasks state received");
        relay(
            state,
            HostEvent::TasksState {
                player_id: sender_id(state, source),
                user_id,
                state: tasks_state,
            },
        );
    }
}

fn sender_id(state: &ControllerState, source: &TargetRef) -> Option<String> {
    state.players.player_id(source).map(str::to_string)
}

fn relay(state: &ControllerState, event: HostEvent) {
    if let Err(e) = state.sender.notify_host(&event) {
        tracing::debug!(error = %e, "Host relay dropped");
    }
}
