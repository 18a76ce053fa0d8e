//! Receiver slots that feed the ControllerActor mailbox

use ractor::ActorRef;

use crate::actors::coordinator::protocol::ControllerMsg;
use crate::actors::receiver::MessageReceiver;

fn forward(controller: &ActorRef<ControllerMsg>, message: ControllerMsg) {
    if let Err(e) = controller.send_message(message) {
        tracing::warn!(error = %e, "ControllerActor unavailable, dropping event");
    }
}

/// Install every receiver slot the controller handles.
pub fn wire_receiver(receiver: &mut MessageReceiver, controller: ActorRef<ControllerMsg>) {
    let actor = controller.clone();
    receiver.on_player_ready(move |source| {
        forward(
            &actor,
            ControllerMsg::PlayerReady {
                source: source.clone(),
            },
        );
    });

    let actor = controller.clone();
    receiver.on_login_dialog_closed(move |source, user_id| {
        forward(
            &actor,
            ControllerMsg::LoginDialogClosed {
                source: source.clone(),
                user_id,
            },
        );
    });

    let actor = controller.clone();
    receiver.on_task_switch_request(move |source, request, details| {
        forward(
            &actor,
            ControllerMsg::TaskSwitchRequested {
                source: source.clone(),
                request,
                details,
            },
        );
    });

    let actor = controller.clone();
    receiver.on_scoring_result_return(move |source, result| {
        forward(
            &actor,
            ControllerMsg::ScoringResult {
                source: source.clone(),
                result,
            },
        );
    });

    let actor = controller.clone();
    receiver.on_trace_log(move |source, meta_data, entries| {
        forward(
            &actor,
            ControllerMsg::TraceLog {
                source: source.clone(),
                meta_data,
                entries,
            },
        );
    });

    let actor = controller.clone();
    receiver.on_recording(move |source, meta_data, entries| {
        forward(
            &actor,
            ControllerMsg::Recording {
                source: source.clone(),
                meta_data,
                entries,
            },
        );
    });

    let actor = controller.clone();
    receiver.on_tasks_state_return(move |source, user_id, state| {
        forward(
            &actor,
            ControllerMsg::TasksState {
                source: source.clone(),
                user_id,
                state,
            },
        );
    });

    let actor = controller.clone();
    receiver.on_navigate_to(move |_, task| {
        forward(&actor, ControllerMsg::NavigateTo { task });
    });

    let actor = controller;
    receiver.on_preload_state(move |_, state| {
        forward(&actor, ControllerMsg::PreloadState { state });
    });

    // Informational replies; nothing in the session depends on them.
    receiver.on_preload_return(|source, is_success, message| {
        if is_success {
            tracing::info!(target_ref = %source, message = %message, "Preload finished");
        } else {
            tracing::warn!(target_ref = %source, message = %message, "Preload failed");
        }
    });
    receiver.on_user_id_return(|source, id| {
        tracing::info!(target_ref = %source, user_id = %id, "User id reported");
    });
    receiver.on_task_return(|source, scope, item, task| {
        tracing::info!(
            target_ref = %source,
            scope = %scope,
            item = %item,
            task = task.as_deref().unwrap_or("-"),
            "Current task reported"
        );
    });
}
