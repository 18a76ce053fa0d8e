//! Message Receiver - single inbound entry point for wire events
//!
//! `process` checks the sender's origin, parses the payload and hands it to
//! exactly one handler slot chosen by the event discriminator (`eventType` on
//! the player channel, `type` on the host channel). Slots start unset; a
//! message for an unset slot is dropped quietly. Nothing is queued or retried.

use shared_types::{
    HostMessage, PlayerEvent, SwitchRequestKind, TaskIdentification, TaskRequestDetails,
    PLAYER_EVENT_TYPES,
};

use crate::transport::TargetRef;

type ReadyHandler = Box<dyn Fn(&TargetRef) + Send + Sync>;
type PreloadReturnHandler = Box<dyn Fn(&TargetRef, bool, String) + Send + Sync>;
type TextHandler = Box<dyn Fn(&TargetRef, String) + Send + Sync>;
type TaskReturnHandler = Box<dyn Fn(&TargetRef, String, String, Option<String>) + Send + Sync>;
type BatchHandler = Box<dyn Fn(&TargetRef, String, Vec<String>) + Send + Sync>;
type TasksStateHandler = Box<dyn Fn(&TargetRef, String, String) + Send + Sync>;
type SwitchRequestHandler =
    Box<dyn Fn(&TargetRef, SwitchRequestKind, Option<TaskRequestDetails>) + Send + Sync>;
type NavigateHandler = Box<dyn Fn(Option<&TargetRef>, TaskIdentification) + Send + Sync>;
type PreloadStateHandler = Box<dyn Fn(Option<&TargetRef>, String) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Task player frames
    Player,
    /// The hosting page (secondary channel)
    Host,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InboundPayload {
    Text(String),
    Json(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub channel: Channel,
    pub origin: String,
    pub source: Option<TargetRef>,
    pub payload: InboundPayload,
}

impl InboundMessage {
    pub fn player(origin: impl Into<String>, source: TargetRef, text: impl Into<String>) -> Self {
        Self {
            channel: Channel::Player,
            origin: origin.into(),
            source: Some(source),
            payload: InboundPayload::Text(text.into()),
        }
    }

    pub fn host(
        origin: impl Into<String>,
        source: Option<TargetRef>,
        payload: InboundPayload,
    ) -> Self {
        Self {
            channel: Channel::Host,
            origin: origin.into(),
            source,
            payload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    UntrustedOrigin(String),
    MissingSource,
    Unparseable,
    MissingDiscriminator,
    UnknownEventType(String),
    Malformed(String),
    NoHandler(&'static str),
}

/// Outcome of one `process` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Delivered(&'static str),
    Dropped(DropReason),
}

pub struct MessageReceiver {
    trusted_origin: String,
    player_ready: Option<ReadyHandler>,
    preload_return: Option<PreloadReturnHandler>,
    user_id_return: Option<TextHandler>,
    login_dialog_closed: Option<TextHandler>,
    task_return: Option<TaskReturnHandler>,
    scoring_result_return: Option<TextHandler>,
    trace_log: Option<BatchHandler>,
    recording: Option<BatchHandler>,
    tasks_state_return: Option<TasksStateHandler>,
    task_switch_request: Option<SwitchRequestHandler>,
    navigate_to: Option<NavigateHandler>,
    preload_state: Option<PreloadStateHandler>,
}

impl MessageReceiver {
    pub fn new(trusted_origin: impl Into<String>) -> Self {
        Self {
            trusted_origin: trusted_origin.into(),
            player_ready: None,
            preload_return: None,
            user_id_return: None,
            login_dialog_closed: None,
            task_return: None,
            scoring_result_return: None,
            trace_log: None,
            recording: None,
            tasks_state_return: None,
            task_switch_request: None,
            navigate_to: None,
            preload_state: None,
        }
    }

    pub fn trusted_origin(&self) -> &str {
        &self.trusted_origin
    }

    // ========================================================================
    // Handler registration
    // ========================================================================

    pub fn on_player_ready(&mut self, handler: impl Fn(&TargetRef) + Send + Sync + 'static) {
        self.player_ready = Some(Box::new(handler));
    }

    pub fn on_preload_return(
        &mut self,
        handler: impl Fn(&TargetRef, bool, String) + Send + Sync + 'static,
    ) {
        self.preload_return = Some(Box::new(handler));
    }

    pub fn on_user_id_return(&mut self, handler: impl Fn(&TargetRef, String) + Send + Sync + 'static) {
        self.user_id_return = Some(Box::new(handler));
    }

    pub fn on_login_dialog_closed(
        &mut self,
        handler: impl Fn(&TargetRef, String) + Send + Sync + 'static,
    ) {
        self.login_dialog_closed = Some(Box::new(handler));
    }

    pub fn on_task_return(
        &mut self,
        handler: impl Fn(&TargetRef, String, String, Option<String>) + Send + Sync + 'static,
    ) {
        self.task_return = Some(Box::new(handler));
    }

    pub fn on_scoring_result_return(
        &mut self,
        handler: impl Fn(&TargetRef, String) + Send + Sync + 'static,
    ) {
        self.scoring_result_return = Some(Box::new(handler));
    }

    pub fn on_trace_log(
        &mut self,
        handler: impl Fn(&TargetRef, String, Vec<String>) + Send + Sync + 'static,
    ) {
        self.trace_log = Some(Box::new(handler));
    }

    pub fn on_recording(
        &mut self,
        handler: impl Fn(&TargetRef, String, Vec<String>) + Send + Sync + 'static,
    ) {
        self.recording = Some(Box::new(handler));
    }

    pub fn on_tasks_state_return(
        &mut self,
        handler: impl Fn(&TargetRef, String, String) + Send + Sync + 'static,
    ) {
        self.tasks_state_return = Some(Box::new(handler));
    }

    pub fn on_task_switch_request(
        &mut self,
        handler: impl Fn(&TargetRef, SwitchRequestKind, Option<TaskRequestDetails>)
            + Send
            + Sync
            + 'static,
    ) {
        self.task_switch_request = Some(Box::new(handler));
    }

    pub fn on_navigate_to(
        &mut self,
        handler: impl Fn(Option<&TargetRef>, TaskIdentification) + Send + Sync + 'static,
    ) {
        self.navigate_to = Some(Box::new(handler));
    }

    pub fn on_preload_state(
        &mut self,
        handler: impl Fn(Option<&TargetRef>, String) + Send + Sync + 'static,
    ) {
        self.preload_state = Some(Box::new(handler));
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    pub fn process(&self, message: InboundMessage) -> Dispatch {
        if message.origin != self.trusted_origin {
            tracing::warn!(
                origin = %message.origin,
                trusted_origin = %self.trusted_origin,
                "Dropping message from untrusted origin"
            );
            return Dispatch::Dropped(DropReason::UntrustedOrigin(message.origin));
        }

        let value = match message.payload {
            InboundPayload::Json(value) => value,
            InboundPayload::Text(text) => match serde_json::from_str(&text) {
                Ok(value) => value,
                Err(e) => {
                    tracing::info!(error = %e, "Dropping unparseable message");
                    return Dispatch::Dropped(DropReason::Unparseable);
                }
            },
        };

        match message.channel {
            Channel::Player => match message.source {
                Some(source) => self.dispatch_player(&source, value),
                None => {
                    tracing::warn!("Dropping player message without a source");
                    Dispatch::Dropped(DropReason::MissingSource)
                }
            },
            Channel::Host => self.dispatch_host(message.source.as_ref(), value),
        }
    }

    fn dispatch_player(&self, source: &TargetRef, value: serde_json::Value) -> Dispatch {
        let Some(event_type) = value.get("eventType").and_then(|v| v.as_str()) else {
            tracing::info!(target_ref = %source, "Dropping message without eventType");
            return Dispatch::Dropped(DropReason::MissingDiscriminator);
        };
        if !PLAYER_EVENT_TYPES.contains(&event_type) {
            tracing::warn!(target_ref = %source, event_type, "Dropping message with unknown eventType");
            return Dispatch::Dropped(DropReason::UnknownEventType(event_type.to_string()));
        }
        let event: PlayerEvent = match serde_json::from_value(value) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(target_ref = %source, error = %e, "Dropping malformed player event");
                return Dispatch::Dropped(DropReason::Malformed(e.to_string()));
            }
        };

        match event {
            PlayerEvent::TaskPlayerReady => {
                deliver("taskPlayerReady", &self.player_ready, |h| h(source))
            }
            PlayerEvent::SetPreloadReturn {
                is_success,
                message,
            } => deliver("setPreloadReturn", &self.preload_return, |h| {
                h(source, is_success, as_text(message))
            }),
            PlayerEvent::GetUserIdReturn { id } => {
                deliver("getUserIdReturn", &self.user_id_return, |h| h(source, id))
            }
            PlayerEvent::LoginDialogClosed { field_value } => {
                deliver("loginDialogClosed", &self.login_dialog_closed, |h| {
                    h(source, field_value)
                })
            }
            PlayerEvent::GetTaskReturn { scope, item, task } => {
                deliver("getTaskReturn", &self.task_return, |h| {
                    h(source, scope, item, task)
                })
            }
            PlayerEvent::GetScoringResultReturn { result } => {
                deliver("getScoringResultReturn", &self.scoring_result_return, |h| {
                    h(source, result.to_string())
                })
            }
            PlayerEvent::TraceLogTransmission { trace_log_data } => {
                deliver("traceLogTransmission", &self.trace_log, |h| {
                    h(
                        source,
                        trace_log_data.meta_data.to_string(),
                        serialize_entries(trace_log_data.log_entries_list),
                    )
                })
            }
            PlayerEvent::RecordingTransmission { recording_data } => {
                deliver("recordingTransmission", &self.recording, |h| {
                    h(
                        source,
                        recording_data.meta_data.to_string(),
                        serialize_entries(recording_data.recording_entries_list),
                    )
                })
            }
            PlayerEvent::GetTasksStateReturn { user_id, state } => {
                deliver("getTasksStateReturn", &self.tasks_state_return, |h| {
                    h(source, user_id, state.to_string())
                })
            }
            PlayerEvent::TaskSwitchRequest {
                request,
                scope,
                item,
                task,
            } => {
                let details = match (task, scope) {
                    (Some(task), Some(scope)) => Some(TaskRequestDetails { item, task, scope }),
                    _ => None,
                };
                deliver("taskSwitchRequest", &self.task_switch_request, |h| {
                    h(source, request, details)
                })
            }
        }
    }

    fn dispatch_host(&self, source: Option<&TargetRef>, value: serde_json::Value) -> Dispatch {
        if value.get("type").and_then(|v| v.as_str()).is_none() {
            tracing::info!("Dropping host message without type");
            return Dispatch::Dropped(DropReason::MissingDiscriminator);
        }
        let message: HostMessage = match serde_json::from_value(value) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "Dropping malformed host message");
                return Dispatch::Dropped(DropReason::Malformed(e.to_string()));
            }
        };

        match message {
            HostMessage::NavigateTo { request } => {
                deliver("navigate_to", &self.navigate_to, |h| h(source, request.task()))
            }
            HostMessage::PreloadState { request } => {
                deliver("preload_state", &self.preload_state, |h| {
                    h(source, as_text(request))
                })
            }
        }
    }
}

fn deliver<H: ?Sized>(
    kind: &'static str,
    slot: &Option<Box<H>>,
    call: impl FnOnce(&H),
) -> Dispatch {
    match slot {
        Some(handler) => {
            call(handler.as_ref());
            Dispatch::Delivered(kind)
        }
        None => {
            tracing::debug!(event_type = kind, "No handler registered, dropping");
            Dispatch::Dropped(DropReason::NoHandler(kind))
        }
    }
}

/// Strings pass through unchanged, anything else is serialized.
fn as_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text,
        other => other.to_string(),
    }
}

fn serialize_entries(entries: Vec<serde_json::Value>) -> Vec<String> {
    entries.into_iter().map(|entry| entry.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    const ORIGIN: &str = "http://localhost:8080";

    fn player(text: &str) -> InboundMessage {
        InboundMessage::player(ORIGIN, TargetRef::from("frame-1"), text)
    }

    #[test]
    fn test_bogus_event_type_is_dropped() {
        let calls = Arc::new(Mutex::new(0));
        let mut receiver = MessageReceiver::new(ORIGIN);
        let counter = calls.clone();
        receiver.on_player_ready(move |_| *counter.lock().unwrap() += 1);

        let dispatch = receiver.process(player(r#"{"eventType":"bogus"}"#));
        assert_eq!(
            dispatch,
            Dispatch::Dropped(DropReason::UnknownEventType("bogus".to_string()))
        );
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_untrusted_origin_and_garbage_are_dropped() {
        let mut receiver = MessageReceiver::new(ORIGIN);
        receiver.on_player_ready(|_| panic!("must not be called"));

        let foreign =
            InboundMessage::player("http://evil.example", TargetRef::from("f"), r#"{"eventType":"taskPlayerReady"}"#);
        assert!(matches!(
            receiver.process(foreign),
            Dispatch::Dropped(DropReason::UntrustedOrigin(_))
        ));
        assert_eq!(
            receiver.process(player("not json")),
            Dispatch::Dropped(DropReason::Unparseable)
        );
        assert_eq!(
            receiver.process(player(r#"{"eventType":7}"#)),
            Dispatch::Dropped(DropReason::MissingDiscriminator)
        );
        assert!(matches!(
            receiver.process(player(r#"{"eventType":"loginDialogClosed"}"#)),
            Dispatch::Dropped(DropReason::Malformed(_))
        ));
    }

    #[test]
    fn test_unset_slot_is_silent_drop() {
        let receiver = MessageReceiver::new(ORIGIN);
        assert_eq!(
            receiver.process(player(r#"{"eventType":"taskPlayerReady"}"#)),
            Dispatch::Dropped(DropReason::NoHandler("taskPlayerReady"))
        );
    }

    #[test]
    fn test_player_message_without_source_is_dropped() {
        let mut receiver = MessageReceiver::new(ORIGIN);
        receiver.on_player_ready(|_| panic!("must not be called"));
        let message = InboundMessage {
            channel: Channel::Player,
            origin: ORIGIN.to_string(),
            source: None,
            payload: InboundPayload::Text(r#"{"eventType":"taskPlayerReady"}"#.to_string()),
        };
        assert_eq!(
            receiver.process(message),
            Dispatch::Dropped(DropReason::MissingSource)
        );
    }

    #[test]
    fn test_handlers_receive_source_and_payload() {
        let seen = Arc::new(Mutex::new(Vec::<String>::new()));
        let mut receiver = MessageReceiver::new(ORIGIN);

        let log = seen.clone();
        receiver.on_login_dialog_closed(move |source, value| {
            log.lock().unwrap().push(format!("{source}:{value}"));
        });
        let log = seen.clone();
        receiver.on_trace_log(move |source, meta, entries| {
            log.lock().unwrap().push(format!("{source}:{meta}:{}", entries.join("|")));
        });

        assert_eq!(
            receiver.process(player(r#"{"eventType":"loginDialogClosed","fieldValue":"nick"}"#)),
            Dispatch::Delivered("loginDialogClosed")
        );
        let trace = json!({
            "eventType": "traceLogTransmission",
            "traceLogData": {"metaData": {"n": 1}, "logEntriesList": [{"a": 1}, "b"]}
        });
        assert_eq!(
            receiver.process(player(&trace.to_string())),
            Dispatch::Delivered("traceLogTransmission")
        );

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                "frame-1:nick".to_string(),
                r#"frame-1:{"n":1}:{"a":1}|"b""#.to_string()
            ]
        );
    }

    #[test]
    fn test_task_switch_request_details() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut receiver = MessageReceiver::new(ORIGIN);
        let log = seen.clone();
        receiver.on_task_switch_request(move |_, request, details| {
            log.lock().unwrap().push((request, details));
        });

        receiver.process(player(r#"{"eventType":"taskSwitchRequest","request":"nextTask"}"#));
        receiver.process(player(
            r#"{"eventType":"taskSwitchRequest","request":"goToTask","task":"t2","scope":"A"}"#,
        ));

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0], (SwitchRequestKind::NextTask, None));
        assert_eq!(
            seen[1],
            (
                SwitchRequestKind::GoToTask,
                Some(TaskRequestDetails {
                    item: None,
                    task: "t2".to_string(),
                    scope: "A".to_string(),
                })
            )
        );
    }

    #[test]
    fn test_host_channel_dispatch() {
        let seen = Arc::new(Mutex::new(Vec::<String>::new()));
        let mut receiver = MessageReceiver::new(ORIGIN);
        let log = seen.clone();
        receiver.on_navigate_to(move |_, task| log.lock().unwrap().push(task.to_string()));
        let log = seen.clone();
        receiver.on_preload_state(move |_, state| log.lock().unwrap().push(state));

        let navigate = InboundMessage::host(
            ORIGIN,
            None,
            InboundPayload::Json(json!({
                "type": "navigate_to",
                "request": {"item": ["i1"], "task": ["t1"]}
            })),
        );
        assert_eq!(receiver.process(navigate), Dispatch::Delivered("navigate_to"));

        let preload = InboundMessage::host(
            ORIGIN,
            None,
            InboundPayload::Json(json!({"type": "preload_state", "request": {"k": "v"}})),
        );
        assert_eq!(receiver.process(preload), Dispatch::Delivered("preload_state"));

        let untyped = InboundMessage::host(ORIGIN, None, InboundPayload::Json(json!({"request": {}})));
        assert_eq!(
            receiver.process(untyped),
            Dispatch::Dropped(DropReason::MissingDiscriminator)
        );

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["i1/t1/A".to_string(), r#"{"k":"v"}"#.to_string()]
        );
    }
}
