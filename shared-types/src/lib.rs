//! Shared types between the controller and the task player runtimes
//!
//! These types are used by both:
//! - The controller actors (native Rust)
//! - The task player bridge and hosting page (JavaScript, via generated TS)
//!
//! Serializable with serde for JSON over WebSocket/HTTP. Field names follow the
//! task player wire protocol (camelCase).

use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

// ============================================================================
// Task Identification
// ============================================================================

/// A task in an assessment: `{item, task, scope}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, TS)]
#[ts(export, export_to = "../../bindings/player-protocol.ts")]
pub struct TaskIdentification {
    pub item: String,
    pub task: String,
    pub scope: String,
}

impl TaskIdentification {
    pub fn new(item: impl Into<String>, task: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            task: task.into(),
            scope: scope.into(),
        }
    }
}

impl std::fmt::Display for TaskIdentification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.item, self.task, self.scope)
    }
}

/// Target of a `goToTask` request. The item may be left unspecified.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "../../bindings/player-protocol.ts")]
pub struct TaskRequestDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    pub task: String,
    pub scope: String,
}

/// Switch request kinds a task player may raise
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../../bindings/player-protocol.ts")]
pub enum SwitchRequestKind {
    NextTask,
    PreviousTask,
    CancelTask,
    GoToTask,
}

impl std::fmt::Display for SwitchRequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SwitchRequestKind::NextTask => write!(f, "nextTask"),
            SwitchRequestKind::PreviousTask => write!(f, "previousTask"),
            SwitchRequestKind::CancelTask => write!(f, "cancelTask"),
            SwitchRequestKind::GoToTask => write!(f, "goToTask"),
        }
    }
}

// ============================================================================
// Inbound: Task Player -> Controller
// ============================================================================

/// Trace log batch as transmitted by a task player
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../../bindings/player-protocol.ts")]
pub struct TraceLogData {
    #[serde(rename = "metaData")]
    #[ts(type = "unknown")]
    pub meta_data: serde_json::Value,
    #[serde(rename = "logEntriesList")]
    #[ts(type = "Array<unknown>")]
    pub log_entries_list: Vec<serde_json::Value>,
}

/// Recording batch as transmitted by a task player
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../../bindings/player-protocol.ts")]
pub struct RecordingData {
    #[serde(rename = "metaData")]
    #[ts(type = "unknown")]
    pub meta_data: serde_json::Value,
    #[serde(rename = "recordingEntriesList")]
    #[ts(type = "Array<unknown>")]
    pub recording_entries_list: Vec<serde_json::Value>,
}

/// Every event a task player can send to the controller.
///
/// The discriminator is the `eventType` field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[serde(tag = "eventType", rename_all = "camelCase")]
#[ts(export, export_to = "../../bindings/player-protocol.ts")]
pub enum PlayerEvent {
    TaskPlayerReady,
    SetPreloadReturn {
        #[serde(rename = "isSuccess")]
        is_success: bool,
        /// Failure text or the preloaded resource listing
        #[ts(type = "unknown")]
        message: serde_json::Value,
    },
    GetUserIdReturn {
        id: String,
    },
    LoginDialogClosed {
        #[serde(rename = "fieldValue")]
        field_value: String,
    },
    GetTaskReturn {
        scope: String,
        item: String,
        #[serde(default)]
        task: Option<String>,
    },
    GetScoringResultReturn {
        #[ts(type = "unknown")]
        result: serde_json::Value,
    },
    TraceLogTransmission {
        #[serde(rename = "traceLogData")]
        trace_log_data: TraceLogData,
    },
    RecordingTransmission {
        #[serde(rename = "recordingData")]
        recording_data: RecordingData,
    },
    GetTasksStateReturn {
        #[serde(rename = "userId")]
        user_id: String,
        #[ts(type = "unknown")]
        state: serde_json::Value,
    },
    TaskSwitchRequest {
        request: SwitchRequestKind,
        #[serde(default)]
        scope: Option<String>,
        #[serde(default)]
        item: Option<String>,
        #[serde(default)]
        task: Option<String>,
    },
}

/// `eventType` values recognised on the player channel
pub const PLAYER_EVENT_TYPES: &[&str] = &[
    "taskPlayerReady",
    "setPreloadReturn",
    "getUserIdReturn",
    "loginDialogClosed",
    "getTaskReturn",
    "getScoringResultReturn",
    "traceLogTransmission",
    "recordingTransmission",
    "getTasksStateReturn",
    "taskSwitchRequest",
];

// ============================================================================
// Inbound: Host -> Controller (secondary channel)
// ============================================================================

/// Messages from the hosting page. The discriminator is the `type` field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export, export_to = "../../bindings/player-protocol.ts")]
pub enum HostMessage {
    NavigateTo { request: NavigateRequest },
    PreloadState {
        #[ts(type = "unknown")]
        request: serde_json::Value,
    },
}

/// External navigation target.
///
/// Hosts built on R/Shiny send every field as a one-element list, so each
/// field accepts either a string or a list of strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "../../bindings/player-protocol.ts")]
pub struct NavigateRequest {
    #[serde(deserialize_with = "first_of_one_or_many")]
    #[ts(type = "string | Array<string>")]
    pub item: String,
    #[serde(deserialize_with = "first_of_one_or_many")]
    #[ts(type = "string | Array<string>")]
    pub task: String,
    #[serde(default = "default_scope", deserialize_with = "first_of_one_or_many")]
    #[ts(type = "string | Array<string>")]
    pub scope: String,
}

impl NavigateRequest {
    pub fn task(&self) -> TaskIdentification {
        TaskIdentification::new(&self.item, &self.task, &self.scope)
    }
}

pub const DEFAULT_NAVIGATION_SCOPE: &str = "A";

fn default_scope() -> String {
    DEFAULT_NAVIGATION_SCOPE.to_string()
}

fn first_of_one_or_many<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => Ok(value),
        OneOrMany::Many(values) => values
            .into_iter()
            .next()
            .ok_or_else(|| serde::de::Error::custom("expected at least one value")),
    }
}

// ============================================================================
// Outbound: Controller -> Task Player
// ============================================================================

/// Trace log transmission channel kinds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../../bindings/player-protocol.ts")]
pub enum TraceChannelKind {
    PostMessage,
    Http,
    Console,
}

/// Recording transmission channel kinds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../../bindings/player-protocol.ts")]
pub enum RecordingChannelKind {
    Http,
    Console,
}

/// Library locations handed to the runtime when installing an item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "../../bindings/player-protocol.ts")]
pub struct LibraryPaths {
    #[serde(rename = "MathJax")]
    pub math_jax: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "../../bindings/player-protocol.ts")]
pub struct HeaderButtonDescription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub text: String,
    pub event: String,
    pub height: u32,
    pub width: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "../../bindings/player-protocol.ts")]
pub struct HeaderMenuTask {
    pub item: String,
    pub task: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "../../bindings/player-protocol.ts")]
pub struct HeaderMenuScopeDescription {
    pub name: String,
    pub tasks: Vec<HeaderMenuTask>,
}

/// The complete command vocabulary the controller may send to a task player.
///
/// The discriminator is the `eventType` field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[serde(tag = "eventType", rename_all = "camelCase")]
#[ts(export, export_to = "../../bindings/player-protocol.ts")]
pub enum PlayerCommand {
    // configuration control
    SetWaitMessages {
        primary: String,
        secondary: String,
    },
    AddItem {
        #[serde(rename = "itemConfig")]
        #[ts(type = "unknown")]
        item_config: serde_json::Value,
        #[serde(rename = "resourcePath")]
        resource_path: String,
        #[serde(rename = "externalResourcePath")]
        external_resource_path: String,
        #[serde(rename = "libraryPathsMap")]
        library_paths_map: LibraryPaths,
    },
    ClearItems,
    SetPreload {
        #[serde(rename = "itemName")]
        item_name: String,
    },
    SetScalingConfiguration {
        #[serde(rename = "scalingMode")]
        scaling_mode: String,
        #[serde(rename = "alignmentHorizontal")]
        alignment_horizontal: String,
        #[serde(rename = "alignmentVertical")]
        alignment_vertical: String,
    },

    // trace control
    InsertMessageInTrace {
        message: String,
    },
    LogStateToTrace,
    FlushTrace,
    SetTraceLogTransmissionChannel {
        channel: TraceChannelKind,
        interval: u32,
        #[serde(
            rename = "targetWindowType",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        target_window_type: Option<String>,
        #[serde(rename = "targetOrigin", default, skip_serializing_if = "Option::is_none")]
        target_origin: Option<String>,
        #[serde(rename = "transmitUrl", default, skip_serializing_if = "Option::is_none")]
        transmit_url: Option<String>,
        #[serde(rename = "httpTimeout", default, skip_serializing_if = "Option::is_none")]
        http_timeout: Option<u32>,
    },
    SetTraceContextId {
        #[serde(rename = "contextId")]
        context_id: String,
    },

    // recordings control
    SetRecordingTransmissionChannel {
        channel: RecordingChannelKind,
        #[serde(rename = "transmitUrl", default, skip_serializing_if = "Option::is_none")]
        transmit_url: Option<String>,
        #[serde(rename = "httpTimeout", default, skip_serializing_if = "Option::is_none")]
        http_timeout: Option<u32>,
    },
    SetRecordingContextId {
        #[serde(rename = "contextId")]
        context_id: String,
    },

    // user control
    SetUserId {
        id: String,
    },
    Logout,
    GetUserId,
    ShowLogin {
        #[serde(rename = "titleLabel")]
        title_label: String,
        #[serde(rename = "fieldLabel")]
        field_label: String,
        #[serde(rename = "buttonLabel")]
        button_label: String,
    },

    // task control
    StartTask {
        scope: String,
        item: String,
        task: String,
    },
    StopTask,
    PauseTask,
    ResumeTask,
    GetTask,
    SetTaskSequencer {
        #[serde(rename = "targetWindowType")]
        target_window_type: String,
        #[serde(rename = "targetOrigin")]
        target_origin: String,
    },
    SetSwitchAvailability {
        request: SwitchRequestKind,
        value: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scope: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        item: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        task: Option<String>,
    },

    // task state control
    GetTasksState,
    ClearTasksState,
    PreloadTasksState {
        state: String,
    },

    // scoring control
    GetScoringResult,

    // state machine control
    SendStatemachineEvent {
        event: String,
    },

    // header control
    SetHeaderButtons {
        #[serde(rename = "headerButtons")]
        header_buttons: Vec<HeaderButtonDescription>,
    },
    SetMenuCarousels {
        course: Vec<String>,
        scopes: Vec<HeaderMenuScopeDescription>,
    },

    // developer mode control
    ActivateDebuggingWindows {
        #[serde(rename = "scoreHotKey")]
        score_hot_key: String,
        #[serde(rename = "traceHotKey")]
        trace_hot_key: String,
        #[serde(rename = "statemachineHotKey")]
        statemachine_hot_key: String,
    },
}

impl PlayerCommand {
    /// Trace channel posting to the parent frame
    pub fn post_message_trace_channel(interval: u32, target_origin: impl Into<String>) -> Self {
        PlayerCommand::SetTraceLogTransmissionChannel {
            channel: TraceChannelKind::PostMessage,
            interval,
            target_window_type: Some("parent".to_string()),
            target_origin: Some(target_origin.into()),
            transmit_url: None,
            http_timeout: None,
        }
    }

    /// Trace channel posting batches to an HTTP endpoint
    pub fn http_trace_channel(interval: u32, transmit_url: impl Into<String>, http_timeout: u32) -> Self {
        PlayerCommand::SetTraceLogTransmissionChannel {
            channel: TraceChannelKind::Http,
            interval,
            target_window_type: None,
            target_origin: None,
            transmit_url: Some(transmit_url.into()),
            http_timeout: Some(http_timeout),
        }
    }

    /// Trace channel writing to the runtime console
    pub fn console_trace_channel(interval: u32) -> Self {
        PlayerCommand::SetTraceLogTransmissionChannel {
            channel: TraceChannelKind::Console,
            interval,
            target_window_type: None,
            target_origin: None,
            transmit_url: None,
            http_timeout: None,
        }
    }

    pub fn start_task(task: &TaskIdentification) -> Self {
        PlayerCommand::StartTask {
            scope: task.scope.clone(),
            item: task.item.clone(),
            task: task.task.clone(),
        }
    }

    /// The `eventType` discriminator, for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            PlayerCommand::SetWaitMessages { .. } => "setWaitMessages",
            PlayerCommand::AddItem { .. } => "addItem",
            PlayerCommand::ClearItems => "clearItems",
            PlayerCommand::SetPreload { .. } => "setPreload",
            PlayerCommand::SetScalingConfiguration { .. } => "setScalingConfiguration",
            PlayerCommand::InsertMessageInTrace { .. } => "insertMessageInTrace",
            PlayerCommand::LogStateToTrace => "logStateToTrace",
            PlayerCommand::FlushTrace => "flushTrace",
            PlayerCommand::SetTraceLogTransmissionChannel { .. } => {
                "setTraceLogTransmissionChannel"
            }
            PlayerCommand::SetTraceContextId { .. } => "setTraceContextId",
            PlayerCommand::SetRecordingTransmissionChannel { .. } => {
                "setRecordingTransmissionChannel"
            }
            PlayerCommand::SetRecordingContextId { .. } => "setRecordingContextId",
            PlayerCommand::SetUserId { .. } => "setUserId",
            PlayerCommand::Logout => "logout",
            PlayerCommand::GetUserId => "getUserId",
            PlayerCommand::ShowLogin { .. } => "showLogin",
            PlayerCommand::StartTask { .. } => "startTask",
            PlayerCommand::StopTask => "stopTask",
            PlayerCommand::PauseTask => "pauseTask",
            PlayerCommand::ResumeTask => "resumeTask",
            PlayerCommand::GetTask => "getTask",
            PlayerCommand::SetTaskSequencer { .. } => "setTaskSequencer",
            PlayerCommand::SetSwitchAvailability { .. } => "setSwitchAvailability",
            PlayerCommand::GetTasksState => "getTasksState",
            PlayerCommand::ClearTasksState => "clearTasksState",
            PlayerCommand::PreloadTasksState { .. } => "preloadTasksState",
            PlayerCommand::GetScoringResult => "getScoringResult",
            PlayerCommand::SendStatemachineEvent { .. } => "sendStatemachineEvent",
            PlayerCommand::SetHeaderButtons { .. } => "setHeaderButtons",
            PlayerCommand::SetMenuCarousels { .. } => "setMenuCarousels",
            PlayerCommand::ActivateDebuggingWindows { .. } => "activateDebuggingWindows",
        }
    }
}

// ============================================================================
// Outbound: Controller -> Host
// ============================================================================

/// Notifications relayed to the hosting page. The discriminator is `eventType`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[serde(tag = "eventType", rename_all = "camelCase")]
#[ts(export, export_to = "../../bindings/player-protocol.ts")]
pub enum HostEvent {
    ItemsLoadedInPlayer {
        #[serde(rename = "playerCount")]
        player_count: u32,
    },
    SetVisibility {
        #[serde(rename = "playerId")]
        player_id: String,
        visible: bool,
    },
    ScoringResult {
        #[serde(rename = "playerId")]
        player_id: Option<String>,
        /// Serialized scoring result
        result: String,
    },
    TraceLog {
        #[serde(rename = "playerId")]
        player_id: Option<String>,
        #[serde(rename = "metaData")]
        meta_data: String,
        #[serde(rename = "logEntriesList")]
        log_entries_list: Vec<String>,
    },
    Recording {
        #[serde(rename = "playerId")]
        player_id: Option<String>,
        #[serde(rename = "metaData")]
        meta_data: String,
        #[serde(rename = "recordingEntriesList")]
        recording_entries_list: Vec<String>,
    },
    TasksState {
        #[serde(rename = "playerId")]
        player_id: Option<String>,
        #[serde(rename = "userId")]
        user_id: String,
        state: String,
    },
}

// ============================================================================
// Configuration Records
// ============================================================================

/// Trace log upload settings from the controller configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LogTransmissionConfiguration {
    pub transmit_url: String,
    pub interval: u32,
    pub http_timeout: u32,
}

/// One task player frame: which runtime version it hosts and where its page is
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerConfiguration {
    pub player_id: String,
    pub runtime_version: String,
    pub frame_content_file: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemSize {
    pub height: u32,
    pub width: u32,
}

impl Default for ItemSize {
    fn default() -> Self {
        Self {
            height: 768,
            width: 1024,
        }
    }
}

/// Content of `controller/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ControllerConfiguration {
    #[serde(default)]
    pub trace_log_transmission: Option<LogTransmissionConfiguration>,
    #[serde(default)]
    pub math_jax_cdn_url: Option<String>,
    #[serde(default)]
    pub item_size: Option<ItemSize>,
    pub players: Vec<PlayerConfiguration>,
    pub show_player_info: bool,
}

impl ControllerConfiguration {
    pub fn player(&self, player_id: &str) -> Option<&PlayerConfiguration> {
        self.players.iter().find(|p| p.player_id == player_id)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(trace) = &self.trace_log_transmission {
            require_text("traceLogTransmission.transmitUrl", &trace.transmit_url)?;
            require_positive("traceLogTransmission.interval", trace.interval)?;
            require_positive("traceLogTransmission.httpTimeout", trace.http_timeout)?;
        }
        if let Some(url) = &self.math_jax_cdn_url {
            require_text("mathJaxCdnUrl", url)?;
        }
        if let Some(size) = &self.item_size {
            require_positive("itemSize.height", size.height)?;
            require_positive("itemSize.width", size.width)?;
        }
        for (index, player) in self.players.iter().enumerate() {
            require_text("players[].playerId", &player.player_id)?;
            require_text("players[].runtimeVersion", &player.runtime_version)?;
            require_text("players[].frameContentFile", &player.frame_content_file)?;
            if self.players[..index]
                .iter()
                .any(|p| p.player_id == player.player_id)
            {
                return Err(ConfigError::DuplicatePlayer(player.player_id.clone()));
            }
        }
        Ok(())
    }
}

/// Content of `assessments/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssessmentConfiguration {
    pub tasks: Vec<TaskIdentification>,
}

impl AssessmentConfiguration {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for task in &self.tasks {
            require_text("tasks[].item", &task.item)?;
            require_text("tasks[].task", &task.task)?;
            require_text("tasks[].scope", &task.scope)?;
        }
        if self.tasks.is_empty() {
            return Err(ConfigError::NoTasks);
        }
        Ok(())
    }

    /// Distinct item names in first-appearance order
    pub fn item_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for task in &self.tasks {
            if !names.contains(&task.item) {
                names.push(task.item.clone());
            }
        }
        names
    }
}

/// The part of `items/{name}/config.json` the controller reads
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ItemConfiguration {
    pub name: String,
    pub runtime_compatibility_version: String,
}

impl ItemConfiguration {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_text("name", &self.name)?;
        require_text("runtimeCompatibilityVersion", &self.runtime_compatibility_version)
    }
}

/// Viewport scaling handed to every runtime
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScalingConfiguration {
    pub scaling_mode: String,
    pub alignment_horizontal: String,
    pub alignment_vertical: String,
}

impl Default for ScalingConfiguration {
    fn default() -> Self {
        Self {
            scaling_mode: "scale-up-down".to_string(),
            alignment_horizontal: "center".to_string(),
            alignment_vertical: "center".to_string(),
        }
    }
}

impl From<&ScalingConfiguration> for PlayerCommand {
    fn from(scaling: &ScalingConfiguration) -> Self {
        PlayerCommand::SetScalingConfiguration {
            scaling_mode: scaling.scaling_mode.clone(),
            alignment_horizontal: scaling.alignment_horizontal.clone(),
            alignment_vertical: scaling.alignment_vertical.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing or empty field: {0}")]
    MissingField(&'static str),

    #[error("field must be a positive number: {0}")]
    NotPositive(&'static str),

    #[error("no tasks declared in assessment configuration")]
    NoTasks,

    #[error("player id declared more than once: {0}")]
    DuplicatePlayer(String),
}

fn require_text(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::MissingField(field));
    }
    Ok(())
}

fn require_positive(field: &'static str, value: u32) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::NotPositive(field));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
