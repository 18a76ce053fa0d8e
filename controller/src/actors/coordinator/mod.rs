//! ControllerActor - drives an assessment across task player frames
//!
//! The coordinator wires the message receiver to the registries, the task
//! sequencer and the message sender:
//! - waits until every configured player has mounted and announced readiness
//! - shows the login dialog and, once closed, announces the user
//! - loads the assessment and installs its items on compatible players
//! - starts tasks and answers switch requests from players
//! - follows navigation requests from the hosting page
//!
//! ## Session flow
//!
//! ```text
//! WaitingForPlayers → Login → LoadingAssessment → InstallingItems → Running
//!                       ^                                             |
//!                       └──────────────── cancelTask ─────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ractor::Actor;
//! use crate::actors::coordinator::{wire_receiver, ControllerActor, ControllerArguments};
//!
//! let (controller, _handle) = Actor::spawn(None, ControllerActor, args).await?;
//! let mut receiver = MessageReceiver::new(origin);
//! wire_receiver(&mut receiver, controller.clone());
//! ```

pub mod actor;
pub mod protocol;
pub mod resolve;
mod session;
mod switching;
mod wiring;

#[cfg(test)]
mod tests;

pub use actor::{ControllerActor, ControllerArguments, ControllerState};
pub use protocol::{
    ControllerError, ControllerMsg, ControllerOptions, ControllerSnapshot, SessionStartMode,
    TaskSwitchStrategy,
};
pub use session::{show_login_command, MATH_JAX_UNKNOWN, POST_MESSAGE_TRACE_INTERVAL};
pub use switching::GO_TO_TASK_MISSING;
pub use wiring::wire_receiver;
