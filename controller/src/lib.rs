//! Task player controller
//!
//! Runs an assessment across several task player runtimes: tracks which
//! players are mounted and ready, installs the items each runtime version can
//! run, sequences the tasks and relays results to the hosting page.

pub mod actors;
pub mod api;
pub mod app_state;
pub mod config;
pub mod fetch;
pub mod launch;
pub mod transport;

pub use actors::coordinator::{ControllerActor, ControllerMsg};
pub use app_state::AppState;
