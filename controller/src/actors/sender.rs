//! Message Sender - outbound command encoder
//!
//! One call, one transmission. Nothing is acknowledged: a command that the
//! transport cannot deliver is logged and forgotten.

use shared_types::{HostEvent, PlayerCommand};
use std::sync::Arc;

use crate::transport::{TargetRef, Transport, TransportError};

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum SenderError {
    #[error("encode failed: {0}")]
    Encode(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl From<serde_json::Error> for SenderError {
    fn from(err: serde_json::Error) -> Self {
        SenderError::Encode(err.to_string())
    }
}

#[derive(Clone)]
pub struct MessageSender {
    transport: Arc<dyn Transport>,
}

impl MessageSender {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Encode `command` and hand it to the transport for `target`.
    pub fn send(&self, target: &TargetRef, command: &PlayerCommand) {
        if let Err(e) = self.try_send(target, command) {
            tracing::warn!(
                target_ref = %target,
                event_type = command.event_type(),
                error = %e,
                "Failed to send command to task player"
            );
        }
    }

    fn try_send(&self, target: &TargetRef, command: &PlayerCommand) -> Result<(), SenderError> {
        let payload = serde_json::to_string(command)?;
        self.transport.send(target, payload)?;
        tracing::debug!(target_ref = %target, event_type = command.event_type(), "Sent command");
        Ok(())
    }

    /// Relay an event to the hosting page.
    pub fn notify_host(&self, event: &HostEvent) -> Result<(), SenderError> {
        let payload = serde_json::to_string(event)?;
        self.transport.send_host(payload)?;
        Ok(())
    }
}
