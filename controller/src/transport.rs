//! Outbound transport for task player and host connections
//!
//! Every websocket connection gets a `TargetRef`. The controller never holds a
//! socket: it addresses a connection by its target reference and the transport
//! hands the serialized payload to that connection's writer task.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Opaque handle used to address one connected endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TargetRef(String);

impl TargetRef {
    /// Fresh reference for a new connection
    pub fn generate() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TargetRef {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TargetRef {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for TargetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("no connection for target {0}")]
    UnknownTarget(TargetRef),

    #[error("connection closed for target {0}")]
    Closed(TargetRef),

    #[error("no host connection attached")]
    NoHost,

    #[error("session table poisoned")]
    Poisoned,
}

/// Fire-and-forget delivery of serialized payloads.
pub trait Transport: Send + Sync {
    /// Deliver one payload to the endpoint behind `target`.
    fn send(&self, target: &TargetRef, payload: String) -> Result<(), TransportError>;

    /// Deliver one payload to every attached host connection.
    fn send_host(&self, payload: String) -> Result<(), TransportError>;
}

type SessionTable = HashMap<TargetRef, mpsc::UnboundedSender<String>>;

/// Websocket-backed transport. Each attached connection owns an unbounded
/// channel that its writer task drains into the socket.
#[derive(Clone, Default)]
pub struct WsTransport {
    players: Arc<Mutex<SessionTable>>,
    hosts: Arc<Mutex<SessionTable>>,
}

impl WsTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach_player(&self, target: TargetRef) -> mpsc::UnboundedReceiver<String> {
        attach(&self.players, target)
    }

    pub fn attach_host(&self, target: TargetRef) -> mpsc::UnboundedReceiver<String> {
        attach(&self.hosts, target)
    }

    pub fn detach(&self, target: &TargetRef) {
        if let Ok(mut players) = self.players.lock() {
            players.remove(target);
        }
        if let Ok(mut hosts) = self.hosts.lock() {
            hosts.remove(target);
        }
    }

    pub fn player_connections(&self) -> usize {
        self.players.lock().map(|p| p.len()).unwrap_or(0)
    }

    pub fn host_connections(&self) -> usize {
        self.hosts.lock().map(|h| h.len()).unwrap_or(0)
    }
}

fn attach(table: &Mutex<SessionTable>, target: TargetRef) -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    if let Ok(mut sessions) = table.lock() {
        sessions.insert(target, tx);
    }
    rx
}

impl Transport for WsTransport {
    fn send(&self, target: &TargetRef, payload: String) -> Result<(), TransportError> {
        let players = self.players.lock().map_err(|_| TransportError::Poisoned)?;
        let tx = players
            .get(target)
            .ok_or_else(|| TransportError::UnknownTarget(target.clone()))?;
        tx.send(payload)
            .map_err(|_| TransportError::Closed(target.clone()))
    }

    fn send_host(&self, payload: String) -> Result<(), TransportError> {
        let hosts = self.hosts.lock().map_err(|_| TransportError::Poisoned)?;
        if hosts.is_empty() {
            return Err(TransportError::NoHost);
        }
        let mut delivered = false;
        for (target, tx) in hosts.iter() {
            if tx.send(payload.clone()).is_ok() {
                delivered = true;
            } else {
                tracing::debug!(target_ref = %target, "Host connection closed before delivery");
            }
        }
        if delivered {
            Ok(())
        } else {
            Err(TransportError::NoHost)
        }
    }
}

/// A payload captured by `MemoryTransport`
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    Player { target: TargetRef, payload: String },
    Host { payload: String },
}

/// In-process transport that records every delivery.
///
/// Used when embedding the controller without sockets and by the test suites.
#[derive(Clone, Default)]
pub struct MemoryTransport {
    deliveries: Arc<Mutex<Vec<Delivery>>>,
    host_attached: Arc<std::sync::atomic::AtomicBool>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host deliveries fail with `NoHost` until this is set.
    pub fn set_host_attached(&self, attached: bool) {
        self.host_attached
            .store(attached, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().map(|d| d.clone()).unwrap_or_default()
    }

    /// Decoded commands delivered to one target, in send order
    pub fn commands_to(&self, target: &TargetRef) -> Vec<shared_types::PlayerCommand> {
        self.deliveries()
            .into_iter()
            .filter_map(|delivery| match delivery {
                Delivery::Player { target: t, payload } if &t == target => {
                    serde_json::from_str(&payload).ok()
                }
                _ => None,
            })
            .collect()
    }

    /// Decoded host events, in send order
    pub fn host_events(&self) -> Vec<shared_types::HostEvent> {
        self.deliveries()
            .into_iter()
            .filter_map(|delivery| match delivery {
                Delivery::Host { payload } => serde_json::from_str(&payload).ok(),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut deliveries) = self.deliveries.lock() {
            deliveries.clear();
        }
    }
}

impl Transport for MemoryTransport {
    fn send(&self, target: &TargetRef, payload: String) -> Result<(), TransportError> {
        let mut deliveries = self.deliveries.lock().map_err(|_| TransportError::Poisoned)?;
        deliveries.push(Delivery::Player {
            target: target.clone(),
            payload,
        });
        Ok(())
    }

    fn send_host(&self, payload: String) -> Result<(), TransportError> {
        if !self.host_attached.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(TransportError::NoHost);
        }
        let mut deliveries = self.deliveries.lock().map_err(|_| TransportError::Poisoned)?;
        deliveries.push(Delivery::Host { payload });
        Ok(())
    }
}
