//! Visibility of task player frames
//!
//! Frames are rendered by the hosting page. The controller only decides which
//! player is visible and asks the surface to apply it.

use shared_types::HostEvent;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::actors::sender::MessageSender;

/// Capability to toggle the visual surface of one player.
pub trait SurfaceControl: Send + Sync {
    /// Returns `false` when the surface for `player_id` is not available.
    fn set_visible(&self, player_id: &str, visible: bool) -> bool;
}

/// Forwards visibility changes to the hosting page.
#[derive(Clone)]
pub struct HostSurface {
    sender: MessageSender,
}

impl HostSurface {
    pub fn new(sender: MessageSender) -> Self {
        Self { sender }
    }
}

impl SurfaceControl for HostSurface {
    fn set_visible(&self, player_id: &str, visible: bool) -> bool {
        self.sender
            .notify_host(&HostEvent::SetVisibility {
                player_id: player_id.to_string(),
                visible,
            })
            .is_ok()
    }
}

/// Records visibility changes in memory.
#[derive(Clone, Default)]
pub struct RecordingSurface {
    changes: Arc<Mutex<Vec<(String, bool)>>>,
    unavailable: Arc<Mutex<HashSet<String>>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the surface for `player_id` report itself as not mounted.
    pub fn mark_unavailable(&self, player_id: &str) {
        if let Ok(mut unavailable) = self.unavailable.lock() {
            unavailable.insert(player_id.to_string());
        }
    }

    pub fn changes(&self) -> Vec<(String, bool)> {
        self.changes.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Players whose latest recorded change made them visible
    pub fn visible(&self) -> Vec<String> {
        let mut latest: Vec<(String, bool)> = Vec::new();
        for (id, visible) in self.changes() {
            match latest.iter_mut().find(|(known, _)| *known == id) {
                Some(entry) => entry.1 = visible,
                None => latest.push((id, visible)),
            }
        }
        latest
            .into_iter()
            .filter(|(_, visible)| *visible)
            .map(|(id, _)| id)
            .collect()
    }
}

impl SurfaceControl for RecordingSurface {
    fn set_visible(&self, player_id: &str, visible: bool) -> bool {
        let available = self
            .unavailable
            .lock()
            .map(|u| !u.contains(player_id))
            .unwrap_or(false);
        if !available {
            return false;
        }
        if let Ok(mut changes) = self.changes.lock() {
            changes.push((player_id.to_string(), visible));
        }
        true
    }
}
