//! Endpoint resolution
//!
//! Which task player runs a task: an advised player if it is registered and
//! compatible, else the requesting player if it is compatible, else the first
//! registered compatible player.

use crate::actors::player_registry::{Endpoint, PlayerRegistry};
use crate::transport::TargetRef;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPlayer {
    pub player_id: String,
    pub target: TargetRef,
}

impl From<&Endpoint> for ResolvedPlayer {
    fn from(endpoint: &Endpoint) -> Self {
        Self {
            player_id: endpoint.id().to_string(),
            target: endpoint.target().clone(),
        }
    }
}

pub fn resolve_player(
    players: &PlayerRegistry,
    advised: Option<&str>,
    requester: Option<&TargetRef>,
    version: &str,
) -> Option<ResolvedPlayer> {
    let advised = advised
        .and_then(|id| players.by_id(id))
        .filter(|endpoint| endpoint.accepts(version));
    let requester = requester
        .and_then(|target| players.by_target(target))
        .filter(|endpoint| endpoint.accepts(version));

    advised
        .or(requester)
        .or_else(|| players.find_compatible(version))
        .map(ResolvedPlayer::from)
}

/// Where the login dialog goes: the advised player when registered,
/// otherwise the requester.
pub fn login_target(
    players: &PlayerRegistry,
    advised: Option<&str>,
    requester: &TargetRef,
) -> Option<ResolvedPlayer> {
    advised
        .and_then(|id| players.by_id(id))
        .or_else(|| players.by_target(requester))
        .map(ResolvedPlayer::from)
}
