//! Player Registry - the roster of task player endpoints
//!
//! Maps endpoint id to target reference, compatibility predicate and
//! readiness. Readiness may be announced before the endpoint registers; such
//! signals wait in the pending-ready set and are applied exactly once when the
//! matching target registers.
//!
//! A frame that reconnects mounts again under its configured id. The newest
//! connection wins: the endpoint is rebound to the new target and has to
//! announce readiness again.
//!
//! Absence is always reported as `None` or `false`. Callers decide whether a
//! missing endpoint is fatal for what they are doing.

use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

use crate::actors::surface::SurfaceControl;
use crate::transport::TargetRef;

/// Decides whether an endpoint can run content built for a runtime version
pub type CompatibilityCheck = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Predicate accepting exactly one runtime version
pub fn exact_version(runtime_version: impl Into<String>) -> CompatibilityCheck {
    let runtime_version = runtime_version.into();
    Arc::new(move |version: &str| version == runtime_version)
}

/// One registered task player
pub struct Endpoint {
    id: String,
    target: TargetRef,
    is_compatible: CompatibilityCheck,
    ready: bool,
}

impl Endpoint {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn target(&self) -> &TargetRef {
        &self.target
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn accepts(&self, version: &str) -> bool {
        (self.is_compatible)(version)
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("id", &self.id)
            .field("target", &self.target)
            .field("ready", &self.ready)
            .finish()
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("target {0} is already registered")]
    DuplicateTarget(TargetRef),
}

/// Outcome of a successful `register`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Added,
    /// The id was known; its endpoint now points at the new target
    Rebound { previous: TargetRef },
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PlayerSnapshot {
    pub player_id: String,
    pub target: TargetRef,
    pub ready: bool,
}

pub struct PlayerRegistry {
    /// Registration order is the tie-break for compatibility lookups
    endpoints: Vec<Endpoint>,
    pending_ready: HashSet<TargetRef>,
    expected_count: usize,
    surface: Arc<dyn SurfaceControl>,
}

impl PlayerRegistry {
    pub fn new(expected_count: usize, surface: Arc<dyn SurfaceControl>) -> Self {
        Self {
            endpoints: Vec::new(),
            pending_ready: HashSet::new(),
            expected_count,
            surface,
        }
    }

    /// Add an endpoint, or rebind a known id to a new target. A buffered
    /// readiness signal for `target` is consumed and applied here.
    pub fn register(
        &mut self,
        id: impl Into<String>,
        target: TargetRef,
        is_compatible: CompatibilityCheck,
    ) -> Result<Registration, RegistrationError> {
        let id = id.into();
        if self.endpoints.iter().any(|e| e.target == target) {
            tracing::warn!(player_id = %id, target_ref = %target, "Target already registered, ignoring");
            return Err(RegistrationError::DuplicateTarget(target));
        }

        let ready = self.pending_ready.remove(&target);
        if let Some(endpoint) = self.endpoints.iter_mut().find(|e| e.id == id) {
            let previous = std::mem::replace(&mut endpoint.target, target);
            endpoint.is_compatible = is_compatible;
            endpoint.ready = ready;
            self.pending_ready.remove(&previous);
            tracing::info!(
                player_id = %id,
                previous = %previous,
                target_ref = %endpoint.target,
                ready,
                "Rebound task player to new target"
            );
            return Ok(Registration::Rebound { previous });
        }

        tracing::info!(player_id = %id, target_ref = %target, ready, "Registered task player");
        self.endpoints.push(Endpoint {
            id,
            target,
            is_compatible,
            ready,
        });

        if self.endpoints.len() > self.expected_count {
            tracing::warn!(
                expected = self.expected_count,
                registered = self.endpoints.len(),
                "More task players registered than configured"
            );
        }
        Ok(Registration::Added)
    }

    /// The connection behind `target` is gone. A bound endpoint stays in the
    /// roster but is no longer ready; a buffered signal is discarded.
    /// Returns the id of the endpoint that was bound to `target`.
    pub fn detach(&mut self, target: &TargetRef) -> Option<&str> {
        self.pending_ready.remove(target);
        let endpoint = self.endpoints.iter_mut().find(|e| &e.target == target)?;
        endpoint.ready = false;
        Some(endpoint.id.as_str())
    }

    /// Mark `target` ready, or remember the signal until it registers.
    pub fn receive_ready(&mut self, target: &TargetRef) {
        match self.endpoints.iter_mut().find(|e| &e.target == target) {
            Some(endpoint) => endpoint.ready = true,
            None => {
                tracing::debug!(target_ref = %target, "Readiness before registration, buffering");
                self.pending_ready.insert(target.clone());
            }
        }
    }

    pub fn all_ready(&self) -> bool {
        self.endpoints.len() >= self.expected_count && self.endpoints.iter().all(|e| e.ready)
    }

    /// First endpoint, in registration order, that accepts `version`
    pub fn find_compatible(&self, version: &str) -> Option<&Endpoint> {
        self.endpoints.iter().find(|e| e.accepts(version))
    }

    pub fn is_compatible_by_id(&self, id: &str, version: &str) -> bool {
        self.by_id(id).map(|e| e.accepts(version)).unwrap_or(false)
    }

    pub fn is_compatible_by_target(&self, target: &TargetRef, version: &str) -> bool {
        self.by_target(target)
            .map(|e| e.accepts(version))
            .unwrap_or(false)
    }

    pub fn for_each(&self, mut action: impl FnMut(&Endpoint)) {
        self.endpoints.iter().for_each(|e| action(e));
    }

    pub fn for_each_compatible(&self, version: &str, mut action: impl FnMut(&Endpoint)) {
        self.endpoints
            .iter()
            .filter(|e| e.accepts(version))
            .for_each(|e| action(e));
    }

    /// Make `id` the only visible endpoint.
    pub fn show(&self, id: &str) {
        for endpoint in &self.endpoints {
            let visible = endpoint.id == id;
            if !self.surface.set_visible(&endpoint.id, visible) {
                tracing::warn!(
                    player_id = %endpoint.id,
                    visible,
                    "Surface for task player not available"
                );
            }
        }
    }

    pub fn by_id(&self, id: &str) -> Option<&Endpoint> {
        self.endpoints.iter().find(|e| e.id == id)
    }

    pub fn by_target(&self, target: &TargetRef) -> Option<&Endpoint> {
        self.endpoints.iter().find(|e| &e.target == target)
    }

    pub fn player_id(&self, target: &TargetRef) -> Option<&str> {
        self.by_target(target).map(|e| e.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn expected_count(&self) -> usize {
        self.expected_count
    }

    pub fn pending_ready_count(&self) -> usize {
        self.pending_ready.len()
    }

    pub fn snapshot(&self) -> Vec<PlayerSnapshot> {
        self.endpoints
            .iter()
            .map(|e| PlayerSnapshot {
                player_id: e.id.clone(),
                target: e.target.clone(),
                ready: e.ready,
            })
            .collect()
    }
}
