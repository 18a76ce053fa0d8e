//! Item Registry - install-once record of item name to runtime version
//!
//! Besides the installed items, the registry tracks names whose configuration
//! fetch is still in flight so that two overlapping install triggers for the
//! same name only ever install it once.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ItemSnapshot {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Default)]
pub struct ItemRegistry {
    items: BTreeMap<String, String>,
    installing: BTreeSet<String>,
}

impl ItemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an installed item. Registering a known name changes nothing.
    pub fn register(&mut self, name: impl Into<String>, version: impl Into<String>) {
        let name = name.into();
        if self.items.contains_key(&name) {
            tracing::debug!(item = %name, "Item already registered");
            return;
        }
        self.items.insert(name, version.into());
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    pub fn version(&self, name: &str) -> Option<&str> {
        self.items.get(name).map(String::as_str)
    }

    /// Claim `name` for installation. Returns `false` when it is already
    /// installed or another install of it is under way.
    pub fn begin_install(&mut self, name: &str) -> bool {
        if self.is_registered(name) || self.installing.contains(name) {
            return false;
        }
        self.installing.insert(name.to_string());
        true
    }

    pub fn finish_install(&mut self, name: &str, version: &str) {
        self.installing.remove(name);
        self.register(name, version);
    }

    pub fn abandon_install(&mut self, name: &str) {
        self.installing.remove(name);
    }

    pub fn is_installing(&self, name: &str) -> bool {
        self.installing.contains(name)
    }

    pub fn installing(&self) -> Vec<String> {
        self.installing.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn snapshot(&self) -> Vec<ItemSnapshot> {
        self.items
            .iter()
            .map(|(name, version)| ItemSnapshot {
                name: name.clone(),
                version: version.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_is_install_once() {
        let mut items = ItemRegistry::new();
        items.register("i1", "9.1");
        items.register("i1", "9.2");
        assert_eq!(items.len(), 1);
        assert_eq!(items.version("i1"), Some("9.1"));
        assert!(items.version("i2").is_none());
    }

    #[test]
    fn test_in_flight_install_is_claimed_once() {
        let mut items = ItemRegistry::new();
        assert!(items.begin_install("i1"));
        assert!(!items.begin_install("i1"));
        assert!(items.is_installing("i1"));
        assert!(!items.is_registered("i1"));

        items.finish_install("i1", "9.1");
        assert!(!items.is_installing("i1"));
        assert!(items.is_registered("i1"));
        assert!(!items.begin_install("i1"));
    }

    #[test]
    fn test_abandoned_install_can_be_retried() {
        let mut items = ItemRegistry::new();
        assert!(items.begin_install("i1"));
        items.abandon_install("i1");
        assert!(items.installing().is_empty());
        assert!(items.begin_install("i1"));
    }
}
