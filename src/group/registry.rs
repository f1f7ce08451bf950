//! Group Registry Module
//!
//! Name to group lookup shared by the peer server and the application.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::group::{Getter, Group};

// == Group Registry ==
/// Process-wide table of groups by name.
///
/// Cloning the registry yields another handle to the same table.
#[derive(Debug, Clone, Default)]
pub struct GroupRegistry {
    groups: Arc<RwLock<HashMap<String, Arc<Group>>>>,
}

impl GroupRegistry {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == New Group ==
    /// Creates a group and registers it under `name`.
    ///
    /// Registering a name twice replaces the earlier group.
    pub fn new_group(
        &self,
        name: impl Into<String>,
        cache_bytes: usize,
        getter: impl Getter,
    ) -> Arc<Group> {
        let group = Arc::new(Group::new(name, cache_bytes, getter));
        self.groups
            .write()
            .insert(group.name().to_string(), group.clone());

        info!("Registered group {} with {} cache bytes", group.name(), cache_bytes);
        group
    }

    // == Get Group ==
    /// Returns the group registered under `name`, if any.
    pub fn get_group(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.read().get(name).cloned()
    }

    /// Returns every registered group, sorted by name.
    pub fn groups(&self) -> Vec<Arc<Group>> {
        let mut groups: Vec<_> = self.groups.read().values().cloned().collect();
        groups.sort_by(|a, b| a.name().cmp(b.name()));
        groups
    }

    /// Returns the registered group names, sorted.
    pub fn group_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.groups.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.groups.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo(key: &str) -> anyhow::Result<Vec<u8>> {
        Ok(key.as_bytes().to_vec())
    }

    #[test]
    fn test_get_group() {
        let registry = GroupRegistry::new();
        let group = registry.new_group("scores", 2 << 10, echo);

        let found = registry.get_group("scores").unwrap();
        assert!(Arc::ptr_eq(&group, &found));
        assert!(registry.get_group("scores111").is_none());
    }

    #[test]
    fn test_clones_share_the_table() {
        let registry = GroupRegistry::new();
        let handle = registry.clone();

        registry.new_group("scores", 0, echo);
        assert_eq!(handle.len(), 1);
        assert!(handle.get_group("scores").is_some());
    }

    #[test]
    fn test_last_registration_wins() {
        let registry = GroupRegistry::new();
        let first = registry.new_group("scores", 0, echo);
        let second = registry.new_group("scores", 0, echo);

        let found = registry.get_group("scores").unwrap();
        assert!(Arc::ptr_eq(&second, &found));
        assert!(!Arc::ptr_eq(&first, &found));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_groups_sorted_by_name() {
        let registry = GroupRegistry::new();
        registry.new_group("b", 0, echo);
        registry.new_group("a", 0, echo);

        let names: Vec<_> = registry.groups().iter().map(|g| g.name().to_string()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(registry.group_names(), names);
    }
}
