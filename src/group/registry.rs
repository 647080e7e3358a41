//! Group Registry Module
//!
//! Owns every group of a node and resolves them by name.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::group::{Getter, Group};

// == Group Registry ==
/// Name to group table shared by the node's request handlers.
///
/// Held by whoever owns the service lifetime (usually behind an `Arc` in
/// the HTTP state); groups live as long as the registry.
#[derive(Debug, Default)]
pub struct GroupRegistry {
    groups: RwLock<HashMap<String, Arc<Group>>>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // == New Group ==
    /// Creates and registers a group. An existing group with the same name
    /// is replaced.
    pub fn new_group(
        &self,
        name: impl Into<String>,
        cache_bytes: usize,
        getter: impl Getter + 'static,
    ) -> Arc<Group> {
        let group = Arc::new(Group::new(name, cache_bytes, getter));

        let previous = self
            .groups
            .write()
            .insert(group.name().to_string(), group.clone());
        if previous.is_some() {
            warn!(group = group.name(), "replaced existing group");
        }
        info!(group = group.name(), cache_bytes, "registered group");

        group
    }

    // == Get Group ==
    /// Returns the group registered under `name`.
    pub fn get_group(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.read().get(name).cloned()
    }

    /// Returns every registered group, sorted by name.
    pub fn groups(&self) -> Vec<Arc<Group>> {
        let mut groups: Vec<Arc<Group>> = self.groups.read().values().cloned().collect();
        groups.sort_by(|a, b| a.name().cmp(b.name()));
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::GetterFn;

    fn echo() -> GetterFn<impl Fn(&str) -> anyhow::Result<Vec<u8>> + Send + Sync> {
        GetterFn::new(|key| Ok(key.as_bytes().to_vec()))
    }

    #[test]
    fn test_get_unknown_group() {
        let registry = GroupRegistry::new();
        assert!(registry.get_group("missing").is_none());
    }

    #[tokio::test]
    async fn test_new_group_is_retrievable() {
        let registry = GroupRegistry::new();
        let created = registry.new_group("scores", 2048, echo());

        let found = registry.get_group("scores").unwrap();

        assert!(Arc::ptr_eq(&created, &found));
        assert_eq!(found.get("Tom").await.unwrap().to_string(), "Tom");
    }

    #[test]
    fn test_same_name_overwrites() {
        let registry = GroupRegistry::new();
        let first = registry.new_group("scores", 2048, echo());
        let second = registry.new_group("scores", 4096, echo());

        let found = registry.get_group("scores").unwrap();

        assert!(!Arc::ptr_eq(&first, &found));
        assert!(Arc::ptr_eq(&second, &found));
        assert_eq!(found.cache_stats().max_bytes, 4096);
        assert_eq!(registry.groups().len(), 1);
    }

    #[test]
    fn test_groups_sorted_by_name() {
        let registry = GroupRegistry::new();
        registry.new_group("users", 1024, echo());
        registry.new_group("scores", 1024, echo());

        let names: Vec<String> = registry
            .groups()
            .iter()
            .map(|g| g.name().to_string())
            .collect();
        assert_eq!(names, vec!["scores", "users"]);
    }
}
