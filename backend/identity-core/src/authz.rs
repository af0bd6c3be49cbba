//! Authorization evaluation.
//!
//! Role resolution is a cached lookup over the role definition table; the
//! evaluator itself is a pure membership check and performs no I/O. The cache
//! is replaced wholesale when role definitions change; callers decide when,
//! the directory only provides the trigger.

use crate::models::RoleDefinition;
use dashmap::DashMap;
use std::collections::HashSet;
use uuid::Uuid;

/// Cached role → permission-set table.
pub struct RoleDirectory {
    roles: DashMap<String, HashSet<String>>,
}

impl RoleDirectory {
    pub fn new(definitions: Vec<RoleDefinition>) -> Self {
        let directory = Self {
            roles: DashMap::new(),
        };
        directory.replace_all(definitions);
        directory
    }

    /// Swap in a fresh role table. Called when role definitions change.
    /// A lookup racing the swap may see a role as absent, which denies;
    /// it never sees a stale grant for a role the new table dropped.
    pub fn replace_all(&self, definitions: Vec<RoleDefinition>) {
        let fresh: Vec<(String, HashSet<String>)> = definitions
            .into_iter()
            .map(|def| (def.name, def.permissions.into_iter().collect()))
            .collect();

        self.roles.clear();
        for (name, permissions) in fresh {
            self.roles.insert(name, permissions);
        }
    }

    /// True iff `permission` is in the set resolved for `role`.
    /// Unknown roles resolve to the empty set.
    pub fn authorize(&self, role: &str, permission: &str) -> bool {
        self.roles
            .get(role)
            .map(|permissions| permissions.contains(permission))
            .unwrap_or(false)
    }

    /// Owner-or-permission check: the actor owns the resource, or their role
    /// grants `permission`. Every failure path denies.
    pub fn authorize_owner_or_permission(
        &self,
        actor_user_id: Uuid,
        resource_owner_id: Uuid,
        role: &str,
        permission: &str,
    ) -> bool {
        actor_user_id == resource_owner_id || self.authorize(role, permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> RoleDirectory {
        RoleDirectory::new(vec![
            RoleDefinition::new("admin", &["content.read", "content.create", "content.delete"]),
            RoleDefinition::new("author", &["content.read", "content.create"]),
            RoleDefinition::new("reader", &["content.read"]),
        ])
    }

    #[test]
    fn role_grants_its_permissions() {
        let dir = directory();
        assert!(dir.authorize("author", "content.create"));
        assert!(dir.authorize("reader", "content.read"));
    }

    #[test]
    fn role_denies_missing_permissions() {
        let dir = directory();
        assert!(!dir.authorize("reader", "content.create"));
        assert!(!dir.authorize("author", "content.delete"));
    }

    #[test]
    fn unknown_role_denies() {
        let dir = directory();
        assert!(!dir.authorize("superuser", "content.read"));
    }

    #[test]
    fn owner_passes_without_role_grant() {
        let dir = directory();
        let owner = Uuid::new_v4();
        assert!(dir.authorize_owner_or_permission(owner, owner, "reader", "content.delete"));
    }

    #[test]
    fn non_owner_needs_the_role_grant() {
        let dir = directory();
        let actor = Uuid::new_v4();
        let owner = Uuid::new_v4();
        assert!(dir.authorize_owner_or_permission(actor, owner, "admin", "content.delete"));
        assert!(!dir.authorize_owner_or_permission(actor, owner, "reader", "content.delete"));
    }

    #[test]
    fn replace_all_applies_the_new_table() {
        let dir = directory();
        assert!(dir.authorize("reader", "content.read"));

        dir.replace_all(vec![RoleDefinition::new("reader", &[])]);

        assert!(!dir.authorize("reader", "content.read"));
        assert!(!dir.authorize("admin", "content.read")); // dropped entirely
    }
}
