//! Permission checks consulted when a user's role is not an approver role

use std::collections::{BTreeSet, HashMap};
use workflow_types::{RoleId, User};

/// Answers whether a user holds a named permission
pub trait PermissionService: Send + Sync {
    fn has_permission(&self, user: &User, resource: &str, action: &str) -> bool;
}

/// Grants nothing
#[derive(Clone, Copy, Debug, Default)]
pub struct DenyAll;

impl PermissionService for DenyAll {
    fn has_permission(&self, _user: &User, _resource: &str, _action: &str) -> bool {
        false
    }
}

/// Static role to permission table.
///
/// Grants are `resource:action` patterns. `*` matches any value in that
/// position and a trailing `*` matches by prefix.
#[derive(Clone, Debug, Default)]
pub struct RolePermissions {
    grants: HashMap<RoleId, BTreeSet<String>>,
}

impl RolePermissions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&mut self, role: RoleId, pattern: impl Into<String>) {
        self.grants.entry(role).or_default().insert(pattern.into());
    }

    pub fn with_grant(mut self, role: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.grant(RoleId::new(role), pattern);
        self
    }

    pub fn permissions_for(&self, role: &RoleId) -> impl Iterator<Item = &str> {
        self.grants
            .get(role)
            .into_iter()
            .flat_map(|patterns| patterns.iter().map(String::as_str))
    }
}

impl PermissionService for RolePermissions {
    fn has_permission(&self, user: &User, resource: &str, action: &str) -> bool {
        self.permissions_for(&user.role).any(|pattern| {
            let (granted_resource, granted_action) =
                pattern.split_once(':').unwrap_or((pattern, "*"));
            segment_matches(granted_resource, resource) && segment_matches(granted_action, action)
        })
    }
}

fn segment_matches(granted: &str, requested: &str) -> bool {
    granted == "*"
        || granted == requested
        || (granted.ends_with('*') && requested.starts_with(granted.trim_end_matches('*')))
}
