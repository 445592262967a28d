//! Permission definitions and validation.

use crate::error::{Error, Result};
use std::cmp::Ordering;
use std::collections::HashSet;

/// An atomic access grant identified by the `(resource, action, scope)` triple.
///
/// Equality, ordering and hashing only look at the triple. Two permissions
/// loaded from different roles with the same triple are the same permission,
/// regardless of their descriptions.
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Permission {
    /// The resource type this permission applies to (e.g., "user", "payroll").
    resource: String,
    /// The action being performed (e.g., "read", "write").
    action: String,
    /// The scope the grant is limited to (e.g., "department", "organization").
    scope: String,
    /// Optional human-readable description.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    description: Option<String>,
}

impl Permission {
    /// Create a new permission. Components are validated when the permission
    /// enters a comparison; use [`Permission::try_new`] to validate eagerly.
    pub fn new(
        resource: impl Into<String>,
        action: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            resource: resource.into(),
            action: action.into(),
            scope: scope.into(),
            description: None,
        }
    }

    /// Create a new permission, rejecting malformed components.
    pub fn try_new(
        resource: impl Into<String>,
        action: impl Into<String>,
        scope: impl Into<String>,
    ) -> Result<Self> {
        let permission = Self::new(resource, action, scope);
        permission.validate()?;
        Ok(permission)
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Get the resource this permission applies to. This is also its category.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Get the action this permission grants.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Get the scope of the grant.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Get the description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Check that every component is non-blank and free of NUL characters.
    pub fn validate(&self) -> Result<()> {
        for (label, value) in [
            ("resource", &self.resource),
            ("action", &self.action),
            ("scope", &self.scope),
        ] {
            if value.trim().is_empty() {
                return Err(Error::InvalidPermission(format!(
                    "{label} cannot be empty in '{}'",
                    self
                )));
            }
            if value.contains('\0') {
                return Err(Error::InvalidPermission(format!(
                    "{label} cannot contain null characters in '{}'",
                    self.to_string().escape_default()
                )));
            }
        }
        Ok(())
    }

    /// Parse a permission from the `action:resource:scope` format.
    pub fn parse(permission_str: &str) -> Result<Self> {
        let parts: Vec<&str> = permission_str.split(':').collect();
        if parts.len() != 3 {
            return Err(Error::InvalidPermission(format!(
                "Permission must be in format 'action:resource:scope', got: '{}'",
                permission_str.escape_default()
            )));
        }

        Self::try_new(parts[1].trim(), parts[0].trim(), parts[2].trim())
    }

    fn triple(&self) -> (&str, &str, &str) {
        (&self.resource, &self.action, &self.scope)
    }
}

impl std::fmt::Debug for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Permission")
            .field("resource", &self.resource)
            .field("action", &self.action)
            .field("scope", &self.scope)
            .field("has_description", &self.description.is_some())
            .finish()
    }
}

impl PartialEq for Permission {
    fn eq(&self, other: &Self) -> bool {
        self.triple() == other.triple()
    }
}

impl Eq for Permission {}

impl std::hash::Hash for Permission {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.resource.hash(state);
        self.action.hash(state);
        self.scope.hash(state);
    }
}

impl PartialOrd for Permission {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Permission {
    fn cmp(&self, other: &Self) -> Ordering {
        self.triple().cmp(&other.triple())
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.action, self.resource, self.scope)
    }
}

impl std::str::FromStr for Permission {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// An ordered collection of permissions belonging to one role.
///
/// The set keeps insertion order and does not deduplicate on insert, so that
/// a role carrying the same triple twice can be reported instead of being
/// silently repaired.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PermissionSet {
    permissions: Vec<Permission>,
}

impl PermissionSet {
    /// Create a new empty permission set.
    pub fn new() -> Self {
        Self {
            permissions: Vec::new(),
        }
    }

    /// Add a permission to the set.
    pub fn add(&mut self, permission: Permission) {
        self.permissions.push(permission);
    }

    /// Remove every entry matching the permission's triple.
    pub fn remove(&mut self, permission: &Permission) {
        self.permissions.retain(|p| p != permission);
    }

    /// Check if the set contains a specific permission.
    pub fn contains(&self, permission: &Permission) -> bool {
        self.permissions.contains(permission)
    }

    /// Get all permissions in the set.
    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    /// Iterate over the permissions in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Permission> {
        self.permissions.iter()
    }

    /// Get the number of permissions in the set.
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Check if the permission set is empty.
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    /// Return the first permission whose triple occurs more than once.
    pub fn first_duplicate(&self) -> Option<&Permission> {
        let mut seen = HashSet::with_capacity(self.permissions.len());
        self.permissions.iter().find(|p| !seen.insert(*p))
    }
}

impl From<Vec<Permission>> for PermissionSet {
    fn from(permissions: Vec<Permission>) -> Self {
        Self { permissions }
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self {
            permissions: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for PermissionSet {
    type Item = Permission;
    type IntoIter = std::vec::IntoIter<Permission>;

    fn into_iter(self) -> Self::IntoIter {
        self.permissions.into_iter()
    }
}

impl<'a> IntoIterator for &'a PermissionSet {
    type Item = &'a Permission;
    type IntoIter = std::slice::Iter<'a, Permission>;

    fn into_iter(self) -> Self::IntoIter {
        self.permissions.iter()
    }
}
