//! Role definitions used as comparison subjects.

use crate::{
    error::{Error, Result},
    permission::{Permission, PermissionSet},
};
use uuid::Uuid;

/// A named bundle of permissions, as supplied by the role source.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Role {
    /// Unique identifier for the role.
    id: String,
    /// Human-readable name of the role.
    name: String,
    /// Optional description of the role.
    #[cfg_attr(feature = "serde", serde(default))]
    description: Option<String>,
    /// Whether this is a built-in role rather than a tenant-defined one.
    #[cfg_attr(feature = "serde", serde(default))]
    is_system_role: bool,
    /// Tag naming the built-in role this is (e.g. "hotel_manager").
    #[cfg_attr(feature = "serde", serde(default))]
    system_role_tag: Option<String>,
    /// Permissions granted by this role.
    #[cfg_attr(feature = "serde", serde(default))]
    permissions: PermissionSet,
    /// Number of users holding the role, when known.
    #[cfg_attr(feature = "serde", serde(default))]
    user_count: Option<u64>,
}

impl Role {
    /// Create a new custom role with the given name and a generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: None,
            is_system_role: false,
            system_role_tag: None,
            permissions: PermissionSet::new(),
            user_count: None,
        }
    }

    /// Create a new role with a specific ID.
    pub fn with_id(id: impl Into<String>, name: impl Into<String>) -> Self {
        let mut role = Self::new(name);
        role.id = id.into();
        role
    }

    /// Get the role's unique identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the role's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the role's description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Get the role's description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Mark this role as a built-in system role carrying the given tag.
    pub fn as_system_role(mut self, tag: impl Into<String>) -> Self {
        self.is_system_role = true;
        self.system_role_tag = Some(tag.into());
        self
    }

    /// Whether this is a built-in role.
    pub fn is_system_role(&self) -> bool {
        self.is_system_role
    }

    /// Tag of the built-in role, if any.
    pub fn system_role_tag(&self) -> Option<&str> {
        self.system_role_tag.as_deref()
    }

    /// Record how many users hold this role.
    pub fn with_user_count(mut self, user_count: u64) -> Self {
        self.user_count = Some(user_count);
        self
    }

    /// Number of users holding this role, when known.
    pub fn user_count(&self) -> Option<u64> {
        self.user_count
    }

    /// Add a permission to this role.
    pub fn add_permission(mut self, permission: Permission) -> Self {
        self.permissions.add(permission);
        self
    }

    /// Add multiple permissions to this role.
    pub fn add_permissions(mut self, permissions: impl IntoIterator<Item = Permission>) -> Self {
        for permission in permissions {
            self.permissions.add(permission);
        }
        self
    }

    /// Remove a permission from this role.
    pub fn remove_permission(&mut self, permission: &Permission) {
        self.permissions.remove(permission);
    }

    /// Check if this role grants the exact permission triple.
    pub fn has_permission(&self, permission: &Permission) -> bool {
        self.permissions.contains(permission)
    }

    /// Get all permissions granted by this role.
    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    /// Check that the role is well formed: a non-blank id, valid permission
    /// triples, and no triple listed twice.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::InvalidConfiguration(format!(
                "Role '{}' has an empty id",
                self.name
            )));
        }

        for permission in &self.permissions {
            permission.validate()?;
        }

        if let Some(duplicate) = self.permissions.first_duplicate() {
            return Err(Error::DuplicatePermission {
                role_id: self.id.clone(),
                permission: duplicate.to_string(),
            });
        }

        Ok(())
    }
}

/// Builder for creating roles with a fluent API.
#[derive(Debug, Default)]
pub struct RoleBuilder {
    id: Option<String>,
    name: Option<String>,
    description: Option<String>,
    system_role_tag: Option<String>,
    permissions: Vec<Permission>,
    user_count: Option<u64>,
}

impl RoleBuilder {
    /// Create a new role builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the role id. A UUID is generated when none is given.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the role name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the role description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark the role as a system role with the given tag.
    pub fn system_role(mut self, tag: impl Into<String>) -> Self {
        self.system_role_tag = Some(tag.into());
        self
    }

    /// Add a permission to the role.
    pub fn permission(mut self, permission: Permission) -> Self {
        self.permissions.push(permission);
        self
    }

    /// Add multiple permissions to the role.
    pub fn permissions(mut self, permissions: impl IntoIterator<Item = Permission>) -> Self {
        self.permissions.extend(permissions);
        self
    }

    /// Set the number of users holding the role.
    pub fn user_count(mut self, user_count: u64) -> Self {
        self.user_count = Some(user_count);
        self
    }

    /// Build and validate the role.
    pub fn build(self) -> Result<Role> {
        let name = self
            .name
            .ok_or_else(|| Error::InvalidConfiguration("Role name is required".to_string()))?;

        let mut role = match self.id {
            Some(id) => Role::with_id(id, name),
            None => Role::new(name),
        };

        if let Some(description) = self.description {
            role = role.with_description(description);
        }
        if let Some(tag) = self.system_role_tag {
            role = role.as_system_role(tag);
        }
        if let Some(user_count) = self.user_count {
            role = role.with_user_count(user_count);
        }

        role = role.add_permissions(self.permissions);
        role.validate()?;

        Ok(role)
    }
}
