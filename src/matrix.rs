//! Role × permission presence matrix.
//!
//! The matrix is the first stage of every comparison. It collects the union
//! of permission triples held by the selected roles and records, for every
//! role and every permission in that union, whether the role holds it. The
//! presence map is total: a role lacking a permission has an explicit `false`
//! entry, so downstream stages never have to distinguish "absent" from "no".
//!
//! Permissions are also grouped into categories keyed by their resource.

use crate::{
    error::{Error, Result},
    permission::Permission,
    role::Role,
};
use std::collections::{BTreeMap, HashMap};

/// One permission of the union together with its presence across roles.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MatrixRow {
    permission: Permission,
    /// Presence per role, aligned with [`PermissionMatrix::role_ids`].
    presence: Vec<bool>,
}

impl MatrixRow {
    /// The permission this row describes.
    pub fn permission(&self) -> &Permission {
        &self.permission
    }

    /// Presence flags aligned with the matrix role order.
    pub fn presence(&self) -> &[bool] {
        &self.presence
    }

    /// Number of roles holding this permission.
    pub fn holders(&self) -> usize {
        self.presence.iter().filter(|present| **present).count()
    }

    /// Whether the role at `role_index` holds this permission.
    pub fn is_held_by(&self, role_index: usize) -> bool {
        self.presence.get(role_index).copied().unwrap_or(false)
    }
}

/// Dense presence matrix over the union of the selected roles' permissions.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PermissionMatrix {
    role_ids: Vec<String>,
    rows: Vec<MatrixRow>,
    categories: BTreeMap<String, Vec<Permission>>,
    #[cfg_attr(feature = "serde", serde(skip))]
    permission_index: HashMap<Permission, usize>,
    #[cfg_attr(feature = "serde", serde(skip))]
    role_index: HashMap<String, usize>,
}

impl PermissionMatrix {
    /// Build the matrix for an ordered selection of at least two roles.
    ///
    /// Every role is validated first. A selection with fewer than two roles,
    /// a repeated role id, a duplicated permission triple or a malformed
    /// triple is rejected before anything is computed.
    pub fn build(roles: &[Role]) -> Result<Self> {
        if roles.len() < 2 {
            return Err(Error::InsufficientRoles { found: roles.len() });
        }

        let mut role_index = HashMap::with_capacity(roles.len());
        for (index, role) in roles.iter().enumerate() {
            role.validate()?;
            if role_index.insert(role.id().to_string(), index).is_some() {
                return Err(Error::DuplicateRole(role.id().to_string()));
            }
        }

        let role_count = roles.len();
        let mut rows: Vec<MatrixRow> = Vec::new();
        let mut permission_index: HashMap<Permission, usize> = HashMap::new();

        for (role_idx, role) in roles.iter().enumerate() {
            for permission in role.permissions() {
                let row_idx = match permission_index.get(permission).copied() {
                    Some(row_idx) => {
                        // Last description seen wins.
                        if permission.description().is_some() {
                            rows[row_idx].permission = permission.clone();
                        }
                        row_idx
                    }
                    None => {
                        rows.push(MatrixRow {
                            permission: permission.clone(),
                            presence: vec![false; role_count],
                        });
                        permission_index.insert(permission.clone(), rows.len() - 1);
                        rows.len() - 1
                    }
                };
                rows[row_idx].presence[role_idx] = true;
            }
        }

        let mut categories: BTreeMap<String, Vec<Permission>> = BTreeMap::new();
        for row in &rows {
            categories
                .entry(row.permission.resource().to_string())
                .or_default()
                .push(row.permission.clone());
        }

        Ok(Self {
            role_ids: roles.iter().map(|r| r.id().to_string()).collect(),
            rows,
            categories,
            permission_index,
            role_index,
        })
    }

    /// Role ids in selection order.
    pub fn role_ids(&self) -> &[String] {
        &self.role_ids
    }

    /// Number of roles in the matrix.
    pub fn role_count(&self) -> usize {
        self.role_ids.len()
    }

    /// Position of a role in the selection.
    pub fn role_index(&self, role_id: &str) -> Option<usize> {
        self.role_index.get(role_id).copied()
    }

    /// All rows, in first-seen order.
    pub fn rows(&self) -> &[MatrixRow] {
        &self.rows
    }

    /// The permission union, in first-seen order.
    pub fn permissions(&self) -> impl Iterator<Item = &Permission> {
        self.rows.iter().map(|row| &row.permission)
    }

    /// Number of distinct permissions in the union.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no role holds any permission.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Permissions grouped by resource.
    pub fn categories(&self) -> &BTreeMap<String, Vec<Permission>> {
        &self.categories
    }

    /// Presence flags for a permission, aligned with [`Self::role_ids`].
    pub fn presence(&self, permission: &Permission) -> Option<&[bool]> {
        self.permission_index
            .get(permission)
            .map(|&idx| self.rows[idx].presence())
    }

    /// Whether the given role holds the permission.
    ///
    /// Returns `None` only when the role is not part of the selection or the
    /// permission is outside the union.
    pub fn has(&self, permission: &Permission, role_id: &str) -> Option<bool> {
        let role_idx = self.role_index(role_id)?;
        self.presence(permission).map(|presence| presence[role_idx])
    }

    /// Permissions held by the role at `role_idx`.
    pub fn permissions_of(&self, role_idx: usize) -> impl Iterator<Item = &Permission> {
        self.rows
            .iter()
            .filter(move |row| row.is_held_by(role_idx))
            .map(|row| &row.permission)
    }

    /// Number of permissions held by the role at `role_idx`.
    pub fn role_permission_count(&self, role_idx: usize) -> usize {
        self.rows.iter().filter(|row| row.is_held_by(role_idx)).count()
    }

    /// Permission counts per role, aligned with [`Self::role_ids`].
    pub fn role_permission_counts(&self) -> Vec<usize> {
        (0..self.role_count())
            .map(|idx| self.role_permission_count(idx))
            .collect()
    }

    /// Number of permissions the role at `role_idx` holds in a category.
    pub fn category_count_for_role(&self, category: &str, role_idx: usize) -> usize {
        self.rows
            .iter()
            .filter(|row| row.permission.resource() == category && row.is_held_by(role_idx))
            .count()
    }
}
