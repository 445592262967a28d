//! Shared, unique and missing permission subsets.

use crate::{
    error::{Error, Result},
    matrix::{MatrixRow, PermissionMatrix},
    permission::Permission,
    role::Role,
};
use std::collections::{BTreeMap, BTreeSet};

/// The kind of inconsistency found between similar permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ConflictKind {
    /// The same resource and action are granted at different scopes.
    ScopeMismatch,
    /// The same triple is described differently by different roles.
    DescriptionMismatch,
}

/// How one role holds a conflicting permission.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ConflictVariant {
    /// Role holding the permission.
    pub role_id: String,
    /// Scope the role holds it at.
    pub scope: String,
    /// Description the role attaches to it.
    pub description: Option<String>,
}

/// An inconsistency between permissions sharing a resource and action.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PermissionConflict {
    /// What kind of inconsistency this is.
    pub kind: ConflictKind,
    /// Resource of the conflicting permissions.
    pub resource: String,
    /// Action of the conflicting permissions.
    pub action: String,
    /// Every role-level occurrence involved in the conflict.
    pub variants: Vec<ConflictVariant>,
}

/// Set-theoretic differences between the selected roles.
///
/// `shared` holds permissions present in every role. `unique[r]` holds
/// permissions present in role `r` only. `missing[r]` holds permissions some
/// other role has and `r` lacks. Every role has an entry in both maps.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PermissionDifferences {
    shared: Vec<Permission>,
    unique: BTreeMap<String, Vec<Permission>>,
    missing: BTreeMap<String, Vec<Permission>>,
    conflicts: Vec<PermissionConflict>,
}

impl PermissionDifferences {
    /// Derive the differences from the matrix.
    ///
    /// `roles` must be the selection the matrix was built from; it is only
    /// consulted for conflict detection.
    pub fn calculate(
        roles: &[Role],
        matrix: &PermissionMatrix,
        detect_conflicts: bool,
    ) -> Result<Self> {
        if roles.len() != matrix.role_count() {
            return Err(Error::Analysis {
                message: format!(
                    "matrix covers {} roles but {} were supplied",
                    matrix.role_count(),
                    roles.len()
                ),
                source: None,
            });
        }
        for role in roles {
            if matrix.role_index(role.id()).is_none() {
                return Err(Error::UnknownRole(role.id().to_string()));
            }
        }

        let role_ids = matrix.role_ids();
        let total = matrix.role_count();
        let mut shared = Vec::new();
        let mut unique: BTreeMap<String, Vec<Permission>> =
            role_ids.iter().map(|id| (id.clone(), Vec::new())).collect();
        let mut missing = unique.clone();

        for row in matrix.rows() {
            let holders = row.holders();
            if holders == total {
                shared.push(row.permission().clone());
                continue;
            }

            for (role_idx, present) in row.presence().iter().enumerate() {
                let role_id = &role_ids[role_idx];
                if *present {
                    if holders == 1 {
                        unique
                            .entry(role_id.clone())
                            .or_default()
                            .push(row.permission().clone());
                    }
                } else {
                    missing
                        .entry(role_id.clone())
                        .or_default()
                        .push(row.permission().clone());
                }
            }
        }

        let conflicts = if detect_conflicts {
            let mut conflicts = scope_conflicts(matrix);
            conflicts.extend(description_conflicts(roles));
            conflicts
        } else {
            Vec::new()
        };

        Ok(Self {
            shared,
            unique,
            missing,
            conflicts,
        })
    }

    /// Permissions held by every selected role.
    pub fn shared(&self) -> &[Permission] {
        &self.shared
    }

    /// Role-unique permissions keyed by role id.
    pub fn unique(&self) -> &BTreeMap<String, Vec<Permission>> {
        &self.unique
    }

    /// Missing permissions keyed by role id.
    pub fn missing(&self) -> &BTreeMap<String, Vec<Permission>> {
        &self.missing
    }

    /// Permissions only this role holds.
    pub fn unique_for(&self, role_id: &str) -> Option<&[Permission]> {
        self.unique.get(role_id).map(Vec::as_slice)
    }

    /// Permissions other roles hold and this role lacks.
    pub fn missing_for(&self, role_id: &str) -> Option<&[Permission]> {
        self.missing.get(role_id).map(Vec::as_slice)
    }

    /// Total number of role-unique permissions across all roles.
    pub fn unique_count(&self) -> usize {
        self.unique.values().map(Vec::len).sum()
    }

    /// Detected conflicts; empty when detection is disabled.
    pub fn conflicts(&self) -> &[PermissionConflict] {
        &self.conflicts
    }
}

fn scope_conflicts(matrix: &PermissionMatrix) -> Vec<PermissionConflict> {
    let mut groups: BTreeMap<(&str, &str), Vec<usize>> = BTreeMap::new();
    for (row_idx, row) in matrix.rows().iter().enumerate() {
        let permission = row.permission();
        groups
            .entry((permission.resource(), permission.action()))
            .or_default()
            .push(row_idx);
    }

    let rows = matrix.rows();
    let role_ids = matrix.role_ids();
    groups
        .into_iter()
        .filter(|(_, row_indices)| row_indices.len() > 1 && roles_disagree(rows, row_indices))
        .map(|((resource, action), row_indices)| {
            let variants = row_indices
                .iter()
                .flat_map(|&row_idx| {
                    let row = &rows[row_idx];
                    row.presence()
                        .iter()
                        .enumerate()
                        .filter(|(_, present)| **present)
                        .map(move |(role_idx, _)| ConflictVariant {
                            role_id: role_ids[role_idx].clone(),
                            scope: row.permission().scope().to_string(),
                            description: row.permission().description().map(str::to_string),
                        })
                })
                .collect();

            PermissionConflict {
                kind: ConflictKind::ScopeMismatch,
                resource: resource.to_string(),
                action: action.to_string(),
                variants,
            }
        })
        .collect()
}

/// Whether the roles holding a (resource, action) hold it at different
/// scope sets. Roles that do not hold it at all are ignored.
fn roles_disagree(rows: &[MatrixRow], row_indices: &[usize]) -> bool {
    let role_count = row_indices
        .first()
        .map_or(0, |&row_idx| rows[row_idx].presence().len());

    let mut held = (0..role_count)
        .map(|role_idx| {
            row_indices
                .iter()
                .filter(|&&row_idx| rows[row_idx].is_held_by(role_idx))
                .map(|&row_idx| rows[row_idx].permission().scope())
                .collect::<BTreeSet<&str>>()
        })
        .filter(|scopes| !scopes.is_empty());

    match held.next() {
        Some(first) => held.any(|scopes| scopes != first),
        None => false,
    }
}

fn description_conflicts(roles: &[Role]) -> Vec<PermissionConflict> {
    let mut described: BTreeMap<&Permission, Vec<(&str, &str)>> = BTreeMap::new();
    for role in roles {
        for permission in role.permissions() {
            if let Some(description) = permission.description()
                && !description.trim().is_empty()
            {
                described
                    .entry(permission)
                    .or_default()
                    .push((role.id(), description));
            }
        }
    }

    described
        .into_iter()
        .filter(|(_, occurrences)| {
            occurrences
                .iter()
                .any(|(_, description)| *description != occurrences[0].1)
        })
        .map(|(permission, occurrences)| PermissionConflict {
            kind: ConflictKind::DescriptionMismatch,
            resource: permission.resource().to_string(),
            action: permission.action().to_string(),
            variants: occurrences
                .into_iter()
                .map(|(role_id, description)| ConflictVariant {
                    role_id: role_id.to_string(),
                    scope: permission.scope().to_string(),
                    description: Some(description.to_string()),
                })
                .collect(),
        })
        .collect()
}
