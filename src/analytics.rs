//! Visualization read-models derived from a comparison.
//!
//! Nothing here renders anything. These are plain structures a presentation
//! or export layer can draw or serialize directly:
//!
//! - [`VennData`] for two or three roles, with explicit member permissions
//! - [`NetworkGraph`] of roles, categories and the edges between them
//! - [`Heatmap`] of per-category coverage
//! - [`CriticalGap`] flags for categories some roles do not touch at all

use crate::{
    config::ComparisonConfig,
    matrix::PermissionMatrix,
    metrics::{ComparisonMetrics, ratio},
    permission::Permission,
    role::Role,
    statistics::StatisticalSummary,
    suggestions::ImpactLevel,
};

/// One circle of a Venn diagram.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VennSet {
    /// Role this circle stands for.
    pub role_id: String,
    /// Display name of the role.
    pub role_name: String,
    /// Size of the role's permission set.
    pub size: usize,
}

/// Permissions common to a subset of the roles.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VennIntersection {
    /// Roles whose sets are intersected, in selection order.
    pub role_ids: Vec<String>,
    /// Number of permissions common to all of them.
    pub size: usize,
    /// The common permissions themselves.
    pub permissions: Vec<Permission>,
}

/// Venn diagram data for two or three roles.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VennData {
    /// One circle per role, in selection order.
    pub sets: Vec<VennSet>,
    /// Pairwise intersections in selection order, then the three-way one.
    pub intersections: Vec<VennIntersection>,
}

impl VennData {
    /// Build Venn data; `None` unless exactly two or three roles are compared.
    pub fn build(roles: &[Role], matrix: &PermissionMatrix) -> Option<Self> {
        let n = matrix.role_count();
        if !(2..=3).contains(&n) {
            return None;
        }

        let sets = (0..n)
            .map(|idx| VennSet {
                role_id: matrix.role_ids()[idx].clone(),
                role_name: role_name(roles, &matrix.role_ids()[idx]),
                size: matrix.role_permission_count(idx),
            })
            .collect();

        let mut subsets: Vec<Vec<usize>> = Vec::new();
        for a in 0..n {
            for b in a + 1..n {
                subsets.push(vec![a, b]);
            }
        }
        if n == 3 {
            subsets.push(vec![0, 1, 2]);
        }

        let intersections = subsets
            .into_iter()
            .map(|members| {
                let permissions: Vec<Permission> = matrix
                    .rows()
                    .iter()
                    .filter(|row| members.iter().all(|&idx| row.is_held_by(idx)))
                    .map(|row| row.permission().clone())
                    .collect();
                VennIntersection {
                    role_ids: members
                        .iter()
                        .map(|&idx| matrix.role_ids()[idx].clone())
                        .collect(),
                    size: permissions.len(),
                    permissions,
                }
            })
            .collect();

        Some(Self {
            sets,
            intersections,
        })
    }

    /// Intersection for an exact set of role ids, in any order.
    pub fn intersection(&self, role_ids: &[&str]) -> Option<&VennIntersection> {
        self.intersections.iter().find(|i| {
            i.role_ids.len() == role_ids.len()
                && role_ids.iter().all(|id| i.role_ids.iter().any(|r| r == id))
        })
    }
}

/// What a network node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NodeKind {
    Role,
    Category,
}

/// What a network edge stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EdgeKind {
    /// Two roles whose similarity exceeds the edge threshold.
    Similarity,
    /// A role holding at least one permission in a category.
    HasPermission,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NetworkNode {
    /// `role:<id>` or `category:<name>`.
    pub id: String,
    /// Role name or category name.
    pub label: String,
    /// Whether the node is a role or a category.
    pub kind: NodeKind,
    /// Display size, clamped to the configured range.
    pub size: f64,
    /// System role tag, "custom", or "category".
    pub group: String,
    /// Palette color, when configured.
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NetworkEdge {
    /// Id of the role node the edge starts at.
    pub source: String,
    /// Id of the role or category node the edge ends at.
    pub target: String,
    /// What the edge stands for.
    pub kind: EdgeKind,
    /// Jaccard similarity, or the role's share of the category.
    pub weight: f64,
}

/// Role-similarity and role-category graph.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NetworkGraph {
    /// Role nodes in selection order, then category nodes by name.
    pub nodes: Vec<NetworkNode>,
    /// Similarity edges in canonical pair order, then has-permission edges.
    pub edges: Vec<NetworkEdge>,
}

impl NetworkGraph {
    /// Build the graph from the matrix and pairwise metrics.
    pub fn build(
        roles: &[Role],
        matrix: &PermissionMatrix,
        metrics: &ComparisonMetrics,
        config: &ComparisonConfig,
    ) -> Self {
        let mut nodes = Vec::new();
        let mut edges = Vec::new();

        for (idx, role_id) in matrix.role_ids().iter().enumerate() {
            let role = roles.iter().find(|r| r.id() == role_id);
            let tag = role.and_then(|r| r.system_role_tag());
            nodes.push(NetworkNode {
                id: role_node_id(role_id),
                label: role.map_or_else(|| role_id.clone(), |r| r.name().to_string()),
                kind: NodeKind::Role,
                size: config
                    .role_node_sizing
                    .size_for(matrix.role_permission_count(idx)),
                group: tag.unwrap_or("custom").to_string(),
                color: config.color_for(tag).map(str::to_string),
            });
        }

        for (category, permissions) in matrix.categories() {
            nodes.push(NetworkNode {
                id: category_node_id(category),
                label: category.clone(),
                kind: NodeKind::Category,
                size: config.category_node_sizing.size_for(permissions.len()),
                group: "category".to_string(),
                color: None,
            });
        }

        for pair in &metrics.pairs {
            if pair.jaccard > config.similarity_edge_threshold {
                edges.push(NetworkEdge {
                    source: role_node_id(&pair.role_a),
                    target: role_node_id(&pair.role_b),
                    kind: EdgeKind::Similarity,
                    weight: pair.jaccard,
                });
            }
        }

        for (idx, role_id) in matrix.role_ids().iter().enumerate() {
            for (category, permissions) in matrix.categories() {
                let held = matrix.category_count_for_role(category, idx);
                if held > 0 {
                    edges.push(NetworkEdge {
                        source: role_node_id(role_id),
                        target: category_node_id(category),
                        kind: EdgeKind::HasPermission,
                        weight: ratio(held, permissions.len()),
                    });
                }
            }
        }

        Self { nodes, edges }
    }

    /// Edges of the given kind.
    pub fn edges_of(&self, kind: EdgeKind) -> impl Iterator<Item = &NetworkEdge> {
        self.edges.iter().filter(move |edge| edge.kind == kind)
    }
}

fn role_node_id(role_id: &str) -> String {
    format!("role:{role_id}")
}

fn category_node_id(category: &str) -> String {
    format!("category:{category}")
}

fn role_name(roles: &[Role], role_id: &str) -> String {
    roles
        .iter()
        .find(|r| r.id() == role_id)
        .map_or_else(|| role_id.to_string(), |r| r.name().to_string())
}

/// Category coverage per role, each cell in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Heatmap {
    /// Role names, in selection order. Names need not be unique.
    pub rows: Vec<String>,
    /// Role ids, aligned with `rows`.
    pub row_ids: Vec<String>,
    /// Category names, sorted.
    pub columns: Vec<String>,
    /// `values[row][column]`.
    pub values: Vec<Vec<f64>>,
}

impl Heatmap {
    /// Build the heatmap from the matrix.
    pub fn build(roles: &[Role], matrix: &PermissionMatrix) -> Self {
        let columns: Vec<String> = matrix.categories().keys().cloned().collect();
        let row_ids = matrix.role_ids().to_vec();
        let rows = matrix
            .role_ids()
            .iter()
            .map(|id| role_name(roles, id))
            .collect();
        let values = (0..matrix.role_count())
            .map(|idx| {
                matrix
                    .categories()
                    .iter()
                    .map(|(category, permissions)| {
                        ratio(
                            matrix.category_count_for_role(category, idx),
                            permissions.len(),
                        )
                    })
                    .collect()
            })
            .collect();

        Self {
            rows,
            row_ids,
            columns,
            values,
        }
    }

    /// Cell value by role id and category name.
    pub fn value(&self, role_id: &str, column: &str) -> Option<f64> {
        let r = self.row_ids.iter().position(|id| id == role_id)?;
        let c = self.columns.iter().position(|name| name == column)?;
        Some(self.values[r][c])
    }
}

/// A category at least one selected role has no permission in.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CriticalGap {
    /// Category (resource) name.
    pub category: String,
    /// Whether the category is configured as business-critical.
    pub is_critical: bool,
    /// Roles with zero permissions in the category.
    pub roles_missing: Vec<String>,
    /// High when critical with a majority missing, medium when only one of those holds.
    pub impact: ImpactLevel,
}

/// Flag every category of the union that some role does not touch.
pub fn detect_critical_gaps(
    matrix: &PermissionMatrix,
    config: &ComparisonConfig,
) -> Vec<CriticalGap> {
    let role_count = matrix.role_count();
    matrix
        .categories()
        .keys()
        .filter_map(|category| {
            let roles_missing: Vec<String> = matrix
                .role_ids()
                .iter()
                .enumerate()
                .filter(|(idx, _)| matrix.category_count_for_role(category, *idx) == 0)
                .map(|(_, id)| id.clone())
                .collect();
            if roles_missing.is_empty() {
                return None;
            }

            let is_critical = config.is_critical(category);
            let majority_missing = roles_missing.len() * 2 > role_count;
            let impact = match (is_critical, majority_missing) {
                (true, true) => ImpactLevel::High,
                (true, false) | (false, true) => ImpactLevel::Medium,
                (false, false) => ImpactLevel::Low,
            };

            Some(CriticalGap {
                category: category.clone(),
                is_critical,
                roles_missing,
                impact,
            })
        })
        .collect()
}

/// All visualization read-models for one comparison.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ComparisonAnalytics {
    /// Present only for two or three roles.
    pub venn: Option<VennData>,
    pub network: NetworkGraph,
    pub heatmap: Heatmap,
    pub statistics: StatisticalSummary,
    /// Categories some role has no permission in, ordered by name.
    pub critical_gaps: Vec<CriticalGap>,
}

impl ComparisonAnalytics {
    /// Derive every read-model.
    pub fn build(
        roles: &[Role],
        matrix: &PermissionMatrix,
        metrics: &ComparisonMetrics,
        config: &ComparisonConfig,
    ) -> Self {
        Self {
            venn: VennData::build(roles, matrix),
            network: NetworkGraph::build(roles, matrix, metrics, config),
            heatmap: Heatmap::build(roles, matrix),
            statistics: StatisticalSummary::calculate(matrix),
            critical_gaps: detect_critical_gaps(matrix, config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::differences::PermissionDifferences;

    fn perm(resource: &str, action: &str) -> Permission {
        Permission::new(resource, action, "property")
    }

    fn analytics_for(roles: &[Role], config: &ComparisonConfig) -> ComparisonAnalytics {
        let matrix = PermissionMatrix::build(roles).unwrap();
        let differences = PermissionDifferences::calculate(roles, &matrix, false).unwrap();
        let metrics = ComparisonMetrics::calculate(&matrix, &differences, config).unwrap();
        ComparisonAnalytics::build(roles, &matrix, &metrics, config)
    }

    fn three_roles() -> Vec<Role> {
        vec![
            Role::with_id("gm", "General Manager")
                .as_system_role("general_manager")
                .add_permission(perm("user", "read"))
                .add_permission(perm("user", "write"))
                .add_permission(perm("payroll", "read")),
            Role::with_id("fd", "Front Desk")
                .add_permission(perm("user", "read"))
                .add_permission(perm("room", "read")),
            Role::with_id("hk", "Housekeeping")
                .add_permission(perm("user", "read"))
                .add_permission(perm("room", "read")),
        ]
    }

    #[test]
    fn test_venn_for_three_roles() {
        let analytics = analytics_for(&three_roles(), &ComparisonConfig::default());
        let venn = analytics.venn.unwrap();

        assert_eq!(venn.sets.len(), 3);
        assert_eq!(venn.sets[0].role_name, "General Manager");
        assert_eq!(venn.sets[0].size, 3);
        assert_eq!(venn.intersections.len(), 4);

        let fd_hk = venn.intersection(&["hk", "fd"]).unwrap();
        assert_eq!(fd_hk.size, 2);
        let all = venn.intersection(&["gm", "fd", "hk"]).unwrap();
        assert_eq!(all.permissions, vec![perm("user", "read")]);
    }

    #[test]
    fn test_venn_absent_for_four_roles() {
        let mut roles = three_roles();
        roles.push(Role::with_id("x", "Extra"));
        let analytics = analytics_for(&roles, &ComparisonConfig::default());
        assert!(analytics.venn.is_none());
    }

    #[test]
    fn test_network_graph() {
        let config = ComparisonConfig::builder()
            .role_color("general_manager", "#123456")
            .build()
            .unwrap();
        let analytics = analytics_for(&three_roles(), &config);
        let graph = &analytics.network;

        // 3 roles + 3 categories (payroll, room, user)
        assert_eq!(graph.nodes.len(), 6);
        let gm = graph.nodes.iter().find(|n| n.id == "role:gm").unwrap();
        assert_eq!(gm.size, 16.0);
        assert_eq!(gm.group, "general_manager");
        assert_eq!(gm.color.as_deref(), Some("#123456"));

        // fd/hk are identical (1.0); gm-fd and gm-hk share 1 of 4 (0.25).
        let similarity: Vec<&NetworkEdge> = graph.edges_of(EdgeKind::Similarity).collect();
        assert_eq!(similarity.len(), 3);
        let fd_hk = similarity
            .iter()
            .find(|e| e.source == "role:fd" && e.target == "role:hk")
            .unwrap();
        assert_eq!(fd_hk.weight, 1.0);

        let gm_user = graph
            .edges_of(EdgeKind::HasPermission)
            .find(|e| e.source == "role:gm" && e.target == "category:user")
            .unwrap();
        assert_eq!(gm_user.weight, 1.0);
        let fd_user = graph
            .edges_of(EdgeKind::HasPermission)
            .find(|e| e.source == "role:fd" && e.target == "category:user")
            .unwrap();
        assert_eq!(fd_user.weight, 0.5);
    }

    #[test]
    fn test_similarity_edge_threshold_is_exclusive() {
        let roles = vec![
            Role::with_id("a", "A")
                .add_permission(perm("user", "read"))
                .add_permission(perm("user", "write"))
                .add_permission(perm("user", "delete"))
                .add_permission(perm("user", "create")),
            Role::with_id("b", "B")
                .add_permission(perm("user", "read"))
                .add_permission(perm("room", "read"))
                .add_permission(perm("room", "write"))
                .add_permission(perm("room", "delete"))
                .add_permission(perm("room", "create"))
                .add_permission(perm("room", "clean"))
                .add_permission(perm("room", "inspect")),
        ];
        // Jaccard = 1 / 10 = 0.1, not above the threshold.
        let analytics = analytics_for(&roles, &ComparisonConfig::default());
        assert_eq!(analytics.network.edges_of(EdgeKind::Similarity).count(), 0);
    }

    #[test]
    fn test_heatmap() {
        let analytics = analytics_for(&three_roles(), &ComparisonConfig::default());
        let heatmap = &analytics.heatmap;

        assert_eq!(heatmap.columns, vec!["payroll", "room", "user"]);
        assert_eq!(heatmap.rows[1], "Front Desk");
        assert_eq!(heatmap.row_ids, vec!["gm", "fd", "hk"]);
        assert_eq!(heatmap.value("gm", "user"), Some(1.0));
        assert_eq!(heatmap.value("fd", "user"), Some(0.5));
        assert_eq!(heatmap.value("fd", "payroll"), Some(0.0));
        assert_eq!(heatmap.value("ghost", "user"), None);
        assert!(
            heatmap
                .values
                .iter()
                .flatten()
                .all(|v| (0.0..=1.0).contains(v))
        );
    }

    #[test]
    fn test_heatmap_rows_with_duplicate_names() {
        let roles = vec![
            Role::with_id("day", "Receptionist").add_permission(perm("room", "read")),
            Role::with_id("night", "Receptionist").add_permission(perm("payroll", "read")),
        ];
        let analytics = analytics_for(&roles, &ComparisonConfig::default());
        let heatmap = &analytics.heatmap;

        assert_eq!(heatmap.rows, vec!["Receptionist", "Receptionist"]);
        assert_eq!(heatmap.value("day", "payroll"), Some(0.0));
        assert_eq!(heatmap.value("night", "payroll"), Some(1.0));
    }

    #[test]
    fn test_critical_gaps() {
        let analytics = analytics_for(&three_roles(), &ComparisonConfig::default());
        let gaps = &analytics.critical_gaps;

        // payroll: critical, 2 of 3 missing -> high
        let payroll = gaps.iter().find(|g| g.category == "payroll").unwrap();
        assert!(payroll.is_critical);
        assert_eq!(payroll.roles_missing, vec!["fd", "hk"]);
        assert_eq!(payroll.impact, ImpactLevel::High);

        // room: not critical, 1 of 3 missing -> low
        let room = gaps.iter().find(|g| g.category == "room").unwrap();
        assert_eq!(room.impact, ImpactLevel::Low);

        // user: everyone has it
        assert!(gaps.iter().all(|g| g.category != "user"));
    }

    #[test]
    fn test_critical_gaps_medium_impact() {
        let roles = vec![
            Role::with_id("a", "A").add_permission(perm("payroll", "read")),
            Role::with_id("b", "B").add_permission(perm("payroll", "read")),
            Role::with_id("c", "C").add_permission(perm("room", "read")),
        ];
        let analytics = analytics_for(&roles, &ComparisonConfig::default());
        let gaps = &analytics.critical_gaps;

        // payroll: critical, only c missing
        let payroll = gaps.iter().find(|g| g.category == "payroll").unwrap();
        assert!(payroll.is_critical);
        assert_eq!(payroll.roles_missing, vec!["c"]);
        assert_eq!(payroll.impact, ImpactLevel::Medium);

        // room: not critical, a and b missing
        let room = gaps.iter().find(|g| g.category == "room").unwrap();
        assert!(!room.is_critical);
        assert_eq!(room.roles_missing, vec!["a", "b"]);
        assert_eq!(room.impact, ImpactLevel::Medium);
    }
}
