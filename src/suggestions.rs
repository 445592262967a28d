//! Ranked improvement suggestions.
//!
//! Suggestions are a pure function of the metrics and analytics. The list is
//! sorted by ascending priority (1 is most urgent); suggestions with equal
//! priority keep the order they were generated in.

use crate::{
    analytics::CriticalGap,
    config::ComparisonConfig,
    matrix::PermissionMatrix,
    metrics::ComparisonMetrics,
    role::Role,
};

/// Expected impact of acting on a suggestion or gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
}

/// Expected effort of acting on a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EffortLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SuggestionType {
    Consolidation,
    Gap,
    Optimization,
    Hierarchy,
    Migration,
}

/// A recommendation derived from a comparison.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Suggestion {
    /// Stable identifier, unique within one comparison.
    pub id: String,
    pub kind: SuggestionType,
    pub title: String,
    pub description: String,
    pub impact: ImpactLevel,
    pub effort: EffortLevel,
    pub affected_roles: Vec<String>,
    /// Ordered checklist.
    pub action_items: Vec<String>,
    /// Lower is more urgent.
    pub priority: u8,
}

fn items(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Generate suggestions for a finished comparison.
pub fn generate_suggestions(
    roles: &[Role],
    matrix: &PermissionMatrix,
    metrics: &ComparisonMetrics,
    critical_gaps: &[CriticalGap],
    config: &ComparisonConfig,
) -> Vec<Suggestion> {
    let all_roles: Vec<String> = matrix.role_ids().to_vec();
    let mut suggestions = Vec::new();

    if metrics.similarity_score > config.consolidation_threshold {
        suggestions.push(Suggestion {
            id: "consolidation".to_string(),
            kind: SuggestionType::Consolidation,
            title: "Consider role consolidation".to_string(),
            description: format!(
                "These roles are {:.0}% similar on average. Merging them would simplify administration.",
                metrics.similarity_score * 100.0
            ),
            impact: ImpactLevel::Medium,
            effort: EffortLevel::Medium,
            affected_roles: all_roles.clone(),
            action_items: items(&[
                "Review the shared permissions",
                "Identify which unique permissions are still needed",
                "Create a consolidated role",
                "Migrate users to the consolidated role",
                "Retire the redundant roles",
            ]),
            priority: 3,
        });
    }

    if metrics.coverage_gap > config.coverage_gap_threshold {
        suggestions.push(Suggestion {
            id: "coverage-gap".to_string(),
            kind: SuggestionType::Gap,
            title: "Significant permission gaps".to_string(),
            description: format!(
                "{:.0}% of the compared permissions are not shared by every role.",
                metrics.coverage_gap * 100.0
            ),
            impact: ImpactLevel::High,
            effort: EffortLevel::High,
            affected_roles: all_roles.clone(),
            action_items: items(&[
                "Review the missing permissions of each role",
                "Confirm which gaps are intentional",
                "Grant permissions required for day-to-day work",
                "Document the intended differences between roles",
            ]),
            priority: 1,
        });
    }

    if metrics.similarity_score < config.differentiation_threshold {
        suggestions.push(Suggestion {
            id: "well-differentiated".to_string(),
            kind: SuggestionType::Optimization,
            title: "Roles are well differentiated".to_string(),
            description: format!(
                "Average similarity is {:.0}%. The roles have clearly separated responsibilities.",
                metrics.similarity_score * 100.0
            ),
            impact: ImpactLevel::Low,
            effort: EffortLevel::Low,
            affected_roles: all_roles.clone(),
            action_items: items(&[
                "Keep the current role separation",
                "Review role boundaries periodically",
            ]),
            priority: 5,
        });
    }

    for gap in critical_gaps
        .iter()
        .filter(|gap| gap.is_critical && gap.impact == ImpactLevel::High)
    {
        suggestions.push(Suggestion {
            id: format!("critical-gap:{}", gap.category),
            kind: SuggestionType::Gap,
            title: format!("Critical category '{}' is not covered", gap.category),
            description: format!(
                "{} of {} roles hold no '{}' permissions.",
                gap.roles_missing.len(),
                matrix.role_count(),
                gap.category
            ),
            impact: ImpactLevel::High,
            effort: EffortLevel::Medium,
            affected_roles: gap.roles_missing.clone(),
            action_items: items(&[
                "Confirm whether these roles need access to the category",
                "Grant the minimum required permissions",
                "Record the decision for audit",
            ]),
            priority: 2,
        });
    }

    for pair in &metrics.pairs {
        let (Some(a), Some(b)) = (find_role(roles, &pair.role_a), find_role(roles, &pair.role_b))
        else {
            continue;
        };
        let (custom, system) = match (a.is_system_role(), b.is_system_role()) {
            (false, true) => (a, b),
            (true, false) => (b, a),
            _ => continue,
        };
        if pair.jaccard >= config.consolidation_threshold {
            suggestions.push(Suggestion {
                id: format!("migration:{}:{}", custom.id(), system.id()),
                kind: SuggestionType::Migration,
                title: format!("Migrate '{}' to '{}'", custom.name(), system.name()),
                description: format!(
                    "Custom role '{}' is {:.0}% similar to system role '{}'.",
                    custom.name(),
                    pair.jaccard * 100.0,
                    system.name()
                ),
                impact: ImpactLevel::Medium,
                effort: EffortLevel::Medium,
                affected_roles: vec![custom.id().to_string(), system.id().to_string()],
                action_items: items(&[
                    "Compare the custom role with the system role",
                    "Move users of the custom role to the system role",
                    "Retire the custom role",
                ]),
                priority: 3,
            });
        }
    }

    for pair in &metrics.pairs {
        let (Some(a), Some(b)) = (matrix.role_index(&pair.role_a), matrix.role_index(&pair.role_b))
        else {
            continue;
        };
        let size_a = matrix.role_permission_count(a);
        let size_b = matrix.role_permission_count(b);
        let (child, parent) = if pair.intersection == size_a && size_a > 0 && size_a < size_b {
            (&pair.role_a, &pair.role_b)
        } else if pair.intersection == size_b && size_b > 0 && size_b < size_a {
            (&pair.role_b, &pair.role_a)
        } else {
            continue;
        };

        suggestions.push(Suggestion {
            id: format!("hierarchy:{child}:{parent}"),
            kind: SuggestionType::Hierarchy,
            title: "Model roles as a hierarchy".to_string(),
            description: format!(
                "Every permission of '{}' is also held by '{}'.",
                display_name(roles, child),
                display_name(roles, parent)
            ),
            impact: ImpactLevel::Medium,
            effort: EffortLevel::Low,
            affected_roles: vec![child.clone(), parent.clone()],
            action_items: items(&[
                "Make the broader role inherit from the narrower one",
                "Remove the duplicated permissions from the broader role",
            ]),
            priority: 4,
        });
    }

    suggestions.sort_by_key(|s| s.priority);
    suggestions
}

fn find_role<'a>(roles: &'a [Role], role_id: &str) -> Option<&'a Role> {
    roles.iter().find(|r| r.id() == role_id)
}

fn display_name<'a>(roles: &'a [Role], role_id: &'a str) -> &'a str {
    find_role(roles, role_id).map_or(role_id, Role::name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        analytics::detect_critical_gaps, differences::PermissionDifferences,
        permission::Permission,
    };

    fn perm(resource: &str, action: &str) -> Permission {
        Permission::new(resource, action, "property")
    }

    fn suggestions_for(roles: &[Role]) -> Vec<Suggestion> {
        let config = ComparisonConfig::default();
        let matrix = PermissionMatrix::build(roles).unwrap();
        let differences = PermissionDifferences::calculate(roles, &matrix, false).unwrap();
        let metrics = ComparisonMetrics::calculate(&matrix, &differences, &config).unwrap();
        let gaps = detect_critical_gaps(&matrix, &config);
        generate_suggestions(roles, &matrix, &metrics, &gaps, &config)
    }

    fn identical(id: &str) -> Role {
        Role::with_id(id, id.to_uppercase())
            .add_permission(perm("user", "read"))
            .add_permission(perm("user", "write"))
    }

    #[test]
    fn test_consolidation_for_identical_roles() {
        let suggestions = suggestions_for(&[identical("a"), identical("b")]);

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].kind, SuggestionType::Consolidation);
        assert_eq!(suggestions[0].priority, 3);
        assert_eq!(suggestions[0].impact, ImpactLevel::Medium);
        assert_eq!(suggestions[0].affected_roles, vec!["a", "b"]);
        assert!(!suggestions[0].action_items.is_empty());
    }

    #[test]
    fn test_disjoint_roles_get_gap_then_differentiated() {
        let roles = vec![
            Role::with_id("a", "A").add_permission(perm("room", "read")),
            Role::with_id("b", "B").add_permission(perm("spa", "read")),
        ];
        let suggestions = suggestions_for(&roles);
        let kinds: Vec<SuggestionType> = suggestions.iter().map(|s| s.kind).collect();

        assert_eq!(
            kinds,
            vec![SuggestionType::Gap, SuggestionType::Optimization]
        );
        assert_eq!(suggestions[0].priority, 1);
        assert_eq!(suggestions[0].impact, ImpactLevel::High);
        assert_eq!(suggestions[1].priority, 5);
        assert_eq!(suggestions[1].impact, ImpactLevel::Low);
    }

    #[test]
    fn test_critical_gap_suggestion() {
        let roles = vec![
            Role::with_id("a", "A").add_permission(perm("payroll", "read")),
            Role::with_id("b", "B").add_permission(perm("room", "read")),
            Role::with_id("c", "C").add_permission(perm("room", "read")),
        ];
        let suggestions = suggestions_for(&roles);

        let critical = suggestions
            .iter()
            .find(|s| s.id == "critical-gap:payroll")
            .unwrap();
        assert_eq!(critical.priority, 2);
        assert_eq!(critical.affected_roles, vec!["b", "c"]);
        assert!(suggestions.windows(2).all(|w| w[0].priority <= w[1].priority));
    }

    #[test]
    fn test_hierarchy_suggestion_for_subset() {
        let roles = vec![
            Role::with_id("mgr", "Manager")
                .add_permission(perm("user", "read"))
                .add_permission(perm("user", "write"))
                .add_permission(perm("user", "delete")),
            Role::with_id("clerk", "Clerk").add_permission(perm("user", "read")),
        ];
        let suggestions = suggestions_for(&roles);
        let hierarchy = suggestions
            .iter()
            .find(|s| s.kind == SuggestionType::Hierarchy)
            .unwrap();

        assert_eq!(hierarchy.id, "hierarchy:clerk:mgr");
        assert_eq!(hierarchy.priority, 4);
        assert!(hierarchy.description.contains("Clerk"));
    }

    #[test]
    fn test_migration_suggestion_for_custom_copy_of_system_role() {
        let roles = vec![
            identical("fd").as_system_role("front_desk"),
            identical("fd-copy"),
        ];
        let suggestions = suggestions_for(&roles);
        let migration = suggestions
            .iter()
            .find(|s| s.kind == SuggestionType::Migration)
            .unwrap();

        assert_eq!(migration.affected_roles, vec!["fd-copy", "fd"]);
        assert_eq!(migration.id, "migration:fd-copy:fd");
    }

    #[test]
    fn test_moderate_similarity_has_no_threshold_suggestions() {
        let roles = vec![
            Role::with_id("a", "A")
                .add_permission(perm("user", "read"))
                .add_permission(perm("user", "write")),
            Role::with_id("b", "B")
                .add_permission(perm("user", "read"))
                .add_permission(perm("user", "export")),
        ];
        // similarity 1/3, coverage gap 2/3
        let suggestions = suggestions_for(&roles);
        assert!(
            suggestions
                .iter()
                .all(|s| s.kind != SuggestionType::Consolidation
                    && s.kind != SuggestionType::Optimization)
        );
        assert!(suggestions.iter().any(|s| s.id == "coverage-gap"));
    }
}
