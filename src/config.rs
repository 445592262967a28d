//! Engine configuration.

use crate::error::{Error, Result};
use std::collections::HashMap;

/// Default business-critical permission categories for hotel operations.
pub const DEFAULT_CRITICAL_CATEGORIES: [&str; 5] =
    ["user", "organization", "property", "department", "payroll"];

/// Linear node sizing with clamping, used for graph nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeSizing {
    /// Size of a node with zero permissions, before clamping.
    pub base: f64,
    /// Size added per permission.
    pub per_permission: f64,
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl NodeSizing {
    /// Size for a node carrying `count` permissions.
    pub fn size_for(&self, count: usize) -> f64 {
        (self.base + self.per_permission * count as f64).clamp(self.min, self.max)
    }
}

/// Configuration for the comparison engine.
#[derive(Debug, Clone)]
pub struct ComparisonConfig {
    /// Maximum number of roles accepted in one comparison.
    pub max_roles: Option<usize>,
    /// Minimum pairwise similarity (exclusive) for a similarity edge.
    pub similarity_edge_threshold: f64,
    /// Aggregate similarity above which consolidation is suggested.
    pub consolidation_threshold: f64,
    /// Coverage gap above which a gap suggestion is raised.
    pub coverage_gap_threshold: f64,
    /// Aggregate similarity below which roles count as well differentiated.
    pub differentiation_threshold: f64,
    /// Categories whose absence from a role is flagged as critical.
    pub critical_categories: Vec<String>,
    /// Sizing for role nodes in the network graph.
    pub role_node_sizing: NodeSizing,
    /// Sizing for category nodes in the network graph.
    pub category_node_sizing: NodeSizing,
    /// Node colors keyed by system role tag, or "custom" for custom roles.
    pub role_palette: HashMap<String, String>,
    /// Whether to detect scope and description conflicts.
    pub detect_conflicts: bool,
    /// Role count from which pairs are scored in parallel (`parallel` feature).
    pub parallel_pair_threshold: usize,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            max_roles: None,
            similarity_edge_threshold: 0.1,
            consolidation_threshold: 0.8,
            coverage_gap_threshold: 0.5,
            differentiation_threshold: 0.2,
            critical_categories: DEFAULT_CRITICAL_CATEGORIES
                .iter()
                .map(|c| c.to_string())
                .collect(),
            role_node_sizing: NodeSizing {
                base: 10.0,
                per_permission: 2.0,
                min: 10.0,
                max: 50.0,
            },
            category_node_sizing: NodeSizing {
                base: 5.0,
                per_permission: 3.0,
                min: 5.0,
                max: 30.0,
            },
            role_palette: HashMap::new(),
            detect_conflicts: true,
            parallel_pair_threshold: 8,
        }
    }
}

impl ComparisonConfig {
    /// Create a builder starting from the defaults.
    pub fn builder() -> ComparisonConfigBuilder {
        ComparisonConfigBuilder::new()
    }

    /// Check whether a category is business-critical.
    pub fn is_critical(&self, category: &str) -> bool {
        self.critical_categories.iter().any(|c| c == category)
    }

    /// Look up the palette color for a role.
    pub fn color_for(&self, system_role_tag: Option<&str>) -> Option<&str> {
        self.role_palette
            .get(system_role_tag.unwrap_or("custom"))
            .map(String::as_str)
    }

    /// Validate thresholds and sizing.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("similarity_edge_threshold", self.similarity_edge_threshold),
            ("consolidation_threshold", self.consolidation_threshold),
            ("coverage_gap_threshold", self.coverage_gap_threshold),
            ("differentiation_threshold", self.differentiation_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfiguration(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }

        for (name, sizing) in [
            ("role_node_sizing", &self.role_node_sizing),
            ("category_node_sizing", &self.category_node_sizing),
        ] {
            if !(sizing.min <= sizing.max) {
                return Err(Error::InvalidConfiguration(format!(
                    "{name}: min {} exceeds max {}",
                    sizing.min, sizing.max
                )));
            }
        }

        if let Some(max) = self.max_roles
            && max < 2
        {
            return Err(Error::InvalidConfiguration(format!(
                "max_roles must allow at least 2 roles, got {max}"
            )));
        }

        Ok(())
    }
}

/// Builder for [`ComparisonConfig`].
#[derive(Debug, Clone, Default)]
pub struct ComparisonConfigBuilder {
    config: ComparisonConfig,
}

impl ComparisonConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the number of roles per comparison.
    pub fn max_roles(mut self, max: usize) -> Self {
        self.config.max_roles = Some(max);
        self
    }

    /// Set the similarity edge threshold.
    pub fn similarity_edge_threshold(mut self, threshold: f64) -> Self {
        self.config.similarity_edge_threshold = threshold;
        self
    }

    /// Set the consolidation threshold.
    pub fn consolidation_threshold(mut self, threshold: f64) -> Self {
        self.config.consolidation_threshold = threshold;
        self
    }

    /// Set the coverage gap threshold.
    pub fn coverage_gap_threshold(mut self, threshold: f64) -> Self {
        self.config.coverage_gap_threshold = threshold;
        self
    }

    /// Set the differentiation threshold.
    pub fn differentiation_threshold(mut self, threshold: f64) -> Self {
        self.config.differentiation_threshold = threshold;
        self
    }

    /// Replace the critical categories.
    pub fn critical_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.critical_categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Add one critical category.
    pub fn add_critical_category(mut self, category: impl Into<String>) -> Self {
        self.config.critical_categories.push(category.into());
        self
    }

    /// Set role node sizing.
    pub fn role_node_sizing(mut self, sizing: NodeSizing) -> Self {
        self.config.role_node_sizing = sizing;
        self
    }

    /// Set category node sizing.
    pub fn category_node_sizing(mut self, sizing: NodeSizing) -> Self {
        self.config.category_node_sizing = sizing;
        self
    }

    /// Map a system role tag (or "custom") to a node color.
    pub fn role_color(mut self, tag: impl Into<String>, color: impl Into<String>) -> Self {
        self.config.role_palette.insert(tag.into(), color.into());
        self
    }

    /// Enable or disable conflict detection.
    pub fn detect_conflicts(mut self, enabled: bool) -> Self {
        self.config.detect_conflicts = enabled;
        self
    }

    /// Set the role count from which pair scoring runs in parallel.
    pub fn parallel_pair_threshold(mut self, threshold: usize) -> Self {
        self.config.parallel_pair_threshold = threshold;
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<ComparisonConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
