//! Comparison engine.
//!
//! This module holds the single entry point of the crate. A comparison runs
//! as a strict pipeline, each stage a pure function of the previous ones:
//!
//! - **Matrix**: union of permission triples and a total presence map
//! - **Differences**: shared, unique and missing subsets
//! - **Metrics**: similarity, coverage gap, density and pairwise figures
//! - **Analytics** and **Suggestions**: read-models and recommendations
//!
//! Nothing is cached between calls. Every invocation validates the selection
//! and recomputes every stage; a failure in any stage returns an error and no
//! partial result.
//!
//! # Thread Safety
//!
//! The engine holds no mutable state besides its telemetry counters, which
//! are atomic. One engine can serve concurrent callers.

use crate::{
    analytics::ComparisonAnalytics,
    config::ComparisonConfig,
    differences::PermissionDifferences,
    error::{Error, Result},
    matrix::PermissionMatrix,
    metrics::{ComparisonMetrics, PairSimilarity},
    permission::Permission,
    role::Role,
    suggestions::{Suggestion, generate_suggestions},
    telemetry::EngineTelemetry,
};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};

/// Identity and size of one compared role.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RoleSummary {
    /// Role id, unique within the selection.
    pub id: String,
    /// Display name.
    pub name: String,
    pub description: Option<String>,
    /// Whether the role is built in rather than user defined.
    pub is_system_role: bool,
    /// Tag of a built-in role, used for grouping and coloring.
    pub system_role_tag: Option<String>,
    /// Distinct permissions the role holds.
    pub permission_count: usize,
    /// Number of users assigned the role, when known.
    pub user_count: Option<u64>,
}

impl From<&Role> for RoleSummary {
    fn from(role: &Role) -> Self {
        Self {
            id: role.id().to_string(),
            name: role.name().to_string(),
            description: role.description().map(str::to_string),
            is_system_role: role.is_system_role(),
            system_role_tag: role.system_role_tag().map(str::to_string),
            permission_count: role.permissions().len(),
            user_count: role.user_count(),
        }
    }
}

/// Everything derived from one comparison of a role selection.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RoleComparison {
    pub roles: Vec<RoleSummary>,
    pub matrix: PermissionMatrix,
    pub differences: PermissionDifferences,
    pub metrics: ComparisonMetrics,
    pub analytics: ComparisonAnalytics,
    pub suggestions: Vec<Suggestion>,
    pub generated_at: DateTime<Utc>,
}

impl RoleComparison {
    fn ensure_known(&self, role_id: &str) -> Result<()> {
        if self.matrix.role_index(role_id).is_some() {
            Ok(())
        } else {
            Err(Error::UnknownRole(role_id.to_string()))
        }
    }

    /// Similarity figures for two compared roles.
    pub fn pair(&self, a: &str, b: &str) -> Result<&PairSimilarity> {
        self.ensure_known(a)?;
        self.ensure_known(b)?;
        self.metrics.pair(a, b).ok_or_else(|| Error::Analysis {
            message: format!("no pair entry for '{a}' and '{b}'"),
            source: None,
        })
    }

    /// Jaccard similarity of two compared roles. A role compared with
    /// itself scores 1 when it holds any permission.
    pub fn similarity_between(&self, a: &str, b: &str) -> Result<f64> {
        if a == b {
            self.ensure_known(a)?;
            let idx = self.matrix.role_index(a).unwrap_or_default();
            return Ok(if self.matrix.role_permission_count(idx) > 0 {
                1.0
            } else {
                0.0
            });
        }
        Ok(self.pair(a, b)?.jaccard)
    }

    /// Permissions only this role holds.
    pub fn unique_for(&self, role_id: &str) -> Result<&[Permission]> {
        self.differences
            .unique_for(role_id)
            .ok_or_else(|| Error::UnknownRole(role_id.to_string()))
    }

    /// Permissions other roles hold and this role lacks.
    pub fn missing_for(&self, role_id: &str) -> Result<&[Permission]> {
        self.differences
            .missing_for(role_id)
            .ok_or_else(|| Error::UnknownRole(role_id.to_string()))
    }

    /// Summary of one compared role.
    pub fn role(&self, role_id: &str) -> Result<&RoleSummary> {
        self.roles
            .iter()
            .find(|r| r.id == role_id)
            .ok_or_else(|| Error::UnknownRole(role_id.to_string()))
    }
}

/// Runs comparisons under a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct ComparisonEngine {
    config: ComparisonConfig,
    telemetry: EngineTelemetry,
}

impl ComparisonEngine {
    /// Create an engine with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with a custom configuration.
    pub fn with_config(config: ComparisonConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            telemetry: EngineTelemetry::new(),
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &ComparisonConfig {
        &self.config
    }

    /// Telemetry counters for this engine and its clones.
    pub fn telemetry(&self) -> &EngineTelemetry {
        &self.telemetry
    }

    /// Compare a selection of at least two roles.
    pub fn build_comparison(&self, roles: &[Role]) -> Result<RoleComparison> {
        self.telemetry.record_analysis();
        let timer = self.telemetry.start_timer();

        match self.run_pipeline(roles) {
            Ok(comparison) => {
                self.telemetry.record_success(roles.len());
                info!(
                    "Compared {} roles: similarity {:.3}, coverage gap {:.3}, {} suggestions in {:?}",
                    roles.len(),
                    comparison.metrics.similarity_score,
                    comparison.metrics.coverage_gap,
                    comparison.suggestions.len(),
                    timer.elapsed()
                );
                Ok(comparison)
            }
            Err(error) => {
                self.telemetry.record_error(error.name());
                warn!("Role comparison rejected: {error}");
                Err(error)
            }
        }
    }

    /// Generate suggestions for an existing comparison.
    ///
    /// `roles` must be exactly the selection the comparison was built from.
    pub fn suggest(&self, roles: &[Role], comparison: &RoleComparison) -> Result<Vec<Suggestion>> {
        for role in roles {
            comparison.ensure_known(role.id())?;
        }
        if let Some(absent) = comparison
            .matrix
            .role_ids()
            .iter()
            .find(|id| !roles.iter().any(|r| r.id() == id.as_str()))
        {
            return Err(Error::Analysis {
                message: format!("compared role '{absent}' was not supplied for suggestions"),
                source: None,
            });
        }

        Ok(generate_suggestions(
            roles,
            &comparison.matrix,
            &comparison.metrics,
            &comparison.analytics.critical_gaps,
            &self.config,
        ))
    }

    fn run_pipeline(&self, roles: &[Role]) -> Result<RoleComparison> {
        if let Some(max) = self.config.max_roles
            && roles.len() > max
        {
            return Err(Error::TooManyRoles {
                found: roles.len(),
                max,
            });
        }

        let matrix = PermissionMatrix::build(roles)?;
        debug!(
            "Matrix built: {} roles, {} permissions, {} categories",
            matrix.role_count(),
            matrix.len(),
            matrix.categories().len()
        );

        let differences =
            PermissionDifferences::calculate(roles, &matrix, self.config.detect_conflicts)?;
        debug!(
            "Differences: {} shared, {} unique, {} conflicts",
            differences.shared().len(),
            differences.unique_count(),
            differences.conflicts().len()
        );

        let metrics = ComparisonMetrics::calculate(&matrix, &differences, &self.config)?;
        debug!(
            "Metrics: similarity {:.3}, overlap {:.3}, density {:.2}",
            metrics.similarity_score, metrics.overlap_coefficient, metrics.permission_density
        );

        let analytics = ComparisonAnalytics::build(roles, &matrix, &metrics, &self.config);
        let suggestions = generate_suggestions(
            roles,
            &matrix,
            &metrics,
            &analytics.critical_gaps,
            &self.config,
        );
        debug!(
            "Analytics: {} critical gaps, {} suggestions",
            analytics.critical_gaps.len(),
            suggestions.len()
        );

        Ok(RoleComparison {
            roles: roles.iter().map(RoleSummary::from).collect(),
            matrix,
            differences,
            metrics,
            analytics,
            suggestions,
            generated_at: Utc::now(),
        })
    }
}

/// Compare roles with the default configuration.
pub fn build_comparison(roles: &[Role]) -> Result<RoleComparison> {
    ComparisonEngine::new().build_comparison(roles)
}
