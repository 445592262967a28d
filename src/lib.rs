//! # Role Comparison
//!
//! This crate compares a selection of RBAC roles permission by permission and
//! derives everything an administrator needs to judge them side by side:
//! set differences, similarity metrics, distribution statistics,
//! visualization-ready read-models and ranked improvement suggestions.
//!
//! ## Features
//!
//! - Permissions identified by their `(resource, action, scope)` triple
//! - Dense role × permission presence matrix with per-resource categories
//! - Shared, unique and missing permission sets per role
//! - Scope and description conflict detection
//! - Jaccard similarity, overlap coefficient, coverage gap and density
//! - Variance, median, entropy and per-category diversity
//! - Venn, network graph and heatmap data for charts
//! - Critical category gap detection
//! - Consolidation, gap, hierarchy and migration suggestions
//! - Serializable results (`serde` feature, on by default)
//! - Optional parallel pair scoring (`parallel`) and async wrapper (`async`)
//!
//! ## Quick Start
//!
//! ```rust
//! use role_comparison::{build_comparison, Permission, Role};
//!
//! let manager = Role::with_id("manager", "Department Manager")
//!     .add_permission(Permission::new("user", "read", "department"))
//!     .add_permission(Permission::new("user", "write", "department"));
//! let clerk = Role::with_id("clerk", "Clerk")
//!     .add_permission(Permission::new("user", "read", "department"));
//!
//! let comparison = build_comparison(&[manager, clerk])?;
//!
//! assert_eq!(comparison.metrics.similarity_score, 0.5);
//! assert_eq!(comparison.differences.shared().len(), 1);
//! assert_eq!(comparison.unique_for("manager")?.len(), 1);
//! # Ok::<(), role_comparison::Error>(())
//! ```
//!
//! ## Audit Logging
//!
//! The engine logs through the `log` facade: one `info` line per completed
//! comparison, `debug` lines per pipeline stage and a `warn` line for every
//! rejected selection. With the `audit` feature enabled a default logger can
//! be installed:
//!
//! ```rust,ignore
//! role_comparison::init_audit_logger();
//! // RUST_LOG=info,role_comparison=debug
//! ```

#[cfg(feature = "audit")]
pub fn init_audit_logger() {
    env_logger::init();
}

pub mod analytics;
pub mod config;
pub mod differences;
pub mod engine;
pub mod error;
pub mod macros;
pub mod matrix;
pub mod metrics;
pub mod permission;
pub mod role;
pub mod statistics;
pub mod suggestions;
pub mod telemetry;

#[cfg(feature = "async")]
pub mod async_support;

// Re-export main types for convenience
pub use crate::{
    analytics::{
        ComparisonAnalytics, CriticalGap, EdgeKind, Heatmap, NetworkEdge, NetworkGraph,
        NetworkNode, NodeKind, VennData, VennIntersection, VennSet,
    },
    config::{ComparisonConfig, ComparisonConfigBuilder, NodeSizing},
    differences::{ConflictKind, PermissionConflict, PermissionDifferences},
    engine::{ComparisonEngine, RoleComparison, RoleSummary, build_comparison},
    error::{Error, ErrorKind, Result},
    matrix::PermissionMatrix,
    metrics::{ComparisonMetrics, PairSimilarity},
    permission::{Permission, PermissionSet},
    role::{Role, RoleBuilder},
    statistics::{CategoryAnalysis, StatisticalSummary},
    suggestions::{EffortLevel, ImpactLevel, Suggestion, SuggestionType},
    telemetry::{EngineTelemetry, TelemetrySummary},
};

#[cfg(feature = "async")]
pub use crate::async_support::AsyncComparisonEngine;
