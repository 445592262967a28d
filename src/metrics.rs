//! Scalar comparison metrics.
//!
//! Pairwise similarity is the Jaccard index of two roles' permission sets.
//! Pairs are always enumerated and reduced in canonical order (lexicographic
//! by role id), so the aggregate is bit-identical whichever way the pairs
//! were scored.

use crate::{
    config::ComparisonConfig,
    differences::PermissionDifferences,
    error::{Error, Result},
    matrix::PermissionMatrix,
};
use std::collections::BTreeMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Jaccard index `|A ∩ B| / |A ∪ B|` from set sizes; 0 when both sets are empty.
pub fn jaccard_similarity(intersection: usize, size_a: usize, size_b: usize) -> f64 {
    ratio(intersection, size_a + size_b - intersection)
}

/// Overlap coefficient `|A ∩ B| / min(|A|, |B|)` from set sizes; 0 when either
/// set is empty.
pub fn overlap_coefficient(intersection: usize, size_a: usize, size_b: usize) -> f64 {
    ratio(intersection, size_a.min(size_b))
}

pub(crate) fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Similarity figures for one pair of roles.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PairSimilarity {
    /// Lexicographically smaller role id.
    pub role_a: String,
    /// Lexicographically larger role id.
    pub role_b: String,
    /// Permissions held by both roles.
    pub intersection: usize,
    /// Permissions held by either role.
    pub union: usize,
    /// Jaccard index of the pair.
    pub jaccard: f64,
    /// Overlap coefficient of the pair.
    pub overlap: f64,
}

impl PairSimilarity {
    /// Whether this pair is made of the two given roles, in either order.
    pub fn involves(&self, a: &str, b: &str) -> bool {
        (self.role_a == a && self.role_b == b) || (self.role_a == b && self.role_b == a)
    }
}

/// Aggregate comparison metrics.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ComparisonMetrics {
    /// Distinct permissions across all roles.
    pub total_permissions: usize,
    /// Permissions held by every role.
    pub shared_permissions: usize,
    /// Permissions held by exactly one role, summed over roles.
    pub unique_permissions: usize,
    /// Distinct permissions per category.
    pub category_counts: BTreeMap<String, usize>,
    /// Mean pairwise Jaccard index.
    pub similarity_score: f64,
    /// Fraction of the union not held by every role.
    pub coverage_gap: f64,
    /// Mean pairwise overlap coefficient.
    pub overlap_coefficient: f64,
    /// Mean permissions per role.
    pub permission_density: f64,
    /// Every role pair, in canonical order.
    pub pairs: Vec<PairSimilarity>,
}

impl ComparisonMetrics {
    /// Compute the metrics for a matrix and its differences.
    pub fn calculate(
        matrix: &PermissionMatrix,
        differences: &PermissionDifferences,
        config: &ComparisonConfig,
    ) -> Result<Self> {
        let role_count = matrix.role_count();
        if role_count < 2 {
            return Err(Error::InsufficientRoles { found: role_count });
        }

        let pair_indices = canonical_pairs(matrix);
        let parallel = role_count >= config.parallel_pair_threshold;
        let pairs = score_pairs(matrix, &pair_indices, parallel);

        // Fixed summation order keeps the mean reproducible.
        let mut jaccard_sum = 0.0;
        let mut overlap_sum = 0.0;
        for pair in &pairs {
            jaccard_sum += pair.jaccard;
            overlap_sum += pair.overlap;
        }
        let pair_count = pairs.len() as f64;

        let total_permissions = matrix.len();
        let shared_permissions = differences.shared().len();
        let coverage_gap = ratio(total_permissions - shared_permissions, total_permissions);

        let assigned: usize = matrix.role_permission_counts().iter().sum();
        let permission_density = assigned as f64 / role_count as f64;

        let category_counts = matrix
            .categories()
            .iter()
            .map(|(category, permissions)| (category.clone(), permissions.len()))
            .collect();

        Ok(Self {
            total_permissions,
            shared_permissions,
            unique_permissions: differences.unique_count(),
            category_counts,
            similarity_score: jaccard_sum / pair_count,
            coverage_gap,
            overlap_coefficient: overlap_sum / pair_count,
            permission_density,
            pairs,
        })
    }

    /// Look up the figures for a pair of roles, in either order.
    pub fn pair(&self, a: &str, b: &str) -> Option<&PairSimilarity> {
        self.pairs.iter().find(|pair| pair.involves(a, b))
    }
}

/// Role index pairs ordered lexicographically by `(id_a, id_b)` with `id_a < id_b`.
pub(crate) fn canonical_pairs(matrix: &PermissionMatrix) -> Vec<(usize, usize)> {
    let role_ids = matrix.role_ids();
    let mut order: Vec<usize> = (0..role_ids.len()).collect();
    order.sort_by(|a, b| role_ids[*a].cmp(&role_ids[*b]));

    let mut pairs = Vec::with_capacity(order.len() * order.len().saturating_sub(1) / 2);
    for (pos, &a) in order.iter().enumerate() {
        for &b in &order[pos + 1..] {
            pairs.push((a, b));
        }
    }
    pairs
}

fn score_pair(matrix: &PermissionMatrix, a: usize, b: usize) -> PairSimilarity {
    let mut intersection = 0;
    let mut size_a = 0;
    let mut size_b = 0;
    for row in matrix.rows() {
        let in_a = row.is_held_by(a);
        let in_b = row.is_held_by(b);
        size_a += usize::from(in_a);
        size_b += usize::from(in_b);
        intersection += usize::from(in_a && in_b);
    }

    let role_ids = matrix.role_ids();
    PairSimilarity {
        role_a: role_ids[a].clone(),
        role_b: role_ids[b].clone(),
        intersection,
        union: size_a + size_b - intersection,
        jaccard: jaccard_similarity(intersection, size_a, size_b),
        overlap: overlap_coefficient(intersection, size_a, size_b),
    }
}

#[cfg(feature = "parallel")]
fn score_pairs(
    matrix: &PermissionMatrix,
    pairs: &[(usize, usize)],
    parallel: bool,
) -> Vec<PairSimilarity> {
    if parallel {
        log::debug!("Scoring {} role pairs in parallel", pairs.len());
        // Indexed collect keeps canonical order.
        pairs
            .par_iter()
            .map(|&(a, b)| score_pair(matrix, a, b))
            .collect()
    } else {
        pairs.iter().map(|&(a, b)| score_pair(matrix, a, b)).collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn score_pairs(
    matrix: &PermissionMatrix,
    pairs: &[(usize, usize)],
    _parallel: bool,
) -> Vec<PairSimilarity> {
    pairs.iter().map(|&(a, b)| score_pair(matrix, a, b)).collect()
}
