//! Distribution statistics over per-role permission counts.

use crate::matrix::PermissionMatrix;
use crate::metrics::ratio;
use std::collections::BTreeMap;

/// Ascending copy of `values`. Sums are taken in this order so the result
/// does not depend on the order roles were selected in.
fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    sorted(values).iter().sum::<f64>() / values.len() as f64
}

/// Median, averaging the two middle values for even lengths; 0 when empty.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sorted = sorted(values);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Population variance: mean squared deviation from the mean.
pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = mean(values);
    let mut deviations: Vec<f64> = values.iter().map(|v| (v - mean).powi(2)).collect();
    deviations.sort_by(f64::total_cmp);
    deviations.iter().sum::<f64>() / values.len() as f64
}

/// Shannon entropy in bits of the distribution `counts[i] / sum(counts)`.
///
/// Zero-count entries contribute nothing, and an all-zero input has entropy 0.
/// Terms are summed in ascending count order.
pub fn entropy(counts: &[usize]) -> f64 {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let mut counts = counts.to_vec();
    counts.sort_unstable();
    counts
        .iter()
        .filter(|count| **count > 0)
        .map(|&count| {
            let p = count as f64 / total as f64;
            -p * p.log2()
        })
        .sum()
}

/// One minus the normalized Herfindahl concentration of `counts`.
///
/// An even spread across all roles scores 1, a single role holding everything
/// scores 0. Empty categories and single-role inputs score 0.
pub fn diversity(counts: &[usize]) -> f64 {
    let total: usize = counts.iter().sum();
    let n = counts.len();
    if total == 0 || n < 2 {
        return 0.0;
    }
    let mut counts = counts.to_vec();
    counts.sort_unstable();
    let concentration: f64 = counts
        .iter()
        .map(|&count| (count as f64 / total as f64).powi(2))
        .sum();
    let floor = 1.0 / n as f64;
    let normalized = (concentration - floor) / (1.0 - floor);
    (1.0 - normalized).clamp(0.0, 1.0)
}

/// How the selected roles cover one permission category.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CategoryAnalysis {
    /// Category (resource) name.
    pub category: String,
    /// Distinct permissions in the category.
    pub total_permissions: usize,
    /// Permissions each role holds in the category, keyed by role id.
    pub role_counts: BTreeMap<String, usize>,
    /// Roles holding at least one permission in the category.
    pub roles_with_access: usize,
    /// `roles_with_access / role_count`.
    pub overlap: f64,
    /// Spread of the category's permissions across roles.
    pub diversity: f64,
}

/// Statistics over per-role permission counts.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StatisticalSummary {
    /// Number of roles compared.
    pub role_count: usize,
    /// Smallest role permission count.
    pub min: usize,
    /// Largest role permission count.
    pub max: usize,
    /// Mean role permission count.
    pub mean: f64,
    /// Median role permission count.
    pub median: f64,
    /// Population variance of the role permission counts.
    pub variance: f64,
    /// Square root of `variance`.
    pub std_deviation: f64,
    /// Shannon entropy in bits of the permission counts across roles.
    pub entropy: f64,
    /// Entropy divided by its maximum, `log2(role_count)`.
    pub normalized_entropy: f64,
    /// Per-category coverage, ordered by category name.
    pub categories: Vec<CategoryAnalysis>,
}

impl StatisticalSummary {
    /// Compute the summary from the matrix.
    pub fn calculate(matrix: &PermissionMatrix) -> Self {
        let counts = matrix.role_permission_counts();
        let values: Vec<f64> = counts.iter().map(|&c| c as f64).collect();
        let role_count = counts.len();

        let variance = variance(&values);
        let entropy = entropy(&counts);
        let normalized_entropy = if role_count > 1 {
            entropy / (role_count as f64).log2()
        } else {
            0.0
        };

        Self {
            role_count,
            min: counts.iter().copied().min().unwrap_or(0),
            max: counts.iter().copied().max().unwrap_or(0),
            mean: mean(&values),
            median: median(&values),
            variance,
            std_deviation: variance.sqrt(),
            entropy,
            normalized_entropy,
            categories: category_analysis(matrix),
        }
    }

    /// Analysis for one category.
    pub fn category(&self, name: &str) -> Option<&CategoryAnalysis> {
        self.categories.iter().find(|c| c.category == name)
    }
}

fn category_analysis(matrix: &PermissionMatrix) -> Vec<CategoryAnalysis> {
    let role_ids = matrix.role_ids();
    matrix
        .categories()
        .iter()
        .map(|(category, permissions)| {
            let counts: Vec<usize> = (0..role_ids.len())
                .map(|idx| matrix.category_count_for_role(category, idx))
                .collect();
            let roles_with_access = counts.iter().filter(|c| **c > 0).count();

            CategoryAnalysis {
                category: category.clone(),
                total_permissions: permissions.len(),
                role_counts: role_ids.iter().cloned().zip(counts.iter().copied()).collect(),
                roles_with_access,
                overlap: ratio(roles_with_access, role_ids.len()),
                diversity: diversity(&counts),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{permission::Permission, role::Role};

    const EPS: f64 = 1e-12;

    #[test]
    fn test_median() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(&[]), 0.0);
    }

    #[test]
    fn test_variance() {
        assert_eq!(variance(&[2.0, 2.0, 2.0]), 0.0);
        assert_eq!(variance(&[1.0, 3.0]), 1.0);
    }

    #[test]
    fn test_entropy() {
        assert_eq!(entropy(&[5, 5]), 1.0);
        assert_eq!(entropy(&[4, 0]), 0.0);
        assert_eq!(entropy(&[0, 0]), 0.0);
        assert!((entropy(&[1, 1, 1, 1]) - 2.0).abs() < EPS);
    }

    #[test]
    fn test_reductions_ignore_input_order() {
        let counts = [1, 2, 3, 5, 7, 11];
        let mut reversed = counts;
        reversed.reverse();
        assert_eq!(entropy(&counts).to_bits(), entropy(&reversed).to_bits());
        assert_eq!(diversity(&counts).to_bits(), diversity(&reversed).to_bits());

        let values = [0.1, 0.7, 0.2, 1e9, 0.3];
        let mut shuffled = values;
        shuffled.swap(0, 3);
        shuffled.swap(1, 4);
        assert_eq!(mean(&values).to_bits(), mean(&shuffled).to_bits());
        assert_eq!(variance(&values).to_bits(), variance(&shuffled).to_bits());
    }

    #[test]
    fn test_diversity() {
        assert!((diversity(&[2, 2]) - 1.0).abs() < EPS);
        assert_eq!(diversity(&[3, 0]), 0.0);
        assert_eq!(diversity(&[0, 0]), 0.0);
        let partial = diversity(&[2, 1, 1]);
        assert!(partial > 0.0 && partial < 1.0);
    }

    #[test]
    fn test_summary_from_matrix() {
        let roles = vec![
            Role::with_id("a", "A")
                .add_permission(Permission::new("user", "read", "department"))
                .add_permission(Permission::new("user", "write", "department"))
                .add_permission(Permission::new("payroll", "read", "property")),
            Role::with_id("b", "B").add_permission(Permission::new("user", "read", "department")),
        ];
        let matrix = PermissionMatrix::build(&roles).unwrap();
        let summary = StatisticalSummary::calculate(&matrix);

        assert_eq!(summary.role_count, 2);
        assert_eq!(summary.min, 1);
        assert_eq!(summary.max, 3);
        assert_eq!(summary.mean, 2.0);
        assert_eq!(summary.median, 2.0);
        assert_eq!(summary.variance, 1.0);
        assert_eq!(summary.std_deviation, 1.0);

        let payroll = summary.category("payroll").unwrap();
        assert_eq!(payroll.roles_with_access, 1);
        assert_eq!(payroll.overlap, 0.5);
        assert_eq!(payroll.diversity, 0.0);

        let user = summary.category("user").unwrap();
        assert_eq!(user.overlap, 1.0);
        assert_eq!(user.role_counts["a"], 2);
        assert_eq!(user.role_counts["b"], 1);
    }
}
