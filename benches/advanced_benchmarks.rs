//! Scaling benchmarks for the comparison pipeline and its individual stages.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use role_comparison::{
    ComparisonConfig, ComparisonEngine, ComparisonMetrics, Permission, PermissionDifferences,
    PermissionMatrix, Role, StatisticalSummary,
};
use std::hint::black_box;

/// Generate roles with overlapping permissions spread over ten resources.
fn generate_roles(num_roles: usize, permissions_per_role: usize) -> Vec<Role> {
    (0..num_roles)
        .map(|role_idx| {
            let permissions = (0..permissions_per_role).map(|perm_idx| {
                // Shift each role's window so neighbours overlap.
                let n = perm_idx + role_idx * (permissions_per_role / 2);
                Permission::new(
                    format!("resource_{}", n % 10),
                    format!("action_{n}"),
                    "property",
                )
            });
            Role::with_id(format!("role_{role_idx}"), format!("Role {role_idx}"))
                .add_permissions(permissions)
        })
        .collect()
}

fn bench_role_count_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("role_count_scaling");
    let engine = ComparisonEngine::new();

    for num_roles in [2, 3, 5, 10, 20] {
        let roles = generate_roles(num_roles, 20);
        group.bench_with_input(BenchmarkId::from_parameter(num_roles), &roles, |b, roles| {
            b.iter(|| black_box(engine.build_comparison(roles).unwrap()))
        });
    }

    group.finish();
}

fn bench_permission_count_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("permission_count_scaling");
    let engine = ComparisonEngine::new();

    for permissions in [10, 100, 500, 1000] {
        let roles = generate_roles(3, permissions);
        group.bench_with_input(
            BenchmarkId::from_parameter(permissions),
            &roles,
            |b, roles| b.iter(|| black_box(engine.build_comparison(roles).unwrap())),
        );
    }

    group.finish();
}

fn bench_pipeline_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline_stages");
    let config = ComparisonConfig::default();
    let roles = generate_roles(5, 200);
    let matrix = PermissionMatrix::build(&roles).unwrap();
    let differences = PermissionDifferences::calculate(&roles, &matrix, true).unwrap();

    group.bench_function("matrix", |b| {
        b.iter(|| black_box(PermissionMatrix::build(&roles).unwrap()))
    });
    group.bench_function("differences", |b| {
        b.iter(|| black_box(PermissionDifferences::calculate(&roles, &matrix, true).unwrap()))
    });
    group.bench_function("metrics", |b| {
        b.iter(|| black_box(ComparisonMetrics::calculate(&matrix, &differences, &config).unwrap()))
    });
    group.bench_function("statistics", |b| {
        b.iter(|| black_box(StatisticalSummary::calculate(&matrix)))
    });

    group.finish();
}

fn bench_conflict_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("conflict_detection");
    let roles = generate_roles(10, 100);

    for enabled in [false, true] {
        let config = ComparisonConfig::builder()
            .detect_conflicts(enabled)
            .build()
            .unwrap();
        let engine = ComparisonEngine::with_config(config).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(enabled), &roles, |b, roles| {
            b.iter(|| black_box(engine.build_comparison(roles).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_role_count_scaling,
    bench_permission_count_scaling,
    bench_pipeline_stages,
    bench_conflict_detection
);
criterion_main!(benches);

#[cfg(test)]
mod benchmark_tests {
    use super::*;

    #[test]
    fn test_generated_roles_are_valid() {
        let roles = generate_roles(4, 10);
        assert_eq!(roles.len(), 4);
        assert!(roles.iter().all(|r| r.validate().is_ok()));
    }
}
