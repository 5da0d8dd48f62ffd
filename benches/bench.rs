// Criterion benchmarks for the assignment generator

use criterion::{black_box, criterion_group, criterion_main, Criterion, BenchmarkId};
use rand::rngs::StdRng;
use rand::SeedableRng;
use secret_santa::core::{verify_assignments, AssignmentGenerator, AssignmentStrategy};
use secret_santa::models::Member;

/// Every fourth member is a child
fn create_members(count: usize) -> Vec<Member> {
    (0..count)
        .map(|i| Member {
            id: format!("member-{}", i),
            can_give: i % 4 != 3,
        })
        .collect()
}

fn bench_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");

    for member_count in [3, 10, 50, 200, 500].iter() {
        let members = create_members(*member_count);

        for strategy in [AssignmentStrategy::Derangement, AssignmentStrategy::SwapRepair] {
            let generator = AssignmentGenerator::with_strategy(strategy);
            let mut rng = StdRng::seed_from_u64(42);

            group.bench_with_input(
                BenchmarkId::new(strategy.to_string(), member_count),
                member_count,
                |b, _| {
                    b.iter(|| generator.generate_with_rng(black_box(&members), &mut rng));
                },
            );
        }
    }

    group.finish();
}

fn bench_sattolo_fallback(c: &mut Criterion) {
    // Zero attempts forces the single-cycle path every time
    let generator = AssignmentGenerator::new(AssignmentStrategy::Derangement, 0);
    let members = create_members(200);
    let mut rng = StdRng::seed_from_u64(7);

    c.bench_function("derangement_cycle_fallback_200", |b| {
        b.iter(|| generator.generate_with_rng(black_box(&members), &mut rng));
    });
}

fn bench_verification(c: &mut Criterion) {
    let members = create_members(500);
    let mut rng = StdRng::seed_from_u64(1);
    let set = AssignmentGenerator::default()
        .generate_with_rng(&members, &mut rng)
        .unwrap();

    c.bench_function("verify_assignments_500", |b| {
        b.iter(|| verify_assignments(black_box(&members), black_box(&set)));
    });
}

criterion_group!(
    benches,
    bench_strategies,
    bench_sattolo_fallback,
    bench_verification
);

criterion_main!(benches);
