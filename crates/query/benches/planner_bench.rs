//! Join-order search benchmarks.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use quarry_index::Universe;
use quarry_query::ast::TableId;
use quarry_query::JoinOrderPlanner;

/// A chain `0 - 1 - ... - n-1` of selective links plus weak links elsewhere.
fn chain(n: usize) -> Vec<Vec<Option<f64>>> {
    (0..n)
        .map(|i| {
            (0..n)
                .map(|j| match i.abs_diff(j) {
                    0 => None,
                    1 => Some(0.01 * (1 + (i + j) % 5) as f64),
                    d if d % 3 == 0 => Some(0.5),
                    _ => None,
                })
                .collect()
        })
        .collect()
}

fn planner_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("join_order");

    for n in [3usize, 5, 7, 8].iter() {
        let universe = Arc::new(Universe::new((0..*n).map(TableId::new)));
        let planner = JoinOrderPlanner::new(universe, chain(*n)).with_warn_width(usize::MAX);

        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, _| {
            b.iter(|| black_box(planner.order().map(|o| o.cost)))
        });
    }

    group.finish();
}

criterion_group!(benches, planner_benchmark);
criterion_main!(benches);
