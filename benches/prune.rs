use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dtprune::{ErrorCriterion, Pruner, VerifyMode};

/// Bounds for a sweep of shrinking reference nodes, roughly what a traversal
/// produces while descending towards a query point.
fn make_bounds(n: usize) -> Vec<(f64, f64, u64)> {
    (0..n)
        .map(|i| {
            let d = (i % 64) as f64 * 0.1;
            let count = 1u64 << (i % 8);
            let c = count as f64;
            let upper = c * (-0.5 * d * d).exp();
            let lower = c * (-0.5 * (d + 0.2) * (d + 0.2)).exp();
            (upper, lower, count)
        })
        .collect()
}

fn criteria() -> Vec<(&'static str, ErrorCriterion)> {
    let mk = |r: dtprune::Result<ErrorCriterion>| r.expect("valid criterion");
    vec![
        ("absolute", mk(ErrorCriterion::absolute(0.01))),
        ("relative", mk(ErrorCriterion::relative(0.05))),
        ("exponential", mk(ErrorCriterion::exponential(0.5, 1.0, 0.01))),
        ("gaussian", mk(ErrorCriterion::gaussian(0.5, 1.0, 0.01))),
        ("hybrid", mk(ErrorCriterion::hybrid(1.0, 0.05))),
    ]
}

fn bench_can_prune(c: &mut Criterion) {
    let bounds = make_bounds(4096);
    let total: u64 = bounds.iter().map(|(_, _, n)| n).sum();

    for (name, criterion) in criteria() {
        for verify in [VerifyMode::Checked, VerifyMode::Unchecked] {
            let pruner = Pruner::new(criterion).with_verify(verify);
            c.bench_function(&format!("can_prune/{name}/{verify}"), |b| {
                b.iter(|| {
                    let mut budget = pruner.leaf_budget(total);
                    let mut pruned = 0u32;
                    for &(u, l, n) in &bounds {
                        if pruner
                            .can_prune(&mut budget, black_box(u), black_box(l), n)
                            .unwrap_or(false)
                        {
                            pruned += 1;
                        } else {
                            // Expanded nodes still account for their references.
                            let rem = budget.remaining_query_count().saturating_sub(n);
                            budget.set_remaining_query_count(rem);
                        }
                    }
                    black_box(pruned)
                })
            });
        }
    }
}

criterion_group!(prune, bench_can_prune);
criterion_main!(prune);
