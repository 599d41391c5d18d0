use criterion::{criterion_group, criterion_main, Criterion};

use vsort_core::block::{Block, ColumnData};
use vsort_core::schema::{DataType, Field, Schema};
use vsort_core::types::Scalar;
use vsort_exec::{DefaultRuntimeState, VecUpstream};
use vsort_mem::MemoryBudgetImpl;
use vsort_operators::sort::{SortConfig, SortOperator};

fn make_block(rows: usize) -> Block {
    let values: Vec<Scalar> = (0..rows as i64).rev().map(Scalar::I64).collect();
    Block::from_columns(vec![ColumnData {
        name: "sort_key".into(),
        values,
    }])
    .unwrap()
}

fn drain(mut operator: SortOperator<VecUpstream, vsort_mem::BudgetGuardImpl, MemoryBudgetImpl>, runtime: &DefaultRuntimeState) {
    operator.open(runtime).expect("open");
    while operator.next(runtime).expect("next").is_some() {}
}

fn bench_plain_sort(c: &mut Criterion) {
    let schema = Schema::new(vec![Field::new("sort_key", DataType::Int64, false)]);
    c.bench_function("plain_sort_100k_single_run", |b| {
        b.iter(|| {
            let upstream = VecUpstream::new(schema.clone(), vec![make_block(100_000)]);
            let budget = MemoryBudgetImpl::new(256 * 1024 * 1024);
            let operator = SortOperator::new(upstream, budget, SortConfig::default(), vec![0], None);
            let runtime = DefaultRuntimeState::new(8192);
            drain(operator, &runtime);
        })
    });
}

fn bench_multi_run_merge(c: &mut Criterion) {
    let schema = Schema::new(vec![Field::new("sort_key", DataType::Int64, false)]);
    c.bench_function("multi_run_merge_100k_over_10_runs", |b| {
        b.iter(|| {
            let blocks: Vec<Block> = (0..10).map(|_| make_block(10_000)).collect();
            let upstream = VecUpstream::new(schema.clone(), blocks);
            let budget = MemoryBudgetImpl::new(256 * 1024 * 1024);
            let config = SortConfig {
                run_row_threshold: 10_000,
                ..SortConfig::default()
            };
            let operator = SortOperator::new(upstream, budget, config, vec![0], None);
            let runtime = DefaultRuntimeState::new(8192);
            drain(operator, &runtime);
        })
    });
}

fn bench_top_n(c: &mut Criterion) {
    let schema = Schema::new(vec![Field::new("sort_key", DataType::Int64, false)]);
    c.bench_function("top_n_limit_100_over_100k_rows", |b| {
        b.iter(|| {
            let blocks: Vec<Block> = (0..10).map(|_| make_block(10_000)).collect();
            let upstream = VecUpstream::new(schema.clone(), blocks);
            let budget = MemoryBudgetImpl::new(256 * 1024 * 1024);
            let config = SortConfig {
                limit: Some(100),
                run_row_threshold: 10_000,
                ..SortConfig::default()
            };
            let operator = SortOperator::new(upstream, budget, config, vec![0], None);
            let runtime = DefaultRuntimeState::new(8192);
            drain(operator, &runtime);
        })
    });
}

criterion_group!(benches, bench_plain_sort, bench_multi_run_merge, bench_top_n);
criterion_main!(benches);
