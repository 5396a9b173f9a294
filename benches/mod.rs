use criterion::{criterion_group, criterion_main};


criterion_group!(
    benches,
    order_bench::bench_activation,
    order_bench::bench_expunge,
    order_bench::bench_moves
);
criterion_main!(benches);
