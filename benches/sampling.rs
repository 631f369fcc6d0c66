use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use weighted_bag::{BagSampler, WeightTable, WeightedSampler};

fn gen_pairs(n: usize) -> Vec<(usize, f64)> {
    let mut rng = Pcg32::seed_from_u64(777);
    (0..n).map(|i| (i, 1.0 + 9.0 * rng.random::<f64>())).collect()
}

fn bench_table_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_build");
    for &n in &[2usize, 8, 64, 256] {
        let pairs = gen_pairs(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("from_pairs_n={n}"), |b| {
            b.iter(|| black_box(WeightTable::from_pairs(black_box(pairs.clone()))).unwrap());
        });
    }
    group.finish();
}

fn bench_weighted_draw(c: &mut Criterion) {
    let mut group = c.benchmark_group("weighted_draw");
    const DRAWS_PER_ITER: usize = 1024;

    for &n in &[2usize, 8, 64, 256] {
        let mut sampler = WeightedSampler::from_pairs(gen_pairs(n)).unwrap();
        group.throughput(Throughput::Elements(DRAWS_PER_ITER as u64));

        group.bench_function(format!("generate_n={n}"), |b| {
            b.iter_batched_ref(
                || Pcg32::seed_from_u64(999),
                |rng| {
                    let mut s = 0usize;
                    for v in sampler.generate_multiple(DRAWS_PER_ITER, rng).unwrap() {
                        s ^= *v.unwrap().get().unwrap();
                    }
                    black_box(s)
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_bag_draw(c: &mut Criterion) {
    let mut group = c.benchmark_group("bag_draw");
    const DRAWS_PER_ITER: usize = 1024;

    for &n in &[2usize, 8, 64, 256] {
        let mut bag = BagSampler::from_pairs(gen_pairs(n)).unwrap();
        group.throughput(Throughput::Elements(DRAWS_PER_ITER as u64));

        group.bench_function(format!("generate_n={n}"), |b| {
            b.iter_batched_ref(
                || Pcg32::seed_from_u64(1001),
                |rng| {
                    let mut s = 0usize;
                    for v in bag.generate_multiple(DRAWS_PER_ITER, rng).unwrap() {
                        s ^= *v.unwrap().get().unwrap();
                    }
                    black_box(s)
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(sampling, bench_table_build, bench_weighted_draw, bench_bag_draw);
criterion_main!(sampling);
