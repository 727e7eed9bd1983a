use criterion::{Criterion, criterion_group, criterion_main};
use koch_core::{AcquisitionSet, Mode, ranker};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn bench_rank_sbox(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(2024);
    let ciphertexts: Vec<u64> = (0..2000).map(|_| rng.r#gen::<u64>()).collect();
    let timings: Vec<f64> = ciphertexts.iter().map(|&ct| (ct % 31) as f64).collect();
    let acq = AcquisitionSet::new_timing(ciphertexts, timings).unwrap();

    c.bench_function("rank_sbox_ta_2000_acquisitions", |b| {
        b.iter(|| ranker::rank_sbox(&acq, Mode::Ta, 0).unwrap());
    });
}

criterion_group!(benches, bench_rank_sbox);
criterion_main!(benches);
