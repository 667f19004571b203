use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use mpbfv_math::{
    rns::ScalingFactor,
    rq::{Context, Poly, Representation, Scaler, SubstitutionExponent},
    zq::primes::generate_prime,
};
use num_bigint::BigUint;
use rand::thread_rng;
use std::sync::Arc;

fn moduli(num_moduli: usize, degree: usize) -> Vec<u64> {
    let mut moduli = Vec::with_capacity(num_moduli);
    let mut upper_bound = 1 << 62;
    for _ in 0..num_moduli {
        let p = generate_prime(62, 2 * degree as u64, upper_bound).unwrap();
        moduli.push(p);
        upper_bound = p;
    }
    moduli
}

pub fn rq_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("rq");
    group.sample_size(10);
    let mut rng = thread_rng();

    for degree in [1024usize, 4096] {
        let q = moduli(4, degree);
        let ctx = Arc::new(Context::new(&q, degree).unwrap());
        let extended = Arc::new(Context::new(&moduli(9, degree), degree).unwrap());
        let p = Poly::random(&ctx, Representation::PowerBasis, &mut rng);
        let p_ntt = p.to_representation(Representation::Ntt);

        group.bench_function(BenchmarkId::new("ntt", degree), |b| {
            b.iter(|| p.to_representation(Representation::Ntt));
        });

        group.bench_function(BenchmarkId::new("ntt_inverse", degree), |b| {
            b.iter(|| p_ntt.to_representation(Representation::PowerBasis));
        });

        group.bench_function(BenchmarkId::new("mul", degree), |b| {
            b.iter(|| &p_ntt * &p_ntt);
        });

        let exponent = SubstitutionExponent::new(&ctx, 3).unwrap();
        group.bench_function(BenchmarkId::new("substitute", degree), |b| {
            b.iter(|| p.substitute(&exponent).unwrap());
        });

        let scaler = Scaler::new(
            &ctx,
            &extended,
            ScalingFactor::new(&BigUint::from(65537u64), ctx.modulus()),
        )
        .unwrap();
        group.bench_function(BenchmarkId::new("scale", degree), |b| {
            b.iter(|| p.scale(&scaler).unwrap());
        });
    }

    group.finish();
}

criterion_group!(rq, rq_benchmark);
criterion_main!(rq);
