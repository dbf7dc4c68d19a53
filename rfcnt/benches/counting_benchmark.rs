//! Counting benchmark — measure the full single-pass pipeline over
//! synthetic load histories of increasing length.
//!
//! Covers the hot loop (filter + detector + accumulators) with the default
//! configuration (REPEATED residue, TRANSIENT_23c spreading) and the
//! cheapest configuration (no finalization, no spreading) to expose the
//! spreading overhead separately.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use rfcnt::{CountingParams, ResidualMethod, SdMethod, rfc};

/// Deterministic pseudo-random series in [-2000, 2500].
fn synthetic_series(len: usize) -> Vec<f64> {
    let mut state = 0x5eed_u64;
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let unit = (state >> 11) as f64 / (1u64 << 53) as f64;
        out.push(-2000.0 + unit * 4500.0);
    }
    out
}

fn bench_counting(c: &mut Criterion) {
    let mut group = c.benchmark_group("rfc");

    for &len in &[1_000usize, 10_000, 100_000] {
        let data = synthetic_series(len);

        let defaults = CountingParams::default();
        group.bench_with_input(BenchmarkId::new("defaults", len), &data, |b, data| {
            b.iter(|| rfc(data, &defaults).unwrap());
        });

        let counting_only = CountingParams {
            residual_method: ResidualMethod::None,
            spread_damage: SdMethod::None,
            ..Default::default()
        };
        group.bench_with_input(
            BenchmarkId::new("counting_only", len),
            &data,
            |b, data| {
                b.iter(|| rfc(data, &counting_only).unwrap());
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_counting);
criterion_main!(benches);
