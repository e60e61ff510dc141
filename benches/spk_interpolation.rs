use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use skywatch::{
    ephemeris::{naif::spk_kernel::SpkKernel, Body, Ephemeris},
    observers::observer_position,
    time::TimePoint,
};

#[path = "../tests/common/mod.rs"]
mod common;

use common::{colorado, scenario_kernel_bytes, SCENARIO_INTLEN, SCENARIO_RECORDS, SCENARIO_START_ET};

/// Uniform random epoch inside the scenario coverage, one hour away from both ends.
fn random_epoch(rng: &mut StdRng) -> TimePoint {
    let span = SCENARIO_INTLEN * SCENARIO_RECORDS as f64;
    let et = SCENARIO_START_ET + rng.random_range(3600.0..span - 3600.0);
    TimePoint::from_epoch(hifitime::Epoch::from_et_seconds(et))
}

fn bench_load(c: &mut Criterion) {
    let bytes = scenario_kernel_bytes();

    c.bench_function("spk/from_bytes", |b| {
        b.iter(|| black_box(SpkKernel::from_bytes(black_box(&bytes)).unwrap()))
    });
}

/// Moon state: one Chebyshev evaluation plus the Earth-Moon barycenter link.
fn bench_moon_state(c: &mut Criterion) {
    let kernel = SpkKernel::from_bytes(&scenario_kernel_bytes()).unwrap();
    let mut rng = StdRng::seed_from_u64(0x5EED);
    let samples = 10_000usize;

    c.bench_function("spk/moon_position", |b| {
        b.iter_batched(
            || (0..samples).map(|_| random_epoch(&mut rng)).collect::<Vec<_>>(),
            |epochs| {
                for t in epochs {
                    black_box(kernel.position(Body::Moon, black_box(&t)).unwrap());
                }
            },
            BatchSize::LargeInput,
        )
    });
}

/// Observer state: Earth lookup plus precession, nutation and sidereal rotation.
fn bench_observer(c: &mut Criterion) {
    let kernel = SpkKernel::from_bytes(&scenario_kernel_bytes()).unwrap();
    let site = colorado();
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);
    let t = random_epoch(&mut rng);

    c.bench_function("spk/observer_position", |b| {
        b.iter(|| black_box(observer_position(&kernel, &site, black_box(&t)).unwrap()))
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_load, bench_moon_state, bench_observer
);
criterion_main!(benches);
