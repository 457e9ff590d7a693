use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rayon::ThreadPoolBuilder;
use sampleanalyzer::{
    traits::Variable, AlphaTVariable, ObjectKind, RecEvent, RecJet, RecLepton, Vec3, Vec4,
    Mt2Variable, Mt2wVariable,
};

fn random_events(n_events: usize) -> Vec<RecEvent> {
    let mut rng = fastrand::Rng::with_seed(0);
    let mut momentum = move |mass: f64| {
        Vec3::new(
            rng.f64() * 200.0 - 100.0,
            rng.f64() * 200.0 - 100.0,
            rng.f64() * 200.0 - 100.0,
        )
        .with_mass(mass)
    };
    (0..n_events)
        .map(|_| {
            let jets = (0..5)
                .map(|i| RecJet::new(momentum(5.0), i < 2))
                .collect();
            let leptons = vec![RecLepton::new(momentum(0.0), -1)];
            let met = momentum(0.0);
            RecEvent::new(jets, leptons, Vec4::transverse(met.px(), met.py()))
        })
        .collect()
}

fn observables_benchmark(c: &mut Criterion) {
    let events = random_events(1000);
    let variables: Vec<Box<dyn Variable>> = vec![
        Box::new(Mt2Variable::new(ObjectKind::Jets, 0.0)),
        Box::new(Mt2wVariable::default()),
        Box::new(AlphaTVariable),
    ];
    let max_threads = std::thread::available_parallelism().map_or(1, |n| n.get());
    let n_threads: Vec<usize> = (0..)
        .map(|x| 1 << x)
        .take_while(|&p| p <= max_threads)
        .collect();
    for variable in &variables {
        let mut group = c.benchmark_group(format!("{} over events", variable));
        for &threads in &n_threads {
            let pool = ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .unwrap();
            group.bench_with_input(
                BenchmarkId::from_parameter(threads),
                &threads,
                |b, &_threads| {
                    b.iter(|| pool.install(|| std::hint::black_box(variable.value_on(&events))))
                },
            );
        }
        group.finish();
    }
}

criterion_group! {
    name = benches;
    config = Criterion::default().measurement_time(Duration::from_secs(10));
    targets = observables_benchmark
}
criterion_main!(benches);
