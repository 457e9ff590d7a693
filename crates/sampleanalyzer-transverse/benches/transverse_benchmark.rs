use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sampleanalyzer_core::{data::test_event, RecJet, Vec3, Vec4};
use sampleanalyzer_transverse::{alpha_t_from_jets, mt2, mt2w, Mt2wSolver};

fn random_p4(rng: &mut fastrand::Rng, mass: f64) -> Vec4 {
    Vec3::new(
        rng.f64() * 200.0 - 100.0,
        rng.f64() * 200.0 - 100.0,
        rng.f64() * 200.0 - 100.0,
    )
    .with_mass(mass)
}

fn mt2_benchmark(c: &mut Criterion) {
    let mut rng = fastrand::Rng::with_seed(0);
    let inputs: Vec<(Vec4, Vec4, Vec4)> = (0..100)
        .map(|_| {
            (
                random_p4(&mut rng, 5.0),
                random_p4(&mut rng, 10.0),
                Vec4::transverse(rng.f64() * 100.0 - 50.0, rng.f64() * 100.0 - 50.0),
            )
        })
        .collect();
    let mut group = c.benchmark_group("MT2");
    for test_mass in [0.0, 50.0] {
        group.bench_with_input(
            BenchmarkId::new("massive", test_mass),
            &test_mass,
            |b, &test_mass| {
                b.iter(|| {
                    for (p1, p2, met) in &inputs {
                        black_box(mt2(p1, p2, met, test_mass));
                    }
                })
            },
        );
    }
    let massless: Vec<(Vec4, Vec4, Vec4)> = inputs
        .iter()
        .map(|(p1, p2, met)| {
            (
                p1.vec3().with_mass(0.0),
                p2.vec3().with_mass(0.0),
                *met,
            )
        })
        .collect();
    group.bench_function("massless", |b| {
        b.iter(|| {
            for (p1, p2, met) in &massless {
                black_box(mt2(p1, p2, met, 0.0));
            }
        })
    });
    group.finish();
}

fn mt2w_benchmark(c: &mut Criterion) {
    let event = test_event();
    let lepton = event.leptons[0].p4;
    let mut group = c.benchmark_group("MT2W");
    group.bench_function("single hypothesis", |b| {
        let solver = Mt2wSolver::new(&lepton, &event.jets[0].p4, &event.jets[1].p4, &event.met);
        b.iter(|| black_box(solver.solve()))
    });
    group.bench_function("event", |b| {
        b.iter(|| black_box(mt2w(black_box(&event.jets), &lepton, &event.met)))
    });
    group.finish();
}

fn alphat_benchmark(c: &mut Criterion) {
    let mut rng = fastrand::Rng::with_seed(1);
    let mut group = c.benchmark_group("AlphaT");
    for n_jets in [2, 4, 8, 12] {
        let jets: Vec<RecJet> = (0..n_jets)
            .map(|_| RecJet::new(random_p4(&mut rng, 5.0), false))
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(n_jets), &jets, |b, jets| {
            b.iter(|| black_box(alpha_t_from_jets(black_box(jets))))
        });
    }
    group.finish();
}

criterion_group!(benches, mt2_benchmark, mt2w_benchmark, alphat_benchmark);
criterion_main!(benches);
