use criterion::{Criterion, black_box, criterion_group, criterion_main};
use qpaudio_core::rng::seeded;
use qpaudio_core::simulation::PhasePlan;
use qpaudio_core::config::SimulationConfig;
use qpaudio_core::{
    DemoSession, EraserConfig, PredictionMode, SpeakerCatalog, generate_confidence_distribution,
    generate_session_metrics,
};

fn bench_session_metrics(c: &mut Criterion) {
    let catalog = SpeakerCatalog::builtin();
    let mut rng = seeded(42);

    c.bench_function("session_metrics_builtin_catalog", |b| {
        b.iter(|| generate_session_metrics(black_box(&catalog), &mut rng))
    });
}

fn bench_confidence_distribution(c: &mut Criterion) {
    let catalog = SpeakerCatalog::builtin();
    let mut rng = seeded(42);
    let misclassified = PredictionMode::misclassified("putin");

    c.bench_function("confidence_distribution_correct", |b| {
        b.iter(|| {
            generate_confidence_distribution(
                black_box(&catalog),
                "sachin",
                &PredictionMode::Correct,
                &mut rng,
            )
        })
    });

    c.bench_function("confidence_distribution_misclassified", |b| {
        b.iter(|| {
            generate_confidence_distribution(black_box(&catalog), "sachin", &misclassified, &mut rng)
        })
    });
}

fn bench_unlearning_run(c: &mut Criterion) {
    let config = EraserConfig::default();
    let mut rng = seeded(7);

    c.bench_function("phase_plan_generate", |b| {
        let sim = SimulationConfig::default();
        b.iter(|| PhasePlan::generate(black_box(&sim), &mut rng))
    });

    c.bench_function("demo_session_full_run", |b| {
        b.iter(|| {
            let mut session = DemoSession::new(&config).unwrap();
            session.load_model(&mut rng);
            session.begin_unlearning("kohli", &mut rng).ok();
            session.finish_unlearning(&mut rng)
        })
    });
}

criterion_group!(
    benches,
    bench_session_metrics,
    bench_confidence_distribution,
    bench_unlearning_run
);
criterion_main!(benches);
