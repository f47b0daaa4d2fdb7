//! Property-based tests for the metrics and prediction generators.

use proptest::prelude::*;

use qpaudio_core::metrics::f1_score;
use qpaudio_core::rng::seeded;
use qpaudio_core::{
    DemoSession, EraserConfig, PredictionMode, Speaker, SpeakerCatalog,
    generate_confidence_distribution, generate_session_metrics, pick_misclass_target,
};

fn catalog_of(centers: &[f64]) -> SpeakerCatalog {
    SpeakerCatalog::new(
        centers
            .iter()
            .enumerate()
            .map(|(i, c)| Speaker::new(&format!("s{i}"), *c))
            .collect(),
    )
}

// --- Session metrics properties ---

proptest! {
    #[test]
    fn f1_is_rounded_harmonic_mean(seed in any::<u64>()) {
        let metrics = generate_session_metrics(&SpeakerCatalog::builtin(), &mut seeded(seed));
        for m in metrics.iter() {
            let expected = ((2.0 * m.precision * m.recall / (m.precision + m.recall)) * 100.0)
                .round() / 100.0;
            prop_assert!((m.f1_score - expected).abs() < 1e-9);
            prop_assert_eq!(m.f1_score, f1_score(m.precision, m.recall));
            let lo = m.precision.min(m.recall);
            let hi = m.precision.max(m.recall);
            prop_assert!(m.f1_score >= lo - 1e-9 && m.f1_score <= hi + 1e-9);
        }
    }

    #[test]
    fn builtin_metrics_stay_in_sanity_bound(seed in any::<u64>()) {
        let metrics = generate_session_metrics(&SpeakerCatalog::builtin(), &mut seeded(seed));
        for m in metrics.iter() {
            for v in [m.accuracy, m.precision, m.recall, m.f1_score] {
                prop_assert!((90.0..=100.5).contains(&v));
            }
        }
    }

    #[test]
    fn accuracy_stays_near_center(
        seed in any::<u64>(),
        centers in prop::collection::vec(90.0f64..99.5, 2..12),
    ) {
        let catalog = catalog_of(&centers);
        let metrics = generate_session_metrics(&catalog, &mut seeded(seed));
        for (speaker, m) in catalog.iter().zip(metrics.iter()) {
            prop_assert_eq!(&speaker.id, &m.speaker_id);
            prop_assert!((m.accuracy - speaker.calibration_center).abs() <= 0.4 + 0.005 + 1e-9);
        }
    }
}

// --- Confidence distribution properties ---

proptest! {
    #[test]
    fn correct_mode_ranks_true_speaker_first(
        seed in any::<u64>(),
        n in 2usize..16,
        true_idx in any::<prop::sample::Index>(),
    ) {
        let catalog = catalog_of(&vec![98.0; n]);
        let truth = format!("s{}", true_idx.index(n));
        let dist = generate_confidence_distribution(
            &catalog, &truth, &PredictionMode::Correct, &mut seeded(seed),
        ).unwrap();

        prop_assert_eq!(&dist.entries[0].speaker_id, &truth);
        prop_assert!((dist.total() - 100.0).abs() < 1e-6);
        prop_assert!(dist.entries.iter().all(|e| (0.0..=100.0).contains(&e.confidence)));
        prop_assert_eq!(dist.entries.len(), n);
    }

    #[test]
    fn misclassified_mode_ranks_target_first(
        seed in any::<u64>(),
        n in 2usize..16,
        true_idx in any::<prop::sample::Index>(),
        offset in any::<prop::sample::Index>(),
    ) {
        let catalog = catalog_of(&vec![98.0; n]);
        let t = true_idx.index(n);
        let m = (t + 1 + offset.index(n - 1)) % n;
        let truth = format!("s{t}");
        let target = format!("s{m}");
        let dist = generate_confidence_distribution(
            &catalog, &truth, &PredictionMode::misclassified(target.clone()), &mut seeded(seed),
        ).unwrap();

        prop_assert_eq!(&dist.entries[0].speaker_id, &target);
        prop_assert_ne!(&dist.predicted_speaker, &truth);
        prop_assert!((dist.total() - 100.0).abs() < 1e-6);
        prop_assert!(dist.entries.iter().all(|e| e.confidence >= 0.0));
        prop_assert!(dist.entries.windows(2).all(|w| w[0].confidence >= w[1].confidence));
    }

    #[test]
    fn pick_never_returns_excluded(seed in any::<u64>(), excluded in 0usize..10) {
        let catalog = SpeakerCatalog::builtin();
        let exclude = catalog.speakers()[excluded].id.clone();
        let mut rng = seeded(seed);
        for _ in 0..50 {
            let picked = pick_misclass_target(&catalog, &exclude, &mut rng).unwrap();
            prop_assert_ne!(&picked, &exclude);
            prop_assert!(catalog.contains(&picked));
        }
    }

    #[test]
    fn seeded_demo_runs_are_reproducible(seed in any::<u64>()) {
        let config = EraserConfig::default();
        let run = |seed: u64| {
            let mut rng = seeded(seed);
            let mut session = DemoSession::new(&config).unwrap();
            let metrics = session.load_model(&mut rng).metrics.clone();
            let pre = session.predict("chopra", &mut rng).unwrap();
            session.begin_unlearning("chopra", &mut rng).unwrap();
            let report = session.finish_unlearning(&mut rng).unwrap();
            (metrics, pre, report.misclass_target, report.retain_table, report.plan)
        };
        prop_assert_eq!(run(seed), run(seed));
    }
}
