//! Experiment registry construction tests
//!
//! Every invariant violation must surface when the registry is built, never
//! at assignment time.

use variant_bucketing::registry::{Experiment, ExperimentRegistry, Variant, WEIGHT_TOLERANCE};
use variant_bucketing::Error;

fn build_one(experiment: Experiment) -> variant_bucketing::Result<ExperimentRegistry> {
    ExperimentRegistry::builder().experiment(experiment).build()
}

// =============================================================================
// Weight-sum invariant
// =============================================================================

#[test]
fn test_weights_summing_to_point_nine_rejected() {
    let result = build_one(
        Experiment::builder("heroCTA", "Hero CTA")
            .variant("control", "Control", 0.3)
            .variant("variant-a", "Variant A", 0.3)
            .variant("variant-b", "Variant B", 0.3)
            .build(),
    );

    match result {
        Err(Error::InvalidExperiment {
            experiment_id,
            reason,
        }) => {
            assert_eq!(experiment_id, "heroCTA");
            assert!(reason.contains("sum"));
        }
        other => panic!("expected InvalidExperiment, got {other:?}"),
    }
}

#[test]
fn test_weights_summing_to_one_point_one_rejected() {
    let result = build_one(
        Experiment::builder("heroCTA", "Hero CTA")
            .variant("control", "Control", 0.4)
            .variant("variant-a", "Variant A", 0.4)
            .variant("variant-b", "Variant B", 0.3)
            .build(),
    );
    assert!(matches!(result, Err(Error::InvalidExperiment { .. })));
}

#[test]
fn test_off_by_more_than_tolerance_rejected() {
    let result = build_one(
        Experiment::builder("e", "E")
            .variant("a", "A", 0.5)
            .variant("b", "B", 0.5 + WEIGHT_TOLERANCE * 10.0)
            .build(),
    );
    assert!(result.is_err());
}

#[test]
fn test_thirds_accepted() {
    let third = 1.0 / 3.0;
    let result = build_one(
        Experiment::builder("e", "E")
            .variant("a", "A", third)
            .variant("b", "B", third)
            .variant("c", "C", third)
            .build(),
    );
    assert!(result.is_ok());
}

#[test]
fn test_one_bad_experiment_fails_whole_registry() {
    let result = ExperimentRegistry::builder()
        .experiment(
            Experiment::builder("good", "Good")
                .variant("a", "A", 1.0)
                .build(),
        )
        .experiment(
            Experiment::builder("bad", "Bad")
                .variant("a", "A", 0.2)
                .build(),
        )
        .build();

    assert!(matches!(
        result,
        Err(Error::InvalidExperiment { ref experiment_id, .. }) if experiment_id == "bad"
    ));
}

// =============================================================================
// Shape invariants
// =============================================================================

#[test]
fn test_empty_variant_list_rejected() {
    assert!(build_one(Experiment::new("empty", "Empty", Vec::new())).is_err());
}

#[test]
fn test_empty_experiment_id_rejected() {
    let result = build_one(Experiment::new("", "No id", vec![Variant::new("a", "A", 1.0)]));
    assert!(matches!(result, Err(Error::InvalidExperiment { .. })));
}

#[test]
fn test_infinite_weight_rejected() {
    let result = build_one(
        Experiment::builder("inf", "Inf")
            .variant("a", "A", f64::INFINITY)
            .build(),
    );
    assert!(result.is_err());
}

// =============================================================================
// JSON loading
// =============================================================================

#[test]
fn test_from_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("experiments.json");
    std::fs::write(
        &path,
        r#"{
            "heroCTA": {
                "name": "Hero CTA",
                "variants": [
                    { "id": "control", "name": "Control", "weight": 0.34 },
                    { "id": "variant-a", "name": "Variant A", "weight": 0.33 },
                    { "id": "variant-b", "name": "Variant B", "weight": 0.33 }
                ]
            },
            "projectCards": {
                "name": "Project card layout",
                "variants": [
                    { "id": "grid", "weight": 0.5 },
                    { "id": "list", "weight": 0.5 }
                ]
            }
        }"#,
    )
    .unwrap();

    let registry = ExperimentRegistry::from_json_file(&path).unwrap();
    assert_eq!(registry.len(), 2);

    let cards = registry.get_experiment("projectCards").unwrap();
    let ids: Vec<&str> = cards.variants().iter().map(Variant::id).collect();
    assert_eq!(ids, vec!["grid", "list"]);
}

#[test]
fn test_from_json_file_missing() {
    let dir = tempfile::tempdir().unwrap();
    let result = ExperimentRegistry::from_json_file(dir.path().join("nope.json"));
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_from_json_missing_weight_is_json_error() {
    let result = ExperimentRegistry::from_json_str(r#"{ "e": { "variants": [ { "id": "a" } ] } }"#);
    assert!(matches!(result, Err(Error::Json(_))));
}

#[test]
fn test_registry_shared_across_threads() {
    use std::sync::Arc;
    use variant_bucketing::VariantAssigner;

    let registry = Arc::new(
        build_one(
            Experiment::builder("e", "E")
                .variant("a", "A", 0.5)
                .variant("b", "B", 0.5)
                .build(),
        )
        .unwrap(),
    );
    let expected = VariantAssigner::new(Arc::clone(&registry)).assign("e", Some("user_7"));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let assigner = VariantAssigner::new(Arc::clone(&registry));
            std::thread::spawn(move || assigner.assign("e", Some("user_7")))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
