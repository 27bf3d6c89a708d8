//! Behaviour of the artifact shipped in `model/`.

use iris_model::{ArtifactPaths, FeatureVector, InferenceService, ModelStore};
use std::path::PathBuf;
use std::sync::Arc;

fn bundled_paths() -> ArtifactPaths {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../model");
    ArtifactPaths::new(root.join("iris_model.json"), root.join("metadata.json"))
}

fn service() -> InferenceService {
    let artifact = ModelStore::new(bundled_paths())
        .load()
        .expect("bundled artifact should load");
    InferenceService::new(Arc::new(artifact))
}

fn samples() -> Vec<FeatureVector> {
    vec![
        FeatureVector::new(5.1, 3.5, 1.4, 0.2),
        FeatureVector::new(6.7, 3.1, 4.7, 1.5),
        FeatureVector::new(6.3, 3.3, 6.0, 2.5),
        FeatureVector::new(5.9, 3.0, 5.1, 1.8),
        FeatureVector::new(4.9, 2.4, 3.3, 1.0),
        FeatureVector::new(0.0, 0.0, 0.0, 0.0),
    ]
}

#[test]
fn metadata_matches_model() {
    let service = service();
    let info = service.model_info();

    assert_eq!(info.target_names, ["setosa", "versicolor", "virginica"]);
    assert_eq!(info.n_features, 4);
    assert_eq!(info.feature_names.len(), 4);
    assert_eq!(service.artifact().classes(), info.target_names.as_slice());
    assert!(info.accuracy.is_some());
}

#[test]
fn setosa_example() {
    let result = service()
        .predict(&FeatureVector::new(5.1, 3.5, 1.4, 0.2))
        .unwrap();

    assert_eq!(result.predicted_class, "setosa");
    assert_eq!(result.confidence, 1.0);
    assert_eq!(result.probabilities.get("setosa"), Some(1.0));
    assert_eq!(result.probabilities.get("versicolor"), Some(0.0));
    assert_eq!(result.probabilities.get("virginica"), Some(0.0));
}

#[test]
fn versicolor_example() {
    let result = service()
        .predict(&FeatureVector::new(6.7, 3.1, 4.7, 1.5))
        .unwrap();

    assert_eq!(result.predicted_class, "versicolor");
    assert!((result.confidence - 0.9965).abs() < 5e-5, "{}", result.confidence);
}

#[test]
fn virginica_example() {
    let result = service()
        .predict(&FeatureVector::new(6.3, 3.3, 6.0, 2.5))
        .unwrap();

    assert_eq!(result.predicted_class, "virginica");
}

#[test]
fn distributions_are_well_formed() {
    let service = service();

    for features in samples() {
        let result = service.predict(&features).unwrap();
        let labels: Vec<&str> = result.probabilities.iter().map(|(l, _)| l).collect();

        assert_eq!(labels, ["setosa", "versicolor", "virginica"]);
        assert!((result.probabilities.total() - 1.0).abs() < 1e-9);
        assert!(result.probabilities.iter().all(|(_, p)| (0.0..=1.0).contains(&p)));

        let max = result
            .probabilities
            .iter()
            .map(|(_, p)| p)
            .fold(f64::MIN, f64::max);
        assert_eq!(result.confidence, max);
        assert_eq!(
            result.probabilities.get(&result.predicted_class),
            Some(result.confidence)
        );
    }
}

#[test]
fn batch_matches_single_predictions_in_order() {
    let service = service();
    let inputs = samples();

    let batch = service.predict_batch(&inputs).unwrap();
    assert_eq!(batch.len(), inputs.len());
    for (features, result) in inputs.iter().zip(&batch) {
        assert_eq!(result, &service.predict(features).unwrap());
    }

    let reversed: Vec<FeatureVector> = inputs.iter().rev().copied().collect();
    let reversed_batch = service.predict_batch(&reversed).unwrap();
    let mut expected = batch.clone();
    expected.reverse();
    assert_eq!(reversed_batch, expected);
}

#[test]
fn repeated_predictions_are_bit_identical() {
    let service = service();
    let features = FeatureVector::new(6.7, 3.1, 4.7, 1.5);

    let first = service.predict(&features).unwrap();
    for _ in 0..10 {
        let again = service.predict(&features).unwrap();
        assert_eq!(again.confidence.to_bits(), first.confidence.to_bits());
        assert_eq!(again, first);
    }
}
