//! Random forest classifier.
//!
//! Each tree is grown on a bootstrap sample of the training rows with its
//! own RNG. Tree seeds are drawn up front from `random_seed`, so the fitted
//! forest is identical no matter how rayon schedules the trees.

use crate::config::ForestConfig;
use crate::error::ModelError;
use crate::tree::{DecisionTree, TreeParams};
use pipeline::FeatureMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, instrument};

/// A fitted ensemble; read-only after [`RandomForestClassifier::fit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    trees: Vec<DecisionTree>,
    n_features: usize,
    n_classes: usize,
    config: ForestConfig,
}

impl RandomForestClassifier {
    /// Train a forest.
    ///
    /// # Arguments
    /// * `x` - One row per sample
    /// * `y` - Class id per row, each below `n_classes`
    /// * `n_classes` - Total number of classes (from the label codec)
    /// * `config` - Forest settings
    #[instrument(skip_all, fields(rows = x.n_rows(), features = x.n_cols()))]
    pub fn fit(
        x: &FeatureMatrix,
        y: &[usize],
        n_classes: usize,
        config: &ForestConfig,
    ) -> Result<Self, ModelError> {
        let (n_samples, n_features) = x.shape();
        if n_samples == 0 {
            return Err(ModelError::EmptyTrainingSet);
        }
        if y.len() != n_samples {
            return Err(ModelError::LabelCountMismatch {
                rows: n_samples,
                labels: y.len(),
            });
        }
        if let Some(&label) = y.iter().find(|&&label| label >= n_classes) {
            return Err(ModelError::LabelOutOfRange { label, n_classes });
        }
        if config.n_estimators == 0 {
            return Err(ModelError::InvalidConfig(
                "n_estimators must be at least 1".to_string(),
            ));
        }

        let params = TreeParams {
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            max_features: config.max_features,
        };

        let mut seeder = StdRng::seed_from_u64(config.random_seed);
        let seeds: Vec<u64> = (0..config.n_estimators).map(|_| seeder.random()).collect();

        let start = Instant::now();
        let trees: Vec<DecisionTree> = seeds
            .into_par_iter()
            .map(|seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                let samples = bootstrap_sample(n_samples, &mut rng);
                DecisionTree::fit(x, y, samples, n_classes, &params, &mut rng)
            })
            .collect();

        let avg_depth =
            trees.iter().map(DecisionTree::depth).sum::<usize>() as f64 / trees.len() as f64;
        info!(
            "Trained {} trees on {} rows x {} features in {:?}",
            trees.len(),
            n_samples,
            n_features,
            start.elapsed()
        );
        debug!("Average tree depth: {:.1}", avg_depth);

        Ok(Self {
            trees,
            n_features,
            n_classes,
            config: *config,
        })
    }

    /// Averaged class probabilities for one row
    pub fn predict_proba_row(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        if row.len() != self.n_features {
            return Err(ModelError::FeatureMismatch {
                expected: self.n_features,
                found: row.len(),
            });
        }

        let mut proba = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (total, p) in proba.iter_mut().zip(tree.predict_proba_row(row)) {
                *total += p;
            }
        }
        let n_trees = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n_trees);
        Ok(proba)
    }

    /// Most likely class id for one row
    pub fn predict_row(&self, row: &[f64]) -> Result<usize, ModelError> {
        Ok(argmax(&self.predict_proba_row(row)?))
    }

    /// Class probabilities, one vector per row
    pub fn predict_proba(&self, x: &FeatureMatrix) -> Result<Vec<Vec<f64>>, ModelError> {
        self.check_width(x)?;
        x.rows().map(|row| self.predict_proba_row(row)).collect()
    }

    /// Predicted class id per row
    pub fn predict(&self, x: &FeatureMatrix) -> Result<Vec<usize>, ModelError> {
        self.check_width(x)?;
        x.rows().map(|row| self.predict_row(row)).collect()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Structural check for a deserialized model
    pub fn is_well_formed(&self) -> bool {
        !self.trees.is_empty()
            && self
                .trees
                .iter()
                .all(|t| t.n_classes() == self.n_classes && t.is_well_formed(self.n_features))
    }

    fn check_width(&self, x: &FeatureMatrix) -> Result<(), ModelError> {
        if x.n_cols() != self.n_features {
            return Err(ModelError::FeatureMismatch {
                expected: self.n_features,
                found: x.n_cols(),
            });
        }
        Ok(())
    }
}

/// Draw `n_samples` row indices with replacement
fn bootstrap_sample(n_samples: usize, rng: &mut StdRng) -> Vec<usize> {
    (0..n_samples).map(|_| rng.random_range(0..n_samples)).collect()
}

/// Index of the largest value; ties go to the lowest index
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable() -> (FeatureMatrix, Vec<usize>) {
        let rows = vec![
            vec![1.0, 0.0, 5.0],
            vec![1.2, 0.1, 5.5],
            vec![0.9, 0.2, 4.5],
            vec![8.0, 1.0, 0.5],
            vec![8.5, 0.9, 0.0],
            vec![7.5, 1.1, 1.0],
        ];
        let x = FeatureMatrix::from_rows(rows, 3).unwrap();
        (x, vec![0, 0, 0, 1, 1, 1])
    }

    fn small_config() -> ForestConfig {
        ForestConfig::default().with_n_estimators(25)
    }

    #[test]
    fn test_fit_and_predict_training_rows() {
        let (x, y) = separable();
        let forest = RandomForestClassifier::fit(&x, &y, 2, &small_config()).unwrap();

        assert_eq!(forest.n_trees(), 25);
        assert_eq!(forest.n_features(), 3);
        assert_eq!(forest.predict(&x).unwrap(), y);
        assert!(forest.is_well_formed());
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let (x, y) = separable();
        let forest = RandomForestClassifier::fit(&x, &y, 3, &small_config()).unwrap();
        for proba in forest.predict_proba(&x).unwrap() {
            assert_eq!(proba.len(), 3);
            assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            // class 2 never appears in training
            assert_eq!(proba[2], 0.0);
        }
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (x, y) = separable();
        let a = RandomForestClassifier::fit(&x, &y, 2, &small_config()).unwrap();
        let b = RandomForestClassifier::fit(&x, &y, 2, &small_config()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_input_validation() {
        let (x, y) = separable();
        assert_eq!(
            RandomForestClassifier::fit(&x, &y[..3], 2, &small_config()),
            Err(ModelError::LabelCountMismatch { rows: 6, labels: 3 })
        );
        assert_eq!(
            RandomForestClassifier::fit(&x, &y, 1, &small_config()),
            Err(ModelError::LabelOutOfRange { label: 1, n_classes: 1 })
        );
        assert_eq!(
            RandomForestClassifier::fit(&FeatureMatrix::zeros(0, 3), &[], 2, &small_config()),
            Err(ModelError::EmptyTrainingSet)
        );
        assert!(matches!(
            RandomForestClassifier::fit(&x, &y, 2, &small_config().with_n_estimators(0)),
            Err(ModelError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_predict_rejects_wrong_width() {
        let (x, y) = separable();
        let forest = RandomForestClassifier::fit(&x, &y, 2, &small_config()).unwrap();
        assert_eq!(
            forest.predict_row(&[1.0, 2.0]),
            Err(ModelError::FeatureMismatch { expected: 3, found: 2 })
        );
        assert!(forest.predict(&FeatureMatrix::zeros(1, 4)).is_err());
    }

    #[test]
    fn test_argmax_ties_go_low() {
        assert_eq!(argmax(&[0.5, 0.5]), 0);
        assert_eq!(argmax(&[0.2, 0.3, 0.3, 0.2]), 1);
    }

    #[test]
    fn test_serde_round_trip_predicts_the_same() {
        let (x, y) = separable();
        let forest = RandomForestClassifier::fit(&x, &y, 2, &small_config()).unwrap();
        let json = serde_json::to_string(&forest).unwrap();
        let restored: RandomForestClassifier = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.predict(&x).unwrap(), forest.predict(&x).unwrap());
    }
}
